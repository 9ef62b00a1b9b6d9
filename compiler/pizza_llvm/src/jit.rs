//! JIT engine management.
//!
//! The driver hands each finished module over and never touches it again.
//! Two tiers:
//!
//! - Definition modules go into one persistent execution engine
//!   ([`Jit::add_module`]); their symbols stay resolvable for the life of
//!   the session, including calls between functions compiled into
//!   different modules.
//! - Anonymous top-level units go through [`Jit::add_tracked_module`],
//!   which runs them under a transient engine whose external declarations
//!   are wired by address: host runtime symbols first, then anything the
//!   persistent engine can resolve. Removing the tracker retires the unit,
//!   so the next `__anon_expr` never resolves to a stale address.

use std::fmt;

use inkwell::context::Context;
use inkwell::execution_engine::ExecutionEngine;
use inkwell::module::Module;
use inkwell::targets::{InitializationConfig, Target};
use inkwell::values::BasicValue;
use inkwell::OptimizationLevel;
use tracing::debug;

use crate::runtime;

/// A JIT failure. Symbol-resolution misses indicate a missing prior stage
/// and end the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JitError {
    message: String,
}

impl JitError {
    fn new(message: impl Into<String>) -> Self {
        JitError {
            message: message.into(),
        }
    }
}

impl fmt::Display for JitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for JitError {}

/// The session-wide JIT.
pub struct Jit<'ctx> {
    engine: ExecutionEngine<'ctx>,
    /// Modules the engine references; kept alive for the session.
    modules: Vec<Module<'ctx>>,
}

impl<'ctx> Jit<'ctx> {
    pub fn new(llcx: &'ctx Context) -> Result<Self, JitError> {
        Target::initialize_native(&InitializationConfig::default()).map_err(JitError::new)?;
        let bootstrap = llcx.create_module("pizza.jit");
        let engine = bootstrap
            .create_jit_execution_engine(OptimizationLevel::None)
            .map_err(|e| JitError::new(e.to_string()))?;
        Ok(Jit {
            engine,
            modules: vec![bootstrap],
        })
    }

    /// Take ownership of a definition module and make its symbols
    /// resolvable for the rest of the session.
    pub fn add_module(&mut self, module: Module<'ctx>) -> Result<(), JitError> {
        debug!(target: "pizza_llvm", module = %module.get_name().to_string_lossy(), "adding module to jit");
        self.engine
            .add_module(&module)
            .map_err(|()| JitError::new("module already belongs to an execution engine"))?;
        runtime::map_host_symbols(&self.engine, &module);
        self.modules.push(module);
        Ok(())
    }

    /// The materialized address of `name` among the persistent modules.
    pub fn lookup(&self, name: &str) -> Result<usize, JitError> {
        self.engine
            .get_function_address(name)
            .map_err(|_| JitError::new(format!("symbol not found: {name}")))
    }

    /// Run an anonymous unit's module under its own engine, wiring every
    /// external declaration to a concrete address first.
    pub fn add_tracked_module(
        &self,
        module: Module<'ctx>,
    ) -> Result<ResourceTracker<'ctx>, JitError> {
        let engine = module
            .create_jit_execution_engine(OptimizationLevel::None)
            .map_err(|e| JitError::new(e.to_string()))?;
        runtime::map_host_symbols(&engine, &module);

        for function in module.get_functions() {
            if function.count_basic_blocks() > 0 {
                continue;
            }
            // a declaration nothing in this module references produces no
            // relocations and needs no address
            let global_ptr = function.as_global_value().as_pointer_value();
            let uses = global_ptr.get_first_use();
            if uses.is_none() {
                continue;
            }
            let name = function
                .get_name()
                .to_str()
                .map_err(|_| JitError::new("function name is not valid UTF-8"))?
                .to_owned();
            if runtime::host_symbol(&name).is_some() {
                continue;
            }
            let addr = self.lookup(&name)?;
            engine.add_global_mapping(&function, addr);
        }

        Ok(ResourceTracker {
            engine,
            _module: module,
        })
    }
}

/// Keeps one anonymous unit alive until it has been called.
pub struct ResourceTracker<'ctx> {
    engine: ExecutionEngine<'ctx>,
    _module: Module<'ctx>,
}

impl ResourceTracker<'_> {
    /// The materialized address of `name` within the tracked module.
    pub fn lookup(&self, name: &str) -> Result<usize, JitError> {
        self.engine
            .get_function_address(name)
            .map_err(|_| JitError::new(format!("symbol not found: {name}")))
    }

    /// Look up `name` and call it as a nullary scalar function.
    pub fn call_scalar(&self, name: &str) -> Result<f64, JitError> {
        let addr = self.lookup(name)?;
        // SAFETY: every Pizza function is lowered as `double(double, …)`
        // with external linkage; a symbol this crate emitted with zero
        // parameters therefore has type `double()`.
        let f: extern "C" fn() -> f64 = unsafe { std::mem::transmute(addr) };
        Ok(f())
    }

    /// Retire the tracked module and its engine.
    pub fn remove(self) {
        debug!(target: "pizza_llvm", "removing tracked module from jit");
    }
}
