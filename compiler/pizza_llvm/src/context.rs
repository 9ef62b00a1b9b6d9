//! Compilation context.
//!
//! All mutable lowering state lives in one [`CodegenCx`] value passed
//! explicitly: the current module, the instruction builder, the
//! known-prototype registry, and the lexical symbol-table stack. The
//! driver takes the finished module out after each top-level unit and the
//! context allocates a fresh one; the registry outlives every module, so
//! functions compiled into retired modules can be re-declared on demand.

use std::fmt;

use inkwell::builder::{Builder, BuilderError};
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::targets::{CodeModel, InitializationConfig, RelocMode, Target, TargetMachine};
use inkwell::types::FloatType;
use inkwell::values::{FloatValue, FunctionValue, PointerValue};
use inkwell::OptimizationLevel;
use rustc_hash::FxHashMap;

use pizza_ast::Prototype;

use crate::scope::ScopeStack;

/// A lowering failure, reported to the user as `LogError: <message>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenError {
    message: String,
}

impl CodegenError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        CodegenError {
            message: message.into(),
        }
    }
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CodegenError {}

impl From<BuilderError> for CodegenError {
    fn from(err: BuilderError) -> Self {
        CodegenError::new(err.to_string())
    }
}

/// The compilation context.
pub struct CodegenCx<'ctx> {
    pub(crate) llcx: &'ctx Context,
    pub(crate) module: Module<'ctx>,
    pub(crate) builder: Builder<'ctx>,
    pub(crate) target_machine: TargetMachine,
    /// Known-prototype registry: name → last-declared prototype. Outlives
    /// modules, so later modules can re-declare functions compiled into
    /// retired ones.
    protos: FxHashMap<String, Prototype>,
    pub(crate) scopes: ScopeStack<'ctx>,
    module_seq: usize,
}

impl<'ctx> CodegenCx<'ctx> {
    pub fn new(llcx: &'ctx Context) -> Result<Self, CodegenError> {
        let target_machine = host_target_machine()?;
        let module = llcx.create_module("pizza.0");
        configure_module(&module, &target_machine);

        Ok(CodegenCx {
            llcx,
            module,
            builder: llcx.create_builder(),
            target_machine,
            protos: FxHashMap::default(),
            scopes: ScopeStack::new(),
            module_seq: 0,
        })
    }

    /// The current module.
    pub fn module(&self) -> &Module<'ctx> {
        &self.module
    }

    /// Hand the current module over and allocate a fresh one.
    pub fn take_module(&mut self) -> Module<'ctx> {
        self.module_seq += 1;
        let fresh = self.llcx.create_module(&format!("pizza.{}", self.module_seq));
        configure_module(&fresh, &self.target_machine);
        std::mem::replace(&mut self.module, fresh)
    }

    /// Move a prototype into the registry, replacing any prior entry under
    /// the same name.
    pub fn register_prototype(&mut self, proto: Prototype) {
        self.protos.insert(proto.name.clone(), proto);
    }

    /// The registered prototype for `name`, if any.
    pub fn known_prototype(&self, name: &str) -> Option<&Prototype> {
        self.protos.get(name)
    }

    /// Resolve a function: the current module first, then the registry.
    /// A registry hit re-declares the prototype into the current module.
    pub(crate) fn get_function(&mut self, name: &str) -> Option<FunctionValue<'ctx>> {
        if let Some(function) = self.module.get_function(name) {
            return Some(function);
        }
        if let Some(proto) = self.protos.get(name) {
            let proto = proto.clone();
            return Some(self.lower_prototype(&proto));
        }
        None
    }

    pub(crate) fn f64_type(&self) -> FloatType<'ctx> {
        self.llcx.f64_type()
    }

    pub(crate) fn const_f64(&self, value: f64) -> FloatValue<'ctx> {
        self.f64_type().const_float(value)
    }

    /// Allocate an f64 stack slot in the entry block of `function`,
    /// keeping allocas grouped where mem2reg expects them.
    pub(crate) fn create_entry_block_alloca(
        &self,
        function: FunctionValue<'ctx>,
        name: &str,
    ) -> Result<PointerValue<'ctx>, CodegenError> {
        let entry = function
            .get_first_basic_block()
            .ok_or_else(|| CodegenError::new("function has no entry block"))?;
        let builder = self.llcx.create_builder();
        match entry.get_first_instruction() {
            Some(first) => builder.position_before(&first),
            None => builder.position_at_end(entry),
        }
        Ok(builder.build_alloca(self.f64_type(), name)?)
    }
}

fn host_target_machine() -> Result<TargetMachine, CodegenError> {
    Target::initialize_native(&InitializationConfig::default()).map_err(CodegenError::new)?;
    let triple = TargetMachine::get_default_triple();
    let target = Target::from_triple(&triple).map_err(|e| CodegenError::new(e.to_string()))?;
    target
        .create_target_machine(
            &triple,
            &TargetMachine::get_host_cpu_name().to_string(),
            &TargetMachine::get_host_cpu_features().to_string(),
            OptimizationLevel::Default,
            RelocMode::Default,
            CodeModel::JITDefault,
        )
        .ok_or_else(|| CodegenError::new("cannot create host target machine"))
}

fn configure_module(module: &Module<'_>, target_machine: &TargetMachine) {
    module.set_triple(&target_machine.get_triple());
    module.set_data_layout(&target_machine.get_target_data().get_data_layout());
}

#[cfg(test)]
mod tests {
    use inkwell::context::Context;

    use pizza_ast::{Prototype, PrototypeKind};

    use super::CodegenCx;

    #[test]
    fn take_module_starts_fresh() {
        let llcx = Context::create();
        let mut cx = CodegenCx::new(&llcx).expect("codegen context");
        let proto = Prototype::new("f", vec!["x".into()], PrototypeKind::Function);
        cx.lower_prototype(&proto);
        assert!(cx.module().get_function("f").is_some());

        let old = cx.take_module();
        assert!(old.get_function("f").is_some());
        assert!(cx.module().get_function("f").is_none());
    }

    #[test]
    fn registry_redeclares_into_fresh_modules() {
        let llcx = Context::create();
        let mut cx = CodegenCx::new(&llcx).expect("codegen context");
        cx.register_prototype(Prototype::new(
            "g",
            vec!["a".into(), "b".into()],
            PrototypeKind::Function,
        ));

        let _ = cx.take_module();
        let function = cx.get_function("g").expect("registry hit");
        assert_eq!(function.count_params(), 2);
        // the redeclaration landed in the current module
        assert!(cx.module().get_function("g").is_some());
    }

    #[test]
    fn unknown_functions_miss_both_tiers() {
        let llcx = Context::create();
        let mut cx = CodegenCx::new(&llcx).expect("codegen context");
        assert!(cx.get_function("nope").is_none());
    }
}
