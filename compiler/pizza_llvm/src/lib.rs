//! LLVM backend for Pizza.
//!
//! Lowers expression trees to LLVM IR through inkwell and executes
//! top-level units through a JIT. Every Pizza value is an `f64`; every
//! function is `double(double, …)` with external linkage.
//!
//! # Architecture
//!
//! - [`CodegenCx`](context::CodegenCx): the compilation context, holding the LLVM
//!   context/module/builder, the known-prototype registry, and the lexical
//!   symbol-table stack. Expression lowering is implemented on it, split
//!   across `expr`/`operators`/`control_flow`/`functions`.
//! - [`Jit`](jit::Jit): module ownership and symbol resolution. Definition
//!   modules are added permanently; anonymous top-level units run under a
//!   [`ResourceTracker`](jit::ResourceTracker) and are retired after the
//!   call.
//! - [`runtime`]: host-exported `print`/`printchar` helpers, wired into
//!   JITted modules by explicit global mappings.
//!
//! # Debugging
//!
//! Lowering and JIT transfers emit `tracing` events under the
//! `pizza_llvm` target; enable with `PIZZA_LOG=pizza_llvm=trace`.

pub mod context;
pub mod jit;
pub mod runtime;

mod control_flow;
mod expr;
mod functions;
mod operators;
mod scope;

pub use context::{CodegenCx, CodegenError};
pub use jit::{Jit, JitError, ResourceTracker};

#[cfg(test)]
mod tests;
