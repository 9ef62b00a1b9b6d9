//! Expression tree for Pizza.
//!
//! Every top-level unit the parser produces is built from the types in this
//! crate: an [`Expr`] tree with exclusive ownership of its children, a
//! [`Prototype`] describing a function signature, and a [`Function`] pairing
//! the two. A closed enum with a tag dispatch is deliberate; every consumer
//! (the JSON dumper here, the lowering in `pizza_llvm`) walks all variants.
//!
//! # Modules
//!
//! - [`ast`]: the tree node types
//! - [`dump`]: JSON serialization of trees and prototypes

pub mod ast;
mod dump;

pub use ast::{Expr, Function, Prototype, PrototypeKind, ANON_FN_NAME};
