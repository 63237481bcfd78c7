//! Lexical scope binder for the unlodash rewriter.
//!
//! This crate provides:
//! - `BinderState` - builds persistent scopes and symbols for a parsed file
//! - `Scope`, `ScopeId`, `ContainerKind` - the scope tree
//! - `Symbol`, `SymbolId`, `DeclarationKind` - bindings and how they were declared
//! - `Reference`, `AccessKind` - every read and write of a binding

pub mod scopes;
pub use scopes::{ContainerKind, Scope, ScopeId};

pub mod symbols;
pub use symbols::{AccessKind, DeclarationKind, Reference, Symbol, SymbolId};

pub mod state;
pub use state::BinderState;

mod state_binding;
