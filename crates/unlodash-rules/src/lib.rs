//! Rewrite rules for the unlodash rewriter.
//!
//! This crate provides:
//! - `PreferNativeMap` - flags `_.map(collection, callback)` and proposes the
//!   native `collection.map(callback)`, guarded by `Array.isArray` when the
//!   collection cannot be proven to be an array
//! - `ScopeResolver` - the scope queries the rule needs, with a binder-backed
//!   implementation (`BinderResolver`)
//! - `Finding`, `Fix` - the rule's output; fixes are plain text edits applied
//!   by the caller
//!
//! The pipeline for one call site: `matcher` finds it, `alias` vetoes it when
//! the alias was reassigned, `classify` tries to prove the collection's type,
//! `guard` looks for an enclosing `Array.isArray` check, and `synth` builds the
//! replacement (hoisting sub-expressions before the enclosing statement with
//! names from `names`, where `anchor` allows it).

pub mod alias;
pub mod anchor;
pub mod classify;
pub mod config;
pub mod guard;
pub mod matcher;
pub mod names;
pub mod resolver;
pub mod rule;
pub mod synth;
pub mod text;

pub use classify::{ArgumentShape, Classification};
pub use config::RuleConfig;
pub use guard::{Branch, GuardContext, GuardDecision, Polarity};
pub use matcher::{CallSite, CallSiteMatcher};
pub use resolver::{BinderResolver, Binding, ScopeResolver};
pub use rule::{Finding, Fix, MessageKind, PreferNativeMap};
pub use synth::{Disposition, Insertion, NoFixReason, Replacement, RewritePlan};
