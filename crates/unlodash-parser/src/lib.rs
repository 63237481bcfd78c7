//! JavaScript parser and AST types for the unlodash rewriter.
//!
//! This crate provides:
//! - `NodeArena` - arena storage for AST nodes with parent links and byte ranges
//! - `Node`, `NodeKind`, `NodeData` - the closed set of node shapes
//! - `ParserState` - recursive-descent parser for ECMAScript 2022 scripts and modules

pub mod parser;

pub use parser::{
    Node, NodeArena, NodeData, NodeFlags, NodeIndex, NodeKind, NodeList, ParseDiagnostic,
    ParserState,
};
