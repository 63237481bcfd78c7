//! Parser module: node storage, access helpers and the parser state machine.

pub mod base;
pub use base::{NodeIndex, NodeList};

pub mod node;
pub use node::{Node, NodeArena, NodeData, NodeFlags, NodeKind};

mod node_access;
pub use node_access::Ancestors;
mod node_arena;

pub mod state;
pub use state::{ParseDiagnostic, ParserState};

mod state_expressions;
mod state_statements;
