//! NodeArena creation methods.
//!
//! Nodes are created bottom-up: children first, then the parent, whose
//! creation stamps the parent link into each child.

use super::base::NodeIndex;
use super::node::*;
use std::sync::Arc;

impl NodeArena {
    /// Maximum pre-allocation to avoid capacity overflow in huge files.
    const MAX_NODE_PREALLOC: usize = 5_000_000;

    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    /// Create an arena with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> NodeArena {
        NodeArena {
            nodes: Vec::with_capacity(capacity.min(Self::MAX_NODE_PREALLOC)),
            text: Arc::from(""),
        }
    }

    /// Set the source text the node ranges refer to (called by the parser).
    pub fn set_source_text(&mut self, text: Arc<str>) {
        self.text = text;
    }

    /// Full source text of the parsed unit.
    #[inline]
    pub fn source_text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Append a node and link its children to it.
    pub fn add(
        &mut self,
        kind: NodeKind,
        flags: NodeFlags,
        pos: u32,
        end: u32,
        data: NodeData,
    ) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        data.for_each_child(|child| self.set_parent(child, index));
        self.nodes.push(Node {
            kind,
            flags,
            pos,
            end,
            parent: NodeIndex::NONE,
            data,
        });
        index
    }

    /// Leaf node (token, literal, keyword expression).
    #[inline]
    pub fn add_token(&mut self, kind: NodeKind, pos: u32, end: u32) -> NodeIndex {
        self.add(kind, NodeFlags::empty(), pos, end, NodeData::Token)
    }

    pub fn add_identifier(&mut self, pos: u32, end: u32, escaped_text: String) -> NodeIndex {
        self.add(
            NodeKind::Identifier,
            NodeFlags::empty(),
            pos,
            end,
            NodeData::Identifier { escaped_text },
        )
    }

    /// Drop every node created after `len`. Used to roll back speculative
    /// parses; nodes below `len` never point at nodes above it because
    /// children are always older than their parents.
    pub fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    #[inline]
    fn set_parent(&mut self, child: NodeIndex, parent: NodeIndex) {
        if let Some(node) = self.nodes.get_mut(child.0 as usize) {
            node.parent = parent;
        }
    }

    /// Stretch a node's end (used when a trailing token belongs to an
    /// already-built node, e.g. the `;` of a statement).
    pub fn set_end(&mut self, index: NodeIndex, end: u32) {
        if let Some(node) = self.nodes.get_mut(index.0 as usize) {
            node.end = end;
        }
    }

    /// Add flags to an existing node.
    pub fn add_flags(&mut self, index: NodeIndex, flags: NodeFlags) {
        if let Some(node) = self.nodes.get_mut(index.0 as usize) {
            node.flags |= flags;
        }
    }
}
