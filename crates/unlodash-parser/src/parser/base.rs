//! Base index types shared by the arena and the binder.

use serde::Serialize;
use smallvec::SmallVec;

/// Index of a node in a `NodeArena`.
///
/// `NodeIndex::NONE` marks an absent optional child (no initializer, no
/// else-branch, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != u32::MAX
    }

    /// `Some(self)` unless this is `NONE`.
    #[inline]
    pub const fn into_option(self) -> Option<NodeIndex> {
        if self.is_none() { None } else { Some(self) }
    }
}

/// An ordered list of child nodes (statements, arguments, elements).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeList {
    pub nodes: SmallVec<[NodeIndex; 4]>,
}

impl NodeList {
    pub fn new() -> Self {
        NodeList::default()
    }

    pub fn from_vec(nodes: Vec<NodeIndex>) -> Self {
        NodeList {
            nodes: SmallVec::from_vec(nodes),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<NodeIndex> {
        self.nodes.get(i).copied()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes.iter().copied()
    }
}
