//! Call-site matching: `<alias>.<method>(collection, callback, ...)`.

use crate::config::RuleConfig;
use smallvec::SmallVec;
use unlodash_common::Span;
use unlodash_parser::{NodeArena, NodeData, NodeFlags, NodeIndex, NodeKind};

/// A matched call. Argument indices point into the arena the call was
/// matched in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    pub call: NodeIndex,
    /// The alias identifier node (`_` in `_.map(...)`).
    pub alias: NodeIndex,
    pub collection: NodeIndex,
    pub callback: NodeIndex,
    /// `thisArg`, when given.
    pub context: Option<NodeIndex>,
    /// Arguments after `thisArg`; lodash ignores them but they are
    /// evaluated, so rewrites keep them.
    pub extra: SmallVec<[NodeIndex; 2]>,
    pub range: Span,
}

impl CallSite {
    /// Every argument after the collection, in order.
    pub fn trailing_arguments(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        std::iter::once(self.callback)
            .chain(self.context)
            .chain(self.extra.iter().copied())
    }

    /// Arguments after the callback.
    pub fn arguments_after_callback(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.trailing_arguments().skip(1)
    }
}

/// Try to read `node` as a call site for `config`.
pub fn match_call_site(
    arena: &NodeArena,
    config: &RuleConfig,
    node: NodeIndex,
) -> Option<CallSite> {
    let call = arena.get(node)?;
    if call.kind != NodeKind::CallExpression || call.flags.contains(NodeFlags::OPTIONAL_CHAIN) {
        return None;
    }
    let NodeData::Call {
        expression: callee,
        ref arguments,
        ..
    } = call.data
    else {
        return None;
    };

    let callee_node = arena.get(callee)?;
    if callee_node.kind != NodeKind::PropertyAccessExpression
        || callee_node.flags.contains(NodeFlags::OPTIONAL_CHAIN)
    {
        return None;
    }
    let NodeData::Access {
        expression: alias,
        name_or_argument: method,
    } = callee_node.data
    else {
        return None;
    };
    if arena.kind(alias) != Some(NodeKind::Identifier)
        || arena.get_identifier_text(alias) != Some(config.alias_name.as_str())
        || arena.kind(method) != Some(NodeKind::Identifier)
        || arena.get_identifier_text(method) != Some(config.map_method_name.as_str())
    {
        return None;
    }

    if arguments.len() < 2
        || arguments
            .iter()
            .take(2)
            .any(|arg| arena.kind(arg) == Some(NodeKind::SpreadElement))
    {
        return None;
    }

    Some(CallSite {
        call: node,
        alias,
        collection: arguments.get(0)?,
        callback: arguments.get(1)?,
        context: arguments.get(2),
        extra: arguments.iter().skip(3).collect(),
        range: call.span(),
    })
}

/// Pre-order walk yielding call sites in document order.
///
/// The walk keeps its own stack, so tree depth is bounded only by memory.
pub struct CallSiteMatcher<'a> {
    arena: &'a NodeArena,
    config: &'a RuleConfig,
    stack: Vec<NodeIndex>,
}

impl<'a> CallSiteMatcher<'a> {
    pub fn new(arena: &'a NodeArena, config: &'a RuleConfig, root: NodeIndex) -> Self {
        let mut stack = Vec::with_capacity(64);
        if root.is_some() {
            stack.push(root);
        }
        Self {
            arena,
            config,
            stack,
        }
    }
}

impl Iterator for CallSiteMatcher<'_> {
    type Item = CallSite;

    fn next(&mut self) -> Option<CallSite> {
        while let Some(idx) = self.stack.pop() {
            let Some(node) = self.arena.get(idx) else {
                continue;
            };
            let mut children: SmallVec<[NodeIndex; 8]> = SmallVec::new();
            node.data.for_each_child(|child| children.push(child));
            self.stack.extend(children.into_iter().rev());

            if let Some(site) = match_call_site(self.arena, self.config, idx) {
                return Some(site);
            }
        }
        None
    }
}
