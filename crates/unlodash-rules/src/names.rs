//! Hygienic names for hoisted declarations.

use crate::resolver::ScopeResolver;
use rustc_hash::FxHashSet;
use tracing::trace;
use unlodash_binder::ScopeId;
use unlodash_common::limits::MAX_NAME_SUFFIX;

/// Hands out identifiers that collide neither with a binding visible from
/// the insertion scope nor with a name handed out earlier in the same unit.
#[derive(Debug, Default)]
pub struct NameAllocator {
    handed_out: FxHashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `base` if free, otherwise `base1`, `base2`, ... A name is free when it
    /// resolves from none of `scopes` and was not handed out before. Returns
    /// `None` only when every suffix up to `MAX_NAME_SUFFIX` is taken.
    pub fn allocate(
        &mut self,
        base: &str,
        scopes: &[ScopeId],
        resolver: &dyn ScopeResolver,
    ) -> Option<String> {
        let is_free = |name: &str, handed_out: &FxHashSet<String>| {
            !handed_out.contains(name)
                && scopes
                    .iter()
                    .all(|&scope| resolver.resolve(scope, name).is_none())
        };
        let name = if is_free(base, &self.handed_out) {
            base.to_string()
        } else {
            (1..=MAX_NAME_SUFFIX)
                .map(|n| format!("{base}{n}"))
                .find(|candidate| is_free(candidate.as_str(), &self.handed_out))?
        };
        trace!(base, name = %name, "allocated hoisted name");
        self.handed_out.insert(name.clone());
        Some(name)
    }

    /// Names handed out so far.
    pub fn is_handed_out(&self, name: &str) -> bool {
        self.handed_out.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::mock::MockResolver;
    use unlodash_binder::{DeclarationKind, Symbol};

    #[test]
    fn free_base_name_is_used_as_is() {
        let resolver = MockResolver::default();
        let mut names = NameAllocator::new();
        assert_eq!(
            names.allocate("collection", &[ScopeId(0)], &resolver).as_deref(),
            Some("collection")
        );
        assert!(names.is_handed_out("collection"));
    }

    #[test]
    fn visible_bindings_force_a_suffix() {
        let resolver = MockResolver::default()
            .with(Symbol::new("callback".into(), DeclarationKind::Const))
            .with(Symbol::new("callback1".into(), DeclarationKind::ImplicitGlobal));
        let mut names = NameAllocator::new();
        assert_eq!(
            names.allocate("callback", &[ScopeId(0)], &resolver).as_deref(),
            Some("callback2")
        );
    }

    #[test]
    fn names_are_unique_within_a_unit() {
        let resolver = MockResolver::default();
        let mut names = NameAllocator::new();
        let allocated: Vec<String> = (0..3)
            .filter_map(|_| names.allocate("collection", &[ScopeId(0)], &resolver))
            .collect();
        assert_eq!(allocated, vec!["collection", "collection1", "collection2"]);
    }
}
