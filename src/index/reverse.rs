use crate::store::NamespacedName;
use dashmap::DashMap;
use std::collections::HashSet;

/// A reverse index from a referenced object's `"<name>.<namespace>"` key to
/// the set of `NamespacedName`s that currently reference it.
///
/// Rebuilt incrementally on every watch event, never by full listing in
/// steady state, per `spec.md` §9 "Design Notes".
#[derive(Default)]
pub struct ReverseIndex {
    referencer_to_targets: DashMap<NamespacedName, Vec<String>>,
    target_to_referencers: DashMap<String, HashSet<NamespacedName>>,
}

impl ReverseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything `referencer` points at with `targets`. Cheap
    /// no-op churn on an unchanged object is accepted; this is not on any
    /// hot path.
    pub fn update(&self, referencer: &NamespacedName, targets: Vec<String>) {
        if let Some(old) = self.referencer_to_targets.get(referencer) {
            for t in old.value() {
                if let Some(mut set) = self.target_to_referencers.get_mut(t) {
                    set.remove(referencer);
                }
            }
        }
        for t in &targets {
            self.target_to_referencers
                .entry(t.clone())
                .or_default()
                .insert(referencer.clone());
        }
        self.referencer_to_targets.insert(referencer.clone(), targets);
    }

    pub fn remove_referencer(&self, referencer: &NamespacedName) {
        self.update(referencer, Vec::new());
        self.referencer_to_targets.remove(referencer);
    }

    pub fn referencers_of(&self, target: &str) -> Vec<NamespacedName> {
        self.target_to_referencers
            .get(target)
            .map(|set| {
                let mut v: Vec<_> = set.iter().cloned().collect();
                v.sort();
                v
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nn(ns: &str, name: &str) -> NamespacedName {
        NamespacedName::new(ns, name)
    }

    #[test]
    fn update_then_lookup() {
        let idx = ReverseIndex::new();
        idx.update(&nn("ns1", "route1"), vec!["apple.ns1".to_string()]);
        assert_eq!(idx.referencers_of("apple.ns1"), vec![nn("ns1", "route1")]);
    }

    #[test]
    fn update_replaces_stale_targets() {
        let idx = ReverseIndex::new();
        idx.update(&nn("ns1", "route1"), vec!["apple.ns1".to_string()]);
        idx.update(&nn("ns1", "route1"), vec!["orange.ns1".to_string()]);
        assert!(idx.referencers_of("apple.ns1").is_empty());
        assert_eq!(idx.referencers_of("orange.ns1"), vec![nn("ns1", "route1")]);
    }

    #[test]
    fn multiple_referencers_of_same_target() {
        let idx = ReverseIndex::new();
        idx.update(&nn("ns1", "route1"), vec!["apple.ns1".to_string()]);
        idx.update(&nn("ns1", "route2"), vec!["apple.ns1".to_string()]);
        assert_eq!(idx.referencers_of("apple.ns1").len(), 2);
    }

    #[test]
    fn remove_referencer_clears_targets() {
        let idx = ReverseIndex::new();
        idx.update(&nn("ns1", "route1"), vec!["apple.ns1".to_string()]);
        idx.remove_referencer(&nn("ns1", "route1"));
        assert!(idx.referencers_of("apple.ns1").is_empty());
    }
}
