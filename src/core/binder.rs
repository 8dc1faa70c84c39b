//! Keyed reconciliation of a dataset against previously rendered keys.
//!
//! The diff is pure: it classifies keys and leaves applying the result to the
//! scene layer (`render::ShapeLayer`).

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Three-way partition of keys between two reconciliation passes.
///
/// `enter` and `update` follow the order of the new keys; `exit` follows the
/// order of the previous keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Join<K> {
    pub enter: Vec<K>,
    pub update: Vec<K>,
    pub exit: Vec<K>,
}

impl<K> Default for Join<K> {
    fn default() -> Self {
        Self {
            enter: Vec::new(),
            update: Vec::new(),
            exit: Vec::new(),
        }
    }
}

impl<K> Join<K> {
    #[must_use]
    pub fn is_pure_update(&self) -> bool {
        self.enter.is_empty() && self.exit.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.enter.len() + self.update.len() + self.exit.len()
    }
}

/// Classifies every previous and next key into exactly one of enter, update
/// or exit. Duplicate keys in `next` bind once, at their first position.
#[must_use]
pub fn reconcile<K>(previous: &[K], next: &[K]) -> Join<K>
where
    K: Clone + Eq + Hash,
{
    let before: HashSet<&K> = previous.iter().collect();
    let mut seen: HashSet<&K> = HashSet::with_capacity(next.len());
    let mut join = Join::default();

    for key in next {
        if !seen.insert(key) {
            continue;
        }
        if before.contains(key) {
            join.update.push(key.clone());
        } else {
            join.enter.push(key.clone());
        }
    }

    let mut exited: HashSet<&K> = HashSet::new();
    for key in previous {
        if !seen.contains(key) && exited.insert(key) {
            join.exit.push(key.clone());
        }
    }

    join
}

#[cfg(test)]
mod tests {
    use super::reconcile;

    #[test]
    fn classifies_keys_into_three_sets() {
        let join = reconcile(&["a", "b", "c"], &["c", "d", "a"]);
        assert_eq!(join.enter, vec!["d"]);
        assert_eq!(join.update, vec!["c", "a"]);
        assert_eq!(join.exit, vec!["b"]);
        assert_eq!(join.total(), 4);
    }

    #[test]
    fn same_keys_are_a_pure_update() {
        let join = reconcile(&[1, 2, 3], &[1, 2, 3]);
        assert!(join.is_pure_update());
        assert_eq!(join.update, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_next_keys_bind_once() {
        let join = reconcile(&[], &["x", "x", "y"]);
        assert_eq!(join.enter, vec!["x", "y"]);
    }
}
