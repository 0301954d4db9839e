//! Secret variable identities and maps keyed by them.
//!
//! A [`Secret`] is an opaque handle, not a value: the scalar a secret is
//! bound to (a witness, a randomizer, a response) always lives in a
//! [`SecretMap`] owned by the caller or by ephemeral prover/verifier state.
//! Two secrets are equal iff they are the same handle — a secret may be
//! cloned and reused across many leaves of an expression tree, and every
//! reoccurrence is required to resolve to the same response.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SECRET_ID: AtomicU64 = AtomicU64::new(0);

/// An opaque handle identifying one secret (witness) variable.
///
/// Obtained from [`Secret::new`], a per-process allocator. Equality and
/// hashing are by handle, not by any bound value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Secret(u64);

impl Secret {
    /// Allocates a fresh, globally unique secret identity.
    pub fn new() -> Self {
        Self(NEXT_SECRET_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric identity, exposed for diagnostics. Statement hashing
    /// never depends on this value being stable across processes — only
    /// expression-local occurrence counts matter.
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl Default for Secret {
    fn default() -> Self {
        Self::new()
    }
}

/// A map from [`Secret`] to a value, with no ordering guarantees — callers
/// (randomizer draws, response consistency dictionaries) must not depend on
/// iteration order.
#[derive(Clone, Debug, Default)]
pub struct SecretMap<V>(HashMap<Secret, V>);

impl<V> SecretMap<V> {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn get(&self, secret: &Secret) -> Option<&V> {
        self.0.get(secret)
    }

    pub fn insert(&mut self, secret: Secret, value: V) -> Option<V> {
        self.0.insert(secret, value)
    }

    pub fn contains(&self, secret: &Secret) -> bool {
        self.0.contains_key(secret)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Secret, &V)> {
        self.0.iter()
    }

    /// Merges `other` into `self`, keeping `self`'s value on conflict — used
    /// to extend a randomizer/response map with slots for secrets it does
    /// not yet cover: pre-filled slots from an outer caller are honored,
    /// missing slots are drawn fresh.
    pub fn extend_missing(&mut self, other: impl IntoIterator<Item = (Secret, V)>) {
        for (secret, value) in other {
            self.0.entry(secret).or_insert(value);
        }
    }
}

impl<V: Clone> SecretMap<V> {
    /// Restricts this map to just the given secrets, used by AND/OR to
    /// filter a merged witness map down to what one child declares.
    pub fn filter_to(&self, secrets: &[Secret]) -> Self {
        let mut out = Self::new();
        for secret in secrets {
            if let Some(value) = self.0.get(secret) {
                out.insert(*secret, value.clone());
            }
        }
        out
    }
}

impl<V> FromIterator<(Secret, V)> for SecretMap<V> {
    fn from_iter<T: IntoIterator<Item = (Secret, V)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_unique_and_compare_by_identity() {
        let a = Secret::new();
        let b = Secret::new();
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn filter_to_keeps_only_requested_secrets() {
        let a = Secret::new();
        let b = Secret::new();
        let mut map = SecretMap::new();
        map.insert(a, 1u64);
        map.insert(b, 2u64);
        let filtered = map.filter_to(&[a]);
        assert_eq!(filtered.get(&a), Some(&1));
        assert_eq!(filtered.get(&b), None);
    }
}
