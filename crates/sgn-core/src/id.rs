//! [`UniqueId`]: the identifier shared by every pad and element.

use derive_more::{Debug as DeriveDebug, Display};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An internally-generated unique identifier paired with an optional
/// user-supplied display name.
///
/// Equality and hashing are based solely on the identifier: two `UniqueId`s
/// with different names but the same underlying id are equal, and a rename
/// never changes hashing. Names exist purely for display and for the
/// pipeline-level name registry, which enforces *its own* uniqueness rule on
/// top of this (see `sgn-runtime::Pipeline`).
#[derive(Clone, DeriveDebug, Display, Serialize, Deserialize)]
#[display("{name}")]
pub struct UniqueId {
    id: Uuid,
    name: String,
}

impl UniqueId {
    /// Generate a fresh id. If `name` is empty, the id's hyphenated form is
    /// used as the display name, mirroring the reference implementation's
    /// fallback.
    pub fn new(name: impl Into<String>) -> Self {
        let id = Uuid::now_v7();
        let name = name.into();
        let name = if name.is_empty() {
            id.to_string()
        } else {
            name
        };
        Self { id, name }
    }

    /// The underlying identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for UniqueId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for UniqueId {}

impl std::hash::Hash for UniqueId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_id_based() {
        let a = UniqueId::new("same-name");
        let b = UniqueId::new("same-name");
        assert_ne!(a, b, "distinct ids with the same name must not be equal");
    }

    #[test]
    fn empty_name_falls_back_to_id() {
        let a = UniqueId::new("");
        assert_eq!(a.name(), a.id().to_string());
    }

    #[test]
    fn rename_does_not_affect_hash_input() {
        use std::collections::HashSet;
        let a = UniqueId::new("a");
        let mut set = HashSet::new();
        set.insert(a.clone());
        assert!(set.contains(&a));
    }
}
