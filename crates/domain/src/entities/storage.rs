//! Shared storage containers

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::value_objects::{MemberId, StorageId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedStorage {
    pub id: StorageId,
    pub name: String,
    pub access: BTreeSet<MemberId>,
}

impl SharedStorage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: StorageId::new(),
            name: name.into(),
            access: BTreeSet::new(),
        }
    }

    pub fn can_access(&self, member: MemberId) -> bool {
        self.access.contains(&member)
    }

    /// Add every member not yet on the access list; returns how many were added
    pub fn grant<I: IntoIterator<Item = MemberId>>(&mut self, members: I) -> usize {
        members
            .into_iter()
            .filter(|m| self.access.insert(*m))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_is_unique() {
        let mut storage = SharedStorage::new("Vault");
        let a = MemberId::new();
        let b = MemberId::new();
        assert_eq!(storage.grant([a, b]), 2);
        assert_eq!(storage.grant([a]), 0);
        assert!(storage.can_access(b));
    }
}
