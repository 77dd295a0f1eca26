//! Financial accounts

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::value_objects::{AccountId, MemberId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// A member's own account
    Personal { holder: MemberId },
    /// Treasury of a government
    Government,
    /// Any other account with an explicit manager and user list
    Shared,
}

/// A financial account and its permission lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub kind: AccountKind,
    pub managers: BTreeSet<MemberId>,
    pub users: BTreeSet<MemberId>,
}

impl Account {
    pub fn new(name: impl Into<String>, kind: AccountKind) -> Self {
        let mut managers = BTreeSet::new();
        if let AccountKind::Personal { holder } = kind {
            managers.insert(holder);
        }
        Self {
            id: AccountId::new(),
            name: name.into(),
            kind,
            users: managers.clone(),
            managers,
        }
    }

    pub const fn holder(&self) -> Option<MemberId> {
        match self.kind {
            AccountKind::Personal { holder } => Some(holder),
            _ => None,
        }
    }

    /// Accounts of this kind can be taken over by a company
    pub const fn is_shared(&self) -> bool {
        matches!(self.kind, AccountKind::Shared)
    }

    pub fn is_managed_by(&self, member: MemberId) -> bool {
        self.managers.contains(&member)
    }
}
