//! Settlements

use serde::{Deserialize, Serialize};

use crate::value_objects::{MemberId, SettlementId};

/// A settlement; its citizen roster lives with the settlement system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub name: String,
    /// Enclosing settlement, if this one is part of a larger one
    pub parent: Option<SettlementId>,
    /// Member who approves applications; `None` admits applicants directly
    pub approver: Option<MemberId>,
}

impl Settlement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SettlementId::new(),
            name: name.into(),
            parent: None,
            approver: None,
        }
    }

    #[must_use]
    pub const fn with_parent(mut self, parent: SettlementId) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub const fn with_approver(mut self, approver: MemberId) -> Self {
        self.approver = Some(approver);
        self
    }
}
