//! Game actions - the events a company submits to the world's action pipeline
//!
//! Roster transitions are submitted before they are applied so that every
//! validator in the world gets a chance to refuse them. Money movements are
//! re-emitted as company-scoped economic events.

use serde::{Deserialize, Serialize};

use crate::value_objects::{AccountId, CurrencyId, MemberId};

/// A raw movement of money between two accounts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoneyTransfer {
    pub source: AccountId,
    pub target: AccountId,
    pub currency: CurrencyId,
    pub amount: f64,
}

/// All actions the company core submits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameAction {
    /// A citizen is about to join a company
    CitizenJoinCompany {
        citizen: MemberId,
        company_legal_identity: MemberId,
    },

    /// A citizen is about to leave a company
    CitizenLeaveCompany {
        citizen: MemberId,
        company_legal_identity: MemberId,
        /// Involuntary departure
        fired: bool,
    },

    /// Money arrived in a company-owned account
    CompanyIncome {
        transfer: MoneyTransfer,
        receiver_legal_identity: MemberId,
    },

    /// Money left a company-owned account
    CompanyExpense {
        transfer: MoneyTransfer,
        sender_legal_identity: MemberId,
    },

    /// An employee's personal account received money
    CompanyEmployeeIncome {
        transfer: MoneyTransfer,
        receiver: MemberId,
    },

    /// An employee's personal account paid money
    CompanyEmployeeExpense {
        transfer: MoneyTransfer,
        sender: MemberId,
    },

    /// An employee's personal balance settled after one or more changes
    CompanyEmployeeWealthChanged {
        account: AccountId,
        affected_citizen: Option<MemberId>,
    },
}

impl GameAction {
    /// Short name used in logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CitizenJoinCompany { .. } => "citizen_join_company",
            Self::CitizenLeaveCompany { .. } => "citizen_leave_company",
            Self::CompanyIncome { .. } => "company_income",
            Self::CompanyExpense { .. } => "company_expense",
            Self::CompanyEmployeeIncome { .. } => "company_employee_income",
            Self::CompanyEmployeeExpense { .. } => "company_employee_expense",
            Self::CompanyEmployeeWealthChanged { .. } => "company_employee_wealth_changed",
        }
    }
}

/// A batch of actions validated and committed together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionPack {
    pub actions: Vec<GameAction>,
}

impl ActionPack {
    pub fn single(action: GameAction) -> Self {
        Self {
            actions: vec![action],
        }
    }

    #[must_use]
    pub fn with(mut self, action: GameAction) -> Self {
        self.actions.push(action);
        self
    }
}

/// Outcome of submitting an action pack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionVerdict {
    Accepted,
    Rejected { reason: String },
}

impl ActionVerdict {
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// How an ownership transfer should be announced by the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerChangeKind {
    Normal,
    AdminCommand,
}
