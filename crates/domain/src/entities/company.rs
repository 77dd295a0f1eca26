//! Company aggregate - the roster and the assets a company holds in the world
//!
//! The roster is three disjoint groups: the leader, the members and the
//! invitees. Every mutator reports whether it actually changed anything so
//! that callers can gate their side effects on real transitions only.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Member;
use crate::errors::CompanyError;
use crate::reputation::{Polarity, ReputationSource};
use crate::value_objects::{AccountId, CompanyId, CurrencyId, MemberId};

/// The synthetic records allocated once when a company is founded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyAssets {
    /// Member that stands for the company in ownership and citizenship systems
    pub legal_identity: MemberId,
    /// The company's primary account
    pub treasury: AccountId,
    /// Currency the company issues as shares
    pub share_currency: CurrencyId,
}

/// Where a member stands with respect to one company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Leader,
    Employee,
    Invited,
    Outsider,
}

impl MembershipStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Leader => "You are the CEO of this company.",
            Self::Employee => "You are an employee of this company.",
            Self::Invited => "You have been invited to join this company.",
            Self::Outsider => "You are not an employee of this company.",
        }
    }
}

/// One shareholder and the fraction of shares they hold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShareholderHolding {
    pub holder: MemberId,
    pub share: f64,
}

/// A company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    /// Member that founded the company
    pub founder: MemberId,
    leader: Option<MemberId>,
    members: BTreeSet<MemberId>,
    invitees: BTreeSet<MemberId>,
    pub assets: CompanyAssets,
    pub founded_at: DateTime<Utc>,
}

impl Company {
    /// Found a company; the founder becomes its leader
    pub fn found(name: impl Into<String>, founder: MemberId, assets: CompanyAssets) -> Self {
        Self {
            id: CompanyId::new(),
            name: name.into(),
            founder,
            leader: Some(founder),
            members: BTreeSet::new(),
            invitees: BTreeSet::new(),
            assets,
            founded_at: Utc::now(),
        }
    }

    pub const fn leader(&self) -> Option<MemberId> {
        self.leader
    }

    pub const fn legal_identity(&self) -> MemberId {
        self.assets.legal_identity
    }

    pub const fn treasury(&self) -> AccountId {
        self.assets.treasury
    }

    /// Members excluding the leader
    pub fn members(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.members.iter().copied()
    }

    pub fn invitees(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.invitees.iter().copied()
    }

    /// Leader first, then every member
    pub fn all_employees(&self) -> Vec<MemberId> {
        self.leader.into_iter().chain(self.members.iter().copied()).collect()
    }

    pub fn employee_count(&self) -> usize {
        self.members.len() + usize::from(self.leader.is_some())
    }

    pub fn is_leader(&self, member: MemberId) -> bool {
        self.leader == Some(member)
    }

    pub fn is_employee(&self, member: MemberId) -> bool {
        self.is_leader(member) || self.members.contains(&member)
    }

    pub fn is_invited(&self, member: MemberId) -> bool {
        self.invitees.contains(&member)
    }

    pub fn membership_status(&self, member: MemberId) -> MembershipStatus {
        if self.is_leader(member) {
            MembershipStatus::Leader
        } else if self.is_employee(member) {
            MembershipStatus::Employee
        } else if self.is_invited(member) {
            MembershipStatus::Invited
        } else {
            MembershipStatus::Outsider
        }
    }

    /// The leader holds every share
    pub fn shareholders(&self) -> Vec<ShareholderHolding> {
        self.leader
            .map(|holder| ShareholderHolding { holder, share: 1.0 })
            .into_iter()
            .collect()
    }

    /// The synthetic reputation source standing in for this company
    pub const fn accumulator(&self, polarity: Polarity) -> ReputationSource {
        ReputationSource::Accumulator {
            company: self.id,
            polarity,
        }
    }

    pub fn add_invitee(&mut self, member: MemberId) -> bool {
        if self.is_employee(member) {
            return false;
        }
        self.invitees.insert(member)
    }

    pub fn remove_invitee(&mut self, member: MemberId) -> bool {
        self.invitees.remove(&member)
    }

    /// Add a member; the leader is never added to the member set
    pub fn add_member(&mut self, member: MemberId) -> bool {
        if self.is_leader(member) {
            return false;
        }
        self.invitees.remove(&member);
        self.members.insert(member)
    }

    pub fn remove_member(&mut self, member: MemberId) -> bool {
        self.members.remove(&member)
    }

    /// Make `new_leader` the leader, moving the previous leader into the members
    ///
    /// Returns false when `new_leader` already leads the company.
    pub fn promote(&mut self, new_leader: MemberId) -> bool {
        if self.is_leader(new_leader) {
            return false;
        }
        self.members.remove(&new_leader);
        self.invitees.remove(&new_leader);
        if let Some(previous) = self.leader.replace(new_leader) {
            self.members.insert(previous);
        }
        true
    }

    /// Step `current` down to a regular member, leaving the company leaderless
    pub fn demote(&mut self, current: MemberId) -> bool {
        if !self.is_leader(current) {
            return false;
        }
        self.leader = None;
        self.members.insert(current);
        true
    }

    fn ensure_leader(&self, invoker: MemberId, action: String) -> Result<(), CompanyError> {
        if self.is_leader(invoker) {
            Ok(())
        } else {
            Err(CompanyError::NotAuthorized {
                action,
                company: self.name.clone(),
            })
        }
    }

    pub fn ensure_can_invite(&self, invoker: MemberId, target: &Member) -> Result<(), CompanyError> {
        self.ensure_leader(invoker, format!("invite {} to {}", target.name, self.name))?;
        if self.is_invited(target.id) {
            return Err(CompanyError::AlreadyInvited {
                target: target.name.clone(),
                company: self.name.clone(),
            });
        }
        if self.is_employee(target.id) {
            return Err(CompanyError::AlreadyEmployed {
                target: target.name.clone(),
                company: self.name.clone(),
            });
        }
        Ok(())
    }

    pub fn ensure_can_revoke(&self, invoker: MemberId, target: &Member) -> Result<(), CompanyError> {
        self.ensure_leader(
            invoker,
            format!("withdraw the invite of {} to {}", target.name, self.name),
        )?;
        if !self.is_invited(target.id) {
            return Err(CompanyError::NotInvited {
                action: "withdraw the invite".to_string(),
                target: target.name.clone(),
                company: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Checks that only concern this company; employment elsewhere is checked by the caller
    pub fn ensure_can_join(&self, target: &Member) -> Result<(), CompanyError> {
        if !self.is_invited(target.id) {
            return Err(CompanyError::NotInvited {
                action: format!("join {}", self.name),
                target: target.name.clone(),
                company: self.name.clone(),
            });
        }
        Ok(())
    }

    pub fn ensure_can_leave(&self, target: &Member) -> Result<(), CompanyError> {
        self.ensure_departure(target, format!("resign from {}", self.name))
    }

    pub fn ensure_can_fire(&self, invoker: MemberId, target: &Member) -> Result<(), CompanyError> {
        let action = format!("fire {} from {}", target.name, self.name);
        self.ensure_leader(invoker, action.clone())?;
        self.ensure_departure(target, action)
    }

    fn ensure_departure(&self, target: &Member, action: String) -> Result<(), CompanyError> {
        if !self.is_employee(target.id) {
            return Err(CompanyError::NotEmployed {
                action,
                target: target.name.clone(),
                company: self.name.clone(),
            });
        }
        if self.is_leader(target.id) {
            return Err(CompanyError::IsLeader {
                action,
                target: target.name.clone(),
                company: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// Base name of the legal identity member of a company
pub fn legal_identity_name(company_name: &str) -> String {
    format!("{company_name} Legal Person")
}

/// Base name of the treasury account of a company
pub fn treasury_account_name(company_name: &str) -> String {
    format!("{company_name} Account")
}

/// Base name of the share currency of a company
pub fn share_currency_name(company_name: &str) -> String {
    format!("{company_name} Shares")
}

/// Name given to a company's headquarters property
pub fn headquarters_name(company_name: &str) -> String {
    format!("{company_name} HQ")
}
