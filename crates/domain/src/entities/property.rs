//! Property records (deeds) and their plot sizing

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::value_objects::{MemberId, PropertyId, SettlementId};

/// Class of a property record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Standard,
    /// Eligible to be a primary residence, and so a company headquarters
    Homestead,
    Vehicle,
}

/// Plot allowance of a property that carries a claim stake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotSizing {
    /// Plots bought with claim papers
    pub claim_papers: u32,
    /// Plots currently allowed
    pub allowed_plots: u32,
    /// Base allowance forced by a company headquarters, if any
    pub base_override: Option<u32>,
    /// Whether the world may resize the claim on its own
    pub auto_resize: bool,
}

impl PlotSizing {
    pub const fn new(claim_papers: u32, base_plots: u32) -> Self {
        Self {
            claim_papers,
            allowed_plots: claim_papers.saturating_add(base_plots),
            base_override: None,
            auto_resize: true,
        }
    }

    pub const fn is_overridden(&self) -> bool {
        self.base_override.is_some()
    }

    /// Force the base allowance to `entitlement` and stop automatic resizing
    ///
    /// Returns whether anything changed.
    pub fn apply_override(&mut self, entitlement: u32) -> bool {
        let before = *self;
        self.base_override = Some(entitlement);
        self.auto_resize = false;
        self.resize(entitlement);
        before != *self
    }

    /// Drop the override and fall back to the world's base allowance
    pub fn remove_override(&mut self, base_plots: u32) -> bool {
        let before = *self;
        self.base_override = None;
        self.auto_resize = true;
        self.resize(base_plots);
        before != *self
    }

    fn resize(&mut self, base: u32) {
        let target = self.claim_papers.saturating_add(base);
        if target != self.allowed_plots {
            self.allowed_plots = target;
        }
    }
}

/// A property record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    pub kind: PropertyKind,
    pub owner: Option<MemberId>,
    /// Recorded creator of the claim
    pub creator: Option<MemberId>,
    /// Owner name shown on the world object
    pub owner_label: String,
    /// Who may use the property
    pub accessors: BTreeSet<MemberId>,
    pub residents: BTreeSet<MemberId>,
    /// Pending residency invitations
    pub resident_invitations: BTreeSet<MemberId>,
    pub allow_plots_unclaiming: bool,
    /// Settlement whose influence the property is in, if any
    pub settlement: Option<SettlementId>,
    pub plots: Option<PlotSizing>,
    pub color: Option<u32>,
}

impl Property {
    pub fn new(name: impl Into<String>, kind: PropertyKind, owner: Option<MemberId>) -> Self {
        Self {
            id: PropertyId::new(),
            name: name.into(),
            kind,
            owner,
            creator: owner,
            owner_label: String::new(),
            accessors: BTreeSet::new(),
            residents: BTreeSet::new(),
            resident_invitations: BTreeSet::new(),
            allow_plots_unclaiming: false,
            settlement: None,
            plots: None,
            color: None,
        }
    }

    #[must_use]
    pub const fn with_plots(mut self, plots: PlotSizing) -> Self {
        self.plots = Some(plots);
        self
    }

    #[must_use]
    pub const fn with_settlement(mut self, settlement: SettlementId) -> Self {
        self.settlement = Some(settlement);
        self
    }

    #[must_use]
    pub const fn with_color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub const fn is_homestead(&self) -> bool {
        matches!(self.kind, PropertyKind::Homestead)
    }

    pub const fn is_vehicle(&self) -> bool {
        matches!(self.kind, PropertyKind::Vehicle)
    }

    pub fn is_owned_by(&self, member: MemberId) -> bool {
        self.owner == Some(member)
    }
}

/// Name a vehicle takes when it is handed to a company
///
/// The previous owner's name is replaced with `replacement`. A trailing
/// numeric counter is swapped for `id_label`; without one, `id_label` is
/// appended.
pub fn vehicle_transfer_name(
    name: &str,
    previous_owner: Option<&str>,
    replacement: &str,
    id_label: &str,
) -> String {
    let renamed = match previous_owner {
        Some(previous) if !previous.is_empty() => name.replace(previous, replacement),
        _ => name.to_string(),
    };
    match renamed.rsplit_once(' ') {
        Some((head, last)) if last.parse::<u64>().is_ok() => format!("{head} {id_label}"),
        _ if renamed.parse::<u64>().is_ok() => id_label.to_string(),
        _ => format!("{renamed} {id_label}"),
    }
}
