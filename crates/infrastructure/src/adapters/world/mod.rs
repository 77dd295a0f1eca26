//! In-memory world
//!
//! One shared state behind every world-facing port: members, properties,
//! accounts, settlements, reputation, storages, the company registry, the
//! change feed, messaging and display invalidation. Change events are
//! delivered to listeners after the state lock is released and before the
//! mutating call returns, the way the game delivers them.
//!
//! Besides the port implementations it offers seeding helpers for hosts and
//! tests, inspection of everything the company core did, and a handful of
//! `corrupt_*` helpers that break invariants behind the core's back so that
//! the self-checks have something to repair.

mod accounts;
mod feed;
mod members;
mod messaging;
mod properties;
mod registry;
mod reputation;
mod settlements;

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt,
    sync::Arc,
};

use application::ports::{
    ChangeEvent, ChangeListener, DisplayScope, WatchHandle, WatchTarget, WorldClockPort,
};
use domain::{
    Account, AccountId, Company, CompanyId, CurrencyId, Member, MemberId, Notice,
    OwnerChangeKind, Property, PropertyId, ReputationSource, SECONDS_PER_DAY, Settlement,
    SettlementId, SharedStorage, StorageId, WorldPosition,
};
use parking_lot::RwLock;
use tracing::debug;

pub use settlements::SettlementRules;

/// Where a notice was delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeChannel {
    /// Shown to one member
    Member(MemberId),
    /// Delivered to a member's mailbox
    Mailbox(MemberId),
    /// Shown to everyone
    Everyone,
}

/// A notice the world delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotice {
    pub channel: NoticeChannel,
    pub notice: Notice,
}

/// An ownership transfer the world carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerTransfer {
    pub property: PropertyId,
    pub before: Option<MemberId>,
    pub after: Option<MemberId>,
    pub kind: OwnerChangeKind,
}

/// A change to a settlement roster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterChange {
    pub settlement: SettlementId,
    pub member: MemberId,
    pub joined: bool,
    pub employer_driven: bool,
    pub forced: bool,
}

#[derive(Debug)]
struct SettlementRecord {
    settlement: Settlement,
    citizens: BTreeSet<MemberId>,
    applicants: BTreeSet<MemberId>,
    invitations: BTreeSet<MemberId>,
    rules: SettlementRules,
}

#[derive(Debug, Default)]
struct ReputationBook {
    /// Contributions per target, keyed by source
    relations: HashMap<MemberId, HashMap<ReputationSource, f64>>,
    /// Given today, keyed by (giver, receiver)
    today: HashMap<(MemberId, MemberId), f64>,
    speaks_well_bonus: HashMap<MemberId, f64>,
    replenished: Vec<MemberId>,
}

#[derive(Debug, Default)]
struct WorldState {
    now: f64,
    members: HashMap<MemberId, Member>,
    /// Ordered by ID so that owner queries are stable
    properties: BTreeMap<PropertyId, Property>,
    claims: HashMap<WorldPosition, PropertyId>,
    influence: HashMap<PropertyId, SettlementId>,
    dirty_properties: BTreeSet<PropertyId>,
    transfers: Vec<OwnerTransfer>,
    rent_edits: Vec<(PropertyId, MemberId)>,
    fail_rent_editor: Option<String>,
    accounts: HashMap<AccountId, Account>,
    currencies: HashMap<CurrencyId, (MemberId, String)>,
    settlements: BTreeMap<SettlementId, SettlementRecord>,
    roster_log: Vec<RosterChange>,
    storages: BTreeMap<StorageId, SharedStorage>,
    reputation: ReputationBook,
    companies: BTreeMap<CompanyId, Company>,
    dirty_companies: BTreeSet<CompanyId>,
    notices: Vec<SentNotice>,
    invalidations: Vec<DisplayScope>,
}

impl WorldState {
    /// `base`, or `base` with the lowest free numeric suffix
    fn unique_name<'a>(base: &str, taken: impl Iterator<Item = &'a str> + Clone) -> String {
        let is_taken = |candidate: &str| taken.clone().any(|n| n.eq_ignore_ascii_case(candidate));
        if !is_taken(base) {
            return base.to_string();
        }
        (2u32..)
            .map(|n| format!("{base} {n}"))
            .find(|candidate| !is_taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

struct Subscription {
    handle: WatchHandle,
    target: WatchTarget,
    listener: Arc<dyn ChangeListener>,
}

/// The world the company core runs against, held entirely in memory
#[derive(Clone, Default)]
pub struct InMemoryWorld {
    state: Arc<RwLock<WorldState>>,
    subscriptions: Arc<RwLock<Vec<Subscription>>>,
}

impl fmt::Debug for InMemoryWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("InMemoryWorld")
            .field("members", &state.members.len())
            .field("properties", &state.properties.len())
            .field("companies", &state.companies.len())
            .field("subscriptions", &self.subscriptions.read().len())
            .finish_non_exhaustive()
    }
}

impl InMemoryWorld {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every listener of `target`, in subscription order
    async fn publish(&self, target: WatchTarget, event: ChangeEvent) {
        let listeners: Vec<Arc<dyn ChangeListener>> = self
            .subscriptions
            .read()
            .iter()
            .filter(|s| s.target == target)
            .map(|s| Arc::clone(&s.listener))
            .collect();
        if !listeners.is_empty() {
            debug!(?target, ?event, listeners = listeners.len(), "Publishing change");
        }
        for listener in listeners {
            listener.on_change(event).await;
        }
    }

    async fn publish_citizenship(
        &self,
        member: MemberId,
        before: Option<SettlementId>,
        after: Option<SettlementId>,
    ) {
        if before != after {
            self.publish(
                WatchTarget::Citizenship(member),
                ChangeEvent::CitizenshipChanged {
                    member,
                    before,
                    after,
                },
            )
            .await;
        }
    }

    // Seeding

    /// Add a player with a unique name
    pub fn add_member(&self, name: &str) -> MemberId {
        let mut state = self.state.write();
        let name = WorldState::unique_name(name, state.members.values().map(|m| m.name.as_str()));
        let member = Member::new(MemberId::new(), name);
        let id = member.id;
        state.members.insert(id, member);
        id
    }

    /// Insert or replace a member record as is
    pub fn put_member(&self, member: Member) {
        self.state.write().members.insert(member.id, member);
    }

    pub fn set_online(&self, member: MemberId, online: bool) {
        if let Some(m) = self.state.write().members.get_mut(&member) {
            m.online = online;
        }
    }

    /// Insert a property; its owner of record is taken as is, without events
    pub fn add_property(&self, property: Property) -> PropertyId {
        let id = property.id;
        self.state.write().properties.insert(id, property);
        id
    }

    /// Let `property` claim the plot at `position`
    pub fn claim_plot(&self, position: WorldPosition, property: PropertyId) {
        self.state.write().claims.insert(position, property);
    }

    /// Settlement whose influence `property` falls in, picked up on the next refresh
    pub fn set_influence(&self, property: PropertyId, settlement: SettlementId) {
        self.state.write().influence.insert(property, settlement);
    }

    pub fn add_account(&self, account: Account) -> AccountId {
        let id = account.id;
        self.state.write().accounts.insert(id, account);
        id
    }

    pub fn add_settlement(&self, settlement: Settlement) -> SettlementId {
        let id = settlement.id;
        self.state.write().settlements.insert(
            id,
            SettlementRecord {
                settlement,
                citizens: BTreeSet::new(),
                applicants: BTreeSet::new(),
                invitations: BTreeSet::new(),
                rules: SettlementRules::default(),
            },
        );
        id
    }

    pub fn set_settlement_rules(&self, settlement: SettlementId, rules: SettlementRules) {
        if let Some(record) = self.state.write().settlements.get_mut(&settlement) {
            record.rules = rules;
        }
    }

    /// Give `member` a standing invitation to `settlement`
    pub fn invite_to_settlement(&self, settlement: SettlementId, member: MemberId) {
        if let Some(record) = self.state.write().settlements.get_mut(&settlement) {
            record.invitations.insert(member);
        }
    }

    pub fn add_storage(&self, storage: SharedStorage) -> StorageId {
        let id = storage.id;
        self.state.write().storages.insert(id, storage);
        id
    }

    /// Record reputation given by `giver` to `receiver`
    pub fn give_reputation(&self, giver: MemberId, receiver: MemberId, amount: f64, today: bool) {
        let mut state = self.state.write();
        *state
            .reputation
            .relations
            .entry(receiver)
            .or_default()
            .entry(ReputationSource::Member(giver))
            .or_default() += amount;
        if today {
            *state.reputation.today.entry((giver, receiver)).or_default() += amount;
        }
    }

    pub fn set_speaks_well_bonus(&self, member: MemberId, bonus: f64) {
        self.state
            .write()
            .reputation
            .speaks_well_bonus
            .insert(member, bonus);
    }

    /// Make the next rent editor run fail with `reason`
    pub fn fail_rent_editor(&self, reason: impl Into<String>) {
        self.state.write().fail_rent_editor = Some(reason.into());
    }

    /// Move the world clock to `seconds`
    pub fn set_time(&self, seconds: f64) {
        self.state.write().now = seconds;
    }

    // Corruption, bypassing every rule and event

    pub fn corrupt_homestead(&self, member: MemberId, homestead: Option<PropertyId>) {
        if let Some(m) = self.state.write().members.get_mut(&member) {
            m.homestead = homestead;
        }
    }

    pub fn corrupt_citizenship(&self, member: MemberId, citizenship: Option<SettlementId>) {
        if let Some(m) = self.state.write().members.get_mut(&member) {
            m.citizenship = citizenship;
        }
    }

    pub fn corrupt_roster(&self, settlement: SettlementId, member: MemberId, present: bool) {
        if let Some(record) = self.state.write().settlements.get_mut(&settlement) {
            if present {
                record.citizens.insert(member);
            } else {
                record.citizens.remove(&member);
            }
        }
    }

    pub fn corrupt_owner(&self, property: PropertyId, owner: Option<MemberId>) {
        if let Some(p) = self.state.write().properties.get_mut(&property) {
            p.owner = owner;
        }
    }

    // Inspection

    pub fn member_record(&self, id: MemberId) -> Option<Member> {
        self.state.read().members.get(&id).cloned()
    }

    pub fn property_record(&self, id: PropertyId) -> Option<Property> {
        self.state.read().properties.get(&id).cloned()
    }

    pub fn account_record(&self, id: AccountId) -> Option<Account> {
        self.state.read().accounts.get(&id).cloned()
    }

    pub fn storage_record(&self, id: StorageId) -> Option<SharedStorage> {
        self.state.read().storages.get(&id).cloned()
    }

    pub fn company_record(&self, id: CompanyId) -> Option<Company> {
        self.state.read().companies.get(&id).cloned()
    }

    /// Issuer and name of a currency
    pub fn currency_record(&self, id: CurrencyId) -> Option<(MemberId, String)> {
        self.state.read().currencies.get(&id).cloned()
    }

    pub fn citizens_of(&self, settlement: SettlementId) -> Vec<MemberId> {
        self.state
            .read()
            .settlements
            .get(&settlement)
            .map(|r| r.citizens.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn applicants_of(&self, settlement: SettlementId) -> Vec<MemberId> {
        self.state
            .read()
            .settlements
            .get(&settlement)
            .map(|r| r.applicants.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Reputation `source` currently contributes to `target`
    pub fn contribution(&self, target: MemberId, source: ReputationSource) -> f64 {
        self.state
            .read()
            .reputation
            .relations
            .get(&target)
            .and_then(|r| r.get(&source))
            .copied()
            .unwrap_or_default()
    }

    pub fn replenished(&self) -> Vec<MemberId> {
        self.state.read().reputation.replenished.clone()
    }

    pub fn notices(&self) -> Vec<SentNotice> {
        self.state.read().notices.clone()
    }

    pub fn notice_texts(&self) -> Vec<String> {
        self.state
            .read()
            .notices
            .iter()
            .map(|n| n.notice.text.clone())
            .collect()
    }

    pub fn clear_notices(&self) {
        self.state.write().notices.clear();
    }

    pub fn invalidations(&self) -> Vec<DisplayScope> {
        self.state.read().invalidations.clone()
    }

    pub fn transfers(&self) -> Vec<OwnerTransfer> {
        self.state.read().transfers.clone()
    }

    pub fn roster_log(&self) -> Vec<RosterChange> {
        self.state.read().roster_log.clone()
    }

    pub fn rent_edits(&self) -> Vec<(PropertyId, MemberId)> {
        self.state.read().rent_edits.clone()
    }

    /// Drain the properties marked dirty since the last call
    pub fn take_dirty_properties(&self) -> Vec<PropertyId> {
        std::mem::take(&mut self.state.write().dirty_properties)
            .into_iter()
            .collect()
    }

    /// Drain the companies saved since the last call
    pub fn take_dirty_companies(&self) -> Vec<CompanyId> {
        std::mem::take(&mut self.state.write().dirty_companies)
            .into_iter()
            .collect()
    }

    /// Number of live subscriptions on `target`
    pub fn watcher_count(&self, target: WatchTarget) -> usize {
        self.subscriptions
            .read()
            .iter()
            .filter(|s| s.target == target)
            .count()
    }
}

impl WorldClockPort for InMemoryWorld {
    fn now_seconds(&self) -> f64 {
        self.state.read().now
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to u32 range
    fn day(&self) -> u32 {
        (self.state.read().now / SECONDS_PER_DAY)
            .floor()
            .clamp(0.0, f64::from(u32::MAX)) as u32
    }
}
