//! Per-company mutual exclusion and re-entry guards
//!
//! Change notifications are delivered synchronously, so a handler running
//! under a company's lock can cause another notification for the same
//! company on the same task. The lock table is therefore re-entrant per
//! task: a task that already holds a company's lock runs nested work
//! directly. Other tasks wait.

use std::{
    collections::{BTreeSet, HashMap},
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use domain::CompanyId;
use parking_lot::Mutex;

tokio::task_local! {
    static HELD_COMPANIES: BTreeSet<CompanyId>;
}

/// One async mutex per company
#[derive(Debug, Default)]
pub(crate) struct CompanyLocks {
    locks: Mutex<HashMap<CompanyId, Arc<tokio::sync::Mutex<()>>>>,
}

impl CompanyLocks {
    fn lock_for(&self, company: CompanyId) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(self.locks.lock().entry(company).or_default())
    }

    /// Whether the current task holds `company`'s lock
    pub(crate) fn is_held(company: CompanyId) -> bool {
        HELD_COMPANIES
            .try_with(|held| held.contains(&company))
            .unwrap_or(false)
    }

    /// Run `work` while holding `company`'s lock
    pub(crate) async fn exclusive<F, T>(&self, company: CompanyId, work: F) -> T
    where
        F: Future<Output = T>,
    {
        if Self::is_held(company) {
            return work.await;
        }
        let lock = self.lock_for(company);
        let _guard = lock.lock().await;
        let mut held = HELD_COMPANIES.try_with(Clone::clone).unwrap_or_default();
        held.insert(company);
        HELD_COMPANIES.scope(held, work).await
    }

    pub(crate) fn forget(&self, company: CompanyId) {
        self.locks.lock().remove(&company);
    }
}

/// Money relays that must not re-enter themselves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayKind {
    Income,
    Expense,
    EmployeeIncome,
    EmployeeExpense,
}

/// Re-entry flags of one company
#[derive(Debug, Default)]
pub(crate) struct RelayGuards {
    income: AtomicBool,
    expense: AtomicBool,
    employee_income: AtomicBool,
    employee_expense: AtomicBool,
    owner_change_suppression: AtomicUsize,
}

impl RelayGuards {
    const fn flag(&self, kind: RelayKind) -> &AtomicBool {
        match kind {
            RelayKind::Income => &self.income,
            RelayKind::Expense => &self.expense,
            RelayKind::EmployeeIncome => &self.employee_income,
            RelayKind::EmployeeExpense => &self.employee_expense,
        }
    }

    /// Enter a relay; `None` while it is already running
    pub(crate) fn try_enter(&self, kind: RelayKind) -> Option<GuardToken<'_>> {
        let flag = self.flag(kind);
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GuardToken { flag })
    }

    /// Swallow owner-change notifications until the token is dropped
    pub(crate) fn suppress_owner_changes(&self) -> SuppressionToken<'_> {
        self.owner_change_suppression.fetch_add(1, Ordering::AcqRel);
        SuppressionToken {
            counter: &self.owner_change_suppression,
        }
    }

    pub(crate) fn owner_changes_suppressed(&self) -> bool {
        self.owner_change_suppression.load(Ordering::Acquire) > 0
    }
}

/// Releases a relay flag on drop
#[derive(Debug)]
pub(crate) struct GuardToken<'a> {
    flag: &'a AtomicBool,
}

impl Drop for GuardToken<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Ends an owner-change suppression on drop
#[derive(Debug)]
pub(crate) struct SuppressionToken<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for SuppressionToken<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Guards of every company
#[derive(Debug, Default)]
pub(crate) struct GuardTable {
    guards: Mutex<HashMap<CompanyId, Arc<RelayGuards>>>,
}

impl GuardTable {
    pub(crate) fn for_company(&self, company: CompanyId) -> Arc<RelayGuards> {
        Arc::clone(self.guards.lock().entry(company).or_default())
    }

    pub(crate) fn forget(&self, company: CompanyId) {
        self.guards.lock().remove(&company);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn relay_guard_blocks_reentry() {
        let guards = RelayGuards::default();
        let token = guards.try_enter(RelayKind::Income);
        assert!(token.is_some());
        assert!(guards.try_enter(RelayKind::Income).is_none());
        assert!(guards.try_enter(RelayKind::Expense).is_some());
        drop(token);
        assert!(guards.try_enter(RelayKind::Income).is_some());
    }

    #[test]
    fn suppression_nests() {
        let guards = RelayGuards::default();
        let outer = guards.suppress_owner_changes();
        let inner = guards.suppress_owner_changes();
        drop(inner);
        assert!(guards.owner_changes_suppressed());
        drop(outer);
        assert!(!guards.owner_changes_suppressed());
    }

    #[tokio::test]
    async fn lock_is_reentrant_on_same_task() {
        let locks = CompanyLocks::default();
        let company = CompanyId::new();
        let value = locks
            .exclusive(company, async {
                assert!(CompanyLocks::is_held(company));
                locks.exclusive(company, async { 42 }).await
            })
            .await;
        assert_eq!(value, 42);
        assert!(!CompanyLocks::is_held(company));
    }

    #[tokio::test]
    async fn other_tasks_wait_for_the_lock() {
        let locks = Arc::new(CompanyLocks::default());
        let company = CompanyId::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let (entered_tx, entered_rx) = tokio::sync::oneshot::channel();
        let first = {
            let locks = Arc::clone(&locks);
            let order = Arc::clone(&order);
            tokio::spawn(async move {
                locks
                    .exclusive(company, async {
                        let _ = entered_tx.send(());
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        order.lock().push("first");
                    })
                    .await;
            })
        };

        let _ = entered_rx.await;
        let second = {
            let locks = Arc::clone(&locks);
            let order = Arc::clone(&order);
            tokio::spawn(async move {
                locks
                    .exclusive(company, async {
                        order.lock().push("second");
                    })
                    .await;
            })
        };

        first.await.unwrap();
        second.await.unwrap();
        assert_eq!(*order.lock(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn different_companies_do_not_block() {
        let locks = CompanyLocks::default();
        let a = CompanyId::new();
        let b = CompanyId::new();
        locks
            .exclusive(a, async {
                locks
                    .exclusive(b, async {
                        assert!(CompanyLocks::is_held(a));
                        assert!(CompanyLocks::is_held(b));
                    })
                    .await;
            })
            .await;
    }
}
