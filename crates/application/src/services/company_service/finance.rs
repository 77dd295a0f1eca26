//! Money relays
//!
//! Raw money movements touching the company or its employees are
//! re-emitted as company-scoped actions. A relay that is already running
//! for a company ignores further deliveries until it finishes, which stops
//! an emitted action that moves money again from looping back forever.

use std::sync::Weak;

use domain::{AccountId, ActionPack, ActionVerdict, CompanyId, GameAction, MemberId, MoneyTransfer};
use tracing::{debug, info, warn};

use super::{CompanyService, RelayKind};
use crate::{
    error::ApplicationError,
    ports::{TaskKey, TaskKind},
};

impl CompanyService {
    /// A company account received money
    pub async fn on_receive_money(&self, company: CompanyId, transfer: MoneyTransfer) {
        self.relay(company, RelayKind::Income, |c| {
            Some(GameAction::CompanyIncome {
                transfer,
                receiver_legal_identity: c,
            })
        })
        .await;
    }

    /// A company account paid money
    pub async fn on_give_money(&self, company: CompanyId, transfer: MoneyTransfer) {
        self.relay(company, RelayKind::Expense, |c| {
            Some(GameAction::CompanyExpense {
                transfer,
                sender_legal_identity: c,
            })
        })
        .await;
    }

    /// An employee's personal account received money
    pub async fn on_employee_receive_money(&self, company: CompanyId, transfer: MoneyTransfer) {
        let receiver = self.account_holder(transfer.target).await;
        self.relay(company, RelayKind::EmployeeIncome, |_| {
            receiver.map(|receiver| GameAction::CompanyEmployeeIncome { transfer, receiver })
        })
        .await;
    }

    /// An employee's personal account paid money
    pub async fn on_employee_give_money(&self, company: CompanyId, transfer: MoneyTransfer) {
        let sender = self.account_holder(transfer.source).await;
        self.relay(company, RelayKind::EmployeeExpense, |_| {
            sender.map(|sender| GameAction::CompanyEmployeeExpense { transfer, sender })
        })
        .await;
    }

    async fn account_holder(&self, account: AccountId) -> Option<MemberId> {
        match self.ports.accounts.get(account).await {
            Ok(Some(a)) => a.holder(),
            Ok(None) => None,
            Err(e) => {
                warn!(account = %account, error = %e, "Failed to look up account");
                None
            },
        }
    }

    async fn relay<F>(&self, company: CompanyId, kind: RelayKind, build: F)
    where
        F: FnOnce(MemberId) -> Option<GameAction> + Send,
    {
        let result = self
            .locks
            .exclusive(company, async {
                let guards = self.guards.for_company(company);
                let Some(_entered) = guards.try_enter(kind) else {
                    debug!(company = %company, ?kind, "Relay already running");
                    return Ok(());
                };
                let c = self.company(company).await?;
                let Some(action) = build(c.legal_identity()) else {
                    debug!(company = %company, ?kind, "Nothing to relay");
                    return Ok(());
                };
                self.emit(company, action).await
            })
            .await;
        if let Err(e) = result {
            warn!(company = %company, ?kind, error = %e, "Money relay failed");
        }
    }

    async fn emit(&self, company: CompanyId, action: GameAction) -> Result<(), ApplicationError> {
        let name = action.name();
        match self.ports.pipeline.perform(ActionPack::single(action)).await? {
            ActionVerdict::Accepted => debug!(company = %company, action = name, "Relayed"),
            ActionVerdict::Rejected { reason } => {
                info!(company = %company, action = name, %reason, "Relay rejected");
            },
        }
        Ok(())
    }

    /// An employee's balance changed; bursts for one account are coalesced
    pub fn on_employee_wealth_change(&self, company: CompanyId, account: AccountId) {
        let service: Weak<Self> = self.this.clone();
        self.ports.deferred.schedule(
            TaskKey::new(company, TaskKind::WealthChange(account)),
            self.policy.wealth_change_delay,
            Box::pin(async move {
                let Some(service) = service.upgrade() else {
                    return;
                };
                service.emit_wealth_change(company, account).await;
            }),
        );
    }

    async fn emit_wealth_change(&self, company: CompanyId, account: AccountId) {
        if matches!(self.ports.registry.get(company).await, Ok(None)) {
            debug!(company = %company, "Company gone before wealth change");
            return;
        }
        let affected_citizen = self.account_holder(account).await;
        let action = GameAction::CompanyEmployeeWealthChanged {
            account,
            affected_citizen,
        };
        if let Err(e) = self.emit(company, action).await {
            warn!(company = %company, account = %account, error = %e, "Wealth change relay failed");
        }
    }
}
