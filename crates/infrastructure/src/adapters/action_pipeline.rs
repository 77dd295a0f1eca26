//! Action pipeline adapter
//!
//! Runs every registered validator over each action of a pack. The first
//! objection rejects the whole pack; otherwise the pack is committed to the
//! action log.

use std::{fmt, sync::Arc};

use application::{ApplicationError, ports::ActionPipelinePort};
use async_trait::async_trait;
use domain::{ActionPack, ActionVerdict, GameAction};
use parking_lot::RwLock;
use tracing::{debug, info};

/// A rule that can veto an action
pub trait ActionValidator: Send + Sync {
    /// `Some(reason)` refuses the action
    fn check(&self, action: &GameAction) -> Option<String>;
}

impl<F> ActionValidator for F
where
    F: Fn(&GameAction) -> Option<String> + Send + Sync,
{
    fn check(&self, action: &GameAction) -> Option<String> {
        self(action)
    }
}

/// A pack and the verdict it received
#[derive(Debug, Clone, PartialEq)]
pub struct PerformedPack {
    pub pack: ActionPack,
    pub verdict: ActionVerdict,
}

/// Validate-then-commit pipeline with a pluggable set of validators
#[derive(Clone, Default)]
pub struct ValidatingActionPipeline {
    validators: Arc<RwLock<Vec<Arc<dyn ActionValidator>>>>,
    log: Arc<RwLock<Vec<PerformedPack>>>,
}

impl fmt::Debug for ValidatingActionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatingActionPipeline")
            .field("validators", &self.validators.read().len())
            .field("performed", &self.log.read().len())
            .finish()
    }
}

impl ValidatingActionPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_validator(&self, validator: impl ActionValidator + 'static) {
        self.validators.write().push(Arc::new(validator));
    }

    pub fn clear_validators(&self) {
        self.validators.write().clear();
    }

    /// Every pack performed so far, rejected ones included
    pub fn performed(&self) -> Vec<PerformedPack> {
        self.log.read().clone()
    }

    /// Actions of accepted packs, in commit order
    pub fn committed(&self) -> Vec<GameAction> {
        self.log
            .read()
            .iter()
            .filter(|p| p.verdict.is_accepted())
            .flat_map(|p| p.pack.actions.iter().cloned())
            .collect()
    }

    fn judge(&self, pack: &ActionPack) -> ActionVerdict {
        let validators = self.validators.read();
        pack.actions
            .iter()
            .find_map(|action| validators.iter().find_map(|v| v.check(action)))
            .map_or(ActionVerdict::Accepted, |reason| ActionVerdict::Rejected {
                reason,
            })
    }
}

#[async_trait]
impl ActionPipelinePort for ValidatingActionPipeline {
    async fn perform(&self, pack: ActionPack) -> Result<ActionVerdict, ApplicationError> {
        let verdict = self.judge(&pack);
        match &verdict {
            ActionVerdict::Accepted => {
                debug!(actions = pack.actions.len(), "Action pack committed");
            },
            ActionVerdict::Rejected { reason } => {
                info!(actions = pack.actions.len(), %reason, "Action pack rejected");
            },
        }
        self.log.write().push(PerformedPack {
            pack,
            verdict: verdict.clone(),
        });
        Ok(verdict)
    }
}
