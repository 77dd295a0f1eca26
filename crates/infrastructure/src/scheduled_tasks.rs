//! Factory functions for the company maintenance sweeps
//!
//! Provides task closures for the scheduler to run:
//! - Desync check (every 15 minutes): headquarters and citizenship
//! - Play time (hourly): online state and daily play time of legal identities
//!
//! A sweep visits every registered company even when some fail; the failures
//! are logged and the sweep as a whole reports an error.

use std::sync::Arc;

use application::{CompanyService, ports::CompanyRegistryPort};
use domain::CompanyId;
use futures::future::BoxFuture;
use tracing::{debug, error, info, warn};

/// Task name for the desync check
pub const DESYNC_CHECK_TASK: &str = "desync_check";
/// Task name for the play time sweep
pub const PLAY_TIME_TASK: &str = "play_time";

async fn registered_companies(
    registry: &Arc<dyn CompanyRegistryPort>,
) -> Result<Vec<CompanyId>, String> {
    registry
        .all()
        .await
        .map(|companies| companies.into_iter().map(|c| c.id).collect())
        .map_err(|e| {
            error!(error = %e, "Failed to list companies");
            format!("Company listing failed: {e}")
        })
}

fn summarize(sweep: &str, failed: usize, total: usize) -> Result<(), String> {
    if failed == 0 {
        Ok(())
    } else {
        Err(format!("{sweep} failed for {failed} of {total} companies"))
    }
}

/// Create the desync check task closure
///
/// Repairs the recorded headquarters and the legal identity's citizenship of
/// every company, logging each correction.
pub fn create_desync_check_task(
    service: Arc<CompanyService>,
    registry: Arc<dyn CompanyRegistryPort>,
) -> impl Fn() -> BoxFuture<'static, Result<(), String>> + Send + Sync + 'static {
    move || {
        let service = Arc::clone(&service);
        let registry = Arc::clone(&registry);

        Box::pin(async move {
            let companies = registered_companies(&registry).await?;
            debug!(companies = companies.len(), "Checking companies for desync");

            let mut failed = 0;
            let mut corrected = 0;
            for company in &companies {
                let checks = [
                    service.reconcile_desync(*company).await,
                    service.check_citizenship_desync(*company).await,
                ];
                for check in checks {
                    match check {
                        Ok(report) if report.corrected => {
                            corrected += 1;
                            warn!(company = %company, description = %report.description, "Desync corrected");
                        },
                        Ok(_) => {},
                        Err(e) => {
                            failed += 1;
                            error!(company = %company, error = %e, "Desync check failed");
                        },
                    }
                }
            }

            info!(companies = companies.len(), corrected, failed, "Desync check completed");
            summarize("Desync check", failed, companies.len())
        })
    }
}

/// Create the play time task closure
///
/// Stamps the logout of legal identities whose employees are all offline
/// and tops up their daily play time.
pub fn create_play_time_task(
    service: Arc<CompanyService>,
    registry: Arc<dyn CompanyRegistryPort>,
) -> impl Fn() -> BoxFuture<'static, Result<(), String>> + Send + Sync + 'static {
    move || {
        let service = Arc::clone(&service);
        let registry = Arc::clone(&registry);

        Box::pin(async move {
            let companies = registered_companies(&registry).await?;

            let mut failed = 0;
            for company in &companies {
                if let Err(e) = service.update_online_state(*company).await {
                    failed += 1;
                    error!(company = %company, error = %e, "Play time update failed");
                }
            }

            debug!(companies = companies.len(), failed, "Play time sweep completed");
            summarize("Play time sweep", failed, companies.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_names_are_unique() {
        assert_ne!(DESYNC_CHECK_TASK, PLAY_TIME_TASK);
    }

    #[test]
    fn summary_fails_when_any_company_failed() {
        assert!(summarize("Sweep", 0, 3).is_ok());
        let error = summarize("Sweep", 1, 3).unwrap_err();
        assert_eq!(error, "Sweep failed for 1 of 3 companies");
    }
}
