use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use shared_store::{AppState, UpdateOutcome};

use crate::models::OrderError;
use crate::services::lifecycle::OrderLifecycleService;

/// Delayed single-shot order advances, used by the fulfillment simulation.
pub struct AutoAdvanceScheduler;

impl AutoAdvanceScheduler {
    /// Schedules one forward transition after `delay`. The (id, version)
    /// pair is captured now; if the order has moved on or disappeared by the
    /// time the timer fires, the write is skipped. Aborting the returned
    /// handle cancels the pending advance without rolling back anything
    /// already committed.
    pub async fn schedule(
        state: Arc<AppState>,
        order_id: String,
        delay: Duration,
    ) -> Result<JoinHandle<UpdateOutcome>, OrderError> {
        let order = state
            .store
            .get_order(&order_id)
            .await
            .ok_or_else(|| OrderError::NotFound(order_id.clone()))?;
        let captured_version = order.version;
        debug!(
            "Auto-advance armed for order {} at version {} in {:?}",
            order_id, captured_version, delay
        );

        Ok(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let outcome = state
                .store
                .update_order_if_version(&order_id, captured_version, |draft| {
                    let next = OrderLifecycleService::next_status(draft).map_err(|_| ())?;
                    draft.status = next;
                    Ok(())
                })
                .await;
            match outcome {
                UpdateOutcome::Applied => info!("Auto-advanced order {}", order_id),
                UpdateOutcome::Stale => {
                    debug!("Auto-advance for order {} skipped, record moved on", order_id)
                }
            }
            outcome
        }))
    }
}
