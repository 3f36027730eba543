//! Periodic run-all trigger.

use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::runner::Coordinator;

/// Starts the periodic trigger. The first tick fires one `period` from now.
pub fn spawn(coordinator: Arc<Coordinator>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            tracing::info!("scheduled run-all starting");
            match coordinator.run_all_users().await {
                Ok(summaries) => {
                    let (runs, failed) = summaries.iter().fold((0, 0), |(runs, failed), s| {
                        (
                            runs + s.reports.len(),
                            failed + s.reports.iter().filter(|r| !r.is_success()).count(),
                        )
                    });
                    tracing::info!(users = summaries.len(), runs, failed, "scheduled run-all completed");
                }
                Err(e) => tracing::error!("scheduled run-all error: {}", e),
            }
        }
    })
}
