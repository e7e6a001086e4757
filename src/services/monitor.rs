//! Background scheduler driving the periodic SLA ticks.
//!
//! Two independent interval loops share one `SlaService`: a fast read-only
//! countdown broadcast and a slower violation sweep that persists breaches
//! and escalations. Ticks run sequentially within each loop; a tick that
//! overruns its period swallows the missed fires instead of bursting.

use crate::services::SlaService;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub struct SlaMonitor {
    service: Arc<SlaService>,
    broadcast_interval: Duration,
    violation_interval: Duration,
}

impl SlaMonitor {
    pub fn new(
        service: Arc<SlaService>,
        broadcast_interval: Duration,
        violation_interval: Duration,
    ) -> Self {
        Self {
            service,
            broadcast_interval,
            violation_interval,
        }
    }

    /// Spawn both tick loops. The returned handles run until aborted or the
    /// runtime shuts down.
    pub fn start(&self) -> (JoinHandle<()>, JoinHandle<()>) {
        info!(
            broadcast_interval_secs = self.broadcast_interval.as_secs(),
            violation_interval_secs = self.violation_interval.as_secs(),
            "Starting SLA monitor"
        );

        let broadcast_service = Arc::clone(&self.service);
        let broadcast_period = self.broadcast_interval;
        let broadcast_handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(broadcast_period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Err(e) = broadcast_service.broadcast_countdowns().await {
                    error!(error = %e, "Countdown broadcast tick failed");
                }
            }
        });

        let violation_service = Arc::clone(&self.service);
        let violation_period = self.violation_interval;
        let violation_handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(violation_period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Err(e) = violation_service.check_violations().await {
                    error!(error = %e, "Violation sweep tick failed");
                }
            }
        });

        (broadcast_handle, violation_handle)
    }
}
