//! Shared-drive dispatch: fan-out to local destination directories.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::fanout::{self, Destination};
use crate::sequence::DirLocks;
use crate::trigger::TriggerGate;

use super::traits::Dispatcher;
use super::types::RunSummary;
use super::DispatchError;

/// Delivers ready pairs to local destinations, each with its own
/// transform policy, and consumes the sentinel only when every
/// destination received the pair.
pub struct SharedDriveDispatcher {
    gate: TriggerGate,
    destinations: Vec<Destination>,
    locks: DirLocks,
    today: Option<NaiveDate>,
}

impl SharedDriveDispatcher {
    pub fn new(gate: TriggerGate, destinations: Vec<Destination>) -> Self {
        Self {
            gate,
            destinations,
            locks: DirLocks::new(),
            today: None,
        }
    }

    /// Pin the date used for rename templates (used by tests; defaults
    /// to the local date at run time).
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

#[async_trait]
impl Dispatcher for SharedDriveDispatcher {
    fn name(&self) -> &str {
        "shared_drive"
    }

    async fn run(&self) -> Result<RunSummary, DispatchError> {
        let pairs = self.gate.discover_ready_pairs().await?;
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());

        let mut summary = RunSummary {
            discovered: pairs.len(),
            ..RunSummary::default()
        };

        for pair in &pairs {
            let outcomes =
                fanout::deliver(pair, &self.destinations, today, &self.locks).await;

            if outcomes.iter().all(|outcome| outcome.delivered) {
                summary.delivered += 1;
                match self.gate.consume(pair).await {
                    Ok(()) => summary.consumed += 1,
                    // The transfer stands; the pair will be re-offered
                    // until the sentinel is cleaned up.
                    Err(e) => warn!("{}", e),
                }
            } else {
                summary.failed += 1;
            }
        }

        info!(
            "Pass over {} done: {} discovered, {} delivered, {} consumed, {} failed",
            self.gate.source_dir().display(),
            summary.discovered,
            summary.delivered,
            summary.consumed,
            summary.failed
        );
        Ok(summary)
    }
}
