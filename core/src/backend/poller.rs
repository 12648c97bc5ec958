use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use resonance_types::ConnectionStatus;

use super::Backend;
use crate::mailbox::IngestionMailbox;

/// Pull the full dataset every `period` and post it into the mailbox.
///
/// Connectivity changes are reported on `status_tx`. The task ends when the
/// receiving side of `status_tx` is dropped.
pub fn spawn_poller<B: Backend>(
    backend: B,
    mailbox: Arc<IngestionMailbox>,
    period: Duration,
    status_tx: mpsc::UnboundedSender<ConnectionStatus>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut status = ConnectionStatus::Connecting;

        loop {
            interval.tick().await;
            let next = match backend.pull().await {
                Ok(dataset) => {
                    if mailbox.post(dataset) {
                        tracing::trace!("Unconsumed dataset replaced");
                    }
                    ConnectionStatus::Connected
                }
                Err(e) => {
                    if status != ConnectionStatus::Disconnected {
                        tracing::warn!(error = %e, "Backend pull failed");
                    }
                    ConnectionStatus::Disconnected
                }
            };
            if next != status {
                status = next;
                tracing::info!(status = status.label(), "Backend connection changed");
                if status_tx.send(status).is_err() {
                    break;
                }
            }
            if status_tx.is_closed() {
                break;
            }
        }
        tracing::debug!("Poller stopped");
    })
}
