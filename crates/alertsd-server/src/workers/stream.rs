//! The stream worker: consumes the ingress stream, runs the merge state
//! machine, republishes on the egress stream, and reacts to TTL sweep
//! ticks from the supervisor. A single `tokio::select!` loop multiplexes
//! the control channel against the bus subscription so both can be
//! serviced without a dedicated poller thread for either.

use crate::clock::monotonic_seconds;
use alertsd_bus::{AlertStream, ControlChannel, ControlMessage};
use alertsd_core::Registry;
use alertsd_model::AlertState;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct StreamWorker {
    registry: Registry,
    bus: Arc<dyn AlertStream>,
    control_rx: mpsc::Receiver<ControlMessage>,
}

impl StreamWorker {
    pub fn new(registry: Registry, bus: Arc<dyn AlertStream>) -> (Self, ControlChannel) {
        let (control, control_rx) = ControlChannel::pair(4);
        (
            Self {
                registry,
                bus,
                control_rx,
            },
            control,
        )
    }

    pub async fn run(mut self) {
        let mut expiry: HashMap<String, u64> = HashMap::new();
        let mut subscription = self.bus.subscribe();

        loop {
            tokio::select! {
                control = self.control_rx.recv() => {
                    match control {
                        Some(ControlMessage::Term) | None => {
                            tracing::info!("stream worker draining and shutting down");
                            return;
                        }
                        Some(ControlMessage::TtlCleanup) => {
                            let now = monotonic_seconds();
                            let resolved = {
                                let mut guard = self.registry.lock().await;
                                alertsd_core::sweep(&mut guard, &mut expiry, now)
                            };
                            if resolved > 0 {
                                tracing::info!(resolved, "ttl sweep resolved expired alerts");
                            }
                        }
                    }
                }
                delivery = subscription.recv() => {
                    let Some((subject, payload)) = delivery else {
                        tracing::warn!("ingress stream closed, stream worker exiting");
                        return;
                    };
                    self.handle_delivery(&mut expiry, &subject, &payload).await;
                }
            }
        }
    }

    async fn handle_delivery(&self, expiry: &mut HashMap<String, u64>, subject: &str, payload: &[u8]) {
        let alert = match alertsd_model::decode(payload) {
            Ok(alert) => alert,
            Err(err) => {
                tracing::warn!(%err, "dropping undecodable ingress message");
                return;
            }
        };
        if alert.state != AlertState::Active && alert.state != AlertState::Resolved {
            tracing::warn!(state = %alert.state, "dropping ingress alert in a non-ingestible state");
            return;
        }

        let now = monotonic_seconds();
        let id = alert.identity();
        let outcome = {
            let mut guard = self.registry.lock().await;
            alertsd_core::ingest(&mut guard, expiry, now, alert)
        };

        let Some(canonical) = outcome.publish else {
            return;
        };

        let bytes = match alertsd_model::encode(&canonical) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(%err, "failed to encode canonical alert, not publishing");
                return;
            }
        };

        match self.bus.publish(subject, bytes) {
            Ok(()) => {
                let mut guard = self.registry.lock().await;
                alertsd_core::record_sent(&mut guard, &id, now);
            }
            Err(err) => {
                tracing::warn!(%err, subject, "publish failed, not retried");
            }
        }
    }
}
