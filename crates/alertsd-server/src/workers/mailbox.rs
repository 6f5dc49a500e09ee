//! The mailbox worker: services `rfc-alerts-list` and
//! `rfc-alerts-acknowledge` requests, each multiplexed against the
//! shutdown control channel in one `tokio::select!` loop.

use crate::clock::wall_seconds;
use crate::error::ProtocolError;
use alertsd_bus::{AlertStream, ControlChannel, ControlMessage, MailboxEnvelope, MailboxReply, MailboxRequest};
use alertsd_core::Registry;
use alertsd_model::{AcknowledgeRequestState, AlertIdentity, AlertState, ListRequestState};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

pub struct MailboxWorker {
    registry: Registry,
    bus: Arc<dyn AlertStream>,
    list_rx: mpsc::Receiver<MailboxEnvelope>,
    acknowledge_rx: mpsc::Receiver<MailboxEnvelope>,
    control_rx: mpsc::Receiver<ControlMessage>,
}

impl MailboxWorker {
    pub fn new(
        registry: Registry,
        bus: Arc<dyn AlertStream>,
        list_rx: mpsc::Receiver<MailboxEnvelope>,
        acknowledge_rx: mpsc::Receiver<MailboxEnvelope>,
    ) -> (Self, ControlChannel) {
        let (control, control_rx) = ControlChannel::pair(4);
        (
            Self {
                registry,
                bus,
                list_rx,
                acknowledge_rx,
                control_rx,
            },
            control,
        )
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                control = self.control_rx.recv() => {
                    match control {
                        Some(ControlMessage::Term) | None => {
                            tracing::info!("mailbox worker draining and shutting down");
                            return;
                        }
                        Some(ControlMessage::TtlCleanup) => {
                            tracing::debug!("mailbox worker ignores TTLCLEANUP, stream worker owns the sweep");
                        }
                    }
                }
                envelope = self.list_rx.recv() => {
                    let Some((request, reply_tx)) = envelope else { return; };
                    let reply = self.handle_list(request).await;
                    let _ = reply_tx.send(reply);
                }
                envelope = self.acknowledge_rx.recv() => {
                    let Some((request, reply_tx)) = envelope else { return; };
                    self.handle_acknowledge(request, reply_tx).await;
                }
            }
        }
    }

    async fn handle_list(&self, request: MailboxRequest) -> MailboxReply {
        match list_request(request) {
            Ok(parsed) => {
                let alerts = {
                    let guard = self.registry.lock().await;
                    guard
                        .iter()
                        .filter(|alert| parsed.state.includes(alert.state))
                        .cloned()
                        .collect::<Vec<_>>()
                };
                let mut frames = match &parsed.correlation_id {
                    Some(corr) => vec![b"LIST_EX".to_vec(), corr.clone().into_bytes()],
                    None => vec![b"LIST".to_vec()],
                };
                frames.push(parsed.state.to_string().into_bytes());
                for alert in &alerts {
                    match alertsd_model::encode(alert) {
                        Ok(bytes) => frames.push(bytes),
                        Err(err) => tracing::warn!(%err, "skipping unencodable alert in list reply"),
                    }
                }
                MailboxReply(frames)
            }
            Err(err) => error_reply(err),
        }
    }

    async fn handle_acknowledge(&self, request: MailboxRequest, reply_tx: oneshot::Sender<MailboxReply>) {
        let parsed = match acknowledge_request(request) {
            Ok(parsed) => parsed,
            Err(err) => {
                let _ = reply_tx.send(error_reply(err));
                return;
            }
        };

        let published = {
            let mut guard = self.registry.lock().await;
            let id = AlertIdentity::new(parsed.rule.clone(), parsed.element.clone());
            let Some(index) = guard.find(&id) else {
                let _ = reply_tx.send(error_reply(ProtocolError::NotFound));
                return;
            };
            if guard.get(index).state == AlertState::Resolved {
                drop(guard);
                let _ = reply_tx.send(error_reply(ProtocolError::BadState));
                return;
            }
            let alert = guard.get_mut(index);
            alert.state = parsed.new_state.0;
            alert.clone()
        };

        let _ = reply_tx.send(MailboxReply::frames([
            "OK".to_string(),
            parsed.rule.clone(),
            parsed.element.clone(),
            parsed.new_state.to_string(),
        ]));

        let mut duplicate = published;
        duplicate.time = wall_seconds();
        let subject = format!("{}/{}@{}", duplicate.rule, duplicate.severity, duplicate.element);
        match alertsd_model::encode(&duplicate) {
            Ok(bytes) => {
                if let Err(err) = self.bus.publish(&subject, bytes) {
                    tracing::warn!(%err, subject, "acknowledge-driven publish failed");
                }
            }
            Err(err) => tracing::warn!(%err, "failed to encode acknowledge-driven publish"),
        }
    }
}

struct ListRequest {
    correlation_id: Option<String>,
    state: ListRequestState,
}

fn frame_str(frame: Option<&Vec<u8>>) -> Result<&str, ProtocolError> {
    let frame = frame.ok_or(ProtocolError::BadMessage)?;
    std::str::from_utf8(frame).map_err(|_| ProtocolError::BadMessage)
}

fn list_request(request: MailboxRequest) -> Result<ListRequest, ProtocolError> {
    let frames = &request.0;
    let command = frame_str(frames.first())?;
    let (correlation_id, state_frame) = match command {
        "LIST" => (None, frames.get(1)),
        "LIST_EX" => {
            let corr = frame_str(frames.get(1))?.to_string();
            (Some(corr), frames.get(2))
        }
        _ => return Err(ProtocolError::BadMessage),
    };
    let state_token = state_frame.ok_or(ProtocolError::NotFound)?;
    let state_token = std::str::from_utf8(state_token).map_err(|_| ProtocolError::NotFound)?;
    let state = ListRequestState::parse(state_token).ok_or(ProtocolError::NotFound)?;
    Ok(ListRequest {
        correlation_id,
        state,
    })
}

struct AcknowledgeRequest {
    rule: String,
    element: String,
    new_state: AcknowledgeRequestState,
}

fn acknowledge_request(request: MailboxRequest) -> Result<AcknowledgeRequest, ProtocolError> {
    let frames = &request.0;
    let rule = frame_str(frames.first())?.to_string();
    let element = frame_str(frames.get(1))?.to_string();
    let new_state_token = frame_str(frames.get(2))?;
    let new_state = AcknowledgeRequestState::parse(new_state_token).ok_or(ProtocolError::BadState)?;
    Ok(AcknowledgeRequest {
        rule,
        element,
        new_state,
    })
}

fn error_reply(err: ProtocolError) -> MailboxReply {
    MailboxReply::frames(["ERROR", err.wire_token()])
}
