//! The alert wire codec: spec treats this as an external collaborator
//! ("we assume encode/decode primitives exist"); this module is the
//! concrete implementation the rest of the workspace calls through.
//!
//! The wire shape is a distinct type from the in-memory `Alert` so the
//! two can evolve independently; `From` impls keep the conversion a
//! single place to update.

use crate::alert::Alert;
use crate::state::AlertState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed alert frame: {0}")]
    Malformed(#[from] Box<bincode::ErrorKind>),
    #[error("unknown alert state tag {0}")]
    UnknownState(u8),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireAlert {
    rule: String,
    element: String,
    state: u8,
    severity: String,
    description: String,
    metadata: String,
    time: u64,
    actions: Vec<String>,
    ttl: u64,
    ctime: u64,
    last_sent: u64,
}

fn state_to_tag(state: AlertState) -> u8 {
    match state {
        AlertState::Active => 0,
        AlertState::Resolved => 1,
        AlertState::AckWip => 2,
        AlertState::AckIgnore => 3,
        AlertState::AckPause => 4,
        AlertState::AckSilence => 5,
    }
}

fn tag_to_state(tag: u8) -> Result<AlertState, CodecError> {
    Ok(match tag {
        0 => AlertState::Active,
        1 => AlertState::Resolved,
        2 => AlertState::AckWip,
        3 => AlertState::AckIgnore,
        4 => AlertState::AckPause,
        5 => AlertState::AckSilence,
        other => return Err(CodecError::UnknownState(other)),
    })
}

impl From<&Alert> for WireAlert {
    fn from(alert: &Alert) -> Self {
        Self {
            rule: alert.rule.clone(),
            element: alert.element.clone(),
            state: state_to_tag(alert.state),
            severity: alert.severity.clone(),
            description: alert.description.clone(),
            metadata: alert.metadata.clone(),
            time: alert.time,
            actions: alert.actions.clone(),
            ttl: alert.ttl,
            ctime: alert.ctime,
            last_sent: alert.last_sent,
        }
    }
}

impl TryFrom<WireAlert> for Alert {
    type Error = CodecError;

    fn try_from(wire: WireAlert) -> Result<Self, CodecError> {
        Ok(Alert {
            rule: wire.rule,
            element: wire.element,
            state: tag_to_state(wire.state)?,
            severity: wire.severity,
            description: wire.description,
            metadata: wire.metadata,
            time: wire.time,
            actions: wire.actions,
            ttl: wire.ttl,
            ctime: wire.ctime,
            last_sent: wire.last_sent,
        })
    }
}

/// Encode an alert into its wire form.
pub fn encode(alert: &Alert) -> Result<Vec<u8>, CodecError> {
    let wire = WireAlert::from(alert);
    Ok(bincode::serialize(&wire)?)
}

/// Decode an alert from its wire form.
pub fn decode(bytes: &[u8]) -> Result<Alert, CodecError> {
    let wire: WireAlert = bincode::deserialize(bytes)?;
    wire.try_into()
}
