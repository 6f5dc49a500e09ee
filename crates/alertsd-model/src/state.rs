use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of states a stored alert can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertState {
    Active,
    Resolved,
    AckWip,
    AckIgnore,
    AckPause,
    AckSilence,
}

impl AlertState {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "ACTIVE" => Self::Active,
            "RESOLVED" => Self::Resolved,
            "ACK-WIP" => Self::AckWip,
            "ACK-IGNORE" => Self::AckIgnore,
            "ACK-PAUSE" => Self::AckPause,
            "ACK-SILENCE" => Self::AckSilence,
            _ => return None,
        })
    }

    pub fn is_acknowledge_state(self) -> bool {
        matches!(
            self,
            Self::AckWip | Self::AckIgnore | Self::AckPause | Self::AckSilence
        )
    }
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::Active => "ACTIVE",
            Self::Resolved => "RESOLVED",
            Self::AckWip => "ACK-WIP",
            Self::AckIgnore => "ACK-IGNORE",
            Self::AckPause => "ACK-PAUSE",
            Self::AckSilence => "ACK-SILENCE",
        };
        f.write_str(token)
    }
}

/// does `state` name a valid alert state?
pub fn is_alert_state(state: &str) -> bool {
    AlertState::parse(state).is_some()
}

/// does `state` name one of the four acknowledge states?
pub fn is_acknowledge_state(state: &str) -> bool {
    AlertState::parse(state)
        .map(AlertState::is_acknowledge_state)
        .unwrap_or(false)
}

/// `AlertState` plus the two wildcard filters `rfc-alerts-list` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRequestState {
    State(AlertState),
    All,
    AllActive,
}

impl ListRequestState {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ALL" => Some(Self::All),
            "ALL-ACTIVE" => Some(Self::AllActive),
            _ => AlertState::parse(s).map(Self::State),
        }
    }

    /// Is `alert_state` included in this list-request filter?
    pub fn includes(self, alert_state: AlertState) -> bool {
        match self {
            Self::All => true,
            Self::AllActive => alert_state != AlertState::Resolved,
            Self::State(s) => s == alert_state,
        }
    }
}

impl fmt::Display for ListRequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::AllActive => f.write_str("ALL-ACTIVE"),
            Self::State(s) => write!(f, "{s}"),
        }
    }
}

/// Is `alert` included in or equal to `list_request`? Mirrors
/// `ListRequestState::includes` but takes raw wire tokens, for callers
/// that haven't already parsed both sides.
pub fn state_included(list_request_state: &str, alert_state: &str) -> bool {
    let Some(request) = ListRequestState::parse(list_request_state) else {
        return false;
    };
    let Some(state) = AlertState::parse(alert_state) else {
        return false;
    };
    request.includes(state)
}

/// The states an operator may request via `rfc-alerts-acknowledge`:
/// `ACTIVE` or one of the four acknowledge states. `RESOLVED` is
/// deliberately excluded — resolved alerts cannot be (re)acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcknowledgeRequestState(pub AlertState);

impl AcknowledgeRequestState {
    pub fn parse(s: &str) -> Option<Self> {
        let state = AlertState::parse(s)?;
        if state == AlertState::Resolved {
            return None;
        }
        Some(Self(state))
    }
}

impl fmt::Display for AcknowledgeRequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_alert_state_round_trips() {
        for token in [
            "ACTIVE",
            "RESOLVED",
            "ACK-WIP",
            "ACK-IGNORE",
            "ACK-PAUSE",
            "ACK-SILENCE",
        ] {
            let parsed = AlertState::parse(token).unwrap();
            assert_eq!(parsed.to_string(), token);
        }
    }

    #[test]
    fn unknown_alert_state_rejected() {
        assert!(AlertState::parse("ALL-ACTIVE").is_none());
        assert!(AlertState::parse("bogus").is_none());
    }

    #[test]
    fn list_request_state_wildcards() {
        assert_eq!(ListRequestState::parse("ALL"), Some(ListRequestState::All));
        assert_eq!(
            ListRequestState::parse("ALL-ACTIVE"),
            Some(ListRequestState::AllActive)
        );
        assert_eq!(
            ListRequestState::parse("ACTIVE"),
            Some(ListRequestState::State(AlertState::Active))
        );
        assert!(ListRequestState::parse("ACTIVE-ALL").is_none());
    }

    #[test]
    fn state_included_truth_table() {
        assert!(state_included("ALL", "RESOLVED"));
        assert!(state_included("ALL", "ACK-WIP"));
        assert!(!state_included("ALL-ACTIVE", "RESOLVED"));
        assert!(state_included("ALL-ACTIVE", "ACK-IGNORE"));
        assert!(state_included("ACTIVE", "ACTIVE"));
        assert!(!state_included("ACTIVE", "RESOLVED"));
        assert!(!state_included("bogus", "ACTIVE"));
        assert!(!state_included("ALL", "bogus"));
    }

    #[test]
    fn acknowledge_request_state_excludes_resolved() {
        assert!(AcknowledgeRequestState::parse("RESOLVED").is_none());
        assert!(AcknowledgeRequestState::parse("ACTIVE").is_some());
        assert!(AcknowledgeRequestState::parse("ACK-PAUSE").is_some());
        assert!(AcknowledgeRequestState::parse("ALL").is_none());
    }
}
