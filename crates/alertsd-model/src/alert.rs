use crate::identity::AlertIdentity;
use crate::state::AlertState;
use serde::{Deserialize, Serialize};

/// An alert as held by the registry: identity, payload and the
/// bookkeeping stamps the merge state machine and TTL sweep maintain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub rule: String,
    pub element: String,
    pub state: AlertState,
    pub severity: String,
    pub description: String,
    /// Free-form string, possibly JSON.
    pub metadata: String,
    /// Event timestamp, seconds.
    pub time: u64,
    pub actions: Vec<String>,
    /// Lifetime in seconds; 0 means no TTL.
    pub ttl: u64,
    /// Creation time, or time of the most recent state-changing transition.
    pub ctime: u64,
    /// Monotonic seconds when last republished; 0 if never sent.
    pub last_sent: u64,
}

impl Alert {
    pub fn identity(&self) -> AlertIdentity {
        AlertIdentity::new(self.rule.clone(), self.element.clone())
    }
}
