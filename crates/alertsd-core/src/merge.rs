//! The merge state machine: decides, for every incoming alert event,
//! whether to update the stored alert, which fields to copy, whether to
//! republish, and how to stamp `ctime`/`last_sent`.
//!
//! `ingest` only touches the registry; it never talks to the bus. The
//! caller is expected to release the registry lock before publishing the
//! returned alert and reacquire it only to call `record_sent` — see
//! `alertsd-server`'s stream worker, which is the only caller.

use crate::registry::RegistryInner;
use crate::ttl::set_lifetime;
use alertsd_model::{Alert, AlertIdentity, AlertState};
use std::collections::HashMap;

/// What the stream worker should do after a merge.
pub struct MergeOutcome {
    /// `Some(alert)` if a canonical copy should be published; `alert` is
    /// already a duplicate safe to encode and send without holding the
    /// registry lock.
    pub publish: Option<Alert>,
}

/// Apply one incoming alert event to the registry. `expiry` is the
/// stream worker's private rule→deadline map; it is mutated under the
/// same registry lock call for call but is never itself stored in the
/// registry.
pub fn ingest(
    registry: &mut RegistryInner,
    expiry: &mut HashMap<String, u64>,
    now_mono_s: u64,
    mut incoming: Alert,
) -> MergeOutcome {
    let id = incoming.identity();

    let Some(index) = registry.find(&id) else {
        incoming.ctime = incoming.time;
        if incoming.state == AlertState::Active {
            set_lifetime(expiry, &incoming.rule, incoming.ttl, now_mono_s);
        }
        let publish = incoming.clone();
        registry.insert_end(incoming);
        registry.set_last_sent(id, 0);
        return MergeOutcome {
            publish: Some(publish),
        };
    };

    let stored = registry.get_mut(index);
    let same_severity = stored.severity == incoming.severity;
    stored.severity = incoming.severity.clone();

    let mut send = true;

    match (stored.state, incoming.state) {
        (AlertState::Resolved, AlertState::Resolved) => {
            send = false;
        }
        (s, AlertState::Resolved) if s != AlertState::Resolved => {
            stored.state = AlertState::Resolved;
            stored.time = incoming.time;
            stored.metadata = incoming.metadata.clone();
            stored.ctime = incoming.time;
        }
        (AlertState::Resolved, AlertState::Active) => {
            set_lifetime(expiry, &incoming.rule, incoming.ttl, now_mono_s);
            stored.description = incoming.description.clone();
            stored.state = AlertState::Active;
            stored.time = incoming.time;
            stored.metadata = incoming.metadata.clone();
            stored.ctime = incoming.time;
        }
        (s, AlertState::Active) if s.is_acknowledge_state() => {
            set_lifetime(expiry, &incoming.rule, incoming.ttl, now_mono_s);
            stored.description = incoming.description.clone();
            if same_severity {
                send = false;
            } else {
                stored.ctime = incoming.time;
            }
        }
        (AlertState::Active, AlertState::Active) => {
            set_lifetime(expiry, &incoming.rule, incoming.ttl, now_mono_s);
            stored.description = incoming.description.clone();
            stored.time = incoming.time;
            if same_severity {
                let last_sent = registry.last_sent(&id);
                if now_mono_s >= last_sent + stored_ttl_half(registry.get(index).ttl) {
                    // heartbeat due, fall through to publish
                } else {
                    send = false;
                }
            } else {
                registry.get_mut(index).ctime = incoming.time;
            }
        }
        // Only reachable if a caller feeds an ack state on ingress;
        // the stream worker filters those out before calling `ingest`.
        _ => {
            send = false;
        }
    }

    let stored = registry.get_mut(index);
    stored.actions = incoming.actions.clone();

    let publish = if send {
        Some(registry.get(index).clone())
    } else {
        None
    };

    MergeOutcome { publish }
}

fn stored_ttl_half(ttl: u64) -> u64 {
    ttl / 2
}

/// Stamp `last_sent` for `id` after a successful publish. Call this with
/// the lock freshly reacquired: the publish itself must happen with the
/// lock released, so the bus send can't block other registry access.
pub fn record_sent(registry: &mut RegistryInner, id: &AlertIdentity, now_mono_s: u64) {
    registry.set_last_sent(id.clone(), now_mono_s);
}
