//! TTL expiry tracking: a private `rule -> deadline` map owned by the
//! stream worker. It is never stored in the registry and never shared
//! across tasks, so no lock is needed beyond the registry lock `sweep`
//! itself takes to mutate entries.

use crate::registry::RegistryInner;
use alertsd_model::AlertState;
use std::collections::HashMap;

/// Record (or refresh) the expiry deadline for `rule`. A `ttl` of `0`
/// means "never expires"; this is a no-op in that case rather than
/// installing an already-past deadline.
pub fn set_lifetime(expiry: &mut HashMap<String, u64>, rule: &str, ttl: u64, now_mono_s: u64) {
    if ttl == 0 {
        return;
    }
    expiry.insert(rule.to_ascii_lowercase(), now_mono_s + ttl);
}

pub fn clear_lifetime(expiry: &mut HashMap<String, u64>, rule: &str) {
    expiry.remove(&rule.to_ascii_lowercase());
}

/// Transition every `ACTIVE` alert whose rule has expired to `RESOLVED`,
/// append `" - TTLCLEANUP"` to its description, then garbage collect
/// expiry entries whose deadline is more than an hour in the past.
/// Returns the number of alerts resolved, for the caller's log line.
pub fn sweep(registry: &mut RegistryInner, expiry: &mut HashMap<String, u64>, now_mono_s: u64) -> usize {
    let expired_rules: Vec<String> = expiry
        .iter()
        .filter(|(_, &deadline)| now_mono_s >= deadline)
        .map(|(rule, _)| rule.clone())
        .collect();

    let mut resolved = 0;
    if !expired_rules.is_empty() {
        registry.for_each_mut(|alert| {
            if alert.state == AlertState::Active
                && expired_rules.contains(&alert.rule.to_ascii_lowercase())
            {
                alert.state = AlertState::Resolved;
                alert.description.push_str(" - TTLCLEANUP");
                resolved += 1;
            }
        });
    }

    expiry.retain(|_, &mut deadline| deadline >= now_mono_s.saturating_sub(3600));
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertsd_model::Alert;

    fn alert(rule: &str, element: &str, state: AlertState) -> Alert {
        Alert {
            rule: rule.into(),
            element: element.into(),
            state,
            severity: "WARNING".into(),
            description: "desc".into(),
            metadata: String::new(),
            time: 0,
            actions: Vec::new(),
            ttl: 30,
            ctime: 0,
            last_sent: 0,
        }
    }

    #[test]
    fn set_lifetime_is_case_insensitive_on_rule() {
        let mut expiry = HashMap::new();
        set_lifetime(&mut expiry, "Threshold", 10, 100);
        assert_eq!(*expiry.get("threshold").unwrap(), 110);
    }

    #[test]
    fn sweep_resolves_only_expired_active_alerts() {
        let mut registry = RegistryInner::default();
        registry.insert_end(alert("Threshold", "ups1", AlertState::Active));
        registry.insert_end(alert("Threshold", "ups2", AlertState::Resolved));
        registry.insert_end(alert("OtherRule", "ups3", AlertState::Active));

        let mut expiry = HashMap::new();
        set_lifetime(&mut expiry, "Threshold", 10, 0);
        set_lifetime(&mut expiry, "OtherRule", 1000, 0);

        let resolved = sweep(&mut registry, &mut expiry, 10);
        assert_eq!(resolved, 1);
        assert_eq!(registry.get(0).state, AlertState::Resolved);
        assert!(registry.get(0).description.ends_with(" - TTLCLEANUP"));
        assert_eq!(registry.get(1).state, AlertState::Resolved);
        assert_eq!(registry.get(2).state, AlertState::Active);
    }

    #[test]
    fn sweep_matches_rule_case_insensitively() {
        let mut registry = RegistryInner::default();
        registry.insert_end(alert("THRESHOLD", "ups1", AlertState::Active));
        let mut expiry = HashMap::new();
        set_lifetime(&mut expiry, "threshold", 10, 0);
        let resolved = sweep(&mut registry, &mut expiry, 10);
        assert_eq!(resolved, 1);
    }

    #[test]
    fn sweep_garbage_collects_stale_expiry_entries() {
        let mut registry = RegistryInner::default();
        let mut expiry = HashMap::new();
        set_lifetime(&mut expiry, "Old", 10, 0);
        set_lifetime(&mut expiry, "Recent", 10, 5000);
        sweep(&mut registry, &mut expiry, 5000);
        assert!(!expiry.contains_key("old"));
        assert!(expiry.contains_key("recent"));
    }
}
