//! Property tests for the registry, merge state machine and TTL sweep.

use alertsd_core::registry::RegistryInner;
use alertsd_core::{ingest, record_sent, set_lifetime, sweep};
use alertsd_model::{Alert, AlertIdentity, AlertState};
use proptest::prelude::*;
use std::collections::HashMap;

fn alert_strategy() -> impl Strategy<Value = Alert> {
    (
        "[a-zA-Z]{1,8}",
        "[a-zA-Z]{1,8}",
        prop_oneof![Just(AlertState::Active), Just(AlertState::Resolved)],
        "[A-Z]{4,10}",
        0u64..1000,
        1u64..120,
    )
        .prop_map(|(rule, element, state, severity, time, ttl)| Alert {
            rule,
            element,
            state,
            severity,
            description: "d".into(),
            metadata: "{}".into(),
            time,
            actions: vec!["EMAIL".into()],
            ttl,
            ctime: 0,
            last_sent: 0,
        })
}

proptest! {
    /// Feeding the same identity repeatedly never grows the registry past
    /// one entry per distinct identity, case-insensitively.
    #[test]
    fn distinct_identities_stay_distinct(alerts in prop::collection::vec(alert_strategy(), 1..30)) {
        let mut registry = RegistryInner::default();
        let mut expiry = HashMap::new();
        for (i, alert) in alerts.into_iter().enumerate() {
            ingest(&mut registry, &mut expiry, i as u64, alert);
        }
        let mut seen = std::collections::HashSet::new();
        for entry in registry.iter() {
            prop_assert!(seen.insert(entry.identity()));
        }
    }

    /// A heartbeat republish for an unchanged-severity active alert never
    /// fires before half its TTL has elapsed since the last send.
    #[test]
    fn heartbeat_never_fires_before_half_ttl(ttl in 2u64..200, elapsed in 0u64..300) {
        let mut registry = RegistryInner::default();
        let mut expiry = HashMap::new();
        let mut alert = Alert {
            rule: "Threshold".into(),
            element: "ups".into(),
            state: AlertState::Active,
            severity: "WARNING".into(),
            description: "d".into(),
            metadata: "{}".into(),
            time: 0,
            actions: vec![],
            ttl,
            ctime: 0,
            last_sent: 0,
        };
        ingest(&mut registry, &mut expiry, 0, alert.clone());
        let id = AlertIdentity::new("Threshold", "ups");
        record_sent(&mut registry, &id, 0);

        alert.time = elapsed;
        let outcome = ingest(&mut registry, &mut expiry, elapsed, alert);
        if elapsed < ttl / 2 {
            prop_assert!(outcome.publish.is_none());
        }
    }

    /// The TTL sweep never resolves an alert whose rule has not expired,
    /// and every alert it does resolve ends up `Resolved`.
    #[test]
    fn ttl_sweep_only_resolves_expired_rules(
        entries in prop::collection::vec(alert_strategy(), 1..10),
        now in 0u64..10_000,
    ) {
        let mut registry = RegistryInner::default();
        for entry in &entries {
            registry.insert_end(entry.clone());
        }
        let mut expiry = HashMap::new();
        if let Some(first) = entries.first() {
            set_lifetime(&mut expiry, &first.rule, 0, 0);
        }
        let resolved_count = sweep(&mut registry, &mut expiry, now);
        let actually_resolved = registry
            .iter()
            .filter(|a| a.description.ends_with(" - TTLCLEANUP"))
            .count();
        prop_assert_eq!(resolved_count, actually_resolved);
        for alert in registry.iter() {
            if alert.description.ends_with(" - TTLCLEANUP") {
                prop_assert_eq!(alert.state, AlertState::Resolved);
            }
        }
    }
}

#[test]
fn set_lifetime_then_sweep_round_trip() {
    let mut registry = RegistryInner::default();
    registry.insert_end(Alert {
        rule: "Threshold".into(),
        element: "ups".into(),
        state: AlertState::Active,
        severity: "WARNING".into(),
        description: "d".into(),
        metadata: "{}".into(),
        time: 0,
        actions: vec![],
        ttl: 10,
        ctime: 0,
        last_sent: 0,
    });
    let mut expiry = HashMap::new();
    set_lifetime(&mut expiry, "Threshold", 10, 0);
    assert_eq!(sweep(&mut registry, &mut expiry, 5), 0);
    assert_eq!(sweep(&mut registry, &mut expiry, 10), 1);
}
