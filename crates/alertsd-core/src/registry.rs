use alertsd_model::{Alert, AlertIdentity};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// The registry's mutable state: the ordered alert list and the
/// last-sent map, both protected by the same lock so that a reader never
/// observes one updated without the other.
///
/// `last_sent` is keyed by `AlertIdentity` rather than by a per-alert
/// pointer/handle, so there is exactly one `last_sent` entry per identity
/// regardless of how many times the underlying alert object has been
/// replaced — keying by a handle to the alert itself would leak an entry
/// every time an identity's stored alert is replaced rather than mutated
/// in place.
#[derive(Debug, Default)]
pub struct RegistryInner {
    entries: Vec<Alert>,
    last_sent: HashMap<AlertIdentity, u64>,
}

impl RegistryInner {
    /// Locate the stored alert with the given identity. The returned
    /// index is only valid until the next mutation of `entries`.
    pub fn find(&self, id: &AlertIdentity) -> Option<usize> {
        self.entries.iter().position(|a| a.identity() == *id)
    }

    pub fn get(&self, index: usize) -> &Alert {
        &self.entries[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Alert {
        &mut self.entries[index]
    }

    /// Append a new alert. Caller must have already verified its
    /// identity is absent.
    pub fn insert_end(&mut self, alert: Alert) -> usize {
        self.entries.push(alert);
        self.entries.len() - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn for_each_mut<F: FnMut(&mut Alert)>(&mut self, mut f: F) {
        for alert in self.entries.iter_mut() {
            f(alert);
        }
    }

    pub fn last_sent(&self, id: &AlertIdentity) -> u64 {
        self.last_sent.get(id).copied().unwrap_or(0)
    }

    pub fn set_last_sent(&mut self, id: AlertIdentity, now_mono_s: u64) {
        self.last_sent.insert(id, now_mono_s);
    }

    /// Replace the whole entry set, e.g. after loading a snapshot.
    /// `last_sent` is cleared: nothing has been republished yet in this
    /// process lifetime.
    pub fn replace_all(&mut self, entries: Vec<Alert>) {
        self.entries = entries;
        self.last_sent.clear();
    }
}

/// Shared, lock-protected handle to the registry. Cloning shares the
/// same underlying state (an `Arc`) so it can be handed to each worker
/// at construction instead of living behind a process-wide global.
#[derive(Debug, Clone)]
pub struct Registry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner::default())),
        }
    }

    pub fn from_entries(entries: Vec<Alert>) -> Self {
        let registry = Self::new();
        {
            // infallible: freshly constructed, uncontended.
            let mut guard = registry.inner.try_lock().expect("new registry uncontended");
            guard.replace_all(entries);
        }
        registry
    }

    pub async fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertsd_model::AlertState;

    fn alert(rule: &str, element: &str) -> Alert {
        Alert {
            rule: rule.into(),
            element: element.into(),
            state: AlertState::Active,
            severity: "WARNING".into(),
            description: String::new(),
            metadata: String::new(),
            time: 0,
            actions: Vec::new(),
            ttl: 0,
            ctime: 0,
            last_sent: 0,
        }
    }

    #[tokio::test]
    async fn find_is_case_insensitive() {
        let registry = Registry::new();
        {
            let mut guard = registry.lock().await;
            guard.insert_end(alert("Threshold", "ups"));
        }
        let guard = registry.lock().await;
        assert!(guard.find(&AlertIdentity::new("threshold", "UPS")).is_some());
    }

    #[tokio::test]
    async fn for_each_mut_visits_insertion_order() {
        let registry = Registry::new();
        {
            let mut guard = registry.lock().await;
            guard.insert_end(alert("a", "1"));
            guard.insert_end(alert("b", "2"));
        }
        let mut seen = Vec::new();
        let mut guard = registry.lock().await;
        guard.for_each_mut(|a| seen.push(a.rule.clone()));
        assert_eq!(seen, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn last_sent_keyed_by_identity_survives_replacement() {
        let registry = Registry::new();
        let id = AlertIdentity::new("Threshold", "ups");
        {
            let mut guard = registry.lock().await;
            guard.insert_end(alert("Threshold", "ups"));
            guard.set_last_sent(AlertIdentity::new("Threshold", "ups"), 100);
        }
        {
            let mut guard = registry.lock().await;
            let idx = guard.find(&id).unwrap();
            *guard.get_mut(idx) = alert("Threshold", "ups");
        }
        let guard = registry.lock().await;
        assert_eq!(guard.last_sent(&id), 100);
    }
}
