use std::hash::{Hash, Hasher};

/// Identity of a stored alert: the `(rule, element)` pair from spec.
///
/// Equality and hashing fold `rule` by ASCII case and `element` by full
/// Unicode case folding, so `("Threshold", "ups")` and `("threshold",
/// "UPS")` name the same alert, and so do Unicode element names that
/// differ only by case (e.g. Czech or Cyrillic letters).
#[derive(Debug, Clone)]
pub struct AlertIdentity {
    pub rule: String,
    pub element: String,
}

impl AlertIdentity {
    pub fn new(rule: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            element: element.into(),
        }
    }

    fn rule_key(&self) -> String {
        self.rule.to_ascii_lowercase()
    }

    fn element_key(&self) -> String {
        self.element.to_lowercase()
    }
}

impl PartialEq for AlertIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.rule_key() == other.rule_key() && self.element_key() == other.element_key()
    }
}

impl Eq for AlertIdentity {}

impl Hash for AlertIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rule_key().hash(state);
        self.element_key().hash(state);
    }
}
