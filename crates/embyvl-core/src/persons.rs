use std::collections::HashMap;

/// Label shown while a name lookup is in flight.
pub const PENDING_LABEL: &str = "…";
/// Label shown when a lookup failed.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Resolution state of one person id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonName {
    Pending,
    Resolved(String),
    Unknown,
}

impl PersonName {
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => PENDING_LABEL,
            Self::Resolved(name) => name,
            Self::Unknown => UNKNOWN_LABEL,
        }
    }
}

/// Person id → display name. Entries are never evicted.
#[derive(Debug, Clone, Default)]
pub struct PersonNameCache {
    entries: HashMap<String, PersonName>,
}

impl PersonNameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `person_id` for a lookup.
    ///
    /// Returns `false` when the id is empty or already has an entry (pending or
    /// settled); the caller must not issue a request in that case.
    pub fn claim(&mut self, person_id: &str) -> bool {
        if person_id.is_empty() || self.entries.contains_key(person_id) {
            return false;
        }
        self.entries
            .insert(person_id.to_string(), PersonName::Pending);
        true
    }

    /// Record the outcome of a lookup; `None` marks the id as unknown.
    pub fn settle(&mut self, person_id: &str, name: Option<String>) {
        let entry = match name {
            Some(name) => PersonName::Resolved(name),
            None => PersonName::Unknown,
        };
        self.entries.insert(person_id.to_string(), entry);
    }

    pub fn get(&self, person_id: &str) -> Option<&PersonName> {
        self.entries.get(person_id)
    }

    pub fn label(&self, person_id: &str) -> Option<&str> {
        self.get(person_id).map(PersonName::label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_once() {
        let mut cache = PersonNameCache::new();
        assert!(cache.claim("77"));
        assert!(!cache.claim("77"));
        assert_eq!(cache.get("77"), Some(&PersonName::Pending));
        assert_eq!(cache.label("77"), Some(PENDING_LABEL));
    }

    #[test]
    fn test_empty_id_is_never_claimed() {
        let mut cache = PersonNameCache::new();
        assert!(!cache.claim(""));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_settled_entries_stay() {
        let mut cache = PersonNameCache::new();
        cache.claim("1");
        cache.settle("1", Some("Hayao Miyazaki".into()));
        cache.claim("2");
        cache.settle("2", None);

        assert!(!cache.claim("1"));
        assert!(!cache.claim("2"));
        assert_eq!(cache.label("1"), Some("Hayao Miyazaki"));
        assert_eq!(cache.get("2"), Some(&PersonName::Unknown));
        assert_eq!(cache.len(), 2);
    }
}
