//! Rule storage and the blacklist sets derived from it

use std::collections::{HashMap, HashSet};

use crate::service::{DomainKind, ServiceKey, ServiceType};

/// Insertion-ordered mapping of service key to service type
///
/// Re-inserting an existing key overwrites its type and keeps its position.
/// Removing a key keeps the relative order of the remaining rules.
/// Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    entries: Vec<(ServiceKey, ServiceType)>,
    /// Key -> position in `entries`
    index: HashMap<ServiceKey, usize>,
}

impl Rules {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a rule, returning the previous type if any
    pub fn insert(&mut self, key: ServiceKey, service_type: ServiceType) -> Option<ServiceType> {
        match self.index.get(&key) {
            Some(&idx) => Some(std::mem::replace(&mut self.entries[idx].1, service_type)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, service_type));
                None
            }
        }
    }

    /// Remove a rule, returning its type if it was present
    ///
    /// Later rules shift down one slot, so this is O(n).
    pub fn remove(&mut self, key: &ServiceKey) -> Option<ServiceType> {
        let idx = self.index.remove(key)?;
        let (_, service_type) = self.entries.remove(idx);

        for (pos, (k, _)) in self.entries.iter().enumerate().skip(idx) {
            if let Some(slot) = self.index.get_mut(k) {
                *slot = pos;
            }
        }

        Some(service_type)
    }

    /// Type stored for a key
    pub fn get(&self, key: &ServiceKey) -> Option<ServiceType> {
        self.index.get(key).map(|&idx| self.entries[idx].1)
    }

    /// Whether a rule exists for this key
    pub fn contains_key(&self, key: &ServiceKey) -> bool {
        self.index.contains_key(key)
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no rules
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rules in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&ServiceKey, ServiceType)> + '_ {
        self.entries.iter().map(|(k, t)| (k, *t))
    }

    /// Rules as owned pairs, in insertion order
    pub fn to_pairs(&self) -> Vec<(ServiceKey, ServiceType)> {
        self.entries.clone()
    }
}

impl PartialEq for Rules {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, t)| other.get(k) == Some(t))
    }
}

impl Eq for Rules {}

impl FromIterator<(ServiceKey, ServiceType)> for Rules {
    fn from_iter<I: IntoIterator<Item = (ServiceKey, ServiceType)>>(iter: I) -> Self {
        let mut rules = Self::new();
        for (key, service_type) in iter {
            rules.insert(key, service_type);
        }
        rules
    }
}

impl IntoIterator for Rules {
    type Item = (ServiceKey, ServiceType);
    type IntoIter = std::vec::IntoIter<(ServiceKey, ServiceType)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Blacklisted keys per domain, always derived in full from a [`Rules`]
#[derive(Debug, Clone, Default)]
pub(crate) struct BlacklistCache {
    file: HashSet<ServiceKey>,
    tag: HashSet<ServiceKey>,
}

impl BlacklistCache {
    /// Partition every rule by its domain kind. Unclassified rules are skipped.
    pub(crate) fn rebuild(rules: &Rules) -> Self {
        let mut cache = Self::default();

        for (key, service_type) in rules.iter() {
            match service_type.kind() {
                DomainKind::File => {
                    cache.file.insert(key.clone());
                }
                DomainKind::Tag => {
                    cache.tag.insert(key.clone());
                }
                DomainKind::Unclassified => {}
            }
        }

        cache
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.file.is_empty() && self.tag.is_empty()
    }

    pub(crate) fn allows(&self, key: &ServiceKey) -> bool {
        !self.file.contains(key) && !self.tag.contains(key)
    }

    pub(crate) fn blacklisted(&self, kind: DomainKind) -> HashSet<ServiceKey> {
        match kind {
            DomainKind::File => self.file.clone(),
            DomainKind::Tag => self.tag.clone(),
            DomainKind::Unclassified => HashSet::new(),
        }
    }
}
