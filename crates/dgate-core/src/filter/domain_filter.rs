//! Domain filter implementation
//!
//! Blacklists services by key, split into file and tag domains by service type.

use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

use super::changes::Changes;
use super::envelope;
use super::rules::{BlacklistCache, Rules};
use crate::config::FilterConfig;
use crate::error::Result;
use crate::registry::ServiceRegistry;
use crate::service::{DomainKind, ServiceKey, ServiceType};

/// Rule count above which callers should warn the user. Never enforced.
pub const TOO_MANY_RULES_THRESHOLD: usize = 12;

/// Rules plus the blacklist sets derived from them, guarded as one unit
#[derive(Debug, Default)]
struct FilterState {
    rules: Rules,
    cache: BlacklistCache,
    /// Bumped on every publish
    generation: u64,
}

impl FilterState {
    fn from_rules(rules: Rules) -> Self {
        let cache = BlacklistCache::rebuild(&rules);
        Self {
            rules,
            cache,
            generation: 0,
        }
    }

    /// Rebuild the cache from the current rules and mark a new generation
    fn publish(&mut self) {
        self.cache = BlacklistCache::rebuild(&self.rules);
        self.generation += 1;
    }
}

/// Result of a [`DomainFilter::clean_rules`] pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanOutcome {
    /// The revalidated rules replaced the filter's rules
    Published(CleanReport),
    /// The filter changed while the registry was being consulted; nothing was
    /// replaced and the concurrent change stands
    Superseded(CleanReport),
}

impl CleanOutcome {
    /// Report of the scan, whether or not it was applied
    pub fn report(&self) -> &CleanReport {
        match self {
            CleanOutcome::Published(report) | CleanOutcome::Superseded(report) => report,
        }
    }

    /// Whether the scan result replaced the filter's rules
    pub fn is_published(&self) -> bool {
        matches!(self, CleanOutcome::Published(_))
    }
}

/// What a revalidation scan decided for each rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Rules that survived, with their current type from the registry
    pub kept: Vec<(ServiceKey, ServiceType)>,
    /// Rules dropped because the service is gone or no longer classifies
    pub dropped: Vec<(ServiceKey, ServiceType)>,
    /// Kept rules whose stored type differed from the registry: key, stored, current
    pub retyped: Vec<(ServiceKey, ServiceType, ServiceType)>,
}

/// Service blacklist filter for file and tag domains
///
/// Thread-safe. Every mutation rebuilds both blacklist sets in full under the
/// same write lock, so readers always see sets matching some complete rule set.
#[derive(Debug, Default)]
pub struct DomainFilter {
    state: RwLock<FilterState>,
}

impl DomainFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Create filter with initial rules
    pub fn from_rules(rules: Rules) -> Self {
        Self {
            state: RwLock::new(FilterState::from_rules(rules)),
        }
    }

    /// Add or overwrite the rule for a service
    pub fn add_rule(&self, key: ServiceKey, service_type: ServiceType) {
        let mut state = self.state.write();
        debug!(key = %key, service_type = %service_type, kind = %service_type.kind(), "Adding rule");
        state.rules.insert(key, service_type);
        state.publish();
    }

    /// Remove the rule for a service. Absent keys are ignored.
    pub fn remove_rule(&self, key: &ServiceKey) {
        let mut state = self.state.write();
        if state.rules.remove(key).is_some() {
            debug!(key = %key, "Removed rule");
            state.publish();
        }
    }

    /// Copy of the current rules
    pub fn rules(&self) -> Rules {
        self.state.read().rules.clone()
    }

    /// Number of rules, including unclassified ones
    pub fn len(&self) -> usize {
        self.state.read().rules.len()
    }

    /// Check if filter has no rules
    pub fn is_empty(&self) -> bool {
        self.state.read().rules.is_empty()
    }

    /// Counter that changes whenever the rules are replaced or mutated
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// True when neither domain blacklists anything
    pub fn allows_everything(&self) -> bool {
        self.state.read().cache.is_empty()
    }

    /// Keep only the candidates that no rule blacklists
    pub fn filter<'a, I>(&self, candidates: I) -> HashSet<ServiceKey>
    where
        I: IntoIterator<Item = &'a ServiceKey>,
    {
        let state = self.state.read();
        candidates
            .into_iter()
            .filter(|key| state.cache.allows(key))
            .cloned()
            .collect()
    }

    /// Check if a service is allowed in both domains
    pub fn domain_ok(&self, key: &ServiceKey) -> bool {
        self.state.read().cache.allows(key)
    }

    /// Keys currently blacklisted for a domain kind
    ///
    /// Always empty for [`DomainKind::Unclassified`].
    pub fn blacklisted(&self, kind: DomainKind) -> HashSet<ServiceKey> {
        self.state.read().cache.blacklisted(kind)
    }

    /// Whether the rule count exceeds the configured advisory threshold
    pub fn is_over_threshold(&self, config: &FilterConfig) -> bool {
        self.len() > config.too_many_rules_threshold
    }

    /// Rules added and removed relative to an older filter
    pub fn changes_since(&self, old: &DomainFilter) -> Changes {
        let old_rules = old.rules();
        Changes::between(&old_rules, &self.state.read().rules)
    }

    /// Human-readable summary of [`Self::changes_since`]
    pub fn changes_summary(&self, old: &DomainFilter) -> String {
        self.changes_since(old).summary()
    }

    /// Drop rules whose service no longer exists or no longer classifies
    ///
    /// The registry is consulted without holding the lock. Surviving rules take
    /// the registry's current type. If another mutation lands during the scan,
    /// the scan result is discarded and [`CleanOutcome::Superseded`] is returned.
    pub fn clean_rules(&self, registry: &dyn ServiceRegistry) -> CleanOutcome {
        let (snapshot, generation) = {
            let state = self.state.read();
            (state.rules.clone(), state.generation)
        };

        let mut report = CleanReport::default();

        for (key, stored_type) in snapshot.iter() {
            match registry.service_type(key) {
                Ok(current) if current.kind() != DomainKind::Unclassified => {
                    if current != stored_type {
                        debug!(key = %key, from = %stored_type, to = %current, "Service type changed");
                        report.retyped.push((key.clone(), stored_type, current));
                    }
                    report.kept.push((key.clone(), current));
                }
                Ok(current) => {
                    warn!(key = %key, service_type = %current, "Dropping rule for unclassified service");
                    report.dropped.push((key.clone(), stored_type));
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Dropping rule for unresolved service");
                    report.dropped.push((key.clone(), stored_type));
                }
            }
        }

        let mut state = self.state.write();

        if state.generation != generation {
            warn!(
                seen = generation,
                current = state.generation,
                "Filter changed during rule cleanup, discarding cleanup result"
            );
            return CleanOutcome::Superseded(report);
        }

        state.rules = report.kept.iter().cloned().collect();
        state.publish();

        info!(
            "Cleaned filter rules: kept {}, dropped {}",
            report.kept.len(),
            report.dropped.len()
        );
        CleanOutcome::Published(report)
    }
}

/// Persistence
impl DomainFilter {
    /// Encode the rules as a JSON envelope
    pub fn to_json(&self) -> Result<String> {
        envelope::encode(&self.state.read().rules)
    }

    /// Decode a filter from a JSON envelope
    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(Self::from_rules(envelope::decode(data)?))
    }

    /// Replace this filter's rules with a decoded envelope
    ///
    /// The envelope is fully decoded first; on error the filter is untouched.
    pub fn replace_from_json(&self, data: &[u8]) -> Result<()> {
        let rules = envelope::decode(data)?;
        let mut state = self.state.write();
        state.rules = rules;
        state.publish();
        Ok(())
    }

    /// Load a filter from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let filter = Self::from_json(&data)?;
        info!("Loaded {} rules from {}", filter.len(), path.display());
        Ok(filter)
    }

    /// Load a filter from a file, falling back to an empty filter on any error
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(filter) => filter,
            Err(e) => {
                warn!("Could not load filter from {}, using empty filter: {}", path.display(), e);
                Self::new()
            }
        }
    }

    /// Save current rules to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_json()?;
        std::fs::write(path, content)?;
        info!("Saved {} rules to {}", self.len(), path.display());
        Ok(())
    }
}

impl Clone for DomainFilter {
    fn clone(&self) -> Self {
        Self::from_rules(self.rules())
    }
}

/// Filters are equal when their rules are; blacklist sets are derived and ignored
impl PartialEq for DomainFilter {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        let mine = self.rules();
        other.state.read().rules == mine
    }
}

impl Eq for DomainFilter {}
