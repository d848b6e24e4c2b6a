//! Differences between two rule sets and their human-readable summary

use super::rules::Rules;
use crate::service::{ServiceKey, ServiceType};

/// Line separator used when joining summary lines
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
/// Line separator used when joining summary lines
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Added, changed and removed rules between an old and a new rule set
///
/// Rules are atomic key/type pairs compared by key only. `changed` is always
/// empty and exists for parity with filter types whose rules carry editable
/// values. A key kept across both sets with a different type appears in no list.
///
/// Both lists follow the insertion order of the rule set they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    /// Rules whose key exists only in the new set
    pub added: Vec<(ServiceKey, ServiceType)>,
    /// Always empty
    pub changed: Vec<(ServiceKey, ServiceType)>,
    /// Rules whose key exists only in the old set
    pub removed: Vec<(ServiceKey, ServiceType)>,
}

impl Changes {
    /// Compare two rule sets
    pub fn between(old: &Rules, new: &Rules) -> Self {
        let added = new
            .iter()
            .filter(|(key, _)| !old.contains_key(key))
            .map(|(key, t)| (key.clone(), t))
            .collect();

        let removed = old
            .iter()
            .filter(|(key, _)| !new.contains_key(key))
            .map(|(key, t)| (key.clone(), t))
            .collect();

        Self {
            added,
            changed: Vec::new(),
            removed,
        }
    }

    /// Whether nothing changed
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }

    /// Summary lines, one per non-empty list, joined by [`LINE_SEPARATOR`]
    ///
    /// Each line reports its own list's count.
    pub fn summary(&self) -> String {
        let mut lines = Vec::with_capacity(3);

        if !self.added.is_empty() {
            lines.push(format!("Added {} rules", to_human_int(self.added.len())));
        }

        if !self.changed.is_empty() {
            lines.push(format!("Changed {} rules", to_human_int(self.changed.len())));
        }

        if !self.removed.is_empty() {
            lines.push(format!("Deleted {} rules", to_human_int(self.removed.len())));
        }

        lines.join(LINE_SEPARATOR)
    }
}

/// Render a count with comma thousands separators, e.g. `12,345`
pub fn to_human_int(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}
