//! Service domain blacklist filtering
//!
//! This module provides a filter that denies services by key, where each
//! rule's service type decides whether it blacklists the file domain or the
//! tag domain. It supports:
//! - Membership checks and bulk filtering of candidate keys
//! - Change summaries between two rule sets
//! - Revalidation of rules against a live service registry
//! - A versioned JSON envelope for persistence

mod changes;
mod domain_filter;
mod envelope;
mod rules;

pub use changes::{to_human_int, Changes, LINE_SEPARATOR};
pub use domain_filter::{CleanOutcome, CleanReport, DomainFilter, TOO_MANY_RULES_THRESHOLD};
pub use envelope::{decode, encode, ENVELOPE_NAME, ENVELOPE_VERSION};
pub use rules::Rules;
