//! Versioned JSON envelope for persisting rule sets
//!
//! ```json
//! {"name":"Domain Filter Rules","version":1,"rules":[["737663",2]]}
//! ```
//!
//! Keys are hex-encoded. Only rules are stored; blacklist sets are rebuilt on load.

use serde::{Deserialize, Serialize};

use super::rules::Rules;
use crate::error::{Error, Result};
use crate::service::{ServiceKey, ServiceType};

/// Envelope name written to and expected in every document
pub const ENVELOPE_NAME: &str = "Domain Filter Rules";

/// Envelope version written by this build and the only one it reads
pub const ENVELOPE_VERSION: u32 = 1;

#[derive(Serialize)]
struct Envelope<'a> {
    name: &'a str,
    version: u32,
    rules: Vec<(String, u32)>,
}

#[derive(Deserialize)]
struct RawEnvelope {
    name: String,
    version: u32,
    rules: Vec<serde_json::Value>,
}

/// Encode rules as a JSON envelope
pub fn encode(rules: &Rules) -> Result<String> {
    let envelope = Envelope {
        name: ENVELOPE_NAME,
        version: ENVELOPE_VERSION,
        rules: rules.iter().map(|(k, t)| (k.to_hex(), t.code())).collect(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decode a JSON envelope
///
/// Fails without producing any rules if the envelope or any pair is invalid.
pub fn decode(data: &[u8]) -> Result<Rules> {
    let raw: RawEnvelope = serde_json::from_slice(data)?;

    if raw.name != ENVELOPE_NAME {
        return Err(Error::format(format!("unexpected envelope name '{}'", raw.name)));
    }

    if raw.version != ENVELOPE_VERSION {
        return Err(Error::UnsupportedVersion {
            found: raw.version,
            supported: ENVELOPE_VERSION,
        });
    }

    let mut rules = Rules::new();

    for (idx, value) in raw.rules.into_iter().enumerate() {
        let (digits, code): (String, u32) = serde_json::from_value(value)
            .map_err(|e| Error::format_at(format!("expected [key, type] pair: {e}"), idx))?;

        let key = ServiceKey::from_hex(&digits)
            .map_err(|e| Error::format_at(format!("invalid key '{digits}': {e}"), idx))?;

        if rules.contains_key(&key) {
            return Err(Error::format_at(format!("duplicate key '{digits}'"), idx));
        }

        rules.insert(key, ServiceType(code));
    }

    Ok(rules)
}
