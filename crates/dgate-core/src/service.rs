//! Service identifiers, type codes and their domain classification

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Prefix marking a textual key as hex-encoded bytes
pub const HEX_PREFIX: &str = "hex:";

/// Opaque identifier naming a configured service
///
/// Keys are raw bytes. They display as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceKey(Vec<u8>);

impl ServiceKey {
    /// Wrap raw key bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decode a key from hex digits
    pub fn from_hex(digits: &str) -> Result<Self> {
        Ok(Self(hex::decode(digits)?))
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex encoding of the key
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Key bytes as text, replacing invalid UTF-8
    pub fn to_text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<&str> for ServiceKey {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<&[u8]> for ServiceKey {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl From<Vec<u8>> for ServiceKey {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

/// Parses `hex:<digits>` as hex bytes, anything else as UTF-8 text bytes
impl FromStr for ServiceKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.strip_prefix(HEX_PREFIX) {
            Some(digits) => Self::from_hex(digits),
            None => Ok(Self::from(s)),
        }
    }
}

/// Integer code describing what kind of service a key names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceType(pub u32);

impl ServiceType {
    /// Remote tag repository
    pub const TAG_REPOSITORY: Self = Self(0);
    /// Remote file repository
    pub const FILE_REPOSITORY: Self = Self(1);
    /// Local file domain
    pub const LOCAL_FILE_DOMAIN: Self = Self(2);
    /// Local tag service
    pub const LOCAL_TAG: Self = Self(5);
    /// Union of all tag services
    pub const COMBINED_TAG: Self = Self(10);
    /// Union of all file services
    pub const COMBINED_FILE: Self = Self(11);

    /// Raw type code
    pub fn code(self) -> u32 {
        self.0
    }

    /// Domain bucket this type code falls into
    pub fn kind(self) -> DomainKind {
        classify(self)
    }

    /// Parse a CLI-style type: a numeric code, `file`, or `tag`
    pub fn parse_name(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" | "file_domain" | "local_file_domain" => Ok(Self::LOCAL_FILE_DOMAIN),
            "tag" | "tag_domain" | "local_tag" => Ok(Self::LOCAL_TAG),
            other => other
                .parse::<u32>()
                .map(Self)
                .map_err(|_| Error::config_value("service_type", format!("Unknown service type: {s}"))),
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ServiceType {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

/// Type codes whose services belong to the file domain
pub const FILE_DOMAIN_SERVICE_TYPES: &[ServiceType] = &[ServiceType::LOCAL_FILE_DOMAIN];

/// Type codes whose services belong to the tag domain
pub const TAG_DOMAIN_SERVICE_TYPES: &[ServiceType] = &[ServiceType::LOCAL_TAG];

/// Classification bucket derived from a service type code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainKind {
    /// File domain service
    File,
    /// Tag domain service
    Tag,
    /// Recognised by neither list; never blacklisted
    Unclassified,
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainKind::File => f.write_str("file"),
            DomainKind::Tag => f.write_str("tag"),
            DomainKind::Unclassified => f.write_str("unclassified"),
        }
    }
}

/// Map a service type code to its domain kind
pub fn classify(service_type: ServiceType) -> DomainKind {
    if FILE_DOMAIN_SERVICE_TYPES.contains(&service_type) {
        DomainKind::File
    } else if TAG_DOMAIN_SERVICE_TYPES.contains(&service_type) {
        DomainKind::Tag
    } else {
        DomainKind::Unclassified
    }
}
