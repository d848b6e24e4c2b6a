//! Integration tests for saving and loading filters

use dgate_core::filter::{decode, encode, Changes};
use dgate_core::{DomainFilter, Error, Rules, ServiceKey, ServiceType};
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn key(s: &str) -> ServiceKey {
    ServiceKey::from(s)
}

#[test]
fn test_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rules.json");

    let filter = DomainFilter::new();
    filter.add_rule(key("x"), ServiceType::LOCAL_TAG);
    filter.add_rule(ServiceKey::new(vec![0x00, 0xff, 0x10]), ServiceType::LOCAL_FILE_DOMAIN);
    filter.add_rule(key("kept-but-inert"), ServiceType::COMBINED_TAG);
    filter.save(&path).unwrap();

    let loaded = DomainFilter::load(&path).unwrap();
    assert_eq!(loaded, filter);
    assert!(!loaded.domain_ok(&key("x")));
    assert!(!loaded.domain_ok(&ServiceKey::new(vec![0x00, 0xff, 0x10])));
    assert!(loaded.domain_ok(&key("kept-but-inert")));
}

#[test]
fn test_corrupted_payload_is_format_error() {
    let filter = DomainFilter::new();
    filter.add_rule(key("x"), ServiceType::LOCAL_TAG);

    let mut bytes = filter.to_json().unwrap().into_bytes();
    // "x" encodes as the key "78"; break its first hex digit
    let pos = bytes
        .windows(4)
        .position(|w| w == b"\"78\"")
        .unwrap();
    bytes[pos + 1] = b'!';

    let err = DomainFilter::from_json(&bytes).unwrap_err();
    assert!(err.is_format());

    let fresh = DomainFilter::new();
    assert!(fresh.is_empty());
    assert!(fresh.allows_everything());
}

#[test]
fn test_truncated_payload_is_format_error() {
    let json = encode(&[(key("x"), ServiceType::LOCAL_TAG)].into_iter().collect()).unwrap();
    let truncated = &json.as_bytes()[..json.len() - 3];
    assert!(matches!(decode(truncated), Err(Error::Json(_))));
}

#[test]
fn test_failed_replace_leaves_filter_untouched() {
    let filter = DomainFilter::new();
    filter.add_rule(key("x"), ServiceType::LOCAL_TAG);
    let generation = filter.generation();

    let bad = br#"{"name":"Domain Filter Rules","version":1,"rules":[["00",2],["nothex",5]]}"#;
    assert!(filter.replace_from_json(bad).is_err());

    assert_eq!(filter.generation(), generation);
    assert_eq!(filter.len(), 1);
    assert!(!filter.domain_ok(&key("x")));
}

#[test]
fn test_unsupported_version() {
    let data = br#"{"name":"Domain Filter Rules","version":9,"rules":[]}"#;
    assert!(matches!(
        DomainFilter::from_json(data),
        Err(Error::UnsupportedVersion { found: 9, .. })
    ));
}

#[test]
fn test_load_or_default_falls_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not a filter").unwrap();

    let filter = DomainFilter::load_or_default(&path);
    assert!(filter.is_empty());

    let missing = DomainFilter::load_or_default(dir.path().join("missing.json"));
    assert!(missing.is_empty());
}

#[test]
fn test_load_missing_is_io_error() {
    let dir = tempdir().unwrap();
    let err = DomainFilter::load(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_large_envelope_roundtrip() {
    const RULES: usize = 50_000;

    let rules: Rules = (0..RULES)
        .map(|i| {
            let service_type = if i % 3 == 0 {
                ServiceType::LOCAL_FILE_DOMAIN
            } else {
                ServiceType::LOCAL_TAG
            };
            (ServiceKey::from(format!("service-{i}").as_str()), service_type)
        })
        .collect();
    assert_eq!(rules.len(), RULES);

    let json = encode(&rules).unwrap();

    let started = Instant::now();
    let decoded = decode(json.as_bytes()).unwrap();
    let changes = Changes::between(&rules, &decoded);
    let elapsed = started.elapsed();

    assert_eq!(decoded, rules);
    assert!(changes.is_empty());
    assert_eq!(
        decoded.iter().next().map(|(k, _)| k.clone()),
        Some(ServiceKey::from("service-0"))
    );
    assert_eq!(
        decoded.iter().last().map(|(k, _)| k.clone()),
        Some(ServiceKey::from(format!("service-{}", RULES - 1).as_str()))
    );
    // Linear work; a per-key scan of the rule list takes minutes at this size
    assert!(elapsed < Duration::from_secs(10), "decode and diff took {elapsed:?}");
}
