//! Property-based tests for filter invariants

use dgate_core::{DomainFilter, DomainKind, Rules, ServiceKey, ServiceType};
use proptest::prelude::*;
use std::collections::HashSet;

fn arb_key() -> impl Strategy<Value = ServiceKey> {
    // Small alphabet so rule keys and candidates collide often
    prop::collection::vec(0u8..4, 1..3).prop_map(ServiceKey::new)
}

fn arb_type() -> impl Strategy<Value = ServiceType> {
    prop_oneof![
        Just(ServiceType::LOCAL_FILE_DOMAIN),
        Just(ServiceType::LOCAL_TAG),
        (0u32..16).prop_map(ServiceType),
    ]
}

fn arb_rules() -> impl Strategy<Value = Vec<(ServiceKey, ServiceType)>> {
    prop::collection::vec((arb_key(), arb_type()), 0..12)
}

proptest! {
    #[test]
    fn filter_is_set_difference(rules in arb_rules(), candidates in prop::collection::hash_set(arb_key(), 0..12)) {
        let filter = DomainFilter::from_rules(rules.into_iter().collect());

        let denied: HashSet<ServiceKey> = filter
            .blacklisted(DomainKind::File)
            .union(&filter.blacklisted(DomainKind::Tag))
            .cloned()
            .collect();
        let expected: HashSet<ServiceKey> = candidates.difference(&denied).cloned().collect();

        prop_assert_eq!(filter.filter(&candidates), expected);
        for key in &candidates {
            prop_assert_eq!(filter.domain_ok(key), !denied.contains(key));
        }
    }

    #[test]
    fn blacklists_match_classification(rules in arb_rules()) {
        let filter = DomainFilter::from_rules(rules.into_iter().collect());
        let file = filter.blacklisted(DomainKind::File);
        let tag = filter.blacklisted(DomainKind::Tag);

        prop_assert!(file.is_disjoint(&tag));
        prop_assert_eq!(filter.allows_everything(), file.is_empty() && tag.is_empty());

        for (key, service_type) in filter.rules().iter() {
            prop_assert_eq!(file.contains(key), service_type.kind() == DomainKind::File);
            prop_assert_eq!(tag.contains(key), service_type.kind() == DomainKind::Tag);
        }
    }

    #[test]
    fn add_rule_is_idempotent(rules in arb_rules(), key in arb_key(), service_type in arb_type()) {
        let once = DomainFilter::from_rules(rules.iter().cloned().collect());
        let twice = DomainFilter::from_rules(rules.into_iter().collect());

        once.add_rule(key.clone(), service_type);
        twice.add_rule(key.clone(), service_type);
        twice.add_rule(key, service_type);

        prop_assert_eq!(once.rules(), twice.rules());
    }

    #[test]
    fn add_then_remove_restores_rules(rules in arb_rules(), key in arb_key(), service_type in arb_type()) {
        let rules: Rules = rules.into_iter().filter(|(k, _)| *k != key).collect();
        let filter = DomainFilter::from_rules(rules.clone());

        filter.add_rule(key.clone(), service_type);
        filter.remove_rule(&key);

        prop_assert_eq!(filter.rules(), rules);
    }

    #[test]
    fn diff_with_self_is_empty(rules in arb_rules()) {
        let filter = DomainFilter::from_rules(rules.into_iter().collect());
        let changes = filter.changes_since(&filter.clone());

        prop_assert!(changes.added.is_empty());
        prop_assert!(changes.changed.is_empty());
        prop_assert!(changes.removed.is_empty());
        prop_assert_eq!(filter.changes_summary(&filter.clone()), "");
    }

    #[test]
    fn json_roundtrip_preserves_rules(rules in arb_rules()) {
        let filter = DomainFilter::from_rules(rules.into_iter().collect());
        let json = filter.to_json().unwrap();
        let decoded = DomainFilter::from_json(json.as_bytes()).unwrap();

        prop_assert_eq!(decoded.rules(), filter.rules());
        prop_assert!(decoded == filter);
    }
}
