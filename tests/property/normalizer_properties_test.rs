//! Property-based tests for URL normalization.
//!
//! These tests verify that normalization never panics, always yields an
//! absolute http(s) URL for well-formed hosts, and that the lookup variant
//! set always leads with the caller's literal input.

use linkshelf::services::url_normalizer::{
    ensure_scheme, has_scheme, lookup_variants, normalize, strip_scheme,
};
use proptest::prelude::*;

/// Strategy for schemeless host[/path] strings.
fn arb_bare_url() -> impl Strategy<Value = String> {
    (
        "[a-z][a-z0-9]{1,12}",
        prop_oneof![Just(".com"), Just(".org"), Just(".dev"), Just(".io")],
        proptest::option::of("/[a-z0-9]{1,10}"),
    )
        .prop_map(|(host, tld, path)| format!("{}{}{}", host, tld, path.unwrap_or_default()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn normalize_never_panics(input in any::<String>()) {
        let _ = normalize(&input);
        let _ = lookup_variants(&input);
        let _ = strip_scheme(&input);
    }

    #[test]
    fn schemeless_hosts_get_http(bare in arb_bare_url()) {
        let normalized = normalize(&bare);
        prop_assert!(normalized.starts_with("http://"));
        prop_assert!(normalized.contains(&bare));
    }

    #[test]
    fn normalize_is_idempotent_for_valid_hosts(bare in arb_bare_url()) {
        let once = normalize(&bare);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn ensure_scheme_always_yields_scheme(input in "[ -~]{0,40}") {
        prop_assert!(has_scheme(&ensure_scheme(&input)));
    }

    #[test]
    fn variants_lead_with_literal_and_are_unique(input in "[a-zA-Z0-9:/.]{1,40}") {
        let variants = lookup_variants(&input);
        prop_assert_eq!(&variants[0], &input);
        for (i, v) in variants.iter().enumerate() {
            prop_assert!(!v.is_empty());
            prop_assert!(!variants[i + 1..].contains(v));
        }
    }

    #[test]
    fn variants_cover_both_schemes_for_bare_input(bare in arb_bare_url()) {
        let variants = lookup_variants(&bare);
        let http = format!("http://{bare}");
        let https = format!("https://{bare}");
        prop_assert!(variants.contains(&http));
        prop_assert!(variants.contains(&https));
    }
}
