//! Tests for the transfer policy filter

use handoff::config::PolicyRules;
use handoff::policy::{PolicyFilter, PolicyViolation};

fn filter() -> PolicyFilter {
    PolicyFilter::new(PolicyRules::default())
}

#[test]
fn test_clean_markdown_passes() {
    assert!(filter().evaluate("test.md", "# Safe content").is_ok());
}

#[test]
fn test_non_markdown_rejected() {
    let err = filter().evaluate("notes.txt", "# Safe content").unwrap_err();
    assert!(matches!(err, PolicyViolation::WrongFormat { .. }));
}

#[test]
fn test_oversized_payload_rejected() {
    let rules = PolicyRules {
        max_size_bytes: 16,
        ..PolicyRules::default()
    };
    let body = "This body is longer than sixteen bytes.";
    let err = PolicyFilter::new(rules).evaluate("big.md", body).unwrap_err();
    match err {
        PolicyViolation::TooLarge { size, limit, .. } => {
            assert_eq!(size, body.len() as u64);
            assert_eq!(limit, 16);
        },
        other => panic!("expected TooLarge, got {other}"),
    }
}

#[test]
fn test_excluded_name_rejected_without_content_inspection() {
    // The body is clean; the name alone blocks the transfer.
    let err = filter().evaluate("credential-rotation.md", "# Safe content").unwrap_err();
    assert!(matches!(err, PolicyViolation::ExcludedName { .. }));
}

#[test]
fn test_forbidden_content_rejected_case_insensitively() {
    let err = filter().evaluate("update.md", "API_KEY = sk-123").unwrap_err();
    match err {
        PolicyViolation::ForbiddenContent { term, .. } => assert_eq!(term, "api_key"),
        other => panic!("expected ForbiddenContent, got {other}"),
    }
}

#[test]
fn test_rules_evaluate_in_order() {
    // A candidate failing several rules reports the earliest one: format
    // before size, size before name, name before content.
    let rules = PolicyRules {
        max_size_bytes: 4,
        ..PolicyRules::default()
    };
    let filter = PolicyFilter::new(rules);

    let err = filter.evaluate("secret.txt", "password = hunter2").unwrap_err();
    assert!(matches!(err, PolicyViolation::WrongFormat { .. }));

    let err = filter.evaluate("secret.md", "password = hunter2").unwrap_err();
    assert!(matches!(err, PolicyViolation::TooLarge { .. }));
}

#[test]
fn test_custom_rule_set_is_honored() {
    let rules = PolicyRules {
        forbidden_content_terms: vec!["classified".to_string()],
        excluded_name_patterns: Vec::new(),
        ..PolicyRules::default()
    };
    let filter = PolicyFilter::new(rules);

    // Default terms no longer apply; only the configured one does.
    assert!(filter.evaluate("token.md", "password here").is_ok());
    assert!(filter.evaluate("notes.md", "This is CLASSIFIED material").is_err());
}
