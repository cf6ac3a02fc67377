//! Tests for the reference sensitivity classifier

use handoff::config::SensitivityThresholds;
use handoff::policy::{SensitivityCategory, SensitivityClassifier, ThresholdClassifier};

fn classifier() -> ThresholdClassifier {
    ThresholdClassifier::new(SensitivityThresholds::default()).unwrap()
}

#[test]
fn test_financial_above_threshold_is_flagged() {
    let hit = classifier()
        .classify("Initiate a banking transfer of $150 to the supplier.")
        .unwrap();
    assert_eq!(hit.category, SensitivityCategory::Financial);
    assert!(hit.detail.contains("$150.00"));
    assert!(hit.detail.contains("$100.00"));
}

#[test]
fn test_financial_below_threshold_still_gates() {
    let hit = classifier().classify("Process a payment of $25.").unwrap();
    assert_eq!(hit.category, SensitivityCategory::Financial);
    assert_eq!(hit.detail, "financial operation");
}

#[test]
fn test_amount_parsing_handles_commas_and_takes_the_max() {
    let hit = classifier()
        .classify("banking: move $90, then $1,250.50, then $40")
        .unwrap();
    assert!(hit.detail.contains("$1250.50"));
}

#[test]
fn test_approval_language_is_flagged_first() {
    // "approve" wins over the financial terms also present.
    let hit = classifier().classify("Please approve this $500 transfer.").unwrap();
    assert_eq!(hit.category, SensitivityCategory::ApprovalLanguage);
}

#[test]
fn test_api_call_is_flagged() {
    let hit = classifier().classify("Run the api_call to refresh the cache.").unwrap();
    assert_eq!(hit.category, SensitivityCategory::ApiCall);
}

#[test]
fn test_email_send_is_flagged() {
    let hit = classifier().classify("send_email to the whole customer list").unwrap();
    assert_eq!(hit.category, SensitivityCategory::EmailSend);
}

#[test]
fn test_bulk_delete_above_threshold_is_flagged() {
    let many_files = (0..12).map(|i| format!("file{i}")).collect::<Vec<_>>().join(", ");
    let hit = classifier().classify(&format!("delete these: {many_files}")).unwrap();
    assert_eq!(hit.category, SensitivityCategory::BulkDelete);
}

#[test]
fn test_small_delete_is_not_flagged() {
    assert!(classifier().classify("delete the temp file and the log file").is_none());
}

#[test]
fn test_safe_content_is_not_flagged() {
    assert!(classifier().classify("Write a short summary of the meeting notes.").is_none());
}

#[test]
fn test_flags_can_be_disabled() {
    let thresholds = SensitivityThresholds {
        flag_api_calls: false,
        flag_email_send: false,
        ..SensitivityThresholds::default()
    };
    let classifier = ThresholdClassifier::new(thresholds).unwrap();

    assert!(classifier.classify("run the api_call now").is_none());
    assert!(classifier.classify("send_email to the team").is_none());
}
