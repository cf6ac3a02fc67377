//! Tests for task documents and workflow enums

use handoff::models::{Priority, Stage, TaskDocument, Zone, section};

use crate::common::fixtures::TaskBuilder;

// =============================================================================
// ZONE TESTS
// =============================================================================

#[test]
fn test_zone_from_str() {
    assert_eq!("cloud".parse::<Zone>().unwrap(), Zone::Cloud);
    assert_eq!("LOCAL".parse::<Zone>().unwrap(), Zone::Local);
    assert_eq!("low-trust".parse::<Zone>().unwrap(), Zone::Cloud);
    assert_eq!("high-trust".parse::<Zone>().unwrap(), Zone::Local);
    assert!("orbit".parse::<Zone>().is_err());
}

#[test]
fn test_zone_labels() {
    assert_eq!(Zone::Cloud.dir_name(), "cloud");
    assert_eq!(Zone::Local.trust_label(), "high-trust");
    assert_eq!(Zone::Cloud.to_string(), "cloud");
}

// =============================================================================
// STAGE TESTS
// =============================================================================

#[test]
fn test_stage_from_str() {
    assert_eq!("inbox".parse::<Stage>().unwrap(), Stage::Inbox);
    assert_eq!("pending-approval".parse::<Stage>().unwrap(), Stage::PendingApproval);
    assert_eq!("pending_approval".parse::<Stage>().unwrap(), Stage::PendingApproval);
    assert_eq!("DONE".parse::<Stage>().unwrap(), Stage::Done);
    assert_eq!("failed".parse::<Stage>().unwrap(), Stage::Failed);
    assert!("limbo".parse::<Stage>().is_err());
}

#[test]
fn test_stage_terminal() {
    assert!(Stage::Done.is_terminal());
    assert!(Stage::Rejected.is_terminal());
    assert!(Stage::Failed.is_terminal());
    assert!(!Stage::Pending.is_terminal());
    assert!(!Stage::PendingApproval.is_terminal());
}

#[test]
fn test_stage_dir_names_unique() {
    let mut names: Vec<&str> = Stage::ALL.iter().map(|s| s.dir_name()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), Stage::ALL.len());
}

// =============================================================================
// PRIORITY TESTS
// =============================================================================

#[test]
fn test_priority_from_str() {
    assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
    assert_eq!("URGENT".parse::<Priority>().unwrap(), Priority::Critical);
    assert_eq!("med".parse::<Priority>().unwrap(), Priority::Medium);
    assert!("p9".parse::<Priority>().is_err());
}

#[test]
fn test_priority_default() {
    assert_eq!(Priority::default(), Priority::Medium);
}

// =============================================================================
// TASK DOCUMENT TESTS
// =============================================================================

#[test]
fn test_document_render_parse_round_trip() {
    let doc = TaskBuilder::new()
        .title("Review draft")
        .task_type("draft")
        .priority(Priority::High)
        .body("Please review the attached draft.")
        .build();

    let parsed = TaskDocument::parse(&doc.render());
    assert_eq!(parsed.title, "Review draft");
    assert_eq!(parsed.task_type(), "draft");
    assert_eq!(parsed.priority(), Priority::High);
    assert_eq!(parsed.source(), "test");
    assert!(parsed.body.contains("Please review the attached draft."));
}

#[test]
fn test_document_metadata_case_insensitive() {
    let doc = TaskDocument::parse("# T\n\n**TYPE**: draft\n**Priority**: low\n");
    assert_eq!(doc.meta("type"), Some("draft"));
    assert_eq!(doc.priority(), Priority::Low);
}

#[test]
fn test_document_missing_metadata_falls_back() {
    let doc = TaskDocument::parse("# Bare\n\nJust a body.\n");
    assert_eq!(doc.task_type(), "unknown");
    assert_eq!(doc.priority(), Priority::Medium);
    assert_eq!(doc.source(), "unknown");
    assert!(doc.body.contains("Just a body."));
}

#[test]
fn test_document_body_keeps_later_headings() {
    let content = "# T\n\n**Type**: draft\n\nBody text.\n\n## Processing\n\nDetails.\n";
    let doc = TaskDocument::parse(content);
    assert!(doc.body.contains("## Processing"));
    assert!(doc.body.contains("Details."));
}

#[test]
fn test_section_is_delimited_and_stamped() {
    let rendered = section("Execution", "All done.");
    assert!(rendered.starts_with("\n## Execution\n"));
    assert!(rendered.contains("**Timestamp**: "));
    assert!(rendered.trim_end().ends_with("All done."));
}
