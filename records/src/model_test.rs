use super::*;

fn minimal_json() -> serde_json::Value {
    serde_json::json!({
        "statusId": "status1",
        "clientId": "client123",
        "advisorId": "advisor456",
        "statusType": "Application",
        "currentStage": "In Progress",
        "statusSummary": "Loan Application",
        "createdDate": "2023-01-01T10:00:00Z",
        "lastUpdatedDate": "2023-01-02T14:30:00Z",
        "createdBy": "system",
        "lastUpdatedBy": "advisor456",
        "trackingId": "TRK123"
    })
}

#[test]
fn step_status_uses_display_names_on_the_wire() {
    let json = serde_json::to_string(&StepStatus::NotStarted).unwrap();
    assert_eq!(json, "\"Not Started\"");
    let json = serde_json::to_string(&StepStatus::InProgress).unwrap();
    assert_eq!(json, "\"In Progress\"");
    let parsed: StepStatus = serde_json::from_str("\"Skipped\"").unwrap();
    assert_eq!(parsed, StepStatus::Skipped);
}

#[test]
fn step_status_as_str_matches_wire_form() {
    for s in [
        StepStatus::NotStarted,
        StepStatus::InProgress,
        StepStatus::Completed,
        StepStatus::Blocked,
        StepStatus::Skipped,
    ] {
        assert_eq!(serde_json::to_value(s).unwrap(), s.as_str());
    }
    assert!(serde_json::from_str::<StepStatus>("\"done\"").is_err());
}

#[test]
fn settled_is_completed_or_skipped() {
    assert!(StepStatus::Completed.is_settled());
    assert!(StepStatus::Skipped.is_settled());
    assert!(!StepStatus::Blocked.is_settled());
    assert!(!StepStatus::InProgress.is_settled());
    assert!(!StepStatus::NotStarted.is_settled());
}

#[test]
fn missing_optional_collections_degrade_to_empty() {
    let status: Status = serde_json::from_value(minimal_json()).unwrap();
    assert!(status.steps().is_empty());
    assert!(status.history().is_empty());
    assert!(status.sub_transactions().is_empty());
    assert!(status.source_id.is_none());
    assert!(status.metadata_str("sentiment").is_none());
}

#[test]
fn absent_optionals_are_not_serialized() {
    let status: Status = serde_json::from_value(minimal_json()).unwrap();
    let value = serde_json::to_value(&status).unwrap();
    let obj = value.as_object().unwrap();
    assert!(!obj.contains_key("steps"));
    assert!(!obj.contains_key("statusHistory"));
    assert_eq!(obj.get("trackingId").and_then(|v| v.as_str()), Some("TRK123"));
}

#[test]
fn step_without_order_or_status_defaults() {
    let step: Step = serde_json::from_value(serde_json::json!({
        "stepId": "s1",
        "name": "Collect documents"
    }))
    .unwrap();
    assert_eq!(step.order, 0);
    assert_eq!(step.status, StepStatus::NotStarted);
}

#[test]
fn document_kind_serializes_as_type() {
    let doc = Document { name: "W2".into(), kind: "PDF".into(), url: "https://example.com/w2.pdf".into() };
    let value = serde_json::to_value(&doc).unwrap();
    assert_eq!(value.get("type").and_then(|v| v.as_str()), Some("PDF"));
}

#[test]
fn push_history_creates_list() {
    let mut status: Status = serde_json::from_value(minimal_json()).unwrap();
    status.push_history(StatusHistoryItem {
        timestamp: "2023-01-03T00:00:00Z".into(),
        changed_by: "advisor456".into(),
        new_stage: "Completed".into(),
        ..StatusHistoryItem::default()
    });
    assert_eq!(status.history().len(), 1);
}
