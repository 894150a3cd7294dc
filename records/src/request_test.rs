use super::*;

const NOW: &str = "2024-02-01T12:00:00Z";

fn new_status() -> NewStatus {
    NewStatus {
        client_id: Some("client-9".into()),
        advisor_id: Some("advisor-2".into()),
        status_type: Some("Account Opening".into()),
        status_summary: Some("Brokerage account opening".into()),
        created_by: Some("advisor-2".into()),
        ..Default::default()
    }
}

// =============================================================================
// CREATE
// =============================================================================

#[test]
fn into_status_starts_initiated_with_one_history_item() {
    let status = new_status().into_status("s-1".into(), "TRK-00000001".into(), NOW).unwrap();
    assert_eq!(status.status_id, "s-1");
    assert_eq!(status.current_stage, INITIAL_STAGE);
    assert_eq!(status.created_date, NOW);
    assert_eq!(status.last_updated_date, NOW);
    assert_eq!(status.last_updated_by, "advisor-2");

    let history = status.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].new_stage, "Initiated");
    assert_eq!(history[0].change_description.as_deref(), Some("Status created"));
    assert!(history[0].previous_stage.is_none());
}

#[test]
fn into_status_defaults_collections_to_empty() {
    let status = new_status().into_status("s-1".into(), "TRK-00000001".into(), NOW).unwrap();
    assert_eq!(status.required_actions, Some(Vec::new()));
    assert_eq!(status.completed_actions, Some(Vec::new()));
    assert_eq!(status.tags, Some(BTreeMap::new()));
    assert_eq!(status.metadata, Some(BTreeMap::new()));
    assert_eq!(status.status_details, Some(serde_json::json!({})));
}

#[test]
fn into_status_prefers_caller_tracking_id() {
    let mut body = new_status();
    body.tracking_id = Some("TRK-CUSTOM".into());
    let status = body.into_status("s-1".into(), "TRK-00000001".into(), NOW).unwrap();
    assert_eq!(status.tracking_id, "TRK-CUSTOM");

    let mut body = new_status();
    body.tracking_id = Some(String::new());
    let status = body.into_status("s-1".into(), "TRK-00000001".into(), NOW).unwrap();
    assert_eq!(status.tracking_id, "TRK-00000001");
}

#[test]
fn into_status_reports_first_missing_field() {
    let mut body = new_status();
    body.advisor_id = None;
    body.status_summary = None;
    let err = body.into_status("s-1".into(), "t".into(), NOW).unwrap_err();
    assert_eq!(err, MissingField("advisorId"));
    assert_eq!(err.to_string(), "advisorId is required");
}

#[test]
fn into_status_treats_blank_as_missing() {
    let mut body = new_status();
    body.status_summary = Some("   ".into());
    assert_eq!(body.into_status("s-1".into(), "t".into(), NOW).unwrap_err(), MissingField("statusSummary"));
}

#[test]
fn new_status_parses_camel_case_body() {
    let body: NewStatus = serde_json::from_str(
        r#"{"clientId":"c","advisorId":"a","statusType":"Review","statusSummary":"s","tags":{"k":"v"}}"#,
    )
    .unwrap();
    assert_eq!(body.client_id.as_deref(), Some("c"));
    assert_eq!(body.tags.unwrap().get("k").map(String::as_str), Some("v"));
}

// =============================================================================
// UPDATE
// =============================================================================

fn existing() -> Status {
    let mut status = new_status().into_status("s-1".into(), "TRK-1".into(), "2024-01-01T00:00:00Z").unwrap();
    status.metadata = Some(BTreeMap::from([
        ("sentiment".to_owned(), serde_json::json!("neutral")),
        ("source".to_owned(), serde_json::json!("web")),
    ]));
    status.tags = Some(BTreeMap::from([("old".to_owned(), "tag".to_owned())]));
    status
}

#[test]
fn stage_change_appends_history() {
    let mut status = existing();
    let update = StatusUpdate {
        current_stage: Some("In Progress".into()),
        updated_by: Some("advisor-7".into()),
        change_reason: Some("docs received".into()),
        ..Default::default()
    };
    assert!(update.apply_to(&mut status, NOW));

    assert_eq!(status.current_stage, "In Progress");
    assert_eq!(status.last_updated_by, "advisor-7");
    assert_eq!(status.last_updated_date, NOW);
    let last = status.history().last().unwrap();
    assert_eq!(last.previous_stage.as_deref(), Some("Initiated"));
    assert_eq!(last.new_stage, "In Progress");
    assert_eq!(last.changed_by, "advisor-7");
    assert_eq!(last.change_reason.as_deref(), Some("docs received"));
}

#[test]
fn same_stage_does_not_append_history() {
    let mut status = existing();
    let update = StatusUpdate { current_stage: Some("Initiated".into()), ..Default::default() };
    assert!(!update.apply_to(&mut status, NOW));
    assert_eq!(status.history().len(), 1);
}

#[test]
fn metadata_merges_and_tags_replace() {
    let mut status = existing();
    let update = StatusUpdate {
        metadata: Some(BTreeMap::from([("sentiment".to_owned(), serde_json::json!("positive"))])),
        tags: Some(BTreeMap::from([("new".to_owned(), "tag".to_owned())])),
        ..Default::default()
    };
    update.apply_to(&mut status, NOW);

    let metadata = status.metadata.as_ref().unwrap();
    assert_eq!(metadata.get("sentiment"), Some(&serde_json::json!("positive")));
    assert_eq!(metadata.get("source"), Some(&serde_json::json!("web")));
    let tags = status.tags.as_ref().unwrap();
    assert!(tags.contains_key("new"));
    assert!(!tags.contains_key("old"));
}

#[test]
fn absent_fields_are_untouched() {
    let mut status = existing();
    status.priority = Some("High".into());
    StatusUpdate::default().apply_to(&mut status, NOW);
    assert_eq!(status.priority.as_deref(), Some("High"));
    assert_eq!(status.status_summary, "Brokerage account opening");
}

#[test]
fn reorder_body_uses_step_order_key() {
    let body: ReorderSteps = serde_json::from_str(r#"{"stepOrder":[{"stepId":"a","order":2}]}"#).unwrap();
    assert_eq!(body.step_order, vec![StepOrder { step_id: "a".into(), order: 2 }]);
}
