use super::*;
use records::StepStatus;
use serde_json::json;

fn mock() -> StatusSource {
    StatusSource::connect("http://unused", true).unwrap()
}

#[test]
fn http_source_joins_paths_without_double_slash() {
    let http = HttpSource::new("http://127.0.0.1:3000/").unwrap();
    assert_eq!(http.url("/status/abc"), "http://127.0.0.1:3000/status/abc");
}

#[test]
fn server_error_reads_error_body() {
    let body = json!({"error": {"type": "Not Found", "code": "E_STATUS_NOT_FOUND", "message": "Status not found with ID: x"}});
    let SourceError::Server { status, message } = server_error(404, Some("Not Found"), &body) else {
        panic!("expected server error");
    };
    assert_eq!(status, 404);
    assert_eq!(message, "Status not found with ID: x (E_STATUS_NOT_FOUND)");
}

#[test]
fn server_error_falls_back_to_reason_phrase() {
    let SourceError::Server { message, .. } = server_error(502, Some("Bad Gateway"), &Value::Null) else {
        panic!("expected server error");
    };
    assert_eq!(message, "Bad Gateway");
}

#[test]
fn empty_mock_is_rejected() {
    assert!(matches!(MockSource::new(Vec::new()), Err(SourceError::NoSampleData)));
}

#[tokio::test]
async fn mock_ping_succeeds() {
    mock().ping().await.unwrap();
}

#[tokio::test]
async fn mock_lookup_hits_by_id() {
    let status = mock().get_status("status-003").await.unwrap();
    assert_eq!(status.status_id, "status-003");
}

#[tokio::test]
async fn mock_lookups_fall_back_to_first_record() {
    let mut source = mock();
    assert_eq!(source.get_status("nope").await.unwrap().status_id, "status-001");
    assert_eq!(source.status_by_source("nope").await.unwrap().status_id, "status-001");
    assert_eq!(source.status_by_tracking("nope").await.unwrap().status_id, "status-001");
}

#[tokio::test]
async fn mock_lookup_by_source_and_tracking() {
    let mut source = mock();
    assert_eq!(source.status_by_source("CC-123").await.unwrap().status_id, "status-003");
    assert_eq!(source.status_by_tracking("TRK-002").await.unwrap().status_id, "status-002");
}

#[tokio::test]
async fn mock_create_returns_first_record() {
    let created = mock().create_status(NewStatus::default()).await.unwrap();
    assert_eq!(created.status_id, "status-001");
}

#[tokio::test]
async fn mock_update_merges_without_persisting() {
    let mut source = mock();
    let update = StatusUpdate { status_summary: Some("Changed".into()), ..Default::default() };
    let merged = source.update_status("status-002", update).await.unwrap();
    assert_eq!(merged.status_summary, "Changed");

    let stored = source.get_status("status-002").await.unwrap();
    assert_eq!(stored.status_summary, "Annual Financial Review");
}

#[tokio::test]
async fn mock_client_listing_filters_by_stage() {
    let mut source = mock();
    let all = source.client_statuses("client-123", &ListFilter::default()).await.unwrap();
    assert_eq!(all.len(), 7);
    assert!(all.iter().all(|s| s.client_id == "client-123"));

    let stage = all[0].current_stage.clone();
    let filter = ListFilter { stage: Some(stage.clone()), ..Default::default() };
    let filtered = source.client_statuses("client-123", &filter).await.unwrap();
    assert!(!filtered.is_empty());
    assert!(filtered.iter().all(|s| s.current_stage == stage));
}

#[tokio::test]
async fn mock_client_listing_applies_stage_and_status_type() {
    let mut source = mock();
    let conflicting = ListFilter {
        stage: Some("In Progress".into()),
        status_type: Some("Completed".into()),
        ..Default::default()
    };
    assert!(source.client_statuses("client-123", &conflicting).await.unwrap().is_empty());

    let agreeing = ListFilter {
        stage: Some("In Progress".into()),
        status_type: Some("In Progress".into()),
        ..Default::default()
    };
    let found = source.client_statuses("client-123", &agreeing).await.unwrap();
    assert_eq!(found.len(), 3);

    let by_type_only = ListFilter { status_type: Some("Completed".into()), ..Default::default() };
    let completed = source.client_statuses("client-123", &by_type_only).await.unwrap();
    assert_eq!(completed.iter().map(|s| s.status_id.as_str()).collect::<Vec<_>>(), ["status-002"]);
}

#[tokio::test]
async fn mock_advisor_listing_groups_by_client() {
    let grouped = mock().advisor_client_statuses("advisor-456", &ListFilter::default()).await.unwrap();
    assert_eq!(grouped.keys().collect::<Vec<_>>(), ["client-123", "client-456"]);
    assert!(grouped["client-123"].iter().all(|s| s.advisor_id == "advisor-456"));
}

#[tokio::test]
async fn mock_advisor_listing_includes_retirement_planning() {
    let mut source = mock();
    let grouped = source.advisor_client_statuses("advisor-789", &ListFilter::default()).await.unwrap();
    let ids: Vec<&str> = grouped["client-123"].iter().map(|s| s.status_id.as_str()).collect();
    assert_eq!(ids, ["status-004", "status-007"]);
    assert_eq!(source.status_by_source("PLAN-123").await.unwrap().status_id, "status-007");
}

#[tokio::test]
async fn mock_search_uses_shared_predicates() {
    let criteria = SearchCriteria { text_search: Some("loan".into()), ..Default::default() };
    let found = mock().search_statuses(&criteria).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].status_id, "status-004");
}

#[tokio::test]
async fn mock_complete_step_persists_and_advances() {
    let mut source = mock();
    let updated = source.complete_step("status-001", "step-001-4", Some("done".into())).await.unwrap();
    let step = updated.steps().iter().find(|s| s.step_id == "step-001-4").unwrap();
    assert_eq!(step.status, StepStatus::Completed);
    assert_eq!(updated.current_step_id.as_deref(), Some("step-001-5"));

    let reloaded = source.get_status("status-001").await.unwrap();
    assert_eq!(reloaded.current_step_id.as_deref(), Some("step-001-5"));
}

#[tokio::test]
async fn mock_unknown_step_leaves_status_unchanged() {
    let mut source = mock();
    let before = source.get_status("status-005").await.unwrap();
    let after = source.block_step("status-005", "step-missing", "waiting").await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn mock_step_on_unknown_status_returns_first_record() {
    let status = mock().skip_step("status-missing", "step-1", "n/a").await.unwrap();
    assert_eq!(status.status_id, "status-001");
}

#[tokio::test]
async fn mock_reorder_sorts_steps() {
    let mut source = mock();
    let order = vec![
        StepOrder { step_id: "step-005-1".into(), order: 9 },
        StepOrder { step_id: "step-005-5".into(), order: 0 },
    ];
    let updated = source.reorder_steps("status-005", order).await.unwrap();
    assert_eq!(updated.steps().first().unwrap().step_id, "step-005-5");
    assert_eq!(updated.steps().last().unwrap().step_id, "step-005-1");
}

#[tokio::test]
async fn mock_analytics_are_computed_locally() {
    let source = mock();
    let summary = source.analytics_summary().await.unwrap();
    assert_eq!(summary.api_requests.values.len(), 30);

    let params = EmbeddingParams { view: View::Cluster, count: Some(20), seed: Some(4), ..Default::default() };
    let plot = source.embedding(params).await.unwrap();
    assert_eq!(plot.marks.len(), 20);
    assert_eq!(plot, source.embedding(params).await.unwrap());
}
