use std::collections::BTreeMap;

use super::*;

fn status(id: &str, client: &str, stage: &str, created: &str) -> Status {
    Status {
        status_id: id.into(),
        client_id: client.into(),
        advisor_id: "advisor-1".into(),
        status_type: "Application".into(),
        current_stage: stage.into(),
        status_summary: format!("Summary for {id}"),
        created_date: created.into(),
        ..Status::default()
    }
}

fn history(ts: &str, stage: &str) -> StatusHistoryItem {
    StatusHistoryItem { timestamp: ts.into(), changed_by: "system".into(), new_stage: stage.into(), ..Default::default() }
}

// =============================================================================
// SEARCH
// =============================================================================

#[test]
fn empty_criteria_match_everything() {
    let all = vec![status("a", "c1", "Open", "2023-01-01T00:00:00Z"), status("b", "c2", "Done", "2023-01-01T00:00:00Z")];
    assert_eq!(search(&all, &SearchCriteria::default()).len(), 2);
}

#[test]
fn search_text_is_case_insensitive_substring() {
    let mut s = status("a", "c1", "Open", "2023-01-01T00:00:00Z");
    s.status_summary = "Mortgage Application".into();
    let criteria = SearchCriteria { text_search: Some("mortGAGE".into()), ..Default::default() };
    assert!(criteria.matches(&s));
    let criteria = SearchCriteria { text_search: Some("refinance".into()), ..Default::default() };
    assert!(!criteria.matches(&s));
}

#[test]
fn search_priority_requires_present_value() {
    let mut s = status("a", "c1", "Open", "2023-01-01T00:00:00Z");
    let criteria = SearchCriteria { priority: Some("High".into()), ..Default::default() };
    assert!(!criteria.matches(&s));
    s.priority = Some("High".into());
    assert!(criteria.matches(&s));
}

#[test]
fn search_sentiment_reads_metadata() {
    let mut s = status("a", "c1", "Open", "2023-01-01T00:00:00Z");
    let mut meta = BTreeMap::new();
    meta.insert("sentiment".to_owned(), serde_json::json!("positive"));
    s.metadata = Some(meta);
    let hit = SearchCriteria { sentiment: Some("positive".into()), ..Default::default() };
    let miss = SearchCriteria { sentiment: Some("negative".into()), ..Default::default() };
    assert!(hit.matches(&s));
    assert!(!miss.matches(&s));
}

#[test]
fn search_tags_require_every_entry() {
    let mut s = status("a", "c1", "Open", "2023-01-01T00:00:00Z");
    let mut tags = BTreeMap::new();
    tags.insert("region".to_owned(), "west".to_owned());
    tags.insert("tier".to_owned(), "gold".to_owned());
    s.tags = Some(tags);

    let mut wanted = HashMap::new();
    wanted.insert("region".to_owned(), "west".to_owned());
    let criteria = SearchCriteria { tag: Some(wanted.clone()), ..Default::default() };
    assert!(criteria.matches(&s));

    wanted.insert("tier".to_owned(), "silver".to_owned());
    let criteria = SearchCriteria { tag: Some(wanted), ..Default::default() };
    assert!(!criteria.matches(&s));
}

#[test]
fn search_combines_exact_fields() {
    let all = vec![
        status("a", "c1", "Open", "2023-01-01T00:00:00Z"),
        status("b", "c1", "Done", "2023-01-01T00:00:00Z"),
        status("c", "c2", "Open", "2023-01-01T00:00:00Z"),
    ];
    let criteria = SearchCriteria { client_id: Some("c1".into()), current_stage: Some("Open".into()), ..Default::default() };
    let found = search(&all, &criteria);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].status_id, "a");
}

// =============================================================================
// LIST FILTER
// =============================================================================

#[test]
fn list_filter_by_stage_and_type() {
    let all = vec![status("a", "c1", "In Progress", "2023-01-01T00:00:00Z"), status("b", "c1", "Completed", "2023-01-01T00:00:00Z")];
    let filter = ListFilter { stage: Some("Completed".into()), ..Default::default() };
    let found = filter.apply(&all).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].status_id, "b");

    let filter = ListFilter { status_type: Some("Review".into()), ..Default::default() };
    assert!(filter.apply(&all).unwrap().is_empty());
}

#[test]
fn list_filter_ignores_empty_strings() {
    let all = vec![status("a", "c1", "In Progress", "2023-01-01T00:00:00Z")];
    let filter = ListFilter { stage: Some(String::new()), from_date: Some(String::new()), ..Default::default() };
    assert_eq!(filter.apply(&all).unwrap().len(), 1);
}

#[test]
fn list_filter_date_bounds_are_inclusive() {
    let all = vec![
        status("jan", "c1", "Open", "2023-01-15T00:00:00Z"),
        status("feb", "c1", "Open", "2023-02-15T00:00:00Z"),
        status("mar", "c1", "Open", "2023-03-15T00:00:00Z"),
    ];
    let filter = ListFilter {
        from_date: Some("2023-02-15T00:00:00Z".into()),
        to_date: Some("2023-03-15T00:00:00Z".into()),
        ..Default::default()
    };
    let ids: Vec<String> = filter.apply(&all).unwrap().into_iter().map(|s| s.status_id).collect();
    assert_eq!(ids, vec!["feb", "mar"]);
}

#[test]
fn list_filter_rejects_bad_dates() {
    let filter = ListFilter { to_date: Some("last week".into()), ..Default::default() };
    let err = filter.apply(&[]).unwrap_err();
    assert_eq!(err, QueryError::InvalidDate { field: "toDate", value: "last week".into() });
}

#[test]
fn group_by_client_preserves_order_within_client() {
    let grouped = group_by_client(vec![
        status("a", "c2", "Open", "2023-01-01T00:00:00Z"),
        status("b", "c1", "Open", "2023-01-01T00:00:00Z"),
        status("c", "c2", "Open", "2023-01-01T00:00:00Z"),
    ]);
    assert_eq!(grouped.keys().collect::<Vec<_>>(), vec!["c1", "c2"]);
    let c2: Vec<&str> = grouped["c2"].iter().map(|s| s.status_id.as_str()).collect();
    assert_eq!(c2, vec!["a", "c"]);
}

// =============================================================================
// HISTORY
// =============================================================================

#[test]
fn history_sorts_newest_first() {
    let mut s = status("a", "c1", "Open", "2023-01-01T00:00:00Z");
    s.status_history = Some(vec![
        history("2023-05-15T10:30:00Z", "Initiated"),
        history("2023-05-18T14:45:00Z", "In Progress"),
        history("2023-05-16T09:15:00Z", "Document Upload"),
    ]);
    let stages: Vec<String> = sorted_history(&s).into_iter().map(|h| h.new_stage).collect();
    assert_eq!(stages, vec!["In Progress", "Document Upload", "Initiated"]);
    assert_eq!(s.history()[0].new_stage, "Initiated", "stored order must not change");
}

#[test]
fn history_missing_is_empty() {
    let s = status("a", "c1", "Open", "2023-01-01T00:00:00Z");
    assert!(sorted_history(&s).is_empty());
}

#[test]
fn history_unparseable_timestamps_sort_last() {
    let mut s = status("a", "c1", "Open", "2023-01-01T00:00:00Z");
    s.status_history = Some(vec![history("garbage", "X"), history("2023-05-15T10:30:00Z", "Y")]);
    let stages: Vec<String> = sorted_history(&s).into_iter().map(|h| h.new_stage).collect();
    assert_eq!(stages, vec!["Y", "X"]);
}

// =============================================================================
// PAGINATION
// =============================================================================

#[test]
fn pagination_slices_at_page_boundaries() {
    let items: Vec<u32> = (1..=25).collect();
    let mut pages = Pagination::default();
    assert_eq!(pages.slice(&items), &items[0..10]);
    assert!(pages.change_page(3, items.len()));
    assert_eq!(pages.slice(&items), &[21, 22, 23, 24, 25]);
    assert_eq!(pages.total_pages(items.len()), 3);
}

#[test]
fn pagination_rejects_out_of_range_pages() {
    let items: Vec<u32> = (1..=11).collect();
    let mut pages = Pagination::new(10);
    assert!(!pages.change_page(0, items.len()));
    assert!(!pages.change_page(3, items.len()));
    assert_eq!(pages.page, 1);
    assert!(pages.change_page(2, items.len()));
    assert_eq!(pages.slice(&items), &[11]);
}

#[test]
fn pagination_of_empty_list() {
    let items: Vec<u32> = Vec::new();
    let mut pages = Pagination::default();
    assert_eq!(pages.total_pages(0), 0);
    assert!(pages.slice(&items).is_empty());
    assert!(!pages.change_page(1, 0));
}

#[test]
fn pagination_with_zero_page_size_is_empty() {
    let pages = Pagination::new(0);
    assert_eq!(pages.total_pages(5), 0);
    assert!(pages.slice(&[1, 2, 3]).is_empty());
}
