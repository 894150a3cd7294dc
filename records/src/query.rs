//! Filtering, search, grouping, history ordering, and pagination.
//!
//! The same predicates back the server's REST queries and the CLI's mock
//! source, so both sides of the wire agree on what a query returns.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::model::{Status, StatusHistoryItem};
use crate::timestamp;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("invalid {field}: {value}")]
    InvalidDate { field: &'static str, value: String },
}

// =============================================================================
// SEARCH
// =============================================================================

/// Body of `POST /statuses/search`. Every present field must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Case-insensitive substring of the summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_search: Option<String>,
    /// Compared against `metadata.sentiment`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<HashMap<String, String>>,
}

impl SearchCriteria {
    #[must_use]
    pub fn matches(&self, status: &Status) -> bool {
        if !eq_opt(self.client_id.as_deref(), &status.client_id)
            || !eq_opt(self.advisor_id.as_deref(), &status.advisor_id)
            || !eq_opt(self.status_type.as_deref(), &status.status_type)
            || !eq_opt(self.current_stage.as_deref(), &status.current_stage)
        {
            return false;
        }

        if let Some(priority) = self.priority.as_deref() {
            if status.priority.as_deref() != Some(priority) {
                return false;
            }
        }

        if let Some(text) = self.text_search.as_deref() {
            let needle = text.to_lowercase();
            if !status.status_summary.to_lowercase().contains(&needle) {
                return false;
            }
        }

        if let Some(sentiment) = self.sentiment.as_deref() {
            if status.metadata_str("sentiment") != Some(sentiment) {
                return false;
            }
        }

        if let Some(wanted) = &self.tag {
            let tags = status.tags.as_ref();
            let all = wanted
                .iter()
                .all(|(k, v)| tags.and_then(|t| t.get(k)).is_some_and(|actual| actual == v));
            if !all {
                return false;
            }
        }

        true
    }
}

fn eq_opt(wanted: Option<&str>, actual: &str) -> bool {
    wanted.is_none_or(|w| w == actual)
}

/// Apply `criteria` to a collection of statuses.
#[must_use]
pub fn search<'a>(statuses: impl IntoIterator<Item = &'a Status>, criteria: &SearchCriteria) -> Vec<Status> {
    statuses
        .into_iter()
        .filter(|s| criteria.matches(s))
        .cloned()
        .collect()
}

// =============================================================================
// CLIENT / ADVISOR LISTING
// =============================================================================

/// Query parameters shared by the client and advisor listings.
///
/// `statusType` matches the status type, `stage` matches the current stage,
/// and the date bounds are inclusive on `createdDate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
}

impl ListFilter {
    /// Keep the statuses that pass every present filter.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidDate`] when a date bound is not RFC 3339.
    pub fn apply<'a>(&self, statuses: impl IntoIterator<Item = &'a Status>) -> Result<Vec<Status>, QueryError> {
        let from = parse_bound("fromDate", self.from_date.as_deref())?;
        let to = parse_bound("toDate", self.to_date.as_deref())?;

        Ok(statuses
            .into_iter()
            .filter(|s| eq_opt(non_empty(self.status_type.as_deref()), &s.status_type))
            .filter(|s| eq_opt(non_empty(self.stage.as_deref()), &s.current_stage))
            .filter(|s| within(s, from, to))
            .cloned()
            .collect())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn parse_bound(field: &'static str, raw: Option<&str>) -> Result<Option<OffsetDateTime>, QueryError> {
    match non_empty(raw) {
        None => Ok(None),
        Some(raw) => timestamp::parse(raw)
            .map(Some)
            .ok_or_else(|| QueryError::InvalidDate { field, value: raw.to_owned() }),
    }
}

fn within(status: &Status, from: Option<OffsetDateTime>, to: Option<OffsetDateTime>) -> bool {
    if from.is_none() && to.is_none() {
        return true;
    }
    let Some(created) = timestamp::parse(&status.created_date) else {
        return false;
    };
    from.is_none_or(|f| created >= f) && to.is_none_or(|t| created <= t)
}

/// Group statuses by client, preserving input order within each client.
#[must_use]
pub fn group_by_client(statuses: Vec<Status>) -> BTreeMap<String, Vec<Status>> {
    let mut grouped: BTreeMap<String, Vec<Status>> = BTreeMap::new();
    for status in statuses {
        grouped.entry(status.client_id.clone()).or_default().push(status);
    }
    grouped
}

// =============================================================================
// HISTORY
// =============================================================================

/// History newest first. Entries with unparseable timestamps sort last.
#[must_use]
pub fn sorted_history(status: &Status) -> Vec<StatusHistoryItem> {
    let mut items = status.history().to_vec();
    items.sort_by_cached_key(|item| std::cmp::Reverse(timestamp::parse(&item.timestamp)));
    items
}

// =============================================================================
// PAGINATION
// =============================================================================

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Client-side pagination over an already-fetched list. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    #[must_use]
    pub fn new(per_page: usize) -> Self {
        Self { page: 1, per_page }
    }

    /// Items on the current page; empty past the end.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.page.saturating_sub(1).saturating_mul(self.per_page).min(items.len());
        let end = start.saturating_add(self.per_page).min(items.len());
        &items[start..end]
    }

    #[must_use]
    pub fn total_pages(&self, len: usize) -> usize {
        if self.per_page == 0 {
            return 0;
        }
        len.div_ceil(self.per_page)
    }

    /// Move to `page` if it exists for a list of `len` items.
    pub fn change_page(&mut self, page: usize, len: usize) -> bool {
        if page >= 1 && page <= self.total_pages(len) {
            self.page = page;
            return true;
        }
        false
    }
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
