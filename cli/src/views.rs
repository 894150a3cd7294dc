//! Terminal views over a [`StatusSource`]: the dashboard list, the status
//! detail page, and the step-progress indicator.
//!
//! Views hold the loaded records plus `loading` / `error` flags. A failed load
//! never aborts the command; it flips `error` and logs, and `render` prints a
//! short notice instead of the data.

use std::fmt::Write as _;

use records::query::{self, DEFAULT_PAGE_SIZE, Pagination};
use records::{ListFilter, Status, StatusHistoryItem, Step, StepStatus};

use crate::source::StatusSource;

pub const DEFAULT_CLIENT_ID: &str = "client-123";

/// Stage filters offered by the dashboard. `All` sends no filter.
pub const STAGE_FILTERS: [&str; 5] = ["All", "In Progress", "Completed", "Pending", "Rejected"];

// =============================================================================
// DASHBOARD
// =============================================================================

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub client_id: String,
    pub stage_filter: String,
    pub statuses: Vec<Status>,
    pub pagination: Pagination,
    pub loading: bool,
    pub error: bool,
}

impl Dashboard {
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            stage_filter: STAGE_FILTERS[0].to_owned(),
            statuses: Vec::new(),
            pagination: Pagination::new(DEFAULT_PAGE_SIZE),
            loading: true,
            error: false,
        }
    }

    /// Listing filter for the selected stage.
    #[must_use]
    pub fn filter(&self) -> ListFilter {
        let stage = (self.stage_filter != STAGE_FILTERS[0]).then(|| self.stage_filter.clone());
        ListFilter { stage, ..ListFilter::default() }
    }

    /// Select a stage filter. Unknown stages are refused.
    pub fn select_stage(&mut self, stage: &str) -> bool {
        if !STAGE_FILTERS.contains(&stage) {
            return false;
        }
        self.stage_filter = stage.to_owned();
        true
    }

    pub async fn load(&mut self, source: &mut StatusSource) {
        self.loading = true;
        self.error = false;

        match source.client_statuses(&self.client_id, &self.filter()).await {
            Ok(statuses) => {
                self.statuses = statuses;
                self.pagination.page = 1;
            }
            Err(e) => {
                tracing::error!(error = %e, client_id = %self.client_id, "Error loading statuses");
                self.error = true;
            }
        }
        self.loading = false;
    }

    #[must_use]
    pub fn page_items(&self) -> &[Status] {
        self.pagination.slice(&self.statuses)
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages(self.statuses.len())
    }

    pub fn change_page(&mut self, page: usize) -> bool {
        self.pagination.change_page(page, self.statuses.len())
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Statuses for {} (stage: {})", self.client_id, self.stage_filter);

        if self.loading {
            out.push_str("Loading statuses...\n");
            return out;
        }
        if self.error {
            out.push_str("Unable to load statuses. Please try again later.\n");
            return out;
        }
        if self.statuses.is_empty() {
            out.push_str("No statuses found.\n");
            return out;
        }

        let _ = writeln!(out, "{:<38} {:<34} {:<12} {:<12} PROGRESS", "ID", "SUMMARY", "STAGE", "UPDATED");
        for status in self.page_items() {
            let progress = if status.steps().is_empty() {
                String::new()
            } else {
                StepIndicator::for_status(status).compact()
            };
            let _ = writeln!(
                out,
                "{:<38} {:<34} {:<12} {:<12} {}",
                status.status_id,
                truncate(&status.status_summary, 34),
                status.current_stage,
                date_part(&status.last_updated_date),
                progress
            );
        }
        let _ = writeln!(out, "Page {} of {}", self.pagination.page, self.total_pages());
        out
    }
}

// =============================================================================
// STATUS DETAILS
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct StatusDetails {
    pub status: Option<Status>,
    pub error: bool,
}

impl StatusDetails {
    pub async fn load(source: &mut StatusSource, status_id: &str) -> Self {
        match source.get_status(status_id).await {
            Ok(status) => Self::loaded(status),
            Err(e) => {
                tracing::error!(error = %e, status_id, "Error loading status");
                Self { status: None, error: true }
            }
        }
    }

    #[must_use]
    pub fn loaded(status: Status) -> Self {
        Self { status: Some(status), error: false }
    }

    /// History newest first; empty when nothing is loaded.
    #[must_use]
    pub fn sorted_history(&self) -> Vec<StatusHistoryItem> {
        self.status.as_ref().map(query::sorted_history).unwrap_or_default()
    }

    /// Source-system link, if the record carries one.
    #[must_use]
    pub fn source_system_url(&self) -> Option<&str> {
        self.status.as_ref()?.source_system_url.as_deref().filter(|url| !url.is_empty())
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let Some(status) = &self.status else {
            if self.error {
                out.push_str("Unable to load status details.\n");
            }
            return out;
        };

        let _ = writeln!(out, "{} [{}]", status.status_summary, status.current_stage);
        let _ = writeln!(out, "  id:        {}", status.status_id);
        let _ = writeln!(out, "  type:      {}", status.status_type);
        let _ = writeln!(out, "  client:    {}", status.client_id);
        let _ = writeln!(out, "  advisor:   {}", status.advisor_id);
        let _ = writeln!(out, "  tracking:  {}", status.tracking_id);
        if let Some(source_id) = &status.source_id {
            let _ = writeln!(out, "  source:    {source_id}");
        }
        if let Some(priority) = &status.priority {
            let _ = writeln!(out, "  priority:  {priority}");
        }
        if let Some(url) = self.source_system_url() {
            let _ = writeln!(out, "  link:      {url}");
        }

        if !status.steps().is_empty() {
            out.push_str("\nSteps\n");
            out.push_str(&StepIndicator::for_status(status).horizontal());
        }

        if !status.sub_transactions().is_empty() {
            out.push_str("\nSub-transactions\n");
            for sub in status.sub_transactions() {
                let progress = sub.progress.map(|p| format!(" {p}%")).unwrap_or_default();
                let _ = writeln!(out, "  - {} [{}]{}", sub.name, sub.status, progress);
            }
        }

        section(&mut out, "Required actions", status.required_actions.as_deref().unwrap_or(&[]));
        section(&mut out, "Completed actions", status.completed_actions.as_deref().unwrap_or(&[]));

        let metadata = object_keys(status.metadata.as_ref());
        if !metadata.is_empty() {
            out.push_str("\nMetadata\n");
            for key in metadata {
                if let Some(value) = status.metadata.as_ref().and_then(|m| m.get(key)) {
                    let _ = writeln!(out, "  {key}: {}", display_value(value));
                }
            }
        }

        let tags = object_keys(status.tags.as_ref());
        if !tags.is_empty() {
            out.push_str("\nTags\n");
            for key in tags {
                if let Some(value) = status.tags.as_ref().and_then(|t| t.get(key)) {
                    let _ = writeln!(out, "  {key}: {value}");
                }
            }
        }

        let history = self.sorted_history();
        if !history.is_empty() {
            out.push_str("\nHistory\n");
            for item in history {
                let from = item.previous_stage.as_deref().unwrap_or("-");
                let _ = writeln!(out, "  {}  {} -> {}  ({})", item.timestamp, from, item.new_stage, item.changed_by);
                if let Some(reason) = &item.change_reason {
                    let _ = writeln!(out, "      {reason}");
                }
            }
        }
        out
    }
}

/// Keys of an optional map in iteration order; empty when absent.
#[must_use]
pub fn object_keys<V>(map: Option<&std::collections::BTreeMap<String, V>>) -> Vec<&str> {
    map.map(|m| m.keys().map(String::as_str).collect()).unwrap_or_default()
}

fn section(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{title}");
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// STEP INDICATOR
// =============================================================================

/// Progress display for a status' steps.
#[derive(Debug, Clone, Copy)]
pub struct StepIndicator<'a> {
    pub steps: &'a [Step],
    pub current_step_id: Option<&'a str>,
    pub total_steps: usize,
    pub completed_steps: usize,
}

impl<'a> StepIndicator<'a> {
    #[must_use]
    pub fn for_status(status: &'a Status) -> Self {
        Self {
            steps: status.steps(),
            current_step_id: status.current_step_id.as_deref(),
            total_steps: status.total_steps.unwrap_or(status.steps().len()),
            completed_steps: status.completed_steps.unwrap_or(0),
        }
    }

    /// 1-based position of the current step; 1 when it is unset or unknown.
    #[must_use]
    pub fn current_step_number(&self) -> u32 {
        let Some(current) = self.current_step_id else {
            return 1;
        };
        self.steps.iter().find(|s| s.step_id == current).map_or(1, |s| s.order)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_percentage(&self) -> f64 {
        if self.total_steps == 0 {
            return 0.0;
        }
        self.completed_steps as f64 / self.total_steps as f64 * 100.0
    }

    /// The highest-order step is last. Every step counts as last when there
    /// are none to compare against.
    #[must_use]
    pub fn is_last_step(&self, step: &Step) -> bool {
        self.steps.iter().map(|s| s.order).max().is_none_or(|max| step.order == max)
    }

    /// `3/7 [###....]` for list rows.
    #[must_use]
    pub fn compact(&self) -> String {
        let marks: String = self.sorted().iter().map(|s| status_glyph(s.status)).collect();
        format!("{}/{} [{marks}]", self.completed_steps, self.total_steps)
    }

    /// One line per step plus a progress footer.
    #[must_use]
    pub fn horizontal(&self) -> String {
        let mut out = String::new();
        for step in self.sorted() {
            let pointer = if Some(step.step_id.as_str()) == self.current_step_id { ">" } else { " " };
            let _ = writeln!(
                out,
                "{pointer} {:>2}. [{}] {:<28} {}",
                step.order,
                status_glyph(step.status),
                truncate(&step.name, 28),
                step.status.as_str()
            );
            if let Some(notes) = &step.notes {
                let _ = writeln!(out, "       {}", notes.lines().next().unwrap_or_default());
            }
            if !self.is_last_step(step) {
                let _ = writeln!(out, "     {}", connector_glyph(step.status));
            }
        }
        let _ = writeln!(
            out,
            "  step {} of {} ({:.0}% complete)",
            self.current_step_number(),
            self.total_steps,
            self.progress_percentage()
        );
        out
    }

    fn sorted(&self) -> Vec<&'a Step> {
        let mut steps: Vec<&Step> = self.steps.iter().collect();
        steps.sort_by_key(|s| s.order);
        steps
    }
}

/// Style class for a step's number badge.
#[must_use]
pub fn step_status_class(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Completed => "step-completed",
        StepStatus::InProgress => "step-in-progress",
        StepStatus::Blocked => "step-blocked",
        StepStatus::Skipped => "step-skipped",
        StepStatus::NotStarted => "step-not-started",
    }
}

/// Style class for the connector drawn after a step.
#[must_use]
pub fn connector_class(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Completed => "connector-completed",
        StepStatus::InProgress => "connector-in-progress",
        _ => "connector-not-started",
    }
}

fn status_glyph(status: StepStatus) -> char {
    match step_status_class(status) {
        "step-completed" => '#',
        "step-in-progress" => '>',
        "step-blocked" => '!',
        "step-skipped" => '-',
        _ => '.',
    }
}

fn connector_glyph(status: StepStatus) -> &'static str {
    match connector_class(status) {
        "connector-completed" => "|",
        "connector-in-progress" => ":",
        _ => "'",
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_owned();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('~');
    cut
}

fn date_part(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

#[cfg(test)]
#[path = "views_test.rs"]
mod tests;
