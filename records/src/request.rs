//! Request bodies for the status and step endpoints.
//!
//! These live next to the model so the CLI sends exactly what the server
//! parses, and so the mock source can apply an update the same way the
//! server does.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Document, Status, StatusHistoryItem, Step, StepOrder, SubTransaction};

/// Stage every new status starts in.
pub const INITIAL_STAGE: &str = "Initiated";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0} is required")]
pub struct MissingField(pub &'static str);

// =============================================================================
// CREATE
// =============================================================================

/// Body of `POST /status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_system_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_documents: Option<Vec<Document>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_actions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_actions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub household_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_client_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beneficiary_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_types: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_transactions: Option<Vec<SubTransaction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<Step>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
}

impl NewStatus {
    /// Build the stored record.
    ///
    /// Lists and maps the caller left out default to empty, the stage is
    /// [`INITIAL_STAGE`], and history starts with one "Status created" entry.
    /// Steps are not attached here; callers run them through `steps::add_steps`
    /// so orders and counters are assigned.
    ///
    /// # Errors
    ///
    /// Returns [`MissingField`] for the first absent or blank required field.
    pub fn into_status(self, status_id: String, tracking_id: String, now: &str) -> Result<Status, MissingField> {
        let client_id = required(self.client_id, "clientId")?;
        let advisor_id = required(self.advisor_id, "advisorId")?;
        let status_type = required(self.status_type, "statusType")?;
        let status_summary = required(self.status_summary, "statusSummary")?;
        let created_by = self.created_by.unwrap_or_default();

        let mut status = Status {
            status_id,
            client_id,
            advisor_id,
            status_type,
            current_stage: INITIAL_STAGE.to_owned(),
            status_summary,
            created_date: now.to_owned(),
            last_updated_date: now.to_owned(),
            created_by: created_by.clone(),
            last_updated_by: created_by.clone(),
            source_id: self.source_id,
            tracking_id: self.tracking_id.filter(|t| !t.is_empty()).unwrap_or(tracking_id),
            source_system_url: self.source_system_url,
            status_details: Some(self.status_details.unwrap_or_else(|| Value::Object(serde_json::Map::new()))),
            status_history: None,
            related_documents: self.related_documents,
            required_actions: Some(self.required_actions.unwrap_or_default()),
            completed_actions: Some(self.completed_actions.unwrap_or_default()),
            estimated_completion_date: self.estimated_completion_date,
            actual_completion_date: None,
            priority: self.priority,
            category: self.category,
            sub_category: self.sub_category,
            household_id: self.household_id,
            related_client_ids: self.related_client_ids,
            beneficiary_ids: self.beneficiary_ids,
            relationship_types: self.relationship_types,
            sub_transactions: self.sub_transactions,
            steps: None,
            current_step_id: None,
            total_steps: None,
            completed_steps: None,
            metadata: Some(self.metadata.unwrap_or_default()),
            tags: Some(self.tags.unwrap_or_default()),
        };

        status.push_history(StatusHistoryItem {
            timestamp: now.to_owned(),
            changed_by: created_by,
            previous_stage: None,
            new_stage: INITIAL_STAGE.to_owned(),
            change_reason: None,
            change_description: Some("Status created".to_owned()),
        });

        Ok(status)
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, MissingField> {
    value.filter(|v| !v.trim().is_empty()).ok_or(MissingField(field))
}

// =============================================================================
// UPDATE
// =============================================================================

/// Body of `PUT /status/{id}`. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_actions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_actions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_completion_date: Option<String>,
    /// Replaces the whole tag map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    /// Merged key by key into existing metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_description: Option<String>,
}

impl StatusUpdate {
    /// Apply to `status` at `now`. Appends a history item only when the stage
    /// changed. Returns whether it did.
    pub fn apply_to(self, status: &mut Status, now: &str) -> bool {
        let previous_stage = status.current_stage.clone();

        if let Some(stage) = self.current_stage {
            status.current_stage = stage;
        }
        if let Some(summary) = self.status_summary {
            status.status_summary = summary;
        }
        if let Some(details) = self.status_details {
            status.status_details = Some(details);
        }
        if let Some(actions) = self.required_actions {
            status.required_actions = Some(actions);
        }
        if let Some(actions) = self.completed_actions {
            status.completed_actions = Some(actions);
        }
        if let Some(priority) = self.priority {
            status.priority = Some(priority);
        }
        if let Some(date) = self.estimated_completion_date {
            status.estimated_completion_date = Some(date);
        }
        if let Some(date) = self.actual_completion_date {
            status.actual_completion_date = Some(date);
        }
        if let Some(tags) = self.tags {
            status.tags = Some(tags);
        }
        if let Some(metadata) = self.metadata {
            status.metadata.get_or_insert_with(BTreeMap::new).extend(metadata);
        }

        status.last_updated_by = self.updated_by.unwrap_or_default();
        status.last_updated_date = now.to_owned();

        if status.current_stage == previous_stage {
            return false;
        }
        status.push_history(StatusHistoryItem {
            timestamp: now.to_owned(),
            changed_by: status.last_updated_by.clone(),
            previous_stage: Some(previous_stage),
            new_stage: status.current_stage.clone(),
            change_reason: self.change_reason,
            change_description: self.change_description,
        });
        true
    }
}

// =============================================================================
// STEP BODIES
// =============================================================================

/// Body of `POST /status/{id}/steps`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddSteps {
    pub steps: Vec<Step>,
}

/// Body of `PUT /status/{id}/current-step`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentStep {
    pub step_id: String,
}

/// Body of `PUT /status/{id}/steps/{stepId}/complete`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of the skip and block endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReason {
    #[serde(default)]
    pub reason: String,
}

/// Body of `PUT /status/{id}/steps/reorder`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderSteps {
    pub step_order: Vec<StepOrder>,
}

#[cfg(test)]
#[path = "request_test.rs"]
mod tests;
