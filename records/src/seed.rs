//! Sample statuses used when no database is configured and by the CLI's
//! mock source.

use crate::model::Status;

const SEED_JSON: &str = include_str!("../data/seed_statuses.json");

/// Parse the bundled sample dataset.
///
/// # Errors
///
/// Returns a JSON error if the bundled file does not match the model.
pub fn statuses() -> Result<Vec<Status>, serde_json::Error> {
    serde_json::from_str(SEED_JSON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StepStatus;

    #[test]
    fn bundled_dataset_parses() {
        let all = statuses().unwrap();
        assert_eq!(all.len(), 8);
        assert_eq!(all[0].status_id, "status-001");
        assert_eq!(all.iter().filter(|s| s.client_id == "client-123").count(), 7);
    }

    #[test]
    fn retirement_planning_record_is_present() {
        let all = statuses().unwrap();
        let status = all.iter().find(|s| s.status_id == "status-007").unwrap();
        assert_eq!(status.status_summary, "Retirement Planning");
        assert_eq!(status.advisor_id, "advisor-789");
        assert_eq!(status.source_id.as_deref(), Some("PLAN-123"));
        assert_eq!(status.tracking_id, "TRK-007");
        assert_eq!(status.metadata_str("currentSavings"), Some("$450,000"));
    }

    #[test]
    fn records_carry_details_and_documents() {
        let all = statuses().unwrap();
        let mortgage = &all[0];
        assert!(mortgage.status_details.is_some());
        assert_eq!(mortgage.related_documents.as_ref().map(Vec::len), Some(2));
        assert!(mortgage.estimated_completion_date.is_some());
        assert!(mortgage.history().iter().all(|h| h.change_description.is_some()));
    }

    #[test]
    fn ids_are_unique() {
        let all = statuses().unwrap();
        let mut ids: Vec<&str> = all.iter().map(|s| s.status_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all.len());
    }

    #[test]
    fn step_counters_agree_with_steps() {
        for status in statuses().unwrap() {
            if status.steps.is_none() {
                continue;
            }
            let completed = status.steps().iter().filter(|s| s.status == StepStatus::Completed).count();
            assert_eq!(status.total_steps, Some(status.steps().len()), "{}", status.status_id);
            assert_eq!(status.completed_steps, Some(completed), "{}", status.status_id);
        }
    }

    #[test]
    fn current_steps_exist() {
        for status in statuses().unwrap() {
            if let Some(current) = status.current_step_id.as_deref() {
                assert!(status.steps().iter().any(|s| s.step_id == current), "{}", status.status_id);
            }
        }
    }
}
