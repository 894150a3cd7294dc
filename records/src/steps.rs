//! Step operations on a status.
//!
//! DESIGN
//! ======
//! Every operation mutates the status in place and then refreshes the
//! `totalSteps` / `completedSteps` counters. An unknown step id leaves the
//! status untouched and reports `false`, so callers can decide whether that
//! is worth logging. There is no transition validation: any step may move to
//! any state.

use crate::model::{Status, Step, StepOrder, StepPatch, StepStatus};

const PREVIOUS_NOTES_SEPARATOR: &str = "\n\nPrevious notes: ";
const BLOCKED_PREFIX: &str = "BLOCKED: ";

/// Append steps. A step with `order == 0` gets `existing_len + index + 1`.
pub fn add_steps(status: &mut Status, steps: Vec<Step>) {
    let list = status.steps.get_or_insert_with(Vec::new);
    let base = u32::try_from(list.len()).unwrap_or(u32::MAX);
    for (index, mut step) in steps.into_iter().enumerate() {
        if step.order == 0 {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            step.order = base.saturating_add(index).saturating_add(1);
        }
        list.push(step);
    }
    refresh_counts(status);
}

/// Shallow-merge `patch` into the named step.
pub fn update_step(status: &mut Status, step_id: &str, patch: StepPatch) -> bool {
    let Some(step) = find_step_mut(status, step_id) else {
        return false;
    };

    if let Some(name) = patch.name {
        step.name = name;
    }
    if let Some(description) = patch.description {
        step.description = Some(description);
    }
    if let Some(state) = patch.status {
        step.status = state;
    }
    if let Some(order) = patch.order {
        step.order = order;
    }
    if let Some(start_date) = patch.start_date {
        step.start_date = Some(start_date);
    }
    if let Some(completion_date) = patch.completion_date {
        step.completion_date = Some(completion_date);
    }
    if let Some(due_date) = patch.due_date {
        step.due_date = Some(due_date);
    }
    if let Some(assigned_to) = patch.assigned_to {
        step.assigned_to = Some(assigned_to);
    }
    if let Some(notes) = patch.notes {
        step.notes = Some(notes);
    }
    if let Some(metadata) = patch.metadata {
        step.metadata = Some(metadata);
    }

    refresh_counts(status);
    true
}

/// Point `currentStepId` at an existing step.
pub fn set_current_step(status: &mut Status, step_id: &str) -> bool {
    if !status.steps().iter().any(|s| s.step_id == step_id) {
        return false;
    }
    status.current_step_id = Some(step_id.to_owned());
    true
}

/// Mark a step completed at `now`. Notes are replaced only when provided and
/// non-empty.
pub fn complete_step(status: &mut Status, step_id: &str, notes: Option<String>, now: &str) -> bool {
    let Some(step) = find_step_mut(status, step_id) else {
        return false;
    };
    step.status = StepStatus::Completed;
    step.completion_date = Some(now.to_owned());
    if let Some(notes) = notes.filter(|n| !n.is_empty()) {
        step.notes = Some(notes);
    }

    refresh_counts(status);
    advance_if_current(status, step_id);
    true
}

/// Mark a step skipped, recording the reason ahead of any previous notes.
pub fn skip_step(status: &mut Status, step_id: &str, reason: &str) -> bool {
    let Some(step) = find_step_mut(status, step_id) else {
        return false;
    };
    step.status = StepStatus::Skipped;
    step.notes = Some(with_previous_notes(reason.to_owned(), step.notes.as_deref()));

    refresh_counts(status);
    advance_if_current(status, step_id);
    true
}

/// Mark a step blocked. A blocked step stays current.
pub fn block_step(status: &mut Status, step_id: &str, reason: &str) -> bool {
    let Some(step) = find_step_mut(status, step_id) else {
        return false;
    };
    step.status = StepStatus::Blocked;
    step.notes = Some(with_previous_notes(format!("{BLOCKED_PREFIX}{reason}"), step.notes.as_deref()));

    refresh_counts(status);
    true
}

/// Apply new orders (unknown ids are ignored) and sort steps by order.
pub fn reorder_steps(status: &mut Status, orders: &[StepOrder]) {
    let Some(steps) = status.steps.as_mut() else {
        return;
    };
    for item in orders {
        if let Some(step) = steps.iter_mut().find(|s| s.step_id == item.step_id) {
            step.order = item.order;
        }
    }
    steps.sort_by_key(|s| s.order);
}

/// The lowest-order step that is neither completed nor skipped.
#[must_use]
pub fn next_open_step(status: &Status) -> Option<&Step> {
    status
        .steps()
        .iter()
        .filter(|s| !s.status.is_settled())
        .min_by_key(|s| s.order)
}

/// Recompute `totalSteps` and `completedSteps` from the step list.
pub fn refresh_counts(status: &mut Status) {
    let steps = status.steps();
    let total = steps.len();
    let completed = steps.iter().filter(|s| s.status == StepStatus::Completed).count();
    status.total_steps = Some(total);
    status.completed_steps = Some(completed);
}

fn advance_if_current(status: &mut Status, step_id: &str) {
    if status.current_step_id.as_deref() != Some(step_id) {
        return;
    }
    if let Some(next) = next_open_step(status).map(|s| s.step_id.clone()) {
        status.current_step_id = Some(next);
    }
}

fn find_step_mut<'a>(status: &'a mut Status, step_id: &str) -> Option<&'a mut Step> {
    status.steps.as_mut()?.iter_mut().find(|s| s.step_id == step_id)
}

fn with_previous_notes(head: String, previous: Option<&str>) -> String {
    match previous {
        Some(prev) if !prev.is_empty() => format!("{head}{PREVIOUS_NOTES_SEPARATOR}{prev}"),
        _ => head,
    }
}

#[cfg(test)]
#[path = "steps_test.rs"]
mod tests;
