use crate::model::{Priority, Task};
use crate::query;
use serde::Serialize;
use std::collections::BTreeMap;
use time::Date;

/// Bucket used for tasks without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    /// Percent of tasks completed, rounded to one decimal; 0.0 for an empty
    /// set.
    pub completion_rate: f64,
    pub by_priority: PriorityCounts,
    pub by_category: BTreeMap<String, usize>,
}

/// Aggregates a snapshot of tasks. Counts agree with the corresponding
/// `query` filters by construction.
pub fn summarize(tasks: &[Task], today: Date) -> Summary {
    let total = tasks.len();
    let completed = query::filter_completed(tasks).len();
    let pending = query::filter_pending(tasks).len();
    let overdue = query::filter_overdue(tasks, today).len();

    let mut by_priority = PriorityCounts::default();
    let mut by_category = BTreeMap::new();
    for task in tasks {
        match task.priority {
            Priority::Low => by_priority.low += 1,
            Priority::Medium => by_priority.medium += 1,
            Priority::High => by_priority.high += 1,
        }
        let label = task.category.as_deref().unwrap_or(UNCATEGORIZED);
        *by_category.entry(label.to_string()).or_insert(0) += 1;
    }

    let completion_rate = if total == 0 {
        0.0
    } else {
        (completed as f64 / total as f64 * 1000.0).round() / 10.0
    };

    Summary {
        total,
        completed,
        pending,
        overdue,
        completion_rate,
        by_priority,
        by_category,
    }
}
