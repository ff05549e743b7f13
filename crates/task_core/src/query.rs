//! Stateless filters and orderings over a snapshot of tasks.
//!
//! Every function takes `&[Task]` and returns owned clones; nothing here
//! mutates its input, so calls compose freely (filter, then sort).

use crate::error::AppError;
use crate::model::{Priority, Task, parse_date};
use std::cmp::Ordering;
use time::Date;

pub fn filter_by_category(tasks: &[Task], category: &str) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.category.as_deref() == Some(category))
        .cloned()
        .collect()
}

pub fn filter_by_priority(tasks: &[Task], priority: Priority) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.priority == priority)
        .cloned()
        .collect()
}

pub fn filter_pending(tasks: &[Task]) -> Vec<Task> {
    tasks.iter().filter(|task| !task.completed).cloned().collect()
}

pub fn filter_completed(tasks: &[Task]) -> Vec<Task> {
    tasks.iter().filter(|task| task.completed).cloned().collect()
}

pub fn filter_overdue(tasks: &[Task], today: Date) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.is_overdue(today))
        .cloned()
        .collect()
}

pub fn filter_due_on(tasks: &[Task], date: Date) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| due_date(task) == Some(date))
        .cloned()
        .collect()
}

pub fn filter_due_before(tasks: &[Task], date: Date) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| matches!(due_date(task), Some(due) if due < date))
        .cloned()
        .collect()
}

pub fn filter_due_after(tasks: &[Task], date: Date) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| matches!(due_date(task), Some(due) if due > date))
        .cloned()
        .collect()
}

/// Case-insensitive substring match over title and description.
pub fn search(tasks: &[Task], query: &str) -> Vec<Task> {
    let needle = query.to_lowercase();
    tasks
        .iter()
        .filter(|task| {
            task.title.to_lowercase().contains(&needle)
                || task
                    .description
                    .as_deref()
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    DueDate,
    Priority,
    CreatedAt,
    Title,
    Category,
}

impl SortKey {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "due_date" | "due" => Ok(Self::DueDate),
            "priority" => Ok(Self::Priority),
            "created_at" | "created" => Ok(Self::CreatedAt),
            "title" => Ok(Self::Title),
            "category" => Ok(Self::Category),
            other => Err(AppError::validation(format!(
                "invalid sort key '{other}', must be one of: due_date, priority, created_at, title, category"
            ))),
        }
    }
}

/// Returns a sorted copy. Tasks without a value for the key sort last
/// regardless of direction; ties break by id ascending so the ordering is
/// deterministic.
pub fn sort_by(tasks: &[Task], key: SortKey, descending: bool) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = match (sort_value(a, key), sort_value(b, key)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => return Ordering::Greater,
            (Some(_), None) => return Ordering::Less,
            (Some(left), Some(right)) => {
                let by_key = left.cmp(&right);
                if descending { by_key.reverse() } else { by_key }
            }
        };
        ordering.then_with(|| a.id.cmp(&b.id))
    });
    sorted
}

// Values for one key are always the same variant, so the derived cross-variant
// ordering is never exercised.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
    Priority(Priority),
    Text(String),
}

fn sort_value(task: &Task, key: SortKey) -> Option<SortValue> {
    match key {
        SortKey::DueDate => task.due_date.clone().map(SortValue::Text),
        SortKey::Priority => Some(SortValue::Priority(task.priority)),
        SortKey::CreatedAt => Some(SortValue::Text(task.created_at.clone())),
        SortKey::Title => Some(SortValue::Text(task.title.to_lowercase())),
        SortKey::Category => task
            .category
            .as_deref()
            .map(|category| SortValue::Text(category.to_lowercase())),
    }
}

fn due_date(task: &Task) -> Option<Date> {
    task.due_date.as_deref().and_then(|raw| parse_date(raw).ok())
}
