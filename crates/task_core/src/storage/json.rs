//! Canonical JSON format: a bare array of task objects, dates as
//! `YYYY-MM-DD`, timestamps as RFC 3339.

use crate::error::AppError;
use crate::model::Task;

pub fn to_json(tasks: &[Task]) -> Result<String, AppError> {
    serde_json::to_string_pretty(tasks).map_err(|err| AppError::bad_format(err.to_string()))
}

/// Parses and fully validates a task array. Ids are preserved, never
/// re-assigned.
pub fn from_json(text: &str) -> Result<Vec<Task>, AppError> {
    let tasks: Vec<Task> =
        serde_json::from_str(text).map_err(|err| AppError::bad_format(err.to_string()))?;
    super::check_records(&tasks)?;
    Ok(tasks)
}
