pub mod csv;
pub mod file;
pub mod json;

use crate::error::AppError;
use crate::model::Task;
use std::collections::HashSet;

// Shared by both codecs: imported records must satisfy every task invariant
// and carry unique ids before any of them reach a store.
pub(crate) fn check_records(tasks: &[Task]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for (index, task) in tasks.iter().enumerate() {
        task.validate().map_err(|err| {
            AppError::bad_format(format!("record {}: {}", index + 1, err.message()))
        })?;
        if !seen.insert(task.id.as_str()) {
            return Err(AppError::bad_format(format!("duplicate task id '{}'", task.id)));
        }
    }
    Ok(())
}
