mod task;

pub use task::{NewTask, PatchField, Priority, Task, TaskPatch, parse_date};
pub(crate) use task::{canonical_date, normalized_text, normalized_title, now_rfc3339};
