use crate::error::AppError;
use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Accepts the canonical names plus the short forms (`l`, `med`, `h`, ...).
    /// An empty value falls back to the default.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" | "l" => Ok(Self::Low),
            "medium" | "med" | "m" | "" => Ok(Self::Medium),
            "high" | "h" => Ok(Self::High),
            other => Err(AppError::validation(format!(
                "invalid priority '{other}', must be one of: low, medium, high"
            ))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A single task record.
///
/// `due_date` holds a canonical `YYYY-MM-DD` string; `created_at` and
/// `completed_at` hold RFC 3339 timestamps. `completed_at` is set exactly
/// when `completed` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl Task {
    /// True iff the task has a due date strictly before `today` and is not
    /// completed. A date that fails to parse reads as not overdue; stored
    /// dates are validated at construction and import, so that only happens
    /// when a task is assembled by hand.
    pub fn is_overdue(&self, today: Date) -> bool {
        if self.completed {
            return false;
        }
        match self.due_date.as_deref().map(parse_date) {
            Some(Ok(due)) => due < today,
            _ => false,
        }
    }

    /// Re-checks every record invariant. Used on deserialized tasks, which
    /// bypass the validated constructors.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.id.trim().is_empty() {
            return Err(AppError::validation("id is required"));
        }
        if self.title.trim().is_empty() {
            return Err(AppError::validation("title is required"));
        }
        if let Some(due) = self.due_date.as_deref() {
            parse_date(due)?;
        }
        OffsetDateTime::parse(&self.created_at, &Rfc3339)
            .map_err(|_| AppError::validation("created_at must be RFC3339"))?;
        match (self.completed, self.completed_at.as_deref()) {
            (true, Some(at)) => {
                OffsetDateTime::parse(at, &Rfc3339)
                    .map_err(|_| AppError::validation("completed_at must be RFC3339"))?;
            }
            (false, None) => {}
            (true, None) => {
                return Err(AppError::validation("completed task is missing completed_at"));
            }
            (false, Some(_)) => {
                return Err(AppError::validation("completed_at set on a pending task"));
            }
        }
        Ok(())
    }
}

/// Field set accepted when creating a task. Id and timestamps are assigned
/// by the store.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<String>,
    pub category: Option<String>,
}

/// One optional field of a partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PatchField<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

/// Partial update applied by `TaskStore::update`. `id` and `created_at` are
/// immutable and deliberately not representable here.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: PatchField<String>,
    pub priority: Option<Priority>,
    pub due_date: PatchField<String>,
    pub category: PatchField<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description == PatchField::Keep
            && self.priority.is_none()
            && self.due_date == PatchField::Keep
            && self.category == PatchField::Keep
            && self.completed.is_none()
    }
}

/// Parses a `YYYY-MM-DD` calendar date. A trailing time-of-day part after
/// `T` is ignored, so full ISO timestamps are accepted where a date is
/// expected.
pub fn parse_date(raw: &str) -> Result<Date, AppError> {
    let trimmed = raw.trim();
    let day = match trimmed.split_once('T') {
        Some((day, _)) => day,
        None => trimmed,
    };
    Date::parse(day, DATE_FORMAT)
        .map_err(|_| AppError::validation(format!("invalid date '{trimmed}', expected YYYY-MM-DD")))
}

pub(crate) fn canonical_date(raw: &str) -> Result<String, AppError> {
    let date = parse_date(raw)?;
    date.format(DATE_FORMAT)
        .map_err(|err| AppError::bad_format(err.to_string()))
}

pub(crate) fn normalized_title(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("title is required"));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalized_text(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn now_rfc3339() -> Result<String, AppError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| AppError::bad_format(err.to_string()))
}
