use crate::error::AppError;
use crate::model::{self, NewTask, PatchField, Task, TaskPatch};
use std::collections::HashSet;
use time::OffsetDateTime;

/// In-memory collection of tasks, kept in insertion order with unique ids.
///
/// The store owns every task it holds. Callers receive clones or `&[Task]`
/// views and mutate only through the methods here, which keep the
/// `completed`/`completed_at` invariant intact.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from already-deserialized tasks, preserving their ids.
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self, AppError> {
        let mut store = Self::new();
        store.replace_all(tasks)?;
        Ok(store)
    }

    /// Validates the fields, assigns a fresh id, stamps `created_at`, and
    /// appends the new task.
    pub fn add(&mut self, new_task: NewTask) -> Result<Task, AppError> {
        let task = Task {
            id: self.next_id(),
            title: model::normalized_title(&new_task.title)?,
            description: model::normalized_text(new_task.description),
            priority: new_task.priority,
            due_date: match model::normalized_text(new_task.due_date) {
                Some(raw) => Some(model::canonical_date(&raw)?),
                None => None,
            },
            category: model::normalized_text(new_task.category),
            completed: false,
            created_at: model::now_rfc3339()?,
            completed_at: None,
        };
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub fn get(&self, id: &str) -> Result<Task, AppError> {
        let index = self.index_of(id)?;
        Ok(self.tasks[index].clone())
    }

    /// Applies a partial update. The patch is staged on a candidate copy and
    /// committed only once every field has validated, so a failed update
    /// leaves the task untouched.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<Task, AppError> {
        if patch.is_empty() {
            return Err(AppError::validation("no fields to update"));
        }
        let index = self.index_of(id)?;
        let mut candidate = self.tasks[index].clone();

        if let Some(title) = patch.title.as_deref() {
            candidate.title = model::normalized_title(title)?;
        }
        match patch.description {
            PatchField::Keep => {}
            PatchField::Clear => candidate.description = None,
            PatchField::Set(text) => candidate.description = model::normalized_text(Some(text)),
        }
        if let Some(priority) = patch.priority {
            candidate.priority = priority;
        }
        match patch.due_date {
            PatchField::Keep => {}
            PatchField::Clear => candidate.due_date = None,
            PatchField::Set(raw) => candidate.due_date = Some(model::canonical_date(&raw)?),
        }
        match patch.category {
            PatchField::Keep => {}
            PatchField::Clear => candidate.category = None,
            PatchField::Set(text) => candidate.category = model::normalized_text(Some(text)),
        }
        if let Some(completed) = patch.completed {
            transition(&mut candidate, completed)?;
        }

        self.tasks[index] = candidate.clone();
        Ok(candidate)
    }

    /// Marks a task completed and stamps `completed_at`. Idempotent:
    /// re-completing keeps the original timestamp.
    pub fn complete(&mut self, id: &str) -> Result<Task, AppError> {
        let index = self.index_of(id)?;
        transition(&mut self.tasks[index], true)?;
        Ok(self.tasks[index].clone())
    }

    /// Marks a completed task pending again and clears `completed_at`.
    pub fn reopen(&mut self, id: &str) -> Result<Task, AppError> {
        let index = self.index_of(id)?;
        transition(&mut self.tasks[index], false)?;
        Ok(self.tasks[index].clone())
    }

    pub fn delete(&mut self, id: &str) -> Result<(), AppError> {
        let index = self.index_of(id)?;
        self.tasks.remove(index);
        Ok(())
    }

    /// All tasks in insertion order.
    pub fn list_all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Replaces the whole collection. Every incoming task is validated and
    /// ids are checked for uniqueness before anything is swapped in; on
    /// error the store is unchanged.
    pub fn replace_all(&mut self, tasks: Vec<Task>) -> Result<(), AppError> {
        let mut seen = HashSet::new();
        for task in &tasks {
            task.validate()?;
            if !seen.insert(task.id.clone()) {
                return Err(AppError::validation(format!("duplicate task id '{}'", task.id)));
            }
        }
        self.tasks = tasks;
        Ok(())
    }

    /// Appends tasks whose ids are not already present. Returns how many
    /// were added.
    pub fn merge(&mut self, tasks: Vec<Task>) -> usize {
        let mut added = 0;
        for task in tasks {
            let exists = self.tasks.iter().any(|existing| existing.id == task.id);
            if !exists {
                self.tasks.push(task);
                added += 1;
            }
        }
        added
    }

    fn index_of(&self, id: &str) -> Result<usize, AppError> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("id is required"));
        }
        self.tasks
            .iter()
            .position(|task| task.id == trimmed)
            .ok_or_else(|| AppError::not_found(format!("no task with id '{trimmed}'")))
    }

    // Nanosecond timestamps collide only when tasks are added within the
    // same tick; bump until the id is free.
    fn next_id(&self) -> String {
        let mut nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
        loop {
            let id = format!("task-{nanos}");
            if !self.tasks.iter().any(|task| task.id == id) {
                return id;
            }
            nanos += 1;
        }
    }
}

fn transition(task: &mut Task, completed: bool) -> Result<(), AppError> {
    if completed && !task.completed {
        task.completed = true;
        task.completed_at = Some(model::now_rfc3339()?);
    } else if !completed && task.completed {
        task.completed = false;
        task.completed_at = None;
    }
    Ok(())
}
