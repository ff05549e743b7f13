//! Load/save boundary. The default store file is canonical JSON; export and
//! import dispatch on the file extension.

use super::{csv, json};
use crate::config;
use crate::error::AppError;
use crate::model::Task;
use crate::store::TaskStore;
use std::path::{Path, PathBuf};

const STORE_FILE_NAME: &str = "tasks.json";
const STORE_ENV_VAR: &str = "TASKMAN_STORE_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
}

pub fn format_for_path(path: &Path) -> Format {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Format::Csv,
        _ => Format::Json,
    }
}

/// Resolves the store file: explicit flag, then `TASKMAN_STORE_PATH`, then
/// the config file, then the platform default.
pub fn store_path(explicit: Option<&Path>) -> Result<PathBuf, AppError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if let Some(path) = config::load_config_with_fallback().config.store_path {
        return Ok(path);
    }

    default_store_path()
}

fn default_store_path() -> Result<PathBuf, AppError> {
    if cfg!(windows) {
        let appdata = std::env::var("APPDATA").map_err(|_| AppError::io("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("taskman").join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::io("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("taskman")
            .join(STORE_FILE_NAME))
    }
}

/// A missing file is an empty store; anything else must parse and validate.
pub fn load_store(path: &Path) -> Result<TaskStore, AppError> {
    if !path.exists() {
        return Ok(TaskStore::new());
    }
    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let tasks = json::from_json(&content)?;
    TaskStore::from_tasks(tasks)
}

pub fn save_store(path: &Path, store: &TaskStore) -> Result<(), AppError> {
    write_text(path, &json::to_json(store.list_all())?)
}

pub fn read_tasks(path: &Path) -> Result<Vec<Task>, AppError> {
    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    match format_for_path(path) {
        Format::Json => json::from_json(&content),
        Format::Csv => csv::from_csv(&content),
    }
}

pub fn write_tasks(path: &Path, tasks: &[Task]) -> Result<(), AppError> {
    let content = match format_for_path(path) {
        Format::Json => json::to_json(tasks)?,
        Format::Csv => csv::to_csv(tasks),
    };
    write_text(path, &content)
}

fn write_text(path: &Path, content: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}
