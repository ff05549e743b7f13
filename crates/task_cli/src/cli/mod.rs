use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the task store file
    #[arg(short = 'f', long = "file", value_name = "PATH", global = true)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: taskman add "Buy milk" --priority high --due 2026-08-10
    Add {
        title: String,
        /// Task description
        #[arg(short = 'd', long)]
        description: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long = "due", value_name = "DATE")]
        due: Option<String>,
        /// Priority (low, medium, high)
        #[arg(short = 'p', long, default_value = "medium")]
        priority: String,
        /// Category or tag for grouping tasks
        #[arg(short = 'c', long)]
        category: Option<String>,
    },
    /// List tasks (pending only unless told otherwise)
    ///
    /// Example: taskman list --overdue --sort-by priority
    List {
        /// Show all tasks (including completed)
        #[arg(short = 'a', long)]
        all: bool,
        /// Show only pending tasks
        #[arg(long)]
        pending: bool,
        /// Show only completed tasks
        #[arg(long)]
        completed: bool,
        /// Show only overdue tasks
        #[arg(long)]
        overdue: bool,
        /// Filter by priority
        #[arg(short = 'p', long, value_name = "PRIORITY")]
        priority: Option<String>,
        /// Filter by category (exact match)
        #[arg(short = 'c', long, value_name = "CATEGORY")]
        category: Option<String>,
        /// Show tasks due today
        #[arg(long)]
        due_today: bool,
        /// Show tasks due before a date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        due_before: Option<String>,
        /// Show tasks due after a date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        due_after: Option<String>,
        /// Search in task title and description
        #[arg(short = 's', long, value_name = "QUERY")]
        search: Option<String>,
        /// Sort tasks by field (due_date, priority, created_at, title, category)
        #[arg(long = "sort-by", value_name = "KEY", default_value = "due_date")]
        sort_by: String,
        /// Reverse the sort order
        #[arg(long)]
        reverse: bool,
    },
    /// Show details of a task
    ///
    /// Example: taskman show task-1755000000000000000
    Show {
        id: String,
    },
    /// Update fields of an existing task
    ///
    /// Example: taskman update task-1 --title "Buy oat milk" --due none
    Update {
        id: String,
        /// New task title
        #[arg(short = 't', long)]
        title: Option<String>,
        /// New task description
        #[arg(short = 'd', long, value_name = "DESC")]
        description: Option<String>,
        /// New due date (YYYY-MM-DD, or 'none' to clear)
        #[arg(long = "due", value_name = "DATE")]
        due: Option<String>,
        /// New priority (low, medium, high)
        #[arg(short = 'p', long)]
        priority: Option<String>,
        /// New category (or 'none' to clear)
        #[arg(short = 'c', long, value_name = "CAT")]
        category: Option<String>,
    },
    /// Mark a task as completed
    ///
    /// Example: taskman complete task-1
    Complete {
        id: String,
    },
    /// Mark a completed task as pending again
    ///
    /// Example: taskman reopen task-1
    Reopen {
        id: String,
    },
    /// Delete a task
    ///
    /// Example: taskman delete task-1
    Delete {
        id: String,
    },
    /// Export tasks to a JSON or CSV file (format chosen by extension)
    ///
    /// Example: taskman export backup.csv
    Export {
        path: PathBuf,
    },
    /// Import tasks from a JSON or CSV file, replacing the store
    ///
    /// Example: taskman import backup.csv --merge
    Import {
        path: PathBuf,
        /// Merge with existing tasks instead of replacing them
        #[arg(long)]
        merge: bool,
    },
    /// Merge tasks from another task file, skipping ids already present
    ///
    /// Example: taskman merge other-tasks.json
    Merge {
        path: PathBuf,
    },
    /// Show task statistics
    Stats,
}
