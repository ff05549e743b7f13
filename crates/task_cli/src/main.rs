use clap::Parser;
use clap::error::ErrorKind;
use tabled::{Table, Tabled};
use task_cli::cli::{Cli, Command};
use task_core::error::AppError;
use task_core::model::{NewTask, PatchField, Priority, Task, TaskPatch, parse_date};
use task_core::query::{self, SortKey};
use task_core::stats::{self, Summary};
use task_core::storage::file;
use time::{Date, OffsetDateTime, UtcOffset};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Priority")]
    priority: &'static str,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn status_label(task: &Task, today: Date) -> String {
    if task.completed {
        "completed".to_string()
    } else if task.is_overdue(today) {
        "pending (overdue)".to_string()
    } else {
        "pending".to_string()
    }
}

fn today_local() -> Date {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset).date()
}

fn print_tasks_table(tasks: &[Task], today: Date) {
    if tasks.is_empty() {
        println!("No tasks found matching the criteria.");
        return;
    }

    let rows: Vec<TaskRow> = tasks
        .iter()
        .map(|task| TaskRow {
            id: task.id.clone(),
            title: task.title.clone(),
            priority: task.priority.label(),
            due: task.due_date.clone().unwrap_or_else(|| "-".to_string()),
            category: task.category.clone().unwrap_or_else(|| "-".to_string()),
            status: status_label(task, today),
        })
        .collect();

    println!("{}", Table::new(rows));
    println!("\nTotal: {} task(s)", tasks.len());
}

fn print_tasks_json(tasks: &[Task]) -> Result<(), AppError> {
    let payload =
        serde_json::to_string_pretty(tasks).map_err(|err| AppError::bad_format(err.to_string()))?;
    println!("{payload}");
    Ok(())
}

fn print_task_json(task: &Task) -> Result<(), AppError> {
    let payload =
        serde_json::to_string_pretty(task).map_err(|err| AppError::bad_format(err.to_string()))?;
    println!("{payload}");
    Ok(())
}

fn print_task_detail(task: &Task, today: Date) {
    println!("ID: {}", task.id);
    println!("Title: {}", task.title);
    println!("Status: {}", status_label(task, today));
    println!("Priority: {}", task.priority.label());
    if let Some(category) = task.category.as_deref() {
        println!("Category: {category}");
    }
    if let Some(due) = task.due_date.as_deref() {
        if task.is_overdue(today) {
            println!("Due date: OVERDUE: {due}");
        } else {
            println!("Due date: {due}");
        }
    }
    println!("Created: {}", task.created_at);
    if let Some(completed_at) = task.completed_at.as_deref() {
        println!("Completed: {completed_at}");
    }
    if let Some(description) = task.description.as_deref() {
        println!("\nDescription:\n{description}");
    }
}

fn print_stats(summary: &Summary) {
    println!("Task Statistics");
    println!("===============");
    println!("Total tasks: {}", summary.total);
    println!("Completed: {} ({}%)", summary.completed, summary.completion_rate);
    println!("Pending: {}", summary.pending);
    println!("Overdue: {}", summary.overdue);

    if !summary.by_category.is_empty() {
        println!("\nCategories");
        println!("----------");
        for (category, count) in &summary.by_category {
            println!("{category}: {count} task(s)");
        }
    }

    println!("\nPriorities");
    println!("----------");
    println!("High: {} task(s)", summary.by_priority.high);
    println!("Medium: {} task(s)", summary.by_priority.medium);
    println!("Low: {} task(s)", summary.by_priority.low);
}

// `--due none` / `--category none` clear the field instead of setting it.
fn clearable(value: Option<String>) -> PatchField<String> {
    match value {
        None => PatchField::Keep,
        Some(raw) if raw.eq_ignore_ascii_case("none") => PatchField::Clear,
        Some(raw) => PatchField::Set(raw),
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::validation(message)
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let store_path = file::store_path(cli.file.as_deref())?;

    match cli.command {
        Command::Add {
            title,
            description,
            due,
            priority,
            category,
        } => {
            let mut store = file::load_store(&store_path)?;
            let task = store.add(NewTask {
                title,
                description,
                priority: Priority::parse(&priority)?,
                due_date: due,
                category,
            })?;
            file::save_store(&store_path, &store)?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Added task: {} ({})", task.title, task.id);
            }
        }
        Command::List {
            all,
            pending,
            completed,
            overdue,
            priority,
            category,
            due_today,
            due_before,
            due_after,
            search,
            sort_by,
            reverse,
        } => {
            let store = file::load_store(&store_path)?;
            let today = today_local();

            let mut tasks: Vec<Task> = if completed {
                query::filter_completed(store.list_all())
            } else if pending || !all {
                query::filter_pending(store.list_all())
            } else {
                store.list_all().to_vec()
            };
            if overdue {
                tasks = query::filter_overdue(&tasks, today);
            }
            if let Some(priority) = priority.as_deref() {
                tasks = query::filter_by_priority(&tasks, Priority::parse(priority)?);
            }
            if let Some(category) = category.as_deref() {
                tasks = query::filter_by_category(&tasks, category);
            }
            if due_today {
                tasks = query::filter_due_on(&tasks, today);
            }
            if let Some(date) = due_before.as_deref() {
                tasks = query::filter_due_before(&tasks, parse_date(date)?);
            }
            if let Some(date) = due_after.as_deref() {
                tasks = query::filter_due_after(&tasks, parse_date(date)?);
            }
            if let Some(needle) = search.as_deref() {
                tasks = query::search(&tasks, needle);
            }
            let tasks = query::sort_by(&tasks, SortKey::parse(&sort_by)?, reverse);

            if cli.json {
                print_tasks_json(&tasks)?;
            } else {
                print_tasks_table(&tasks, today);
            }
        }
        Command::Show { id } => {
            let store = file::load_store(&store_path)?;
            let task = store.get(&id)?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                print_task_detail(&task, today_local());
            }
        }
        Command::Update {
            id,
            title,
            description,
            due,
            priority,
            category,
        } => {
            let mut store = file::load_store(&store_path)?;
            let patch = TaskPatch {
                title,
                description: match description {
                    None => PatchField::Keep,
                    Some(text) => PatchField::Set(text),
                },
                priority: match priority.as_deref() {
                    None => None,
                    Some(raw) => Some(Priority::parse(raw)?),
                },
                due_date: clearable(due),
                category: clearable(category),
                completed: None,
            };
            let task = store.update(&id, patch)?;
            file::save_store(&store_path, &store)?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Updated task: {} ({})", task.title, task.id);
            }
        }
        Command::Complete { id } => {
            let mut store = file::load_store(&store_path)?;
            let task = store.complete(&id)?;
            file::save_store(&store_path, &store)?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Completed task: {} ({})", task.title, task.id);
            }
        }
        Command::Reopen { id } => {
            let mut store = file::load_store(&store_path)?;
            let task = store.reopen(&id)?;
            file::save_store(&store_path, &store)?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Reopened task: {} ({})", task.title, task.id);
            }
        }
        Command::Delete { id } => {
            let mut store = file::load_store(&store_path)?;
            let task = store.get(&id)?;
            store.delete(&id)?;
            file::save_store(&store_path, &store)?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Deleted task: {} ({})", task.title, task.id);
            }
        }
        Command::Export { path } => {
            let store = file::load_store(&store_path)?;
            file::write_tasks(&path, store.list_all())?;
            println!("Exported {} task(s) to {}", store.len(), path.display());
        }
        Command::Import { path, merge } => {
            let mut store = file::load_store(&store_path)?;
            let tasks = file::read_tasks(&path)?;
            if merge {
                let added = store.merge(tasks);
                file::save_store(&store_path, &store)?;
                println!("Imported and merged {} task(s) from {}", added, path.display());
                println!("Total tasks: {}", store.len());
            } else {
                store.replace_all(tasks)?;
                file::save_store(&store_path, &store)?;
                println!("Imported {} task(s) from {}", store.len(), path.display());
            }
        }
        Command::Merge { path } => {
            let mut store = file::load_store(&store_path)?;
            let tasks = file::read_tasks(&path)?;
            let added = store.merge(tasks);
            file::save_store(&store_path, &store)?;
            println!("Merged {} task(s) from {}", added, path.display());
            println!("Total tasks: {}", store.len());
        }
        Command::Stats => {
            let store = file::load_store(&store_path)?;
            let summary = stats::summarize(store.list_all(), today_local());
            if cli.json {
                let payload = serde_json::to_string_pretty(&summary)
                    .map_err(|err| AppError::bad_format(err.to_string()))?;
                println!("{payload}");
            } else {
                print_stats(&summary);
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                std::process::exit(1);
            }
        },
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
