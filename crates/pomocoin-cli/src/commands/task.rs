//! Task management commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use pomocoin_core::format::{format_work_time, relative_time};
use pomocoin_core::{Database, RewardDispatcher, Task, TaskRepository};

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List tasks
    List {
        /// Show completed tasks instead of open ones
        #[arg(long)]
        completed: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one task with its progress notes
    Show {
        /// Task ID
        id: i64,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a task
    Update {
        /// Task ID
        id: i64,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
    },
    /// Mark a task done and collect its reward
    Complete {
        /// Task ID
        id: i64,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: i64,
    },
    /// Delete every completed task
    ClearCompleted,
    /// Add a progress note to a task outside a timer session
    Note {
        /// Task ID
        id: i64,
        /// Note text
        text: String,
    },
}

fn load(db: &Database, id: i64) -> Result<Task, Box<dyn std::error::Error>> {
    db.get(id)?
        .ok_or_else(|| format!("task {id} not found").into())
}

fn complete(db: &Database, id: i64) -> Result<String, Box<dyn std::error::Error>> {
    if load(db, id)?.is_completed {
        return Ok(format!("Task {id} was already completed"));
    }
    Ok(match RewardDispatcher::new(db).task_completed(id)? {
        Some(reward) => format!("Task completed: {id} (+{} coins)", reward.amount),
        None => format!("Task completed: {id} (no coins credited, wallet missing)"),
    })
}

fn print_line(task: &Task) {
    let mark = if task.is_completed { "x" } else { " " };
    println!(
        "[{mark}] #{:<4} {}  ({} pomodoros, {})",
        task.id,
        task.title,
        task.pomodoros_completed,
        format_work_time(task.time_spent_secs)
    );
}

pub fn run(action: TaskAction) -> CliResult {
    let db = Database::open()?;

    match action {
        TaskAction::Add { title, description } => {
            let id = db.insert_task(&Task::new(title, description))?;
            println!("Task created: {id}");
        }
        TaskAction::List { completed, json } => {
            let tasks = if completed {
                db.completed_tasks()?
            } else {
                db.active_tasks()?
            };
            if json {
                return print_json(&tasks);
            }
            if tasks.is_empty() {
                println!("no tasks");
            }
            for task in &tasks {
                print_line(task);
            }
        }
        TaskAction::Show { id, json } => {
            let task = load(&db, id)?;
            if json {
                return print_json(&task);
            }
            print_line(&task);
            if !task.description.is_empty() {
                println!("    {}", task.description);
            }
            let now = Utc::now().timestamp_millis();
            for note in task.notes().iter().rev() {
                println!("  - {} ({})", note.text, relative_time(note.timestamp, now));
            }
        }
        TaskAction::Update {
            id,
            title,
            description,
        } => {
            let mut task = load(&db, id)?;
            if let Some(title) = title {
                if title.trim().is_empty() {
                    return Err("title must not be empty".into());
                }
                task.title = title.trim().to_string();
            }
            if let Some(description) = description {
                task.description = description;
            }
            db.update(&task)?;
            println!("Task updated: {id}");
        }
        TaskAction::Complete { id } => println!("{}", complete(&db, id)?),
        TaskAction::Delete { id } => {
            if !db.delete_task(id)? {
                return Err(format!("task {id} not found").into());
            }
            println!("Task deleted: {id}");
        }
        TaskAction::ClearCompleted => {
            let removed = db.delete_completed_tasks()?;
            println!("Removed {removed} completed tasks");
        }
        TaskAction::Note { id, text } => {
            load(&db, id)?;
            match RewardDispatcher::new(&db).note_written(id, &text, 0)? {
                Some(reward) => println!("Note saved (+{} coins)", reward.amount),
                None => println!("Empty note ignored"),
            }
        }
    }
    Ok(())
}
