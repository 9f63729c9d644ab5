use chrono::NaiveDate;
use clap::Subcommand;
use studytrack_core::tasks::{TaskUpdate, Toggled};
use studytrack_core::TaskPriority;
use uuid::Uuid;

use super::{print_events, print_json, with_tracker, CmdResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a task
    Add {
        title: String,
        #[arg(long, default_value = "")]
        subject: String,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        priority: TaskPriority,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// List tasks
    List {
        /// Only tasks not yet completed
        #[arg(long)]
        pending: bool,
    },
    /// Mark a task completed
    Done { id: Uuid },
    /// Flip a task between completed and pending
    Toggle { id: Uuid },
    /// Edit a task
    Edit {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(long)]
        due: Option<NaiveDate>,
        /// Remove the due date
        #[arg(long, conflicts_with = "due")]
        no_due: bool,
    },
    /// Delete a task
    Delete { id: Uuid },
}

pub fn run(action: TaskAction) -> CmdResult {
    with_tracker(|tracker| match action {
        TaskAction::Add {
            title,
            subject,
            priority,
            due,
        } => {
            let task = tracker.tasks_mut().add(&title, &subject, priority, due)?;
            print_json(&task)
        }
        TaskAction::List { pending } => {
            let tasks: Vec<_> = tracker
                .tasks()
                .list()
                .iter()
                .filter(|t| !pending || !t.completed)
                .collect();
            print_json(&tasks)
        }
        TaskAction::Done { id } => {
            if !tracker.complete_task(id)? {
                println!("task already completed");
            }
            print_events(tracker)
        }
        TaskAction::Toggle { id } => {
            match tracker.toggle_task(id)? {
                Toggled::Completed => print_events(tracker)?,
                Toggled::Reopened => println!("task reopened"),
            }
            Ok(())
        }
        TaskAction::Edit {
            id,
            title,
            subject,
            priority,
            due,
            no_due,
        } => {
            let due_date = if no_due { Some(None) } else { due.map(Some) };
            let task = tracker.tasks_mut().update(
                id,
                TaskUpdate {
                    title,
                    subject,
                    due_date,
                    priority,
                },
            )?;
            print_json(task)
        }
        TaskAction::Delete { id } => {
            let task = tracker.tasks_mut().delete(id)?;
            println!("deleted {}", task.title);
            Ok(())
        }
    })
}
