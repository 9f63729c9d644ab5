//! Study to-do list.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::ValidationError;
use crate::storage::{load_json, save_json, KeyValueStore};

const TASKS_KEY: &str = "tasks.list";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        })
    }
}

impl FromStr for TaskPriority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(ValidationError::InvalidValue {
                field: "priority".to_string(),
                message: format!("unknown priority {s:?}"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyTask {
    pub id: Uuid,
    pub title: String,
    pub subject: String,
    pub completed: bool,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: TaskPriority,
    pub created_at: DateTime<Utc>,
    /// Set on the first completion; reopening does not clear it.
    #[serde(default)]
    pub rewarded: bool,
}

/// Fields of a task that can be edited after creation.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub priority: Option<TaskPriority>,
}

/// Result of [`TaskList::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Completed,
    Reopened,
}

pub struct TaskList {
    tasks: Vec<StudyTask>,
    clock: Arc<dyn Clock>,
    store: Arc<dyn KeyValueStore>,
}

impl TaskList {
    pub fn new(clock: Arc<dyn Clock>, store: Arc<dyn KeyValueStore>) -> Self {
        let tasks = load_json(store.as_ref(), TASKS_KEY).unwrap_or_default();
        Self {
            tasks,
            clock,
            store,
        }
    }

    pub fn list(&self) -> &[StudyTask] {
        &self.tasks
    }

    pub fn get(&self, id: Uuid) -> Option<&StudyTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len() - self.completed_count()
    }

    pub fn add(
        &mut self,
        title: &str,
        subject: &str,
        priority: TaskPriority,
        due_date: Option<NaiveDate>,
    ) -> Result<StudyTask, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "title".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        let task = StudyTask {
            id: Uuid::new_v4(),
            title: title.to_string(),
            subject: subject.trim().to_string(),
            completed: false,
            due_date,
            priority,
            created_at: self.clock.now(),
            rewarded: false,
        };
        self.tasks.push(task.clone());
        self.persist();
        Ok(task)
    }

    /// Flip a task's completion flag.
    pub fn toggle(&mut self, id: Uuid) -> Result<Toggled, ValidationError> {
        let task = self.find_mut(id)?;
        task.completed = !task.completed;
        let toggled = if task.completed {
            Toggled::Completed
        } else {
            Toggled::Reopened
        };
        self.persist();
        Ok(toggled)
    }

    pub fn update(&mut self, id: Uuid, update: TaskUpdate) -> Result<&StudyTask, ValidationError> {
        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: "title".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        let task = self.find_mut(id)?;
        if let Some(title) = update.title {
            task.title = title.trim().to_string();
        }
        if let Some(subject) = update.subject {
            task.subject = subject.trim().to_string();
        }
        if let Some(due_date) = update.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        self.persist();
        self.get(id).ok_or(ValidationError::UnknownTask(id))
    }

    /// Mark a completed task as rewarded. Returns false if it is not
    /// completed or was rewarded before.
    pub fn claim_reward(&mut self, id: Uuid) -> Result<bool, ValidationError> {
        let task = self.find_mut(id)?;
        if !task.completed || task.rewarded {
            return Ok(false);
        }
        task.rewarded = true;
        self.persist();
        Ok(true)
    }

    pub fn delete(&mut self, id: Uuid) -> Result<StudyTask, ValidationError> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(ValidationError::UnknownTask(id))?;
        let removed = self.tasks.remove(index);
        self.persist();
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
        self.persist();
    }

    fn find_mut(&mut self, id: Uuid) -> Result<&mut StudyTask, ValidationError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ValidationError::UnknownTask(id))
    }

    fn persist(&self) {
        save_json(self.store.as_ref(), TASKS_KEY, &self.tasks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;

    fn list_with(store: Arc<MemoryStore>) -> TaskList {
        TaskList::new(Arc::new(ManualClock::new(Utc::now())), store)
    }

    #[test]
    fn add_toggle_delete() {
        let mut list = list_with(Arc::new(MemoryStore::new()));
        let task = list
            .add("Review notes", "Math", TaskPriority::High, None)
            .unwrap();
        list.add("Summary", "Computability", TaskPriority::Medium, None)
            .unwrap();
        assert_eq!(list.pending_count(), 2);

        assert_eq!(list.toggle(task.id).unwrap(), Toggled::Completed);
        assert_eq!(list.completed_count(), 1);
        assert_eq!(list.toggle(task.id).unwrap(), Toggled::Reopened);

        list.delete(task.id).unwrap();
        assert_eq!(list.list().len(), 1);
        assert!(matches!(
            list.toggle(task.id),
            Err(ValidationError::UnknownTask(id)) if id == task.id
        ));
    }

    #[test]
    fn rejects_blank_titles() {
        let mut list = list_with(Arc::new(MemoryStore::new()));
        assert!(list.add("   ", "Math", TaskPriority::Low, None).is_err());
        let task = list.add("Read", "", TaskPriority::Low, None).unwrap();
        let update = TaskUpdate {
            title: Some(" ".into()),
            ..Default::default()
        };
        assert!(list.update(task.id, update).is_err());
        assert_eq!(list.get(task.id).unwrap().title, "Read");
    }

    #[test]
    fn update_and_persist() {
        let store = Arc::new(MemoryStore::new());
        let mut list = list_with(store.clone());
        let task = list.add("Read", "History", TaskPriority::Low, None).unwrap();
        let due = NaiveDate::from_ymd_opt(2025, 11, 1);
        list.update(
            task.id,
            TaskUpdate {
                priority: Some(TaskPriority::High),
                due_date: Some(due),
                ..Default::default()
            },
        )
        .unwrap();

        let restored = list_with(store);
        let task = restored.get(task.id).unwrap();
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.due_date, due);
    }

    #[test]
    fn reward_claimed_once_per_task() {
        let store = Arc::new(MemoryStore::new());
        let mut list = list_with(store.clone());
        let task = list.add("Essay", "", TaskPriority::Low, None).unwrap();
        assert!(!list.claim_reward(task.id).unwrap());

        list.toggle(task.id).unwrap();
        assert!(list.claim_reward(task.id).unwrap());
        assert!(!list.claim_reward(task.id).unwrap());

        list.toggle(task.id).unwrap();
        list.toggle(task.id).unwrap();
        assert!(!list_with(store).claim_reward(task.id).unwrap());
    }

    #[test]
    fn parses_priority() {
        assert_eq!("HIGH".parse::<TaskPriority>().unwrap(), TaskPriority::High);
        assert!("urgent".parse::<TaskPriority>().is_err());
    }
}
