use crate::devops::{WorkItem, WorkItemKind};
use crate::task::{Task, TaskState, UserStory};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct NormalizeError {
    message: String,
}

impl NormalizeError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for NormalizeError {}

/// The normalized, read-only snapshot the scheduler works from.
///
/// Closed tasks are kept: they never get placed or rejected, but they
/// satisfy prerequisites as of sprint start.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SprintBacklog {
    pub stories: Vec<UserStory>,
    pub tasks: Vec<Task>,
}

impl SprintBacklog {
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn story(&self, id: &str) -> Option<&UserStory> {
        self.stories.iter().find(|story| story.id == id)
    }

    /// Ids of every known task, closed ones included. Dependency edges are
    /// resolved against this set.
    pub fn task_ids(&self) -> BTreeSet<String> {
        self.tasks.iter().map(|task| task.id.clone()).collect()
    }
}

/// Converts raw work-tracker items into the internal backlog.
///
/// Stories are collected first; tasks are attached to their parent story.
/// Tasks whose parent is not among the fetched stories are dropped with a
/// warning. Duplicate ids are a hard error.
pub fn normalize_items(items: &[WorkItem]) -> Result<SprintBacklog, NormalizeError> {
    let mut stories: Vec<UserStory> = Vec::new();
    let mut story_index: HashMap<String, usize> = HashMap::new();

    for item in items.iter().filter(|item| item.kind == WorkItemKind::UserStory) {
        if story_index.contains_key(&item.id) {
            return Err(NormalizeError::new(format!(
                "duplicate user story id {}",
                item.id
            )));
        }
        story_index.insert(item.id.clone(), stories.len());
        stories.push(UserStory::new(&item.id, &item.title, &item.area_path));
    }

    let mut tasks: Vec<Task> = Vec::new();
    let mut seen_tasks: BTreeSet<String> = BTreeSet::new();

    for item in items.iter().filter(|item| item.kind == WorkItemKind::Task) {
        if !seen_tasks.insert(item.id.clone()) {
            return Err(NormalizeError::new(format!("duplicate task id {}", item.id)));
        }

        let parent = match &item.parent_id {
            Some(parent) => parent.clone(),
            None => {
                warn!(task = %item.id, "task has no parent user story, dropped");
                continue;
            }
        };
        let story_slot = match story_index.get(&parent) {
            Some(slot) => *slot,
            None => {
                warn!(task = %item.id, parent = %parent, "task parent not in sprint, dropped");
                continue;
            }
        };

        let estimate = match item.original_estimate {
            Some(hours) if hours < 0.0 => {
                warn!(task = %item.id, hours, "negative estimate treated as missing");
                None
            }
            other => other,
        };

        let mut task = Task::new(&item.id, &item.title, &parent)
            .with_state(TaskState::from_upstream(&item.state));
        task.estimate_hours = estimate;
        if let Some(assignee) = &item.assigned_to {
            task = task.with_assignee(assignee);
        }

        stories[story_slot].task_ids.push(task.id.clone());
        tasks.push(task);
    }

    Ok(SprintBacklog { stories, tasks })
}
