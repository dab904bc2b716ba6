use crate::discipline::{self, Discipline};
use serde::{Deserialize, Serialize};

/// Upstream lifecycle state of a work item. States other than new, active
/// and closed are treated as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    New,
    Active,
    Closed,
}

impl TaskState {
    pub fn from_upstream(state: &str) -> Self {
        match state.to_lowercase().as_str() {
            "new" => TaskState::New,
            "closed" => TaskState::Closed,
            _ => TaskState::Active,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, TaskState::Closed)
    }
}

/// A leaf work item. Discipline and the test-plan flag are derived from the
/// title at construction and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub discipline: Discipline,
    pub is_test_plan: bool,
    pub estimate_hours: Option<f64>,
    pub assignee: Option<String>,
    pub parent_story_id: String,
    pub state: TaskState,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        parent_story_id: impl Into<String>,
    ) -> Self {
        let title = title.into();
        let tag = discipline::classify_title(&title);
        Self {
            id: id.into(),
            title,
            discipline: tag.discipline,
            is_test_plan: tag.is_test_plan,
            estimate_hours: None,
            assignee: None,
            parent_story_id: parent_story_id.into(),
            state: TaskState::Active,
        }
    }

    pub fn with_estimate(mut self, hours: f64) -> Self {
        self.estimate_hours = Some(hours);
        self
    }

    pub fn with_assignee(mut self, email: impl Into<String>) -> Self {
        self.assignee = Some(email.into().to_lowercase());
        self
    }

    pub fn with_state(mut self, state: TaskState) -> Self {
        self.state = state;
        self
    }
}

/// A parent work item grouping tasks under one business outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStory {
    pub id: String,
    pub title: String,
    pub area_path: String,
    pub task_ids: Vec<String>,
}

impl UserStory {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        area_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            area_path: area_path.into(),
            task_ids: Vec::new(),
        }
    }
}
