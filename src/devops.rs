use crate::config::DevOpsConfig;
use crate::sprint::SprintMeta;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use tracing::{info, warn};

const API_VERSION: &str = "7.1";

#[derive(Debug)]
pub enum UpstreamError {
    Transport(reqwest::Error),
    /// The sprint query returned no user stories; a report over an empty
    /// or partially fetched sprint must not be produced.
    EmptySprint,
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Transport(err) => write!(f, "work tracker request failed: {err}"),
            UpstreamError::EmptySprint => {
                write!(f, "no user stories found for the configured sprint")
            }
        }
    }
}

impl std::error::Error for UpstreamError {}

impl From<reqwest::Error> for UpstreamError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

/// Kind of an upstream work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemKind {
    UserStory,
    Task,
}

/// The contract this planner consumes from the work tracker. The same shape
/// is accepted from a local JSON snapshot, which is how runs are replayed
/// and tested without network access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    pub kind: WorkItemKind,
    pub title: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub original_estimate: Option<f64>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub area_path: String,
}

#[derive(Debug, Deserialize)]
struct WiqlResponse {
    #[serde(rename = "workItems", default)]
    work_items: Vec<WiqlRef>,
}

#[derive(Debug, Deserialize)]
struct WiqlRef {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    value: Vec<RawWorkItem>,
}

#[derive(Debug, Deserialize)]
struct RawWorkItem {
    id: i64,
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

impl RawWorkItem {
    fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    fn into_work_item(self, kind: WorkItemKind) -> WorkItem {
        let assigned_to = self
            .fields
            .get("System.AssignedTo")
            .and_then(|v| v.get("uniqueName"))
            .and_then(Value::as_str)
            .map(str::to_string);
        WorkItem {
            id: self.id.to_string(),
            kind,
            title: self.str_field("System.Title").unwrap_or_default().to_string(),
            state: self.str_field("System.State").unwrap_or_default().to_string(),
            original_estimate: self
                .fields
                .get("Microsoft.VSTS.Scheduling.OriginalEstimate")
                .and_then(Value::as_f64),
            assigned_to,
            parent_id: self
                .fields
                .get("System.Parent")
                .and_then(Value::as_i64)
                .map(|id| id.to_string()),
            area_path: self.str_field("System.AreaPath").unwrap_or_default().to_string(),
        }
    }
}

/// Work-item client for the Azure DevOps REST API.
///
/// Fetching is the only network suspension point of the planner and runs
/// strictly before scheduling, so the blocking client is sufficient.
pub struct DevOpsClient {
    http: reqwest::blocking::Client,
    base_url: String,
    project: String,
    token: String,
}

impl DevOpsClient {
    pub fn new(config: &DevOpsConfig) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url: format!(
                "https://dev.azure.com/{}/{}",
                config.organization, config.project
            ),
            project: config.project.clone(),
            token: config.token.clone(),
        }
    }

    /// Fetches the sprint's user stories and their child tasks.
    ///
    /// Stories are selected by team area path and iteration path; tasks by
    /// parent link. An empty story set is an error: scheduling over a
    /// partial snapshot is not allowed.
    pub fn fetch_sprint_items(
        &self,
        sprint: &SprintMeta,
        team: &str,
    ) -> Result<Vec<WorkItem>, UpstreamError> {
        let iteration = sprint.iteration_path(&self.project);
        let story_query = format!(
            "SELECT [System.Id] FROM WorkItems \
             WHERE [System.TeamProject] = '{}' \
             AND [System.AreaPath] = '{}' \
             AND [System.IterationPath] = '{}' \
             AND [System.WorkItemType] = 'User Story' \
             ORDER BY [Microsoft.VSTS.Common.StackRank] ASC",
            self.project, team, iteration
        );

        let story_ids = self.run_wiql(&story_query)?;
        if story_ids.is_empty() {
            return Err(UpstreamError::EmptySprint);
        }
        info!(count = story_ids.len(), sprint = %sprint.name, "fetched sprint user stories");

        let mut items: Vec<WorkItem> = self
            .fetch_fields(&story_ids)?
            .into_iter()
            .map(|raw| raw.into_work_item(WorkItemKind::UserStory))
            .collect();

        let id_list = story_ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let task_query = format!(
            "SELECT [System.Id] FROM WorkItems \
             WHERE [System.TeamProject] = '{}' \
             AND [System.WorkItemType] = 'Task' \
             AND [System.Parent] IN ({}) \
             ORDER BY [Microsoft.VSTS.Common.StackRank] ASC",
            self.project, id_list
        );

        let task_ids = self.run_wiql(&task_query)?;
        if task_ids.is_empty() {
            warn!("sprint user stories have no child tasks");
        } else {
            info!(count = task_ids.len(), "fetched sprint tasks");
            items.extend(
                self.fetch_fields(&task_ids)?
                    .into_iter()
                    .map(|raw| raw.into_work_item(WorkItemKind::Task)),
            );
        }

        Ok(items)
    }

    fn run_wiql(&self, query: &str) -> Result<Vec<i64>, UpstreamError> {
        let url = format!("{}/_apis/wit/wiql?api-version={}", self.base_url, API_VERSION);
        let response: WiqlResponse = self
            .http
            .post(url)
            .basic_auth("", Some(&self.token))
            .json(&json!({ "query": query }))
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response.work_items.into_iter().map(|item| item.id).collect())
    }

    fn fetch_fields(&self, ids: &[i64]) -> Result<Vec<RawWorkItem>, UpstreamError> {
        let id_list = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
        let url = format!(
            "{}/_apis/wit/workitems?ids={}&api-version={}",
            self.base_url, id_list, API_VERSION
        );
        let response: BatchResponse = self
            .http
            .get(url)
            .basic_auth("", Some(&self.token))
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response.value)
    }
}
