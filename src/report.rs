use crate::executor::DayOff;
use crate::graph::DependencyEdge;
use crate::scheduler::{Placement, Rejection, RejectionReason, ScheduleOutcome};
use crate::sprint::SprintMeta;
use crate::story::StorySummary;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeJsonError;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug)]
pub enum ReportError {
    Io(io::Error),
    Serialization(SerdeJsonError),
    Csv(csv::Error),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Io(err) => write!(f, "report io error: {err}"),
            ReportError::Serialization(err) => write!(f, "report serialization error: {err}"),
            ReportError::Csv(err) => write!(f, "report csv error: {err}"),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<io::Error> for ReportError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<SerdeJsonError> for ReportError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<csv::Error> for ReportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type ReportResult<T> = Result<T, ReportError>;

/// The rendering-agnostic planning record: everything a renderer needs to
/// present the sprint, with no presentation decisions baked in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintReport {
    pub sprint: SprintMeta,
    pub team: String,
    pub stories: Vec<StorySummary>,
    pub placements: Vec<Placement>,
    pub dayoffs: BTreeMap<String, Vec<DayOff>>,
    pub dependencies: Vec<DependencyEdge>,
    pub rejections: BTreeMap<RejectionReason, Vec<Rejection>>,
}

impl SprintReport {
    pub fn assemble(
        sprint: SprintMeta,
        team: impl Into<String>,
        stories: Vec<StorySummary>,
        outcome: &ScheduleOutcome,
        dayoffs: BTreeMap<String, Vec<DayOff>>,
        dependencies: Vec<DependencyEdge>,
    ) -> Self {
        let mut rejections: BTreeMap<RejectionReason, Vec<Rejection>> = BTreeMap::new();
        for rejection in &outcome.rejections {
            rejections
                .entry(rejection.reason)
                .or_default()
                .push(rejection.clone());
        }
        for group in rejections.values_mut() {
            group.sort_by(|a, b| a.task_id.cmp(&b.task_id));
        }

        Self {
            sprint,
            team: team.into(),
            stories,
            placements: outcome.placements.clone(),
            dayoffs,
            dependencies,
            rejections,
        }
    }

    pub fn rejection_count(&self) -> usize {
        self.rejections.values().map(Vec::len).sum()
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> ReportResult<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> ReportResult<Self> {
        let file = File::open(path)?;
        let report = serde_json::from_reader(file)?;
        Ok(report)
    }

    /// Writes the story rows as a flat CSV table.
    pub fn save_story_csv<P: AsRef<Path>>(&self, path: P) -> ReportResult<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);
        for story in &self.stories {
            writer.serialize(StoryCsvRecord::from(story))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Renders the human-readable Markdown report.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let push = |out: &mut String, line: &str| {
            out.push_str(line);
            out.push('\n');
        };

        push(&mut out, &format!("# Sprint Report: {}", self.sprint.name));
        push(&mut out, "");
        push(&mut out, "## 1. Sprint Summary");
        push(&mut out, "");
        push(
            &mut out,
            &format!(
                "- Sprint: **{}** ({} {})",
                self.sprint.name, self.sprint.year, self.sprint.quarter
            ),
        );
        push(
            &mut out,
            &format!(
                "- Window: {} to {} ({})",
                self.sprint.start_date, self.sprint.end_date, self.sprint.timezone
            ),
        );
        push(&mut out, &format!("- Team: {}", self.team));
        push(
            &mut out,
            &format!("- User stories planned: {}", self.stories.len()),
        );
        push(&mut out, "");

        push(&mut out, "## 2. Planned User Stories");
        push(&mut out, "");
        push(&mut out, "| ID | Title | Owner | Start | End | Story Points |");
        push(&mut out, "|----|-------|-------|-------|-----|--------------|");
        for story in &self.stories {
            push(
                &mut out,
                &format!(
                    "| {} | {} | {} | {} | {} | {} |",
                    story.story_id, story.title, story.owner, story.start, story.end,
                    story.story_points
                ),
            );
        }
        push(&mut out, "");

        push(&mut out, "## 3. Day-offs");
        push(&mut out, "");
        if self.dayoffs.is_empty() {
            push(&mut out, "*No day-offs declared*");
        } else {
            push(&mut out, "| Executor | Absences |");
            push(&mut out, "|----------|----------|");
            for (email, entries) in &self.dayoffs {
                let absences = entries
                    .iter()
                    .map(|d| format!("{} ({})", d.date, d.period))
                    .collect::<Vec<_>>()
                    .join(", ");
                push(&mut out, &format!("| {} | {} |", email, absences));
            }
        }
        push(&mut out, "");

        push(&mut out, "## 4. Task Dependencies");
        push(&mut out, "");
        if self.dependencies.is_empty() {
            push(&mut out, "*No dependencies declared*");
        } else {
            for edge in &self.dependencies {
                push(
                    &mut out,
                    &format!("- Task {} depends on task {}", edge.successor, edge.prerequisite),
                );
            }
        }
        push(&mut out, "");

        push(&mut out, "## 5. Unscheduled Tasks");
        push(&mut out, "");
        if self.rejections.is_empty() {
            push(&mut out, "*Every task was placed*");
        } else {
            for (reason, rejections) in &self.rejections {
                push(&mut out, &format!("### {}", reason));
                for rejection in rejections {
                    push(&mut out, &format!("- Task {}", rejection.task_id));
                }
                push(&mut out, "");
            }
        }

        push(&mut out, "---");
        push(
            &mut out,
            &format!("All dates are calendar dates in {}.", self.sprint.timezone),
        );
        out
    }

    /// Persists the report under `output_dir` as JSON, CSV and Markdown.
    /// Returns the written paths.
    pub fn write_files(&self, output_dir: &Path) -> ReportResult<Vec<PathBuf>> {
        fs::create_dir_all(output_dir)?;
        let stem = self.sprint.name.replace(' ', "_");

        let json_path = output_dir.join(format!("sprint_{stem}.json"));
        self.save_json(&json_path)?;

        let csv_path = output_dir.join(format!("sprint_{stem}_stories.csv"));
        self.save_story_csv(&csv_path)?;

        let md_path = output_dir.join(format!("sprint_{stem}.md"));
        fs::write(&md_path, self.to_markdown())?;

        info!(dir = %output_dir.display(), "report written");
        Ok(vec![json_path, csv_path, md_path])
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoryCsvRecord {
    story_id: String,
    title: String,
    owner: String,
    start_date: String,
    start_period: String,
    end_date: String,
    end_period: String,
    story_points: u32,
    total_hours: f64,
}

impl From<&StorySummary> for StoryCsvRecord {
    fn from(story: &StorySummary) -> Self {
        Self {
            story_id: story.story_id.clone(),
            title: story.title.clone(),
            owner: story.owner.clone(),
            start_date: story.start.date.to_string(),
            start_period: story.start.period.to_string(),
            end_date: story.end.date.to_string(),
            end_period: story.end.period.to_string(),
            story_points: story.story_points,
            total_hours: story.total_hours,
        }
    }
}
