pub mod calendar;
pub mod capacity;
pub mod config;
pub mod devops;
pub mod discipline;
pub mod executor;
pub mod graph;
pub mod normalize;
pub mod report;
pub mod scheduler;
pub mod sprint;
pub mod story;
pub mod task;

pub use calendar::{Period, Slot, SprintCalendar, SLOT_HOURS};
pub use capacity::{CapacityError, CapacityLedger};
pub use config::{
    load_dayoffs, ConfigError, DependenciesConfig, DevOpsConfig, ExecutorsConfig, SetupConfig,
};
pub use devops::{DevOpsClient, UpstreamError, WorkItem, WorkItemKind};
pub use discipline::{classify_title, Discipline, TitleTag};
pub use executor::{DayOff, DayOffPeriod, Executor};
pub use graph::{DependencyEdge, DependencyGraph};
pub use normalize::{normalize_items, NormalizeError, SprintBacklog};
pub use report::{ReportError, SprintReport};
pub use scheduler::{
    Placement, Rejection, RejectionReason, ScheduleOutcome, SprintScheduler,
};
pub use sprint::SprintMeta;
pub use story::{aggregate_stories, story_points_for_hours, StorySummary};
pub use task::{Task, TaskState, UserStory};
