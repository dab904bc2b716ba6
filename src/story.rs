use crate::calendar::Slot;
use crate::normalize::SprintBacklog;
use crate::scheduler::{Placement, ScheduleOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated planning result for one user story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorySummary {
    pub story_id: String,
    pub title: String,
    pub owner: String,
    pub start: Slot,
    pub end: Slot,
    pub story_points: u32,
    pub total_hours: f64,
}

/// Bucketed effort mapping from summed placed hours to story points.
pub fn story_points_for_hours(hours: f64) -> u32 {
    if hours <= 4.0 {
        1
    } else if hours <= 8.0 {
        2
    } else if hours <= 16.0 {
        3
    } else if hours <= 24.0 {
        5
    } else if hours <= 40.0 {
        8
    } else {
        13
    }
}

/// Derives per-story owner, interval and points from placed child tasks.
///
/// Stories with no placed children are omitted; their child rejections stay
/// in the outcome's rejection list. The owner is the executor with the
/// greatest summed hours, ties broken by lexicographic email.
pub fn aggregate_stories(backlog: &SprintBacklog, outcome: &ScheduleOutcome) -> Vec<StorySummary> {
    let mut summaries = Vec::new();

    for story in &backlog.stories {
        let placed: Vec<&Placement> = story
            .task_ids
            .iter()
            .filter_map(|id| outcome.placement(id))
            .collect();
        if placed.is_empty() {
            continue;
        }

        let mut hours_by_executor: BTreeMap<&str, f64> = BTreeMap::new();
        for placement in &placed {
            *hours_by_executor
                .entry(placement.executor.as_str())
                .or_insert(0.0) += placement.hours;
        }
        // Ascending email iteration plus strict comparison keeps the
        // lexicographically smallest email on ties.
        let mut owner = "";
        let mut owner_hours = f64::NEG_INFINITY;
        for (email, hours) in &hours_by_executor {
            if *hours > owner_hours {
                owner = email;
                owner_hours = *hours;
            }
        }

        let mut start = placed[0].start;
        let mut end = placed[0].end;
        for placement in &placed {
            start = start.min(placement.start);
            end = end.max(placement.end);
        }
        let total_hours: f64 = placed.iter().map(|p| p.hours).sum();

        summaries.push(StorySummary {
            story_id: story.id.clone(),
            title: story.title.clone(),
            owner: owner.to_string(),
            start,
            end,
            story_points: story_points_for_hours(total_hours),
            total_hours,
        });
    }

    summaries
}
