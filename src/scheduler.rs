use crate::calendar::{Slot, SprintCalendar};
use crate::capacity::CapacityLedger;
use crate::discipline::Discipline;
use crate::executor::Executor;
use crate::graph::DependencyGraph;
use crate::normalize::SprintBacklog;
use crate::task::Task;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, info, warn};

const EPSILON: f64 = 1e-6;

/// A committed assignment of a task to an executor and a slot interval.
/// Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub task_id: String,
    pub executor: String,
    pub start: Slot,
    pub end: Slot,
    /// Hours debited from the ledger; zero for estimate-less test plans.
    pub hours: f64,
}

/// Why a task could not be placed. Reasons are mutually exclusive; the
/// first applicable one in check order wins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    NoExecutor,
    MissingDependency,
    DependencyCycle,
    OutOfWindow,
    NoCapacity,
    NoEstimate,
    UnknownDiscipline,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::NoExecutor => "no-executor",
            RejectionReason::MissingDependency => "missing-dependency",
            RejectionReason::DependencyCycle => "dependency-cycle",
            RejectionReason::OutOfWindow => "out-of-window",
            RejectionReason::NoCapacity => "no-capacity",
            RejectionReason::NoEstimate => "no-estimate",
            RejectionReason::UnknownDiscipline => "unknown-discipline",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub task_id: String,
    pub reason: RejectionReason,
}

/// Result of one scheduling pass. Every schedulable task lands in exactly
/// one of the two lists; closed tasks appear in neither.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub placements: Vec<Placement>,
    pub rejections: Vec<Rejection>,
}

impl ScheduleOutcome {
    pub fn placement(&self, task_id: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.task_id == task_id)
    }

    pub fn rejection(&self, task_id: &str) -> Option<&Rejection> {
        self.rejections.iter().find(|r| r.task_id == task_id)
    }
}

/// Sequential sprint scheduler.
///
/// The pass is deterministic: tasks are ordered test-plans first, then
/// ascending task id, and slots are walked in calendar order. The capacity
/// ledger is the only mutable state and is held exclusively for the
/// duration of [`SprintScheduler::run`].
pub struct SprintScheduler<'a> {
    backlog: &'a SprintBacklog,
    graph: &'a DependencyGraph,
    calendar: &'a SprintCalendar,
    pools: HashMap<String, Discipline>,
}

impl<'a> SprintScheduler<'a> {
    pub fn new(
        backlog: &'a SprintBacklog,
        graph: &'a DependencyGraph,
        executors: &'a [Executor],
        calendar: &'a SprintCalendar,
    ) -> Self {
        let pools = executors
            .iter()
            .map(|executor| (executor.email.clone(), executor.discipline))
            .collect();
        Self {
            backlog,
            graph,
            calendar,
            pools,
        }
    }

    pub fn run(&self, ledger: &mut CapacityLedger) -> ScheduleOutcome {
        let mut outcome = ScheduleOutcome::default();
        let mut placed_end: HashMap<String, Slot> = HashMap::new();
        let mut rejected: HashSet<String> = HashSet::new();

        // Cycle membership is diagnosed once, before any placement.
        let cycle_members = self.graph.cycle_members();
        if !cycle_members.is_empty() {
            warn!(members = ?cycle_members, "dependency cycle detected");
        }
        for id in &cycle_members {
            let is_schedulable = self
                .backlog
                .task(id)
                .is_some_and(|task| !task.state.is_closed());
            if is_schedulable {
                rejected.insert(id.clone());
                outcome.rejections.push(Rejection {
                    task_id: id.clone(),
                    reason: RejectionReason::DependencyCycle,
                });
            }
        }

        // Single priority list: test plans first, then ascending task id.
        let mut remaining: Vec<&Task> = self
            .backlog
            .tasks
            .iter()
            .filter(|task| !task.state.is_closed() && !rejected.contains(&task.id))
            .collect();
        remaining.sort_by(|a, b| {
            b.is_test_plan
                .cmp(&a.is_test_plan)
                .then_with(|| a.id.cmp(&b.id))
        });

        // The list is consumed dependency-aware: the first task whose
        // prerequisites are all decided goes next. The graph is acyclic at
        // this point, so the loop always makes progress.
        while !remaining.is_empty() {
            let position = remaining
                .iter()
                .position(|task| self.prerequisites_decided(task, &placed_end, &rejected));
            let position = match position {
                Some(position) => position,
                None => {
                    // Unreachable for an acyclic graph; fail closed anyway.
                    warn!("no ready task among remaining, rejecting the rest");
                    for task in &remaining {
                        outcome.rejections.push(Rejection {
                            task_id: task.id.clone(),
                            reason: RejectionReason::MissingDependency,
                        });
                    }
                    break;
                }
            };
            let task = remaining.remove(position);

            match self.place(task, ledger, &placed_end) {
                Ok(placement) => {
                    info!(
                        task = %task.id,
                        executor = %placement.executor,
                        start = %placement.start,
                        end = %placement.end,
                        "task placed"
                    );
                    placed_end.insert(task.id.clone(), placement.end);
                    outcome.placements.push(placement);
                }
                Err(reason) => {
                    info!(task = %task.id, %reason, "task rejected");
                    rejected.insert(task.id.clone());
                    outcome.rejections.push(Rejection {
                        task_id: task.id.clone(),
                        reason,
                    });
                }
            }
        }

        outcome
    }

    /// True when every non-closed prerequisite of `task` has been placed or
    /// rejected. Closed prerequisites count as decided.
    fn prerequisites_decided(
        &self,
        task: &Task,
        placed_end: &HashMap<String, Slot>,
        rejected: &HashSet<String>,
    ) -> bool {
        self.graph.prerequisites_of(&task.id).all(|prereq| {
            let closed = self
                .backlog
                .task(prereq)
                .is_some_and(|t| t.state.is_closed());
            closed || placed_end.contains_key(prereq) || rejected.contains(prereq)
        })
    }

    fn place(
        &self,
        task: &Task,
        ledger: &mut CapacityLedger,
        placed_end: &HashMap<String, Slot>,
    ) -> Result<Placement, RejectionReason> {
        let assignee = match &task.assignee {
            Some(assignee) => assignee.to_lowercase(),
            None => return Err(RejectionReason::NoExecutor),
        };
        if task.discipline == Discipline::Unknown {
            return Err(RejectionReason::UnknownDiscipline);
        }
        match self.pools.get(&assignee) {
            Some(discipline) if *discipline == task.discipline => {}
            _ => return Err(RejectionReason::NoExecutor),
        }

        let hours = match task.estimate_hours {
            Some(hours) => hours,
            None if task.is_test_plan => 0.0,
            None => return Err(RejectionReason::NoEstimate),
        };

        // A rejected prerequisite can never be satisfied.
        let mut earliest = match self.calendar.first_slot() {
            Some(slot) => slot,
            None => return Err(RejectionReason::OutOfWindow),
        };
        for prereq in self.graph.prerequisites_of(&task.id) {
            let closed = self
                .backlog
                .task(prereq)
                .is_some_and(|t| t.state.is_closed());
            if closed {
                continue; // satisfied as of sprint start
            }
            match placed_end.get(prereq) {
                Some(end) => earliest = earliest.max(*end),
                None => return Err(RejectionReason::MissingDependency),
            }
        }

        if hours <= EPSILON {
            // Zero-hour tasks occupy their earliest slot for ordering but
            // consume no capacity.
            debug!(task = %task.id, "zero-hour task pinned to earliest slot");
            return Ok(Placement {
                task_id: task.id.clone(),
                executor: assignee,
                start: earliest,
                end: earliest,
                hours: 0.0,
            });
        }

        let mut needed = hours;
        let mut consumed: Vec<(Slot, f64)> = Vec::new();
        for slot in self.calendar.slots_from(earliest) {
            let available = ledger.remaining(&assignee, slot);
            if available <= EPSILON {
                continue;
            }
            let take = needed.min(available);
            consumed.push((slot, take));
            needed -= take;
            if needed <= EPSILON {
                break;
            }
        }

        if needed > EPSILON {
            if ledger.total_remaining(&assignee) <= EPSILON {
                return Err(RejectionReason::NoCapacity);
            }
            // Some hours fit but the interval would run past the window.
            return Err(RejectionReason::OutOfWindow);
        }

        let start = consumed[0].0;
        let end = consumed[consumed.len() - 1].0;
        for (slot, take) in &consumed {
            ledger
                .consume(&assignee, *slot, *take)
                .map_err(|_| RejectionReason::NoCapacity)?;
        }

        Ok(Placement {
            task_id: task.id.clone(),
            executor: assignee,
            start,
            end,
            hours,
        })
    }
}
