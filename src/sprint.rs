use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identity and window of the sprint being planned.
///
/// Start and end are inclusive calendar dates, never timestamps. The
/// timezone is carried for display in the report only; all scheduling
/// operates on dates and half-day periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintMeta {
    pub name: String,
    pub year: String,
    pub quarter: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub timezone: String,
}

impl SprintMeta {
    /// Iteration path of the sprint on the upstream board.
    pub fn iteration_path(&self, project: &str) -> String {
        format!("{}\\{}\\{}\\{}", project, self.year, self.quarter, self.name)
    }
}
