use crate::discipline::Discipline;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A sprint team member. The email is the identity; emails are normalized
/// to lowercase so upstream and config spellings compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Executor {
    pub email: String,
    pub discipline: Discipline,
}

impl Executor {
    pub fn new(email: impl Into<String>, discipline: Discipline) -> Self {
        Self {
            email: email.into().to_lowercase(),
            discipline,
        }
    }
}

/// Extent of a declared absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOffPeriod {
    Full,
    Morning,
    Afternoon,
}

impl DayOffPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayOffPeriod::Full => "full day",
            DayOffPeriod::Morning => "morning",
            DayOffPeriod::Afternoon => "afternoon",
        }
    }
}

impl fmt::Display for DayOffPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared absence of one executor on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayOff {
    pub date: NaiveDate,
    pub period: DayOffPeriod,
}

impl DayOff {
    pub fn new(date: NaiveDate, period: DayOffPeriod) -> Self {
        Self { date, period }
    }
}
