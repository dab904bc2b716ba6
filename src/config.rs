use crate::discipline::Discipline;
use crate::executor::{DayOff, Executor};
use crate::sprint::SprintMeta;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeJsonError;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Json(SerdeJsonError),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "config io error: {err}"),
            ConfigError::Json(err) => write!(f, "config parse error: {err}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<SerdeJsonError> for ConfigError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Json(value)
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Connection settings for the upstream work tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevOpsConfig {
    pub organization: String,
    pub project: String,
    pub token: String,
}

/// Top-level setup document: sprint identity and window, team area path,
/// tracker credentials and the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupConfig {
    pub sprint: SprintMeta,
    pub team: String,
    pub devops: DevOpsConfig,
    pub output_dir: String,
}

impl SetupConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let file = File::open(path)?;
        let config: SetupConfig = serde_json::from_reader(file)?;
        if config.sprint.start_date > config.sprint.end_date {
            return Err(ConfigError::Invalid(format!(
                "sprint start date {} is after end date {}",
                config.sprint.start_date, config.sprint.end_date
            )));
        }
        Ok(config)
    }
}

/// Executor roster, one email list per discipline. Unknown discipline keys
/// fail the load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutorsConfig {
    #[serde(default)]
    pub backend: Vec<String>,
    #[serde(default)]
    pub frontend: Vec<String>,
    #[serde(default)]
    pub qa: Vec<String>,
    #[serde(default)]
    pub devops: Vec<String>,
}

impl ExecutorsConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let file = File::open(path)?;
        let config: ExecutorsConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        let mut seen: BTreeSet<String> = BTreeSet::new();
        for executor in self.executors() {
            if !seen.insert(executor.email.clone()) {
                return Err(ConfigError::Invalid(format!(
                    "executor {} appears in more than one discipline pool",
                    executor.email
                )));
            }
        }
        Ok(())
    }

    /// The roster as executors with normalized emails, in pool order.
    pub fn executors(&self) -> Vec<Executor> {
        let pools = [
            (Discipline::Backend, &self.backend),
            (Discipline::Frontend, &self.frontend),
            (Discipline::Qa, &self.qa),
            (Discipline::DevOps, &self.devops),
        ];
        pools
            .into_iter()
            .flat_map(|(discipline, emails)| {
                emails
                    .iter()
                    .map(move |email| Executor::new(email.clone(), discipline))
            })
            .collect()
    }
}

/// Loads the day-off document: executor email -> declared absences.
pub fn load_dayoffs<P: AsRef<Path>>(path: P) -> ConfigResult<BTreeMap<String, Vec<DayOff>>> {
    let file = File::open(path)?;
    let dayoffs: BTreeMap<String, Vec<DayOff>> = serde_json::from_reader(file)?;
    Ok(dayoffs)
}

/// Prerequisite declarations: successor task id -> prerequisite task ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependenciesConfig {
    #[serde(default)]
    pub dependencies: BTreeMap<String, Vec<String>>,
}

impl DependenciesConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let file = File::open(path)?;
        let mut config: DependenciesConfig = serde_json::from_reader(file)?;
        for (successor, prerequisites) in &mut config.dependencies {
            if prerequisites.iter().any(|p| p == successor) {
                return Err(ConfigError::Invalid(format!(
                    "task {successor} cannot depend on itself"
                )));
            }
            // Duplicate declarations are idempotent.
            let mut seen = BTreeSet::new();
            prerequisites.retain(|p| seen.insert(p.clone()));
        }
        Ok(config)
    }
}
