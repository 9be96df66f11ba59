//! Run configuration and workload files.
//!
//! A workload file is JSON:
//!
//! ```json
//! {
//!   "time_quantum": 2,
//!   "processes": [
//!     { "process_id": "P1", "burst_time": 5 },
//!     { "process_id": "P2", "burst_time": 3, "arrival_time": 1, "priority": 2 }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::{
    Policy,
    compare::PolicyRun,
    core::{Priority, Ticks},
    error::ConfigError,
    sim::Job,
};

/// Default Round Robin quantum.
pub const DEFAULT_QUANTUM: Ticks = 2;

/// Priority given to processes without one when a priority policy runs.
pub const DEFAULT_JOB_PRIORITY: Priority = 1;

/// Environment variable overriding the Round Robin quantum.
pub const QUANTUM_ENV: &str = "SCHED_SIM_QUANTUM";

/// Environment variable selecting the log level.
pub const LOG_ENV: &str = "RUST_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub time_quantum: Ticks,
    pub policies: Vec<Policy>,
    /// Filled into processes without a priority before priority policies run.
    pub default_priority: Priority,
    pub log_level: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            time_quantum: DEFAULT_QUANTUM,
            policies: Policy::ALL.to_vec(),
            default_priority: DEFAULT_JOB_PRIORITY,
            log_level: "info".to_string(),
        }
    }
}

impl SimConfig {
    /// Applies `SCHED_SIM_QUANTUM` and `RUST_LOG` when set. Unparsable values
    /// are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(quantum) = std::env::var(QUANTUM_ENV)
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            self.time_quantum = quantum;
        }
        if let Ok(level) = std::env::var(LOG_ENV) {
            self.log_level = level;
        }
        self
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    /// One run per configured policy over `workload`, with missing priorities
    /// filled in and the quantum passed to the policies that need them.
    pub fn runs(&self, workload: &Workload) -> Vec<PolicyRun> {
        let quantum = workload.time_quantum.unwrap_or(self.time_quantum);
        self.policies
            .iter()
            .map(|&policy| {
                let jobs = if policy.requires_priority() {
                    workload
                        .processes
                        .iter()
                        .map(|job| job.clone().with_default_priority(self.default_priority))
                        .collect()
                } else {
                    workload.processes.clone()
                };
                PolicyRun {
                    policy,
                    jobs,
                    quantum: policy.requires_quantum().then_some(quantum),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_quantum: Option<Ticks>,
    pub processes: Vec<Job>,
}

impl Workload {
    pub fn new(processes: Vec<Job>) -> Self {
        Self {
            time_quantum: None,
            processes,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_workload_with_defaults() {
        let workload = Workload::from_json(
            r#"{"processes":[{"process_id":"P1","burst_time":5},
                {"process_id":"P2","burst_time":3,"arrival_time":1,"priority":2}]}"#,
        )
        .unwrap();
        assert_eq!(workload.time_quantum, None);
        assert_eq!(workload.processes[0], Job::new("P1", 5));
        assert_eq!(workload.processes[1], Job::new("P2", 3).arriving_at(1).with_priority(2));
    }

    #[test]
    fn malformed_workload_is_a_parse_error() {
        let err = Workload::from_json(r#"{"processes":[{"burst_time":-1}]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn config_fills_defaults_and_priorities() {
        let config: SimConfig =
            serde_json::from_str(r#"{"policies":["fcfs","priority","round_robin"]}"#).unwrap();
        assert_eq!(config.time_quantum, DEFAULT_QUANTUM);
        assert_eq!(config.level_filter(), LevelFilter::Info);

        let mut workload = Workload::new(vec![Job::new("A", 1)]);
        workload.time_quantum = Some(5);
        let runs = config.runs(&workload);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].jobs[0].priority, None);
        assert_eq!(runs[1].jobs[0].priority, Some(DEFAULT_JOB_PRIORITY));
        let quanta: Vec<_> = runs.iter().map(|run| run.quantum).collect();
        assert_eq!(quanta, [None, None, Some(5)]);
    }
}
