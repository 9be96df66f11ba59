use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::{
    core::state::{Priority, Ticks},
    error::InvalidInput,
};

/// Input record describing one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub process_id: String,
    pub burst_time: Ticks,
    #[serde(default)]
    pub arrival_time: Ticks,
    /// Lower value = more urgent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl Job {
    pub fn new(process_id: impl Into<String>, burst_time: Ticks) -> Self {
        Self {
            process_id: process_id.into(),
            burst_time,
            arrival_time: 0,
            priority: None,
        }
    }

    pub fn arriving_at(mut self, arrival_time: Ticks) -> Self {
        self.arrival_time = arrival_time;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Fills in a missing priority, keeping an explicit one.
    pub fn with_default_priority(mut self, priority: Priority) -> Self {
        self.priority.get_or_insert(priority);
        self
    }
}

#[derive(Debug, Clone)]
pub struct JobInstance {
    pub job: Job,
    // Position in the caller's input, used to report results in input order
    pub input_index: usize,
    pub start_time: Option<Ticks>,
    pub completion_time: Option<Ticks>,
}

/// Rejects empty workloads, empty or duplicate ids, zero bursts and
/// workloads whose schedule could run past the end of the [`Ticks`] range.
pub fn validate_jobs(jobs: &[Job]) -> Result<(), InvalidInput> {
    if jobs.is_empty() {
        return Err(InvalidInput::EmptyWorkload);
    }

    let mut seen = FxHashSet::default();
    let mut latest_arrival: Ticks = 0;
    let mut total_burst: Ticks = 0;
    for job in jobs {
        if job.process_id.is_empty() {
            return Err(InvalidInput::EmptyProcessId);
        }
        if !seen.insert(job.process_id.as_str()) {
            return Err(InvalidInput::DuplicateProcessId(job.process_id.clone()));
        }
        if job.burst_time == 0 {
            return Err(InvalidInput::NonPositiveBurst(job.process_id.clone()));
        }
        latest_arrival = latest_arrival.max(job.arrival_time);
        total_burst = total_burst
            .checked_add(job.burst_time)
            .ok_or(InvalidInput::TimeOverflow)?;
    }

    // Every completion lands at or before the last arrival plus all work
    latest_arrival
        .checked_add(total_burst)
        .ok_or(InvalidInput::TimeOverflow)?;

    Ok(())
}
