//! Simulation output: per-process metrics, averages and the Gantt trace.

use serde::Serialize;

use crate::{
    Policy,
    core::state::{Priority, Ticks},
};

/// One contiguous stretch of CPU time given to a process. Idle time is never
/// represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub process_id: String,
    pub start_time: Ticks,
    pub end_time: Ticks,
    pub arrival_time: Ticks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl Segment {
    pub fn duration(&self) -> Ticks {
        self.end_time.saturating_sub(self.start_time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobMetrics {
    pub process_id: String,
    pub burst_time: Ticks,
    pub arrival_time: Ticks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    pub completion_time: Ticks,
    /// `turnaround_time - burst_time`
    pub waiting_time: Ticks,
    /// `completion_time - arrival_time`
    pub turnaround_time: Ticks,
    /// Time from arrival to first dispatch.
    pub response_time: Ticks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Simulation {
    pub policy: Policy,
    pub results: Vec<JobMetrics>,
    pub avg_waiting_time: f64,
    pub avg_turnaround_time: f64,
    pub avg_response_time: f64,
    pub gantt: Vec<Segment>,
    /// Completion time of the last process.
    pub makespan: Ticks,
    /// Busy ticks over the span from the first arrival to the makespan.
    pub cpu_utilization: f64,
}

impl Simulation {
    pub(crate) fn new(policy: Policy, results: Vec<JobMetrics>, gantt: Vec<Segment>) -> Self {
        let n = results.len().max(1) as f64;
        // Per-process values fit in Ticks, their sum may not
        let mean = |field: fn(&JobMetrics) -> Ticks| {
            results.iter().map(|m| u128::from(field(m))).sum::<u128>() as f64 / n
        };
        let avg_waiting_time = mean(|m| m.waiting_time);
        let avg_turnaround_time = mean(|m| m.turnaround_time);
        let avg_response_time = mean(|m| m.response_time);

        let makespan = results.iter().map(|m| m.completion_time).max().unwrap_or(0);
        let first_arrival = results.iter().map(|m| m.arrival_time).min().unwrap_or(0);
        let busy: Ticks = gantt.iter().map(Segment::duration).sum();
        let span = makespan.saturating_sub(first_arrival);
        let cpu_utilization = if span == 0 {
            0.0
        } else {
            busy as f64 / span as f64
        };

        Self {
            policy,
            results,
            avg_waiting_time,
            avg_turnaround_time,
            avg_response_time,
            gantt,
            makespan,
            cpu_utilization,
        }
    }

    pub fn metrics(&self, process_id: &str) -> Option<&JobMetrics> {
        self.results.iter().find(|m| m.process_id == process_id)
    }

    /// Process ids in the order they first got the CPU.
    pub fn dispatch_order(&self) -> Vec<&str> {
        let mut order: Vec<&str> = Vec::new();
        for segment in &self.gantt {
            if !order.contains(&segment.process_id.as_str()) {
                order.push(&segment.process_id);
            }
        }
        order
    }
}
