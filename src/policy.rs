//! Policy identifiers and the single-policy simulation entry point.

use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    core::Ticks,
    error::{InvalidInput, SimError},
    scheduler,
    sim::{Job, Simulation},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    Fcfs,
    Sjf,
    Srtf,
    Priority,
    #[serde(alias = "priority_preemptive")]
    PriorityPreemptive,
    #[serde(alias = "round_robin")]
    RoundRobin,
}

impl Policy {
    pub const ALL: [Policy; 6] = [
        Policy::Fcfs,
        Policy::Sjf,
        Policy::Srtf,
        Policy::Priority,
        Policy::PriorityPreemptive,
        Policy::RoundRobin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fcfs => "fcfs",
            Self::Sjf => "sjf",
            Self::Srtf => "srtf",
            Self::Priority => "priority",
            Self::PriorityPreemptive => "priority-preemptive",
            Self::RoundRobin => "round-robin",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Fcfs => "First-Come-First-Served",
            Self::Sjf => "Shortest Job First",
            Self::Srtf => "Shortest Remaining Time First",
            Self::Priority => "Priority (non-preemptive)",
            Self::PriorityPreemptive => "Priority (preemptive)",
            Self::RoundRobin => "Round Robin",
        }
    }

    pub fn requires_priority(self) -> bool {
        matches!(self, Self::Priority | Self::PriorityPreemptive)
    }

    pub fn requires_quantum(self) -> bool {
        self == Self::RoundRobin
    }

    pub fn is_preemptive(self) -> bool {
        matches!(self, Self::Srtf | Self::PriorityPreemptive | Self::RoundRobin)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fcfs" => Ok(Self::Fcfs),
            "sjf" => Ok(Self::Sjf),
            "srtf" => Ok(Self::Srtf),
            "priority" => Ok(Self::Priority),
            "priority-preemptive" | "priority_preemptive" => Ok(Self::PriorityPreemptive),
            "round-robin" | "round_robin" => Ok(Self::RoundRobin),
            other => Err(SimError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Runs one policy over `jobs`. `quantum` is required for Round Robin and
/// ignored by every other policy.
pub fn simulate(
    policy: Policy,
    jobs: &[Job],
    quantum: Option<Ticks>,
) -> Result<Simulation, SimError> {
    match policy {
        Policy::Fcfs => scheduler::fcfs(jobs),
        Policy::Sjf => scheduler::sjf(jobs),
        Policy::Srtf => scheduler::srtf(jobs),
        Policy::Priority => scheduler::priority(jobs),
        Policy::PriorityPreemptive => scheduler::priority_preemptive(jobs),
        Policy::RoundRobin => {
            let quantum = quantum.ok_or(InvalidInput::MissingQuantum)?;
            let quantum = NonZeroU64::new(quantum).ok_or(InvalidInput::NonPositiveQuantum)?;
            scheduler::round_robin(jobs, quantum)
        }
    }
}

/// [`simulate`] keyed by the external policy name.
pub fn simulate_named(
    policy: &str,
    jobs: &[Job],
    quantum: Option<Ticks>,
) -> Result<Simulation, SimError> {
    simulate(policy.parse()?, jobs, quantum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for policy in Policy::ALL {
            assert_eq!(policy.as_str().parse::<Policy>(), Ok(policy));
        }
        assert_eq!("round_robin".parse::<Policy>(), Ok(Policy::RoundRobin));
    }

    #[test]
    fn unknown_name_is_an_error() {
        let err = simulate_named("lottery", &[Job::new("A", 1)], None).unwrap_err();
        assert_eq!(err, SimError::UnknownPolicy("lottery".into()));
    }

    #[test]
    fn round_robin_needs_positive_quantum() {
        let jobs = [Job::new("A", 1)];
        assert_eq!(
            simulate(Policy::RoundRobin, &jobs, None).unwrap_err(),
            SimError::InvalidInput(InvalidInput::MissingQuantum)
        );
        assert_eq!(
            simulate(Policy::RoundRobin, &jobs, Some(0)).unwrap_err(),
            SimError::InvalidInput(InvalidInput::NonPositiveQuantum)
        );
        assert!(simulate(Policy::Fcfs, &jobs, Some(0)).is_ok());
    }

    #[test]
    fn preemption_and_quantum_needs_match_engines() {
        // B arrives mid-run with a shorter burst and a more urgent priority
        let jobs = [
            Job::new("A", 4).with_priority(1),
            Job::new("B", 1).arriving_at(1).with_priority(0),
        ];
        for policy in Policy::ALL {
            let sim = simulate(policy, &jobs, Some(2)).unwrap();
            assert_eq!(sim.gantt.len() > 2, policy.is_preemptive(), "{policy}");
            assert_eq!(
                simulate(policy, &jobs, None).is_err(),
                policy.requires_quantum(),
                "{policy}"
            );
        }
    }

    #[test]
    fn serde_uses_kebab_names() {
        assert_eq!(
            serde_json::to_string(&Policy::PriorityPreemptive).unwrap(),
            "\"priority-preemptive\""
        );
        let policy: Policy = serde_json::from_str("\"round_robin\"").unwrap();
        assert_eq!(policy, Policy::RoundRobin);
    }
}
