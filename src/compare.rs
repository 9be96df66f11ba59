//! Runs several policies over the same (or per-policy) workloads.
//!
//! Every run gets its own copy of its input and nothing is shared between
//! runs, so a failing policy only produces an entry in
//! [`Comparison::failures`] and never affects the others.

use std::collections::BTreeMap;

use log::warn;
use serde::Serialize;

use crate::{
    Policy,
    core::Ticks,
    error::SimError,
    policy::simulate,
    sim::{Job, Simulation, validate_jobs},
};

/// One requested policy run.
#[derive(Debug, Clone)]
pub struct PolicyRun {
    pub policy: Policy,
    pub jobs: Vec<Job>,
    pub quantum: Option<Ticks>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Comparison {
    pub results: BTreeMap<Policy, Simulation>,
    #[serde(skip)]
    pub failures: BTreeMap<Policy, SimError>,
}

impl Comparison {
    pub fn get(&self, policy: Policy) -> Option<&Simulation> {
        self.results.get(&policy)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Policy with the lowest average waiting time.
    pub fn best_waiting(&self) -> Option<(Policy, f64)> {
        self.best_by(|sim| sim.avg_waiting_time)
    }

    /// Policy with the lowest average turnaround time.
    pub fn best_turnaround(&self) -> Option<(Policy, f64)> {
        self.best_by(|sim| sim.avg_turnaround_time)
    }

    // Ties keep the policy that comes first in declaration order
    fn best_by(&self, metric: impl Fn(&Simulation) -> f64) -> Option<(Policy, f64)> {
        self.results
            .iter()
            .map(|(&policy, sim)| (policy, metric(sim)))
            .fold(None, |best, (policy, value)| match best {
                Some((_, best_value)) if best_value <= value => best,
                _ => Some((policy, value)),
            })
    }
}

/// Runs each request independently. A policy requested twice keeps its
/// last run.
pub fn compare(runs: impl IntoIterator<Item = PolicyRun>) -> Comparison {
    let mut comparison = Comparison::default();

    for run in runs {
        match simulate(run.policy, &run.jobs, run.quantum) {
            Ok(sim) => {
                comparison.failures.remove(&run.policy);
                comparison.results.insert(run.policy, sim);
            }
            Err(err) => {
                warn!("{}: {err}", run.policy);
                comparison.results.remove(&run.policy);
                comparison.failures.insert(run.policy, err);
            }
        }
    }

    comparison
}

/// Runs all six policies over one workload.
pub fn compare_all(jobs: &[Job], quantum: Ticks) -> Result<Comparison, SimError> {
    validate_jobs(jobs)?;

    let comparison = compare(Policy::ALL.into_iter().map(|policy| PolicyRun {
        policy,
        jobs: jobs.to_vec(),
        quantum: Some(quantum),
    }));

    // The workload is valid, so the only possible failure is the quantum
    match comparison.failures.values().next() {
        Some(err) => Err(err.clone()),
        None => Ok(comparison),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidInput;

    fn workload() -> Vec<Job> {
        vec![
            Job::new("P1", 6).with_priority(2),
            Job::new("P2", 2).arriving_at(1).with_priority(1),
            Job::new("P3", 4).arriving_at(2).with_priority(3),
        ]
    }

    #[test]
    fn runs_every_policy() {
        let comparison = compare_all(&workload(), 2).unwrap();
        assert_eq!(comparison.len(), 6);
        for policy in Policy::ALL {
            let sim = comparison.get(policy).unwrap();
            assert_eq!(sim.policy, policy);
            assert_eq!(sim.results.len(), 3);
        }
    }

    #[test]
    fn rejects_empty_workload_and_zero_quantum() {
        assert_eq!(
            compare_all(&[], 2).unwrap_err(),
            SimError::InvalidInput(InvalidInput::EmptyWorkload)
        );
        assert_eq!(
            compare_all(&workload(), 0).unwrap_err(),
            SimError::InvalidInput(InvalidInput::NonPositiveQuantum)
        );
    }

    #[test]
    fn failing_policy_does_not_block_others() {
        let comparison = compare([
            PolicyRun {
                policy: Policy::Fcfs,
                jobs: workload(),
                quantum: None,
            },
            PolicyRun {
                policy: Policy::RoundRobin,
                jobs: workload(),
                quantum: None,
            },
            PolicyRun {
                policy: Policy::Sjf,
                jobs: Vec::new(),
                quantum: None,
            },
        ]);

        assert!(comparison.get(Policy::Fcfs).is_some());
        assert!(comparison.get(Policy::RoundRobin).is_none());
        assert_eq!(
            comparison.failures[&Policy::RoundRobin],
            SimError::InvalidInput(InvalidInput::MissingQuantum)
        );
        assert_eq!(
            comparison.failures[&Policy::Sjf],
            SimError::InvalidInput(InvalidInput::EmptyWorkload)
        );
    }

    #[test]
    fn best_policy_has_lowest_average() {
        let comparison = compare_all(&workload(), 2).unwrap();
        let (policy, waiting) = comparison.best_waiting().unwrap();
        for sim in comparison.results.values() {
            assert!(waiting <= sim.avg_waiting_time);
        }
        assert_eq!(comparison.get(policy).unwrap().avg_waiting_time, waiting);
        assert!(comparison.best_turnaround().is_some());
    }
}
