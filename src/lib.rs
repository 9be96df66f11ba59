//! Discrete-event simulator for classical single-CPU scheduling policies.
//!
//! Six policies share one event-stepped driver: FCFS, SJF, SRTF, priority
//! (non-preemptive and preemptive) and Round Robin. Each run produces
//! per-process metrics, averages and a Gantt trace; [`compare_all`] runs every
//! policy over one workload and [`ready_queue_at`] replays a trace to show
//! the ready queue at any instant.
//!
//! ```
//! use cpu_sched_sim::{Job, Policy, simulate};
//!
//! let jobs = [Job::new("P1", 5), Job::new("P2", 3).arriving_at(1)];
//! let sim = simulate(Policy::Fcfs, &jobs, None).unwrap();
//! assert_eq!(sim.metrics("P2").unwrap().completion_time, 8);
//! ```

pub mod compare;
pub mod config;
pub mod core;
pub mod error;
pub mod policy;
pub mod ready_queue;
pub mod scheduler;
pub mod sim;

pub use compare::{Comparison, PolicyRun, compare, compare_all};
pub use crate::core::{Priority, SchedEvent, Ticks};
pub use error::{InvalidInput, SimError};
pub use policy::{Policy, simulate, simulate_named};
pub use ready_queue::ready_queue_at;
pub use scheduler::Scheduler;
pub use sim::{Job, JobMetrics, Segment, Sim, Simulation};
