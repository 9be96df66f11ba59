//! Scheduling policies.
//!
//! Each policy owns one dispatch queue in the [`KernelCtx`] and decides what
//! enters it and what leaves it; the [`SchedCore`](crate::core::SchedCore)
//! driver owns the clock, the CPU and the trace.

pub mod fcfs;
pub mod priority;
pub mod round_robin;
pub mod sjf;
pub mod srtf;

use crate::{
    Policy,
    core::{KernelCtx, TaskId, Ticks},
};
pub use fcfs::{FcfsScheduler, fcfs};
pub use priority::{PriorityScheduler, priority, priority_preemptive};
pub use round_robin::{RoundRobinScheduler, round_robin};
pub use sjf::{SjfScheduler, sjf};
pub use srtf::{SrtfScheduler, srtf};

pub type EnqueueFlags = u64;

/// Task became eligible for the first time.
pub const ENQ_WAKEUP: EnqueueFlags = 1 << 0;
/// Task exhausted its time slice.
pub const ENQ_PREEMPT: EnqueueFlags = 1 << 32;
/// Running task offered back at a decision point so it can compete again.
pub const ENQ_REENQ: EnqueueFlags = 1 << 40;

pub trait Scheduler {
    fn policy(&self) -> Policy;

    fn enqueue(&mut self, ctx: &mut KernelCtx, task: TaskId, flags: EnqueueFlags);

    /// Pick the next task to run, removing it from the queue.
    fn dispatch(&mut self, ctx: &mut KernelCtx) -> Option<TaskId>;

    /// Slice granted to a freshly dispatched task; `None` runs it until it
    /// completes or is preempted.
    fn slice(&self, _ctx: &KernelCtx, _task: TaskId) -> Option<Ticks> {
        None
    }

    /// Preemptive policies re-evaluate the running task at every arrival.
    fn preemptive(&self) -> bool {
        false
    }

    /// Whether back-to-back runs of one task share a Gantt segment.
    fn coalesce(&self) -> bool {
        true
    }
}
