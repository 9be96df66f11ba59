use std::num::NonZeroU64;

use super::{ENQ_REENQ, EnqueueFlags, KernelCtx, Scheduler, TaskId, Ticks};
use crate::{
    Policy,
    core::DsqId,
    error::SimError,
    sim::{Job, Sim, Simulation, validate_jobs},
};

/// Round Robin over a FIFO queue.
///
/// Arrivals that happen while a slice runs are woken before the expired task
/// is re-enqueued, so newcomers always queue ahead of the task they found on
/// the CPU. Every slice is its own segment, even when the same task runs
/// twice in a row.
pub struct RoundRobinScheduler {
    queue: DsqId,
    quantum: NonZeroU64,
}

impl RoundRobinScheduler {
    pub fn init(ctx: &mut KernelCtx, quantum: NonZeroU64) -> Self {
        Self {
            queue: ctx.create_dsq_fifo(),
            quantum,
        }
    }
}

impl Scheduler for RoundRobinScheduler {
    fn policy(&self) -> Policy {
        Policy::RoundRobin
    }

    fn enqueue(&mut self, ctx: &mut KernelCtx, task: TaskId, flags: EnqueueFlags) {
        debug_assert_eq!(flags & ENQ_REENQ, 0, "Round Robin only yields on slice expiry");
        ctx.dsq_push_back(self.queue, task);
    }

    fn dispatch(&mut self, ctx: &mut KernelCtx) -> Option<TaskId> {
        ctx.dsq_pop(self.queue)
    }

    fn slice(&self, _ctx: &KernelCtx, _task: TaskId) -> Option<Ticks> {
        Some(self.quantum.get())
    }

    fn coalesce(&self) -> bool {
        false
    }
}

pub fn round_robin(jobs: &[Job], quantum: NonZeroU64) -> Result<Simulation, SimError> {
    validate_jobs(jobs)?;
    Ok(Sim::new(jobs, |ctx| RoundRobinScheduler::init(ctx, quantum)).run())
}
