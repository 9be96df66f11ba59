use super::{ENQ_PREEMPT, EnqueueFlags, KernelCtx, Scheduler, TaskId};
use crate::{
    Policy,
    core::{DsqId, Rank},
    error::SimError,
    sim::{Job, Sim, Simulation, validate_jobs},
};

/// Shortest remaining time first. The running task is re-ranked by its
/// remaining time at every arrival, so a shorter newcomer takes the CPU at
/// that instant.
pub struct SrtfScheduler {
    queue: DsqId,
}

impl SrtfScheduler {
    pub fn init(ctx: &mut KernelCtx) -> Self {
        Self {
            queue: ctx.create_dsq_priq(),
        }
    }
}

impl Scheduler for SrtfScheduler {
    fn policy(&self) -> Policy {
        Policy::Srtf
    }

    fn enqueue(&mut self, ctx: &mut KernelCtx, task: TaskId, flags: EnqueueFlags) {
        debug_assert_eq!(flags & ENQ_PREEMPT, 0, "SRTF grants no time slices");
        // Woken or re-offered, the rank is the live remaining time
        let rank = Rank::new(ctx.task(task).remaining, ctx.task(task));
        ctx.dsq_push_ranked(self.queue, task, rank);
    }

    fn dispatch(&mut self, ctx: &mut KernelCtx) -> Option<TaskId> {
        ctx.dsq_pop(self.queue)
    }

    fn preemptive(&self) -> bool {
        true
    }
}

pub fn srtf(jobs: &[Job]) -> Result<Simulation, SimError> {
    validate_jobs(jobs)?;
    Ok(Sim::new(jobs, SrtfScheduler::init).run())
}
