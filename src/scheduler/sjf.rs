use super::{ENQ_WAKEUP, EnqueueFlags, KernelCtx, Scheduler, TaskId};
use crate::{
    Policy,
    core::{DsqId, Rank},
    error::SimError,
    sim::{Job, Sim, Simulation, validate_jobs},
};

/// Non-preemptive shortest job first, keyed on total burst time.
pub struct SjfScheduler {
    queue: DsqId,
}

impl SjfScheduler {
    pub fn init(ctx: &mut KernelCtx) -> Self {
        Self {
            queue: ctx.create_dsq_priq(),
        }
    }
}

impl Scheduler for SjfScheduler {
    fn policy(&self) -> Policy {
        Policy::Sjf
    }

    fn enqueue(&mut self, ctx: &mut KernelCtx, task: TaskId, flags: EnqueueFlags) {
        debug_assert_eq!(flags, ENQ_WAKEUP, "SJF tasks only enter the queue on arrival");
        let rank = Rank::new(ctx.task(task).burst_time, ctx.task(task));
        ctx.dsq_push_ranked(self.queue, task, rank);
    }

    fn dispatch(&mut self, ctx: &mut KernelCtx) -> Option<TaskId> {
        ctx.dsq_pop(self.queue)
    }
}

pub fn sjf(jobs: &[Job]) -> Result<Simulation, SimError> {
    validate_jobs(jobs)?;
    Ok(Sim::new(jobs, SjfScheduler::init).run())
}
