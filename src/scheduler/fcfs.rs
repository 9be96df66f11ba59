use super::{ENQ_WAKEUP, EnqueueFlags, KernelCtx, Scheduler, TaskId};
use crate::{
    Policy,
    core::DsqId,
    error::SimError,
    sim::{Job, Sim, Simulation, validate_jobs},
};

/// First-come-first-served. Arrivals are woken in (arrival, id) order, so a
/// plain FIFO queue already holds them in dispatch order.
pub struct FcfsScheduler {
    queue: DsqId,
}

impl FcfsScheduler {
    pub fn init(ctx: &mut KernelCtx) -> Self {
        Self {
            queue: ctx.create_dsq_fifo(),
        }
    }
}

impl Scheduler for FcfsScheduler {
    fn policy(&self) -> Policy {
        Policy::Fcfs
    }

    fn enqueue(&mut self, ctx: &mut KernelCtx, task: TaskId, flags: EnqueueFlags) {
        debug_assert_eq!(flags, ENQ_WAKEUP, "FCFS tasks only enter the queue on arrival");
        ctx.dsq_push_back(self.queue, task);
    }

    fn dispatch(&mut self, ctx: &mut KernelCtx) -> Option<TaskId> {
        ctx.dsq_pop(self.queue)
    }
}

pub fn fcfs(jobs: &[Job]) -> Result<Simulation, SimError> {
    validate_jobs(jobs)?;
    Ok(Sim::new(jobs, FcfsScheduler::init).run())
}
