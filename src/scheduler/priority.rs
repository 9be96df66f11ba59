use super::{ENQ_WAKEUP, EnqueueFlags, KernelCtx, Scheduler, TaskId};
use crate::{
    Policy,
    core::{DsqId, Priority, Rank},
    error::SimError,
    sim::{Job, Sim, Simulation, validate_jobs},
};

/// Priority used for processes that carry none.
pub const DEFAULT_PRIORITY: Priority = 0;

/// Priority scheduling, lower value first. The preemptive variant re-ranks
/// the running task at every arrival so a more urgent newcomer takes over.
pub struct PriorityScheduler {
    queue: DsqId,
    preemptive: bool,
}

impl PriorityScheduler {
    pub fn init(ctx: &mut KernelCtx, preemptive: bool) -> Self {
        Self {
            queue: ctx.create_dsq_priq(),
            preemptive,
        }
    }
}

impl Scheduler for PriorityScheduler {
    fn policy(&self) -> Policy {
        if self.preemptive {
            Policy::PriorityPreemptive
        } else {
            Policy::Priority
        }
    }

    fn enqueue(&mut self, ctx: &mut KernelCtx, task: TaskId, flags: EnqueueFlags) {
        debug_assert!(
            self.preemptive || flags == ENQ_WAKEUP,
            "non-preemptive priority tasks only enter the queue on arrival"
        );
        let priority = ctx.task(task).priority.unwrap_or(DEFAULT_PRIORITY);
        let rank = Rank::new(priority, ctx.task(task));
        ctx.dsq_push_ranked(self.queue, task, rank);
    }

    fn dispatch(&mut self, ctx: &mut KernelCtx) -> Option<TaskId> {
        ctx.dsq_pop(self.queue)
    }

    fn preemptive(&self) -> bool {
        self.preemptive
    }
}

fn run(jobs: &[Job], preemptive: bool) -> Result<Simulation, SimError> {
    validate_jobs(jobs)?;
    // Results and segments report the priority actually used
    let jobs: Vec<Job> = jobs
        .iter()
        .map(|job| job.clone().with_default_priority(DEFAULT_PRIORITY))
        .collect();
    Ok(Sim::new(&jobs, |ctx| PriorityScheduler::init(ctx, preemptive)).run())
}

pub fn priority(jobs: &[Job]) -> Result<Simulation, SimError> {
    run(jobs, false)
}

pub fn priority_preemptive(jobs: &[Job]) -> Result<Simulation, SimError> {
    run(jobs, true)
}
