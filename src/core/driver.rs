use log::{debug, trace};

use super::{
    event::SchedEvent,
    observer::Observer,
    state::{KernelCtx, TaskId, Ticks},
};
use crate::scheduler::{ENQ_PREEMPT, ENQ_REENQ, ENQ_WAKEUP, EnqueueFlags, Scheduler};

pub struct SchedCore<S: Scheduler> {
    pub ctx: KernelCtx,
    pub scheduler: S,
    observer: Observer,
}

impl<S: Scheduler> SchedCore<S> {
    pub fn new(init: impl FnOnce(&mut KernelCtx) -> S) -> Self {
        let mut ctx = KernelCtx::new();
        let scheduler = init(&mut ctx);
        let observer = Observer::new();
        Self {
            ctx,
            scheduler,
            observer,
        }
    }

    /// Advance the simulation to its next decision instant.
    ///
    /// `next_arrival` is the earliest arrival still in the future; preemptive
    /// policies never run past it and an idle CPU jumps straight to it.
    /// Returns the tasks that completed during this step.
    pub fn step(&mut self, next_arrival: Option<Ticks>, events: &mut Vec<SchedEvent>) -> Vec<TaskId> {
        let mut completed = Vec::new();

        let offered = self.offer_current(events);
        self.try_schedule(offered, events);

        match self.ctx.current {
            Some(task) => {
                if let Some(done) = self.run(task, next_arrival, events) {
                    completed.push(done);
                }
            }
            None => {
                if let Some(until) = next_arrival {
                    let from = self.ctx.now;
                    trace!("cpu idle from t={from} until t={until}");
                    events.push(SchedEvent::CpuIdle { from, until });
                    self.ctx.advance_time(until - from);
                }
            }
        }

        self.observer.observe(&self.ctx);
        completed
    }

    // Hand the running task back to the policy when its slice expired or the
    // policy wants to re-rank it. Returns the task if it was put back.
    fn offer_current(&mut self, events: &mut Vec<SchedEvent>) -> Option<TaskId> {
        let task_id = self.ctx.current?;
        let task = self.ctx.task(task_id);
        let slice_expired = task
            .allocated_timeslice
            .is_some_and(|slice| task.consumed_timeslice >= slice);

        let flags: EnqueueFlags = if slice_expired {
            ENQ_PREEMPT
        } else if self.scheduler.preemptive() {
            ENQ_REENQ
        } else {
            return None;
        };

        self.ctx.clear_cpu();
        self.ctx.mark_runnable(task_id);
        self.scheduler.enqueue(&mut self.ctx, task_id, flags);

        if slice_expired {
            events.push(SchedEvent::Preempt {
                task: task_id,
                at: self.ctx.now,
            });
            return None;
        }
        Some(task_id)
    }

    fn try_schedule(&mut self, offered: Option<TaskId>, events: &mut Vec<SchedEvent>) {
        if !self.ctx.cpu_is_idle() {
            return;
        }

        let Some(task) = self.scheduler.dispatch(&mut self.ctx) else {
            return;
        };
        let now = self.ctx.now;

        // Re-picking the task that was just offered back is a continuation
        if offered == Some(task) {
            let slice = self.scheduler.slice(&self.ctx, task);
            self.ctx.set_running(task, slice);
            return;
        }
        if let Some(preempted) = offered {
            debug!(
                "t={now} {} preempts {}",
                self.ctx.task(task).process_id,
                self.ctx.task(preempted).process_id
            );
            events.push(SchedEvent::Preempt {
                task: preempted,
                at: now,
            });
        }

        let slice = self.scheduler.slice(&self.ctx, task);
        self.ctx.set_running(task, slice);
        debug!("t={now} dispatch {}", self.ctx.task(task).process_id);
        events.push(SchedEvent::Dispatch { task, at: now });
    }

    fn run(
        &mut self,
        task_id: TaskId,
        next_arrival: Option<Ticks>,
        events: &mut Vec<SchedEvent>,
    ) -> Option<TaskId> {
        let task = self.ctx.task(task_id);
        let mut delta = task.remaining;
        if let Some(slice) = task.allocated_timeslice {
            delta = delta.min(slice.saturating_sub(task.consumed_timeslice));
        }
        if self.scheduler.preemptive() {
            if let Some(arrival) = next_arrival {
                delta = delta.min(arrival.saturating_sub(self.ctx.now));
            }
        }

        self.ctx.run_current(delta, self.scheduler.coalesce());

        if self.ctx.task(task_id).remaining > 0 {
            return None;
        }

        self.ctx.clear_cpu();
        self.ctx.mark_completed(task_id);
        let at = self.ctx.now;
        debug!("t={at} complete {}", self.ctx.task(task_id).process_id);
        events.push(SchedEvent::Complete { task: task_id, at });
        Some(task_id)
    }

    pub fn wake_task(&mut self, task: TaskId) {
        self.ctx.mark_runnable(task);
        self.scheduler.enqueue(&mut self.ctx, task, ENQ_WAKEUP);
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}
