use log::{info, trace};
use rustc_hash::FxHashMap;

use super::{
    job::{Job, JobInstance},
    report::{JobMetrics, Simulation},
};
use crate::{
    core::{
        driver::SchedCore,
        event::SchedEvent,
        state::{KernelCtx, TaskId, Ticks},
    },
    scheduler::Scheduler,
};

pub struct Sim<S: Scheduler> {
    pub core: SchedCore<S>,
    pub jobs: Vec<JobInstance>,
    job_cursor: usize,
    // Completion and first dispatch are written back through this map
    tasks_to_jobs: FxHashMap<TaskId, usize>,
}

impl<S: Scheduler> Sim<S> {
    /// Builds a simulation over an owned copy of `jobs`; the caller's records
    /// are never touched.
    ///
    /// No validation happens here. A zero-burst job queues like any other and
    /// completes the instant it is dispatched, without a segment.
    pub fn new(jobs: &[Job], init: impl FnOnce(&mut KernelCtx) -> S) -> Self {
        let mut jobs: Vec<JobInstance> = jobs
            .iter()
            .enumerate()
            .map(|(input_index, job)| JobInstance {
                job: job.clone(),
                input_index,
                start_time: None,
                completion_time: None,
            })
            .collect();
        jobs.sort_by(|a, b| {
            a.job
                .arrival_time
                .cmp(&b.job.arrival_time)
                .then_with(|| a.job.process_id.cmp(&b.job.process_id))
        });

        Self {
            core: SchedCore::new(init),
            jobs,
            job_cursor: 0,
            tasks_to_jobs: FxHashMap::default(),
        }
    }

    pub fn step(&mut self) -> Vec<SchedEvent> {
        let mut events = self.handle_arrivals();
        let next_arrival = self.next_arrival();
        let completed_tasks = self.core.step(next_arrival, &mut events);

        for event in &events {
            if let SchedEvent::Dispatch { task, at } = *event {
                let job = &mut self.jobs[self.tasks_to_jobs[&task]];
                job.start_time.get_or_insert(at);
            }
            trace!("{event:?}");
        }

        let completion_time = self.core.now();
        for task in completed_tasks {
            let job_index = *self
                .tasks_to_jobs
                .get(&task)
                .expect("completed task has no job");

            self.jobs[job_index].completion_time = Some(completion_time);
        }

        events
    }

    fn handle_arrivals(&mut self) -> Vec<SchedEvent> {
        let now = self.core.now();
        let mut events = Vec::new();

        // Contiguous, since jobs are sorted by arrival then id
        while let Some(job) = self.jobs.get(self.job_cursor) {
            if job.job.arrival_time > now {
                break;
            }
            let task = self.core.ctx.create_task(&job.job);
            self.tasks_to_jobs.insert(task, self.job_cursor);
            self.core.wake_task(task);
            events.push(SchedEvent::Arrival {
                task,
                at: job.job.arrival_time,
            });

            self.job_cursor += 1;
        }

        events
    }

    fn next_arrival(&self) -> Option<Ticks> {
        self.jobs.get(self.job_cursor).map(|job| job.job.arrival_time)
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.jobs.iter().all(|job| job.completion_time.is_some())
    }

    pub fn process_id(&self, task: TaskId) -> Option<&str> {
        self.tasks_to_jobs
            .get(&task)
            .map(|&index| self.jobs[index].job.process_id.as_str())
    }

    /// Runs to completion and assembles the result.
    pub fn run(mut self) -> Simulation {
        while !self.all_jobs_completed() {
            self.step();
        }
        self.finish()
    }

    fn finish(mut self) -> Simulation {
        let policy = self.core.scheduler.policy();
        let gantt = std::mem::take(&mut self.core.ctx.gantt);

        let mut jobs = self.jobs;
        jobs.sort_by_key(|job| job.input_index);
        let results: Vec<JobMetrics> = jobs
            .into_iter()
            .map(|instance| {
                let job = instance.job;
                let completion_time = instance.completion_time.unwrap_or(job.arrival_time);
                let turnaround_time = completion_time - job.arrival_time;
                let start_time = instance.start_time.unwrap_or(completion_time);
                JobMetrics {
                    waiting_time: turnaround_time.saturating_sub(job.burst_time),
                    turnaround_time,
                    response_time: start_time - job.arrival_time,
                    completion_time,
                    process_id: job.process_id,
                    burst_time: job.burst_time,
                    arrival_time: job.arrival_time,
                    priority: job.priority,
                }
            })
            .collect();

        let simulation = Simulation::new(policy, results, gantt);
        info!(
            "{policy}: {} processes, avg waiting {:.2}, avg turnaround {:.2}, makespan {}",
            simulation.results.len(),
            simulation.avg_waiting_time,
            simulation.avg_turnaround_time,
            simulation.makespan
        );
        simulation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::FcfsScheduler;

    #[test]
    fn zero_burst_completes_on_dispatch_without_a_segment() {
        let jobs = [Job::new("Z", 0), Job::new("A", 2), Job::new("late", 0).arriving_at(5)];
        let sim = Sim::new(&jobs, FcfsScheduler::init).run();

        assert_eq!(sim.gantt.len(), 1);
        assert_eq!(sim.gantt[0].process_id, "A");
        assert_eq!((sim.gantt[0].start_time, sim.gantt[0].end_time), (0, 2));

        // Z waits behind A (same arrival, smaller id) and finishes when picked
        let z = sim.metrics("Z").unwrap();
        assert_eq!(z.completion_time, 2);
        assert_eq!(z.waiting_time, 2);
        assert_eq!(z.response_time, 2);

        // Arriving on an idle CPU, it finishes at its arrival
        let late = sim.metrics("late").unwrap();
        assert_eq!(late.completion_time, 5);
        assert_eq!(late.turnaround_time, 0);
    }
}
