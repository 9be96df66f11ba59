use keyed_priority_queue::KeyedPriorityQueue;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::sim::{Job, Segment};

pub type Ticks = u64;
pub type Priority = i64;

new_key_type! {
    pub struct TaskId;
    pub struct DsqId;
}

/// Tie-break shared by every policy: earlier arrival first, then the
/// lexicographically smaller process id.
pub fn arrival_order(a_arrival: Ticks, a_id: &str, b_arrival: Ticks, b_id: &str) -> Ordering {
    a_arrival.cmp(&b_arrival).then_with(|| a_id.cmp(b_id))
}

/// Ordering key of a queued task: the policy's primary key, then the shared
/// arrival/id tie-break.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Rank {
    pub primary: i128,
    pub arrival_time: Ticks,
    pub process_id: String,
}

impl Rank {
    pub fn new(primary: impl Into<i128>, task: &Task) -> Self {
        Self {
            primary: primary.into(),
            arrival_time: task.arrival_time,
            process_id: task.process_id.clone(),
        }
    }
}

// KeyedPriorityQueue is a max-heap, so the smallest Rank has to compare greatest
impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        other.primary.cmp(&self.primary).then_with(|| {
            arrival_order(
                other.arrival_time,
                &other.process_id,
                self.arrival_time,
                &self.process_id,
            )
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Runnable,
    Running,
    Completed,
}

/// Engine-local working copy of one process.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub process_id: String,
    pub state: TaskState,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub priority: Option<Priority>,
    pub remaining: Ticks,
    pub allocated_timeslice: Option<Ticks>,
    pub consumed_timeslice: Ticks,
    pub first_start: Option<Ticks>,
    pub completion_time: Option<Ticks>,
}

#[derive(Debug)]
pub enum Dsq {
    Fifo {
        tasks: VecDeque<TaskId>,
    },
    Priq {
        tasks: KeyedPriorityQueue<TaskId, Rank>,
    },
}

impl Dsq {
    pub fn new_fifo() -> Self {
        Self::Fifo {
            tasks: VecDeque::new(),
        }
    }

    pub fn new_priq() -> Self {
        Self::Priq {
            tasks: KeyedPriorityQueue::new(),
        }
    }

    pub fn contains(&self, task_id: TaskId) -> bool {
        match self {
            Self::Fifo { tasks } => tasks.contains(&task_id),
            Self::Priq { tasks } => tasks.iter().any(|t| *t.0 == task_id),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Fifo { tasks } => tasks.len(),
            Self::Priq { tasks } => tasks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// All mutable state of one simulation run: the clock, the single CPU, the
/// task arena, the dispatch queues and the trace being recorded.
#[derive(Debug)]
pub struct KernelCtx {
    pub now: Ticks,
    pub current: Option<TaskId>,
    pub tasks: SlotMap<TaskId, Task>,
    pub dsqs: SlotMap<DsqId, Dsq>,
    pub task_to_dsq: FxHashMap<TaskId, DsqId>,
    pub gantt: Vec<Segment>,
    pub busy_time: Ticks,

    // Task that owns the last recorded segment
    last_segment_task: Option<TaskId>,
}

impl KernelCtx {
    pub fn new() -> Self {
        Self {
            now: 0,
            current: None,
            tasks: SlotMap::with_key(),
            dsqs: SlotMap::with_key(),
            task_to_dsq: FxHashMap::default(),
            gantt: Vec::new(),
            busy_time: 0,
            last_segment_task: None,
        }
    }

    pub fn create_task(&mut self, job: &Job) -> TaskId {
        self.tasks.insert_with_key(|id| Task {
            id,
            process_id: job.process_id.clone(),
            state: TaskState::Runnable,
            arrival_time: job.arrival_time,
            burst_time: job.burst_time,
            priority: job.priority,
            remaining: job.burst_time,
            allocated_timeslice: None,
            consumed_timeslice: 0,
            first_start: None,
            completion_time: None,
        })
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now += delta;
    }

    pub fn create_dsq_fifo(&mut self) -> DsqId {
        self.dsqs.insert(Dsq::new_fifo())
    }

    pub fn create_dsq_priq(&mut self) -> DsqId {
        self.dsqs.insert(Dsq::new_priq())
    }

    fn dsq_push(&mut self, dsq_id: DsqId, task_id: TaskId, rank: Option<Rank>) {
        assert!(
            !self.task_to_dsq.contains_key(&task_id),
            "Task {task_id:?} already present in some DSQ"
        );
        debug_assert_eq!(
            self.task(task_id).state,
            TaskState::Runnable,
            "Task {task_id:?} must be Runnable when enqueued"
        );

        let dsq = self.dsqs.get_mut(dsq_id).expect("Unknown DSQ");
        match dsq {
            Dsq::Fifo { tasks } => tasks.push_back(task_id),
            Dsq::Priq { tasks } => {
                tasks.push(task_id, rank.expect("ranked DSQ push without a rank"));
            }
        };

        self.task_to_dsq.insert(task_id, dsq_id);
    }

    pub fn dsq_push_back(&mut self, dsq_id: DsqId, task_id: TaskId) {
        self.dsq_push(dsq_id, task_id, None);
    }

    pub fn dsq_push_ranked(&mut self, dsq_id: DsqId, task_id: TaskId, rank: Rank) {
        self.dsq_push(dsq_id, task_id, Some(rank));
    }

    pub fn dsq_pop(&mut self, dsq_id: DsqId) -> Option<TaskId> {
        let dsq = self.dsqs.get_mut(dsq_id)?;
        let task = match dsq {
            Dsq::Fifo { tasks } => tasks.pop_front(),
            Dsq::Priq { tasks } => tasks.pop().map(|t| t.0),
        }?;

        let removed = self.task_to_dsq.remove(&task);
        debug_assert!(removed.is_some(), "Task {task:?} missing DSQ membership");

        Some(task)
    }

    pub fn task_in_any_dsq(&self, task_id: TaskId) -> bool {
        self.task_to_dsq.contains_key(&task_id)
    }

    pub fn task(&self, task_id: TaskId) -> &Task {
        &self.tasks[task_id]
    }

    pub fn task_mut(&mut self, task_id: TaskId) -> &mut Task {
        &mut self.tasks[task_id]
    }

    pub fn cpu_is_idle(&self) -> bool {
        self.current.is_none()
    }

    pub fn mark_runnable(&mut self, task_id: TaskId) {
        let task = self.task_mut(task_id);
        debug_assert!(
            task.state != TaskState::Completed,
            "Completed task {} cannot be runnable",
            task.process_id
        );
        task.state = TaskState::Runnable;
    }

    pub fn mark_completed(&mut self, task_id: TaskId) {
        debug_assert!(
            !self.task_to_dsq.contains_key(&task_id),
            "Completing task {task_id:?} that is still enqueued"
        );

        let now = self.now;
        let task = &mut self.tasks[task_id];
        debug_assert!(
            task.state == TaskState::Running,
            "Task {} must have been running before marked complete",
            task.process_id
        );

        task.state = TaskState::Completed;
        task.remaining = 0;
        task.completion_time = Some(now);
    }

    // Return previous state
    pub fn set_running(&mut self, task_id: TaskId, slice: Option<Ticks>) -> TaskState {
        debug_assert!(
            !self.task_to_dsq.contains_key(&task_id),
            "Running task {task_id:?} must not be enqueued"
        );
        debug_assert!(self.current.is_none(), "CPU already running a task");

        self.current = Some(task_id);
        let task = self.task_mut(task_id);
        let prev_state = task.state;
        task.state = TaskState::Running;
        task.allocated_timeslice = slice;
        task.consumed_timeslice = 0;
        prev_state
    }

    pub fn clear_cpu(&mut self) {
        self.current = None;
    }

    /// Runs the current task for `delta` ticks and records the execution
    /// segment. With `coalesce`, a segment directly continuing the previous
    /// one of the same task extends it instead of opening a new one.
    pub fn run_current(&mut self, delta: Ticks, coalesce: bool) {
        let Some(task_id) = self.current else {
            return;
        };
        if delta == 0 {
            return;
        }

        let start = self.now;
        self.advance_time(delta);
        self.busy_time += delta;
        let end = self.now;

        let task = &mut self.tasks[task_id];
        debug_assert!(delta <= task.remaining, "Task {} overran its burst", task.process_id);
        task.remaining -= delta;
        task.consumed_timeslice += delta;
        task.first_start.get_or_insert(start);

        let extends_last = coalesce && self.last_segment_task == Some(task_id);
        match self.gantt.last_mut() {
            Some(segment) if extends_last && segment.end_time == start => {
                segment.end_time = end;
            }
            _ => {
                self.gantt.push(Segment {
                    process_id: task.process_id.clone(),
                    start_time: start,
                    end_time: end,
                    arrival_time: task.arrival_time,
                    priority: task.priority,
                });
            }
        }
        self.last_segment_task = Some(task_id);
    }
}

impl Default for KernelCtx {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str, burst: Ticks, arrival: Ticks) -> Job {
        Job::new(id, burst).arriving_at(arrival)
    }

    #[test]
    fn rank_prefers_smaller_key_then_arrival_then_id() {
        let mut ctx = KernelCtx::new();
        let a = ctx.create_task(&job("P2", 3, 0));
        let b = ctx.create_task(&job("P1", 3, 0));
        let c = ctx.create_task(&job("P0", 3, 1));

        let dsq = ctx.create_dsq_priq();
        for id in [a, b, c] {
            let rank = Rank::new(5u64, ctx.task(id));
            ctx.dsq_push_ranked(dsq, id, rank);
        }

        assert_eq!(ctx.dsq_pop(dsq), Some(b));
        assert_eq!(ctx.dsq_pop(dsq), Some(a));
        assert_eq!(ctx.dsq_pop(dsq), Some(c));
        assert_eq!(ctx.dsq_pop(dsq), None);
    }

    #[test]
    fn contiguous_runs_coalesce_only_when_asked() {
        let mut ctx = KernelCtx::new();
        let a = ctx.create_task(&job("A", 4, 0));

        ctx.set_running(a, None);
        ctx.run_current(1, true);
        ctx.clear_cpu();
        ctx.set_running(a, None);
        ctx.run_current(1, true);
        assert_eq!(ctx.gantt.len(), 1);
        assert_eq!(ctx.gantt[0].end_time, 2);

        ctx.clear_cpu();
        ctx.set_running(a, None);
        ctx.run_current(1, false);
        assert_eq!(ctx.gantt.len(), 2);
        assert_eq!(ctx.task(a).remaining, 1);
        assert_eq!(ctx.busy_time, 3);
    }

    #[test]
    fn fifo_dsq_tracks_membership() {
        let mut ctx = KernelCtx::new();
        let a = ctx.create_task(&job("A", 1, 0));
        let dsq = ctx.create_dsq_fifo();

        ctx.dsq_push_back(dsq, a);
        assert!(ctx.task_in_any_dsq(a));
        assert!(ctx.dsqs[dsq].contains(a));
        assert_eq!(ctx.dsq_pop(dsq), Some(a));
        assert!(!ctx.task_in_any_dsq(a));
        assert!(ctx.dsqs[dsq].is_empty());
    }
}
