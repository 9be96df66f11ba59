use super::state::{KernelCtx, TaskState};

/// Checks the core's structural invariants after every step. Only active in
/// debug builds.
#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, core: &KernelCtx) {
        self.step += 1;

        if let Some(task_id) = core.current {
            let task = core.task(task_id);
            debug_assert_eq!(
                task.state,
                TaskState::Running,
                "cpu.current task {} must be Running",
                task.process_id
            );
        }

        for task in core.tasks.values() {
            debug_assert!(
                task.remaining <= task.burst_time,
                "Task {} has more remaining time than its burst",
                task.process_id
            );
            if task.state == TaskState::Running {
                debug_assert_eq!(
                    core.current,
                    Some(task.id),
                    "Task {} is Running but not on the CPU",
                    task.process_id
                );
            }
        }

        for (&task_id, &dsq_id) in &core.task_to_dsq {
            let task = core.task(task_id);
            debug_assert_ne!(
                task.state,
                TaskState::Completed,
                "Completed task {} still present in DSQ {dsq_id:?}",
                task.process_id
            );
            debug_assert_ne!(
                task.state,
                TaskState::Running,
                "Running task {} must not appear in any DSQ",
                task.process_id
            );
            if let Some(dsq) = core.dsqs.get(dsq_id) {
                debug_assert!(
                    dsq.contains(task_id),
                    "task_to_dsq claims task {} in DSQ {dsq_id:?}, but queue does not contain it",
                    task.process_id
                );
            } else {
                debug_assert!(false, "task_to_dsq references unknown DSQ {dsq_id:?}");
            }
        }

        if let [.., prev, last] = core.gantt.as_slice() {
            debug_assert!(
                prev.end_time <= last.start_time,
                "Segment {} overlaps segment {}",
                prev.process_id,
                last.process_id
            );
        }
        if let Some(last) = core.gantt.last() {
            debug_assert!(last.start_time < last.end_time, "Empty segment recorded");
            debug_assert!(last.end_time <= core.now, "Segment ends in the future");
        }
    }
}
