use crate::core::{TaskId, Ticks};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedEvent {
    Arrival {
        task: TaskId,
        at: Ticks,
    },
    Dispatch {
        task: TaskId,
        at: Ticks,
    },
    // Task left the CPU without finishing
    Preempt {
        task: TaskId,
        at: Ticks,
    },
    Complete {
        task: TaskId,
        at: Ticks,
    },
    // Nothing runnable until the next arrival
    CpuIdle {
        from: Ticks,
        until: Ticks,
    },
}

impl SchedEvent {
    pub fn task(&self) -> Option<TaskId> {
        match *self {
            Self::Arrival { task, .. }
            | Self::Dispatch { task, .. }
            | Self::Preempt { task, .. }
            | Self::Complete { task, .. } => Some(task),
            Self::CpuIdle { .. } => None,
        }
    }
}
