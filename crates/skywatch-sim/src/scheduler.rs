//! Cooperative repeating-task scheduler.
//!
//! Tasks are plain descriptors dispatched by the engine; the scheduler only
//! tracks when each one is due. Every scheduled task is identified by the
//! `TaskHandle` returned from `schedule_repeating`, which is also the only
//! way to cancel it.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use hecs::Entity;

/// Shortest interval a task may repeat at (seconds).
const MIN_TASK_INTERVAL_SECS: f64 = 1e-3;

/// Slack for deciding whether a task is due at `now`.
const DUE_TOLERANCE_SECS: f64 = 1e-9;

/// Cancellation token for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// Work the engine performs when a task comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Run a coverage pass over every registered sensor.
    Coverage,
    /// Refresh one sensor's contact table.
    RefreshContacts(Entity),
}

impl Task {
    /// Order among tasks due at the same instant. Contact tables are
    /// refreshed before a coverage pass overwrites them.
    fn priority(&self) -> u8 {
        match self {
            Task::RefreshContacts(_) => 0,
            Task::Coverage => 1,
        }
    }
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    task: Task,
    interval_secs: f64,
    next_due: f64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: BTreeMap<TaskHandle, ScheduledTask>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to run every `interval_secs`, first at `now + interval`.
    pub fn schedule_repeating(&mut self, task: Task, interval_secs: f64, now: f64) -> TaskHandle {
        let interval_secs = interval_secs.max(MIN_TASK_INTERVAL_SECS);
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.tasks.insert(
            handle,
            ScheduledTask {
                task,
                interval_secs,
                next_due: now + interval_secs,
            },
        );
        handle
    }

    /// Cancel a task. Returns false if it was not scheduled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.tasks.remove(&handle).is_some()
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.contains_key(&handle)
    }

    /// Repeat interval of a scheduled task.
    pub fn interval(&self, handle: TaskHandle) -> Option<f64> {
        self.tasks.get(&handle).map(|t| t.interval_secs)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Take the earliest task due at or before `now` and advance its due
    /// time by one interval. Tasks due at the same instant run refreshes
    /// first, then in scheduling order.
    pub fn pop_due(&mut self, now: f64) -> Option<(TaskHandle, Task)> {
        let (&handle, _) = self
            .tasks
            .iter()
            .filter(|(_, t)| t.next_due <= now + DUE_TOLERANCE_SECS)
            .min_by(|(ha, a), (hb, b)| {
                due_order(a.next_due, b.next_due)
                    .then(a.task.priority().cmp(&b.task.priority()))
                    .then(ha.cmp(hb))
            })?;
        let scheduled = self.tasks.get_mut(&handle)?;
        scheduled.next_due += scheduled.interval_secs;
        Some((handle, scheduled.task))
    }
}

fn due_order(a: f64, b: f64) -> Ordering {
    if (a - b).abs() <= DUE_TOLERANCE_SECS {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}
