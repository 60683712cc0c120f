use std::cell::Cell;
use std::rc::Rc;

use super::timer::FixedHz;

/// How often a scheduled task runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cadence {
    /// Fixed logical rate, independent of how often the scheduler is advanced
    FixedHz(f32),
    /// Once per advance, i.e. once per display refresh
    EveryFrame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Scoped ownership of a scheduled task. Dropping the handle cancels the
/// task; the scheduler stops reporting it from the next advance on.
#[derive(Debug)]
pub struct TaskHandle {
    id: TaskId,
    alive: Rc<Cell<bool>>,
}

impl TaskHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.alive.get()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.alive.set(false);
    }
}

/// One task being due `count` times during an advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing {
    pub task: TaskId,
    pub count: u32,
}

#[derive(Debug)]
struct Scheduled {
    id: TaskId,
    timer: Option<FixedHz>,
    alive: Rc<Cell<bool>>,
}

/// Cooperative, single-threaded scheduler of periodic tasks.
///
/// Nothing runs on its own: the owner calls [`Scheduler::advance`] once per
/// display refresh with the elapsed time and dispatches the returned
/// firings. Tasks are reported in spawn order.
#[derive(Debug)]
pub struct Scheduler {
    tasks: Vec<Scheduled>,
    next_id: u64,
    max_catch_up: u32,
}

impl Scheduler {
    pub fn new(max_catch_up: u32) -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 0,
            max_catch_up,
        }
    }

    pub fn spawn(&mut self, cadence: Cadence) -> TaskHandle {
        let id = TaskId(self.next_id);
        self.next_id += 1;

        let timer = match cadence {
            Cadence::FixedHz(hz) => Some(FixedHz::new(hz).with_max_catch_up(self.max_catch_up)),
            Cadence::EveryFrame => None,
        };
        let alive = Rc::new(Cell::new(true));

        self.tasks.push(Scheduled {
            id,
            timer,
            alive: Rc::clone(&alive),
        });

        TaskHandle { id, alive }
    }

    /// Drop cancelled tasks, then advance the live ones by `delta` seconds
    pub fn advance(&mut self, delta: f32) -> Vec<Firing> {
        self.tasks.retain(|task| task.alive.get());

        self.tasks
            .iter_mut()
            .filter_map(|task| {
                let count = match task.timer.as_mut() {
                    Some(timer) => timer.tick(delta),
                    None => 1,
                };
                (count > 0).then_some(Firing { task: task.id, count })
            })
            .collect()
    }

    pub fn active_tasks(&self) -> usize {
        self.tasks.iter().filter(|task| task.alive.get()).count()
    }

    /// Cancel everything, including tasks whose handles are still held
    pub fn cancel_all(&mut self) {
        for task in self.tasks.drain(..) {
            task.alive.set(false);
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(FixedHz::DEFAULT_MAX_CATCH_UP)
    }
}
