use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;

/// Component a deferred task belongs to. Tasks are cancelled per owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOwner {
    Hero,
    ContactForm,
    Notification,
    FeatureSection,
    PricingCards,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TaskId(u64);

impl TaskId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

pub type Task = Box<dyn FnOnce()>;

/// Runs tasks after a delay on the page's event loop.
pub trait Scheduler: Clone + 'static {
    fn schedule(&self, owner: TaskOwner, delay_ms: u32, task: Task);

    /// Drops every task of `owner` that has not started yet. Returns how many
    /// were cancelled.
    fn cancel(&self, owner: TaskOwner) -> usize;

    /// Tasks of `owner` still waiting for their timer.
    fn pending(&self, owner: TaskOwner) -> usize;

    fn after<F>(&self, owner: TaskOwner, delay_ms: u32, task: F)
    where
        F: FnOnce() + 'static,
        Self: Sized,
    {
        self.schedule(owner, delay_ms, Box::new(task))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Running,
    Done,
}

struct Entry {
    owner: TaskOwner,
    phase: Phase,
    // Dropping the handle clears the browser timer.
    _timeout: Timeout,
}

#[derive(Default)]
struct Timers {
    next_id: u64,
    entries: HashMap<TaskId, Entry>,
}

impl Timers {
    // A running entry is never dropped here: its closure is still on the stack.
    fn sweep(&mut self) {
        self.entries.retain(|_, entry| entry.phase != Phase::Done);
    }

    fn set_phase(timers: &Weak<RefCell<Timers>>, id: TaskId, phase: Phase) {
        if let Some(timers) = timers.upgrade() {
            if let Some(entry) = timers.borrow_mut().entries.get_mut(&id) {
                entry.phase = phase;
            }
        }
    }
}

/// `setTimeout`-backed scheduler.
#[derive(Clone, Default)]
pub struct TimerScheduler {
    timers: Rc<RefCell<Timers>>,
}

impl Scheduler for TimerScheduler {
    fn schedule(&self, owner: TaskOwner, delay_ms: u32, task: Task) {
        let mut timers = self.timers.borrow_mut();
        timers.sweep();

        let id = TaskId::new(timers.next_id);
        timers.next_id += 1;

        let weak = Rc::downgrade(&self.timers);
        let timeout = Timeout::new(delay_ms, move || {
            Timers::set_phase(&weak, id, Phase::Running);
            task();
            Timers::set_phase(&weak, id, Phase::Done);
        });

        timers.entries.insert(
            id,
            Entry {
                owner,
                phase: Phase::Pending,
                _timeout: timeout,
            },
        );
    }

    fn cancel(&self, owner: TaskOwner) -> usize {
        let mut timers = self.timers.borrow_mut();
        timers.sweep();
        let before = timers.entries.len();
        timers
            .entries
            .retain(|_, entry| !(entry.owner == owner && entry.phase == Phase::Pending));
        let cancelled = before - timers.entries.len();
        if cancelled > 0 {
            log::debug!("Cancelled {} pending {:?} task(s)", cancelled, owner);
        }
        cancelled
    }

    fn pending(&self, owner: TaskOwner) -> usize {
        self.timers
            .borrow()
            .entries
            .values()
            .filter(|entry| entry.owner == owner && entry.phase == Phase::Pending)
            .count()
    }
}
