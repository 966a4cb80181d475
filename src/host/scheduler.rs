//! Cooperative deferred continuations.
//!
//! Tasks run on the caller's tick when their delay elapses; there are no
//! threads involved. A task that targets an object destroyed in the meantime
//! is expected to check the scene and back out on its own.

use super::scene::Scene;

type Task = Box<dyn FnOnce(&mut Scene)>;

struct Deferred {
    due: f64,
    seq: u64,
    task: Task,
}

/// Tick-driven scheduler for time-delayed continuations
pub struct Scheduler {
    now: f64,
    next_seq: u64,
    queue: Vec<Deferred>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_seq: 0,
            queue: Vec::new(),
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Schedule `task` to run once `delay` seconds have elapsed
    pub fn schedule_in(&mut self, delay: f64, task: impl FnOnce(&mut Scene) + 'static) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Deferred {
            due: self.now + delay,
            seq,
            task: Box::new(task),
        });
    }

    /// Advance time by `dt` and run every task that has come due, in
    /// (due time, scheduling order)
    pub fn advance(&mut self, dt: f64, scene: &mut Scene) {
        self.now += dt;

        let mut due: Vec<Deferred> = Vec::new();
        let mut remaining = Vec::with_capacity(self.queue.len());
        for deferred in self.queue.drain(..) {
            if deferred.due <= self.now {
                due.push(deferred);
            } else {
                remaining.push(deferred);
            }
        }
        self.queue = remaining;

        due.sort_by(|a, b| {
            a.due
                .partial_cmp(&b.due)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.seq.cmp(&b.seq))
        });

        for deferred in due {
            (deferred.task)(scene);
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_runs_after_delay() {
        let mut scheduler = Scheduler::new();
        let mut scene = Scene::new();
        let fired = Rc::new(RefCell::new(false));

        let flag = fired.clone();
        scheduler.schedule_in(0.25, move |_| *flag.borrow_mut() = true);

        scheduler.advance(0.1, &mut scene);
        assert!(!*fired.borrow());
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(0.2, &mut scene);
        assert!(*fired.borrow());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_runs_in_due_then_scheduling_order() {
        let mut scheduler = Scheduler::new();
        let mut scene = Scene::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for (delay, tag) in [(0.5, 'b'), (0.1, 'a'), (0.5, 'c')] {
            let order = order.clone();
            scheduler.schedule_in(delay, move |_| order.borrow_mut().push(tag));
        }

        scheduler.advance(1.0, &mut scene);
        assert_eq!(*order.borrow(), vec!['a', 'b', 'c']);
    }
}
