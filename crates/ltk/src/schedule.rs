//! Keyed, debounced callbacks.
//!
//! [`schedule`] queues a callback under a key. Scheduling again under the
//! same key replaces the pending callback, so a burst of requests collapses
//! into the last one. Due callbacks run on [`run_due`]; in the browser (with
//! the `web` feature) a `setTimeout` calls it for you.
//!
//! The queue is per thread.
use std::{cell::RefCell, time::Duration};

use web_time::Instant;

struct Task {
    key: String,
    due: Instant,
    callback: Box<dyn FnOnce()>,
}

thread_local! {
    static TASKS: RefCell<Vec<Task>> = const { RefCell::new(Vec::new()) };
}

/// Run `callback` once `delay` has passed, replacing any callback pending
/// under `key`.
pub fn schedule(key: impl Into<String>, delay: Duration, callback: impl FnOnce() + 'static) {
    let key = key.into();
    let due = Instant::now() + delay;
    let replaced = TASKS.with(|tasks| {
        let mut tasks = tasks.borrow_mut();
        let before = tasks.len();
        tasks.retain(|task| task.key != key);
        let replaced = tasks.len() != before;
        tasks.push(Task {
            key: key.clone(),
            due,
            callback: Box::new(callback),
        });
        replaced
    });
    log::trace!("scheduled {key} in {delay:?} (replaced: {replaced})");

    #[cfg(all(feature = "web", target_arch = "wasm32"))]
    crate::web::arm_timer(delay);
}

/// Drop the callback pending under `key`. Returns whether there was one.
pub fn cancel(key: &str) -> bool {
    TASKS.with(|tasks| {
        let mut tasks = tasks.borrow_mut();
        let before = tasks.len();
        tasks.retain(|task| task.key != key);
        tasks.len() != before
    })
}

pub fn is_scheduled(key: &str) -> bool {
    TASKS.with(|tasks| tasks.borrow().iter().any(|task| task.key == key))
}

/// Number of pending callbacks.
pub fn pending() -> usize {
    TASKS.with(|tasks| tasks.borrow().len())
}

/// Run every callback whose delay has passed, in the order they were
/// scheduled. Returns how many ran.
pub fn run_due() -> usize {
    let now = Instant::now();
    run(|task| task.due <= now)
}

/// Run every pending callback regardless of its delay.
///
/// Callbacks scheduled while flushing wait for the next round.
pub fn flush() -> usize {
    run(|_| true)
}

fn run(ready: impl Fn(&Task) -> bool) -> usize {
    let ready = TASKS.with(|tasks| {
        let mut tasks = tasks.borrow_mut();
        let (ready, waiting): (Vec<Task>, Vec<Task>) =
            std::mem::take(&mut *tasks).into_iter().partition(|task| ready(task));
        *tasks = waiting;
        ready
    });
    let count = ready.len();
    for task in ready {
        log::trace!("running {}", task.key);
        (task.callback)();
    }
    count
}

#[cfg(test)]
mod test {
    use std::{cell::Cell, rc::Rc};

    use super::*;

    #[test]
    fn schedule_sanity() {
        let runs = Rc::new(RefCell::new(vec![]));
        for i in 0..3 {
            let runs = runs.clone();
            schedule("save", Duration::ZERO, move || runs.borrow_mut().push(i));
        }
        assert!(is_scheduled("save"));
        assert_eq!(pending(), 1);
        assert_eq!(run_due(), 1);
        assert_eq!(*runs.borrow(), vec![2]);
        assert!(!is_scheduled("save"));
    }

    #[test]
    fn delayed_callbacks_wait() {
        let ran = Rc::new(Cell::new(false));
        schedule("later", Duration::from_secs(3600), {
            let ran = ran.clone();
            move || ran.set(true)
        });
        assert_eq!(run_due(), 0);
        assert!(!ran.get());
        assert!(cancel("later"));
        assert!(!cancel("later"));
        assert_eq!(flush(), 0);
    }

    #[test]
    fn callbacks_may_reschedule() {
        let count = Rc::new(Cell::new(0));
        fn tick(count: Rc<Cell<u32>>) {
            count.set(count.get() + 1);
            if count.get() < 3 {
                schedule("tick", Duration::ZERO, move || tick(count));
            }
        }
        schedule("tick", Duration::ZERO, {
            let count = count.clone();
            move || tick(count)
        });
        while flush() > 0 {}
        assert_eq!(count.get(), 3);
    }
}
