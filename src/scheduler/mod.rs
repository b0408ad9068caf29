//! Deadline scheduler.
//!
//! Timed callbacks are plain `(deadline, task)` entries polled once per tick.
//! A task that wants to repeat is scheduled again by whoever handles it, so it
//! always lands on a later tick. Cancelling removes the entry.

use tracing::trace;

/// Deadlines within this many seconds of `now` count as reached
const DEADLINE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TaskId,
    deadline: f64,
    task: T,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: f64,
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: 0.0,
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the scheduler was created
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn schedule(&mut self, delay: f32, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            deadline: self.now + delay.max(0.0) as f64,
            task,
        });
        id
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Remove every pending task matching `pred`; returns how many went
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !pred(&e.task));
        before - self.entries.len()
    }

    pub fn is_scheduled(&self, mut pred: impl FnMut(&T) -> bool) -> bool {
        self.entries.iter().any(|e| pred(&e.task))
    }

    /// Advance the clock and hand back every task whose deadline has passed,
    /// earliest first (ties in scheduling order).
    pub fn advance(&mut self, dt: f32) -> Vec<T> {
        self.now += dt.max(0.0) as f64;
        let now = self.now;

        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.deadline <= now + DEADLINE_EPSILON);
        self.entries = pending;

        due.sort_by(|a, b| a.deadline.total_cmp(&b.deadline).then(a.id.cmp(&b.id)));
        if !due.is_empty() {
            trace!(count = due.len(), now, "Scheduler firing");
        }
        due.into_iter().map(|e| e.task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_deadline_only() {
        let mut s = Scheduler::new();
        s.schedule(0.3, "rebuild");
        assert!(s.advance(0.2).is_empty());
        assert_eq!(s.advance(0.2), vec!["rebuild"]);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn test_float_accumulation_reaches_deadline() {
        let mut s = Scheduler::new();
        s.schedule(0.3, ());
        assert!(s.advance(0.1).is_empty());
        assert!(s.advance(0.1).is_empty());
        assert_eq!(s.advance(0.1).len(), 1);
    }

    #[test]
    fn test_order_by_deadline_then_insertion() {
        let mut s = Scheduler::new();
        s.schedule(0.5, 'c');
        s.schedule(0.1, 'a');
        s.schedule(0.1, 'b');
        assert_eq!(s.advance(1.0), vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_cancel() {
        let mut s = Scheduler::new();
        let id = s.schedule(1.0, 1);
        s.schedule(1.0, 2);
        assert!(s.cancel(id));
        assert!(!s.cancel(id));
        assert_eq!(s.advance(2.0), vec![2]);
    }

    #[test]
    fn test_cancel_where() {
        let mut s = Scheduler::new();
        for i in 0..6 {
            s.schedule(1.0, i);
        }
        assert_eq!(s.cancel_where(|t| t % 2 == 0), 3);
        assert!(s.is_scheduled(|t| *t == 1));
        assert!(!s.is_scheduled(|t| *t == 2));
        assert_eq!(s.advance(1.0), vec![1, 3, 5]);
    }

    #[test]
    fn test_zero_delay_fires_next_advance() {
        let mut s = Scheduler::new();
        s.schedule(0.0, "now");
        assert_eq!(s.advance(0.0), vec!["now"]);
        assert!(s.advance(0.0).is_empty());
    }
}
