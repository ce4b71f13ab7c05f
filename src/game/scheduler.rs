//! Deferred tasks evaluated on tick boundaries

/// Handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug)]
struct Entry<A> {
    id: TaskId,
    deadline: f64,
    action: A,
}

/// A list of (deadline, action) pairs on the simulation clock.
///
/// Nothing runs on its own: the owner calls [`Scheduler::drain_due`] once per
/// tick and performs the returned actions.
#[derive(Debug)]
pub struct Scheduler<A> {
    entries: Vec<Entry<A>>,
    next_id: u64,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_at(&mut self, deadline: f64, action: A) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            deadline,
            action,
        });
        id
    }

    pub fn schedule_after(&mut self, now: f64, delay: f32, action: A) -> TaskId {
        self.schedule_at(now + delay.max(0.0) as f64, action)
    }

    /// Remove a pending task. Returns false if it already fired or never existed.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Take every task whose deadline is at or before `now`, earliest first.
    /// Ties keep scheduling order.
    pub fn drain_due(&mut self, now: f64) -> Vec<A> {
        let mut due = Vec::new();
        let mut pending = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if entry.deadline <= now {
                due.push(entry);
            } else {
                pending.push(entry);
            }
        }
        self.entries = pending;

        due.sort_by(|a, b| {
            a.deadline
                .total_cmp(&b.deadline)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });
        due.into_iter().map(|e| e.action).collect()
    }

    pub fn next_deadline(&self) -> Option<f64> {
        self.entries
            .iter()
            .map(|e| e.deadline)
            .min_by(|a, b| a.total_cmp(b))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
