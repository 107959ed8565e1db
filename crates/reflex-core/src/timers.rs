/// Handle to one scheduled timeout. Handles are unique for the lifetime of
/// the queue, so a handle from a cancelled or already-fired entry can never
/// alias a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy)]
struct Entry<K> {
    deadline: f64,
    handle: TimerHandle,
    key: K,
}

/// Cancellable delayed callbacks on a single cooperative timeline.
///
/// The queue does not run anything by itself; the owner drives it with
/// `advance(dt)` from its tick source and acts on the returned keys. This
/// keeps per-target timeouts on the same logical clock as the round timer,
/// so "selected vs. timed out" races reduce to a map lookup.
#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    now: f64,
    next_handle: u64,
    pending: Vec<Entry<K>>,
}

impl<K: Copy> TimerQueue<K> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_handle: 0,
            pending: Vec::new(),
        }
    }

    /// Schedule `key` to fire after `delay` seconds. A zero or negative
    /// delay fires on the very next `advance`, never synchronously.
    pub fn schedule(&mut self, delay: f32, key: K) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.push(Entry {
            deadline: self.now + f64::from(delay.max(0.0)),
            handle,
            key,
        });
        handle
    }

    /// Revoke a scheduled entry. Guaranteed no-op if it already fired or
    /// was already cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|e| e.handle != handle);
    }

    /// Drop every outstanding entry without firing it.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Advance the timeline by `dt` seconds and return the keys of every
    /// entry whose deadline passed, ordered by (deadline, schedule order).
    pub fn advance(&mut self, dt: f32) -> Vec<K> {
        self.now += f64::from(dt.max(0.0));
        let now = self.now;
        let mut fired: Vec<Entry<K>> = Vec::new();
        self.pending.retain(|entry| {
            if entry.deadline <= now {
                fired.push(*entry);
                false
            } else {
                true
            }
        });
        fired.sort_by(|a, b| {
            a.deadline
                .total_cmp(&b.deadline)
                .then(a.handle.0.cmp(&b.handle.0))
        });
        fired.into_iter().map(|e| e.key).collect()
    }
}

impl<K: Copy> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}
