use rand::Rng;

/// Stable index of an addressable target slot.
pub type SlotId = u32;

/// Fixed pool of target slots. Slots are created once and only ever
/// activated/deactivated; the pool tracks which are currently occupied
/// by a live target.
#[derive(Debug, Clone)]
pub struct SlotPool {
    active: Vec<bool>,
}

impl SlotPool {
    pub fn new(slot_count: usize) -> Self {
        Self {
            active: vec![false; slot_count],
        }
    }

    /// Total number of slots, active or not.
    pub fn capacity(&self) -> usize {
        self.active.len()
    }

    /// Number of slots currently occupied by a live target.
    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    pub fn is_active(&self, slot: SlotId) -> bool {
        self.active.get(slot as usize).copied().unwrap_or(false)
    }

    /// Pick a free slot uniformly at random and mark it active.
    ///
    /// Returns `None` when every slot is occupied. That is a normal
    /// "no capacity right now" outcome, not an error.
    pub fn acquire_free(&mut self, rng: &mut impl Rng) -> Option<SlotId> {
        let free: Vec<SlotId> = self
            .active
            .iter()
            .enumerate()
            .filter(|(_, occupied)| !**occupied)
            .map(|(i, _)| i as SlotId)
            .collect();
        if free.is_empty() {
            return None;
        }
        let pick = free[rng.random_range(0..free.len())];
        self.active[pick as usize] = true;
        Some(pick)
    }

    /// Mark a slot inactive. Idempotent: releasing an already-free or
    /// out-of-range slot does nothing.
    pub fn release(&mut self, slot: SlotId) {
        if let Some(occupied) = self.active.get_mut(slot as usize) {
            *occupied = false;
        }
    }
}
