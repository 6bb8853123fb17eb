use std::cmp::Reverse;
use std::collections::BinaryHeap;

use glam::Vec2;
use thiserror::Error;

/// Where a wavefront stands relative to the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Classification {
    /// Not yet reached the observer (or not evaluated yet).
    #[default]
    Approaching,
    /// Reached the observer and was counted this window.
    JustCrossed,
    /// Passed the observer by at least the crossing margin.
    Confirmed,
}

/// A single circular pulse expanding from the point it was emitted at.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Wavefront {
    /// Source position at the instant of emission.
    pub origin: Vec2,
    /// Distance travelled since emission.
    pub radius: f32,
    pub active: bool,
    pub classification: Classification,
}

/// Returned by [`WavePool::try_emit`] when every slot is in use.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("wave pool exhausted: all {capacity} slots are active")]
pub struct PoolExhausted {
    pub capacity: usize,
}

/// Fixed-capacity arena of wavefronts.
///
/// Slots are handed out lowest-index first. Free slot indices live in a
/// min-heap that is allocated once at construction, so emission and
/// retirement never touch the allocator.
pub struct WavePool {
    slots: Vec<Wavefront>,
    /// Whether each slot was counted by the perception sampler during the
    /// current window.
    heard: Vec<bool>,
    free: BinaryHeap<Reverse<usize>>,
}

impl WavePool {
    pub fn new(capacity: usize) -> Self {
        let mut free = BinaryHeap::with_capacity(capacity);
        free.extend((0..capacity).map(Reverse));
        Self {
            slots: vec![Wavefront::default(); capacity],
            heard: vec![false; capacity],
            free,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Expand every active wavefront by `speed * dt` and retire the ones whose
    /// radius exceeds `retirement_distance`. Returns the number retired.
    pub fn advance_all(&mut self, dt: f32, speed: f32, retirement_distance: f32) -> usize {
        let step = speed * dt;
        let mut retired = 0;
        for (index, wave) in self.slots.iter_mut().enumerate() {
            if !wave.active {
                continue;
            }
            wave.radius += step;
            if wave.radius > retirement_distance {
                wave.active = false;
                self.free.push(Reverse(index));
                retired += 1;
            }
        }
        retired
    }

    /// Start a new wavefront at `origin` in the lowest free slot.
    ///
    /// When the pool is full the request is dropped; live wavefronts are
    /// never evicted.
    pub fn try_emit(&mut self, origin: Vec2) -> Result<usize, PoolExhausted> {
        let Reverse(index) = self.free.pop().ok_or(PoolExhausted {
            capacity: self.capacity(),
        })?;
        self.slots[index] = Wavefront {
            origin,
            radius: 0.0,
            active: true,
            classification: Classification::Approaching,
        };
        self.heard[index] = false;
        Ok(index)
    }

    pub fn get(&self, index: usize) -> Option<&Wavefront> {
        self.slots.get(index)
    }

    pub fn is_heard(&self, index: usize) -> bool {
        self.heard.get(index).copied().unwrap_or(false)
    }

    /// Active wavefronts with their slot index, in slot order.
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &Wavefront)> + '_ {
        self.slots.iter().enumerate().filter(|(_, w)| w.active)
    }

    /// Active wavefronts paired with their heard flag.
    pub(crate) fn iter_active_mut(&mut self) -> impl Iterator<Item = (&mut Wavefront, &mut bool)> + '_ {
        self.slots
            .iter_mut()
            .zip(self.heard.iter_mut())
            .filter(|(w, _)| w.active)
    }

    /// Make every slot eligible to be counted again.
    pub fn clear_heard(&mut self) {
        self.heard.fill(false);
    }
}
