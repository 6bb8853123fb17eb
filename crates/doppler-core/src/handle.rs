use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Lock-free handoff of the perceived frequency and volume from the
/// simulation thread to the audio callback.
///
/// Both values are stored as `f32` bit patterns. The simulation is the only
/// writer and the audio callback only reads, so relaxed ordering is enough:
/// each scalar is read whole, and the two are allowed to be one window apart.
#[derive(Debug, Clone)]
pub struct PerceptionHandle {
    inner: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    frequency: AtomicU32,
    volume: AtomicU32,
}

impl PerceptionHandle {
    pub fn new(frequency: f32, volume: f32) -> Self {
        Self {
            inner: Arc::new(Shared {
                frequency: AtomicU32::new(frequency.to_bits()),
                volume: AtomicU32::new(volume.to_bits()),
            }),
        }
    }

    pub fn publish(&self, frequency: f32, volume: f32) {
        self.inner.frequency.store(frequency.to_bits(), Ordering::Relaxed);
        self.inner.volume.store(volume.to_bits(), Ordering::Relaxed);
    }

    pub fn frequency(&self) -> f32 {
        f32::from_bits(self.inner.frequency.load(Ordering::Relaxed))
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.inner.volume.load(Ordering::Relaxed))
    }
}

impl Default for PerceptionHandle {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_values() {
        let writer = PerceptionHandle::default();
        let reader = writer.clone();
        assert_eq!(reader.frequency(), 0.0);
        assert_eq!(reader.volume(), 1.0);

        writer.publish(440.5, 0.25);
        assert_eq!(reader.frequency(), 440.5);
        assert_eq!(reader.volume(), 0.25);
    }

    #[test]
    fn test_reader_on_other_thread_sees_publish() {
        let writer = PerceptionHandle::default();
        let reader = writer.clone();
        writer.publish(20.0, 0.5);
        let seen = std::thread::spawn(move || (reader.frequency(), reader.volume()))
            .join()
            .unwrap();
        assert_eq!(seen, (20.0, 0.5));
    }
}
