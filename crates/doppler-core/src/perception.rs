//! Converts wavefronts reaching the observer into a perceived frequency and
//! loudness.
//!
//! Every tick [`PerceptionSampler::classify`] compares each active wavefront's
//! floored radius with the floored distance from its origin to the observer.
//! The comparison is a tolerance band rather than an exact crossing test: a
//! wavefront advancing several units per tick would otherwise jump over the
//! crossing radius without ever matching it. Counts are summed over a fixed
//! window and flushed by [`PerceptionSampler::advance_window`].

use glam::Vec2;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::{frequency_from_count, volume_from_radius};
use crate::wave::{Classification, WavePool};

/// When per-slot heard flags are cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeardResetPolicy {
    /// Clear every flag at each window flush. A wavefront still inside the
    /// crossing band when the window closes is counted again in the next one.
    #[default]
    EveryWindow,
    /// Flags are only cleared when the slot is re-emitted, so each wavefront
    /// is counted at most once in its lifetime.
    OnEmission,
}

impl HeardResetPolicy {
    fn on_flush(self, pool: &mut WavePool) {
        match self {
            HeardResetPolicy::EveryWindow => pool.clear_heard(),
            HeardResetPolicy::OnEmission => {}
        }
    }
}

/// Aggregate produced when a perception window closes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSample {
    /// Wavefronts newly heard during the window.
    pub count: u32,
    pub frequency: f32,
    pub volume: f32,
    /// Smallest floored radius among the wavefronts heard in the window.
    pub nearest_radius: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct PerceptionSampler {
    interval: f32,
    margin: f32,
    track_volume: bool,
    policy: HeardResetPolicy,
    window_timer: f32,
    window_count: u32,
    nearest_radius: Option<f32>,
    perceived_frequency: f32,
    perceived_volume: f32,
}

impl PerceptionSampler {
    pub fn new(interval: f32, margin: f32, track_volume: bool, policy: HeardResetPolicy) -> Self {
        Self {
            interval,
            margin,
            track_volume,
            policy,
            window_timer: 0.0,
            window_count: 0,
            nearest_radius: None,
            perceived_frequency: 0.0,
            perceived_volume: 1.0,
        }
    }

    pub fn perceived_frequency(&self) -> f32 {
        self.perceived_frequency
    }

    pub fn perceived_volume(&self) -> f32 {
        self.perceived_volume
    }

    /// Wavefronts heard so far in the open window.
    pub fn window_count(&self) -> u32 {
        self.window_count
    }

    pub fn window_timer(&self) -> f32 {
        self.window_timer
    }

    /// Classify every active wavefront against the observer position and
    /// return how many were heard for the first time this window.
    pub fn classify(&mut self, pool: &mut WavePool, observer: Vec2) -> u32 {
        let mut heard_now = 0;
        for (wave, heard) in pool.iter_active_mut() {
            let distance = wave.origin.distance(observer).floor();
            let radius = wave.radius.floor();

            if radius >= distance + self.margin {
                wave.classification = Classification::Confirmed;
                continue;
            }
            if *heard {
                continue;
            }
            if radius >= distance {
                heard_now += 1;
                wave.classification = Classification::JustCrossed;
                *heard = true;
                self.nearest_radius = Some(match self.nearest_radius {
                    Some(nearest) => nearest.min(radius),
                    None => radius,
                });
            }
        }
        self.window_count += heard_now;
        heard_now
    }

    /// Advance the window clock by `dt`, flushing when the interval has
    /// elapsed. The timer is decremented rather than zeroed so window
    /// boundaries do not drift with frame time.
    pub fn advance_window(&mut self, dt: f32, pool: &mut WavePool) -> Option<WindowSample> {
        self.window_timer += dt;
        if self.window_timer <= self.interval {
            return None;
        }
        self.window_timer -= self.interval;
        Some(self.flush(pool))
    }

    fn flush(&mut self, pool: &mut WavePool) -> WindowSample {
        self.perceived_frequency = frequency_from_count(self.window_count, self.interval);
        if self.track_volume {
            if let Some(nearest) = self.nearest_radius {
                self.perceived_volume = volume_from_radius(nearest);
            }
        }
        self.policy.on_flush(pool);

        let sample = WindowSample {
            count: self.window_count,
            frequency: self.perceived_frequency,
            volume: self.perceived_volume,
            nearest_radius: self.nearest_radius,
        };
        debug!("f = {:.2}, v = {:.4}", sample.frequency, sample.volume);

        self.window_count = 0;
        self.nearest_radius = None;
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AGGREGATION_INTERVAL, CROSSING_MARGIN};

    fn sampler(policy: HeardResetPolicy) -> PerceptionSampler {
        PerceptionSampler::new(AGGREGATION_INTERVAL, CROSSING_MARGIN, true, policy)
    }

    #[test]
    fn test_first_crossing_tick_matches_floored_distance() {
        // Speed 4 and dt 0.25 advance the radius exactly one unit per tick, so
        // the first tick with floor(radius) >= floor(10.7) is tick 10.
        let mut pool = WavePool::new(4);
        let mut perception = sampler(HeardResetPolicy::EveryWindow);
        let observer = Vec2::new(10.7, 0.0);
        pool.try_emit(Vec2::ZERO).unwrap();

        let mut first_cross = None;
        for tick in 1..=20 {
            pool.advance_all(0.25, 4.0, 800.0);
            if perception.classify(&mut pool, observer) > 0 && first_cross.is_none() {
                first_cross = Some(tick);
                assert_eq!(pool.get(0).unwrap().classification, Classification::JustCrossed);
            }
        }
        assert_eq!(first_cross, Some(10));
    }

    #[test]
    fn test_heard_wave_not_recounted_then_confirmed() {
        let mut pool = WavePool::new(4);
        let mut perception = sampler(HeardResetPolicy::EveryWindow);
        let observer = Vec2::new(10.0, 0.0);
        pool.try_emit(Vec2::ZERO).unwrap();

        let mut total = 0;
        for _ in 0..14 {
            pool.advance_all(0.25, 4.0, 800.0);
            total += perception.classify(&mut pool, observer);
        }
        // Radius 14 is inside the band [10, 15): counted once, still just-crossed.
        assert_eq!(total, 1);
        assert_eq!(perception.window_count(), 1);
        assert_eq!(pool.get(0).unwrap().classification, Classification::JustCrossed);

        pool.advance_all(0.25, 4.0, 800.0);
        perception.classify(&mut pool, observer);
        assert_eq!(pool.get(0).unwrap().classification, Classification::Confirmed);
    }

    #[test]
    fn test_window_count_bounded_by_distinct_waves() {
        let mut pool = WavePool::new(16);
        let mut perception = sampler(HeardResetPolicy::EveryWindow);
        let observer = Vec2::new(3.0, 4.0);
        for i in 0..10 {
            pool.try_emit(Vec2::new(i as f32 * 0.1, 0.0)).unwrap();
        }

        // Many ticks inside one window, all waves sweep through the observer.
        for _ in 0..50 {
            pool.advance_all(0.001, 340.0, 800.0);
            perception.classify(&mut pool, observer);
            assert!(perception.window_count() <= 10);
        }
        assert_eq!(perception.window_count(), 10);
    }

    #[test]
    fn test_flush_converts_count_to_frequency_and_resets() {
        let mut pool = WavePool::new(8);
        let mut perception = sampler(HeardResetPolicy::EveryWindow);
        let observer = Vec2::new(2.0, 0.0);
        pool.try_emit(Vec2::ZERO).unwrap();
        pool.try_emit(Vec2::new(-1.0, 0.0)).unwrap();
        pool.advance_all(1.0, 3.0, 800.0);

        assert_eq!(perception.classify(&mut pool, observer), 2);
        assert!(perception.advance_window(0.05, &mut pool).is_none());

        let sample = perception.advance_window(0.06, &mut pool).expect("window should close");
        assert_eq!(sample.count, 2);
        assert!((sample.frequency - 20.0).abs() < 1e-3, "f = {}", sample.frequency);
        // Both radii floor to 3; volume = 1 / 12.
        assert_eq!(sample.nearest_radius, Some(3.0));
        assert!((sample.volume - 1.0 / 12.0).abs() < 1e-6, "v = {}", sample.volume);

        assert_eq!(perception.window_count(), 0);
        assert!(!pool.is_heard(0));
        assert!(!pool.is_heard(1));
        assert!((perception.window_timer() - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_volume_held_when_window_is_silent() {
        let mut pool = WavePool::new(2);
        let mut perception = sampler(HeardResetPolicy::EveryWindow);
        let sample = perception.advance_window(0.2, &mut pool).unwrap();
        assert_eq!(sample.count, 0);
        assert_eq!(sample.frequency, 0.0);
        assert_eq!(sample.volume, 1.0);
    }

    #[test]
    fn test_volume_tracking_can_be_disabled() {
        let mut pool = WavePool::new(2);
        let mut perception =
            PerceptionSampler::new(AGGREGATION_INTERVAL, CROSSING_MARGIN, false, HeardResetPolicy::EveryWindow);
        pool.try_emit(Vec2::ZERO).unwrap();
        pool.advance_all(1.0, 50.0, 800.0);
        perception.classify(&mut pool, Vec2::new(50.0, 0.0));

        let sample = perception.advance_window(0.2, &mut pool).unwrap();
        assert_eq!(sample.count, 1);
        assert_eq!(sample.volume, 1.0);
    }

    #[test]
    fn test_every_window_policy_recounts_wave_in_band() {
        let observer = Vec2::new(10.0, 0.0);
        let mut counts = Vec::new();
        for policy in [HeardResetPolicy::EveryWindow, HeardResetPolicy::OnEmission] {
            let mut pool = WavePool::new(2);
            let mut perception = sampler(policy);
            pool.try_emit(Vec2::ZERO).unwrap();
            pool.advance_all(1.0, 11.0, 800.0);

            // Radius 11 sits in the band [10, 15) across the window boundary.
            perception.classify(&mut pool, observer);
            let first = perception.advance_window(0.2, &mut pool).unwrap();
            perception.classify(&mut pool, observer);
            let second = perception.advance_window(0.1, &mut pool).unwrap();
            counts.push((first.count, second.count));
        }
        assert_eq!(counts[0], (1, 1), "observed behaviour double counts");
        assert_eq!(counts[1], (1, 0), "lifetime policy counts once");
    }
}
