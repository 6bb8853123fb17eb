//! The per-tick state machine tying bodies, wave pool and perception together.

use log::warn;

use crate::body::{Body, Source};
use crate::control::ControlInput;
use crate::error::ConfigError;
use crate::handle::PerceptionHandle;
use crate::params::DopplerParams;
use crate::perception::{PerceptionSampler, WindowSample};
use crate::wave::{WavePool, Wavefront};

/// Outcome of the emission timer firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// A wavefront was started in this slot.
    Emitted(usize),
    /// The pool was full and the wavefront was dropped.
    Dropped,
}

/// What happened during one [`Simulation::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Simulated time advanced this tick.
    pub dt: f32,
    pub emission: Option<Emission>,
    /// Wavefronts heard for the first time this window, during this tick.
    pub crossings: u32,
    pub retired: usize,
    pub window: Option<WindowSample>,
}

/// Running totals since the simulation was created or reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimStats {
    pub emitted: u64,
    pub dropped: u64,
    pub retired: u64,
    pub crossings: u64,
    pub windows: u64,
}

pub struct Simulation {
    params: DopplerParams,
    source: Source,
    observer: Body,
    pool: WavePool,
    sampler: PerceptionSampler,
    /// Time since the last emission, compared against `1 / frequency`.
    emission_timer: f32,
    time_scale: f32,
    elapsed: f32,
    stats: SimStats,
    handle: PerceptionHandle,
}

impl Simulation {
    pub fn new(params: DopplerParams) -> Result<Self, ConfigError> {
        params.validate()?;
        let sampler = Self::sampler_for(&params);
        let handle = PerceptionHandle::new(sampler.perceived_frequency(), sampler.perceived_volume());
        Ok(Self {
            source: Source::new(
                Body::new(params.source.position, params.source.velocity),
                params.source.frequency,
            ),
            observer: Body::new(params.observer.position, params.observer.velocity),
            pool: WavePool::new(params.wave_capacity),
            sampler,
            emission_timer: 0.0,
            time_scale: params.time_scale,
            elapsed: 0.0,
            stats: SimStats::default(),
            handle,
            params,
        })
    }

    fn sampler_for(params: &DopplerParams) -> PerceptionSampler {
        PerceptionSampler::new(
            params.aggregation_interval,
            params.crossing_margin,
            params.track_volume,
            params.heard_reset,
        )
    }

    /// Restore the initial state. Handles given to the audio side stay valid.
    pub fn reset(&mut self) {
        self.source = Source::new(
            Body::new(self.params.source.position, self.params.source.velocity),
            self.params.source.frequency,
        );
        self.observer = Body::new(self.params.observer.position, self.params.observer.velocity);
        self.pool = WavePool::new(self.params.wave_capacity);
        self.sampler = Self::sampler_for(&self.params);
        self.emission_timer = 0.0;
        self.time_scale = self.params.time_scale;
        self.elapsed = 0.0;
        self.stats = SimStats::default();
        self.handle
            .publish(self.sampler.perceived_frequency(), self.sampler.perceived_volume());
    }

    /// Advance the simulation by one frame of wall-clock time.
    ///
    /// The order is fixed: input, bodies, wave propagation, emission,
    /// classification, window flush. Emitting before classifying lets the
    /// sampler see a wavefront on the tick it is born.
    pub fn step(&mut self, frame_time: f32, input: &ControlInput) -> TickReport {
        self.apply_input(input);

        let dt = frame_time.max(0.0) * self.time_scale;
        self.source.body.integrate(dt);
        self.observer.integrate(dt);

        let retired = self.pool.advance_all(
            dt,
            self.params.sound_speed,
            self.params.retirement_distance,
        );
        let emission = self.tick_emission(dt);

        let crossings = self.sampler.classify(&mut self.pool, self.observer.position);
        let window = self.sampler.advance_window(dt, &mut self.pool);
        if let Some(sample) = window {
            self.handle.publish(sample.frequency, sample.volume);
            self.stats.windows += 1;
        }

        self.elapsed += dt;
        self.stats.retired += retired as u64;
        self.stats.crossings += u64::from(crossings);

        TickReport {
            dt,
            emission,
            crossings,
            retired,
            window,
        }
    }

    fn apply_input(&mut self, input: &ControlInput) {
        let max_speed = self.params.max_body_speed;
        self.source.frequency += input.frequency_delta;
        self.source.body.accelerate(input.source_velocity_delta, max_speed);
        self.observer.accelerate(input.observer_velocity_delta, max_speed);
        self.time_scale = (self.time_scale + input.time_scale_delta)
            .clamp(self.params.min_time_scale, self.params.max_time_scale);
    }

    /// Fire the emission timer at most once. A zero frequency pins the timer
    /// at zero. A negative frequency yields a negative period, so the timer
    /// fires on every tick until the frequency is raised again.
    fn tick_emission(&mut self, dt: f32) -> Option<Emission> {
        self.emission_timer += dt;
        let frequency = self.source.frequency;
        if frequency == 0.0 {
            self.emission_timer = 0.0;
            return None;
        }

        let period = 1.0 / frequency;
        if self.emission_timer <= period {
            return None;
        }
        self.emission_timer -= period;

        match self.pool.try_emit(self.source.position()) {
            Ok(slot) => {
                self.stats.emitted += 1;
                Some(Emission::Emitted(slot))
            }
            Err(err) => {
                if self.stats.dropped == 0 {
                    warn!("{err}; further emissions are dropped until a slot retires");
                }
                self.stats.dropped += 1;
                Some(Emission::Dropped)
            }
        }
    }

    pub fn params(&self) -> &DopplerParams {
        &self.params
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn observer(&self) -> &Body {
        &self.observer
    }

    pub fn pool(&self) -> &WavePool {
        &self.pool
    }

    pub fn active_waves(&self) -> impl Iterator<Item = &Wavefront> + '_ {
        self.pool.iter_active().map(|(_, wave)| wave)
    }

    pub fn perceived_frequency(&self) -> f32 {
        self.sampler.perceived_frequency()
    }

    pub fn perceived_volume(&self) -> f32 {
        self.sampler.perceived_volume()
    }

    pub fn window_count(&self) -> u32 {
        self.sampler.window_count()
    }

    pub fn emission_timer(&self) -> f32 {
        self.emission_timer
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Simulated seconds since start or the last reset.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    /// Handle for the audio callback; stays connected across resets.
    pub fn handle(&self) -> PerceptionHandle {
        self.handle.clone()
    }
}
