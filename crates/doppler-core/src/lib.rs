//! Wave propagation and perception model for a 2-D Doppler effect simulator.
//!
//! A moving [`Source`] emits circular wavefronts at its frequency; they expand
//! at the sound speed and are retired once they leave the relevant region. A
//! moving observer counts the wavefronts that reach it over fixed windows,
//! which yields the perceived (Doppler-shifted) frequency and a loudness
//! proxy. [`Simulation`] drives the whole pipeline one tick at a time and
//! publishes the perceived values through a [`PerceptionHandle`] that the
//! audio callback reads.

pub mod audio;
pub mod body;
pub mod constants;
pub mod control;
pub mod error;
pub mod handle;
pub mod params;
pub mod perception;
pub mod simulation;
pub mod wave;

pub use body::{Body, Source};
pub use control::{Control, ControlInput};
pub use error::{AudioError, ConfigError};
pub use handle::PerceptionHandle;
pub use params::DopplerParams;
pub use perception::{HeardResetPolicy, PerceptionSampler, WindowSample};
pub use simulation::{Emission, SimStats, Simulation, TickReport};
pub use wave::{Classification, PoolExhausted, WavePool, Wavefront};
