//! Error types for configuration and audio output.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating [`crate::DopplerParams`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has mistyped fields.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A parameter is outside the range the simulation can run with.
    #[error("invalid parameter `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised while opening the audio output stream.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("no audio output device available")]
    NoDevice,

    #[error("failed to query default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("unsupported sample format: {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream: {0}")]
    Play(#[from] cpal::PlayStreamError),

    #[error("failed to pause output stream: {0}")]
    Pause(#[from] cpal::PauseStreamError),
}
