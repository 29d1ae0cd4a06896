//! # Moodlens Live Library (moodlens-live)
//!
//! Adaptive live mood inference: periodically captures a camera frame,
//! classifies it, smooths the labels and hands stable moods to the
//! recommendation consumer.
//!
//! **Pipeline:** capture → inference → trail + smoothing → confidence gate
//! → commit, re-armed on an adaptive cadence by the live loop scheduler.

pub mod api;
pub mod cadence;
pub mod capture;
pub mod consumer;
pub mod error;
pub mod gate;
pub mod inference;
pub mod scheduler;
pub mod settings;
pub mod smoothing;
pub mod snapshot;
pub mod trail;

pub use error::{ApiError, CycleError, LoopError};
pub use scheduler::{LiveLoop, LiveLoopDeps, LiveStatus};
pub use settings::LiveSettings;
