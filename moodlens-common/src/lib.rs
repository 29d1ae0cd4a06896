//! # Moodlens Common Library
//!
//! Shared code for the moodlens services including:
//! - Error types
//! - Bootstrap configuration loading
//! - Mood labels and mood-to-genre mapping
//! - Event types (MoodEvent enum) and the EventBus
//! - Timestamp utilities

pub mod config;
pub mod error;
pub mod events;
pub mod mood;
pub mod time;

pub use error::{Error, Result};
pub use mood::MoodLabel;
