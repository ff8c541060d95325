//! Shared utilities for the rds-stack workspace
//!
//! This crate provides the ambient functionality used by the synthesizer:
//! - Structured logging initialization
//! - Environment variable parsing helpers
//! - AWS target environment lookups
//! - Synthesis lifecycle events

pub mod config;
pub mod events;
pub mod logging;

pub use config::{AwsEnv, ConfigExt};
pub use events::SynthEvent;
pub use logging::init_logging;
