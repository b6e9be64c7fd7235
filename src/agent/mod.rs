//! The math & search agent and its progress-update stream.

pub mod agent;
pub mod update;

pub use agent::{Agent, SUPPORTED_CONTENT_TYPES};
pub use update::*;
