//! Force-directed knowledge-graph engine: model, physics, camera, rendering
//! and pointer interaction, plus the snapshot sources that feed it.

pub mod config;
pub mod engine;
pub mod source;
mod util;

pub use config::{ConfigError, EngineConfig};
pub use engine::GraphEngine;
