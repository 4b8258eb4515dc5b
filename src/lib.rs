//! pulse-daemon: hum-to-song generation pipeline.
//!
//! Turns a short hummed melody plus a style description into a complete
//! song: a language model proposes a four-segment song structure, an
//! external audio-generation model renders each segment against the hum,
//! and the segments are downloaded and merged into one continuous track
//! with crossfades.
//!
//! # Modules
//!
//! - [`types`]: Core data types (GenerationRequest, SongStructure, artifacts)
//! - [`config`]: Runtime configuration (PipelineConfig, ReferenceSource)
//! - [`error`]: Error codes and types (PipelineError, ErrorCode)
//! - [`structure`]: Song structure generation via a language model
//! - [`synth`]: Per-segment audio synthesis via a generative audio service
//! - [`fetch`]: Streaming retrieval of generated segments
//! - [`audio`]: WAV I/O and crossfade stitching
//! - [`pipeline`]: The orchestrator tying the stages together
//!
//! # Example
//!
//! ```rust,ignore
//! use pulse_daemon::{config::PipelineConfig, pipeline::Pipeline};
//!
//! let config = PipelineConfig::from_env();
//! let pipeline = Pipeline::new(config)?;
//!
//! let hum = std::fs::read("hum.wav")?;
//! let song = pipeline.submit(
//!     &hum,
//!     Some("a simple, melancholic melody".to_string()),
//!     Some("lo-fi hip hop".to_string()),
//! )?;
//! println!("{}", song.path.display());
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod storage;
pub mod structure;
pub mod synth;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use config::{ConfigError, PipelineConfig, ReferenceSource};
pub use error::{ErrorCode, PipelineError, Result};
pub use pipeline::{Pipeline, PipelineStage};
pub use types::{GenerationRequest, SegmentSpec, SongStructure, StitchedSong};
