//! Song structure generation.
//!
//! Turns a melody description plus a vibe into an ordered four-segment
//! song structure using an external language model, with a deterministic
//! fallback when the model's JSON cannot be parsed.

pub mod gemini;
pub mod generator;

// Re-export commonly used types
pub use gemini::GeminiClient;
pub use generator::{LanguageModel, StructureGenerator};
