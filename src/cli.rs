//! CLI argument parser for standalone mode.
//!
//! Provides a command-line interface for running one hum-to-song request
//! end to end without the surrounding transport layer.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::ReferenceSource;

/// Reference audio source for segments after the first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReferenceArg {
    /// Anchor every segment to the original hum recording
    #[default]
    OriginalHum,
    /// Chain each segment from the previously generated one
    PreviousSegment,
}

impl ReferenceArg {
    /// Converts the CLI flag into pipeline configuration.
    pub fn to_reference_source(self) -> ReferenceSource {
        match self {
            ReferenceArg::OriginalHum => ReferenceSource::OriginalHum,
            ReferenceArg::PreviousSegment => ReferenceSource::PreviousSegment,
        }
    }
}

/// pulse-daemon: turn a hummed melody and a vibe into a complete song
#[derive(Parser, Debug)]
#[command(name = "pulse-daemon")]
#[command(about = "Hum-to-song generation: LLM structuring, MusicGen synthesis, crossfade stitching")]
#[command(version)]
pub struct Cli {
    /// Path to the hum recording (WAV)
    #[arg(long)]
    pub hum: PathBuf,

    /// Description of the hummed melody
    #[arg(short, long)]
    pub description: Option<String>,

    /// Desired style or vibe for the song
    #[arg(short, long)]
    pub vibe: Option<String>,

    /// Where to place the final song
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Duration of each generated segment in seconds (max 30)
    #[arg(long, default_value = "15", value_parser = clap::value_parser!(u32).range(1..=30))]
    pub segment_duration: u32,

    /// Crossfade between segments in milliseconds
    #[arg(long, default_value = "150")]
    pub crossfade_ms: u32,

    /// Reference audio source for segments after the first
    #[arg(long, value_enum, default_value_t = ReferenceArg::OriginalHum)]
    pub reference: ReferenceArg,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Returns the effective output path.
    ///
    /// Defaults to "pulse_generated_song.wav" in the current directory.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from("pulse_generated_song.wav"))
    }
}
