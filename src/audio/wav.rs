//! WAV file reading and writing for the stitcher.
//!
//! Decodes 16/24/32-bit integer and 32-bit float WAV files into f32
//! samples, and writes 32-bit float WAV using the hound crate.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{PipelineError, Result};

/// Decoded audio: interleaved f32 samples plus the format they carry.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Interleaved samples, normalized to [-1.0, 1.0].
    pub samples: Vec<f32>,

    /// Number of channels.
    pub channels: u16,

    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioClip {
    /// Returns the number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    /// Returns the clip duration in seconds.
    pub fn duration_sec(&self) -> f32 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frames() as f32 / self.sample_rate as f32
        }
    }
}

/// Reads a WAV file into an [`AudioClip`].
///
/// Integer samples are normalized by their bit depth; float samples are
/// taken as-is. Unsupported bit depths are decode failures.
pub fn read_wav(path: &Path) -> Result<AudioClip> {
    let mut reader = WavReader::open(path).map_err(|e| {
        PipelineError::stitch_failed(format!("Failed to open {}: {}", path.display(), e))
    })?;
    let spec = reader.spec();

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| {
                PipelineError::stitch_failed(format!(
                    "Failed to decode {}: {}",
                    path.display(),
                    e
                ))
            })?,
        (SampleFormat::Int, bits @ (16 | 24 | 32)) => {
            let scale = (1u64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| {
                    PipelineError::stitch_failed(format!(
                        "Failed to decode {}: {}",
                        path.display(),
                        e
                    ))
                })?
        }
        (format, bits) => {
            return Err(PipelineError::stitch_failed(format!(
                "Unsupported sample format in {}: {:?} {} bits",
                path.display(),
                format,
                bits
            )));
        }
    };

    Ok(AudioClip {
        samples,
        channels: spec.channels,
        sample_rate: spec.sample_rate,
    })
}

/// Writes interleaved f32 samples to a WAV file.
pub fn write_wav(path: &Path, samples: &[f32], channels: u16, sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| {
        PipelineError::stitch_failed(format!(
            "Failed to create WAV file {}: {}",
            path.display(),
            e
        ))
    })?;

    for sample in samples {
        writer.write_sample(*sample).map_err(|e| {
            PipelineError::stitch_failed(format!("Failed to write sample: {}", e))
        })?;
    }

    writer.finalize().map_err(|e| {
        PipelineError::stitch_failed(format!("Failed to finalize WAV file: {}", e))
    })?;

    Ok(())
}
