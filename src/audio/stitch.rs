//! Crossfade concatenation of audio segments.
//!
//! Merges an ordered list of WAV segments into one continuous file. The
//! tail of the running accumulator and the head of each new segment are
//! blended over the crossfade window instead of hard-cut, so splice points
//! are inaudible. The operation is atomic: either the full merged file
//! appears at the output path or nothing does.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::types::StitchedSong;

use super::wav::{read_wav, write_wav, AudioClip};

/// Stitches the given segments, in order, into `output_path`.
///
/// Segment order is exactly the order of the input slice; the caller (the
/// orchestrator) is responsible for passing structure order. The output
/// format is implied by the extension; a missing extension defaults to
/// `.wav`. Only WAV is supported by this stack.
///
/// Returns the stitched song with its final path (which may have `.wav`
/// appended) and measured duration.
pub fn stitch(
    segment_paths: &[PathBuf],
    output_path: &Path,
    crossfade_ms: u32,
) -> Result<StitchedSong> {
    if segment_paths.is_empty() {
        return Err(PipelineError::stitch_failed(
            "no audio files provided to stitch",
        ));
    }

    // Every input needs a recognizable format hint before any decoding
    for path in segment_paths {
        require_wav_extension(path)?;
    }
    let output_path = resolve_output_path(output_path)?;

    // Decode everything up front; a decode error on any segment aborts the
    // whole stitch before anything is written
    let mut clips = Vec::with_capacity(segment_paths.len());
    for path in segment_paths {
        clips.push(read_wav(path)?);
    }

    let mut iter = clips.into_iter();
    let Some(mut accumulator) = iter.next() else {
        return Err(PipelineError::stitch_failed(
            "no audio files provided to stitch",
        ));
    };

    let overlap_frames =
        (accumulator.sample_rate as u64 * crossfade_ms as u64 / 1000) as usize;

    for (i, next) in iter.enumerate() {
        if next.channels != accumulator.channels || next.sample_rate != accumulator.sample_rate {
            return Err(PipelineError::stitch_failed(format!(
                "segment {} format mismatch: {} ch @ {} Hz vs {} ch @ {} Hz",
                i + 2,
                next.channels,
                next.sample_rate,
                accumulator.channels,
                accumulator.sample_rate
            )));
        }
        append_with_crossfade(&mut accumulator, &next, overlap_frames)?;
    }

    export_atomic(&accumulator, &output_path)?;

    Ok(StitchedSong {
        duration_sec: accumulator.duration_sec(),
        path: output_path,
    })
}

/// Appends `next` to `accumulator`, blending `overlap_frames` frames of
/// boundary material with a linear crossfade.
fn append_with_crossfade(
    accumulator: &mut AudioClip,
    next: &AudioClip,
    overlap_frames: usize,
) -> Result<()> {
    if overlap_frames > accumulator.frames() || overlap_frames > next.frames() {
        return Err(PipelineError::stitch_failed(format!(
            "crossfade of {} frames is longer than a segment ({} / {} frames)",
            overlap_frames,
            accumulator.frames(),
            next.frames()
        )));
    }

    let channels = accumulator.channels as usize;
    let tail_start = (accumulator.frames() - overlap_frames) * channels;

    for frame in 0..overlap_frames {
        // Gains stay strictly inside (0, 1) across the window
        let fade_in = (frame as f32 + 1.0) / (overlap_frames as f32 + 1.0);
        let fade_out = 1.0 - fade_in;
        for ch in 0..channels {
            let idx = frame * channels + ch;
            let tail = accumulator.samples[tail_start + idx];
            let head = next.samples[idx];
            accumulator.samples[tail_start + idx] = tail * fade_out + head * fade_in;
        }
    }

    accumulator
        .samples
        .extend_from_slice(&next.samples[overlap_frames * channels..]);
    Ok(())
}

/// Writes the merged audio to a sibling temp file, then renames it into
/// place. A failed write never leaves a truncated output behind.
fn export_atomic(clip: &AudioClip, output_path: &Path) -> Result<()> {
    let tmp_path = output_path.with_extension("wav.tmp");

    if let Err(e) = write_wav(&tmp_path, &clip.samples, clip.channels, clip.sample_rate) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    fs::rename(&tmp_path, output_path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        PipelineError::stitch_failed(format!(
            "Failed to move stitched file into place at {}: {}",
            output_path.display(),
            e
        ))
    })
}

/// Rejects inputs whose format cannot be inferred from the file name.
fn require_wav_extension(path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("wav") => Ok(()),
        Some(ext) => Err(PipelineError::stitch_failed(format!(
            "unsupported audio format '{}' for {}",
            ext,
            path.display()
        ))),
        None => Err(PipelineError::stitch_failed(format!(
            "audio file is missing a file extension: {}",
            path.display()
        ))),
    }
}

/// Resolves the output path, defaulting a missing extension to `.wav`.
fn resolve_output_path(output_path: &Path) -> Result<PathBuf> {
    match output_path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("wav") => Ok(output_path.to_path_buf()),
        Some(ext) => Err(PipelineError::stitch_failed(format!(
            "unsupported output format '{}' (only wav is supported)",
            ext
        ))),
        None => {
            let mut path = output_path.as_os_str().to_os_string();
            path.push(".wav");
            Ok(PathBuf::from(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const RATE: u32 = 32000;

    /// Writes a mono WAV of `frames` constant-valued samples.
    fn make_segment(dir: &Path, name: &str, value: f32, frames: usize) -> PathBuf {
        let path = dir.join(name);
        write_wav(&path, &vec![value; frames], 1, RATE).unwrap();
        path
    }

    #[test]
    fn duration_is_sum_minus_crossfades() {
        let dir = tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..4)
            .map(|i| make_segment(dir.path(), &format!("seg{}.wav", i), 0.1, RATE as usize))
            .collect();
        let output = dir.path().join("song.wav");

        let song = stitch(&paths, &output, 150).unwrap();

        // 4 x 1s - 3 x 0.15s = 3.55s
        assert!((song.duration_sec - 3.55).abs() < 1e-3);
        assert!(output.exists());
    }

    #[test]
    fn order_is_preserved() {
        let dir = tempdir().unwrap();
        let paths = vec![
            make_segment(dir.path(), "a.wav", 0.2, 8000),
            make_segment(dir.path(), "b.wav", 0.5, 8000),
            make_segment(dir.path(), "c.wav", 0.8, 8000),
        ];
        let output = dir.path().join("song.wav");

        stitch(&paths, &output, 100).unwrap();
        let clip = read_wav(&output).unwrap();

        // A's content precedes B's precedes C's in the output timeline
        assert!((clip.samples[0] - 0.2).abs() < 1e-6);
        assert!((clip.samples[clip.samples.len() / 2] - 0.5).abs() < 1e-6);
        assert!((clip.samples[clip.samples.len() - 1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn crossfade_blends_boundary() {
        let dir = tempdir().unwrap();
        let paths = vec![
            make_segment(dir.path(), "a.wav", 0.0, 8000),
            make_segment(dir.path(), "b.wav", 1.0, 8000),
        ];
        let output = dir.path().join("song.wav");

        stitch(&paths, &output, 100).unwrap();
        let clip = read_wav(&output).unwrap();

        // Overlap region sits strictly between the two levels and ramps up
        let overlap = (RATE as usize) * 100 / 1000;
        let start = 8000 - overlap;
        let first = clip.samples[start];
        let last = clip.samples[start + overlap - 1];
        assert!(first > 0.0 && first < 0.5);
        assert!(last > 0.5 && last < 1.0);
        assert!(first < last);
    }

    #[test]
    fn corrupt_segment_produces_no_output() {
        let dir = tempdir().unwrap();
        let good1 = make_segment(dir.path(), "a.wav", 0.1, 8000);
        let corrupt = dir.path().join("b.wav");
        std::fs::write(&corrupt, b"definitely not audio").unwrap();
        let good2 = make_segment(dir.path(), "c.wav", 0.1, 8000);
        let output = dir.path().join("song.wav");

        let result = stitch(&[good1, corrupt, good2], &output, 150);

        assert!(result.is_err());
        assert!(!output.exists());
        // No temp file left behind either
        assert!(!dir.path().join("song.wav.tmp").exists());
    }

    #[test]
    fn empty_input_is_an_error() {
        let dir = tempdir().unwrap();
        let result = stitch(&[], &dir.path().join("song.wav"), 150);
        assert!(result.is_err());
    }

    #[test]
    fn missing_extension_is_format_failure() {
        let dir = tempdir().unwrap();
        let good = make_segment(dir.path(), "a.wav", 0.1, 8000);
        let extensionless = dir.path().join("segment");
        std::fs::copy(&good, &extensionless).unwrap();

        let result = stitch(
            &[good, extensionless],
            &dir.path().join("song.wav"),
            150,
        );
        assert!(result.is_err());
    }

    #[test]
    fn output_without_extension_defaults_to_wav() {
        let dir = tempdir().unwrap();
        let paths = vec![make_segment(dir.path(), "a.wav", 0.1, 8000)];

        let song = stitch(&paths, &dir.path().join("song"), 0).unwrap();

        assert!(song.path.to_string_lossy().ends_with("song.wav"));
        assert!(song.path.exists());
    }

    #[test]
    fn non_wav_output_is_rejected() {
        let dir = tempdir().unwrap();
        let paths = vec![make_segment(dir.path(), "a.wav", 0.1, 8000)];

        let result = stitch(&paths, &dir.path().join("song.mp3"), 0);
        assert!(result.is_err());
    }

    #[test]
    fn mismatched_sample_rates_rejected() {
        let dir = tempdir().unwrap();
        let a = make_segment(dir.path(), "a.wav", 0.1, 8000);
        let b = dir.path().join("b.wav");
        write_wav(&b, &vec![0.1; 8000], 1, 44100).unwrap();

        let result = stitch(&[a, b], &dir.path().join("song.wav"), 150);
        assert!(result.is_err());
    }

    #[test]
    fn crossfade_longer_than_segment_rejected() {
        let dir = tempdir().unwrap();
        // 100ms segments with a 150ms crossfade cannot overlap
        let paths = vec![
            make_segment(dir.path(), "a.wav", 0.1, 3200),
            make_segment(dir.path(), "b.wav", 0.1, 3200),
        ];

        let result = stitch(&paths, &dir.path().join("song.wav"), 150);
        assert!(result.is_err());
    }

    #[test]
    fn zero_crossfade_is_plain_concat() {
        let dir = tempdir().unwrap();
        let paths = vec![
            make_segment(dir.path(), "a.wav", 0.2, 8000),
            make_segment(dir.path(), "b.wav", 0.8, 8000),
        ];

        let song = stitch(&paths, &dir.path().join("song.wav"), 0).unwrap();
        let clip = read_wav(&song.path).unwrap();
        assert_eq!(clip.frames(), 16000);
    }
}
