//! pulse-daemon: hum-to-song generation CLI.
//!
//! Runs one request end to end against the real services: structure
//! generation, per-segment synthesis, download, and stitching. Credentials
//! come from the environment (GEMINI_API_KEY, REPLICATE_API_TOKEN).

use std::fs;
use std::process::ExitCode;
use std::time::Instant;

use pulse_daemon::cli::Cli;
use pulse_daemon::config::PipelineConfig;
use pulse_daemon::pipeline::Pipeline;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse_args();

    let mut config = PipelineConfig::from_env();
    config.segment_duration_sec = cli.segment_duration;
    config.crossfade_ms = cli.crossfade_ms;
    config.reference_source = cli.reference.to_reference_source();

    // Fail-fast construction: bad credentials or storage stop everything
    // before any request is accepted
    let pipeline = Pipeline::new(config).map_err(|e| e.to_string())?;

    let hum = fs::read(&cli.hum)
        .map_err(|e| format!("cannot read hum recording {}: {}", cli.hum.display(), e))?;

    eprintln!("=== pulse-daemon ===");
    eprintln!("Hum: {}", cli.hum.display());
    if let Some(ref description) = cli.description {
        eprintln!("Description: \"{}\"", description);
    }
    if let Some(ref vibe) = cli.vibe {
        eprintln!("Vibe: \"{}\"", vibe);
    }
    eprintln!("Segment duration: {}s", cli.segment_duration);
    eprintln!("Crossfade: {}ms", cli.crossfade_ms);
    eprintln!();

    let start_time = Instant::now();
    let song = pipeline
        .submit(&hum, cli.description.clone(), cli.vibe.clone())
        .map_err(|e| format!("{}. Recovery: {}", e, e.code.recovery_hint()))?;

    let elapsed = start_time.elapsed().as_secs_f32();
    eprintln!();
    eprintln!("Generation complete!");
    eprintln!("  Time: {:.2}s", elapsed);
    eprintln!("  Song duration: {:.2}s", song.duration_sec);

    // The stitched file belongs to us now; move it where the user asked
    let output_path = cli.output_path();
    move_file(&song.path, &output_path)?;

    eprintln!("Saved to: {}", output_path.display());
    println!("{}", output_path.display());
    Ok(())
}

/// Moves a file, falling back to copy+remove across filesystems.
fn move_file(from: &std::path::Path, to: &std::path::Path) -> Result<(), String> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)
        .map_err(|e| format!("cannot write output {}: {}", to.display(), e))?;
    fs::remove_file(from)
        .map_err(|e| format!("cannot remove temporary {}: {}", from.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn move_file_within_directory() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("a.wav");
        let to = dir.path().join("b.wav");
        fs::write(&from, b"data").unwrap();

        move_file(&from, &to).unwrap();

        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"data");
    }
}
