//! Pipeline orchestrator: request -> structure -> segments -> stitched song.
//!
//! The orchestrator owns all failure handling and temporary-resource
//! lifetime for a request. Control flow is strictly linear and blocking:
//! structure generation, then per-segment synthesis and download in index
//! order, then stitching. Any failure at any stage is a terminal abort for
//! that request (no retries); one cleanup routine runs on every abort and
//! on delivery, so no orphaned files ever survive a request.

use std::fmt;
use std::path::PathBuf;

use crate::audio::stitch;
use crate::config::{ConfigError, PipelineConfig, ReferenceSource};
use crate::error::{PipelineError, Result};
use crate::fetch::{ArtifactFetcher, HttpFetcher};
use crate::storage::RequestStore;
use crate::structure::{GeminiClient, StructureGenerator};
use crate::synth::{ReplicateClient, SegmentSynthesizer, SynthesisRequest};
use crate::types::{generate_request_id, GenerationRequest, SegmentArtifact, StitchedSong};

/// Crossfade and synthesis stages a request moves through, in order.
///
/// `Aborted` is terminal and reachable from any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Request arrived; hum saved.
    Received,
    /// Song structure generated.
    StructureReady,
    /// Synthesizing segment `i` (zero-based).
    SegmentGenerating(usize),
    /// Segment `i` downloaded into local storage.
    SegmentFetched(usize),
    /// Every segment fetched; ready to stitch.
    AllSegmentsReady,
    /// Stitched song written.
    Stitched,
    /// Stitched song handed to the caller; temporaries removed.
    Delivered,
    /// Request failed; all temporaries removed.
    Aborted,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Received => write!(f, "received"),
            PipelineStage::StructureReady => write!(f, "structure_ready"),
            PipelineStage::SegmentGenerating(i) => write!(f, "segment_generating({})", i + 1),
            PipelineStage::SegmentFetched(i) => write!(f, "segment_fetched({})", i + 1),
            PipelineStage::AllSegmentsReady => write!(f, "all_segments_ready"),
            PipelineStage::Stitched => write!(f, "stitched"),
            PipelineStage::Delivered => write!(f, "delivered"),
            PipelineStage::Aborted => write!(f, "aborted"),
        }
    }
}

/// The generation-and-stitching pipeline.
///
/// Built once at process start with validated configuration; each
/// [`submit`](Pipeline::submit) call then runs one request end to end.
/// Requests are independent and share nothing but the request-namespaced
/// filesystem, so a `Pipeline` can serve them concurrently from separate
/// threads without coordination.
pub struct Pipeline {
    structure: StructureGenerator,
    synthesizer: Box<dyn SegmentSynthesizer + Send + Sync>,
    fetcher: Box<dyn ArtifactFetcher + Send + Sync>,
    store: RequestStore,
    segment_duration_sec: u32,
    crossfade_ms: u32,
    reference_source: ReferenceSource,
}

impl Pipeline {
    /// Builds a pipeline with production collaborators.
    ///
    /// Fails closed: credentials, storage directories, and HTTP clients are
    /// all validated here, so no component is left half-initialized and no
    /// request is accepted against a broken configuration.
    pub fn new(config: PipelineConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let store = RequestStore::from_config(&config)
            .map_err(|e| ConfigError::ComponentInit(e.to_string()))?;
        let model = GeminiClient::new(&config.gemini_api_key)
            .map_err(|e| ConfigError::ComponentInit(e.to_string()))?;
        let synthesizer = ReplicateClient::new(&config.replicate_api_token)
            .map_err(|e| ConfigError::ComponentInit(e.to_string()))?;
        let fetcher =
            HttpFetcher::new().map_err(|e| ConfigError::ComponentInit(e.to_string()))?;

        Ok(Self::with_components(
            StructureGenerator::new(Box::new(model)),
            Box::new(synthesizer),
            Box::new(fetcher),
            store,
            &config,
        ))
    }

    /// Builds a pipeline from explicit collaborators.
    ///
    /// Lets tests (and alternate deployments) substitute any collaborator
    /// behind its trait.
    pub fn with_components(
        structure: StructureGenerator,
        synthesizer: Box<dyn SegmentSynthesizer + Send + Sync>,
        fetcher: Box<dyn ArtifactFetcher + Send + Sync>,
        store: RequestStore,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            structure,
            synthesizer,
            fetcher,
            store,
            segment_duration_sec: config.segment_duration_sec,
            crossfade_ms: config.crossfade_ms,
            reference_source: config.reference_source,
        }
    }

    /// Submits one request: hum recording bytes plus optional textual
    /// descriptions. Returns the stitched song or a structured failure.
    ///
    /// On success the stitched file's ownership transfers to the caller;
    /// every temporary (the hum and all per-segment downloads) is gone by
    /// the time this returns, success or failure.
    pub fn submit(
        &self,
        hum_audio: &[u8],
        melody_description: Option<String>,
        vibe: Option<String>,
    ) -> Result<StitchedSong> {
        if hum_audio.is_empty() {
            return Err(PipelineError::invalid_request(
                "hum recording must not be empty",
            ));
        }

        let request_id = generate_request_id();
        let hum_path = self.store.save_hum(&request_id, hum_audio)?;
        let request = GenerationRequest::new(request_id, hum_path, melody_description, vibe);

        eprintln!(
            "[{}] Received hum and vibe: \"{}\"",
            request.request_id, request.vibe
        );

        self.run(&request)
    }

    /// Runs an already-saved request through the state machine, cleaning
    /// up temporaries on every exit path.
    pub fn run(&self, request: &GenerationRequest) -> Result<StitchedSong> {
        if let Some(reason) = request.validate() {
            // Nothing saved yet that cleanup could miss, but the hum may
            // exist even for a malformed id
            self.cleanup(request, &[]);
            return Err(PipelineError::invalid_request(reason));
        }

        let mut artifacts: Vec<SegmentArtifact> = Vec::new();
        match self.advance(request, &mut artifacts) {
            Ok(song) => {
                // Delivered: temporaries go, the stitched song stays
                self.cleanup(request, &artifacts);
                self.enter(request, PipelineStage::Delivered);
                Ok(song)
            }
            Err(e) => {
                eprintln!("[{}] {}", request.request_id, e);
                self.cleanup(request, &artifacts);
                self.enter(request, PipelineStage::Aborted);
                Err(e)
            }
        }
    }

    /// Drives the stage transitions for one request. Artifacts fetched so
    /// far accumulate in `artifacts` so the caller can clean up whatever
    /// exists when this returns.
    fn advance(
        &self,
        request: &GenerationRequest,
        artifacts: &mut Vec<SegmentArtifact>,
    ) -> Result<StitchedSong> {
        self.enter(request, PipelineStage::Received);

        let structure = self
            .structure
            .generate_structure(&request.melody_description, &request.vibe)?;
        self.enter(request, PipelineStage::StructureReady);

        let total = structure.len();
        for (i, spec) in structure.segments.iter().enumerate() {
            self.enter(request, PipelineStage::SegmentGenerating(i));
            eprintln!(
                "[{}] Generating segment {}/{}: {}",
                request.request_id,
                i + 1,
                total,
                spec.segment_type
            );

            let reference = self.reference_for(request, artifacts);
            let synthesis = SynthesisRequest {
                prompt: &spec.prompt,
                reference_audio: &reference,
                duration_sec: self.segment_duration_sec,
                // The first segment renders fresh; every later one flows
                // from what came before
                continuation: i != 0,
            };
            let remote_url = self
                .synthesizer
                .synthesize(&synthesis)
                .map_err(|e| PipelineError::synthesis_failed(i + 1, e.message))?;

            eprintln!(
                "[{}] Downloading segment {}/{} from {}",
                request.request_id,
                i + 1,
                total,
                remote_url
            );
            let dest = self.store.segment_path(&request.request_id, i);
            self.fetcher
                .fetch(&remote_url, &dest)
                .map_err(|e| PipelineError::fetch_failed(i + 1, e.message))?;

            artifacts.push(SegmentArtifact::new(dest, spec.clone(), i));
            self.enter(request, PipelineStage::SegmentFetched(i));
        }

        self.enter(request, PipelineStage::AllSegmentsReady);
        eprintln!(
            "[{}] Stitching {} audio segments...",
            request.request_id, total
        );

        let segment_paths: Vec<PathBuf> = artifacts.iter().map(|a| a.path.clone()).collect();
        let output_path = self.store.stitched_path(&request.request_id);
        let song = stitch(&segment_paths, &output_path, self.crossfade_ms)?;
        self.enter(request, PipelineStage::Stitched);

        Ok(song)
    }

    /// Picks the reference recording for the next synthesis call.
    fn reference_for(
        &self,
        request: &GenerationRequest,
        artifacts: &[SegmentArtifact],
    ) -> PathBuf {
        match self.reference_source {
            ReferenceSource::OriginalHum => request.hum_path.clone(),
            ReferenceSource::PreviousSegment => artifacts
                .last()
                .map(|a| a.path.clone())
                .unwrap_or_else(|| request.hum_path.clone()),
        }
    }

    /// Removes every temporary belonging to the request: all fetched
    /// segment artifacts plus the original hum recording. Never touches
    /// the stitched output. Best-effort: a failed removal is logged and
    /// the rest still run.
    fn cleanup(&self, request: &GenerationRequest, artifacts: &[SegmentArtifact]) {
        for artifact in artifacts {
            if let Err(e) = self.store.remove(&artifact.path) {
                eprintln!("[{}] Cleanup: {}", request.request_id, e);
            }
        }
        if let Err(e) = self.store.remove(&request.hum_path) {
            eprintln!("[{}] Cleanup: {}", request.request_id, e);
        }
    }

    /// Logs a stage transition.
    fn enter(&self, request: &GenerationRequest, stage: PipelineStage) {
        eprintln!("[{}] -> {}", request.request_id, stage);
    }
}
