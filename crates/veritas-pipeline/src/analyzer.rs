//! Per-modality cue analysis.

use std::fmt;
use std::sync::Arc;

use tracing::{error, info, warn};
use veritas_gemini::InferenceClient;
use veritas_models::{CueAnalysisResult, MediaFile, MediaKind};

use crate::error::AnalysisError;
use crate::parser::parse_structured;
use crate::uploader::Uploader;

const AUDIO_PROMPT: &str = r#"
You are listening to a recording of a person speaking. Assess only the
speaker's voice and delivery. Note vocal behaviour commonly linked to stress
or deception: nervousness, hesitation, unnatural pauses, filler words such as
"um" or "ah", and noticeable shifts in pitch or speaking speed.

Describe what you hear, list each specific vocal proxy you detected, and give
a "deception_score" from 0 (sounds completely truthful) to 10 (sounds highly
deceptive) based on these vocal cues alone.

Reply with a single valid JSON object and nothing else, shaped like:
{
  "analysis": "Detailed description of the speaker's tone and delivery...",
  "detected_proxies": ["hesitation", "filler words", "pitch rise"],
  "deception_score": <number from 0 to 10>
}
"#;

const VIDEO_PROMPT: &str = r#"
You are watching a video of a person speaking. Assess only what you can see.
Note non-verbal behaviour commonly linked to stress or deception: fidgeting,
lack of eye contact, gaze aversion, shifting posture, unnatural body language,
self-touching (face, neck) and micro-expressions.

Describe what you see, list each specific visual proxy you detected, and give
a "deception_score" from 0 (looks completely truthful) to 10 (looks highly
deceptive) based on these visual cues alone.

Reply with a single valid JSON object and nothing else, shaped like:
{
  "analysis": "Detailed description of the speaker's body language...",
  "detected_proxies": ["gaze aversion", "fidgeting", "self-touch"],
  "deception_score": <number from 0 to 10>
}
"#;

/// Which modality an analyzer scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CueModality {
    /// Vocal cues in the extracted audio track
    Audio,
    /// Visual cues in the original video
    Video,
}

impl CueModality {
    pub fn prompt(&self) -> &'static str {
        match self {
            CueModality::Audio => AUDIO_PROMPT,
            CueModality::Video => VIDEO_PROMPT,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CueModality::Audio => "Audio",
            CueModality::Video => "Video",
        }
    }

    /// Media kind this modality expects as input.
    pub fn media_kind(&self) -> MediaKind {
        match self {
            CueModality::Audio => MediaKind::Audio,
            CueModality::Video => MediaKind::Video,
        }
    }
}

impl fmt::Display for CueModality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Uploads one media file, asks the model for a cue analysis and parses it.
///
/// The uploaded handle is released exactly once on every path after
/// acquisition, whether inference and parsing succeed or not.
#[derive(Clone)]
pub struct CueAnalyzer {
    modality: CueModality,
    uploader: Uploader,
    client: Arc<dyn InferenceClient>,
}

impl CueAnalyzer {
    pub fn new(
        modality: CueModality,
        uploader: Uploader,
        client: Arc<dyn InferenceClient>,
    ) -> Self {
        Self {
            modality,
            uploader,
            client,
        }
    }

    pub fn audio(uploader: Uploader, client: Arc<dyn InferenceClient>) -> Self {
        Self::new(CueModality::Audio, uploader, client)
    }

    pub fn video(uploader: Uploader, client: Arc<dyn InferenceClient>) -> Self {
        Self::new(CueModality::Video, uploader, client)
    }

    pub fn modality(&self) -> CueModality {
        self.modality
    }

    pub async fn analyze(&self, media: &MediaFile) -> Result<CueAnalysisResult, AnalysisError> {
        info!("--- Starting {} Analysis ---", self.modality);

        if media.kind() != self.modality.media_kind() {
            warn!(
                "{} analyzer received {} input {}",
                self.modality,
                media.kind(),
                media.path().display()
            );
        }

        // The uploader has already released anything it created on failure.
        let handle = self.uploader.acquire(media.path()).await?;

        info!("Generating {} content analysis...", self.modality.label().to_lowercase());
        let response = self.client.generate(self.modality.prompt(), Some(&handle)).await;

        self.uploader.release(handle).await;

        let text = response.map_err(|e| {
            error!("Error during {} analysis: {}", self.modality.label().to_lowercase(), e);
            AnalysisError::Inference(e)
        })?;

        let result: CueAnalysisResult = parse_structured(&text)?;
        info!(
            "{} analysis complete: {} proxies detected",
            self.modality,
            result.detected_proxies.len()
        );
        Ok(result)
    }
}
