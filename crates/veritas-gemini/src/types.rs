//! Gemini REST request/response types.

use std::path::Path;

use serde::{Deserialize, Serialize};
use veritas_models::RemoteFileHandle;

/// `generateContent` request.
#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "fileData", skip_serializing_if = "Option::is_none")]
    pub file_data: Option<FileData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            file_data: None,
        }
    }

    pub fn file(handle: &RemoteFileHandle) -> Self {
        let mime_type = handle
            .mime_type
            .clone()
            .or_else(|| handle.display_name.as_deref().map(guess_mime_type))
            .unwrap_or_else(|| "application/octet-stream".to_string());

        Self {
            text: None,
            file_data: Some(FileData {
                mime_type,
                file_uri: handle.uri.clone(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FileData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    #[serde(rename = "fileUri")]
    pub file_uri: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    pub response_mime_type: String,
}

/// `generateContent` response.
#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback", default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
    #[serde(rename = "finishReason", default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PromptFeedback {
    #[serde(rename = "blockReason", default)]
    pub block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Metadata sent when starting a resumable upload.
#[derive(Debug, Serialize)]
pub(crate) struct UploadStartRequest {
    pub file: UploadFileMetadata,
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadFileMetadata {
    pub display_name: String,
}

/// Body returned when an upload is finalized.
#[derive(Debug, Deserialize)]
pub(crate) struct UploadFileResponse {
    pub file: RemoteFileHandle,
}

/// Guess a MIME type from a file name's extension.
pub fn guess_mime_type(name: &str) -> String {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        _ => "application/octet-stream",
    }
    .to_string()
}
