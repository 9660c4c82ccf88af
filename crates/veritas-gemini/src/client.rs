//! Gemini API client.

use std::path::Path;

use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Body, Client, Method, RequestBuilder, Response};
use tracing::{debug, info};
use veritas_models::RemoteFileHandle;

use crate::config::GeminiConfig;
use crate::error::{GeminiError, GeminiResult};
use crate::types::{
    guess_mime_type, Content, GenerateRequest, GenerateResponse, GenerationConfig, Part,
    UploadFileMetadata, UploadFileResponse, UploadStartRequest,
};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Remote inference capability the pipeline is written against.
///
/// Mirrors the four calls the hosted model offers: register a file, refresh
/// its state, delete it, and generate text from a prompt with an optional
/// file reference.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Upload a local file. The returned handle is usually still pending.
    async fn register_file(&self, path: &Path) -> GeminiResult<RemoteFileHandle>;

    /// Fetch the current state of a registered file.
    async fn get_file(&self, name: &str) -> GeminiResult<RemoteFileHandle>;

    /// Delete a registered file.
    async fn delete_file(&self, name: &str) -> GeminiResult<()>;

    /// Generate text for `prompt`, optionally grounded on an uploaded file.
    async fn generate(
        &self,
        prompt: &str,
        file: Option<&RemoteFileHandle>,
    ) -> GeminiResult<String>;
}

/// Gemini REST API client.
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(config: GeminiConfig) -> GeminiResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(GeminiError::from)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn resource_url(&self, name: &str) -> String {
        format!("{}/v1beta/{}", self.config.base_url, name)
    }

    /// Start a request carrying the API key.
    ///
    /// The key travels in a header, never in the URL, so it cannot end up in
    /// error messages or logs.
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(API_KEY_HEADER, self.config.api_key())
    }

    /// Start a resumable upload session and return its upload URL.
    async fn start_upload(
        &self,
        display_name: &str,
        mime_type: &str,
        size: u64,
    ) -> GeminiResult<String> {
        let url = format!("{}/upload/v1beta/files", self.config.base_url);

        let response = self
            .request(Method::POST, &url)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&UploadStartRequest {
                file: UploadFileMetadata {
                    display_name: display_name.to_string(),
                },
            })
            .send()
            .await?;

        let response = ensure_success(response).await?;

        response
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| GeminiError::invalid_response("upload start returned no upload URL"))
    }
}

#[async_trait]
impl InferenceClient for GeminiClient {
    async fn register_file(&self, path: &Path) -> GeminiResult<RemoteFileHandle> {
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = guess_mime_type(&display_name);

        debug!(
            "Starting upload of {} ({} bytes, {})",
            path.display(),
            size,
            mime_type
        );

        let upload_url = self
            .start_upload(&display_name, &mime_type, size)
            .await?;

        let response = self
            .request(Method::POST, &upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header(CONTENT_LENGTH, size)
            .body(Body::from(file))
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let uploaded: UploadFileResponse = response.json().await.map_err(|e| {
            GeminiError::invalid_response(format!(
                "failed to parse upload response: {}",
                e.without_url()
            ))
        })?;

        info!(
            "File uploaded. URI: {}, Name: {}, state: {}",
            uploaded.file.uri, uploaded.file.name, uploaded.file.state
        );
        Ok(uploaded.file)
    }

    async fn get_file(&self, name: &str) -> GeminiResult<RemoteFileHandle> {
        let response = self
            .request(Method::GET, &self.resource_url(name))
            .send()
            .await?;
        let response = ensure_success(response).await?;
        response
            .json()
            .await
            .map_err(|e| {
                GeminiError::invalid_response(format!("failed to parse file: {}", e.without_url()))
            })
    }

    async fn delete_file(&self, name: &str) -> GeminiResult<()> {
        let response = self
            .request(Method::DELETE, &self.resource_url(name))
            .send()
            .await?;
        ensure_success(response).await?;
        debug!("Deleted remote file {}", name);
        Ok(())
    }

    async fn generate(
        &self,
        prompt: &str,
        file: Option<&RemoteFileHandle>,
    ) -> GeminiResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let mut parts = vec![Part::text(prompt)];
        if let Some(handle) = file {
            parts.push(Part::file(handle));
        }

        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        debug!("Calling {} generateContent", self.config.model);

        let response = self
            .request(Method::POST, &url)
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let generated: GenerateResponse = response.json().await.map_err(|e| {
            GeminiError::invalid_response(format!(
                "failed to parse Gemini response: {}",
                e.without_url()
            ))
        })?;

        if let Some(text) = generated.text() {
            return Ok(text);
        }

        let reason = generated
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked: {}", r))
            .or_else(|| {
                generated
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.clone())
                    .map(|r| format!("finish reason: {}", r))
            })
            .unwrap_or_else(|| "no candidates".to_string());

        Err(GeminiError::invalid_response(format!(
            "No content in Gemini response ({})",
            reason
        )))
    }
}

/// Turn a non-2xx response into [`GeminiError::Http`].
async fn ensure_success(response: Response) -> GeminiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GeminiError::http(status.as_u16(), body))
}
