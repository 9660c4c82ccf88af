//! In-memory fakes of the inference service and the demuxer.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use veritas_gemini::{GeminiError, GeminiResult, InferenceClient};
use veritas_media::{AudioStreamInfo, ContainerInfo, Demuxer, MediaError, MediaResult};
use veritas_models::{FileState, RemoteFileHandle};

pub const AUDIO_JSON: &str = r#"{"analysis":"Voice is steady.","detected_proxies":["pause"],"deception_score":3}"#;
pub const VIDEO_JSON: &str = r#"```json
{"analysis":"Frequent gaze aversion.","detected_proxies":["gaze aversion","fidgeting"],"deception_score":7}
```"#;
pub const FINAL_JSON: &str = r#"{"summary":"Calm voice but nervous body language.","truth_score":5.5}"#;

/// Key under which text-only generate responses are scripted.
pub const TEXT_ONLY: &str = "text";

/// Handle name the fake assigns to an uploaded path.
pub fn handle_name(path: &Path) -> String {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("files/{}", file)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Register(String),
    GetFile(String),
    Delete(String),
    Generate { prompt: String, file: Option<String> },
}

#[derive(Default)]
struct State {
    registrations: HashMap<String, VecDeque<Result<FileState, u16>>>,
    polls: HashMap<String, VecDeque<Result<FileState, u16>>>,
    responses: HashMap<String, VecDeque<Result<String, u16>>>,
    calls: Vec<Call>,
}

/// Scripted [`InferenceClient`].
///
/// Registration outcomes are keyed by handle name (`files/<file name>`);
/// an unscripted registration or poll yields ACTIVE. Generate responses are
/// keyed by the handle name, or [`TEXT_ONLY`] when no file is attached; an
/// unscripted generate yields a valid result. `Err(status)` becomes
/// [`GeminiError::Http`].
#[derive(Default)]
pub struct FakeInference {
    state: Mutex<State>,
    panic_on_generate: bool,
}

impl FakeInference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn panicking() -> Self {
        Self {
            panic_on_generate: true,
            ..Self::default()
        }
    }

    pub fn script_register(&self, name: &str, outcomes: Vec<Result<FileState, u16>>) {
        self.lock().registrations.insert(name.to_string(), outcomes.into());
    }

    pub fn script_polls(&self, name: &str, outcomes: Vec<Result<FileState, u16>>) {
        self.lock().polls.insert(name.to_string(), outcomes.into());
    }

    pub fn script_generate(&self, key: &str, responses: Vec<Result<&str, u16>>) {
        let responses = responses
            .into_iter()
            .map(|r| r.map(str::to_string))
            .collect();
        self.lock().responses.insert(key.to_string(), responses);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn registrations(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Register(_)))
            .count()
    }

    pub fn polls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::GetFile(_)))
            .count()
    }

    pub fn generations(&self) -> Vec<(String, Option<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Generate { prompt, file } => Some((prompt, file)),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

fn handle(name: &str, state: FileState) -> RemoteFileHandle {
    RemoteFileHandle::new(
        name,
        format!("https://generativelanguage.googleapis.com/v1beta/{}", name),
        state,
    )
}

#[async_trait]
impl InferenceClient for FakeInference {
    async fn register_file(&self, path: &Path) -> GeminiResult<RemoteFileHandle> {
        let name = handle_name(path);
        let outcome = {
            let mut state = self.lock();
            state.calls.push(Call::Register(name.clone()));
            state
                .registrations
                .get_mut(&name)
                .and_then(|q| q.pop_front())
                .unwrap_or(Ok(FileState::Active))
        };
        match outcome {
            Ok(file_state) => Ok(handle(&name, file_state)),
            Err(status) => Err(GeminiError::http(status, "scripted failure")),
        }
    }

    async fn get_file(&self, name: &str) -> GeminiResult<RemoteFileHandle> {
        let outcome = {
            let mut state = self.lock();
            state.calls.push(Call::GetFile(name.to_string()));
            state
                .polls
                .get_mut(name)
                .and_then(|q| q.pop_front())
                .unwrap_or(Ok(FileState::Active))
        };
        match outcome {
            Ok(file_state) => Ok(handle(name, file_state)),
            Err(status) => Err(GeminiError::http(status, "scripted failure")),
        }
    }

    async fn delete_file(&self, name: &str) -> GeminiResult<()> {
        self.lock().calls.push(Call::Delete(name.to_string()));
        Ok(())
    }

    async fn generate(
        &self,
        prompt: &str,
        file: Option<&RemoteFileHandle>,
    ) -> GeminiResult<String> {
        let file_name = file.map(|h| h.name.clone());
        let key = file_name.clone().unwrap_or_else(|| TEXT_ONLY.to_string());
        let scripted = {
            let mut state = self.lock();
            state.calls.push(Call::Generate {
                prompt: prompt.to_string(),
                file: file_name.clone(),
            });
            state.responses.get_mut(&key).and_then(|q| q.pop_front())
        };

        if self.panic_on_generate {
            panic!("inference backend crashed");
        }

        match scripted {
            Some(Ok(text)) => Ok(text),
            Some(Err(status)) => Err(GeminiError::http(status, "scripted failure")),
            None if file_name.is_some() => Ok(AUDIO_JSON.to_string()),
            None => Ok(FINAL_JSON.to_string()),
        }
    }
}

/// [`Demuxer`] that writes a few bytes instead of running FFmpeg.
pub struct FakeDemuxer {
    has_audio: bool,
    fail_write: bool,
    written: Mutex<Vec<PathBuf>>,
}

impl FakeDemuxer {
    pub fn with_audio() -> Self {
        Self {
            has_audio: true,
            fail_write: false,
            written: Mutex::new(Vec::new()),
        }
    }

    pub fn silent() -> Self {
        Self {
            has_audio: false,
            ..Self::with_audio()
        }
    }

    /// Writes a partial file, then fails.
    pub fn failing() -> Self {
        Self {
            fail_write: true,
            ..Self::with_audio()
        }
    }

    pub fn written(&self) -> Vec<PathBuf> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl Demuxer for FakeDemuxer {
    async fn probe(&self, input: &Path) -> MediaResult<ContainerInfo> {
        if !input.exists() {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }
        Ok(ContainerInfo {
            duration: 12.0,
            has_video: true,
            audio: self.has_audio.then(|| AudioStreamInfo {
                codec: "aac".to_string(),
                sample_rate: Some(44_100),
                channels: Some(2),
            }),
        })
    }

    async fn write_audio(&self, _input: &Path, output: &Path) -> MediaResult<()> {
        self.written.lock().unwrap().push(output.to_path_buf());
        if self.fail_write {
            tokio::fs::write(output, b"ID3").await?;
            return Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with status 1",
                Some("Conversion failed!".to_string()),
                Some(1),
            ));
        }
        tokio::fs::write(output, b"ID3fake-mp3-frames").await?;
        Ok(())
    }
}
