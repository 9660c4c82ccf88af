//! Remote file handles registered with the inference service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Processing state of a remote file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FileState {
    /// The service is still ingesting the file
    #[default]
    Pending,
    /// The file can be referenced from prompts
    Active,
    /// Server-side processing failed
    Failed,
    /// Any state this client does not recognize
    Unknown,
}

/// Symbolic state names the service may send.
const STATE_NAMES: &[(&str, FileState)] = &[
    ("PROCESSING", FileState::Pending),
    ("PENDING", FileState::Pending),
    ("ACTIVE", FileState::Active),
    ("FAILED", FileState::Failed),
    ("STATE_UNSPECIFIED", FileState::Unknown),
];

/// Static numeric mapping used when the service sends enum ordinals
/// instead of names.
const FALLBACK_STATE_CODES: &[(i64, FileState)] = &[
    (1, FileState::Pending),
    (2, FileState::Active),
    (3, FileState::Failed),
];

impl FileState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileState::Pending => "PENDING",
            FileState::Active => "ACTIVE",
            FileState::Failed => "FAILED",
            FileState::Unknown => "UNKNOWN",
        }
    }

    /// Look up a symbolic state name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        STATE_NAMES
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, state)| *state)
    }

    /// Map a numeric state code through the fallback table.
    pub fn from_code(code: i64) -> Self {
        FALLBACK_STATE_CODES
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, state)| *state)
            .unwrap_or(FileState::Unknown)
    }

    /// Decode a state from its wire representation.
    ///
    /// Names are tried first, then numeric codes (including numeric strings).
    /// Never fails: unrecognized input decodes to [`FileState::Unknown`].
    pub fn from_wire(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::from_name(s).unwrap_or_else(|| {
                s.trim()
                    .parse::<i64>()
                    .map(Self::from_code)
                    .unwrap_or(FileState::Unknown)
            }),
            Value::Number(n) => n.as_i64().map(Self::from_code).unwrap_or(FileState::Unknown),
            _ => FileState::Unknown,
        }
    }

    /// Whether polling can stop.
    pub fn is_settled(&self) -> bool {
        !matches!(self, FileState::Pending)
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for FileState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FileState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_wire(&value))
    }
}

/// A file registered with the remote inference service.
///
/// Field names follow the service's camelCase JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFileHandle {
    /// Server-assigned resource name (e.g. `files/abc123`)
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Retrieval URI used to reference the file from prompts
    #[serde(default)]
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_size",
        skip_serializing_if = "Option::is_none"
    )]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub state: FileState,
}

impl RemoteFileHandle {
    /// Create a handle with only the fields the pipeline relies on.
    pub fn new(name: impl Into<String>, uri: impl Into<String>, state: FileState) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            uri: uri.into(),
            mime_type: None,
            size_bytes: None,
            create_time: None,
            expiration_time: None,
            state,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == FileState::Active
    }
}

/// The service encodes int64 sizes as JSON strings.
fn deserialize_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s.parse().ok(),
        Some(Value::Number(n)) => n.as_u64(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_from_names() {
        assert_eq!(FileState::from_wire(&json!("PROCESSING")), FileState::Pending);
        assert_eq!(FileState::from_wire(&json!("ACTIVE")), FileState::Active);
        assert_eq!(FileState::from_wire(&json!("failed")), FileState::Failed);
        assert_eq!(
            FileState::from_wire(&json!("STATE_UNSPECIFIED")),
            FileState::Unknown
        );
    }

    #[test]
    fn test_state_falls_back_to_numeric_codes() {
        assert_eq!(FileState::from_wire(&json!(1)), FileState::Pending);
        assert_eq!(FileState::from_wire(&json!(2)), FileState::Active);
        assert_eq!(FileState::from_wire(&json!(3)), FileState::Failed);
        assert_eq!(FileState::from_wire(&json!("2")), FileState::Active);
        assert_eq!(FileState::from_wire(&json!(7)), FileState::Unknown);
    }

    #[test]
    fn test_state_never_fails_to_decode() {
        assert_eq!(FileState::from_wire(&json!("ARCHIVED")), FileState::Unknown);
        assert_eq!(FileState::from_wire(&json!(null)), FileState::Unknown);
        assert_eq!(FileState::from_wire(&json!({"x": 1})), FileState::Unknown);
    }

    #[test]
    fn test_only_pending_is_unsettled() {
        assert!(!FileState::Pending.is_settled());
        assert!(FileState::Active.is_settled());
        assert!(FileState::Failed.is_settled());
        assert!(FileState::Unknown.is_settled());
    }

    #[test]
    fn test_handle_from_service_json() {
        let handle: RemoteFileHandle = serde_json::from_value(json!({
            "name": "files/abc123",
            "displayName": "temp_audio_for_clip.mp3",
            "mimeType": "audio/mpeg",
            "sizeBytes": "48213",
            "createTime": "2025-01-10T12:00:00.000000Z",
            "expirationTime": "2025-01-12T12:00:00.000000Z",
            "uri": "https://generativelanguage.googleapis.com/v1beta/files/abc123",
            "state": "PROCESSING"
        }))
        .unwrap();

        assert_eq!(handle.name, "files/abc123");
        assert_eq!(handle.size_bytes, Some(48213));
        assert_eq!(handle.state, FileState::Pending);
        assert!(handle.create_time.is_some());
        assert!(!handle.is_active());
    }

    #[test]
    fn test_handle_without_state_defaults_to_pending() {
        let handle: RemoteFileHandle =
            serde_json::from_value(json!({"name": "files/x", "uri": "u"})).unwrap();
        assert_eq!(handle.state, FileState::Pending);
    }
}
