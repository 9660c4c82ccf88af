//! Cue analysis and final score models.
//!
//! Both result types are parsed from model output, so every field is
//! tolerant: missing text becomes empty, missing proxies become an empty
//! list, and a score that is absent, non-numeric or outside 0-10 is `None`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Lowest and highest score the model is asked to produce.
pub const SCORE_RANGE: (f64, f64) = (0.0, 10.0);

/// Result of analyzing one modality (audio or video).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CueAnalysisResult {
    /// Free-text analysis
    #[serde(default, deserialize_with = "deserialize_text")]
    pub analysis: String,
    /// Behavioral proxies the model reports, in the order given
    #[serde(default, deserialize_with = "deserialize_proxies")]
    pub detected_proxies: Vec<String>,
    /// 0 (truthful) to 10 (deceptive)
    #[serde(default, deserialize_with = "deserialize_score")]
    pub deception_score: Option<f64>,
}

/// Synthesized result combining both modalities.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FinalScoreResult {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub summary: String,
    /// 0 (very truthful) to 10 (very deceptive)
    #[serde(default, deserialize_with = "deserialize_score")]
    pub truth_score: Option<f64>,
}

/// Render a score for prompts and reports, `N/A` when absent.
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) if s.fract() == 0.0 => format!("{}", s as i64),
        Some(s) => format!("{}", s),
        None => "N/A".to_string(),
    }
}

fn deserialize_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

fn deserialize_proxies<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}

fn deserialize_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    let score = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(score.filter(|s| s.is_finite() && *s >= SCORE_RANGE.0 && *s <= SCORE_RANGE.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_cue_result() {
        let result: CueAnalysisResult = serde_json::from_value(json!({
            "analysis": "Frequent pauses before answers.",
            "detected_proxies": ["hesitation", "filler words"],
            "deception_score": 6
        }))
        .unwrap();

        assert_eq!(result.detected_proxies, vec!["hesitation", "filler words"]);
        assert_eq!(result.deception_score, Some(6.0));
    }

    #[test]
    fn test_missing_fields_default() {
        let result: CueAnalysisResult = serde_json::from_value(json!({})).unwrap();
        assert!(result.analysis.is_empty());
        assert!(result.detected_proxies.is_empty());
        assert_eq!(result.deception_score, None);
    }

    #[test]
    fn test_null_proxies_become_empty() {
        let result: CueAnalysisResult = serde_json::from_value(json!({
            "analysis": "calm",
            "detected_proxies": null,
            "deception_score": null
        }))
        .unwrap();
        assert!(result.detected_proxies.is_empty());
        assert_eq!(result.deception_score, None);
    }

    #[test]
    fn test_score_accepts_numeric_strings() {
        let result: FinalScoreResult =
            serde_json::from_value(json!({"summary": "s", "truth_score": " 7.5 "})).unwrap();
        assert_eq!(result.truth_score, Some(7.5));
    }

    #[test]
    fn test_score_rejects_out_of_range_and_text() {
        let high: FinalScoreResult =
            serde_json::from_value(json!({"summary": "s", "truth_score": 42})).unwrap();
        assert_eq!(high.truth_score, None);

        let text: CueAnalysisResult =
            serde_json::from_value(json!({"deception_score": "very high"})).unwrap();
        assert_eq!(text.deception_score, None);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(Some(7.0)), "7");
        assert_eq!(format_score(Some(6.5)), "6.5");
        assert_eq!(format_score(None), "N/A");
    }
}
