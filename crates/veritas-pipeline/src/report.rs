//! Human-readable report rendering.

use std::fmt::Write;

use serde::Serialize;
use veritas_models::format_score;

use crate::pipeline::{PipelineReport, StageFailure};

const HEADER: &str = "============ FINAL REPORT ============";
const FOOTER: &str = "======================================";

/// Render `report` as the text printed on stdout.
pub fn render(report: &PipelineReport) -> String {
    let mut out = String::new();

    match report {
        PipelineReport::Complete {
            audio,
            video,
            final_score,
            synthesis_error,
        } => {
            let _ = writeln!(out, "\n{}", HEADER);
            push_block(&mut out, "Audio Analysis", audio);
            push_block(&mut out, "Video Analysis", video);
            push_block(&mut out, "Combined Analysis", final_score);
            let _ = writeln!(out, "{}", FOOTER);

            if let Some(failure) = synthesis_error {
                let _ = writeln!(out, "\nCould not produce a final score.");
                push_failure(&mut out, failure);
            } else if let Some(score) = final_score {
                let _ = writeln!(
                    out,
                    "\n>>>> Final Truth Score (0-10): {} <<<<",
                    format_score(score.truth_score)
                );
            }
        }
        PipelineReport::Partial {
            audio,
            video,
            failures,
        } => {
            let _ = writeln!(out, "\n--- Analysis Incomplete ---");
            let _ = writeln!(
                out,
                "Could not perform the final analysis because one or both initial analyses failed."
            );
            if let Some(audio) = audio {
                push_block(&mut out, "Audio Analysis (Partial)", audio);
            }
            if let Some(video) = video {
                push_block(&mut out, "Video Analysis (Partial)", video);
            }
            if !failures.is_empty() {
                let _ = writeln!(out, "\nFailures:");
                for failure in failures {
                    push_failure(&mut out, failure);
                }
            }
        }
        PipelineReport::Aborted { reason } => {
            let _ = writeln!(out, "\n--- Analysis Aborted ---");
            let _ = writeln!(out, "{}", reason);
        }
    }

    out
}

fn push_block<T: Serialize>(out: &mut String, label: &str, value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<{}>", e));
    let _ = writeln!(out, "\n--- {} ---", label);
    let _ = writeln!(out, "{}", json);
}

fn push_failure(out: &mut String, failure: &StageFailure) {
    let _ = writeln!(out, "- {}", failure);
    if let Some(raw) = &failure.raw_response {
        let _ = writeln!(out, "  Raw response: {}", raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineStage;
    use veritas_models::{CueAnalysisResult, FinalScoreResult};

    fn analysis(text: &str, score: f64) -> CueAnalysisResult {
        CueAnalysisResult {
            analysis: text.to_string(),
            detected_proxies: vec!["hesitation".to_string()],
            deception_score: Some(score),
        }
    }

    #[test]
    fn test_complete_report() {
        let report = PipelineReport::Complete {
            audio: analysis("steady voice", 2.0),
            video: analysis("calm posture", 3.0),
            final_score: Some(FinalScoreResult {
                summary: "Both modalities agree.".to_string(),
                truth_score: Some(2.5),
            }),
            synthesis_error: None,
        };

        let text = render(&report);
        assert!(text.contains(HEADER));
        assert!(text.contains("--- Audio Analysis ---"));
        assert!(text.contains("--- Video Analysis ---"));
        assert!(text.contains("--- Combined Analysis ---"));
        assert!(text.contains("\"summary\": \"Both modalities agree.\""));
        assert!(text.contains(">>>> Final Truth Score (0-10): 2.5 <<<<"));
    }

    #[test]
    fn test_complete_report_without_score() {
        let report = PipelineReport::Complete {
            audio: analysis("a", 1.0),
            video: analysis("v", 1.0),
            final_score: Some(FinalScoreResult {
                summary: "unsure".to_string(),
                truth_score: None,
            }),
            synthesis_error: None,
        };
        assert!(render(&report).contains(">>>> Final Truth Score (0-10): N/A <<<<"));
    }

    #[test]
    fn test_failed_synthesis_prints_null_block_and_no_score() {
        let report = PipelineReport::Complete {
            audio: analysis("a", 1.0),
            video: analysis("v", 1.0),
            final_score: None,
            synthesis_error: Some(StageFailure {
                stage: PipelineStage::Synthesizing,
                message: "expected value at line 1 column 1".to_string(),
                raw_response: Some("I cannot answer".to_string()),
            }),
        };

        let text = render(&report);
        assert!(text.contains("--- Combined Analysis ---\nnull"));
        assert!(text.contains("Raw response: I cannot answer"));
        assert!(!text.contains("Final Truth Score"));
    }

    #[test]
    fn test_partial_report() {
        let report = PipelineReport::Partial {
            audio: None,
            video: Some(analysis("fidgety", 7.0)),
            failures: vec![StageFailure {
                stage: PipelineStage::AnalyzingAudio,
                message: "upload failed".to_string(),
                raw_response: None,
            }],
        };

        let text = render(&report);
        assert!(text.contains("--- Analysis Incomplete ---"));
        assert!(text.contains("--- Video Analysis (Partial) ---"));
        assert!(!text.contains("Audio Analysis (Partial)"));
        assert!(text.contains("- [analyzing_audio] upload failed"));
        assert!(!text.contains(HEADER));
    }

    #[test]
    fn test_aborted_report() {
        let text = render(&PipelineReport::Aborted {
            reason: "no audio track".to_string(),
        });
        assert!(text.contains("--- Analysis Aborted ---"));
        assert!(text.contains("no audio track"));
    }
}
