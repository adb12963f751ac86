//! Wire shapes for detector output.
//!
//! Everything in this module is untrusted input. Candidates cross into the
//! rest of the pipeline only through the validator; decoding is lenient
//! (every field optional, unknown fields ignored, several spellings
//! tolerated) so a detector's formatting variance costs findings as rarely
//! as possible.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// One unvalidated finding proposed by a detector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Candidate {
    /// Some detectors answer with an explicit yes/no flag; `false` means
    /// "no finding" and the candidate is discarded at decode time.
    pub detected: Option<bool>,

    /// The detector's self-reported category label. Ignored: the category a
    /// candidate is charged to is the one its detector was asked about.
    pub smell_type: Option<String>,

    #[serde(alias = "Description")]
    pub description: Option<String>,

    pub method_name: Option<String>,
    pub identifier_name: Option<String>,

    #[serde(alias = "line_number", alias = "Line_no", alias = "line")]
    pub line_no: Option<u32>,
    pub line_start: Option<u32>,
    pub line_end: Option<u32>,

    #[serde(alias = "line_count")]
    pub total_lines: Option<u32>,
    pub cyclomatic_complexity: Option<u32>,
    pub parameter_count: Option<u32>,
    #[serde(alias = "logical_operator_count")]
    pub logical_operators: Option<u32>,
    pub line_length: Option<u32>,
    #[serde(alias = "identifier_length")]
    pub length: Option<u32>,
    pub lambda_length: Option<u32>,
    pub chain_length: Option<u32>,
    pub magic_number: Option<f64>,

    pub suggestion: Option<String>,
}

impl Candidate {
    /// Best line evidence the candidate carries: an explicit line number, or
    /// the start of a self-reported range.
    pub fn raw_line(&self) -> Option<u32> {
        self.line_no.or(self.line_start)
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// The report envelope detectors are instructed to return.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateReport {
    #[serde(alias = "code_smells", alias = "findings")]
    pub detections: Vec<Candidate>,
    pub analysis_summary: Option<String>,
}

/// Decodes a detector payload into candidates. Tries the typed envelope,
/// then a single bare candidate, then one best-effort recovery pass over
/// the raw JSON (bare arrays and common wrapper keys). Candidates flagged
/// `detected: false` are dropped here.
pub fn decode_candidates(content: &str) -> Result<Vec<Candidate>, String> {
    if let Ok(report) = serde_json::from_str::<CandidateReport>(content) {
        if !report.detections.is_empty() || report.analysis_summary.is_some() {
            return Ok(keep_detected(report.detections));
        }
    }

    if let Ok(single) = serde_json::from_str::<Candidate>(content) {
        if !is_vacant(&single) {
            return Ok(keep_detected(vec![single]));
        }
    }

    recover_from_value(content)
}

/// A decoded-but-empty candidate usually means the payload was some other
/// shape that happened to satisfy the all-optional struct.
fn is_vacant(candidate: &Candidate) -> bool {
    candidate.detected.is_none()
        && candidate.description.is_none()
        && candidate.method_name.is_none()
        && candidate.identifier_name.is_none()
        && candidate.raw_line().is_none()
}

fn keep_detected(candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|c| c.detected != Some(false))
        .collect()
}

fn recover_from_value(content: &str) -> Result<Vec<Candidate>, String> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| format!("payload is not JSON: {}", e))?;

    let items = match &value {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => {
            let list = ["detections", "code_smells", "findings", "results"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_array));
            match list {
                Some(items) => items.as_slice(),
                None => return Err("no candidate list in payload".to_string()),
            }
        }
        _ => return Err("payload is neither a list nor an object".to_string()),
    };

    let mut candidates = Vec::new();
    let mut skipped = 0usize;
    for item in items {
        match serde_json::from_value::<Candidate>(item.clone()) {
            Ok(candidate) => candidates.push(candidate),
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, "dropped undecodable candidate elements");
    }

    if candidates.is_empty() && skipped > 0 {
        return Err("no decodable candidates in payload".to_string());
    }

    Ok(keep_detected(candidates))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_typed_envelope() {
        let content = r#"{
            "detections": [
                {"detected": true, "smell_type": "long_method", "method_name": "load",
                 "total_lines": 80, "description": "Method 'load' has 80 lines"}
            ],
            "analysis_summary": "one long method"
        }"#;
        let candidates = decode_candidates(content).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].method_name.as_deref(), Some("load"));
        assert_eq!(candidates[0].total_lines, Some(80));
    }

    #[test]
    fn test_decode_single_candidate() {
        let content = r#"{"detected": true, "method_name": "setup", "parameter_count": 6}"#;
        let candidates = decode_candidates(content).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].parameter_count, Some(6));
    }

    #[test]
    fn test_not_detected_yields_empty() {
        let content = r#"{"detected": false, "smell_type": "long_method"}"#;
        let candidates = decode_candidates(content).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_bare_list_recovery() {
        let content = r#"[
            {"method_name": "a", "line_number": 4},
            {"method_name": "b", "line_number": 9}
        ]"#;
        let candidates = decode_candidates(content).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].raw_line(), Some(9));
    }

    #[test]
    fn test_alias_spellings() {
        let content = r#"{"detections": [
            {"Description": "Identifier 'x' is long", "identifier_name": "x",
             "identifier_length": 25, "line": 7}
        ]}"#;
        let candidates = decode_candidates(content).unwrap();
        assert_eq!(candidates[0].length, Some(25));
        assert_eq!(candidates[0].raw_line(), Some(7));
        assert!(candidates[0].description_text().contains("long"));
    }

    #[test]
    fn test_undecodable_payload_is_error() {
        assert!(decode_candidates("not json at all").is_err());
        assert!(decode_candidates("42").is_err());
        assert!(decode_candidates(r#"{"unrelated": "object"}"#).is_err());
    }

    #[test]
    fn test_partial_recovery_skips_bad_elements() {
        let content = r#"[{"method_name": "ok"}, "garbage", 3]"#;
        let candidates = decode_candidates(content).unwrap();
        assert_eq!(candidates.len(), 1);
    }
}
