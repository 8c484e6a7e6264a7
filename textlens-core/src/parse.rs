//! Decoding of raw completion text into an analysis result
//!
//! The model is prompted for strict JSON but frequently wraps it in a
//! markdown code fence. Stripping tolerates the fence being absent, present
//! only at the start, or present at both ends. A structurally invalid
//! payload is a total failure of the attempt, never a degraded success.

use crate::error::{Error, Result};
use crate::types::AnalysisResult;

/// Decode raw completion text into an [`AnalysisResult`].
///
/// On failure the full raw text is retained in the error for diagnostics.
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult> {
    let cleaned = strip_code_fence(raw);
    serde_json::from_str(cleaned).map_err(|e| Error::MalformedOutput {
        message: e.to_string(),
        raw: raw.to_string(),
    })
}

/// Strip an optional markdown code fence around the payload.
///
/// Handles ```` ```json ````, a bare ```` ``` ````, a fence at the start
/// only, and no fence at all.
fn strip_code_fence(text: &str) -> &str {
    let mut s = text.trim();

    if let Some(rest) = s.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        s = rest.trim_start();
    }

    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim_end();
    }

    s
}
