//! Plain-text rendering of recorded attempts
//!
//! Produces the shareable text form of an analysis: themes, the action-item
//! list with attributed owners, and the summary paragraphs. Failed attempts
//! render their error message instead of fabricated content.

use crate::attribution::attribute;
use crate::types::{AnalysisAttempt, AnalysisResult, AttemptStatus};

/// Render one stored attempt as plain text.
pub fn render_attempt(attempt: &AnalysisAttempt) -> String {
    match (&attempt.result, attempt.status) {
        (Some(result), AttemptStatus::Success) => render_result(result),
        _ => format!(
            "Text analysis result\n\nAnalysis failed: {}\n",
            attempt.error_message.as_deref().unwrap_or("unknown error")
        ),
    }
}

/// Render a decoded payload as plain text.
pub fn render_result(result: &AnalysisResult) -> String {
    let mut out = String::from("Text analysis result\n\n");

    if !result.themes.is_empty() {
        out.push_str("Themes:\n");
        out.push_str(&result.themes.join(", "));
        out.push_str("\n\n");
    }

    out.push_str(&render_todos(result));

    if !result.summary_paragraphs.is_empty() {
        out.push_str("\nSummary:\n");
        for (i, paragraph) in result.summary_paragraphs.iter().enumerate() {
            out.push_str(&format!("{}. {}\n\n", i + 1, paragraph));
        }
    }

    out.trim_end().to_string() + "\n"
}

/// The action-item section. Falls back to the participant list when there
/// are no action items, and to a fixed notice when there is neither.
fn render_todos(result: &AnalysisResult) -> String {
    if !result.todos.is_empty() {
        let mut section = String::from("Action items:\n");
        for (i, todo) in result.todos.iter().enumerate() {
            match attribute(todo, &result.people) {
                Some(owner) => section.push_str(&format!("{}. {} needs to {}\n", i + 1, owner, todo)),
                None => section.push_str(&format!("{}. [unassigned] {}\n", i + 1, todo)),
            }
        }
        section
    } else if !result.people.is_empty() {
        let mut section = String::from("Participants:\n");
        for (i, person) in result.people.iter().enumerate() {
            section.push_str(&format!("{}. {}\n", i + 1, person));
        }
        section
    } else {
        "No content extracted\n".to_string()
    }
}
