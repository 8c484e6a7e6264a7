//! Core domain types for textlens
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Domain variant** | One of four prompt/temperature presets selecting the analytical lens |
//! | **Analysis result** | The structured output of one successful pipeline run |
//! | **Outline** | The recursive topic/sub-topic tree produced alongside the flat fields |
//! | **Attempt** | One orchestration run (success or failure) as persisted in the store |
//! | **Attribution** | Associating an action item with its most likely owner |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of the root node of every outline tree.
pub const OUTLINE_ROOT_ID: &str = "root";

// ============================================
// Domain variant
// ============================================

/// Analytical lens applied by the completion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainVariant {
    General,
    Sales,
    Education,
    Medical,
}

impl Default for DomainVariant {
    fn default() -> Self {
        DomainVariant::General
    }
}

/// Sampling parameters for one completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionBudget {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl DomainVariant {
    /// Returns the identifier used in storage and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainVariant::General => "general",
            DomainVariant::Sales => "sales",
            DomainVariant::Education => "education",
            DomainVariant::Medical => "medical",
        }
    }

    /// Returns the display name for this variant
    pub fn display_name(&self) -> &'static str {
        match self {
            DomainVariant::General => "Text Analysis",
            DomainVariant::Sales => "Sales Analysis",
            DomainVariant::Education => "Education Analysis",
            DomainVariant::Medical => "Medical Analysis",
        }
    }

    /// One-sentence lens injected into the prompt preamble.
    pub fn lens(&self) -> &'static str {
        match self {
            DomainVariant::General => {
                "Extract the key points of the text for a general audience."
            }
            DomainVariant::Sales => {
                "Focus on customer needs, sales strategy and closing opportunities."
            }
            DomainVariant::Education => {
                "Focus on knowledge points, study advice and teaching improvements."
            }
            DomainVariant::Medical => {
                "Focus on symptoms, diagnostic hints and treatment considerations."
            }
        }
    }

    /// Temperature/length preset for this variant.
    pub fn budget(&self) -> CompletionBudget {
        match self {
            DomainVariant::General => CompletionBudget {
                temperature: 0.7,
                max_tokens: 2000,
            },
            DomainVariant::Sales => CompletionBudget {
                temperature: 0.5,
                max_tokens: 2000,
            },
            DomainVariant::Education => CompletionBudget {
                temperature: 0.6,
                max_tokens: 2000,
            },
            DomainVariant::Medical => CompletionBudget {
                temperature: 0.3,
                max_tokens: 2000,
            },
        }
    }
}

impl std::fmt::Display for DomainVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DomainVariant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "general" => Ok(DomainVariant::General),
            "sales" => Ok(DomainVariant::Sales),
            "education" => Ok(DomainVariant::Education),
            "medical" => Ok(DomainVariant::Medical),
            _ => Err(format!("unknown domain variant: {}", s)),
        }
    }
}

// ============================================
// Analysis request / result
// ============================================

/// One incoming analysis call. Created per request, never persisted standalone.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Free-form input text (must be non-empty after trimming)
    pub text: String,
    /// Which analytical lens to apply
    pub variant: DomainVariant,
}

impl AnalysisRequest {
    pub fn new(text: impl Into<String>, variant: DomainVariant) -> Self {
        Self {
            text: text.into(),
            variant,
        }
    }
}

/// A question/answer pair extracted from the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// One node of the hierarchical outline. Recursive, no cycles; the root
/// carries [`OUTLINE_ROOT_ID`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineNode {
    /// Unique within one tree
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub children: Vec<OutlineNode>,
}

impl Default for OutlineNode {
    fn default() -> Self {
        Self {
            id: OUTLINE_ROOT_ID.to_string(),
            label: String::new(),
            children: Vec::new(),
        }
    }
}

/// Structured output of one successful pipeline run.
///
/// Every list field may be empty; absence of data is a valid terminal state,
/// not an error. Immutable once produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub todos: Vec<String>,
    #[serde(default, rename = "summaryParagraphs")]
    pub summary_paragraphs: Vec<String>,
    #[serde(default)]
    pub qa: Vec<QaPair>,
    #[serde(default)]
    pub outline: OutlineNode,
}

impl AnalysisResult {
    /// Illustrative payload returned alongside failures so that every
    /// response carries the same shape.
    pub fn placeholder() -> Self {
        Self {
            themes: vec!["Example theme".to_string()],
            people: vec!["Example participant".to_string()],
            todos: vec!["Example action item".to_string()],
            summary_paragraphs: vec!["This is an example summary paragraph.".to_string()],
            qa: vec![QaPair {
                question: "Example question".to_string(),
                answer: "Example answer".to_string(),
            }],
            outline: OutlineNode {
                id: OUTLINE_ROOT_ID.to_string(),
                label: "Example topic".to_string(),
                children: vec![
                    OutlineNode {
                        id: "n1".to_string(),
                        label: "Example point 1".to_string(),
                        children: vec![OutlineNode {
                            id: "n1_1".to_string(),
                            label: "Example detail 1".to_string(),
                            children: vec![],
                        }],
                    },
                    OutlineNode {
                        id: "n2".to_string(),
                        label: "Example point 2".to_string(),
                        children: vec![OutlineNode {
                            id: "n2_1".to_string(),
                            label: "Example detail 2".to_string(),
                            children: vec![],
                        }],
                    },
                ],
            },
        }
    }
}

// ============================================
// Persisted attempts
// ============================================

/// Outcome class of a persisted attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    Success,
    Error,
}

impl AttemptStatus {
    /// Convert to string for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::Success => "success",
            AttemptStatus::Error => "error",
        }
    }

    /// Parse status string from storage.
    pub fn from_storage(value: &str) -> Self {
        match value {
            "success" => AttemptStatus::Success,
            _ => AttemptStatus::Error,
        }
    }
}

/// An attempt as handed to the store: everything except the store-assigned
/// identifier and timestamp.
///
/// Invariant: `result` is `Some` exactly when the attempt succeeded, and
/// `error_message` is `Some` exactly when it failed. The constructors are the
/// only way to build one, so the invariant holds by construction.
#[derive(Debug, Clone)]
pub struct AttemptDraft {
    pub variant: DomainVariant,
    pub input_text: String,
    pub result: Option<AnalysisResult>,
    pub error_message: Option<String>,
}

impl AttemptDraft {
    /// Draft for a successful run.
    pub fn success(request: &AnalysisRequest, result: AnalysisResult) -> Self {
        Self {
            variant: request.variant,
            input_text: request.text.clone(),
            result: Some(result),
            error_message: None,
        }
    }

    /// Draft for a failed run. The stored result is the empty structure.
    pub fn failure(request: &AnalysisRequest, error_message: impl Into<String>) -> Self {
        Self {
            variant: request.variant,
            input_text: request.text.clone(),
            result: None,
            error_message: Some(error_message.into()),
        }
    }

    pub fn status(&self) -> AttemptStatus {
        if self.result.is_some() {
            AttemptStatus::Success
        } else {
            AttemptStatus::Error
        }
    }
}

/// One orchestration attempt as persisted in the store.
///
/// Created once per run, immutable after creation, deletable by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisAttempt {
    /// Store-assigned identifier
    pub id: String,
    /// Store-assigned creation time
    pub created_at: DateTime<Utc>,
    pub variant: DomainVariant,
    pub input_text: String,
    /// `None` for error attempts (stored as the empty object)
    pub result: Option<AnalysisResult>,
    pub status: AttemptStatus,
    pub error_message: Option<String>,
}
