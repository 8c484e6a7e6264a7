//! Prompt construction for the completion service
//!
//! Builds a single instruction embedding the input text and a canonical
//! example of the exact output shape. The model is asked for strict JSON;
//! the result parser still tolerates a code-fence wrapper because models
//! add one anyway.

use crate::types::AnalysisRequest;

/// Build the completion instruction for one request.
///
/// The example lists suggest three entries for themes, summaries and Q&A,
/// but people and action items are explicitly uncapped: the instruction
/// tells the model to extract every one it finds.
pub fn build_prompt(request: &AnalysisRequest) -> String {
    format!(
        r#"You are a professional text analysis assistant. {lens}
Analyze the text below and respond with JSON only.

{text}

Respond with exactly this shape:
{{
  "themes": ["theme 1", "theme 2", "theme 3"],
  "people": ["person 1", "person 2", "person 3"],
  "todos": ["action item 1", "action item 2", "action item 3"],
  "summaryParagraphs": ["summary paragraph 1", "summary paragraph 2", "summary paragraph 3"],
  "qa": [
    {{"question": "question 1", "answer": "answer 1"}},
    {{"question": "question 2", "answer": "answer 2"}},
    {{"question": "question 3", "answer": "answer 3"}}
  ],
  "outline": {{
    "id": "root",
    "label": "Topic",
    "children": [
      {{"id": "n1", "label": "Point 1", "children": [{{"id": "n1_1", "label": "Detail 1", "children": []}}]}},
      {{"id": "n2", "label": "Point 2", "children": [{{"id": "n2_1", "label": "Detail 2", "children": []}}]}}
    ]
  }}
}}

Note: do not cap the number of people or action items - extract every one
present in the text. The three-entry lists above are illustrative only."#,
        lens = request.variant.lens(),
        text = request.text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DomainVariant;

    #[test]
    fn test_prompt_embeds_input_text() {
        let request = AnalysisRequest::new(
            "Ana will prepare the quarterly report",
            DomainVariant::General,
        );
        let prompt = build_prompt(&request);
        assert!(prompt.contains("Ana will prepare the quarterly report"));
    }

    #[test]
    fn test_prompt_describes_output_shape() {
        let request = AnalysisRequest::new("some text", DomainVariant::General);
        let prompt = build_prompt(&request);

        for field in [
            "\"themes\"",
            "\"people\"",
            "\"todos\"",
            "\"summaryParagraphs\"",
            "\"qa\"",
            "\"outline\"",
        ] {
            assert!(prompt.contains(field), "prompt should mention {}", field);
        }

        // Outline example demonstrates two levels of nesting
        assert!(prompt.contains("n1_1"));
    }

    #[test]
    fn test_prompt_uncaps_people_and_todos() {
        let request = AnalysisRequest::new("some text", DomainVariant::General);
        let prompt = build_prompt(&request);
        assert!(prompt.contains("do not cap the number of people or action items"));
    }

    #[test]
    fn test_prompt_varies_by_lens() {
        let text = "some text";
        let general = build_prompt(&AnalysisRequest::new(text, DomainVariant::General));
        let sales = build_prompt(&AnalysisRequest::new(text, DomainVariant::Sales));
        assert_ne!(general, sales);
        assert!(sales.contains("customer needs"));
    }
}
