//! Aggregation of LLM-generated review hints
//!
//! The backend stores the LLM reviewer output as JSON of the form
//! `{ "summary": ..., "hints": { "critical": [...], "structure": [...], "styling": [...] } }`
//! where every hint is `{ "lines": [..], "hint": ".." }`. This module turns that
//! into one formatted advisory view.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::annotation::LineKey;
use crate::{Error, Result};

/// Hint categories, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintCategory {
    /// Bugs and correctness problems
    Critical,
    /// Code organisation
    Structure,
    /// Naming and formatting
    Styling,
}

impl HintCategory {
    /// All categories in the fixed order they are presented
    pub const ALL: [HintCategory; 3] = [
        HintCategory::Critical,
        HintCategory::Structure,
        HintCategory::Styling,
    ];

    /// Key used in the LLM response
    pub fn key(&self) -> &'static str {
        match self {
            HintCategory::Critical => "critical",
            HintCategory::Structure => "structure",
            HintCategory::Styling => "styling",
        }
    }

    /// Section heading
    pub fn title(&self) -> &'static str {
        match self {
            HintCategory::Critical => "Critical",
            HintCategory::Structure => "Structure",
            HintCategory::Styling => "Styling",
        }
    }

    /// Text shown in place of an absent section
    pub fn placeholder(&self) -> &'static str {
        match self {
            HintCategory::Critical => "No critical hints",
            HintCategory::Structure => "No structure hints",
            HintCategory::Styling => "No styling hints",
        }
    }
}

impl fmt::Display for HintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A suggestion anchored to one or more lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    /// Lines the hint refers to, in the order the LLM listed them
    pub lines: Vec<LineKey>,
    /// Hint text
    pub hint: String,
}

impl Hint {
    /// `"Line(s): 2, 5\n<hint>\n"`
    pub fn format(&self) -> String {
        let lines = self
            .lines
            .iter()
            .map(LineKey::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("Line(s): {}\n{}\n", lines, self.hint)
    }
}

/// One non-empty category of the advisory view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintSection {
    /// Category of every hint in this section
    pub category: HintCategory,
    /// Hints in backend order
    pub hints: Vec<Hint>,
    /// Formatted hints separated by blank lines
    pub formatted_text: String,
}

/// Summary plus the non-empty hint sections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedHints {
    /// LLM summary, trimmed
    pub summary: String,
    /// Sections in [`HintCategory::ALL`] order; empty categories are omitted
    pub sections: Vec<HintSection>,
}

impl AggregatedHints {
    /// Section for `category`, if it had any hints
    pub fn section(&self, category: HintCategory) -> Option<&HintSection> {
        self.sections.iter().find(|s| s.category == category)
    }

    /// Total number of hints across all sections
    pub fn hint_count(&self) -> usize {
        self.sections.iter().map(|s| s.hints.len()).sum()
    }

    /// Advisory pane text with placeholders for absent parts
    pub fn render(&self) -> String {
        let mut out = String::from("Summary:\n");
        if self.summary.is_empty() {
            out.push_str("No summary\n");
        } else {
            out.push_str(&self.summary);
            out.push('\n');
        }

        for category in HintCategory::ALL {
            out.push('\n');
            out.push_str(category.title());
            out.push_str(":\n");
            match self.section(category) {
                Some(section) => out.push_str(&section.formatted_text),
                None => {
                    out.push_str(category.placeholder());
                    out.push('\n');
                }
            }
        }

        out
    }
}

/// Merge the three hint categories and the summary into one view
///
/// Fails with [`Error::MissingHintData`] when `raw` has no `hints` object.
/// A category that is present but malformed is dropped with a warning.
pub fn aggregate(raw: &Value) -> Result<AggregatedHints> {
    let hints = raw
        .get("hints")
        .and_then(Value::as_object)
        .ok_or(Error::MissingHintData)?;

    let summary = raw
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    let mut sections = Vec::new();
    for category in HintCategory::ALL {
        let Some(value) = hints.get(category.key()) else {
            continue;
        };

        let parsed = match parse_category(value) {
            Ok(parsed) => parsed,
            Err(reason) => {
                warn!(category = %category, reason = %reason, "Dropping malformed hint category");
                continue;
            }
        };

        if parsed.is_empty() {
            continue;
        }

        let formatted_text = parsed
            .iter()
            .map(Hint::format)
            .collect::<Vec<_>>()
            .join("\n");

        sections.push(HintSection {
            category,
            hints: parsed,
            formatted_text,
        });
    }

    Ok(AggregatedHints { summary, sections })
}

/// Aggregate the JSON-encoded `content` string of an LLM response
pub fn aggregate_content(content: &str) -> Result<AggregatedHints> {
    let raw: Value = serde_json::from_str(content)?;
    aggregate(&raw)
}

fn parse_category(value: &Value) -> std::result::Result<Vec<Hint>, String> {
    let hints: Vec<Hint> = Vec::<Hint>::deserialize(value).map_err(|e| e.to_string())?;
    if let Some(position) = hints.iter().position(|h| h.lines.is_empty()) {
        return Err(format!("hint {} has no lines", position + 1));
    }
    Ok(hints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_categories_produce_no_sections() {
        let raw = json!({
            "summary": "  Looks fine overall.\n",
            "hints": { "critical": [], "structure": [], "styling": [] }
        });
        let result = aggregate(&raw).unwrap();
        assert!(result.sections.is_empty());
        assert_eq!(result.summary, "Looks fine overall.");
    }

    #[test]
    fn test_single_hint_exact_format() {
        let raw = json!({
            "summary": "s",
            "hints": {
                "critical": [{ "lines": [2, 5], "hint": "fix this" }],
                "structure": [],
                "styling": []
            }
        });
        let result = aggregate(&raw).unwrap();
        assert_eq!(result.sections.len(), 1);
        let section = result.section(HintCategory::Critical).unwrap();
        assert_eq!(section.formatted_text, "Line(s): 2, 5\nfix this\n");
    }

    #[test]
    fn test_hints_joined_by_blank_line_in_order() {
        let raw = json!({
            "summary": "",
            "hints": {
                "critical": [],
                "structure": [
                    { "lines": [9], "hint": "split function" },
                    { "lines": [1, 3], "hint": "move imports" }
                ],
                "styling": [{ "lines": [4], "hint": "snake_case" }]
            }
        });
        let result = aggregate(&raw).unwrap();
        let categories: Vec<_> = result.sections.iter().map(|s| s.category).collect();
        assert_eq!(categories, vec![HintCategory::Structure, HintCategory::Styling]);
        assert_eq!(
            result.sections[0].formatted_text,
            "Line(s): 9\nsplit function\n\nLine(s): 1, 3\nmove imports\n"
        );
        assert_eq!(result.hint_count(), 3);
    }

    #[test]
    fn test_missing_hints_key() {
        let raw = json!({ "summary": "no hints here" });
        assert!(matches!(aggregate(&raw), Err(Error::MissingHintData)));
    }

    #[test]
    fn test_malformed_category_degrades() {
        let raw = json!({
            "summary": "partial",
            "hints": {
                "critical": "not a list",
                "structure": [{ "lines": [], "hint": "no anchor" }],
                "styling": [{ "lines": [1], "hint": "indentation" }]
            }
        });
        let result = aggregate(&raw).unwrap();
        assert!(result.section(HintCategory::Critical).is_none());
        assert!(result.section(HintCategory::Structure).is_none());
        assert!(result.section(HintCategory::Styling).is_some());
    }

    #[test]
    fn test_non_positive_line_degrades_category() {
        let raw = json!({
            "hints": { "critical": [{ "lines": [0], "hint": "bad anchor" }] }
        });
        let result = aggregate(&raw).unwrap();
        assert!(result.sections.is_empty());
        assert_eq!(result.summary, "");
    }

    #[test]
    fn test_aggregate_content_string() {
        let content = r#"{"summary":"ok","hints":{"critical":[{"lines":[3],"hint":"null deref"}],"structure":[],"styling":[]}}"#;
        let result = aggregate_content(content).unwrap();
        assert_eq!(result.hint_count(), 1);
        assert!(aggregate_content("not json").is_err());
    }

    #[test]
    fn test_render_uses_placeholders() {
        let result = AggregatedHints {
            summary: String::new(),
            sections: vec![HintSection {
                category: HintCategory::Styling,
                hints: vec![Hint {
                    lines: vec![LineKey::new(1).unwrap()],
                    hint: "trailing whitespace".to_string(),
                }],
                formatted_text: "Line(s): 1\ntrailing whitespace\n".to_string(),
            }],
        };
        let rendered = result.render();
        assert!(rendered.starts_with("Summary:\nNo summary\n"));
        assert!(rendered.contains("Critical:\nNo critical hints\n"));
        assert!(rendered.contains("Structure:\nNo structure hints\n"));
        assert!(rendered.ends_with("Styling:\nLine(s): 1\ntrailing whitespace\n"));
    }
}
