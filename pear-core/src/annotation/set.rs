//! Reviewer comments keyed by source line

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::LineKey;
use crate::{Error, Result};

/// Flat mapping from stringified line number to comment text
///
/// This is the shape the backend persists and later hands back unchanged.
pub type WireAnnotations = BTreeMap<String, String>;

/// A single reviewer comment anchored to one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Line the comment refers to
    pub line: LineKey,
    /// Comment text
    pub text: String,
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.text)
    }
}

/// At most one comment per line, last write wins
///
/// Iteration is always in ascending line order regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireAnnotations", into = "WireAnnotations")]
pub struct AnnotationSet {
    entries: BTreeMap<LineKey, String>,
}

impl AnnotationSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `text` against `line`, replacing any earlier comment there
    pub fn add_annotation(&mut self, line: LineKey, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::EmptyComment);
        }
        self.entries.insert(line, text);
        Ok(())
    }

    /// Comment recorded for `line`, if any
    pub fn get(&self, line: LineKey) -> Option<&str> {
        self.entries.get(&line).map(String::as_str)
    }

    /// `(line, text)` pairs in ascending line order
    ///
    /// The iterator borrows the set, so calling this again restarts from the
    /// lowest line.
    pub fn entries(&self) -> impl Iterator<Item = (LineKey, &str)> + Clone + '_ {
        self.entries.iter().map(|(line, text)| (*line, text.as_str()))
    }

    /// Owned annotations in ascending line order
    pub fn annotations(&self) -> Vec<Annotation> {
        self.entries()
            .map(|(line, text)| Annotation {
                line,
                text: text.to_string(),
            })
            .collect()
    }

    /// Number of annotated lines
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no line carries a comment
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest annotated line
    pub fn last_line(&self) -> Option<LineKey> {
        self.entries.keys().next_back().copied()
    }

    /// Serialize to the backend's `{ "<line>": "<text>" }` mapping
    pub fn to_wire_format(&self) -> WireAnnotations {
        self.entries
            .iter()
            .map(|(line, text)| (line.to_string(), text.clone()))
            .collect()
    }

    /// Encode the wire mapping as the JSON string carried in a submit body
    pub fn to_wire_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_wire_format())?)
    }

    /// Rebuild a set from the backend's mapping
    ///
    /// Every key must be a positive integer and every value non-empty. Two
    /// keys naming the same line (`"5"` and `"05"`) are refused rather than
    /// letting one comment silently replace the other.
    pub fn from_wire_format(data: WireAnnotations) -> Result<Self> {
        let mut set = Self::new();
        let mut seen: BTreeMap<LineKey, String> = BTreeMap::new();
        for (key, text) in data {
            let line: LineKey = key.parse().map_err(|_| {
                Error::MalformedAnnotationData(format!("`{}` is not a positive line number", key))
            })?;
            if let Some(earlier) = seen.insert(line, key.clone()) {
                return Err(Error::MalformedAnnotationData(format!(
                    "keys `{}` and `{}` both name line {}",
                    earlier, key, line
                )));
            }
            set.add_annotation(line, text).map_err(|_| {
                Error::MalformedAnnotationData(format!("line {} has an empty comment", line))
            })?;
        }
        Ok(set)
    }
}

impl TryFrom<WireAnnotations> for AnnotationSet {
    type Error = Error;

    fn try_from(data: WireAnnotations) -> Result<Self> {
        Self::from_wire_format(data)
    }
}

impl From<AnnotationSet> for WireAnnotations {
    fn from(set: AnnotationSet) -> Self {
        set.to_wire_format()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: i64) -> LineKey {
        LineKey::new(n).unwrap()
    }

    #[test]
    fn test_add_then_entries_contains_pair() {
        let mut set = AnnotationSet::new();
        set.add_annotation(line(4), "missing bounds check").unwrap();

        let entries: Vec<_> = set.entries().collect();
        assert_eq!(entries, vec![(line(4), "missing bounds check")]);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_same_line_overwrites() {
        let mut set = AnnotationSet::new();
        set.add_annotation(line(3), "a").unwrap();
        set.add_annotation(line(3), "b").unwrap();

        let entries: Vec<_> = set.entries().collect();
        assert_eq!(entries, vec![(line(3), "b")]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_empty_comment_rejected() {
        let mut set = AnnotationSet::new();
        assert!(matches!(
            set.add_annotation(line(1), "   \n\t"),
            Err(Error::EmptyComment)
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn test_entries_sorted_numerically_and_restartable() {
        let mut set = AnnotationSet::new();
        set.add_annotation(line(10), "ten").unwrap();
        set.add_annotation(line(2), "two").unwrap();
        set.add_annotation(line(7), "seven").unwrap();

        let iter = set.entries();
        let first: Vec<u32> = iter.clone().map(|(l, _)| l.get()).collect();
        let second: Vec<u32> = iter.map(|(l, _)| l.get()).collect();
        assert_eq!(first, vec![2, 7, 10]);
        assert_eq!(first, second);
        assert_eq!(set.last_line(), Some(line(10)));
    }

    #[test]
    fn test_wire_round_trip() {
        let mut set = AnnotationSet::new();
        set.add_annotation(line(1), "unused import").unwrap();
        set.add_annotation(line(12), "off by one").unwrap();

        let wire = set.to_wire_format();
        assert_eq!(wire.get("12").map(String::as_str), Some("off by one"));

        let restored = AnnotationSet::from_wire_format(wire).unwrap();
        assert_eq!(restored, set);
    }

    #[test]
    fn test_wire_json_is_flat_object() {
        let mut set = AnnotationSet::new();
        set.add_annotation(line(3), "rename").unwrap();
        assert_eq!(set.to_wire_json().unwrap(), r#"{"3":"rename"}"#);
    }

    #[test]
    fn test_from_wire_rejects_bad_keys() {
        for key in ["0", "-1", "1.5", "three", ""] {
            let mut wire = WireAnnotations::new();
            wire.insert(key.to_string(), "text".to_string());
            assert!(
                matches!(
                    AnnotationSet::from_wire_format(wire),
                    Err(Error::MalformedAnnotationData(_))
                ),
                "key {:?} should be rejected",
                key
            );
        }
    }

    #[test]
    fn test_from_wire_rejects_keys_naming_same_line() {
        let mut wire = WireAnnotations::new();
        wire.insert("5".to_string(), "first reviewer note".to_string());
        wire.insert("05".to_string(), "second note".to_string());
        wire.insert("+7".to_string(), "plus".to_string());

        let err = AnnotationSet::from_wire_format(wire).unwrap_err();
        match err {
            Error::MalformedAnnotationData(msg) => {
                assert!(msg.contains("`05`") && msg.contains("`5`"), "{}", msg);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let mut padded = WireAnnotations::new();
        padded.insert(" 3 ".to_string(), "a".to_string());
        padded.insert("3".to_string(), "b".to_string());
        assert!(matches!(
            AnnotationSet::from_wire_format(padded),
            Err(Error::MalformedAnnotationData(_))
        ));
    }

    #[test]
    fn test_from_wire_rejects_empty_text() {
        let mut wire = WireAnnotations::new();
        wire.insert("2".to_string(), " ".to_string());
        assert!(matches!(
            AnnotationSet::from_wire_format(wire),
            Err(Error::MalformedAnnotationData(_))
        ));
    }

    #[test]
    fn test_deserialize_from_backend_json() {
        let set: AnnotationSet = serde_json::from_str(r#"{"5": "nice", "1": "typo"}"#).unwrap();
        let lines: Vec<u32> = set.entries().map(|(l, _)| l.get()).collect();
        assert_eq!(lines, vec![1, 5]);
        assert!(serde_json::from_str::<AnnotationSet>(r#"{"x": "bad"}"#).is_err());
    }

    #[test]
    fn test_annotation_display() {
        let annotation = Annotation {
            line: line(9),
            text: "shadowed variable".to_string(),
        };
        assert_eq!(annotation.to_string(), "Line 9: shadowed variable");
    }
}
