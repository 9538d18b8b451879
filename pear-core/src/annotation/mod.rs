//! Line-anchored annotation model
//!
//! Reviewer comments are keyed by a [`LineKey`] and collected in an
//! [`AnnotationSet`], which also owns the conversion to and from the flat
//! `{ "<line>": "<comment>" }` mapping the backend stores.

mod line;
mod set;

pub use line::LineKey;
pub use set::{Annotation, AnnotationSet, WireAnnotations};
