//! Extraction cookers: the pluggable backends that turn composed pattern
//! text into an executable single-pattern extractor.
//!
//! The piece compiler only talks to [`ExtractionCooker`]; it never knows
//! which regex technology sits behind it.

pub mod fancy_cooker;
pub mod regex_cooker;

use std::fmt;

use crate::error::{ConstructionError, PatternSyntaxError};
use crate::piece::FlattenedExtraction;
use crate::result::{ExtractedField, ExtractionResult};

pub use fancy_cooker::FancyRegexCooker;
pub use regex_cooker::RegexCooker;

/// Backend protocol used by the piece compiler.
///
/// Every hook returns a fresh fragment; the compiler concatenates them in
/// piece order.
pub trait ExtractionCooker: Send + Sync {
    /// Short backend name for diagnostics.
    fn name(&self) -> &'static str;

    /// Escape `text` so it matches itself.
    fn literal(&self, text: &str) -> String;

    /// Validate a raw pattern fragment and return it ready for insertion.
    fn pattern(&self, text: &str) -> Result<String, PatternSyntaxError>;

    /// Open the capturing construct for the expression with the given
    /// ordinal (its position in opening order within the definition).
    fn start_expression(&self, ordinal: usize) -> String;

    /// Close the construct opened by the matching `start_expression`.
    fn finish_expression(&self) -> String;

    /// Finalize composed `source` into the executable unit for `definition`.
    fn cook(
        &self,
        index: usize,
        source: &str,
        definition: &FlattenedExtraction,
    ) -> Result<CookedExtraction, ConstructionError>;
}

/// Executable matcher behind a [`CookedExtraction`].
pub trait FieldMatcher: Send + Sync + fmt::Debug {
    /// Match the whole input. On success returns the byte span of every
    /// expression group in opening order (`None` for a group that did not
    /// participate).
    fn captures(&self, input: &str) -> Option<Vec<Option<(usize, usize)>>>;
}

/// Capture-group name used for the expression with `ordinal`.
pub(crate) fn group_name(ordinal: usize) -> String {
    format!("_e{ordinal}")
}

/// Whether `name` has the form of a generated expression group name.
pub(crate) fn is_expression_group_name(name: &str) -> bool {
    name.strip_prefix("_e")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Anchor composed source so that a match accounts for the entire input.
pub(crate) fn anchor(source: &str) -> String {
    format!(r"\A(?:{source})\z")
}

/// Resolve each expression ordinal to its capture slot, given the
/// compiled regex's capture names (slot order).
pub(crate) fn resolve_slots<'a>(
    names: impl Iterator<Item = Option<&'a str>>,
    field_count: usize,
) -> Result<Vec<usize>, String> {
    let mut slots = vec![None; field_count];
    for (slot, name) in names.enumerate() {
        let Some(ordinal) = name
            .and_then(|n| n.strip_prefix("_e"))
            .and_then(|n| n.parse::<usize>().ok())
        else {
            continue;
        };
        if let Some(entry) = slots.get_mut(ordinal) {
            *entry = Some(slot);
        }
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(ordinal, slot)| {
            slot.ok_or_else(|| format!("no capture group for expression #{ordinal}"))
        })
        .collect()
}

pub(crate) fn cook_error(
    index: usize,
    source: &str,
    definition: &FlattenedExtraction,
    message: impl Into<String>,
) -> ConstructionError {
    ConstructionError::Cook {
        definition: definition.name.clone(),
        index,
        location: definition.location.clone(),
        source_text: source.to_string(),
        message: message.into(),
    }
}

/// One definition compiled for extraction. Immutable once built.
#[derive(Debug)]
pub struct CookedExtraction {
    index: usize,
    name: String,
    source: String,
    fields: Vec<String>,
    matcher: Box<dyn FieldMatcher>,
}

impl CookedExtraction {
    pub fn new(
        index: usize,
        name: impl Into<String>,
        source: impl Into<String>,
        fields: Vec<String>,
        matcher: Box<dyn FieldMatcher>,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            source: source.into(),
            fields,
            matcher,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Generated extraction pattern (unanchored), for diagnostics.
    pub fn pattern_source(&self) -> &str {
        &self.source
    }

    /// Field names in the order their groups open.
    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    /// Match the whole `input` and collect named fields. Non-match is `None`.
    pub fn extract(&self, input: &str) -> Option<ExtractionResult> {
        let spans = self.matcher.captures(input)?;
        let fields = self
            .fields
            .iter()
            .zip(spans)
            .filter_map(|(name, span)| {
                let (start, end) = span?;
                Some(ExtractedField {
                    name: name.clone(),
                    value: input[start..end].to_string(),
                    start,
                    end,
                })
            })
            .collect();
        Some(ExtractionResult {
            index: self.index,
            name: self.name.clone(),
            fields,
        })
    }
}
