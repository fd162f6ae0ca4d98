use std::collections::BTreeMap;

use serde::Serialize;

/// One captured field: the expression's declared name and what it matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedField {
    pub name: String,
    pub value: String,
    /// Byte offset of the capture start within the input.
    pub start: usize,
    /// Byte offset just past the capture end.
    pub end: usize,
}

/// Outcome of a successful extraction. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    /// Index of the matching definition.
    pub index: usize,
    /// Name of the matching definition.
    pub name: String,
    /// Captured fields in the order their groups open.
    pub fields: Vec<ExtractedField>,
}

impl ExtractionResult {
    /// Captured text for `field`, if present.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.field(field).map(|f| f.value.as_str())
    }

    pub fn field(&self, field: &str) -> Option<&ExtractedField> {
        self.fields.iter().find(|f| f.name == field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExtractedField> {
        self.fields.iter()
    }

    /// Field name to captured text.
    pub fn to_map(&self) -> BTreeMap<&str, &str> {
        self.fields
            .iter()
            .map(|f| (f.name.as_str(), f.value.as_str()))
            .collect()
    }
}
