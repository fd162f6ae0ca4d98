use thiserror::Error;

use crate::piece::SourceLocation;

/// Raised while building an [`Extractor`](crate::extractor::Extractor).
///
/// Always fatal to the construction attempt; no partially built extractor
/// is ever returned alongside one.
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// A pattern piece is not valid in the extraction dialect.
    #[error("{location}: invalid pattern definition in '{definition}': {message}")]
    InvalidPattern {
        definition: String,
        pattern: String,
        location: SourceLocation,
        message: String,
    },

    /// Two definitions share a name.
    #[error("{location}: duplicate extraction name '{name}' (first declared as #{first_index})")]
    DuplicateDefinition {
        name: String,
        first_index: usize,
        location: SourceLocation,
    },

    /// Two expressions inside one definition share a name.
    #[error("{location}: duplicate field name '{field}' in extraction '{definition}'")]
    DuplicateField {
        definition: String,
        field: String,
        location: SourceLocation,
    },

    /// The composed extraction source did not compile. Each piece was
    /// validated on its own, so this points at a composition bug.
    #[error("{location}: internal problem: invalid composed pattern for extraction #{index} ('{definition}'): {message}")]
    Cook {
        definition: String,
        index: usize,
        location: SourceLocation,
        source_text: String,
        message: String,
    },

    /// The discriminator rejected the pattern set.
    #[error("internal error: problem with multi-matcher construction: {message}")]
    Matcher { message: String },
}

impl ConstructionError {
    /// Source location of the offending piece or definition, when attributable.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            ConstructionError::InvalidPattern { location, .. }
            | ConstructionError::DuplicateDefinition { location, .. }
            | ConstructionError::DuplicateField { location, .. }
            | ConstructionError::Cook { location, .. } => Some(location),
            ConstructionError::Matcher { .. } => None,
        }
    }

    /// Name of the offending definition, when attributable.
    pub fn definition(&self) -> Option<&str> {
        match self {
            ConstructionError::InvalidPattern { definition, .. }
            | ConstructionError::DuplicateField { definition, .. }
            | ConstructionError::Cook { definition, .. } => Some(definition),
            ConstructionError::DuplicateDefinition { name, .. } => Some(name),
            ConstructionError::Matcher { .. } => None,
        }
    }
}

/// A pattern fragment rejected by a cooker; the compiler attaches the
/// definition and location to turn it into a [`ConstructionError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PatternSyntaxError {
    pub message: String,
}

impl PatternSyntaxError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Raised by a strict-mode extraction when the discriminator picked a
/// definition whose extraction pattern then failed to match: the two
/// compiled representations have drifted apart for that definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("internal error: high-level match for extraction #{index} ({name}) failed to match generated pattern: {pattern}")]
pub struct ExtractionError {
    /// The line that was being matched.
    pub input: String,
    pub index: usize,
    pub name: String,
    /// Extraction pattern source of the failing definition.
    pub pattern: String,
}

impl ExtractionError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pattern_display_includes_location() {
        let err = ConstructionError::InvalidPattern {
            definition: "access".to_string(),
            pattern: "(".to_string(),
            location: SourceLocation::new(4, 9).in_source("defs.yml"),
            message: "unclosed group".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "defs.yml:4:9: invalid pattern definition in 'access': unclosed group"
        );
        assert_eq!(err.definition(), Some("access"));
        assert_eq!(err.location().map(|l| l.line), Some(4));
    }

    #[test]
    fn matcher_error_has_no_location() {
        let err = ConstructionError::Matcher {
            message: "too big".to_string(),
        };
        assert!(err.location().is_none());
        assert!(err.definition().is_none());
        assert!(err.to_string().contains("too big"));
    }

    #[test]
    fn extraction_error_message() {
        let err = ExtractionError {
            input: "abc".to_string(),
            index: 2,
            name: "words".to_string(),
            pattern: r"(?P<_e0>\w+)".to_string(),
        };
        assert_eq!(
            err.message(),
            r"internal error: high-level match for extraction #2 (words) failed to match generated pattern: (?P<_e0>\w+)"
        );
    }
}
