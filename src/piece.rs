//! Definition model: the pieces a front end hands to the compiler.
//!
//! A definition is an ordered list of [`Piece`]s. Expressions nest to any
//! depth; children are always evaluated left to right.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a piece or definition came from, for error attribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLocation {
    /// File or other source name, if known.
    pub source: Option<String>,
    /// 1-indexed line number; 0 when unknown.
    pub line: usize,
    /// 1-indexed column; 0 when unknown.
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            source: None,
            line,
            column,
        }
    }

    pub fn in_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = self.source.as_deref().unwrap_or("<input>");
        if self.line == 0 {
            write!(f, "{source}")
        } else {
            write!(f, "{source}:{}:{}", self.line, self.column)
        }
    }
}

/// One syntactic element of a definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Piece {
    /// Verbatim text, matched exactly.
    Text {
        text: String,
        #[serde(default)]
        location: SourceLocation,
    },
    /// A raw pattern fragment in the extraction dialect.
    Pattern {
        pattern: String,
        #[serde(default)]
        location: SourceLocation,
    },
    /// A named capture over an ordered sequence of child pieces.
    Expression {
        name: String,
        #[serde(default)]
        parts: Vec<Piece>,
        #[serde(default)]
        location: SourceLocation,
    },
}

impl Piece {
    pub fn text(text: impl Into<String>) -> Self {
        Piece::Text {
            text: text.into(),
            location: SourceLocation::default(),
        }
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        Piece::Pattern {
            pattern: pattern.into(),
            location: SourceLocation::default(),
        }
    }

    pub fn expression(name: impl Into<String>, parts: Vec<Piece>) -> Self {
        Piece::Expression {
            name: name.into(),
            parts,
            location: SourceLocation::default(),
        }
    }

    /// Replace this piece's location.
    pub fn at(mut self, loc: SourceLocation) -> Self {
        match &mut self {
            Piece::Text { location, .. }
            | Piece::Pattern { location, .. }
            | Piece::Expression { location, .. } => *location = loc,
        }
        self
    }

    pub fn location(&self) -> &SourceLocation {
        match self {
            Piece::Text { location, .. }
            | Piece::Pattern { location, .. }
            | Piece::Expression { location, .. } => location,
        }
    }

    fn location_mut(&mut self) -> &mut SourceLocation {
        match self {
            Piece::Text { location, .. }
            | Piece::Pattern { location, .. }
            | Piece::Expression { location, .. } => location,
        }
    }

    /// Pre-order walk collecting `(name, location)` of every expression.
    fn collect_expressions<'a>(&'a self, out: &mut Vec<(&'a str, &'a SourceLocation)>) {
        if let Piece::Expression {
            name,
            parts,
            location,
        } = self
        {
            out.push((name.as_str(), location));
            for part in parts {
                part.collect_expressions(out);
            }
        }
    }

    fn fill_source(&mut self, source: &str) {
        let location = self.location_mut();
        if location.source.is_none() {
            location.source = Some(source.to_string());
        }
        if let Piece::Expression { parts, .. } = self {
            for part in parts {
                part.fill_source(source);
            }
        }
    }
}

/// One named definition, flattened to an ordered list of top-level pieces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenedExtraction {
    pub name: String,
    #[serde(default)]
    pub pieces: Vec<Piece>,
    #[serde(default)]
    pub location: SourceLocation,
}

impl FlattenedExtraction {
    pub fn new(name: impl Into<String>, pieces: Vec<Piece>) -> Self {
        Self {
            name: name.into(),
            pieces,
            location: SourceLocation::default(),
        }
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Piece> {
        self.pieces.iter()
    }

    /// Every expression with its location, in the order its group opens.
    pub fn expressions(&self) -> Vec<(&str, &SourceLocation)> {
        let mut out = Vec::new();
        for piece in &self.pieces {
            piece.collect_expressions(&mut out);
        }
        out
    }

    /// Expression names in opening order. Capture groups are numbered in
    /// this same order by the compiler.
    pub fn field_names(&self) -> Vec<String> {
        self.expressions()
            .into_iter()
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// First expression whose name was already used earlier in this definition.
    pub fn first_duplicate_field(&self) -> Option<(&str, &SourceLocation)> {
        let mut seen = HashSet::new();
        self.expressions()
            .into_iter()
            .find(|(name, _)| !seen.insert(*name))
    }

    /// Attach `source` to this definition and every piece that has no source yet.
    pub fn fill_source(&mut self, source: &str) {
        if self.location.source.is_none() {
            self.location.source = Some(source.to_string());
        }
        for piece in &mut self.pieces {
            piece.fill_source(source);
        }
    }
}

impl<'a> IntoIterator for &'a FlattenedExtraction {
    type Item = &'a Piece;
    type IntoIter = std::slice::Iter<'a, Piece>;

    fn into_iter(self) -> Self::IntoIter {
        self.pieces.iter()
    }
}
