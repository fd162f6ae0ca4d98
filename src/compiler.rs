//! Piece compiler.
//!
//! Walks a definition's pieces and produces, in one pass, the discriminator
//! pattern and the extraction pattern. Both are built from the same walk so
//! group order stays aligned at any nesting depth.

use std::collections::HashSet;

use crate::cooker::{ExtractionCooker, is_expression_group_name};
use crate::error::ConstructionError;
use crate::piece::{FlattenedExtraction, Piece, SourceLocation};
use crate::regex_helper::{capture_group_names, massage_pattern_for_discriminator, quote_literal};

/// Output of compiling a piece or a whole definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragments {
    /// Discriminator-dialect pattern text.
    pub discriminator: String,
    /// Extraction-dialect pattern text, as produced by the cooker.
    pub extraction: String,
    /// Names of the expressions opened in this fragment, in opening order.
    pub fields: Vec<String>,
}

impl Fragments {
    fn append(&mut self, other: Fragments) {
        self.discriminator.push_str(&other.discriminator);
        self.extraction.push_str(&other.extraction);
        self.fields.extend(other.fields);
    }
}

/// Compile one piece (and its subtree).
///
/// `first_ordinal` is the opening-order position the first expression in
/// this subtree will get; it keeps the cooker's group naming consistent
/// across sibling subtrees.
pub fn compile_piece(
    piece: &Piece,
    cooker: &dyn ExtractionCooker,
    definition: &str,
    first_ordinal: usize,
) -> Result<Fragments, ConstructionError> {
    match piece {
        Piece::Pattern { pattern, location } => {
            let extraction =
                cooker
                    .pattern(pattern)
                    .map_err(|e| ConstructionError::InvalidPattern {
                        definition: definition.to_string(),
                        pattern: pattern.clone(),
                        location: location.clone(),
                        message: e.message,
                    })?;
            Ok(Fragments {
                discriminator: massage_pattern_for_discriminator(pattern),
                extraction,
                fields: Vec::new(),
            })
        }
        Piece::Text { text, .. } => Ok(Fragments {
            discriminator: quote_literal(text),
            extraction: cooker.literal(text),
            fields: Vec::new(),
        }),
        Piece::Expression { name, parts, .. } => {
            let mut out = Fragments {
                discriminator: "(?:".to_string(),
                extraction: cooker.start_expression(first_ordinal),
                fields: vec![name.clone()],
            };
            for part in parts {
                let next_ordinal = first_ordinal + out.fields.len();
                out.append(compile_piece(part, cooker, definition, next_ordinal)?);
            }
            out.discriminator.push(')');
            out.extraction.push_str(&cooker.finish_expression());
            Ok(out)
        }
    }
}

/// Compile every top-level piece of `definition`, in order.
pub fn compile_definition(
    definition: &FlattenedExtraction,
    cooker: &dyn ExtractionCooker,
) -> Result<Fragments, ConstructionError> {
    if let Some((field, location)) = definition.first_duplicate_field() {
        return Err(ConstructionError::DuplicateField {
            definition: definition.name.clone(),
            field: field.to_string(),
            location: location.clone(),
        });
    }
    check_group_names(definition)?;

    let mut out = Fragments::default();
    for piece in definition {
        let next_ordinal = out.fields.len();
        out.append(compile_piece(piece, cooker, &definition.name, next_ordinal)?);
    }
    Ok(out)
}

/// Named groups inside pattern pieces share one namespace once the pieces
/// are composed, and `_eN` names belong to expression groups.
fn check_group_names(definition: &FlattenedExtraction) -> Result<(), ConstructionError> {
    let mut patterns = Vec::new();
    for piece in definition {
        collect_patterns(piece, &mut patterns);
    }

    let mut seen = HashSet::new();
    for (pattern, location) in patterns {
        for name in capture_group_names(pattern) {
            let message = if is_expression_group_name(&name) {
                format!("group name `{name}` is reserved for expression captures")
            } else if seen.contains(&name) {
                format!("group name `{name}` is already used earlier in this definition")
            } else {
                seen.insert(name);
                continue;
            };
            return Err(ConstructionError::InvalidPattern {
                definition: definition.name.clone(),
                pattern: pattern.to_string(),
                location: location.clone(),
                message,
            });
        }
    }
    Ok(())
}

fn collect_patterns<'a>(piece: &'a Piece, out: &mut Vec<(&'a str, &'a SourceLocation)>) {
    match piece {
        Piece::Pattern { pattern, location } => out.push((pattern, location)),
        Piece::Text { .. } => {}
        Piece::Expression { parts, .. } => {
            for part in parts {
                collect_patterns(part, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooker::{FancyRegexCooker, RegexCooker};
    use crate::piece::SourceLocation;
    use crate::testutil::{def, expr, pat, text};

    #[test]
    fn literal_text() {
        let out = compile_piece(&text("a.b"), &RegexCooker::new(), "d", 0).unwrap();
        assert_eq!(out.discriminator, r"a\.b");
        assert_eq!(out.extraction, r"a\.b");
        assert!(out.fields.is_empty());
    }

    #[test]
    fn pattern_goes_through_both_transforms() {
        let out = compile_piece(&pat(r"(\d+)"), &RegexCooker::new(), "d", 0).unwrap();
        assert_eq!(out.discriminator, r"(?:(?:\d+))");
        assert_eq!(out.extraction, r"(?:(\d+))");
    }

    #[test]
    fn invalid_pattern_attributed_to_piece() {
        let piece = pat("[a-").at(SourceLocation::new(12, 4).in_source("defs.yml"));
        let err = compile_piece(&piece, &RegexCooker::new(), "broken", 0).unwrap_err();
        match err {
            ConstructionError::InvalidPattern {
                definition,
                pattern,
                location,
                ..
            } => {
                assert_eq!(definition, "broken");
                assert_eq!(pattern, "[a-");
                assert_eq!(location.line, 12);
                assert_eq!(location.column, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn nested_expressions_number_in_opening_order() {
        let d = def(
            "nested",
            vec![
                expr("a", vec![expr("b", vec![pat(r"\d")]), text("-"), expr("c", vec![])]),
                expr("d", vec![pat("x")]),
            ],
        );
        let out = compile_definition(&d, &RegexCooker::new()).unwrap();
        assert_eq!(out.fields, vec!["a", "b", "c", "d"]);
        assert_eq!(
            out.extraction,
            r"(?P<_e0>(?P<_e1>(?:\d))\-(?P<_e2>))(?P<_e3>(?:x))"
        );
        assert_eq!(out.discriminator, r"(?:(?:(?:\d))\-(?:))(?:(?:x))");
        assert_eq!(out.fields, d.field_names());
    }

    #[test]
    fn first_error_aborts_walk() {
        let d = def(
            "two-bad",
            vec![
                pat("(").at(SourceLocation::new(1, 1)),
                pat(")").at(SourceLocation::new(2, 1)),
            ],
        );
        let err = compile_definition(&d, &RegexCooker::new()).unwrap_err();
        assert_eq!(err.location().map(|l| l.line), Some(1));
    }

    #[test]
    fn duplicate_field_rejected() {
        let d = def(
            "dup",
            vec![expr("x", vec![pat("a")]), expr("x", vec![pat("b")])],
        );
        let err = compile_definition(&d, &RegexCooker::new()).unwrap_err();
        assert!(matches!(err, ConstructionError::DuplicateField { ref field, .. } if field == "x"));
    }

    #[test]
    fn fancy_pattern_relaxed_for_discriminator() {
        let out = compile_piece(&pat(r"\d+(?!x)"), &FancyRegexCooker::new(), "d", 0).unwrap();
        assert_eq!(out.discriminator, r"(?:\d+(?:))");
        assert_eq!(out.extraction, r"(?:\d+(?!x))");
    }

    #[test]
    fn group_name_reused_across_pieces_rejected() {
        let d = def(
            "two",
            vec![
                pat("(?P<x>a)").at(SourceLocation::new(1, 1)),
                text("-"),
                pat("(?P<x>b)").at(SourceLocation::new(3, 7)),
            ],
        );
        let err = compile_definition(&d, &RegexCooker::new()).unwrap_err();
        match err {
            ConstructionError::InvalidPattern {
                pattern,
                location,
                message,
                ..
            } => {
                assert_eq!(pattern, "(?P<x>b)");
                assert_eq!((location.line, location.column), (3, 7));
                assert!(message.contains("`x`"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn group_name_inside_nested_expression_checked() {
        let d = def(
            "nested",
            vec![
                pat("(?<x>a)"),
                expr("e", vec![pat("(?P<x>b)").at(SourceLocation::new(2, 2))]),
            ],
        );
        let err = compile_definition(&d, &FancyRegexCooker::new()).unwrap_err();
        assert_eq!(err.location().map(|l| l.line), Some(2));
    }

    #[test]
    fn expression_group_names_reserved() {
        let d = def(
            "clash",
            vec![expr(
                "v",
                vec![pat(r"(?P<_e0>\d)").at(SourceLocation::new(5, 1))],
            )],
        );
        let err = compile_definition(&d, &RegexCooker::new()).unwrap_err();
        assert!(matches!(
            err,
            ConstructionError::InvalidPattern { ref message, .. } if message.contains("reserved")
        ));
        assert_eq!(err.location().map(|l| l.line), Some(5));
    }

    #[test]
    fn distinct_group_names_compile() {
        let d = def("ok", vec![pat("(?P<x>a)"), pat("(?P<y>b)"), pat("(?P<_e>c)")]);
        assert!(compile_definition(&d, &RegexCooker::new()).is_ok());
    }

    #[test]
    fn verbose_comment_piece_stays_closed() {
        let d = def("v", vec![expr("v", vec![pat("(?x) \\d+ # digits")])]);
        let out = compile_definition(&d, &RegexCooker::new()).unwrap();
        assert_eq!(out.extraction, "(?P<_e0>(?:(?x) \\d+ # digits\n))");
        assert_eq!(out.discriminator, "(?:(?:(?x) \\d+ # digits\n))");
        let ex = crate::testutil::extractor(&[d]);
        assert_eq!(ex.extract("42").unwrap().unwrap().get("v"), Some("42"));
    }

    #[test]
    fn empty_definition_compiles_to_empty_patterns() {
        let out = compile_definition(&def("empty", vec![]), &RegexCooker::new()).unwrap();
        assert_eq!(out, Fragments::default());
    }
}
