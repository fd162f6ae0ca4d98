//! Backtracking cooker built on `fancy-regex`.
//!
//! Accepts look-around, atomic groups, possessive quantifiers and named
//! back-references (`\k<name>`). Each pattern piece is validated on its own,
//! so a back-reference must live in the same piece as its group. Groups can
//! only be referenced by name: numbered references are rejected.

use fancy_regex::{Regex, RegexBuilder};

use super::{
    CookedExtraction, ExtractionCooker, FieldMatcher, anchor, cook_error, group_name,
    resolve_slots,
};
use crate::error::{ConstructionError, PatternSyntaxError};
use crate::piece::FlattenedExtraction;
use crate::regex_helper::{numbered_group_reference, wrap_fragment};

pub const DEFAULT_BACKTRACK_LIMIT: usize = 1_000_000;

#[derive(Debug, Clone)]
pub struct FancyRegexCooker {
    backtrack_limit: usize,
}

impl Default for FancyRegexCooker {
    fn default() -> Self {
        Self {
            backtrack_limit: DEFAULT_BACKTRACK_LIMIT,
        }
    }
}

impl FancyRegexCooker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backtrack_limit(mut self, limit: usize) -> Self {
        self.backtrack_limit = limit;
        self
    }

    fn build(&self, source: &str) -> Result<Regex, fancy_regex::Error> {
        RegexBuilder::new(source)
            .backtrack_limit(self.backtrack_limit)
            .build()
    }
}

impl ExtractionCooker for FancyRegexCooker {
    fn name(&self) -> &'static str {
        "fancy-regex"
    }

    fn literal(&self, text: &str) -> String {
        fancy_regex::escape(text).into_owned()
    }

    fn pattern(&self, text: &str) -> Result<String, PatternSyntaxError> {
        // expression groups are named, and fancy-regex refuses numbered
        // references once any group is named
        if let Some(reference) = numbered_group_reference(text) {
            return Err(PatternSyntaxError::new(format!(
                "numbered group reference `{reference}` is not supported; \
                 name the group and use `\\k<name>`"
            )));
        }
        let grouped = wrap_fragment(text);
        self.build(&grouped)
            .map_err(|e| PatternSyntaxError::new(e.to_string()))?;
        Ok(grouped)
    }

    fn start_expression(&self, ordinal: usize) -> String {
        format!("(?P<{}>", group_name(ordinal))
    }

    fn finish_expression(&self) -> String {
        ")".to_string()
    }

    fn cook(
        &self,
        index: usize,
        source: &str,
        definition: &FlattenedExtraction,
    ) -> Result<CookedExtraction, ConstructionError> {
        let regex = self
            .build(&anchor(source))
            .map_err(|e| cook_error(index, source, definition, e.to_string()))?;
        let fields = definition.field_names();
        let slots = resolve_slots(regex.capture_names(), fields.len())
            .map_err(|e| cook_error(index, source, definition, e))?;
        Ok(CookedExtraction::new(
            index,
            definition.name.clone(),
            source,
            fields,
            Box::new(FancyFieldMatcher {
                regex,
                slots,
                name: definition.name.clone(),
            }),
        ))
    }
}

#[derive(Debug)]
struct FancyFieldMatcher {
    regex: Regex,
    slots: Vec<usize>,
    name: String,
}

impl FieldMatcher for FancyFieldMatcher {
    fn captures(&self, input: &str) -> Option<Vec<Option<(usize, usize)>>> {
        let caps = match self.regex.captures(input) {
            Ok(caps) => caps?,
            Err(e) => {
                log::warn!("extraction '{}' gave up matching: {e}", self.name);
                return None;
            }
        };
        Some(
            self.slots
                .iter()
                .map(|&slot| caps.get(slot).map(|m| (m.start(), m.end())))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Piece;

    #[test]
    fn accepts_lookaround() {
        let cooker = FancyRegexCooker::new();
        assert_eq!(cooker.pattern(r"(?=\d)\w+").unwrap(), r"(?:(?=\d)\w+)");
        assert!(cooker.pattern("(").is_err());
    }

    #[test]
    fn literal_is_escaped() {
        assert_eq!(FancyRegexCooker::new().literal("a.b"), r"a\.b");
    }

    #[test]
    fn named_backreference_extracts() {
        let cooker = FancyRegexCooker::new();
        let def = FlattenedExtraction::new(
            "quoted",
            vec![
                Piece::pattern(r#"(?P<q>['"])"#),
                Piece::expression("body", vec![Piece::pattern(r#"[^'"]*"#)]),
                Piece::pattern(r"\k<q>"),
            ],
        );
        let source = r#"(?:(?P<q>['"]))(?P<_e0>(?:[^'"]*))(?:\k<q>)"#;
        let cooked = cooker.cook(0, source, &def).unwrap();
        assert_eq!(cooked.extract("'hi'").unwrap().get("body"), Some("hi"));
        assert!(cooked.extract("'hi\"").is_none());
    }

    #[test]
    fn low_backtrack_limit_still_reports_non_match() {
        let cooker = FancyRegexCooker::new().with_backtrack_limit(10);
        let def = FlattenedExtraction::new(
            "slow",
            vec![Piece::expression("x", vec![Piece::pattern(r"(?:a+)+(?=b)c")])],
        );
        let cooked = cooker
            .cook(0, r"(?P<_e0>(?:(?:a+)+(?=b)c))", &def)
            .unwrap();
        assert!(cooked.extract("aaaaaaaaaaaaaaaaaaaaaaaa").is_none());
    }

    #[test]
    fn numbered_backreference_rejected_at_piece() {
        let cooker = FancyRegexCooker::new();
        let err = cooker.pattern(r"(\w)\1").unwrap_err();
        assert!(err.message.contains(r"`\1`"));
        assert!(err.message.contains(r"\k<name>"));
        assert!(cooker.pattern(r"(a)\k<-1>").is_err());

        let def = crate::testutil::def(
            "twin",
            vec![crate::testutil::expr(
                "v",
                vec![Piece::pattern(r"(\w)\1").at(crate::piece::SourceLocation::new(4, 9))],
            )],
        );
        let err = crate::compiler::compile_definition(&def, &cooker).unwrap_err();
        assert!(matches!(err, ConstructionError::InvalidPattern { .. }));
        assert_eq!(err.location().map(|l| (l.line, l.column)), Some((4, 9)));
    }

    #[test]
    fn named_backreference_in_one_piece_compiles() {
        let def = FlattenedExtraction::new(
            "twin",
            vec![Piece::expression("v", vec![Piece::pattern(r"(?P<c>\w)\k<c>")])],
        );
        let ex = crate::extractor::Extractor::construct_with(
            &[def],
            &FancyRegexCooker::new(),
            &crate::matcher::RegexSetMatcherBuilder::new(),
        )
        .unwrap();
        assert_eq!(ex.extract("aa").unwrap().unwrap().get("v"), Some("aa"));
        assert!(ex.extract("ab").is_err());
    }

    #[test]
    fn verbose_comment_piece_validated_as_inserted() {
        let cooker = FancyRegexCooker::new();
        let grouped = cooker.pattern("(?x) \\d+ # digits").unwrap();
        assert_eq!(grouped, "(?:(?x) \\d+ # digits\n)");
        let def = FlattenedExtraction::new(
            "n",
            vec![Piece::expression("n", vec![Piece::pattern("(?x) \\d+ # digits")])],
        );
        let source = format!("(?P<_e0>{grouped})");
        let cooked = cooker.cook(0, &source, &def).unwrap();
        assert_eq!(cooked.extract("17").unwrap().get("n"), Some("17"));
    }
}
