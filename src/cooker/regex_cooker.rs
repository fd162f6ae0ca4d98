//! Default cooker, built on the `regex` crate.
//!
//! Linear-time matching, no look-around or back-references.

use regex::{Regex, RegexBuilder};

use super::{
    CookedExtraction, ExtractionCooker, FieldMatcher, anchor, cook_error, group_name,
    resolve_slots,
};
use crate::error::{ConstructionError, PatternSyntaxError};
use crate::piece::FlattenedExtraction;
use crate::regex_helper::wrap_fragment;

#[derive(Debug, Clone, Default)]
pub struct RegexCooker {
    size_limit: Option<usize>,
}

impl RegexCooker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap on the compiled size of each extraction regex.
    pub fn with_size_limit(mut self, limit: usize) -> Self {
        self.size_limit = Some(limit);
        self
    }

    fn build(&self, source: &str) -> Result<Regex, regex::Error> {
        let mut builder = RegexBuilder::new(source);
        if let Some(limit) = self.size_limit {
            builder.size_limit(limit);
        }
        builder.build()
    }
}

impl ExtractionCooker for RegexCooker {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn literal(&self, text: &str) -> String {
        regex::escape(text)
    }

    fn pattern(&self, text: &str) -> Result<String, PatternSyntaxError> {
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
            Box::new(RegexFieldMatcher { regex, slots }),
        ))
    }
}

#[derive(Debug)]
struct RegexFieldMatcher {
    regex: Regex,
    slots: Vec<usize>,
}

impl FieldMatcher for RegexFieldMatcher {
    fn captures(&self, input: &str) -> Option<Vec<Option<(usize, usize)>>> {
        let caps = self.regex.captures(input)?;
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
    fn literal_is_escaped() {
        let cooker = RegexCooker::new();
        assert_eq!(cooker.literal("1+1=2?"), r"1\+1=2\?");
    }

    #[test]
    fn pattern_is_validated_and_grouped() {
        let cooker = RegexCooker::new();
        assert_eq!(cooker.pattern("a|b").unwrap(), "(?:a|b)");
        let err = cooker.pattern("(unclosed").unwrap_err();
        assert!(!err.message.is_empty());
    }

    #[test]
    fn lookahead_is_rejected() {
        assert!(RegexCooker::new().pattern(r"(?=x)x").is_err());
    }

    #[test]
    fn expression_hooks() {
        let cooker = RegexCooker::new();
        assert_eq!(cooker.start_expression(3), "(?P<_e3>");
        assert_eq!(cooker.finish_expression(), ")");
    }

    #[test]
    fn cook_and_extract() {
        let cooker = RegexCooker::new();
        let def = FlattenedExtraction::new(
            "num",
            vec![Piece::expression("n", vec![Piece::pattern(r"\d+")])],
        );
        let cooked = cooker.cook(7, r"(?P<_e0>(?:\d+))", &def).unwrap();
        assert_eq!(cooked.index(), 7);
        assert_eq!(cooked.field_names(), ["n".to_string()]);
        let result = cooked.extract("123").unwrap();
        assert_eq!(result.get("n"), Some("123"));
        // anchored at both ends
        assert!(cooked.extract("x123").is_none());
        assert!(cooked.extract("123x").is_none());
    }

    #[test]
    fn user_groups_do_not_shift_fields() {
        let cooker = RegexCooker::new();
        let def = FlattenedExtraction::new(
            "kv",
            vec![
                Piece::pattern(r"(a|b)"),
                Piece::expression("v", vec![Piece::pattern(r"(\d)+")]),
            ],
        );
        let cooked = cooker
            .cook(0, r"(?:(a|b))(?P<_e0>(?:(\d)+))", &def)
            .unwrap();
        assert_eq!(cooked.extract("a42").unwrap().get("v"), Some("42"));
    }

    #[test]
    fn cook_reports_composition_failure() {
        let cooker = RegexCooker::new();
        let def = FlattenedExtraction::new("bad", vec![]);
        let err = cooker.cook(2, "(?P<x>a)(?P<x>b)", &def).unwrap_err();
        assert!(matches!(err, ConstructionError::Cook { index: 2, .. }));
    }

    #[test]
    fn cook_reports_missing_expression_group() {
        let cooker = RegexCooker::new();
        let def = FlattenedExtraction::new("lost", vec![Piece::expression("e", vec![])]);
        let err = cooker.cook(0, "abc", &def).unwrap_err();
        assert!(err.to_string().contains("no capture group"));
    }

    #[test]
    fn verbose_comment_piece_validated_as_inserted() {
        let cooker = RegexCooker::new();
        assert_eq!(
            cooker.pattern("(?x) \\d+ # digits").unwrap(),
            "(?:(?x) \\d+ # digits\n)"
        );
        // a comment that opens a group the wrapper cannot close is still an error
        assert!(cooker.pattern("(?x) ( # open").is_err());
    }

    #[test]
    fn braced_escape_piece_extracts() {
        let def = crate::testutil::def(
            "hex",
            vec![crate::testutil::expr("v", vec![crate::testutil::pat(r"\x{41}+b")])],
        );
        let cooked = crate::testutil::cook(3, &def);
        assert_eq!(cooked.index(), 3);
        assert_eq!(cooked.pattern_source(), r"(?P<_e0>(?:\x{41}+b))");
        let result = cooked.extract("AAb").unwrap();
        assert_eq!(result.field("v").map(|f| (f.start, f.end)), Some((0, 3)));
    }
}

