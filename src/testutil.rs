//! Shorthand builders for definitions in unit tests.

use crate::cooker::{CookedExtraction, ExtractionCooker, RegexCooker};
use crate::extractor::Extractor;
use crate::piece::{FlattenedExtraction, Piece};

pub fn text(text: &str) -> Piece {
    Piece::text(text)
}

pub fn pat(pattern: &str) -> Piece {
    Piece::pattern(pattern)
}

pub fn expr(name: &str, parts: Vec<Piece>) -> Piece {
    Piece::expression(name, parts)
}

pub fn def(name: &str, pieces: Vec<Piece>) -> FlattenedExtraction {
    FlattenedExtraction::new(name, pieces)
}

/// Compile and cook one definition with the default cooker.
pub fn cook(index: usize, definition: &FlattenedExtraction) -> CookedExtraction {
    let cooker = RegexCooker::new();
    let fragments = crate::compiler::compile_definition(definition, &cooker)
        .unwrap_or_else(|e| panic!("compile failed: {e}"));
    cooker
        .cook(index, &fragments.extraction, definition)
        .unwrap_or_else(|e| panic!("cook failed: {e}"))
}

/// Build an extractor with the default backends, panicking on failure.
pub fn extractor(definitions: &[FlattenedExtraction]) -> Extractor {
    Extractor::construct(definitions).unwrap_or_else(|e| panic!("construct failed: {e}"))
}

/// A small log-line catalogue used across tests.
pub fn access_log_definitions() -> Vec<FlattenedExtraction> {
    vec![
        def(
            "request",
            vec![
                expr("method", vec![pat("GET|POST|PUT|DELETE")]),
                text(" "),
                expr("path", vec![pat(r"/\S*")]),
                text(" "),
                expr("status", vec![pat(r"\d{3}")]),
            ],
        ),
        def(
            "kv",
            vec![
                expr("key", vec![pat(r"[a-z_]+")]),
                text("="),
                expr("value", vec![pat(r"\S+")]),
            ],
        ),
        def("heartbeat", vec![text("-- MARK --")]),
    ]
}
