#![no_main]

use std::sync::OnceLock;

use libfuzzer_sys::fuzz_target;
use polyextract::{Extractor, FlattenedExtraction, Piece};

fn extractor() -> &'static Extractor {
    static EXTRACTOR: OnceLock<Extractor> = OnceLock::new();
    EXTRACTOR.get_or_init(|| {
        let defs = vec![
            FlattenedExtraction::new(
                "request",
                vec![
                    Piece::expression("method", vec![Piece::pattern("[A-Z]+")]),
                    Piece::text(" "),
                    Piece::expression("path", vec![Piece::pattern(r"\S+")]),
                    Piece::text(" "),
                    Piece::expression("status", vec![Piece::pattern(r"\d{3}")]),
                ],
            ),
            FlattenedExtraction::new(
                "kv",
                vec![
                    Piece::expression("key", vec![Piece::pattern(r"\w+")]),
                    Piece::text("="),
                    Piece::expression("value", vec![Piece::pattern(".*")]),
                ],
            ),
        ];
        Extractor::construct(&defs).expect("fuzz catalogue compiles")
    })
}

// Strict and permissive extraction agree whenever strict succeeds, and
// extracted values are slices of the input.
fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let ex = extractor();
    let safe = ex.extract_safe(input);
    if let Ok(strict) = ex.extract(input) {
        assert_eq!(strict, safe);
    }
    if let Some(result) = safe {
        for field in result.iter() {
            assert_eq!(&input[field.start..field.end], field.value);
        }
    }
});
