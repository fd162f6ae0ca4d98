//! Grok-style line extraction.
//!
//! A catalogue of [`FlattenedExtraction`] definitions is compiled into an
//! [`Extractor`]: a `RegexSet` discriminator that shortlists candidate
//! definitions for a line, plus one anchored extraction regex per definition
//! that confirms the match and yields named fields.

pub mod cli;
pub mod compiler;
pub mod config;
pub mod cooker;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod matcher;
pub mod piece;
pub mod regex_helper;
pub mod result;

#[cfg(test)]
pub mod testutil;

use std::collections::BTreeMap;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;

pub use cooker::{CookedExtraction, ExtractionCooker, FancyRegexCooker, RegexCooker};
pub use error::{ConstructionError, ExtractionError};
pub use extractor::{Extractor, FallbackMode};
pub use matcher::{MultiMatcher, MultiMatcherBuilder, RegexSetMatcherBuilder};
pub use piece::{FlattenedExtraction, Piece, SourceLocation};
pub use result::{ExtractedField, ExtractionResult};

use cli::Args;
use config::load_definitions;

/// Lines read from one input, with the name used in reports.
#[derive(Debug, Clone)]
pub struct InputLines {
    pub source: String,
    pub lines: Vec<String>,
}

/// One output record per input line.
#[derive(Debug, Serialize)]
struct LineReport<'a> {
    source: &'a str,
    line: usize,
    extraction: Option<&'a str>,
    fields: BTreeMap<&'a str, &'a str>,
}

/// Run the CLI. Returns the exit code: 0 = ok, 1 = at least one line hit a
/// discriminator/extractor disagreement in strict mode.
pub fn run(args: Args) -> Result<i32> {
    logging::init(args.debug);

    let mut file = load_definitions(&args.definitions)?;
    if let Some(backend) = args.backend_override() {
        file.options.backend = backend;
    }
    if args.parallel {
        file.options.parallel = true;
    }

    let build_start = std::time::Instant::now();
    let extractor = file
        .options
        .build(&file.extractions)
        .with_context(|| format!("failed to compile {}", args.definitions.display()))?;
    log::debug!(
        "compiled {} extractions in {:.0?}",
        extractor.len(),
        build_start.elapsed()
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    // --list: print the compiled extractions and exit
    if args.list {
        for extraction in extractor.extractions() {
            writeln!(
                out,
                "{}\t{}\t{}",
                extraction.index(),
                extraction.name(),
                extraction.pattern_source()
            )?;
        }
        out.flush()?;
        return Ok(0);
    }

    let inputs = read_inputs(&args.inputs)?;
    let mode = args.fallback_mode();
    let mut errors = 0;
    for input in &inputs {
        let outcomes = extract_lines(&extractor, input, mode, args.parallel);
        errors += write_reports(&mut out, input, &outcomes, args.matched_only)?;
    }
    out.flush()?;

    Ok(if errors == 0 { 0 } else { 1 })
}

/// Read every input file, or stdin when `paths` is empty.
pub fn read_inputs(paths: &[PathBuf]) -> Result<Vec<InputLines>> {
    if paths.is_empty() {
        let lines = io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .context("failed to read stdin")?;
        return Ok(vec![InputLines {
            source: "<stdin>".to_string(),
            lines,
        }]);
    }
    paths
        .iter()
        .map(|path| {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok(InputLines {
                source: path.display().to_string(),
                lines: contents.lines().map(str::to_string).collect(),
            })
        })
        .collect()
}

/// Extract every line of `input`, optionally on the rayon pool. Outcomes are
/// index-aligned with `input.lines`.
pub fn extract_lines(
    extractor: &Extractor,
    input: &InputLines,
    mode: FallbackMode,
    parallel: bool,
) -> Vec<Result<Option<ExtractionResult>, ExtractionError>> {
    if parallel {
        input
            .lines
            .par_iter()
            .map(|line| extractor.extract_with(line, mode))
            .collect()
    } else {
        input
            .lines
            .iter()
            .map(|line| extractor.extract_with(line, mode))
            .collect()
    }
}

/// Write one JSON object per line to `out`; drift errors go to stderr.
/// Returns the number of errors.
pub fn write_reports(
    out: &mut impl Write,
    input: &InputLines,
    outcomes: &[Result<Option<ExtractionResult>, ExtractionError>],
    matched_only: bool,
) -> Result<usize> {
    let mut errors = 0;
    for (i, outcome) in outcomes.iter().enumerate() {
        let line = i + 1;
        let result = match outcome {
            Ok(result) => result.as_ref(),
            Err(e) => {
                eprintln!("error: {}:{line}: {e}", input.source);
                errors += 1;
                continue;
            }
        };
        if matched_only && result.is_none() {
            continue;
        }
        let report = LineReport {
            source: &input.source,
            line,
            extraction: result.map(|r| r.name.as_str()),
            fields: result.map(|r| r.to_map()).unwrap_or_default(),
        };
        serde_json::to_writer(&mut *out, &report)?;
        writeln!(out)?;
    }
    Ok(errors)
}
