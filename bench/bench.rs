//! Timing harness for polyextract on a synthetic catalogue.
//!
//! Usage:
//!   cargo run --release --bin bench_polyextract                  # construct + extract
//!   cargo run --release --bin bench_polyextract -- construct     # construction only
//!   cargo run --release --bin bench_polyextract -- extract -n 500

use std::fmt::Write;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use polyextract::{
    ExtractionCooker, Extractor, FallbackMode, FancyRegexCooker, FlattenedExtraction, Piece,
    RegexCooker, RegexSetMatcherBuilder,
};

// --- CLI ---

#[derive(Parser)]
#[command(about = "Benchmark polyextract construction and extraction.")]
struct Args {
    /// Subcommand: construct, extract, or omit for all
    #[arg(default_value = "all")]
    mode: String,

    /// Number of synthetic definitions
    #[arg(short = 'n', long, default_value_t = 200)]
    definitions: usize,

    /// Number of input lines to extract
    #[arg(long, default_value_t = 100_000)]
    lines: usize,

    /// Timed repetitions per measurement (the best is reported)
    #[arg(long, default_value_t = 3)]
    runs: u32,

    /// Output markdown file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

// --- Synthetic workload ---

/// `svcN <verb> user=<user> took=<ms>ms`, one definition per service.
fn catalogue(n: usize) -> Vec<FlattenedExtraction> {
    (0..n)
        .map(|i| {
            FlattenedExtraction::new(
                format!("svc{i}"),
                vec![
                    Piece::text(format!("svc{i} ")),
                    Piece::expression("verb", vec![Piece::pattern("[a-z]+")]),
                    Piece::text(" user="),
                    Piece::expression("user", vec![Piece::pattern(r"\w+")]),
                    Piece::text(" took="),
                    Piece::expression("ms", vec![Piece::pattern(r"\d+")]),
                    Piece::text("ms"),
                ],
            )
        })
        .collect()
}

fn input_lines(definitions: usize, lines: usize) -> Vec<String> {
    (0..lines)
        .map(|i| {
            if i % 10 == 9 {
                format!("unrelated noise line {i}")
            } else {
                format!(
                    "svc{} get user=u{} took={}ms",
                    i % definitions.max(1),
                    i % 97,
                    i % 1000
                )
            }
        })
        .collect()
}

// --- Helpers ---

fn format_time(seconds: f64) -> String {
    if seconds < 0.001 {
        format!("{:.0}us", seconds * 1_000_000.0)
    } else if seconds < 1.0 {
        format!("{:.1}ms", seconds * 1000.0)
    } else {
        format!("{seconds:.2}s")
    }
}

fn best_of<T>(runs: u32, mut f: impl FnMut() -> T) -> (f64, T) {
    let mut best = f64::MAX;
    let mut last = None;
    for _ in 0..runs.max(1) {
        let start = Instant::now();
        let value = f();
        best = best.min(start.elapsed().as_secs_f64());
        last = Some(value);
    }
    (best, last.expect("at least one run"))
}

fn build(
    definitions: &[FlattenedExtraction],
    cooker: &dyn ExtractionCooker,
    parallel: bool,
) -> Extractor {
    let matcher = RegexSetMatcherBuilder::new();
    let result = if parallel {
        Extractor::construct_parallel(definitions, cooker, &matcher)
    } else {
        Extractor::construct_with(definitions, cooker, &matcher)
    };
    match result {
        Ok(extractor) => extractor,
        Err(e) => {
            eprintln!("construction failed: {e}");
            std::process::exit(1);
        }
    }
}

// --- Measurements ---

fn run_construct(args: &Args, definitions: &[FlattenedExtraction], report: &mut String) {
    writeln!(report, "## Construction ({} definitions)\n", definitions.len()).unwrap();
    writeln!(report, "| Backend | Sequential | Parallel |").unwrap();
    writeln!(report, "|---------|-----------:|---------:|").unwrap();
    let cookers: [(&str, Box<dyn ExtractionCooker>); 2] = [
        ("regex", Box::new(RegexCooker::new())),
        ("fancy", Box::new(FancyRegexCooker::new())),
    ];
    for (name, cooker) in &cookers {
        let (seq, _) = best_of(args.runs, || build(definitions, cooker.as_ref(), false));
        let (par, _) = best_of(args.runs, || build(definitions, cooker.as_ref(), true));
        eprintln!("construct {name}: {} / {}", format_time(seq), format_time(par));
        writeln!(report, "| {name} | {} | {} |", format_time(seq), format_time(par)).unwrap();
    }
    writeln!(report).unwrap();
}

fn run_extract(args: &Args, definitions: &[FlattenedExtraction], report: &mut String) {
    let lines = input_lines(definitions.len(), args.lines);
    writeln!(report, "## Extraction ({} lines)\n", lines.len()).unwrap();
    writeln!(report, "| Backend | Mode | Time | Lines/s | Matched |").unwrap();
    writeln!(report, "|---------|------|-----:|--------:|--------:|").unwrap();
    let cookers: [(&str, Box<dyn ExtractionCooker>); 2] = [
        ("regex", Box::new(RegexCooker::new())),
        ("fancy", Box::new(FancyRegexCooker::new())),
    ];
    for (name, cooker) in &cookers {
        let extractor = build(definitions, cooker.as_ref(), true);
        for mode in [FallbackMode::Strict, FallbackMode::Permissive] {
            let (secs, matched) = best_of(args.runs, || {
                lines
                    .iter()
                    .filter(|line| matches!(extractor.extract_with(line, mode), Ok(Some(_))))
                    .count()
            });
            let rate = lines.len() as f64 / secs.max(f64::EPSILON);
            eprintln!("extract {name} {mode:?}: {} ({matched} matched)", format_time(secs));
            writeln!(
                report,
                "| {name} | {mode:?} | {} | {rate:.0} | {matched} |",
                format_time(secs)
            )
            .unwrap();
        }
    }
    writeln!(report).unwrap();
}

fn main() {
    let args = Args::parse();
    let definitions = catalogue(args.definitions);
    let mut report = String::from("# polyextract benchmark\n\n");

    match args.mode.as_str() {
        "construct" => run_construct(&args, &definitions, &mut report),
        "extract" => run_extract(&args, &definitions, &mut report),
        "all" => {
            run_construct(&args, &definitions, &mut report);
            run_extract(&args, &definitions, &mut report);
        }
        other => {
            eprintln!("Unknown mode: {other}. Use construct, extract, or omit for all.");
            std::process::exit(1);
        }
    }

    match &args.output {
        Some(path) => {
            fs::write(path, &report).unwrap();
            eprintln!("\nWrote {}", path.display());
        }
        None => print!("{report}"),
    }
}
