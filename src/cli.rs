use std::path::PathBuf;

use clap::Parser;

use crate::config::Backend;
use crate::extractor::FallbackMode;

#[derive(Parser, Debug)]
#[command(
    name = "polyextract",
    version,
    about = "Extract named fields from lines using a catalogue of patterns"
)]
pub struct Args {
    /// Files to read lines from (stdin when none are given)
    pub inputs: Vec<PathBuf>,

    /// Definitions file (YAML, or JSON with a .json extension)
    #[arg(short, long, value_name = "FILE")]
    pub definitions: PathBuf,

    /// Keep trying lower-priority definitions when the best candidate fails
    /// instead of reporting an error
    #[arg(long)]
    pub safe: bool,

    /// Override the extraction backend from the definitions file
    #[arg(long, value_name = "BACKEND", value_parser = ["regex", "fancy"])]
    pub backend: Option<String>,

    /// Compile definitions and process lines on all cores
    #[arg(short = 'P', long)]
    pub parallel: bool,

    /// Only print lines that matched a definition
    #[arg(long)]
    pub matched_only: bool,

    /// Print each compiled extraction (index, name, generated pattern), then exit
    #[arg(long)]
    pub list: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    pub fn fallback_mode(&self) -> FallbackMode {
        if self.safe {
            FallbackMode::Permissive
        } else {
            FallbackMode::Strict
        }
    }

    /// Backend requested on the command line, if any.
    pub fn backend_override(&self) -> Option<Backend> {
        self.backend.as_deref().and_then(|s| s.parse().ok())
    }
}
