use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::cooker::{ExtractionCooker, FancyRegexCooker, RegexCooker};
use crate::error::ConstructionError;
use crate::extractor::Extractor;
use crate::matcher::RegexSetMatcherBuilder;
use crate::piece::FlattenedExtraction;

/// Which extraction backend compiles the definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// The `regex` crate: linear time, no look-around.
    #[default]
    Regex,
    /// `fancy-regex`: backtracking, look-around and back-references.
    #[serde(alias = "fancy-regex")]
    Fancy,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "regex" => Ok(Backend::Regex),
            "fancy" | "fancy-regex" => Ok(Backend::Fancy),
            other => bail!("unknown backend '{other}' (expected regex or fancy)"),
        }
    }
}

/// Construction options, usually read from the `options:` section of a
/// definitions file. Every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorOptions {
    pub backend: Backend,
    /// Compiled-size cap for each extraction regex and for the discriminator.
    pub size_limit: Option<usize>,
    /// Lazy-DFA cache cap for the discriminator.
    pub dfa_size_limit: Option<usize>,
    /// Backtracking step cap for the `fancy` backend.
    pub backtrack_limit: Option<usize>,
    /// Compile definitions on the rayon pool.
    pub parallel: bool,
}

impl ExtractorOptions {
    pub fn cooker(&self) -> Box<dyn ExtractionCooker> {
        match self.backend {
            Backend::Regex => {
                let mut cooker = RegexCooker::new();
                if let Some(limit) = self.size_limit {
                    cooker = cooker.with_size_limit(limit);
                }
                Box::new(cooker)
            }
            Backend::Fancy => {
                let mut cooker = FancyRegexCooker::new();
                if let Some(limit) = self.backtrack_limit {
                    cooker = cooker.with_backtrack_limit(limit);
                }
                Box::new(cooker)
            }
        }
    }

    pub fn matcher_builder(&self) -> RegexSetMatcherBuilder {
        let mut builder = RegexSetMatcherBuilder::new();
        if let Some(limit) = self.size_limit {
            builder = builder.with_size_limit(limit);
        }
        if let Some(limit) = self.dfa_size_limit {
            builder = builder.with_dfa_size_limit(limit);
        }
        builder
    }

    pub fn build(
        &self,
        definitions: &[FlattenedExtraction],
    ) -> Result<Extractor, ConstructionError> {
        let cooker = self.cooker();
        let matcher_builder = self.matcher_builder();
        if self.parallel {
            Extractor::construct_parallel(definitions, cooker.as_ref(), &matcher_builder)
        } else {
            Extractor::construct_with(definitions, cooker.as_ref(), &matcher_builder)
        }
    }
}

/// Contents of a definitions file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionsFile {
    #[serde(default)]
    pub options: ExtractorOptions,
    #[serde(default)]
    pub extractions: Vec<FlattenedExtraction>,
}

/// Load a definitions file: JSON when the extension is `.json`, YAML
/// otherwise. Locations without a source get the file path.
pub fn load_definitions(path: &Path) -> Result<DefinitionsFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read definitions {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let mut file = parse_definitions(&contents, is_json)
        .with_context(|| format!("failed to parse definitions {}", path.display()))?;
    let source = path.display().to_string();
    for definition in &mut file.extractions {
        definition.fill_source(&source);
    }
    Ok(file)
}

pub fn parse_definitions(contents: &str, is_json: bool) -> Result<DefinitionsFile> {
    if is_json {
        Ok(serde_json::from_str(contents)?)
    } else {
        Ok(serde_yml::from_str(contents)?)
    }
}
