//! The compiled extractor: discriminator plus one extraction unit per
//! definition, built together and immutable afterwards.
//!
//! Thread safety: an [`Extractor`] holds no interior mutability. Share it
//! behind an `Arc` (or a plain reference with rayon) and call `extract`
//! from any number of threads.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::compiler::compile_definition;
use crate::cooker::{CookedExtraction, ExtractionCooker, RegexCooker};
use crate::error::{ConstructionError, ExtractionError};
use crate::matcher::{MultiMatcher, MultiMatcherBuilder, RegexSetMatcherBuilder};
use crate::piece::FlattenedExtraction;
use crate::result::ExtractionResult;

/// How to react when the discriminator's top candidate fails extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackMode {
    /// Report the disagreement as an [`ExtractionError`].
    #[default]
    Strict,
    /// Try the remaining candidates in priority order.
    Permissive,
}

#[derive(Debug)]
pub struct Extractor {
    matcher: Box<dyn MultiMatcher>,
    extractions: Vec<CookedExtraction>,
}

impl Extractor {
    /// Build with the default backends (`regex` cooker, `RegexSet` discriminator).
    pub fn construct(definitions: &[FlattenedExtraction]) -> Result<Self, ConstructionError> {
        Self::construct_with(
            definitions,
            &RegexCooker::new(),
            &RegexSetMatcherBuilder::new(),
        )
    }

    /// Build with explicit backends.
    pub fn construct_with(
        definitions: &[FlattenedExtraction],
        cooker: &dyn ExtractionCooker,
        matcher_builder: &dyn MultiMatcherBuilder,
    ) -> Result<Self, ConstructionError> {
        Self::build(definitions, cooker, matcher_builder, false)
    }

    /// Like [`construct_with`](Self::construct_with), compiling definitions
    /// on the rayon pool. The outcome is identical to the sequential build;
    /// when several definitions fail, the error reported is one of them.
    pub fn construct_parallel(
        definitions: &[FlattenedExtraction],
        cooker: &dyn ExtractionCooker,
        matcher_builder: &dyn MultiMatcherBuilder,
    ) -> Result<Self, ConstructionError> {
        Self::build(definitions, cooker, matcher_builder, true)
    }

    fn build(
        definitions: &[FlattenedExtraction],
        cooker: &dyn ExtractionCooker,
        matcher_builder: &dyn MultiMatcherBuilder,
        parallel: bool,
    ) -> Result<Self, ConstructionError> {
        check_unique_names(definitions)?;

        let compiled: Vec<(String, CookedExtraction)> = if parallel {
            definitions
                .par_iter()
                .enumerate()
                .map(|(index, definition)| compile_one(index, definition, cooker))
                .collect::<Result<_, _>>()?
        } else {
            definitions
                .iter()
                .enumerate()
                .map(|(index, definition)| compile_one(index, definition, cooker))
                .collect::<Result<_, _>>()?
        };
        let (patterns, extractions): (Vec<String>, Vec<CookedExtraction>) =
            compiled.into_iter().unzip();

        let matcher = matcher_builder
            .build(&patterns)
            .map_err(|e| ConstructionError::Matcher { message: e.message })?;
        log::debug!(
            "extractor ready: {} definitions, cooker {}",
            extractions.len(),
            cooker.name()
        );
        Ok(Self {
            matcher,
            extractions,
        })
    }

    /// Strict extraction. `Ok(None)` when nothing matches; an error when the
    /// discriminator's top candidate is rejected by its extraction unit.
    pub fn extract(&self, input: &str) -> Result<Option<ExtractionResult>, ExtractionError> {
        self.extract_with(input, FallbackMode::Strict)
    }

    /// Permissive extraction: walks every candidate in priority order and
    /// returns the first that extracts. Never errors.
    pub fn extract_safe(&self, input: &str) -> Option<ExtractionResult> {
        self.extract_with(input, FallbackMode::Permissive)
            .unwrap_or(None)
    }

    pub fn extract_with(
        &self,
        input: &str,
        mode: FallbackMode,
    ) -> Result<Option<ExtractionResult>, ExtractionError> {
        for index in self.matcher.matches(input) {
            let Some(extraction) = self.extractions.get(index) else {
                continue;
            };
            if let Some(result) = extraction.extract(input) {
                return Ok(Some(result));
            }
            match mode {
                FallbackMode::Strict => {
                    return Err(ExtractionError {
                        input: input.to_string(),
                        index,
                        name: extraction.name().to_string(),
                        pattern: extraction.pattern_source().to_string(),
                    });
                }
                FallbackMode::Permissive => {
                    log::debug!(
                        "candidate #{index} ({}) rejected input, trying next",
                        extraction.name()
                    );
                }
            }
        }
        Ok(None)
    }

    /// Compiled extraction units, index-aligned with the definitions.
    pub fn extractions(&self) -> &[CookedExtraction] {
        &self.extractions
    }

    pub fn matcher(&self) -> &dyn MultiMatcher {
        self.matcher.as_ref()
    }

    pub fn len(&self) -> usize {
        self.extractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractions.is_empty()
    }
}

fn check_unique_names(definitions: &[FlattenedExtraction]) -> Result<(), ConstructionError> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (index, definition) in definitions.iter().enumerate() {
        if let Some(&first_index) = seen.get(definition.name.as_str()) {
            return Err(ConstructionError::DuplicateDefinition {
                name: definition.name.clone(),
                first_index,
                location: definition.location.clone(),
            });
        }
        seen.insert(&definition.name, index);
    }
    Ok(())
}

fn compile_one(
    index: usize,
    definition: &FlattenedExtraction,
    cooker: &dyn ExtractionCooker,
) -> Result<(String, CookedExtraction), ConstructionError> {
    let fragments = compile_definition(definition, cooker)?;
    let cooked = cooker.cook(index, &fragments.extraction, definition)?;
    log::debug!(
        "compiled extraction #{index} ({}): {}",
        definition.name,
        fragments.extraction
    );
    Ok((fragments.discriminator, cooked))
}
