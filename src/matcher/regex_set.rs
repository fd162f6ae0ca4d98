use regex::{RegexSet, RegexSetBuilder};

use super::{MatcherBuildError, MultiMatcher, MultiMatcherBuilder};

/// Default discriminator: one `RegexSet` over all anchored patterns.
#[derive(Debug, Clone)]
pub struct RegexSetMatcher {
    set: RegexSet,
}

impl MultiMatcher for RegexSetMatcher {
    fn matches(&self, input: &str) -> Vec<usize> {
        self.set.matches(input).into_iter().collect()
    }

    fn len(&self) -> usize {
        self.set.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegexSetMatcherBuilder {
    size_limit: Option<usize>,
    dfa_size_limit: Option<usize>,
}

impl RegexSetMatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size_limit(mut self, limit: usize) -> Self {
        self.size_limit = Some(limit);
        self
    }

    pub fn with_dfa_size_limit(mut self, limit: usize) -> Self {
        self.dfa_size_limit = Some(limit);
        self
    }

    /// Build the concrete matcher rather than a trait object.
    pub fn build_set(&self, patterns: &[String]) -> Result<RegexSetMatcher, MatcherBuildError> {
        let anchored = patterns.iter().map(|p| format!(r"\A(?:{p})\z"));
        let mut builder = RegexSetBuilder::new(anchored);
        if let Some(limit) = self.size_limit {
            builder.size_limit(limit);
        }
        if let Some(limit) = self.dfa_size_limit {
            builder.dfa_size_limit(limit);
        }
        let set = builder
            .build()
            .map_err(|e| MatcherBuildError::new(e.to_string()))?;
        log::debug!("built discriminator over {} patterns", set.len());
        Ok(RegexSetMatcher { set })
    }
}

impl MultiMatcherBuilder for RegexSetMatcherBuilder {
    fn build(&self, patterns: &[String]) -> Result<Box<dyn MultiMatcher>, MatcherBuildError> {
        Ok(Box::new(self.build_set(patterns)?))
    }
}
