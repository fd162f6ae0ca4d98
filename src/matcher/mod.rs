//! Multi-pattern discriminator.
//!
//! Given every definition's discriminator pattern, reports which of them
//! fully match a line. It may over-report (the extraction unit confirms
//! later) but must never miss a definition the extraction pattern accepts.

pub mod regex_set;

use std::fmt;

use thiserror::Error;

pub use regex_set::{RegexSetMatcher, RegexSetMatcherBuilder};

/// Built discriminator. Immutable and shareable.
pub trait MultiMatcher: Send + Sync + fmt::Debug {
    /// Indices of every pattern that fully matches `input`, in ascending
    /// (priority) order.
    fn matches(&self, input: &str) -> Vec<usize>;

    /// Number of patterns the matcher was built from.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds a [`MultiMatcher`] from the ordered discriminator patterns.
pub trait MultiMatcherBuilder: Send + Sync {
    fn build(&self, patterns: &[String]) -> Result<Box<dyn MultiMatcher>, MatcherBuildError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct MatcherBuildError {
    pub message: String,
}

impl MatcherBuildError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
