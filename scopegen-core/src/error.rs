//! Error types for grammar construction and compilation
//!
//! This module provides error handling using the `thiserror` crate.
//! Errors are categorized by their source: pattern construction, rule
//! construction, or grammar compilation.

use thiserror::Error;

/// The main error type for the grammar compiler
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A pattern constructor was given arguments that break its invariants
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] PatternError),

    /// A rule or repository operation was given arguments that break its invariants
    #[error("invalid rule: {0}")]
    InvalidRule(#[from] RuleError),

    /// Errors that occur while compiling a grammar into its document
    #[error("compilation error: {0}")]
    Compile(#[from] CompileError),
}

/// Violated pattern invariants
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatternError {
    /// A character set without members
    #[error("character set is empty")]
    EmptySet,

    /// The same character appears twice in a set
    #[error("character '{member}' repeats in set at indices {first} and {second}")]
    DuplicateMember {
        /// The repeated character
        member: char,
        /// Index of the first occurrence
        first: usize,
        /// Index of the repeated occurrence
        second: usize,
    },

    /// Range bounds that are equal or reversed
    #[error("range '{first}'-'{last}' must have its first bound below its last")]
    MisorderedRange {
        /// Lower bound as given
        first: char,
        /// Upper bound as given
        last: char,
    },

    /// An alternation with fewer than two alternatives
    #[error("alternation needs at least 2 alternatives, got {0}")]
    TooFewAlternatives(usize),

    /// A sequence with fewer than two members
    #[error("sequence needs at least 2 members, got {0}")]
    TooFewSequents(usize),

    /// Repetition bounds where the maximum is below the minimum
    #[error("repeat upper bound {maximum} is less than the lower bound {minimum}")]
    MisorderedRepeat {
        /// Lower bound as given
        minimum: u32,
        /// Upper bound as given
        maximum: u32,
    },
}

/// Violated rule or repository invariants
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    /// The rule already carries a scope
    #[error("rule already has a scope")]
    ScopeAlreadySet,

    /// The rule already carries inner rules
    #[error("rule already has inner rules")]
    InnerAlreadySet,

    /// A scope given as the empty string
    #[error("scope is empty")]
    EmptyScope,

    /// A repository or include name given as the empty string
    #[error("repository name is empty")]
    EmptyName,

    /// Scope or inner rules attached to an include reference
    #[error("include reference '{0}' cannot have a scope or inner rules")]
    IncludeHasNoBody(String),

    /// Two repository entries under the same name
    #[error("duplicate repository name '{0}'")]
    DuplicateRepositoryName(String),

    /// The same rule registered twice
    #[error("rule is already registered as '{0}'")]
    AlreadyRegistered(String),
}

/// Errors that occur while emitting the grammar document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A shared or self-referencing rule has no repository entry
    #[error("{rule} is shared or self-referencing but has no repository name")]
    MissingRepositoryName {
        /// Description of the offending rule
        rule: String,
    },
}

/// Result type alias for grammar operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_member_display() {
        let err = PatternError::DuplicateMember {
            member: 'a',
            first: 0,
            second: 2,
        };
        assert_eq!(
            err.to_string(),
            "character 'a' repeats in set at indices 0 and 2"
        );
    }

    #[test]
    fn test_misordered_range_display() {
        let err = PatternError::MisorderedRange {
            first: 'z',
            last: 'a',
        };
        assert_eq!(
            err.to_string(),
            "range 'z'-'a' must have its first bound below its last"
        );
    }

    #[test]
    fn test_error_from_pattern_error() {
        let err: Error = PatternError::EmptySet.into();
        assert_eq!(err.to_string(), "invalid pattern: character set is empty");
    }

    #[test]
    fn test_error_from_rule_error() {
        let err: Error = RuleError::DuplicateRepositoryName("comment".to_string()).into();
        assert_eq!(
            err.to_string(),
            "invalid rule: duplicate repository name 'comment'"
        );
    }

    #[test]
    fn test_missing_repository_name_display() {
        let err: Error = CompileError::MissingRepositoryName {
            rule: "rule scoped 'comment.block'".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "compilation error: rule scoped 'comment.block' is shared or \
             self-referencing but has no repository name"
        );
    }
}
