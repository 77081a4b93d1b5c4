//! Pattern IR for regular expression fragments
//!
//! A [`Pattern`] is an immutable value describing one piece of a regular
//! expression. Patterns are assembled bottom-up through the constructors on
//! this type, each of which checks its own invariants:
//! - Character sets (`One`, `NotOne`) are non-empty with distinct members
//! - Ranges (`Range`, `NotRange`) have `first < last`
//! - Alternations and sequences (`Or`, `And`) have at least two members
//! - Bounded repetitions have `minimum <= maximum`
//!
//! Turning a pattern into regex text is the job of [`crate::regex`].

use std::fmt;

use crate::error::PatternError;
use crate::regex::RegexEmitter;
use crate::rule::Rule;

/// A regular expression fragment
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Any single member of the set
    One(String),

    /// Any character outside the set
    NotOne(String),

    /// Any character in `[first, last]`
    Range {
        /// Inclusive lower bound
        first: char,
        /// Inclusive upper bound
        last: char,
    },

    /// Any character outside `[first, last]`
    NotRange {
        /// Inclusive lower bound
        first: char,
        /// Inclusive upper bound
        last: char,
    },

    /// Any single character
    Any,

    /// The literal character sequence
    All(String),

    /// Start of line anchor
    Start,

    /// End of line anchor
    End,

    /// Any one of the alternatives, tried in order
    Or(Vec<Pattern>),

    /// The concatenation of the sequence
    And(Vec<Pattern>),

    /// Between `minimum` and `maximum` repetitions
    Repeat {
        /// The repeated pattern
        repeated: Box<Pattern>,
        /// Lower bound
        minimum: u32,
        /// Upper bound
        maximum: u32,
    },

    /// At least `minimum` repetitions
    InfiniteRepeat {
        /// The repeated pattern
        repeated: Box<Pattern>,
        /// Lower bound
        minimum: u32,
    },

    /// A zero-width lookahead or lookbehind assertion
    Lookup {
        /// The asserted pattern
        looked: Box<Pattern>,
        /// Whether the pattern must match (positive) or must not (negative)
        wanted: bool,
        /// Whether to look behind the position instead of ahead
        behind: bool,
    },

    /// A capturing group whose text is scoped by `rule`
    Capture {
        /// The captured pattern
        pattern: Box<Pattern>,
        /// The rule applied to the captured text
        rule: Rule,
    },
}

impl Pattern {
    /// Match any single character of `set`
    pub fn one(set: impl Into<String>) -> Result<Self, PatternError> {
        let set = set.into();
        validate_set(&set)?;
        Ok(Pattern::One(set))
    }

    /// Match any character not in `set`
    pub fn not_one(set: impl Into<String>) -> Result<Self, PatternError> {
        let set = set.into();
        validate_set(&set)?;
        Ok(Pattern::NotOne(set))
    }

    /// Match exactly the character `c`
    pub fn literal_char(c: char) -> Self {
        Pattern::One(c.to_string())
    }

    /// Match any character in `[first, last]`
    pub fn range(first: char, last: char) -> Result<Self, PatternError> {
        validate_range(first, last)?;
        Ok(Pattern::Range { first, last })
    }

    /// Match any character outside `[first, last]`
    pub fn not_range(first: char, last: char) -> Result<Self, PatternError> {
        validate_range(first, last)?;
        Ok(Pattern::NotRange { first, last })
    }

    /// Match any character
    pub fn any() -> Self {
        Pattern::Any
    }

    /// Match the literal text
    pub fn all(literal: impl Into<String>) -> Self {
        Pattern::All(literal.into())
    }

    /// Start of line anchor (`^`)
    pub fn start() -> Self {
        Pattern::Start
    }

    /// End of line anchor (`$`)
    pub fn end() -> Self {
        Pattern::End
    }

    /// Match any one of at least two alternatives
    pub fn or(alternatives: impl IntoIterator<Item = Pattern>) -> Result<Self, PatternError> {
        let alternatives: Vec<_> = alternatives.into_iter().collect();
        if alternatives.len() < 2 {
            return Err(PatternError::TooFewAlternatives(alternatives.len()));
        }
        Ok(Pattern::Or(alternatives))
    }

    /// Match at least two patterns one after another
    pub fn and(sequence: impl IntoIterator<Item = Pattern>) -> Result<Self, PatternError> {
        let sequence: Vec<_> = sequence.into_iter().collect();
        if sequence.len() < 2 {
            return Err(PatternError::TooFewSequents(sequence.len()));
        }
        Ok(Pattern::And(sequence))
    }

    /// Repeat between `minimum` and `maximum` times
    pub fn repeat(repeated: Pattern, minimum: u32, maximum: u32) -> Result<Self, PatternError> {
        if maximum < minimum {
            return Err(PatternError::MisorderedRepeat { minimum, maximum });
        }
        Ok(Pattern::Repeat {
            repeated: Box::new(repeated),
            minimum,
            maximum,
        })
    }

    /// Repeat `minimum` or more times
    pub fn infinite_repeat(repeated: Pattern, minimum: u32) -> Self {
        Pattern::InfiniteRepeat {
            repeated: Box::new(repeated),
            minimum,
        }
    }

    /// Zero or one time (`?`)
    pub fn optional(pattern: Pattern) -> Self {
        Pattern::Repeat {
            repeated: Box::new(pattern),
            minimum: 0,
            maximum: 1,
        }
    }

    /// Zero or more times (`*`)
    pub fn zero_or_more(repeated: Pattern) -> Self {
        Self::infinite_repeat(repeated, 0)
    }

    /// One or more times (`+`)
    pub fn one_or_more(repeated: Pattern) -> Self {
        Self::infinite_repeat(repeated, 1)
    }

    /// `minimum` or more times
    pub fn at_least(repeated: Pattern, minimum: u32) -> Self {
        Self::infinite_repeat(repeated, minimum)
    }

    /// Between `minimum` and `maximum` times
    pub fn between(repeated: Pattern, minimum: u32, maximum: u32) -> Result<Self, PatternError> {
        Self::repeat(repeated, minimum, maximum)
    }

    /// Exactly `times` times
    pub fn exactly(repeated: Pattern, times: u32) -> Self {
        Pattern::Repeat {
            repeated: Box::new(repeated),
            minimum: times,
            maximum: times,
        }
    }

    /// A lookaround assertion
    pub fn lookup(looked: Pattern, wanted: bool, behind: bool) -> Self {
        Pattern::Lookup {
            looked: Box::new(looked),
            wanted,
            behind,
        }
    }

    /// Positive lookahead: `looked` follows
    pub fn before(looked: Pattern) -> Self {
        Self::lookup(looked, true, false)
    }

    /// Negative lookahead: `looked` does not follow
    pub fn not_before(looked: Pattern) -> Self {
        Self::lookup(looked, false, false)
    }

    /// Positive lookbehind: `looked` precedes
    pub fn after(looked: Pattern) -> Self {
        Self::lookup(looked, true, true)
    }

    /// Negative lookbehind: `looked` does not precede
    pub fn not_after(looked: Pattern) -> Self {
        Self::lookup(looked, false, true)
    }

    /// Capture `pattern` and scope the captured text with `rule`
    pub fn capture(pattern: Pattern, rule: Rule) -> Self {
        Pattern::Capture {
            pattern: Box::new(pattern),
            rule,
        }
    }

    /// Compile this pattern to regex source text
    pub fn to_regex(&self) -> String {
        let mut output = String::new();
        let mut captures = Vec::new();
        RegexEmitter::new(&mut output, &mut captures).regex(self);
        output
    }

    /// The rules bound to captures, in capture-group order
    pub fn captures(&self) -> Vec<Rule> {
        let mut output = String::new();
        let mut captures = Vec::new();
        RegexEmitter::new(&mut output, &mut captures).regex(self);
        captures
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_regex())
    }
}

fn validate_set(set: &str) -> Result<(), PatternError> {
    if set.is_empty() {
        return Err(PatternError::EmptySet);
    }
    let members: Vec<char> = set.chars().collect();
    for (second, member) in members.iter().enumerate() {
        if let Some(first) = members[..second].iter().position(|c| c == member) {
            return Err(PatternError::DuplicateMember {
                member: *member,
                first,
                second,
            });
        }
    }
    Ok(())
}

fn validate_range(first: char, last: char) -> Result<(), PatternError> {
    if first >= last {
        return Err(PatternError::MisorderedRange { first, last });
    }
    Ok(())
}
