//! Scopegen Core Library
//!
//! A typed pattern algebra compiled to regex text, and a single-pass
//! compiler from rule trees to TextMate grammar documents.

pub mod error;
pub mod grammar;
pub mod json;
pub mod pattern;
pub mod regex;
pub mod repository;
pub mod rule;
pub mod writer;

pub use error::{CompileError, Error, PatternError, Result, RuleError};
pub use grammar::Grammar;
pub use json::{JsonString, JsonWriter};
pub use pattern::Pattern;
pub use regex::{RegexEmitter, Sink};
pub use repository::{Repository, RepositoryEntry};
pub use rule::{Data, Rule, RuleId, RuleNode};
pub use writer::compile;
