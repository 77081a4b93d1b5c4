//! The top-level grammar aggregate

use crate::error::Result;
use crate::repository::Repository;
use crate::rule::Rule;
use crate::writer;

/// A named TextMate grammar: top-level rules plus the shared-rule repository
#[derive(Debug, Clone)]
pub struct Grammar {
    name: String,
    scope_root: String,
    top_level: Vec<Rule>,
    repository: Repository,
}

impl Grammar {
    /// Create a grammar without rules
    pub fn new(name: impl Into<String>, scope_root: impl Into<String>) -> Self {
        Grammar {
            name: name.into(),
            scope_root: scope_root.into(),
            top_level: Vec::new(),
            repository: Repository::new(),
        }
    }

    /// Create a grammar from all of its parts
    pub fn from_parts(
        name: impl Into<String>,
        scope_root: impl Into<String>,
        top_level: impl IntoIterator<Item = Rule>,
        repository: Repository,
    ) -> Self {
        Grammar {
            name: name.into(),
            scope_root: scope_root.into(),
            top_level: top_level.into_iter().collect(),
            repository,
        }
    }

    /// Append a top-level rule
    pub fn push(&mut self, rule: Rule) {
        self.top_level.push(rule);
    }

    /// Append several top-level rules
    pub fn extend(&mut self, rules: impl IntoIterator<Item = Rule>) {
        self.top_level.extend(rules);
    }

    /// Register a shared rule under `name`
    pub fn register(&mut self, rule: &Rule, name: impl Into<String>) -> Result<()> {
        self.repository.register(rule, name)?;
        Ok(())
    }

    /// Register a shared rule under a generated name
    pub fn register_generated(&mut self, rule: &Rule) -> Result<String> {
        Ok(self.repository.register_generated(rule)?)
    }

    /// Display name of the language
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root scope, e.g. `source.lm`
    pub fn scope_root(&self) -> &str {
        &self.scope_root
    }

    /// Top-level rules in search order
    pub fn top_level(&self) -> &[Rule] {
        &self.top_level
    }

    /// The shared-rule repository
    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Compile the grammar into its JSON document
    pub fn to_json(&self) -> Result<String> {
        writer::compile(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, RuleError};
    use crate::pattern::Pattern;
    use crate::rule::Data;

    #[test]
    fn test_accessors() {
        let mut grammar = Grammar::new("Lumen", "source.lm");
        let rule = Rule::conditional(Data::scoped("keyword"), Pattern::all("if"));
        grammar.push(rule.clone());
        grammar.register(&rule, "keyword").unwrap();

        assert_eq!(grammar.name(), "Lumen");
        assert_eq!(grammar.scope_root(), "source.lm");
        assert_eq!(grammar.top_level().len(), 1);
        assert_eq!(grammar.repository().name_of(&rule), Some("keyword"));
    }

    #[test]
    fn test_register_error_is_invalid_rule() {
        let mut grammar = Grammar::new("Lumen", "source.lm");
        let rule = Rule::unconditional(Data::empty());
        grammar.register(&rule, "a").unwrap();
        assert!(matches!(
            grammar.register(&rule, "b"),
            Err(Error::InvalidRule(RuleError::AlreadyRegistered(_)))
        ));
    }

    #[test]
    fn test_register_generated() {
        let mut grammar = Grammar::new("Lumen", "source.lm");
        let first = Rule::unconditional(Data::scoped("first"));
        let second = Rule::unconditional(Data::scoped("second"));
        assert_eq!(grammar.register_generated(&first), Ok("A".to_string()));
        assert_eq!(grammar.register_generated(&second), Ok("B".to_string()));
        assert_eq!(
            grammar.register_generated(&first),
            Err(Error::InvalidRule(RuleError::AlreadyRegistered("A".to_string())))
        );
    }

    #[test]
    fn test_from_parts() {
        let shared = Rule::unconditional(Data::scoped("shared"));
        let mut repository = Repository::new();
        repository.register(&shared, "shared").unwrap();
        let grammar = Grammar::from_parts("Lumen", "source.lm", vec![shared], repository);
        assert_eq!(grammar.top_level().len(), 1);
        assert_eq!(grammar.repository().len(), 1);
    }
}
