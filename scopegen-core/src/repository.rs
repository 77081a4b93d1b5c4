//! Repository of named, shared rules
//!
//! The repository maps rule identity to a stable name. A registered rule is
//! written once under the document's `repository` object and referenced
//! everywhere else with `{"include":"#name"}`. This covers:
//! - Rules used from more than one place
//! - Rules that nest themselves through [`Rule::include`]

use std::collections::HashMap;

use crate::error::RuleError;
use crate::rule::{Rule, RuleId};

/// Symbols used for generated names, most significant symbol first
const NAME_DIGITS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// A named repository entry
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryEntry {
    /// The name used in `include` references
    pub name: String,
    /// The shared rule
    pub rule: Rule,
}

/// Ordered name table for shared rules
#[derive(Debug, Clone, Default)]
pub struct Repository {
    /// Entries in registration order, which is also emission order
    entries: Vec<RepositoryEntry>,
    /// Map from rule identity to entry index
    by_rule: HashMap<RuleId, usize>,
    /// Map from name to entry index
    by_name: HashMap<String, usize>,
    /// Counter behind generated names
    next_generated: u64,
}

impl Repository {
    /// Create an empty repository
    pub fn new() -> Self {
        Repository::default()
    }

    /// Register `rule` under `name`
    ///
    /// # Errors
    /// Returns an error if the name is empty or taken, if the rule is
    /// already registered, or if the rule is itself an include reference
    pub fn register(&mut self, rule: &Rule, name: impl Into<String>) -> Result<(), RuleError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RuleError::EmptyName);
        }
        if self.by_name.contains_key(&name) {
            return Err(RuleError::DuplicateRepositoryName(name));
        }
        if let Some(existing) = self.name_of(rule) {
            return Err(RuleError::AlreadyRegistered(existing.to_string()));
        }
        if rule.is_include() {
            return Err(RuleError::IncludeHasNoBody(name));
        }

        let index = self.entries.len();
        self.by_rule.insert(rule.id(), index);
        self.by_name.insert(name.clone(), index);
        self.entries.push(RepositoryEntry {
            name,
            rule: rule.clone(),
        });
        Ok(())
    }

    /// Register `rule` under the next free generated name
    ///
    /// Generated names come from a counter owned by this repository, so the
    /// same sequence of registrations always yields the same names.
    pub fn register_generated(&mut self, rule: &Rule) -> Result<String, RuleError> {
        let name = loop {
            let candidate = generated_name(self.next_generated);
            self.next_generated += 1;
            if !self.by_name.contains_key(&candidate) {
                break candidate;
            }
        };
        self.register(rule, name.clone())?;
        Ok(name)
    }

    /// The name `rule` is registered under
    pub fn name_of(&self, rule: &Rule) -> Option<&str> {
        self.by_rule
            .get(&rule.id())
            .map(|&index| self.entries[index].name.as_str())
    }

    /// The rule registered under `name`
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.by_name.get(name).map(|&index| &self.entries[index].rule)
    }

    /// Check if a name is registered
    pub fn has_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All entries in registration order
    pub fn entries(&self) -> &[RepositoryEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the repository has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Render `counter` in the 64-symbol name alphabet
fn generated_name(counter: u64) -> String {
    let base = NAME_DIGITS.len() as u64;
    let mut remaining = counter;
    let mut digits = Vec::new();
    loop {
        digits.push(NAME_DIGITS[(remaining % base) as usize] as char);
        remaining /= base;
        if remaining == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}
