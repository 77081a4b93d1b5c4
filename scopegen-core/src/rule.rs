//! Rule IR for tokenization constructs
//!
//! A [`Rule`] is a cheaply clonable handle to an immutable rule node. Clones
//! share the node, and the repository relies on that identity: registering a
//! rule and then placing clones of the same handle in several spots makes
//! the compiler emit one definition plus `include` references.

use std::sync::Arc;

use crate::error::RuleError;
use crate::pattern::Pattern;

/// The scope and nested rules shared by every rule kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Data {
    /// Scope name applied to text matched by the rule
    pub scope: Option<String>,
    /// Rules searched, in order, within the rule's text
    pub inner: Vec<Rule>,
}

impl Data {
    /// No scope and no inner rules
    pub fn empty() -> Self {
        Data::default()
    }

    /// A scope and no inner rules
    pub fn scoped(scope: impl Into<String>) -> Self {
        Data {
            scope: Some(scope.into()),
            inner: Vec::new(),
        }
    }

    /// Inner rules without a scope
    pub fn combined(inner: impl IntoIterator<Item = Rule>) -> Self {
        Data {
            scope: None,
            inner: inner.into_iter().collect(),
        }
    }

    /// A scope together with inner rules
    pub fn new(scope: impl Into<String>, inner: impl IntoIterator<Item = Rule>) -> Self {
        Data {
            scope: Some(scope.into()),
            inner: inner.into_iter().collect(),
        }
    }
}

/// The closed set of rule kinds
#[derive(Debug, Clone)]
pub enum RuleNode {
    /// Scope-only container; its inner rules are searched in place
    Unconditional(Data),

    /// A `match` rule: the scope applies to the whole match
    Conditional {
        /// Scope and inner rules
        data: Data,
        /// The pattern that fires the rule
        condition: Pattern,
    },

    /// A `begin`/`end` block; inner rules apply between the delimiters
    Delimitated {
        /// Scope and inner rules
        data: Data,
        /// Opening delimiter
        begin: Pattern,
        /// Closing delimiter
        end: Pattern,
    },

    /// A by-name reference to a repository entry
    Include(String),
}

/// Identity of a rule node, stable while any handle to it is alive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(usize);

/// Shared handle to an immutable rule node
#[derive(Debug, Clone)]
pub struct Rule {
    node: Arc<RuleNode>,
}

impl Rule {
    fn from_node(node: RuleNode) -> Self {
        Rule {
            node: Arc::new(node),
        }
    }

    /// A scope-only container
    pub fn unconditional(data: Data) -> Self {
        Self::from_node(RuleNode::Unconditional(data))
    }

    /// A rule fired by a single pattern
    pub fn conditional(data: Data, condition: Pattern) -> Self {
        Self::from_node(RuleNode::Conditional { data, condition })
    }

    /// A block between `begin` and `end`
    pub fn delimitated(data: Data, begin: Pattern, end: Pattern) -> Self {
        Self::from_node(RuleNode::Delimitated { data, begin, end })
    }

    /// A reference to the repository entry called `name`
    ///
    /// This is how a rule nests itself: a block rule lists an include of its
    /// own repository name among its inner rules.
    pub fn include(name: impl Into<String>) -> Result<Self, RuleError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RuleError::EmptyName);
        }
        Ok(Self::from_node(RuleNode::Include(name)))
    }

    /// The rule's node
    pub fn node(&self) -> &RuleNode {
        &self.node
    }

    /// Scope and inner rules, absent for includes
    pub fn data(&self) -> Option<&Data> {
        match self.node.as_ref() {
            RuleNode::Unconditional(data)
            | RuleNode::Conditional { data, .. }
            | RuleNode::Delimitated { data, .. } => Some(data),
            RuleNode::Include(_) => None,
        }
    }

    /// The scope name, if any
    pub fn scope(&self) -> Option<&str> {
        self.data().and_then(|data| data.scope.as_deref())
    }

    /// Nested rules, empty for includes
    pub fn inner(&self) -> &[Rule] {
        match self.data() {
            Some(data) => &data.inner,
            None => &[],
        }
    }

    /// Whether this is an include reference
    pub fn is_include(&self) -> bool {
        matches!(self.node.as_ref(), RuleNode::Include(_))
    }

    /// The identity of the underlying node
    pub fn id(&self) -> RuleId {
        RuleId(Arc::as_ptr(&self.node) as usize)
    }

    /// Whether both handles point at the same node
    pub fn same(&self, other: &Rule) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// A copy of this rule with `scope` set
    pub fn with_scope(&self, scope: impl Into<String>) -> Result<Self, RuleError> {
        let scope = scope.into();
        if scope.is_empty() {
            return Err(RuleError::EmptyScope);
        }
        let mut node = self.node.as_ref().clone();
        let data = data_mut(&mut node)?;
        if data.scope.is_some() {
            return Err(RuleError::ScopeAlreadySet);
        }
        data.scope = Some(scope);
        Ok(Self::from_node(node))
    }

    /// A copy of this rule with `inner` as its nested rules
    pub fn with_inner(&self, inner: impl IntoIterator<Item = Rule>) -> Result<Self, RuleError> {
        let mut node = self.node.as_ref().clone();
        let data = data_mut(&mut node)?;
        if !data.inner.is_empty() {
            return Err(RuleError::InnerAlreadySet);
        }
        data.inner = inner.into_iter().collect();
        Ok(Self::from_node(node))
    }

    /// Short human-readable description for error messages
    pub fn describe(&self) -> String {
        let kind = match self.node.as_ref() {
            RuleNode::Unconditional(_) => "unconditional rule",
            RuleNode::Conditional { .. } => "match rule",
            RuleNode::Delimitated { .. } => "begin/end rule",
            RuleNode::Include(name) => return format!("include of '{}'", name),
        };
        match self.scope() {
            Some(scope) => format!("{} scoped '{}'", kind, scope),
            None => format!("unscoped {}", kind),
        }
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

fn data_mut(node: &mut RuleNode) -> Result<&mut Data, RuleError> {
    match node {
        RuleNode::Unconditional(data)
        | RuleNode::Conditional { data, .. }
        | RuleNode::Delimitated { data, .. } => Ok(data),
        RuleNode::Include(name) => Err(RuleError::IncludeHasNoBody(name.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_identity() {
        let rule = Rule::unconditional(Data::scoped("comment"));
        let clone = rule.clone();
        assert!(rule.same(&clone));
        assert_eq!(rule.id(), clone.id());
    }

    #[test]
    fn test_equal_content_is_distinct() {
        let first = Rule::unconditional(Data::scoped("comment"));
        let second = Rule::unconditional(Data::scoped("comment"));
        assert_ne!(first, second);
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_accessors() {
        let child = Rule::conditional(Data::scoped("keyword"), Pattern::all("if"));
        let rule = Rule::delimitated(
            Data::new("string", vec![child.clone()]),
            Pattern::all("\""),
            Pattern::all("\""),
        );
        assert_eq!(rule.scope(), Some("string"));
        assert_eq!(rule.inner().len(), 1);
        assert!(rule.inner()[0].same(&child));
        assert!(!rule.is_include());
    }

    #[test]
    fn test_with_scope() {
        let rule = Rule::conditional(Data::empty(), Pattern::all("if"));
        let scoped = rule.with_scope("keyword.control").unwrap();
        assert_eq!(scoped.scope(), Some("keyword.control"));
        assert_eq!(rule.scope(), None);
        assert_eq!(
            scoped.with_scope("keyword.other"),
            Err(RuleError::ScopeAlreadySet)
        );
        assert_eq!(rule.with_scope(""), Err(RuleError::EmptyScope));
    }

    #[test]
    fn test_with_inner() {
        let child = Rule::unconditional(Data::scoped("inner"));
        let rule = Rule::unconditional(Data::empty());
        let nested = rule.with_inner(vec![child]).unwrap();
        assert_eq!(nested.inner().len(), 1);
        assert_eq!(
            nested.with_inner(Vec::new()),
            Err(RuleError::InnerAlreadySet)
        );
    }

    #[test]
    fn test_include_has_no_body() {
        let include = Rule::include("block").unwrap();
        assert!(include.is_include());
        assert!(include.data().is_none());
        assert!(include.inner().is_empty());
        assert_eq!(
            include.with_scope("comment"),
            Err(RuleError::IncludeHasNoBody("block".to_string()))
        );
        assert_eq!(Rule::include(""), Err(RuleError::EmptyName));
    }

    #[test]
    fn test_describe() {
        let rule = Rule::conditional(Data::scoped("constant.numeric"), Pattern::any());
        assert_eq!(rule.describe(), "match rule scoped 'constant.numeric'");
        let rule = Rule::unconditional(Data::empty());
        assert_eq!(rule.describe(), "unscoped unconditional rule");
        let rule = Rule::include("block").unwrap();
        assert_eq!(rule.describe(), "include of 'block'");
    }
}
