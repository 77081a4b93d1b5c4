//! Grammar compiler: [`Grammar`] to TextMate JSON in a single pass
//!
//! Rules are written straight into a [`JsonWriter`] while their patterns are
//! streamed through a [`RegexEmitter`], so regex text never exists apart
//! from the document. Capture rules gathered while a `match`, `begin` or
//! `end` pattern is emitted are written right after it, numbered from 1.
//!
//! Every rule placed in a `patterns` array is either a repository entry,
//! written as an include reference, or inlined. Inlining the same rule a
//! second time means it is shared without a repository name, which fails
//! with [`CompileError::MissingRepositoryName`] rather than duplicating it.
//! Capture bodies are copies by construction: a capture rule is written out
//! in full wherever its pattern appears, and nothing beneath it counts as
//! sharing.

use std::collections::HashSet;

use log::{debug, trace};

use crate::error::{CompileError, Result};
use crate::grammar::Grammar;
use crate::json::JsonWriter;
use crate::pattern::Pattern;
use crate::regex::{RegexEmitter, Sink};
use crate::rule::{Rule, RuleId, RuleNode};

/// Compile `grammar` into its JSON document
///
/// # Example
/// ```
/// use scopegen_core::{compile, Data, Grammar, Pattern, Rule};
///
/// let mut grammar = Grammar::new("Demo", "source.demo");
/// grammar.push(Rule::conditional(Data::scoped("keyword"), Pattern::all("if")));
/// let json = compile(&grammar).unwrap();
/// assert_eq!(
///     json,
///     r#"{"name":"Demo","scopeName":"source.demo","patterns":[{"name":"keyword","match":"if"}],"repository":{}}"#
/// );
/// ```
pub fn compile(grammar: &Grammar) -> Result<String> {
    debug!(
        "compiling grammar '{}' with {} top-level rules and {} repository entries",
        grammar.name(),
        grammar.top_level().len(),
        grammar.repository().len()
    );
    let mut writer = Writer::new(grammar);
    writer.document()?;
    let json = writer.json.finish();
    debug!("compiled grammar '{}' into {} bytes", grammar.name(), json.len());
    Ok(json)
}

struct Writer<'g> {
    grammar: &'g Grammar,
    json: JsonWriter,
    /// Unregistered rules already inlined in some `patterns` array
    inlined: HashSet<RuleId>,
    /// Nesting depth of capture bodies being written
    capture_depth: usize,
}

impl<'g> Writer<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        Writer {
            grammar,
            json: JsonWriter::new(),
            inlined: HashSet::new(),
            capture_depth: 0,
        }
    }

    fn document(&mut self) -> Result<()> {
        let grammar = self.grammar;
        self.json.begin_object();
        self.json.field("name", grammar.name());
        self.json.field("scopeName", grammar.scope_root());

        self.json.key("patterns");
        self.patterns(grammar.top_level())?;

        self.json.key("repository");
        self.json.begin_object();
        for entry in grammar.repository().entries() {
            trace!("defining repository entry '{}'", entry.name);
            self.json.key(&entry.name);
            self.object(&entry.rule)?;
        }
        self.json.end_object();

        self.json.end_object();
        Ok(())
    }

    fn patterns(&mut self, rules: &[Rule]) -> Result<()> {
        self.json.begin_array();
        for rule in rules {
            self.access(rule)?;
        }
        self.json.end_array();
        Ok(())
    }

    /// Write `rule` as a `patterns` element: an include if it has a
    /// repository name, its full body otherwise
    fn access(&mut self, rule: &Rule) -> Result<()> {
        let grammar = self.grammar;
        if let Some(name) = grammar.repository().name_of(rule) {
            self.include(name);
            return Ok(());
        }
        if !rule.is_include() && self.capture_depth == 0 && !self.inlined.insert(rule.id()) {
            return Err(CompileError::MissingRepositoryName {
                rule: rule.describe(),
            }
            .into());
        }
        self.object(rule)
    }

    /// Write the full body of `rule`
    fn object(&mut self, rule: &Rule) -> Result<()> {
        let data = match rule.node() {
            RuleNode::Include(name) => {
                if !self.grammar.repository().has_name(name) {
                    return Err(CompileError::MissingRepositoryName {
                        rule: rule.describe(),
                    }
                    .into());
                }
                self.include(name);
                return Ok(());
            }
            RuleNode::Unconditional(data) => data,
            RuleNode::Conditional { data, .. } | RuleNode::Delimitated { data, .. } => data,
        };

        self.json.begin_object();
        if let Some(scope) = &data.scope {
            self.json.field("name", scope);
        }
        match rule.node() {
            RuleNode::Conditional { condition, .. } => {
                self.pattern("match", "captures", condition)?;
            }
            RuleNode::Delimitated { begin, end, .. } => {
                self.pattern("begin", "beginCaptures", begin)?;
                self.pattern("end", "endCaptures", end)?;
            }
            RuleNode::Unconditional(_) | RuleNode::Include(_) => {}
        }
        if !data.inner.is_empty() {
            self.json.key("patterns");
            self.patterns(&data.inner)?;
        }
        self.json.end_object();
        Ok(())
    }

    /// Write a regex field and, if it has captures, its captures object
    fn pattern(&mut self, key: &str, captures_key: &str, pattern: &Pattern) -> Result<()> {
        let mut captures = Vec::new();
        self.json.key(key);
        self.json
            .string_with(|sink| RegexEmitter::new(sink, &mut captures).regex(pattern));

        if captures.is_empty() {
            return Ok(());
        }
        self.json.key(captures_key);
        self.json.begin_object();
        self.capture_depth += 1;
        for (index, rule) in captures.iter().enumerate() {
            self.json.key(&(index + 1).to_string());
            self.object(rule)?;
        }
        self.capture_depth -= 1;
        self.json.end_object();
        Ok(())
    }

    fn include(&mut self, name: &str) {
        trace!("including repository entry '{}'", name);
        self.json.begin_object();
        self.json.key("include");
        self.json.string_with(|sink| {
            sink.push('#');
            sink.push_str(name);
        });
        self.json.end_object();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::rule::Data;

    fn grammar(rules: Vec<Rule>) -> Grammar {
        let mut grammar = Grammar::new("Test", "source.test");
        grammar.extend(rules);
        grammar
    }

    fn document(patterns: &str, repository: &str) -> String {
        format!(
            r#"{{"name":"Test","scopeName":"source.test","patterns":[{}],"repository":{{{}}}}}"#,
            patterns, repository
        )
    }

    #[test]
    fn test_empty_grammar() {
        let json = compile(&grammar(Vec::new())).unwrap();
        assert_eq!(json, document("", ""));
    }

    #[test]
    fn test_unconditional_rule() {
        let inner = Rule::conditional(Data::empty(), Pattern::all("x"));
        let rule = Rule::unconditional(Data::new("meta", vec![inner]));
        let json = compile(&grammar(vec![rule])).unwrap();
        assert_eq!(
            json,
            document(r#"{"name":"meta","patterns":[{"match":"x"}]}"#, "")
        );
    }

    #[test]
    fn test_unscoped_empty_rule() {
        let rule = Rule::unconditional(Data::empty());
        let json = compile(&grammar(vec![rule])).unwrap();
        assert_eq!(json, document("{}", ""));
    }

    #[test]
    fn test_match_rule_with_captures() {
        let keyword = Rule::unconditional(Data::scoped("keyword"));
        let name = Rule::unconditional(Data::scoped("entity.name"));
        let rule = Rule::conditional(
            Data::scoped("meta.definition"),
            Pattern::and(vec![
                Pattern::capture(Pattern::all("var"), keyword),
                Pattern::zero_or_more(Pattern::all(" ")),
                Pattern::capture(Pattern::all("x"), name),
            ])
            .unwrap(),
        );
        let json = compile(&grammar(vec![rule])).unwrap();
        assert_eq!(
            json,
            document(
                r#"{"name":"meta.definition","match":"(var) *(x)","captures":{"1":{"name":"keyword"},"2":{"name":"entity.name"}}}"#,
                ""
            )
        );
    }

    #[test]
    fn test_begin_end_captures_restart_numbering() {
        let open = Rule::unconditional(Data::scoped("punctuation.begin"));
        let close = Rule::unconditional(Data::scoped("punctuation.end"));
        let rule = Rule::delimitated(
            Data::scoped("string"),
            Pattern::capture(Pattern::all("\""), open),
            Pattern::capture(Pattern::all("\""), close),
        );
        let json = compile(&grammar(vec![rule])).unwrap();
        assert_eq!(
            json,
            document(
                r#"{"name":"string","begin":"(\")","beginCaptures":{"1":{"name":"punctuation.begin"}},"end":"(\")","endCaptures":{"1":{"name":"punctuation.end"}}}"#,
                ""
            )
        );
    }

    #[test]
    fn test_regex_is_json_escaped() {
        let rule = Rule::conditional(
            Data::empty(),
            Pattern::and(vec![Pattern::all("\\"), Pattern::one_or_more(Pattern::range('0', '9').unwrap())])
                .unwrap(),
        );
        let json = compile(&grammar(vec![rule])).unwrap();
        assert_eq!(json, document(r#"{"match":"\\\\[0-9]+"}"#, ""));
    }

    #[test]
    fn test_shared_rule_is_included() {
        let shared = Rule::conditional(Data::scoped("keyword"), Pattern::all("if"));
        let block = Rule::delimitated(
            Data::new("block", vec![shared.clone()]),
            Pattern::all("{"),
            Pattern::all("}"),
        );
        let mut grammar = grammar(vec![shared.clone(), block]);
        grammar.register(&shared, "keyword").unwrap();

        let json = compile(&grammar).unwrap();
        assert_eq!(
            json,
            document(
                r##"{"include":"#keyword"},{"name":"block","begin":"\\{","end":"\\}","patterns":[{"include":"#keyword"}]}"##,
                r#""keyword":{"name":"keyword","match":"if"}"#
            )
        );
    }

    #[test]
    fn test_unregistered_sharing_fails() {
        let shared = Rule::conditional(Data::scoped("keyword"), Pattern::all("if"));
        let block = Rule::unconditional(Data::new("block", vec![shared.clone()]));
        let result = compile(&grammar(vec![shared, block]));
        assert_eq!(
            result,
            Err(Error::Compile(CompileError::MissingRepositoryName {
                rule: "match rule scoped 'keyword'".to_string(),
            }))
        );
    }

    #[test]
    fn test_equal_but_distinct_rules_are_duplicated() {
        let first = Rule::conditional(Data::scoped("keyword"), Pattern::all("if"));
        let second = Rule::conditional(Data::scoped("keyword"), Pattern::all("if"));
        let json = compile(&grammar(vec![first, second])).unwrap();
        assert_eq!(
            json,
            document(
                r#"{"name":"keyword","match":"if"},{"name":"keyword","match":"if"}"#,
                ""
            )
        );
    }

    #[test]
    fn test_self_reference_through_include() {
        let nested = Rule::include("block").unwrap();
        let block = Rule::delimitated(
            Data::new("comment.block", vec![nested]),
            Pattern::all("#{"),
            Pattern::all("}#"),
        );
        let mut grammar = grammar(vec![block.clone()]);
        grammar.register(&block, "block").unwrap();

        let json = compile(&grammar).unwrap();
        assert_eq!(
            json,
            document(
                r##"{"include":"#block"}"##,
                r##""block":{"name":"comment.block","begin":"#\\{","end":"\\}#","patterns":[{"include":"#block"}]}"##
            )
        );
    }

    #[test]
    fn test_unknown_include_fails() {
        let nested = Rule::include("missing").unwrap();
        let block = Rule::unconditional(Data::new("block", vec![nested]));
        let result = compile(&grammar(vec![block]));
        assert_eq!(
            result,
            Err(Error::Compile(CompileError::MissingRepositoryName {
                rule: "include of 'missing'".to_string(),
            }))
        );
    }

    #[test]
    fn test_repository_only_entry_is_defined() {
        let unused = Rule::unconditional(Data::scoped("unused"));
        let mut grammar = grammar(Vec::new());
        grammar.register(&unused, "unused").unwrap();
        let json = compile(&grammar).unwrap();
        assert_eq!(json, document("", r#""unused":{"name":"unused"}"#));
    }

    #[test]
    fn test_capture_body_repeats_across_begin_and_end() {
        let x = Rule::conditional(Data::scoped("x"), Pattern::all("x"));
        let punctuation = Rule::unconditional(Data::new("punctuation", vec![x]));
        let rule = Rule::delimitated(
            Data::scoped("block"),
            Pattern::capture(Pattern::all("{"), punctuation.clone()),
            Pattern::capture(Pattern::all("}"), punctuation),
        );
        let json = compile(&grammar(vec![rule])).unwrap();
        assert_eq!(
            json,
            document(
                r#"{"name":"block","begin":"(\\{)","beginCaptures":{"1":{"name":"punctuation","patterns":[{"name":"x","match":"x"}]}},"end":"(\\})","endCaptures":{"1":{"name":"punctuation","patterns":[{"name":"x","match":"x"}]}}}"#,
                ""
            )
        );
    }

    #[test]
    fn test_sharing_outside_captures_still_fails() {
        let x = Rule::conditional(Data::scoped("x"), Pattern::all("x"));
        let punctuation = Rule::unconditional(Data::new("punctuation", vec![x.clone()]));
        let rule = Rule::conditional(
            Data::empty(),
            Pattern::capture(Pattern::all("{"), punctuation),
        );
        let result = compile(&grammar(vec![rule, x.clone(), x]));
        assert_eq!(
            result,
            Err(Error::Compile(CompileError::MissingRepositoryName {
                rule: "match rule scoped 'x'".to_string(),
            }))
        );
    }

    #[test]
    fn test_capture_rule_with_inner_patterns() {
        let escape = Rule::conditional(Data::scoped("constant.character.escape"), Pattern::all("\\n"));
        let content = Rule::unconditional(Data::new("string.content", vec![escape]));
        let rule = Rule::conditional(
            Data::empty(),
            Pattern::capture(Pattern::one_or_more(Pattern::any()), content),
        );
        let json = compile(&grammar(vec![rule])).unwrap();
        assert_eq!(
            json,
            document(
                r#"{"match":"(.+)","captures":{"1":{"name":"string.content","patterns":[{"name":"constant.character.escape","match":"\\\\n"}]}}}"#,
                ""
            )
        );
    }
}
