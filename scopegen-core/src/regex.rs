//! Regex emission for [`Pattern`] values
//!
//! The emitter writes regex source text into any [`Sink`], so the same code
//! serves both standalone rendering (into a `String`) and streaming straight
//! into a JSON string value while a grammar document is being written.
//!
//! Emission rules:
//! - Literal text escapes `\ ^ $ [ ] ( ) { } . + * ? ! |`
//! - Bracket members escape `\ ^ [ ] -`
//! - An alternation made only of positive classes (or only of negated
//!   classes) merges into one bracket expression
//! - Sequences and non-merging alternations are grouped with `(?:...)`
//!   wherever they must act as a single unit

use crate::pattern::Pattern;
use crate::rule::Rule;

/// Destination for emitted regex characters
pub trait Sink {
    /// Append one character
    fn push(&mut self, c: char);

    /// Append every character of `s`
    fn push_str(&mut self, s: &str) {
        for c in s.chars() {
            self.push(c);
        }
    }
}

impl Sink for String {
    fn push(&mut self, c: char) {
        String::push(self, c);
    }

    fn push_str(&mut self, s: &str) {
        String::push_str(self, s);
    }
}

/// Polarity shared by every member of a mergeable alternation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polarity {
    Positive,
    Negated,
}

/// Writes regex text for patterns and records the rules bound to captures
pub struct RegexEmitter<'a, S: Sink + ?Sized> {
    sink: &'a mut S,
    captures: &'a mut Vec<Rule>,
}

impl<'a, S: Sink + ?Sized> RegexEmitter<'a, S> {
    /// Emit into `sink`, appending capture rules to `captures` in group order
    pub fn new(sink: &'a mut S, captures: &'a mut Vec<Rule>) -> Self {
        RegexEmitter { sink, captures }
    }

    /// Emit the regex for `pattern`
    pub fn regex(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::One(set) => {
                let mut members = set.chars();
                match (members.next(), members.next()) {
                    (Some(only), None) => self.literal_char(only),
                    _ => {
                        self.sink.push('[');
                        self.class_set(set);
                        self.sink.push(']');
                    }
                }
            }
            Pattern::NotOne(set) => {
                self.sink.push_str("[^");
                self.class_set(set);
                self.sink.push(']');
            }
            Pattern::Range { first, last } => {
                self.sink.push('[');
                self.class_range(*first, *last);
                self.sink.push(']');
            }
            Pattern::NotRange { first, last } => {
                self.sink.push_str("[^");
                self.class_range(*first, *last);
                self.sink.push(']');
            }
            Pattern::Any => self.sink.push('.'),
            Pattern::All(literal) => {
                for c in literal.chars() {
                    self.literal_char(c);
                }
            }
            Pattern::Start => self.sink.push('^'),
            Pattern::End => self.sink.push('$'),
            Pattern::Or(alternatives) => self.alternation(alternatives),
            Pattern::And(sequence) => {
                for sequent in sequence {
                    match sequent {
                        Pattern::And(_) => self.regex(sequent),
                        _ => self.unit(sequent),
                    }
                }
            }
            Pattern::Repeat {
                repeated,
                minimum,
                maximum,
            } => {
                self.atom(repeated);
                if *minimum == 0 && *maximum == 1 {
                    self.sink.push('?');
                } else {
                    self.sink.push_str(&format!("{{{},{}}}", minimum, maximum));
                }
            }
            Pattern::InfiniteRepeat { repeated, minimum } => {
                self.atom(repeated);
                match minimum {
                    0 => self.sink.push('*'),
                    1 => self.sink.push('+'),
                    n => self.sink.push_str(&format!("{{{},}}", n)),
                }
            }
            Pattern::Lookup {
                looked,
                wanted,
                behind,
            } => {
                self.sink.push_str("(?");
                if *behind {
                    self.sink.push('<');
                }
                self.sink.push(if *wanted { '=' } else { '!' });
                self.regex(looked);
                self.sink.push(')');
            }
            Pattern::Capture { pattern, rule } => {
                // The group number is fixed by the opening parenthesis, so
                // the rule is recorded before any capture nested inside it.
                self.captures.push(rule.clone());
                self.sink.push('(');
                self.regex(pattern);
                self.sink.push(')');
            }
        }
    }

    /// Emit `pattern` so that it cannot bleed into surrounding
    /// concatenation or alternation
    pub fn unit(&mut self, pattern: &Pattern) {
        if needs_group(pattern) {
            self.group(pattern);
        } else {
            self.regex(pattern);
        }
    }

    /// Emit the operand of a quantifier
    fn atom(&mut self, pattern: &Pattern) {
        let multi_character = match pattern {
            Pattern::All(literal) => literal.chars().count() != 1,
            Pattern::Repeat { .. } | Pattern::InfiniteRepeat { .. } => true,
            _ => false,
        };
        if multi_character || needs_group(pattern) {
            self.group(pattern);
        } else {
            self.regex(pattern);
        }
    }

    fn group(&mut self, pattern: &Pattern) {
        self.sink.push_str("(?:");
        self.regex(pattern);
        self.sink.push(')');
    }

    fn alternation(&mut self, alternatives: &[Pattern]) {
        match survey(alternatives) {
            Some(Polarity::Positive) => {
                self.sink.push('[');
                self.class_members(alternatives);
                self.sink.push(']');
            }
            Some(Polarity::Negated) => {
                self.sink.push_str("[^");
                self.class_members(alternatives);
                self.sink.push(']');
            }
            None => {
                for (i, alternative) in alternatives.iter().enumerate() {
                    if i > 0 {
                        self.sink.push('|');
                    }
                    match alternative {
                        // Alternation is associative: a nested one either
                        // merges into a class or flattens into this one.
                        Pattern::Or(_) => self.regex(alternative),
                        _ => self.unit(alternative),
                    }
                }
            }
        }
    }

    /// Bracket contents of a surveyed alternation, without the brackets
    fn class_members(&mut self, alternatives: &[Pattern]) {
        for alternative in alternatives {
            match alternative {
                Pattern::One(set) | Pattern::NotOne(set) => self.class_set(set),
                Pattern::Range { first, last } | Pattern::NotRange { first, last } => {
                    self.class_range(*first, *last)
                }
                Pattern::Or(nested) => self.class_members(nested),
                _ => unreachable!("survey admits only class-like alternatives"),
            }
        }
    }

    fn class_set(&mut self, set: &str) {
        for member in set.chars() {
            self.class_member(member);
        }
    }

    fn class_range(&mut self, first: char, last: char) {
        self.class_member(first);
        self.sink.push('-');
        self.class_member(last);
    }

    fn class_member(&mut self, member: char) {
        if matches!(member, '\\' | '^' | '[' | ']' | '-') {
            self.sink.push('\\');
        }
        self.sink.push(member);
    }

    fn literal_char(&mut self, c: char) {
        // `|` is escaped too, or a literal pipe would split the alternation
        if matches!(
            c,
            '\\' | '^' | '$' | '[' | ']' | '(' | ')' | '{' | '}' | '.' | '+' | '*' | '?' | '!' | '|'
        ) {
            self.sink.push('\\');
        }
        self.sink.push(c);
    }
}

/// Whether an alternation merges into a single bracket expression, and
/// with which polarity
fn survey(alternatives: &[Pattern]) -> Option<Polarity> {
    let mut polarity = None;
    for alternative in alternatives {
        let current = match alternative {
            Pattern::One(_) | Pattern::Range { .. } => Polarity::Positive,
            Pattern::NotOne(_) | Pattern::NotRange { .. } => Polarity::Negated,
            Pattern::Or(nested) => survey(nested)?,
            _ => return None,
        };
        match polarity {
            None => polarity = Some(current),
            Some(seen) if seen == current => {}
            Some(_) => return None,
        }
    }
    polarity
}

fn needs_group(pattern: &Pattern) -> bool {
    match pattern {
        Pattern::And(_) => true,
        Pattern::Or(alternatives) => survey(alternatives).is_none(),
        _ => false,
    }
}
