//! Grammar definition for Lumen, the demo language bundled with the CLI
//!
//! Lumen is a small C-like language: `#` line comments, nestable `#{ }#`
//! block comments with inline documentation markup, digit-separated number
//! literals with radix prefixes, and the usual strings and characters.

use scopegen_core::{Data, Grammar, Pattern, Result, Rule};

const KEYWORDS: &[(&str, &str)] = &[
    ("keyword.other", "import"),
    ("keyword.other", "entrypoint"),
    ("keyword.control", "if"),
    ("keyword.control", "else"),
    ("keyword.control", "for"),
    ("keyword.control", "while"),
    ("keyword.control", "do"),
    ("keyword.control", "switch"),
    ("keyword.control", "case"),
    ("keyword.control", "default"),
    ("keyword.control", "fallthrough"),
    ("keyword.control", "break"),
    ("keyword.control", "continue"),
    ("keyword.control", "return"),
    ("storage.type", "var"),
    ("storage.type", "func"),
    ("storage.type", "interface"),
    ("storage.type", "struct"),
    ("storage.type", "enum"),
    ("storage.type", "union"),
    ("storage.modifier", "opaque"),
    ("storage.modifier", "discard"),
    ("storage.modifier", "noreturn"),
    ("storage.modifier", "mutable"),
    ("storage.modifier", "shared"),
    ("storage.modifier", "volatile"),
    ("storage.modifier", "alignas"),
    ("storage.modifier", "threadlocal"),
];

/// Build the Lumen grammar
pub fn grammar() -> Result<Grammar> {
    let mut grammar = Grammar::new("Lumen", "source.lm");

    let documentation = Rule::unconditional(Data::combined(vec![
        markup("`", "`"),
        markup("[", "]"),
        markup("<", ">"),
    ]));
    grammar.register(&documentation, "documentation")?;

    let block_comment = Rule::delimitated(
        Data::new(
            "comment.block.documentation",
            vec![documentation.clone(), Rule::include("block_comment")?],
        ),
        Pattern::all("#{"),
        Pattern::all("}#"),
    );
    grammar.register(&block_comment, "block_comment")?;

    let line_comment = Rule::delimitated(
        Data::new("comment.line", vec![documentation]),
        Pattern::all("#"),
        Pattern::end(),
    );

    grammar.extend(vec![
        block_comment,
        line_comment,
        number()?,
        operator()?,
        Rule::conditional(Data::scoped("punctuation.separator"), Pattern::all(",")),
        Rule::conditional(
            Data::scoped("punctuation.definition"),
            Pattern::one("(){}[]")?,
        ),
        Rule::conditional(Data::scoped("punctuation.accessor"), accessor()?),
        quoted("string.quoted.double", '"')?,
        raw_string()?,
        quoted("constant.character", '\'')?,
        variable_definition()?,
        Rule::conditional(
            Data::scoped("meta.type"),
            relaxed(vec![
                inline("entity.name.type", identifier()?),
                Pattern::before(Pattern::all("{")),
            ])?,
        ),
        Rule::conditional(
            Data::scoped("meta.call"),
            relaxed(vec![
                inline("entity.name.function", identifier()?),
                Pattern::before(Pattern::all("(")),
            ])?,
        ),
        Rule::conditional(
            Data::scoped("variable.other.constant.property"),
            relaxed(vec![Pattern::after(accessor()?), identifier()?])?,
        ),
        Rule::conditional(Data::scoped("variable.other.constant"), identifier()?),
        lone_keyword()?,
    ]);
    Ok(grammar)
}

fn markup(begin: &str, end: &str) -> Rule {
    Rule::delimitated(
        Data::scoped("keyword.other"),
        Pattern::all(begin),
        Pattern::all(end),
    )
}

fn keyword_name() -> Result<Pattern> {
    Ok(Pattern::or(
        KEYWORDS.iter().map(|(_, word)| Pattern::all(*word)),
    )?)
}

fn lone_keyword() -> Result<Rule> {
    let alternatives = KEYWORDS
        .iter()
        .map(|(scope, word)| inline(scope, Pattern::all(*word)));
    Ok(Rule::conditional(
        Data::empty(),
        separate(Pattern::or(alternatives)?)?,
    ))
}

fn alphanumeric() -> Result<Pattern> {
    Ok(Pattern::or(vec![
        Pattern::range('a', 'z')?,
        Pattern::range('A', 'Z')?,
        Pattern::range('0', '9')?,
    ])?)
}

/// A word that is not glued to surrounding letters or digits
fn separate(word: Pattern) -> Result<Pattern> {
    Ok(Pattern::and(vec![
        Pattern::not_after(alphanumeric()?),
        word,
        Pattern::not_before(alphanumeric()?),
    ])?)
}

/// Keywords may be used as identifiers with a trailing underscore
fn identifier() -> Result<Pattern> {
    let letter = Pattern::or(vec![Pattern::range('a', 'z')?, Pattern::range('A', 'Z')?])?;
    separate(Pattern::or(vec![
        Pattern::and(vec![keyword_name()?, Pattern::all("_")])?,
        Pattern::and(vec![
            letter,
            Pattern::zero_or_more(alphanumeric()?),
            Pattern::not_after(keyword_name()?),
        ])?,
    ])?)
}

/// Members of `sequence` separated by optional spaces
fn relaxed(sequence: Vec<Pattern>) -> Result<Pattern> {
    let whitespace = Pattern::zero_or_more(Pattern::all(" "));
    let mut relaxed = Vec::with_capacity(sequence.len() * 2);
    for (i, pattern) in sequence.into_iter().enumerate() {
        if i > 0 {
            relaxed.push(whitespace.clone());
        }
        relaxed.push(pattern);
    }
    Ok(Pattern::and(relaxed)?)
}

fn inline(scope: &str, pattern: Pattern) -> Pattern {
    Pattern::capture(pattern, Rule::unconditional(Data::scoped(scope)))
}

fn accessor() -> Result<Pattern> {
    Ok(Pattern::or(vec![Pattern::all("."), Pattern::all("::")])?)
}

fn operator() -> Result<Rule> {
    Ok(Rule::conditional(
        Data::scoped("keyword.operator"),
        Pattern::or(vec![
            Pattern::and(vec![
                Pattern::one("^*/+-&|!<>=")?,
                Pattern::optional(Pattern::all("=")),
            ])?,
            Pattern::one("?:")?,
        ])?,
    ))
}

fn variable_definition() -> Result<Rule> {
    Ok(Rule::conditional(
        Data::scoped("meta.variable-definition"),
        relaxed(vec![
            inline(
                "entity.name.type",
                Pattern::or(vec![Pattern::all("var"), identifier()?])?,
            ),
            inline("variable.other.definition", identifier()?),
        ])?,
    ))
}

fn number() -> Result<Rule> {
    let decimal = Pattern::range('0', '9')?;
    let hexadecimal = Pattern::or(vec![
        Pattern::range('a', 'f')?,
        Pattern::range('A', 'F')?,
        Pattern::range('0', '9')?,
    ])?;
    Ok(Rule::conditional(
        Data::scoped("constant.numeric"),
        Pattern::or(vec![
            separate(number_body(decimal.clone(), Pattern::one("eE")?)?)?,
            radix_number(Pattern::one("dD")?, decimal, Pattern::one("eE")?)?,
            radix_number(Pattern::one("xX")?, hexadecimal, Pattern::one("pP")?)?,
            radix_number(Pattern::one("oO")?, Pattern::range('0', '7')?, Pattern::one("pP")?)?,
            radix_number(Pattern::one("bB")?, Pattern::range('0', '1')?, Pattern::one("pP")?)?,
        ])?,
    ))
}

fn radix_number(indicator: Pattern, digit: Pattern, exponent: Pattern) -> Result<Pattern> {
    separate(Pattern::and(vec![
        Pattern::all("0"),
        indicator,
        number_body(digit, exponent)?,
    ])?)
}

fn number_body(digit: Pattern, exponent: Pattern) -> Result<Pattern> {
    Ok(Pattern::and(vec![
        digits(digit.clone())?,
        Pattern::optional(Pattern::and(vec![Pattern::all("."), digits(digit)?])?),
        Pattern::optional(Pattern::and(vec![
            exponent,
            Pattern::optional(Pattern::one("+-")?),
            digits(Pattern::range('0', '9')?)?,
        ])?),
    ])?)
}

/// Digits with optional `'` separators between them
fn digits(digit: Pattern) -> Result<Pattern> {
    Ok(Pattern::and(vec![
        digit.clone(),
        Pattern::zero_or_more(Pattern::and(vec![
            Pattern::optional(Pattern::one("'")?),
            digit,
        ])?),
    ])?)
}

/// A string or character literal with escapes
fn quoted(scope: &str, delimiter: char) -> Result<Rule> {
    let hex_digit = Pattern::or(vec![
        Pattern::range('0', '9')?,
        Pattern::range('a', 'f')?,
        Pattern::range('A', 'F')?,
    ])?;
    let escape = Rule::conditional(
        Data::scoped("constant.character.escape"),
        Pattern::or(vec![
            Pattern::and(vec![Pattern::all("\\"), Pattern::repeat(hex_digit, 1, 8)?])?,
            Pattern::all(format!("\\{}", delimiter)),
            Pattern::all("\\\\"),
        ])?,
    );
    let invalid = Rule::conditional(Data::scoped("invalid.illegal"), Pattern::all("\\"));
    Ok(Rule::delimitated(
        Data::new(scope, vec![escape, invalid]),
        Pattern::literal_char(delimiter),
        Pattern::literal_char(delimiter),
    ))
}

fn raw_string() -> Result<Rule> {
    let escape = Rule::conditional(
        Data::scoped("constant.character.escape"),
        Pattern::all("``"),
    );
    Ok(Rule::delimitated(
        Data::new("string.quoted.other", vec![escape]),
        Pattern::all("`"),
        Pattern::and(vec![Pattern::all("`"), Pattern::not_before(Pattern::all("`"))])?,
    ))
}
