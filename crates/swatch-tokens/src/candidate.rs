//! Candidate values and the predicates that guard them.
//!
//! A [`Candidate`] is one possible resolution of a token: a priority, a
//! [`Predicate`] over the ambient state, and the textual value to use when
//! the predicate holds.

use std::fmt;

use cssparser::{ParseError, ParseErrorKind, Parser, ParserInput, Token};
use serde::Serialize;

use crate::appearance::AppearanceMode;
use crate::capability::{Capabilities, Capability};

/// A condition over the ambient state (appearance mode and capabilities).
///
/// Serializes in the same shape token files use for `when:`, e.g.
/// `"always"` or `{"appearance": "dark"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Holds in every ambient state.
    Always,
    /// Holds when the host reports exactly this mode.
    Appearance(AppearanceMode),
    /// Holds when the host supports this capability.
    Capability(Capability),
    /// Holds when every inner predicate holds. An empty conjunction always holds.
    All(Vec<Predicate>),
}

impl Predicate {
    /// Evaluates the predicate against the ambient state.
    pub fn holds(&self, mode: AppearanceMode, caps: Capabilities) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Appearance(wanted) => *wanted == mode,
            Predicate::Capability(cap) => caps.contains(*cap),
            Predicate::All(inner) => inner.iter().all(|p| p.holds(mode, caps)),
        }
    }

    /// Returns true if the predicate holds regardless of ambient state.
    pub fn is_unconditional(&self) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Appearance(_) | Predicate::Capability(_) => false,
            Predicate::All(inner) => inner.iter().all(Predicate::is_unconditional),
        }
    }

    /// Conjoins two predicates, flattening nested conjunctions and dropping
    /// `Always` terms.
    pub fn and(self, other: Predicate) -> Predicate {
        let mut terms = Vec::new();
        for p in [self, other] {
            match p {
                Predicate::Always => {}
                Predicate::All(inner) => terms.extend(inner),
                single => terms.push(single),
            }
        }
        match terms.len() {
            0 => Predicate::Always,
            1 => terms.remove(0),
            _ => Predicate::All(terms),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Always => f.write_str("always"),
            Predicate::Appearance(mode) => write!(f, "appearance = {}", mode),
            Predicate::Capability(cap) => write!(f, "capability {}", cap),
            Predicate::All(inner) if inner.is_empty() => f.write_str("always"),
            Predicate::All(inner) => {
                let parts: Vec<String> = inner.iter().map(|p| p.to_string()).collect();
                f.write_str(&parts.join(" and "))
            }
        }
    }
}

/// One possible resolution of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    priority: u32,
    predicate: Predicate,
    value: String,
}

impl Candidate {
    pub fn new(priority: u32, predicate: Predicate, value: impl Into<String>) -> Self {
        Self {
            priority,
            predicate,
            value: value.into().trim().to_string(),
        }
    }

    /// An unconditional candidate.
    pub fn fallback(priority: u32, value: impl Into<String>) -> Self {
        Self::new(priority, Predicate::Always, value)
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_unconditional(&self) -> bool {
        self.predicate.is_unconditional()
    }

    pub fn holds(&self, mode: AppearanceMode, caps: Capabilities) -> bool {
        self.predicate.holds(mode, caps)
    }
}

/// Checks that `value` is a single CSS declaration value.
///
/// The value must tokenize cleanly, keep its brackets balanced, and contain
/// nothing that would end or escape a declaration (`;`, `!`, `{`, `}`).
pub(crate) fn check_value(value: &str) -> Result<(), String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("value is empty".to_string());
    }
    check_brackets(value)?;

    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    check_component_values(&mut parser)
}

fn check_component_values<'i, 't>(parser: &mut Parser<'i, 't>) -> Result<(), String> {
    loop {
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => return Ok(()),
        };
        match token {
            Token::Semicolon => return Err("unexpected ';'".to_string()),
            Token::Delim('!') => return Err("priority flags are not allowed".to_string()),
            Token::CurlyBracketBlock | Token::CloseCurlyBracket => {
                return Err("unexpected '{' or '}'".to_string())
            }
            Token::BadString(_) => return Err("unterminated string".to_string()),
            Token::BadUrl(_) => return Err("malformed url()".to_string()),
            Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock => {
                parser
                    .parse_nested_block(|nested| {
                        check_component_values(nested)
                            .map_err(|msg| nested.new_custom_error::<String, String>(msg))
                    })
                    .map_err(|err: ParseError<'i, String>| match err.kind {
                        ParseErrorKind::Custom(msg) => msg,
                        ParseErrorKind::Basic(kind) => format!("{:?}", kind),
                    })?;
            }
            _ => {}
        }
    }
}

/// cssparser closes unterminated blocks silently at end of input, so
/// balance is checked on the raw text first.
fn check_brackets(value: &str) -> Result<(), String> {
    let mut stack = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in value.chars() {
        if let Some(q) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                _ if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => stack.push(')'),
            '[' => stack.push(']'),
            ')' | ']' => {
                if stack.pop() != Some(c) {
                    return Err(format!("unbalanced '{}'", c));
                }
            }
            _ => {}
        }
    }

    if quote.is_some() {
        return Err("unterminated string".to_string());
    }
    if let Some(missing) = stack.pop() {
        return Err(format!("missing '{}'", missing));
    }
    Ok(())
}
