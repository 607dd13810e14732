//! CSS token stylesheets.
//!
//! Token sets are often authored as plain CSS custom properties, with the
//! adaptive parts expressed through the cascade. This module reads such a
//! stylesheet and turns the cascade into explicit priorities.
//!
//! # Supported Input
//!
//! - `:root { --name: value; }` declares a candidate for `name`, as does a
//!   selector list that includes `:root` (`:root, html { ... }`). Other
//!   selectors and ordinary properties are ignored.
//! - `@media (prefers-color-scheme: light|dark) { ... }` guards the nested
//!   rules with an appearance predicate.
//! - `@supports (prop: env(...))` and `@supports (prop: constant(...))` guard
//!   the nested rules with the matching capability.
//! - Nested conditional blocks conjoin their predicates.
//!
//! Any other at-rule is skipped with its body.
//!
//! # Cascade To Priorities
//!
//! In CSS the last applicable declaration wins. Each declaration therefore
//! gets its 1-based position among the declarations of the same token as its
//! priority. An unconditional declaration wins over everything before it, so
//! those earlier declarations are dropped.
//!
//! ```css
//! :root { --safe-area-inset-top: 0px; }
//! @supports (padding-top: constant(safe-area-inset-top)) {
//!     :root { --safe-area-inset-top: constant(safe-area-inset-top); }
//! }
//! @supports (padding-top: env(safe-area-inset-top)) {
//!     :root { --safe-area-inset-top: env(safe-area-inset-top); }
//! }
//! ```
//!
//! becomes `env` at 3, `constant` at 2 and the `0px` fallback at 1.

use std::collections::HashMap;
use std::fmt;

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, ParseErrorKind, Parser, ParserInput,
    ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, Token,
};

use crate::appearance::AppearanceMode;
use crate::candidate::{Candidate, Predicate};
use crate::capability::Capability;
use crate::error::LoadError;
use crate::token::DesignToken;
use crate::token_set::TokenSetBuilder;

/// Parses a CSS token stylesheet into an unvalidated builder.
pub fn parse_tokens(css: &str) -> Result<TokenSetBuilder, LoadError> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);

    let mut sheet = TokenSheetParser {
        declarations: Vec::new(),
        condition: Predicate::Always,
    };

    let rules = cssparser::StyleSheetParser::new(&mut parser, &mut sheet);
    for result in rules {
        if let Err((err, source)) = result {
            if is_unsupported(&err) {
                tracing::debug!(rule = source.trim(), "skipping unsupported CSS rule");
                continue;
            }
            return Err(LoadError::Css {
                message: format!(
                    "line {}, column {}: {}",
                    err.location.line + 1,
                    err.location.column,
                    err.kind
                ),
            });
        }
    }

    Ok(cascade(sheet.declarations))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RuleError {
    /// A rule this importer does not model. Skipped, not fatal.
    Unsupported,
    Invalid(String),
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::Unsupported => f.write_str("unsupported rule"),
            RuleError::Invalid(message) => f.write_str(message),
        }
    }
}

fn is_unsupported(err: &ParseError<'_, RuleError>) -> bool {
    matches!(err.kind, ParseErrorKind::Custom(RuleError::Unsupported))
}

/// A custom property declaration together with the conditions it sits under.
#[derive(Debug)]
struct Declaration {
    name: String,
    predicate: Predicate,
    value: String,
}

struct TokenSheetParser {
    declarations: Vec<Declaration>,
    condition: Predicate,
}

impl TokenSheetParser {
    /// Runs the rules of a conditional block under `condition`.
    fn parse_nested<'i, 't>(
        &mut self,
        condition: Predicate,
        input: &mut Parser<'i, 't>,
    ) -> Result<(), ParseError<'i, RuleError>> {
        let outer = self.condition.clone();
        self.condition = outer.clone().and(condition);

        let mut failure = None;
        for result in cssparser::StyleSheetParser::new(input, &mut *self) {
            if let Err((err, _)) = result {
                if failure.is_none() && !is_unsupported(&err) {
                    failure = Some(err);
                }
            }
        }

        self.condition = outer;
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// `:root` on its own, not compounded or nested.
fn is_root_selector(selector: &[Token<'_>]) -> bool {
    matches!(selector, [Token::Colon, Token::Ident(name)] if name.eq_ignore_ascii_case("root"))
}

impl<'i> QualifiedRuleParser<'i> for TokenSheetParser {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = RuleError;

    /// Accepts a selector list naming `:root`, such as `:root` or
    /// `:root, html`. Declarations in such a rule apply to the root.
    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let mut selectors = vec![Vec::new()];
        while let Ok(token) = input.next() {
            match token.clone() {
                Token::Comma => selectors.push(Vec::new()),
                other => {
                    if let Some(current) = selectors.last_mut() {
                        current.push(other);
                    }
                }
            }
        }

        if selectors.iter().any(|selector| is_root_selector(selector)) {
            Ok(())
        } else {
            Err(input.new_custom_error(RuleError::Unsupported))
        }
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let mut properties = CustomPropertyParser;
        let body = RuleBodyParser::new(input, &mut properties);

        let mut found = Vec::new();
        for result in body {
            match result {
                Ok(property) => found.push(property),
                Err((err, _)) if is_unsupported(&err) => {}
                Err((err, _)) => return Err(err),
            }
        }

        for (name, value) in found {
            self.declarations.push(Declaration {
                name,
                predicate: self.condition.clone(),
                value,
            });
        }
        Ok(())
    }
}

impl<'i> AtRuleParser<'i> for TokenSheetParser {
    type Prelude = Predicate;
    type AtRule = ();
    type Error = RuleError;

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let condition = if name.eq_ignore_ascii_case("media") {
            media_condition(input)
        } else if name.eq_ignore_ascii_case("supports") {
            supports_condition(input)
        } else {
            Err(input.new_custom_error(RuleError::Unsupported))
        };

        // Leave the prelude exhausted whatever the outcome.
        if condition.is_err() {
            while input.next().is_ok() {}
        }
        condition
    }

    fn parse_block<'t>(
        &mut self,
        condition: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        self.parse_nested(condition, input)
    }
}

/// `@media (prefers-color-scheme: dark)`, optionally with `screen`, `all`,
/// `only` and `and`. Any other media feature makes the rule unsupported.
fn media_condition<'i, 't>(input: &mut Parser<'i, 't>) -> Result<Predicate, ParseError<'i, RuleError>> {
    let mut predicate = None;

    loop {
        let token = match input.next() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::ParenthesisBlock => {
                let mode = input.parse_nested_block(
                    |input| -> Result<AppearanceMode, ParseError<'i, RuleError>> {
                        input.expect_ident_matching("prefers-color-scheme")?;
                        input.expect_colon()?;
                        let value = input.expect_ident()?.clone();
                        match &*value {
                            "dark" => Ok(AppearanceMode::Dark),
                            "light" => Ok(AppearanceMode::Light),
                            _ => Err(input.new_custom_error(RuleError::Unsupported)),
                        }
                    },
                );
                let mode =
                    mode.map_err(|_| input.new_custom_error::<_, RuleError>(RuleError::Unsupported))?;
                predicate = Some(
                    predicate
                        .unwrap_or(Predicate::Always)
                        .and(Predicate::Appearance(mode)),
                );
            }
            Token::Ident(ref word)
                if ["screen", "all", "only", "and"]
                    .iter()
                    .any(|allowed| word.eq_ignore_ascii_case(allowed)) => {}
            _ => return Err(input.new_custom_error(RuleError::Unsupported)),
        }
    }

    predicate.ok_or_else(|| input.new_custom_error(RuleError::Unsupported))
}

/// `@supports (padding-top: env(safe-area-inset-top))`, possibly joined with
/// `and`. The capability is named by the function used in the value.
fn supports_condition<'i, 't>(
    input: &mut Parser<'i, 't>,
) -> Result<Predicate, ParseError<'i, RuleError>> {
    let mut predicate = None;

    loop {
        let token = match input.next() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::ParenthesisBlock => {
                let cap = input.parse_nested_block(
                    |input| -> Result<Capability, ParseError<'i, RuleError>> {
                        input.expect_ident()?;
                        input.expect_colon()?;
                        let mut found = None;
                        while let Ok(token) = input.next() {
                            if let Token::Function(name) = token {
                                found = found.or_else(|| Capability::from_css_function(name));
                            }
                        }
                        found.ok_or_else(|| input.new_custom_error(RuleError::Unsupported))
                    },
                );
                let cap =
                    cap.map_err(|_| input.new_custom_error::<_, RuleError>(RuleError::Unsupported))?;
                predicate = Some(
                    predicate
                        .unwrap_or(Predicate::Always)
                        .and(Predicate::Capability(cap)),
                );
            }
            Token::Ident(ref word) if word.eq_ignore_ascii_case("and") => {}
            _ => return Err(input.new_custom_error(RuleError::Unsupported)),
        }
    }

    predicate.ok_or_else(|| input.new_custom_error(RuleError::Unsupported))
}

/// Reads the declarations of a `:root` block.
struct CustomPropertyParser;

impl<'i> DeclarationParser<'i> for CustomPropertyParser {
    type Declaration = (String, String);
    type Error = RuleError;

    /// Keeps `--name` declarations with their raw value text.
    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let token = match name.strip_prefix("--") {
            Some(token) => token.to_string(),
            None => {
                while input.next().is_ok() {}
                return Err(input.new_custom_error(RuleError::Unsupported));
            }
        };

        let start = input.position();
        while input.next_including_whitespace_and_comments().is_ok() {}
        let value = input.slice_from(start).trim();

        if value.is_empty() {
            return Err(input.new_custom_error(RuleError::Invalid(format!(
                "custom property '--{}' has no value",
                token
            ))));
        }
        Ok((token, value.to_string()))
    }
}

impl<'i> AtRuleParser<'i> for CustomPropertyParser {
    type Prelude = ();
    type AtRule = (String, String);
    type Error = RuleError;

    fn parse_prelude<'t>(
        &mut self,
        _name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        while input.next().is_ok() {}
        Err(input.new_custom_error(RuleError::Unsupported))
    }
}

impl<'i> QualifiedRuleParser<'i> for CustomPropertyParser {
    type Prelude = ();
    type QualifiedRule = (String, String);
    type Error = RuleError;
}

impl<'i> RuleBodyItemParser<'i, (String, String), RuleError> for CustomPropertyParser {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Turns declarations in document order into prioritized candidates.
fn cascade(declarations: Vec<Declaration>) -> TokenSetBuilder {
    let mut tokens: Vec<(u32, DesignToken)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for decl in declarations {
        let slot = *index.entry(decl.name.clone()).or_insert_with(|| {
            tokens.push((0, DesignToken::new(decl.name.as_str())));
            tokens.len() - 1
        });
        let (position, token) = &mut tokens[slot];
        *position += 1;

        if decl.predicate.is_unconditional() && !token.candidates().is_empty() {
            tracing::debug!(
                token = %decl.name,
                dropped = token.candidates().len(),
                "unconditional declaration supersedes earlier ones"
            );
            *token = DesignToken::new(decl.name.as_str());
        }

        token.push(Candidate::new(*position, decl.predicate, decl.value));
    }

    let mut builder = TokenSetBuilder::new();
    for (_, token) in tokens {
        builder.push(token);
    }
    builder
}
