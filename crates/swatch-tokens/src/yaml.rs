//! YAML token files.
//!
//! A token file is a mapping from token name to definition. Declaration order
//! in the file is kept.
//!
//! # YAML Formats
//!
//! ```yaml
//! # Shorthand - a bare value is the fallback
//! spacing-unit: 8px
//!
//! # Adaptive definition - fallback plus light/dark overrides
//! accent-color:
//!   fallback: "rgb(84,0,215)"
//!   dark: "rgb(181,134,255)"
//!
//! # Explicit candidates, with any priority and predicate
//! safe-area-inset-top:
//!   fallback: 0px
//!   candidates:
//!     - priority: 300
//!       when: { capability: inset-env }
//!       value: env(safe-area-inset-top)
//!     - priority: 250
//!       when: { capability: inset-constant }
//!       value: constant(safe-area-inset-top)
//! ```
//!
//! `light:` and `dark:` use the same priorities as
//! [`DesignToken::when_light`] and [`DesignToken::when_dark`]. A `when:` is
//! one of `always`, `{ appearance: <mode> }`, `{ capability: <cap> }` or
//! `{ all: [<when>, ...] }`.

use serde_yaml::{Mapping, Value};

use crate::appearance::AppearanceMode;
use crate::candidate::Predicate;
use crate::capability::Capability;
use crate::error::LoadError;
use crate::token::DesignToken;
use crate::token_set::TokenSetBuilder;

/// Parses a YAML token document into an unvalidated builder.
pub fn parse_tokens(yaml: &str) -> Result<TokenSetBuilder, LoadError> {
    let root: Value = serde_yaml::from_str(yaml)?;
    let map = match root {
        Value::Mapping(map) => map,
        Value::Null => Mapping::new(),
        other => {
            return Err(LoadError::definition(
                "<root>",
                format!("expected a mapping of token names, got {}", kind_of(&other)),
            ))
        }
    };

    let mut builder = TokenSetBuilder::new();
    for (key, value) in &map {
        let name = key.as_str().ok_or_else(|| {
            LoadError::definition("<root>", format!("token names must be strings, got {}", kind_of(key)))
        })?;
        builder.push(parse_definition(name, value)?);
    }
    Ok(builder)
}

/// Parses one token definition.
///
/// - Scalar → the fallback value
/// - Mapping → `fallback`, `light`, `dark` and `candidates` keys
fn parse_definition(name: &str, value: &Value) -> Result<DesignToken, LoadError> {
    match value {
        Value::Mapping(map) => parse_mapping(name, map),
        scalar => Ok(DesignToken::new(name).fallback(scalar_value(name, scalar)?)),
    }
}

fn parse_mapping(name: &str, map: &Mapping) -> Result<DesignToken, LoadError> {
    let mut token = DesignToken::new(name);

    for (key, value) in map {
        let key = key
            .as_str()
            .ok_or_else(|| LoadError::definition(name, "keys must be strings"))?;
        token = match key {
            "fallback" => token.fallback(scalar_value(name, value)?),
            "light" => token.when_light(scalar_value(name, value)?),
            "dark" => token.when_dark(scalar_value(name, value)?),
            "candidates" => {
                let list = value
                    .as_sequence()
                    .ok_or_else(|| LoadError::definition(name, "'candidates' must be a list"))?;
                let mut token = token;
                for entry in list {
                    let (priority, predicate, value) = parse_candidate(name, entry)?;
                    token = token.candidate(priority, predicate, value);
                }
                token
            }
            other => {
                return Err(LoadError::definition(
                    name,
                    format!(
                        "unknown key '{}' (expected fallback, light, dark or candidates)",
                        other
                    ),
                ))
            }
        };
    }
    Ok(token)
}

fn parse_candidate(name: &str, entry: &Value) -> Result<(u32, Predicate, String), LoadError> {
    let map = entry
        .as_mapping()
        .ok_or_else(|| LoadError::definition(name, "each candidate must be a mapping"))?;

    let mut priority = None;
    let mut predicate = Predicate::Always;
    let mut value = None;

    for (key, field) in map {
        match key.as_str() {
            Some("priority") => {
                let n = field
                    .as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| {
                        LoadError::definition(name, "candidate priority must be a non-negative integer")
                    })?;
                priority = Some(n);
            }
            Some("when") => predicate = parse_predicate(name, field)?,
            Some("value") => value = Some(scalar_value(name, field)?),
            Some(other) => {
                return Err(LoadError::definition(
                    name,
                    format!(
                        "unknown candidate key '{}' (expected priority, when or value)",
                        other
                    ),
                ))
            }
            None => return Err(LoadError::definition(name, "keys must be strings")),
        }
    }

    let priority =
        priority.ok_or_else(|| LoadError::definition(name, "candidate is missing 'priority'"))?;
    let value = value.ok_or_else(|| LoadError::definition(name, "candidate is missing 'value'"))?;
    Ok((priority, predicate, value))
}

/// Parses a `when:` value.
fn parse_predicate(name: &str, value: &Value) -> Result<Predicate, LoadError> {
    match value {
        Value::String(s) if s == "always" => Ok(Predicate::Always),
        Value::Mapping(map) if map.len() == 1 => {
            let (key, inner) = map
                .iter()
                .next()
                .ok_or_else(|| LoadError::definition(name, "empty 'when'"))?;
            match key.as_str() {
                Some("appearance") => {
                    let mode = inner
                        .as_str()
                        .ok_or_else(|| LoadError::definition(name, "appearance must be a string"))?
                        .parse::<AppearanceMode>()
                        .map_err(|e| LoadError::definition(name, e))?;
                    Ok(Predicate::Appearance(mode))
                }
                Some("capability") => {
                    let cap = inner
                        .as_str()
                        .ok_or_else(|| LoadError::definition(name, "capability must be a string"))?
                        .parse::<Capability>()
                        .map_err(|e| LoadError::definition(name, e))?;
                    Ok(Predicate::Capability(cap))
                }
                Some("all") => {
                    let list = inner
                        .as_sequence()
                        .ok_or_else(|| LoadError::definition(name, "'all' must be a list"))?;
                    let terms = list
                        .iter()
                        .map(|term| parse_predicate(name, term))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Predicate::All(terms))
                }
                _ => Err(LoadError::definition(
                    name,
                    "'when' must be always, appearance, capability or all",
                )),
            }
        }
        _ => Err(LoadError::definition(
            name,
            "'when' must be 'always' or a single-key mapping",
        )),
    }
}

/// Reads a candidate value. Numbers and booleans are accepted as text.
fn scalar_value(name: &str, value: &Value) -> Result<String, LoadError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(LoadError::definition(
            name,
            format!("expected a value, got {}", kind_of(other)),
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
