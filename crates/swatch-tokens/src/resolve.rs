//! Token resolution.
//!
//! [`resolve`] maps a [`TokenSet`] and the ambient state to a [`TokenValues`]
//! mapping. It is a pure function: no I/O, no shared state, the same inputs
//! always produce the same output.
//!
//! ## How Precedence Works
//!
//! Each token's candidates are kept in descending priority order. Resolving a
//! token walks that list and stops at the first candidate whose predicate
//! holds:
//!
//! ```text
//! safe-area-inset-top
//!   201  capability inset-env       env(safe-area-inset-top)
//!   200  capability inset-constant  constant(safe-area-inset-top)
//!     0  always                     0px
//! ```
//!
//! With `{inset-constant}` the first candidate fails and the second wins; with
//! both capabilities the `env()` candidate wins; with none, the fallback.
//! Where a candidate was declared never matters, only its priority.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::appearance::AppearanceMode;
use crate::candidate::Candidate;
use crate::capability::Capabilities;
use crate::token::DesignToken;
use crate::token_set::TokenSet;

/// Resolves every token in `tokens` for the given ambient state.
///
/// The result contains exactly one value per token, in declaration order.
///
/// ```rust
/// use swatch_tokens::{resolve, AppearanceMode, Capabilities, DesignToken, TokenSet};
///
/// let tokens = TokenSet::builder()
///     .token(DesignToken::new("accent-color").fallback("rgb(84,0,215)").when_dark("rgb(181,134,255)"))
///     .build()
///     .unwrap();
///
/// let light = resolve(&tokens, AppearanceMode::Unspecified, Capabilities::none());
/// assert_eq!(light.get("accent-color"), Some("rgb(84,0,215)"));
/// ```
pub fn resolve(tokens: &TokenSet, mode: AppearanceMode, caps: Capabilities) -> TokenValues {
    let entries = tokens
        .iter()
        .map(|token| {
            let winner = token.select(mode, caps);
            (token.name().to_string(), winner.value().to_string())
        })
        .collect();
    TokenValues { entries }
}

/// The resolved value of every token, in declaration order.
///
/// Serializes as a map from token name to value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenValues {
    entries: Vec<(String, String)>,
}

impl TokenValues {
    /// Looks up a value by token name (with or without the `--` prefix).
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.strip_prefix("--").unwrap_or(name);
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Copies the values into a sorted map.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries.iter().cloned().collect()
    }

    /// Renders the values as CSS custom properties inside `selector`.
    ///
    /// ```rust
    /// use swatch_tokens::{AppearanceMode, Capabilities, DesignToken, TokenSet};
    ///
    /// let tokens = TokenSet::builder()
    ///     .token(DesignToken::new("spacing-unit").fallback("8px"))
    ///     .build()
    ///     .unwrap();
    /// let css = tokens
    ///     .resolve(AppearanceMode::Light, Capabilities::none())
    ///     .to_css(":root");
    /// assert_eq!(css, ":root {\n  --spacing-unit: 8px;\n}\n");
    /// ```
    pub fn to_css(&self, selector: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} {{", selector);
        for (name, value) in self.iter() {
            let _ = writeln!(out, "  --{}: {};", name, value);
        }
        out.push_str("}\n");
        out
    }
}

impl<'a> IntoIterator for &'a TokenValues {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl Serialize for TokenValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Which candidate a token resolved to, and why.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution<'a> {
    token: &'a str,
    mode: AppearanceMode,
    capabilities: Capabilities,
    candidate: &'a Candidate,
    fallback: bool,
}

impl<'a> Resolution<'a> {
    pub(crate) fn new(token: &'a DesignToken, mode: AppearanceMode, caps: Capabilities) -> Self {
        let candidate = token.select(mode, caps);
        Self {
            token: token.name(),
            mode,
            capabilities: caps,
            candidate,
            fallback: candidate.is_unconditional(),
        }
    }

    pub fn token(&self) -> &str {
        self.token
    }

    pub fn candidate(&self) -> &Candidate {
        self.candidate
    }

    pub fn value(&self) -> &str {
        self.candidate.value()
    }

    /// True when no conditional candidate applied.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Capability, Predicate};

    fn inset_top() -> TokenSet {
        TokenSet::builder()
            .token(
                DesignToken::new("safe-area-inset-top")
                    .with_capability(Capability::InsetConstant, "constant(safe-area-inset-top)")
                    .with_capability(Capability::InsetEnv, "env(safe-area-inset-top)")
                    .fallback("0px"),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_inset_without_capabilities_falls_back() {
        let values = resolve(&inset_top(), AppearanceMode::Light, Capabilities::none());
        assert_eq!(values.get("safe-area-inset-top"), Some("0px"));
    }

    #[test]
    fn test_inset_with_constant_only() {
        let caps = Capabilities::none().with(Capability::InsetConstant);
        let values = resolve(&inset_top(), AppearanceMode::Light, caps);
        assert_eq!(
            values.get("safe-area-inset-top"),
            Some("constant(safe-area-inset-top)")
        );
    }

    #[test]
    fn test_inset_with_both_prefers_env() {
        let values = resolve(&inset_top(), AppearanceMode::Light, Capabilities::all());
        assert_eq!(
            values.get("safe-area-inset-top"),
            Some("env(safe-area-inset-top)")
        );
    }

    #[test]
    fn test_accent_dark_and_unspecified() {
        let tokens = TokenSet::builder()
            .token(
                DesignToken::new("accent")
                    .candidate(10, Predicate::Appearance(AppearanceMode::Dark), "rgb(181,134,255)")
                    .candidate(0, Predicate::Always, "rgb(84,0,215)"),
            )
            .build()
            .unwrap();

        let dark = resolve(&tokens, AppearanceMode::Dark, Capabilities::none());
        assert_eq!(dark.get("accent"), Some("rgb(181,134,255)"));

        let unspecified = resolve(&tokens, AppearanceMode::Unspecified, Capabilities::none());
        assert_eq!(unspecified.get("accent"), Some("rgb(84,0,215)"));
    }

    #[test]
    fn test_values_serialize_as_ordered_map() {
        let tokens = TokenSet::builder()
            .token(DesignToken::new("background").fallback("white"))
            .token(DesignToken::new("accent-color").fallback("purple"))
            .build()
            .unwrap();
        let values = resolve(&tokens, AppearanceMode::Light, Capabilities::none());

        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"{"background":"white","accent-color":"purple"}"#);
    }

    #[test]
    fn test_to_css_block() {
        let tokens = TokenSet::builder()
            .token(DesignToken::new("background").fallback("white").when_dark("black"))
            .build()
            .unwrap();
        let css = resolve(&tokens, AppearanceMode::Dark, Capabilities::none()).to_css("body");
        assert_eq!(css, "body {\n  --background: black;\n}\n");
    }

    #[test]
    fn test_get_with_prefix() {
        let values = resolve(&inset_top(), AppearanceMode::Light, Capabilities::none());
        assert_eq!(values.get("--safe-area-inset-top"), Some("0px"));
        assert_eq!(values.get("missing"), None);
    }
}
