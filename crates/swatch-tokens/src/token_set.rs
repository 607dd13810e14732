//! Validated collections of design tokens.
//!
//! A [`TokenSet`] is the closed set of tokens a site defines. It can only be
//! obtained through [`TokenSetBuilder::build`] (or one of the loaders, which
//! go through the builder), so every `TokenSet` in existence satisfies the
//! construction invariants:
//!
//! - it holds at least one token
//! - token names are unique custom identifiers
//! - every candidate value is a single CSS value
//! - priorities are distinct within each token
//! - every token has exactly one unconditional candidate, its fallback,
//!   ranked below every other candidate
//! - no conditional candidate holds in the empty ambient state, so with no
//!   appearance preference and no capabilities every token resolves to its
//!   fallback
//!
//! # Construction Methods
//!
//! ## Programmatic (Builder API)
//!
//! ```rust
//! use swatch_tokens::{AppearanceMode, Capabilities, DesignToken, TokenSet};
//!
//! let tokens = TokenSet::builder()
//!     .token(
//!         DesignToken::new("accent-color")
//!             .fallback("rgb(84,0,215)")
//!             .when_dark("rgb(181,134,255)"),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let values = tokens.resolve(AppearanceMode::Dark, Capabilities::none());
//! assert_eq!(values.get("accent-color"), Some("rgb(181,134,255)"));
//! ```
//!
//! ## From YAML or CSS
//!
//! See [`TokenSet::from_yaml`], [`TokenSet::from_css`] and
//! [`TokenSet::from_file`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::appearance::AppearanceMode;
use crate::capability::Capabilities;
use crate::error::{ConfigurationError, LoadError};
use crate::resolve::{Resolution, TokenValues};
use crate::token::DesignToken;

/// Collects tokens before validation.
#[derive(Debug, Clone, Default)]
pub struct TokenSetBuilder {
    tokens: Vec<DesignToken>,
}

impl TokenSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token, returning the builder for chaining.
    pub fn token(mut self, token: DesignToken) -> Self {
        self.tokens.push(token);
        self
    }

    /// Adds a token in place.
    pub fn push(&mut self, token: DesignToken) {
        self.tokens.push(token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Validates the collected tokens.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] found, checking tokens in
    /// declaration order.
    pub fn build(self) -> Result<TokenSet, ConfigurationError> {
        if self.tokens.is_empty() {
            return Err(ConfigurationError::Empty);
        }

        let mut index = HashMap::with_capacity(self.tokens.len());
        let mut tokens = self.tokens;
        for (at, token) in tokens.iter_mut().enumerate() {
            token.seal()?;
            if index.insert(token.name().to_string(), at).is_some() {
                return Err(ConfigurationError::DuplicateToken {
                    token: token.name().to_string(),
                });
            }
        }

        tracing::debug!(tokens = tokens.len(), "token set built");
        Ok(TokenSet {
            name: None,
            source_path: None,
            tokens,
            index,
        })
    }
}

/// A validated, immutable set of design tokens.
///
/// `TokenSet` is `Send + Sync` and resolution borrows it immutably, so one
/// set can serve any number of concurrent callers.
#[derive(Debug, Clone)]
pub struct TokenSet {
    /// Set name (optional, typically derived from the file name).
    name: Option<String>,
    /// Source file path (for refresh support).
    source_path: Option<PathBuf>,
    tokens: Vec<DesignToken>,
    index: HashMap<String, usize>,
}

impl TokenSet {
    pub fn builder() -> TokenSetBuilder {
        TokenSetBuilder::new()
    }

    /// Parses a YAML token document. See [`crate::yaml`] for the schema.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the YAML is malformed, a definition has the
    /// wrong shape, or the resulting set is invalid.
    pub fn from_yaml(yaml: &str) -> Result<Self, LoadError> {
        let builder = crate::yaml::parse_tokens(yaml)?;
        Ok(builder.build()?)
    }

    /// Imports custom properties from a compiled CSS cascade. See
    /// [`crate::css`] for how rule order becomes priority.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the CSS cannot be parsed or a token ends up
    /// without an unconditional declaration.
    pub fn from_css(css: &str) -> Result<Self, LoadError> {
        let builder = crate::css::parse_tokens(css)?;
        Ok(builder.build()?)
    }

    /// Loads a token file, choosing the format from its extension.
    ///
    /// The set name is derived from the file name (without extension).
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the file cannot be read, has an unknown
    /// extension, or does not form a valid token set.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let set = match extension_of(path) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content)?,
            Some("css") => Self::from_css(&content)?,
            _ => {
                return Err(LoadError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };

        tracing::debug!(path = %path.display(), tokens = set.len(), "loaded token file");
        Ok(Self {
            name: path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string()),
            source_path: Some(path.to_path_buf()),
            ..set
        })
    }

    /// Sets the name on this set, returning `self` for chaining.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the source file path, if this set was loaded from a file.
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Reloads the set from its source file.
    ///
    /// On error the set is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the set has no source file, or the file no
    /// longer loads.
    pub fn refresh(&mut self) -> Result<(), LoadError> {
        let path = self.source_path.clone().ok_or(LoadError::NoSource)?;
        *self = Self::from_file(path)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false: construction rejects empty sets.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Looks up a token by name (with or without the `--` prefix).
    pub fn get(&self, name: &str) -> Option<&DesignToken> {
        let name = name.strip_prefix("--").unwrap_or(name);
        self.index.get(name).map(|at| &self.tokens[*at])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates tokens in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &DesignToken> {
        self.tokens.iter()
    }

    /// Token names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|t| t.name())
    }

    /// Resolves every token for the ambient state.
    ///
    /// This never fails: construction guarantees each token has a fallback.
    pub fn resolve(&self, mode: AppearanceMode, caps: Capabilities) -> TokenValues {
        crate::resolve::resolve(self, mode, caps)
    }

    /// Reports which candidate a single token resolves to, or `None` if the
    /// set has no such token.
    pub fn explain(
        &self,
        name: &str,
        mode: AppearanceMode,
        caps: Capabilities,
    ) -> Option<Resolution<'_>> {
        self.get(name)
            .map(|token| Resolution::new(token, mode, caps))
    }

    /// Layers `other` over this set.
    ///
    /// Tokens in `other` replace same-named tokens here (keeping this set's
    /// declaration position); new tokens are appended. Both sets are already
    /// valid, so the result is too.
    ///
    /// The result keeps this set's name but no source path: no single file
    /// reproduces it, so [`TokenSet::refresh`] on it fails with
    /// [`LoadError::NoSource`]. Reload each layer and merge again instead.
    pub fn merge(mut self, other: TokenSet) -> Self {
        self.source_path = None;
        for token in other.tokens {
            match self.index.get(token.name()) {
                Some(at) => self.tokens[*at] = token,
                None => {
                    self.index.insert(token.name().to_string(), self.tokens.len());
                    self.tokens.push(token);
                }
            }
        }
        self
    }
}

impl<'a> IntoIterator for &'a TokenSet {
    type Item = &'a DesignToken;
    type IntoIter = std::slice::Iter<'a, DesignToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Capability, Predicate};

    fn accent() -> DesignToken {
        DesignToken::new("accent-color")
            .fallback("rgb(84,0,215)")
            .when_dark("rgb(181,134,255)")
    }

    #[test]
    fn test_build_empty_fails() {
        assert_eq!(
            TokenSet::builder().build().unwrap_err(),
            ConfigurationError::Empty
        );
    }

    #[test]
    fn test_build_duplicate_token_fails() {
        let err = TokenSet::builder()
            .token(accent())
            .token(accent())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DuplicateToken {
                token: "accent-color".to_string()
            }
        );
    }

    #[test]
    fn test_build_missing_fallback_fails() {
        let err = TokenSet::builder()
            .token(accent())
            .token(DesignToken::new("hover-foreground").when_dark("rgb(255,255,255)"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MissingFallback {
                token: "hover-foreground".to_string()
            }
        );
    }

    #[test]
    fn test_get_accepts_prefixed_names() {
        let set = TokenSet::builder().token(accent()).build().unwrap();
        assert!(set.get("accent-color").is_some());
        assert!(set.get("--accent-color").is_some());
        assert!(set.get("background").is_none());
    }

    #[test]
    fn test_names_keep_declaration_order() {
        let set = TokenSet::builder()
            .token(DesignToken::new("background").fallback("white"))
            .token(accent())
            .build()
            .unwrap();
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["background", "accent-color"]);
    }

    #[test]
    fn test_explain_reports_winner() {
        let set = TokenSet::builder().token(accent()).build().unwrap();

        let dark = set
            .explain("accent-color", AppearanceMode::Dark, Capabilities::none())
            .unwrap();
        assert_eq!(dark.value(), "rgb(181,134,255)");
        assert!(!dark.is_fallback());
        assert_eq!(
            dark.candidate().predicate(),
            &Predicate::Appearance(AppearanceMode::Dark)
        );

        let unspecified = set
            .explain("accent-color", AppearanceMode::Unspecified, Capabilities::none())
            .unwrap();
        assert!(unspecified.is_fallback());

        assert!(set
            .explain("missing", AppearanceMode::Dark, Capabilities::none())
            .is_none());
    }

    #[test]
    fn test_merge_replaces_and_appends() {
        let base = TokenSet::builder()
            .token(accent())
            .token(DesignToken::new("background").fallback("white"))
            .build()
            .unwrap();
        let user = TokenSet::builder()
            .token(DesignToken::new("accent-color").fallback("rebeccapurple"))
            .token(
                DesignToken::new("safe-area-inset-top")
                    .fallback("0px")
                    .with_capability(Capability::InsetEnv, "env(safe-area-inset-top)"),
            )
            .build()
            .unwrap();

        let merged = base.merge(user);
        assert_eq!(merged.len(), 3);

        let names: Vec<&str> = merged.names().collect();
        assert_eq!(names, vec!["accent-color", "background", "safe-area-inset-top"]);

        let values = merged.resolve(AppearanceMode::Dark, Capabilities::none());
        assert_eq!(values.get("accent-color"), Some("rebeccapurple"));
    }

    #[test]
    fn test_from_file_yaml() {
        use std::fs;
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("site.yaml");
        fs::write(
            &path,
            r#"
accent-color:
  fallback: "rgb(84,0,215)"
  dark: "rgb(181,134,255)"
"#,
        )
        .unwrap();

        let set = TokenSet::from_file(&path).unwrap();
        assert_eq!(set.name(), Some("site"));
        assert_eq!(set.source_path(), Some(path.as_path()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_from_file_css() {
        use std::fs;
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("theme.css");
        fs::write(
            &path,
            ":root { --accent-color: rgb(84,0,215); }\n\
             @media (prefers-color-scheme: dark) { :root { --accent-color: rgb(181,134,255); } }",
        )
        .unwrap();

        let set = TokenSet::from_file(&path).unwrap();
        let values = set.resolve(AppearanceMode::Dark, Capabilities::none());
        assert_eq!(values.get("accent-color"), Some("rgb(181,134,255)"));
    }

    #[test]
    fn test_from_file_unsupported_extension() {
        use std::fs;
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("theme.scss");
        fs::write(&path, "$accent: red;").unwrap();

        assert!(matches!(
            TokenSet::from_file(&path),
            Err(LoadError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_from_file_not_found() {
        let result = TokenSet::from_file("/nonexistent/path/tokens.yaml");
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_refresh() {
        use std::fs;
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("live.yaml");
        fs::write(&path, "background: white\n").unwrap();

        let mut set = TokenSet::from_file(&path).unwrap();
        assert_eq!(set.len(), 1);

        fs::write(&path, "background: white\nspacing-unit: 8px\n").unwrap();
        set.refresh().unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.name(), Some("live"));
    }

    #[test]
    fn test_refresh_without_source() {
        let mut set = TokenSet::builder().token(accent()).build().unwrap();
        assert!(matches!(set.refresh(), Err(LoadError::NoSource)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_refresh_after_merge_keeps_overlay() {
        use std::fs;
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("base.yaml");
        let brand = temp_dir.path().join("brand.yaml");
        fs::write(&base, "accent-color: red
").unwrap();
        fs::write(&brand, "accent-color: blue
").unwrap();

        let mut merged = TokenSet::from_file(&base)
            .unwrap()
            .merge(TokenSet::from_file(&brand).unwrap());
        assert_eq!(merged.name(), Some("base"));
        assert_eq!(merged.source_path(), None);

        assert!(matches!(merged.refresh(), Err(LoadError::NoSource)));
        let values = merged.resolve(AppearanceMode::Light, Capabilities::none());
        assert_eq!(values.get("accent-color"), Some("blue"));
    }
}
