//! # Swatch Tokens - Themed Design Token Resolution
//!
//! `swatch-tokens` resolves a closed set of named design tokens (colors,
//! insets, type and spacing) to concrete values for a given ambient state:
//! the host's appearance preference and the set of capabilities it supports.
//!
//! ## Core Concepts
//!
//! - [`DesignToken`]: A named token with prioritized [`Candidate`] values
//! - [`Predicate`]: The condition under which a candidate applies
//! - [`AppearanceMode`]: Light, dark, or unspecified
//! - [`Capabilities`]: The host features available, e.g. [`Capability::InsetEnv`]
//! - [`TokenSet`]: A validated collection of tokens, loaded from code, YAML or CSS
//! - [`resolve`]: Total, deterministic mapping to [`TokenValues`]
//! - [`Resolver`]: A memoizing wrapper over a shared token set
//!
//! ## Quick Start
//!
//! ```rust
//! use swatch_tokens::{AppearanceMode, Capabilities, Capability, DesignToken, TokenSet};
//!
//! let tokens = TokenSet::builder()
//!     .token(
//!         DesignToken::new("accent-color")
//!             .fallback("rgb(84,0,215)")
//!             .when_dark("rgb(181,134,255)"),
//!     )
//!     .token(
//!         DesignToken::new("safe-area-inset-top")
//!             .fallback("0px")
//!             .with_capability(Capability::InsetConstant, "constant(safe-area-inset-top)")
//!             .with_capability(Capability::InsetEnv, "env(safe-area-inset-top)"),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let values = tokens.resolve(AppearanceMode::Dark, Capabilities::all());
//! assert_eq!(values.get("accent-color"), Some("rgb(181,134,255)"));
//! assert_eq!(values.get("safe-area-inset-top"), Some("env(safe-area-inset-top)"));
//! ```
//!
//! ## Guarantees
//!
//! Every token must carry an unconditional fallback as its lowest-priority
//! candidate, so resolution never fails: every token resolves to exactly one
//! value in every ambient state. With no appearance preference and no
//! capabilities, every token resolves to its fallback.
//! Invalid definitions are rejected by [`TokenSetBuilder::build`] with a
//! [`ConfigurationError`].
//!
//! ## Token Files
//!
//! Token sets can be loaded from YAML (see the [`yaml`] module for the
//! schema) or from CSS custom properties (see [`css`]), using
//! [`TokenSet::from_yaml`], [`TokenSet::from_css`] or [`TokenSet::from_file`].

mod appearance;
mod cache;
mod candidate;
mod capability;
pub mod css;
mod error;
mod resolve;
pub mod site;
mod token;
mod token_set;
pub mod yaml;

pub use appearance::{
    detect_appearance, reset_appearance_detector, set_appearance_detector, AppearanceDetector,
    AppearanceMode,
};
pub use cache::Resolver;
pub use candidate::{Candidate, Predicate};
pub use capability::{Capabilities, Capability};
pub use error::{ConfigurationError, LoadError};
pub use resolve::{resolve, Resolution, TokenValues};
pub use token::{DesignToken, APPEARANCE_PRIORITY, CAPABILITY_PRIORITY, FALLBACK_PRIORITY};
pub use token_set::{TokenSet, TokenSetBuilder};
