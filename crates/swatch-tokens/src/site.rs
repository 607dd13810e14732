//! The built-in site token set.
//!
//! The tokens are authored as CSS in `tokens/site.css` and embedded at
//! compile time. They cover the site's colors (light fallbacks with dark
//! overrides), the four safe-area insets, and the typographic and spacing
//! scale.

use crate::token_set::TokenSet;

/// Source of the built-in token set.
pub const SITE_CSS: &str = include_str!("../tokens/site.css");

/// Names of the color tokens, in declaration order.
pub const COLOR_TOKENS: [&str; 6] = [
    "accent-color",
    "background",
    "secondary-background",
    "primary-foreground",
    "secondary-foreground",
    "hover-foreground",
];

/// Names of the safe-area inset tokens.
pub const INSET_TOKENS: [&str; 4] = [
    "safe-area-inset-top",
    "safe-area-inset-right",
    "safe-area-inset-bottom",
    "safe-area-inset-left",
];

/// Builds the site token set from the embedded stylesheet.
///
/// # Panics
///
/// Panics if the embedded stylesheet fails to load (caught by the tests in
/// this module).
pub fn site_tokens() -> TokenSet {
    TokenSet::from_css(SITE_CSS)
        .expect("embedded site tokens should parse")
        .with_name("site")
}
