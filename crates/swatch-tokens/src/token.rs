//! Design tokens and their candidate lists.

use serde::Serialize;

use crate::appearance::AppearanceMode;
use crate::candidate::{Candidate, Predicate};
use crate::capability::{Capabilities, Capability};
use crate::error::ConfigurationError;

/// Priority assigned by [`DesignToken::fallback`].
pub const FALLBACK_PRIORITY: u32 = 0;

/// Priority assigned by [`DesignToken::when_light`] and [`DesignToken::when_dark`].
///
/// Light and dark candidates can never hold at the same time, but priorities
/// must still be distinct per token, so light sits one below dark.
pub const APPEARANCE_PRIORITY: u32 = 100;

/// Base priority for [`DesignToken::with_capability`]. Each further
/// capability candidate on the same token gets the next priority up, so
/// the one declared last wins when several capabilities are present.
pub const CAPABILITY_PRIORITY: u32 = 200;

/// A named token with an ordered list of candidate values.
///
/// Tokens are built with the helper methods and then validated as part of a
/// [`TokenSet`](crate::TokenSet). Candidate order is always by descending
/// priority; the order in which candidates were added does not matter.
///
/// ```rust
/// use swatch_tokens::{DesignToken, Capability};
///
/// let inset = DesignToken::new("safe-area-inset-top")
///     .fallback("0px")
///     .with_capability(Capability::InsetConstant, "constant(safe-area-inset-top)")
///     .with_capability(Capability::InsetEnv, "env(safe-area-inset-top)");
///
/// assert_eq!(inset.candidates().len(), 3);
/// assert_eq!(inset.candidates()[0].value(), "env(safe-area-inset-top)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesignToken {
    name: String,
    candidates: Vec<Candidate>,
}

impl DesignToken {
    /// Creates a token with no candidates.
    ///
    /// A leading `--` (custom property syntax) is stripped from the name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let name = name.trim();
        let name = name.strip_prefix("--").unwrap_or(name).to_string();
        Self {
            name,
            candidates: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Candidates ordered by descending priority.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Adds a candidate with an explicit priority.
    pub fn candidate(mut self, priority: u32, predicate: Predicate, value: impl Into<String>) -> Self {
        self.push(Candidate::new(priority, predicate, value));
        self
    }

    /// Adds the unconditional fallback at [`FALLBACK_PRIORITY`].
    pub fn fallback(self, value: impl Into<String>) -> Self {
        self.candidate(FALLBACK_PRIORITY, Predicate::Always, value)
    }

    /// Adds a dark-mode candidate.
    pub fn when_dark(self, value: impl Into<String>) -> Self {
        self.candidate(
            APPEARANCE_PRIORITY + 1,
            Predicate::Appearance(AppearanceMode::Dark),
            value,
        )
    }

    /// Adds a light-mode candidate.
    pub fn when_light(self, value: impl Into<String>) -> Self {
        self.candidate(
            APPEARANCE_PRIORITY,
            Predicate::Appearance(AppearanceMode::Light),
            value,
        )
    }

    /// Adds a candidate that applies when the host supports `cap`.
    ///
    /// It ranks one above every candidate already at or above
    /// [`CAPABILITY_PRIORITY`].
    pub fn with_capability(self, cap: Capability, value: impl Into<String>) -> Self {
        let priority = self
            .candidates
            .iter()
            .map(Candidate::priority)
            .filter(|p| *p >= CAPABILITY_PRIORITY)
            .max()
            .map_or(CAPABILITY_PRIORITY, |top| top + 1);
        self.candidate(priority, Predicate::Capability(cap), value)
    }

    /// Adds a prepared candidate, keeping descending priority order.
    pub fn push(&mut self, candidate: Candidate) {
        let at = self
            .candidates
            .iter()
            .position(|c| c.priority() < candidate.priority())
            .unwrap_or(self.candidates.len());
        self.candidates.insert(at, candidate);
    }

    /// The unconditional candidate used when nothing ranked above it holds.
    pub fn fallback_candidate(&self) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.is_unconditional())
    }

    /// Checks the token invariants.
    ///
    /// Called by [`TokenSetBuilder::build`](crate::TokenSetBuilder::build).
    /// A sealed token ends with its only unconditional candidate, and that
    /// fallback is what an empty ambient state (no appearance preference,
    /// no capabilities) selects.
    pub(crate) fn seal(&mut self) -> Result<(), ConfigurationError> {
        check_name(&self.name)?;

        for candidate in &self.candidates {
            crate::candidate::check_value(candidate.value()).map_err(|reason| {
                ConfigurationError::InvalidValue {
                    token: self.name.clone(),
                    value: candidate.value().to_string(),
                    reason,
                }
            })?;
        }

        for pair in self.candidates.windows(2) {
            if pair[0].priority() == pair[1].priority() {
                return Err(ConfigurationError::DuplicatePriority {
                    token: self.name.clone(),
                    priority: pair[0].priority(),
                });
            }
        }

        let fallback = self
            .candidates
            .iter()
            .position(|c| c.is_unconditional())
            .ok_or_else(|| ConfigurationError::MissingFallback {
                token: self.name.clone(),
            })?;

        if let Some(outranked) = self.candidates.get(fallback + 1) {
            return Err(ConfigurationError::OutrankedCandidate {
                token: self.name.clone(),
                priority: outranked.priority(),
            });
        }

        if let Some(shadowing) = self.candidates[..fallback]
            .iter()
            .find(|c| c.holds(AppearanceMode::Unspecified, Capabilities::none()))
        {
            return Err(ConfigurationError::ShadowedFallback {
                token: self.name.clone(),
                priority: shadowing.priority(),
            });
        }
        Ok(())
    }

    /// Selects the winning candidate for the ambient state.
    ///
    /// Candidates are tried from highest priority down; the first whose
    /// predicate holds wins. On a sealed token the last candidate always
    /// holds.
    pub(crate) fn select(&self, mode: AppearanceMode, caps: Capabilities) -> &Candidate {
        let last = self.candidates.len() - 1;
        self.candidates
            .iter()
            .find(|c| c.holds(mode, caps))
            .unwrap_or(&self.candidates[last])
    }
}

/// Token names are CSS custom identifiers without the `--` prefix.
fn check_name(name: &str) -> Result<(), ConfigurationError> {
    let invalid = |reason: &str| ConfigurationError::InvalidName {
        token: name.to_string(),
        reason: reason.to_string(),
    };

    let first = name.chars().next().ok_or_else(|| invalid("name is empty"))?;
    if first.is_ascii_digit() {
        return Err(invalid("name must not start with a digit"));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(invalid(&format!("unexpected character '{}'", bad)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sealed(mut token: DesignToken) -> DesignToken {
        token.seal().unwrap();
        token
    }

    #[test]
    fn test_new_strips_custom_property_prefix() {
        assert_eq!(DesignToken::new("--accent-color").name(), "accent-color");
        assert_eq!(DesignToken::new(" background ").name(), "background");
    }

    #[test]
    fn test_candidates_sorted_by_priority() {
        let token = DesignToken::new("accent-color")
            .fallback("rgb(84,0,215)")
            .when_dark("rgb(181,134,255)")
            .when_light("rgb(84,0,215)");

        let priorities: Vec<u32> = token.candidates().iter().map(|c| c.priority()).collect();
        assert_eq!(priorities, vec![101, 100, 0]);
    }

    #[test]
    fn test_capability_priorities_follow_declaration() {
        let token = DesignToken::new("safe-area-inset-top")
            .with_capability(Capability::InsetConstant, "constant(safe-area-inset-top)")
            .with_capability(Capability::InsetEnv, "env(safe-area-inset-top)")
            .fallback("0px");

        assert_eq!(token.candidates()[0].priority(), 201);
        assert_eq!(
            token.candidates()[0].predicate(),
            &Predicate::Capability(Capability::InsetEnv)
        );
    }

    #[test]
    fn test_select_prefers_priority_over_insertion_order() {
        // Inserted lowest first: C3, C2, C1.
        let token = sealed(
            DesignToken::new("accent-color")
                .candidate(1, Predicate::Always, "fallback")
                .candidate(2, Predicate::Capability(Capability::InsetEnv), "capability")
                .candidate(3, Predicate::Appearance(AppearanceMode::Dark), "dark"),
        );

        let caps = Capabilities::none().with(Capability::InsetEnv);
        assert_eq!(token.select(AppearanceMode::Dark, caps).value(), "dark");
        assert_eq!(token.select(AppearanceMode::Light, caps).value(), "capability");
        assert_eq!(
            token.select(AppearanceMode::Light, Capabilities::none()).value(),
            "fallback"
        );
    }

    #[test]
    fn test_seal_rejects_missing_fallback() {
        let mut token = DesignToken::new("hover-foreground").when_dark("rgb(255,255,255)");
        assert_eq!(
            token.seal(),
            Err(ConfigurationError::MissingFallback {
                token: "hover-foreground".to_string()
            })
        );
    }

    #[test]
    fn test_seal_rejects_duplicate_priority() {
        let mut token = DesignToken::new("background")
            .candidate(5, Predicate::Appearance(AppearanceMode::Dark), "black")
            .candidate(5, Predicate::Always, "white");
        assert!(matches!(
            token.seal(),
            Err(ConfigurationError::DuplicatePriority { priority: 5, .. })
        ));
    }

    #[test]
    fn test_seal_rejects_bad_names() {
        for name in ["", "1st", "accent color", "accent.color"] {
            let mut token = DesignToken::new(name).fallback("red");
            assert!(
                matches!(token.seal(), Err(ConfigurationError::InvalidName { .. })),
                "accepted {:?}",
                name
            );
        }
    }

    #[test]
    fn test_seal_rejects_bad_values() {
        let mut token = DesignToken::new("background").fallback("white; color: red");
        assert!(matches!(
            token.seal(),
            Err(ConfigurationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_seal_rejects_candidate_below_fallback() {
        let mut token = DesignToken::new("spacing")
            .candidate(10, Predicate::Always, "8px")
            .candidate(5, Predicate::Appearance(AppearanceMode::Dark), "10px");
        assert_eq!(
            token.seal(),
            Err(ConfigurationError::OutrankedCandidate {
                token: "spacing".to_string(),
                priority: 5,
            })
        );
    }

    #[test]
    fn test_seal_rejects_second_unconditional_candidate() {
        let mut token = DesignToken::new("gap")
            .candidate(10, Predicate::Always, "9px")
            .candidate(0, Predicate::Always, "8px");
        assert!(matches!(
            token.seal(),
            Err(ConfigurationError::OutrankedCandidate { priority: 0, .. })
        ));
    }

    #[test]
    fn test_seal_rejects_candidate_hiding_fallback() {
        let mut token = DesignToken::new("background")
            .fallback("white")
            .candidate(10, Predicate::Appearance(AppearanceMode::Unspecified), "grey");
        assert_eq!(
            token.seal(),
            Err(ConfigurationError::ShadowedFallback {
                token: "background".to_string(),
                priority: 10,
            })
        );

        let mut nested = DesignToken::new("background").fallback("white").candidate(
            10,
            Predicate::All(vec![Predicate::Appearance(AppearanceMode::Unspecified)]),
            "grey",
        );
        assert!(matches!(
            nested.seal(),
            Err(ConfigurationError::ShadowedFallback { .. })
        ));
    }

    #[test]
    fn test_empty_ambient_state_selects_fallback() {
        let token = sealed(
            DesignToken::new("safe-area-inset-top")
                .fallback("0px")
                .when_dark("1px")
                .with_capability(Capability::InsetEnv, "env(safe-area-inset-top)"),
        );
        assert_eq!(
            token.select(AppearanceMode::Unspecified, Capabilities::none()).value(),
            "0px"
        );
    }

    #[test]
    fn test_capability_priority_skips_explicit_candidates() {
        let token = sealed(
            DesignToken::new("safe-area-inset-top")
                .fallback("0px")
                .candidate(
                    201,
                    Predicate::Capability(Capability::InsetConstant),
                    "constant(safe-area-inset-top)",
                )
                .with_capability(Capability::InsetEnv, "env(safe-area-inset-top)"),
        );
        assert_eq!(token.candidates()[0].priority(), 202);
        assert_eq!(token.candidates()[0].value(), "env(safe-area-inset-top)");
    }

    #[test]
    fn test_fallback_candidate() {
        let token = DesignToken::new("background")
            .fallback("white")
            .when_dark("black");
        assert_eq!(token.fallback_candidate().map(|c| c.value()), Some("white"));
    }
}
