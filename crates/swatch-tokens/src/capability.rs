//! Host capabilities that unlock alternate value sources.
//!
//! A capability says the host understands a particular value mechanism,
//! e.g. the `env(safe-area-inset-top)` function. Capabilities are never
//! probed here: the host hands in a [`Capabilities`] set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single host feature flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Safe-area insets through the legacy `constant()` function.
    InsetConstant,
    /// Safe-area insets through the `env()` function.
    InsetEnv,
}

impl Capability {
    /// Every capability, in bit order.
    pub const ALL: [Capability; 2] = [Capability::InsetConstant, Capability::InsetEnv];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::InsetConstant => "inset-constant",
            Capability::InsetEnv => "inset-env",
        }
    }

    /// The CSS function name this capability corresponds to.
    pub fn css_function(self) -> &'static str {
        match self {
            Capability::InsetConstant => "constant",
            Capability::InsetEnv => "env",
        }
    }

    /// Maps a CSS function name (as seen in `@supports`) back to a capability.
    pub fn from_css_function(name: &str) -> Option<Self> {
        Capability::ALL
            .into_iter()
            .find(|cap| cap.css_function().eq_ignore_ascii_case(name))
    }

    fn bit(self) -> u8 {
        match self {
            Capability::InsetConstant => 1,
            Capability::InsetEnv => 1 << 1,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Capability::ALL
            .into_iter()
            .find(|cap| cap.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown capability '{}' (expected inset-constant or inset-env)",
                    s.trim()
                )
            })
    }
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A set of supported capabilities. May be empty.
///
/// The set is a small bit mask, so it is `Copy` and cheap to hash, which
/// makes it a convenient cache key.
///
/// ```rust
/// use swatch_tokens::{Capabilities, Capability};
///
/// let caps = Capabilities::none().with(Capability::InsetEnv);
/// assert!(caps.contains(Capability::InsetEnv));
/// assert!(!caps.contains(Capability::InsetConstant));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Capabilities(u8);

impl Capabilities {
    /// The empty set.
    pub const fn none() -> Self {
        Capabilities(0)
    }

    /// Every known capability.
    pub fn all() -> Self {
        Capability::ALL.into_iter().collect()
    }

    /// Returns the set with `cap` added.
    pub fn with(mut self, cap: Capability) -> Self {
        self.insert(cap);
        self
    }

    pub fn insert(&mut self, cap: Capability) {
        self.0 |= cap.bit();
    }

    pub fn remove(&mut self, cap: Capability) {
        self.0 &= !cap.bit();
    }

    pub fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the members in bit order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |cap| self.contains(*cap))
    }

    /// Enumerates every possible capability set, starting with the empty one.
    ///
    /// Together with [`AppearanceMode::ALL`](crate::AppearanceMode::ALL) this
    /// spans the whole ambient domain a resolver can ever see.
    pub fn every_subset() -> impl Iterator<Item = Capabilities> {
        let limit = 1u8 << Capability::ALL.len();
        (0..limit).map(Capabilities)
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut caps = Capabilities::none();
        for cap in iter {
            caps.insert(cap);
        }
        caps
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("{}");
        }
        let names: Vec<&str> = self.iter().map(Capability::as_str).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

impl Serialize for Capabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for Capabilities {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let caps = Vec::<Capability>::deserialize(deserializer)?;
        Ok(caps.into_iter().collect())
    }
}
