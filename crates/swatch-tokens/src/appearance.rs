//! Appearance mode and OS detection.
//!
//! The resolver never looks up the appearance mode on its own: callers pass
//! an [`AppearanceMode`] into every resolution. This module only offers a
//! best-effort probe for hosts that want to ask the OS.
//!
//! ```rust
//! use swatch_tokens::{set_appearance_detector, detect_appearance, AppearanceMode};
//!
//! // For testing, override the detector
//! set_appearance_detector(|| AppearanceMode::Dark);
//! assert_eq!(detect_appearance(), AppearanceMode::Dark);
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use dark_light::Mode as OsThemeMode;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// The host's preferred color scheme.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AppearanceMode {
    /// Light mode (light background, dark text).
    Light,
    /// Dark mode (dark background, light text).
    Dark,
    /// The host did not express a preference, or could not be asked.
    #[default]
    Unspecified,
}

impl AppearanceMode {
    /// Every mode, in a stable order.
    pub const ALL: [AppearanceMode; 3] = [
        AppearanceMode::Light,
        AppearanceMode::Dark,
        AppearanceMode::Unspecified,
    ];

    /// The textual form used in token files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            AppearanceMode::Light => "light",
            AppearanceMode::Dark => "dark",
            AppearanceMode::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for AppearanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppearanceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(AppearanceMode::Light),
            "dark" => Ok(AppearanceMode::Dark),
            "unspecified" | "none" => Ok(AppearanceMode::Unspecified),
            other => Err(format!(
                "unknown appearance mode '{}' (expected light, dark or unspecified)",
                other
            )),
        }
    }
}

/// A function that reports the host appearance mode.
pub type AppearanceDetector = fn() -> AppearanceMode;

static APPEARANCE_DETECTOR: Lazy<Mutex<AppearanceDetector>> =
    Lazy::new(|| Mutex::new(os_appearance_detector));

/// Overrides the detector used by [`detect_appearance`].
///
/// This is process-wide. Tests that install a detector should run serially.
pub fn set_appearance_detector(detector: AppearanceDetector) {
    let mut guard = APPEARANCE_DETECTOR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = detector;
}

/// Restores OS-based detection after [`set_appearance_detector`].
pub fn reset_appearance_detector() {
    set_appearance_detector(os_appearance_detector);
}

/// Detects the host's preferred appearance mode.
///
/// Uses the `dark-light` crate unless a detector was installed with
/// [`set_appearance_detector`]. Detection failures map to
/// [`AppearanceMode::Unspecified`], which resolves every token to its
/// fallback.
pub fn detect_appearance() -> AppearanceMode {
    let detector = *APPEARANCE_DETECTOR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    detector()
}

fn os_appearance_detector() -> AppearanceMode {
    match dark_light::detect() {
        Ok(OsThemeMode::Dark) => AppearanceMode::Dark,
        Ok(OsThemeMode::Light) => AppearanceMode::Light,
        Ok(_) => AppearanceMode::Unspecified,
        Err(err) => {
            tracing::debug!(error = ?err, "appearance detection failed");
            AppearanceMode::Unspecified
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_modes() {
        assert_eq!("dark".parse::<AppearanceMode>(), Ok(AppearanceMode::Dark));
        assert_eq!(" Light ".parse::<AppearanceMode>(), Ok(AppearanceMode::Light));
        assert_eq!(
            "unspecified".parse::<AppearanceMode>(),
            Ok(AppearanceMode::Unspecified)
        );
        assert!("dim".parse::<AppearanceMode>().is_err());
    }

    #[test]
    fn test_display_round_trips_all() {
        for mode in AppearanceMode::ALL {
            assert_eq!(mode.to_string().parse::<AppearanceMode>(), Ok(mode));
        }
    }

    #[test]
    fn test_default_is_unspecified() {
        assert_eq!(AppearanceMode::default(), AppearanceMode::Unspecified);
    }

    #[test]
    #[serial]
    fn test_detect_appearance_uses_override() {
        set_appearance_detector(|| AppearanceMode::Dark);
        assert_eq!(detect_appearance(), AppearanceMode::Dark);

        set_appearance_detector(|| AppearanceMode::Light);
        assert_eq!(detect_appearance(), AppearanceMode::Light);

        reset_appearance_detector();
    }
}
