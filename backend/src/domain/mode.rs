//! Application mode selected at startup.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Notice shown when evidence files are dropped in demo mode.
pub const UPLOADS_DISABLED_NOTICE: &str =
    "File uploads are disabled in demo mode. Your other answers were saved.";

/// Notice shown when the demo endpoint is used outside demo mode.
pub const DEMO_UNAVAILABLE_NOTICE: &str = "Demo sessions are only available in demo mode.";

const DEMO_BANNER: &str = "DEMO MODE: using simulated data. File uploads are disabled.";

/// Whether the service runs against live data or as a demonstration.
///
/// Demo mode drops evidence uploads, enables the demo session endpoint and
/// exposes a banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppMode {
    #[default]
    Live,
    Demo,
}

impl AppMode {
    /// Select the mode from the configured demo flag.
    #[must_use]
    pub const fn from_demo_flag(demo: bool) -> Self {
        if demo { Self::Demo } else { Self::Live }
    }

    #[must_use]
    pub const fn is_demo(self) -> bool {
        matches!(self, Self::Demo)
    }

    #[must_use]
    pub const fn accepts_uploads(self) -> bool {
        !self.is_demo()
    }

    /// Banner text for pages rendered in this mode.
    #[must_use]
    pub const fn banner(self) -> Option<&'static str> {
        match self {
            Self::Live => None,
            Self::Demo => Some(DEMO_BANNER),
        }
    }
}

impl std::fmt::Display for AppMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Live => "live",
            Self::Demo => "demo",
        })
    }
}
