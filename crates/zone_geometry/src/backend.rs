//! Process-wide polygon backend capability.
//!
//! The backend is the `geo` crate, compiled in through the `polygon` feature.
//! It can be switched off for a whole process by setting
//! [`DISABLE_POLYGON_ENV`] before the first probe. The answer is computed
//! once and never changes afterwards.

use std::sync::OnceLock;

/// Environment variable that disables the polygon backend when truthy.
pub const DISABLE_POLYGON_ENV: &str = "ZONE_GEOMETRY_DISABLE_POLYGON";

static POLYGON_BACKEND: OnceLock<bool> = OnceLock::new();

/// Whether polygon-producing conversions can run in this process.
pub fn is_polygon_backend_available() -> bool {
    *POLYGON_BACKEND.get_or_init(|| {
        let compiled = cfg!(feature = "polygon");
        let disabled = std::env::var(DISABLE_POLYGON_ENV)
            .map(|value| is_truthy(&value))
            .unwrap_or(false);
        let available = compiled && !disabled;

        tracing::debug!(compiled, disabled, available, "probed polygon backend");
        available
    })
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
