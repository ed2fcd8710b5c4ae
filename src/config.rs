//! Environment-driven export and upload settings.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use canvas::consts::{CUSTOMIZATION_FEE, EXPORT_SCALE, MAX_UPLOAD_BYTES};

/// Parse an env var, falling back to `default` when unset or malformed.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportConfig {
    /// Supersampling factor for captured artifacts.
    pub export_scale: f32,
    /// Flat fee added once a design has at least one element.
    pub customization_fee: f64,
    pub max_upload_bytes: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { export_scale: EXPORT_SCALE, customization_fee: CUSTOMIZATION_FEE, max_upload_bytes: MAX_UPLOAD_BYTES }
    }
}

impl ExportConfig {
    /// Read `STUDIO_EXPORT_SCALE`, `STUDIO_CUSTOMIZATION_FEE` and
    /// `STUDIO_MAX_UPLOAD_BYTES`. A non-positive scale keeps the default.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let scale = env_parse("STUDIO_EXPORT_SCALE", defaults.export_scale);
        Self {
            export_scale: if scale.is_finite() && scale > 0.0 { scale } else { defaults.export_scale },
            customization_fee: env_parse("STUDIO_CUSTOMIZATION_FEE", defaults.customization_fee),
            max_upload_bytes: env_parse("STUDIO_MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
        }
    }
}
