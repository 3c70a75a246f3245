//! Runtime configuration: JSON file plus `LETTERMARK_*` environment overrides.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

use crate::foundation::core::SizeBounds;
use crate::foundation::error::{AvatarError, AvatarResult};

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "LETTERMARK_";

/// Outbound probe settings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// When `false`, the external service is never contacted.
    pub enabled: bool,
    /// Base URL; the fingerprint is appended as the last path segment.
    pub base_url: String,
    /// Total time budget for one probe (connect, headers and body).
    pub timeout_ms: u64,
    /// `User-Agent` sent upstream.
    pub user_agent: String,
}

impl ProbeConfig {
    /// [`ProbeConfig::timeout_ms`] as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://www.gravatar.com/avatar".to_string(),
            timeout_ms: 2000,
            user_agent: concat!("lettermark/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AvatarConfig {
    /// Supported size range.
    pub sizes: SizeBounds,
    /// External prober settings.
    pub probe: ProbeConfig,
    /// Replacement for the embedded typeface.
    pub font_path: Option<PathBuf>,
}

impl AvatarConfig {
    /// Parse JSON configuration. Missing fields take their defaults.
    pub fn from_reader<R: Read>(reader: R) -> AvatarResult<Self> {
        let cfg: Self = serde_json::from_reader(reader)
            .map_err(|e| AvatarError::config(format!("invalid config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load JSON configuration from disk.
    pub fn from_path(path: impl AsRef<Path>) -> AvatarResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("open config '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> AvatarResult<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source (keys include [`ENV_PREFIX`]).
    ///
    /// Recognized keys: `PROBE_ENABLED`, `PROBE_BASE_URL`, `PROBE_TIMEOUT_MS`, `FONT_PATH`,
    /// `SIZE_MIN`, `SIZE_MAX`, `SIZE_DEFAULT`. The result is re-validated.
    pub fn apply_overrides_from(
        &mut self,
        get: impl Fn(&str) -> Option<String>,
    ) -> AvatarResult<()> {
        let var = |name: &str| get(&format!("{ENV_PREFIX}{name}"));

        if let Some(v) = var("PROBE_ENABLED") {
            self.probe.enabled = parse_bool(&v)
                .ok_or_else(|| AvatarError::config(format!("PROBE_ENABLED: not a bool: {v}")))?;
        }
        if let Some(v) = var("PROBE_BASE_URL") {
            self.probe.base_url = v;
        }
        if let Some(v) = var("PROBE_TIMEOUT_MS") {
            self.probe.timeout_ms = parse_num(&v, "PROBE_TIMEOUT_MS")?;
        }
        if let Some(v) = var("FONT_PATH") {
            self.font_path = (!v.trim().is_empty()).then(|| PathBuf::from(v));
        }
        if let Some(v) = var("SIZE_MIN") {
            self.sizes.min = parse_num(&v, "SIZE_MIN")?;
        }
        if let Some(v) = var("SIZE_MAX") {
            self.sizes.max = parse_num(&v, "SIZE_MAX")?;
        }
        if let Some(v) = var("SIZE_DEFAULT") {
            self.sizes.default = parse_num(&v, "SIZE_DEFAULT")?;
        }

        self.validate()
    }

    /// Check internal consistency.
    pub fn validate(&self) -> AvatarResult<()> {
        self.sizes.validate()?;
        if self.probe.timeout_ms == 0 {
            return Err(AvatarError::config("probe.timeout_ms must be > 0"));
        }
        if self.probe.enabled {
            let url = url::Url::parse(&self.probe.base_url)
                .map_err(|e| AvatarError::config(format!("probe.base_url: {e}")))?;
            if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
                return Err(AvatarError::config(
                    "probe.base_url must be an http(s) URL with a path",
                ));
            }
        }
        Ok(())
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_num<T: std::str::FromStr>(v: &str, key: &str) -> AvatarResult<T> {
    v.trim()
        .parse::<T>()
        .map_err(|_| AvatarError::config(format!("{key}: not a number: {v}")))
}

#[cfg(test)]
#[path = "../../tests/unit/config/config.rs"]
mod tests;
