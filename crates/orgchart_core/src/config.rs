//! Tunables for storage, viewport, search and cards.
//!
//! Every field has a default, so a config file only needs the keys it changes.

use crate::store::member_store::DEFAULT_STORAGE_KEY;
use log::info;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfig {
    /// Blob key holding the member collection.
    pub storage_key: String,
    /// Discard stored data lacking the seed's sentinel record.
    pub require_seed_sentinel: bool,
    pub viewport: ViewportConfig,
    pub search: SearchConfig,
    pub cards: CardConfig,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            require_seed_sentinel: true,
            viewport: ViewportConfig::default(),
            search: SearchConfig::default(),
            cards: CardConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportConfig {
    /// Padding kept on each side when fitting the chart.
    pub fit_padding: f64,
    /// Multiplier applied to the fitted scale before clamping.
    pub fit_boost: f64,
    pub base_zoom_min: f64,
    pub base_zoom_max: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub zoom_step: f64,
    /// Absolute zoom used when centering a node.
    pub focus_zoom: f64,
    pub focus_tolerance_px: f64,
    pub focus_max_corrections: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            fit_padding: 60.0,
            fit_boost: 1.25,
            base_zoom_min: 0.2,
            base_zoom_max: 1.0,
            zoom_min: 0.3,
            zoom_max: 2.0,
            zoom_step: 0.1,
            focus_zoom: 2.0,
            focus_tolerance_px: 5.0,
            focus_max_corrections: 5,
        }
    }
}

impl ViewportConfig {
    /// Rejects values the controller cannot clamp or divide by.
    ///
    /// # Errors
    /// - `Invalid` for a non-finite value, a non-positive zoom or step,
    ///   negative padding or tolerance, or an inverted min/max pair.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("fitPadding", self.fit_padding),
            ("fitBoost", self.fit_boost),
            ("baseZoomMin", self.base_zoom_min),
            ("baseZoomMax", self.base_zoom_max),
            ("zoomMin", self.zoom_min),
            ("zoomMax", self.zoom_max),
            ("zoomStep", self.zoom_step),
            ("focusZoom", self.focus_zoom),
            ("focusTolerancePx", self.focus_tolerance_px),
        ];
        if let Some((field, _)) = finite.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::invalid(field, "must be a finite number"));
        }

        let positive = [
            ("fitBoost", self.fit_boost),
            ("baseZoomMin", self.base_zoom_min),
            ("zoomMin", self.zoom_min),
            ("zoomStep", self.zoom_step),
            ("focusZoom", self.focus_zoom),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, value)| *value <= 0.0) {
            return Err(ConfigError::invalid(field, "must be greater than zero"));
        }
        if self.fit_padding < 0.0 {
            return Err(ConfigError::invalid("fitPadding", "must not be negative"));
        }
        if self.focus_tolerance_px < 0.0 {
            return Err(ConfigError::invalid("focusTolerancePx", "must not be negative"));
        }
        if self.base_zoom_min > self.base_zoom_max {
            return Err(ConfigError::invalid("baseZoomMin", "exceeds baseZoomMax"));
        }
        if self.zoom_min > self.zoom_max {
            return Err(ConfigError::invalid("zoomMin", "exceeds zoomMax"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchConfig {
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 150 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CardConfig {
    /// Link badges shown before the "+N more" summary.
    pub max_inline_links: usize,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            max_inline_links: 3,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    /// Parsed, but a value is out of range.
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::Invalid { field, reason }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid chart config: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid chart config: {field} {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl ChartConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.viewport.validate()?;
        Ok(config)
    }
}

/// Loads config from `path`. `None` or a missing file yields defaults.
pub fn load_config(path: Option<&Path>) -> Result<ChartConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(ChartConfig::default());
    };
    match std::fs::read_to_string(path) {
        Ok(contents) => ChartConfig::from_json_str(&contents),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(
                "event=config_load module=config status=default reason=not_found path={}",
                path.display()
            );
            Ok(ChartConfig::default())
        }
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
