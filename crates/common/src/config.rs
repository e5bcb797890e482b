//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Analyzer options, delivered to the scheduler as snapshots.
    pub analyzer: AnalyzerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Options recognized by the sampling scheduler.
///
/// A value of this type is treated as an immutable snapshot: the scheduler
/// only swaps it between ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// When false, streams keep ticking but nothing is sampled or shown.
    pub enabled: bool,

    /// Enables the stress perturbation hook used to exercise the UI.
    pub demo_mode: bool,

    /// Target sample rate (samples per second).
    pub fps: f64,

    /// Consumer-side threshold (0-100) for the high-risk band.
    pub red_threshold: f64,

    /// Lower bound on the sampling interval in milliseconds.
    pub floor_ms: f64,

    /// Fixed seed for the demo perturbation RNG. `None` seeds from entropy.
    /// A live change reseeds the running perturbation.
    pub demo_seed: Option<u64>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trustcall=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            demo_mode: false,
            fps: 5.0,
            red_threshold: 60.0,
            floor_ms: 60.0,
            demo_seed: None,
        }
    }
}

impl AnalyzerConfig {
    /// Return a copy with out-of-range values pulled back into range.
    pub fn validated(&self) -> Self {
        let fps = if self.fps.is_finite() && self.fps >= 1.0 {
            self.fps
        } else {
            1.0
        };
        let red_threshold = if self.red_threshold.is_finite() {
            self.red_threshold.clamp(0.0, 100.0)
        } else {
            60.0
        };
        let floor_ms = if self.floor_ms.is_finite() {
            self.floor_ms.max(0.0)
        } else {
            60.0
        };

        Self {
            fps,
            red_threshold,
            floor_ms,
            ..self.clone()
        }
    }

    /// Effective sampling interval: `max(1000 / fps, floor_ms)`.
    pub fn sample_interval_ms(&self) -> f64 {
        let cfg = self.validated();
        (1000.0 / cfg.fps).max(cfg.floor_ms)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("trustcall").join("config.json")
}
