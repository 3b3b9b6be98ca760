use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::connection::Target;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Target list is empty")]
    NoTargets,

    #[error("calibration_samples must be >= 1")]
    NoCalibrationSamples,
}

/// Un objetivo remoto tal como aparece en el archivo de configuración
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    pub name: Option<String>,
    pub host: String,
    pub port: u16,
}

impl TargetConfig {
    pub fn to_target(&self, idx: usize) -> Target {
        Target {
            name: self
                .name
                .clone()
                .unwrap_or_else(|| format!("objetivo-{}", idx + 1)),
            host: self.host.clone(),
            port: self.port,
        }
    }
}

/// Estrategia de detección, elegida una sola vez al inicio
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Clasificador por delta de aceleración
    Threshold {
        #[serde(default = "default_threshold_g")]
        threshold_g: f32,
        #[serde(default = "default_threshold_cooldown")]
        cooldown_secs: f32,
    },
    /// Clasificador por modelo de secuencia (ONNX)
    Model {
        model_path: String,
        classes_path: String,
        scaler_path: String,
        #[serde(default = "default_window_size")]
        window_size: usize,
        #[serde(default = "default_confidence")]
        confidence: f32,
        #[serde(default = "default_model_cooldown")]
        cooldown_secs: f32,
    },
}

impl StrategyConfig {
    pub fn cooldown_secs(&self) -> f32 {
        match self {
            StrategyConfig::Threshold { cooldown_secs, .. } => *cooldown_secs,
            StrategyConfig::Model { cooldown_secs, .. } => *cooldown_secs,
        }
    }
}

fn default_threshold_g() -> f32 {
    1.0
}

fn default_threshold_cooldown() -> f32 {
    1.5
}

fn default_window_size() -> usize {
    20
}

fn default_confidence() -> f32 {
    0.7
}

fn default_model_cooldown() -> f32 {
    1.0
}

fn default_i2c_device() -> String {
    "/dev/i2c-1".to_string()
}

fn default_sample_interval_ms() -> u64 {
    10
}

fn default_calibration_samples() -> usize {
    2000
}

fn default_telemetry_interval_secs() -> f32 {
    1.0
}

/// Configuración de la sesión, cargada una sola vez al inicio
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub targets: Vec<TargetConfig>,
    pub detector: StrategyConfig,
    /// URL base del colector de monitoreo; sin ella no hay telemetría
    pub collector_url: Option<String>,
    #[serde(default = "default_i2c_device")]
    pub i2c_device: String,
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    #[serde(default = "default_calibration_samples")]
    pub calibration_samples: usize,
    #[serde(default = "default_telemetry_interval_secs")]
    pub telemetry_interval_secs: f32,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }
        if self.calibration_samples == 0 {
            return Err(ConfigError::NoCalibrationSamples);
        }
        Ok(())
    }

    pub fn targets(&self) -> Vec<Target> {
        self.targets
            .iter()
            .enumerate()
            .map(|(idx, t)| t.to_target(idx))
            .collect()
    }
}
