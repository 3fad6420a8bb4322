use pimon_core::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure parsed from `pimon.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Sampling cadence and history settings.
    pub sampler: SamplerConfig,
    /// Temperature sensor lookup settings.
    pub temperature: TemperatureConfig,
}

impl MonitorConfig {
    /// Reject settings the sampler cannot run with. A zero capacity or
    /// period would otherwise only blow up inside the sampling task,
    /// where the user sees nothing but a closed snapshot stream.
    pub fn validate(&self) -> Result<()> {
        if self.sampler.history_capacity == 0 {
            return Err(MonitorError::Config(
                "history_capacity must be at least 1".to_string(),
            ));
        }
        if self.sampler.tick_period_ms == 0 {
            return Err(MonitorError::Config(
                "tick_period_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for the sampling loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Retained history points per metric.
    pub history_capacity: usize,
    /// Sampling period in milliseconds.
    pub tick_period_ms: u64,
    /// Filesystem whose usage is reported as the disk metric.
    pub disk_path: PathBuf,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            history_capacity: 60,
            tick_period_ms: 1000,
            disk_path: PathBuf::from("/"),
        }
    }
}

/// Where to look for the CPU temperature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureConfig {
    /// Preferred sensor label in the structured registry.
    /// `"cpu_thermal"` is the conventional Raspberry Pi key.
    pub sensor_key: String,
    /// Kernel thermal-zone file read (millidegrees) when no structured
    /// sensor is available.
    pub fallback_path: PathBuf,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            sensor_key: "cpu_thermal".to_string(),
            fallback_path: PathBuf::from("/sys/class/thermal/thermal_zone0/temp"),
        }
    }
}
