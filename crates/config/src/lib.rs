pub mod schema;
pub mod watcher;

pub use schema::{MonitorConfig, SamplerConfig, TemperatureConfig};
pub use watcher::ConfigWatcher;

use pimon_core::{MonitorError, Result};
use std::path::{Path, PathBuf};

/// Read and validate `pimon.toml` from `path`.
///
/// A missing file is not an error — it just means first run, nothing
/// written yet — and yields the built-in defaults. Anything else that
/// goes wrong (unreadable file, bad TOML, values the sampler cannot run
/// with) is a [`MonitorError::Config`].
pub fn load(path: impl AsRef<Path>) -> Result<MonitorConfig> {
    let path = path.as_ref();

    let config = if path.exists() {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MonitorError::Config(format!("cannot read '{}': {e}", path.display())))?;
        toml::from_str(&raw)
            .map_err(|e| MonitorError::Config(format!("TOML parse error: {e}")))?
    } else {
        tracing::info!("no config at '{}', using defaults", path.display());
        MonitorConfig::default()
    };

    config.validate()?;
    Ok(config)
}

/// The conventional config location: `$XDG_CONFIG_HOME/pimon/pimon.toml`,
/// with the usual `~/.config` fallback.
pub fn default_path() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pimon")
        .join("pimon.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = load("/definitely/not/here/pimon.toml").unwrap();
        assert_eq!(cfg.sampler.history_capacity, 60);
        assert_eq!(cfg.sampler.tick_period_ms, 1000);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[sampler]\ntick_period_ms = 250").unwrap();
        let cfg = load(f.path()).unwrap();
        assert_eq!(cfg.sampler.tick_period_ms, 250);
        assert_eq!(cfg.sampler.history_capacity, 60);
        assert_eq!(cfg.temperature.sensor_key, "cpu_thermal");
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[sampler\nbroken").unwrap();
        assert!(matches!(load(f.path()), Err(MonitorError::Config(_))));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[sampler]\nhistory_capacity = 0").unwrap();
        assert!(matches!(load(f.path()), Err(MonitorError::Config(_))));
    }

    #[test]
    fn zero_period_is_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[sampler]\ntick_period_ms = 0").unwrap();
        assert!(matches!(load(f.path()), Err(MonitorError::Config(_))));
    }
}
