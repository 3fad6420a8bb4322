use pimon_core::Temperature;
use std::path::PathBuf;
use tracing::debug;

/// A place the CPU temperature may come from, tried in fixed order.
#[derive(Debug, Clone)]
pub enum TemperatureSource {
    /// A sensor registry: `(sensor name, readings)` in enumeration order.
    /// On a Raspberry Pi this usually contains a `cpu_thermal` entry.
    StructuredSensors(Vec<(String, Vec<f64>)>),
    /// A kernel thermal-zone file holding one number in millidegrees
    /// Celsius (e.g. `/sys/class/thermal/thermal_zone0/temp`).
    FallbackFile(PathBuf),
}

/// Resolve the CPU temperature from `sources`, in order.
///
/// Within a structured registry the sensor named `sensor_key` wins (exact
/// label, or a label prefixed by the key — hwmon labels often carry a
/// suffix like `"cpu_thermal temp1"`); otherwise the first sensor with a
/// reading is used. A registry with no readings falls through to the next
/// source. When nothing yields a value the result is
/// [`Temperature::Unavailable`] — never an error, and never a zero
/// stand-in (0°C is a real temperature).
pub fn resolve(sources: &[TemperatureSource], sensor_key: &str) -> Temperature {
    for source in sources {
        match source {
            TemperatureSource::StructuredSensors(sensors) => {
                if let Some(current) = from_registry(sensors, sensor_key) {
                    return Temperature::Celsius(current);
                }
            }
            TemperatureSource::FallbackFile(path) => {
                match std::fs::read_to_string(path) {
                    Ok(raw) => {
                        if let Ok(millidegrees) = raw.trim().parse::<f64>() {
                            return Temperature::Celsius(millidegrees / 1000.0);
                        }
                        debug!("unparsable thermal zone value in '{}'", path.display());
                    }
                    Err(e) => debug!("cannot read '{}': {e}", path.display()),
                }
            }
        }
    }
    Temperature::Unavailable
}

fn from_registry(sensors: &[(String, Vec<f64>)], sensor_key: &str) -> Option<f64> {
    let keyed = sensors
        .iter()
        .find(|(name, readings)| {
            (name == sensor_key || name.starts_with(sensor_key)) && !readings.is_empty()
        });
    let chosen = keyed.or_else(|| sensors.iter().find(|(_, readings)| !readings.is_empty()));
    chosen.map(|(_, readings)| readings[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn registry(entries: &[(&str, &[f64])]) -> TemperatureSource {
        TemperatureSource::StructuredSensors(
            entries
                .iter()
                .map(|(name, readings)| (name.to_string(), readings.to_vec()))
                .collect(),
        )
    }

    #[test]
    fn keyed_sensor_wins() {
        let sources = [registry(&[("acpitz", &[28.0]), ("cpu_thermal", &[52.5])])];
        assert_eq!(resolve(&sources, "cpu_thermal"), Temperature::Celsius(52.5));
    }

    #[test]
    fn key_matches_labelled_variant() {
        let sources = [registry(&[("cpu_thermal temp1", &[61.0])])];
        assert_eq!(resolve(&sources, "cpu_thermal"), Temperature::Celsius(61.0));
    }

    #[test]
    fn first_sensor_used_when_key_missing() {
        let sources = [registry(&[("acpitz", &[28.0]), ("nvme", &[35.0])])];
        assert_eq!(resolve(&sources, "cpu_thermal"), Temperature::Celsius(28.0));
    }

    #[test]
    fn sensor_without_readings_is_skipped() {
        let sources = [registry(&[("cpu_thermal", &[]), ("acpitz", &[30.0])])];
        assert_eq!(resolve(&sources, "cpu_thermal"), Temperature::Celsius(30.0));
    }

    #[test]
    fn empty_registry_falls_back_to_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "45000\n").unwrap();
        let sources = [
            registry(&[]),
            TemperatureSource::FallbackFile(f.path().to_path_buf()),
        ];
        assert_eq!(resolve(&sources, "cpu_thermal"), Temperature::Celsius(45.0));
    }

    #[test]
    fn zero_millidegrees_is_a_reading_not_a_sentinel() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "0\n").unwrap();
        let sources = [TemperatureSource::FallbackFile(f.path().to_path_buf())];
        assert_eq!(resolve(&sources, "cpu_thermal"), Temperature::Celsius(0.0));
    }

    #[test]
    fn garbage_file_content_is_unavailable() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "not a number\n").unwrap();
        let sources = [TemperatureSource::FallbackFile(f.path().to_path_buf())];
        assert_eq!(resolve(&sources, "cpu_thermal"), Temperature::Unavailable);
    }

    #[test]
    fn nothing_available_is_unavailable() {
        let sources = [
            registry(&[]),
            TemperatureSource::FallbackFile(PathBuf::from("/definitely/not/here")),
        ];
        assert_eq!(resolve(&sources, "cpu_thermal"), Temperature::Unavailable);
    }
}
