use crate::temperature::{self, TemperatureSource};
use pimon_config::TemperatureConfig;
use pimon_core::{CounterSnapshot, Metric, MonitorError, Result, Temperature};
use std::path::Path;
use sysinfo::{Components, Disks, Networks, System};

/// Where the scheduler gets its raw readings from.
///
/// The production implementation is [`SysinfoSource`]; tests drive the
/// scheduler with scripted values instead.
pub trait MetricSource: Send + 'static {
    /// CPU utilization since the previous call (0.0 – 100.0). The first
    /// call in a process has no baseline and may legitimately report ~0.
    fn cpu_percent(&mut self) -> Result<f64>;

    fn memory_percent(&mut self) -> Result<f64>;

    /// Usage of the filesystem mounted at `path` (0.0 – 100.0).
    fn disk_percent(&mut self, path: &Path) -> Result<f64>;

    /// Cumulative byte counters since boot, summed over all interfaces.
    /// Monotonic except across counter resets, which the rate computation
    /// tolerates.
    fn network_counters(&mut self) -> Result<CounterSnapshot>;

    /// CPU temperature. Degrades internally — never an error.
    fn temperature(&mut self) -> Temperature;
}

/// [`MetricSource`] backed by the `sysinfo` crate plus the kernel
/// thermal-zone fallback file.
pub struct SysinfoSource {
    system: System,
    networks: Networks,
    components: Components,
    temperature: TemperatureConfig,
}

impl SysinfoSource {
    pub fn new(temperature: TemperatureConfig) -> Self {
        Self {
            system: System::new(),
            networks: Networks::new_with_refreshed_list(),
            components: Components::new_with_refreshed_list(),
            temperature,
        }
    }
}

impl MetricSource for SysinfoSource {
    fn cpu_percent(&mut self) -> Result<f64> {
        self.system.refresh_cpu_usage();
        if self.system.cpus().is_empty() {
            return Err(MonitorError::transient(Metric::Cpu, "no CPUs reported"));
        }
        Ok(f64::from(self.system.global_cpu_usage()))
    }

    fn memory_percent(&mut self) -> Result<f64> {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        if total == 0 {
            return Err(MonitorError::transient(
                Metric::Memory,
                "total memory reported as zero",
            ));
        }
        Ok(self.system.used_memory() as f64 / total as f64 * 100.0)
    }

    fn disk_percent(&mut self, path: &Path) -> Result<f64> {
        let disks = Disks::new_with_refreshed_list();
        let disk = disks
            .iter()
            .find(|d| d.mount_point() == path)
            .ok_or(MonitorError::Unavailable { metric: Metric::Disk })?;
        let total = disk.total_space();
        if total == 0 {
            return Err(MonitorError::transient(
                Metric::Disk,
                "filesystem reports zero size",
            ));
        }
        let used = total - disk.available_space();
        Ok(used as f64 / total as f64 * 100.0)
    }

    fn network_counters(&mut self) -> Result<CounterSnapshot> {
        self.networks.refresh(false); // false = keep existing interfaces list
        if self.networks.iter().next().is_none() {
            return Err(MonitorError::transient(
                Metric::Network,
                "no network interfaces",
            ));
        }
        let recv: u64 = self.networks.iter().map(|(_, d)| d.total_received()).sum();
        let sent: u64 = self.networks.iter().map(|(_, d)| d.total_transmitted()).sum();
        Ok(CounterSnapshot::new(recv, sent))
    }

    fn temperature(&mut self) -> Temperature {
        self.components.refresh(false);
        let sensors: Vec<(String, Vec<f64>)> = self
            .components
            .iter()
            .map(|c| {
                let readings = c.temperature().map(f64::from).into_iter().collect();
                (c.label().to_string(), readings)
            })
            .collect();

        let sources = [
            TemperatureSource::StructuredSensors(sensors),
            TemperatureSource::FallbackFile(self.temperature.fallback_path.clone()),
        ];
        temperature::resolve(&sources, &self.temperature.sensor_key)
    }
}
