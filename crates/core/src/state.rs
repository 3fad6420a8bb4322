use crate::history::{Extrema, RollingWindow};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// The metric streams the sampler maintains. Used for error reporting
/// and log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cpu,
    Memory,
    Disk,
    Network,
    Temperature,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Cpu => "cpu",
            Metric::Memory => "memory",
            Metric::Disk => "disk",
            Metric::Network => "network",
            Metric::Temperature => "temperature",
        };
        f.write_str(name)
    }
}

/// A CPU temperature reading. `Unavailable` is an explicit state, not a
/// numeric sentinel — 0°C is a valid temperature and must never be
/// conflated with "no sensor".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Temperature {
    Celsius(f64),
    Unavailable,
}

impl Temperature {
    /// The reading in °C, or `None` when no sensor produced a value.
    #[must_use]
    pub fn as_celsius(&self) -> Option<f64> {
        match self {
            Temperature::Celsius(c) => Some(*c),
            Temperature::Unavailable => None,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Temperature::Celsius(_))
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temperature::Celsius(c) => write!(f, "{c:.1}°C"),
            Temperature::Unavailable => f.write_str("N/A"),
        }
    }
}

/// One tick's readings. Immutable once assembled by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Average CPU usage across all cores (0.0 – 100.0).
    pub cpu_percent: f64,
    /// RAM usage (0.0 – 100.0).
    pub mem_percent: f64,
    /// Usage of the configured filesystem (0.0 – 100.0).
    pub disk_percent: f64,
    /// Download throughput for this tick, in KB.
    pub net_down_kbps: f64,
    /// Upload throughput for this tick, in KB.
    pub net_up_kbps: f64,
    /// CPU temperature, if any sensor produced a reading.
    pub temp: Temperature,
}

/// Cumulative network byte counters at a point in time.
///
/// The scheduler retains exactly one previous snapshot and overwrites it
/// every tick; throughput is the difference between two snapshots.
#[derive(Debug, Clone, Copy)]
pub struct CounterSnapshot {
    /// Total bytes received since boot, summed over all interfaces.
    pub bytes_received: u64,
    /// Total bytes sent since boot, summed over all interfaces.
    pub bytes_sent: u64,
    /// When the counters were read — used to detect tick drift.
    pub taken_at: Instant,
}

impl CounterSnapshot {
    pub fn new(bytes_received: u64, bytes_sent: u64) -> Self {
        Self {
            bytes_received,
            bytes_sent,
            taken_at: Instant::now(),
        }
    }
}

/// Everything published to consumers after a completed tick: the fresh
/// sample plus copies of the rolling histories and the session
/// temperature extrema.
///
/// This is a copy-on-publish snapshot — consumers on other threads never
/// observe the scheduler's windows mid-mutation.
#[derive(Debug, Clone)]
pub struct MonitorSnapshot {
    /// Wall-clock time the tick completed.
    pub time: DateTime<Local>,
    pub sample: Sample,
    pub cpu_history: RollingWindow<f64>,
    pub mem_history: RollingWindow<f64>,
    pub disk_history: RollingWindow<f64>,
    pub net_down_history: RollingWindow<f64>,
    pub net_up_history: RollingWindow<f64>,
    pub temp_history: RollingWindow<Temperature>,
    /// Session-lifetime temperature max/min, unbounded by the windows.
    pub temp_extrema: Extrema,
}
