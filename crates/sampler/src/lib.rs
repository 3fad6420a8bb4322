//! The sampling-and-windowing engine: reads host metrics once per tick,
//! maintains rolling histories, and publishes an immutable
//! [`MonitorSnapshot`](pimon_core::MonitorSnapshot) per completed tick.

pub mod rate;
pub mod scheduler;
pub mod source;
pub mod temperature;

pub use rate::compute_rate;
pub use scheduler::Sampler;
pub use source::{MetricSource, SysinfoSource};
pub use temperature::TemperatureSource;
