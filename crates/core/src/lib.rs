pub mod error;
pub mod history;
pub mod state;

pub use error::{MonitorError, Result};
pub use history::{Extrema, ExtremaTracker, RollingWindow};
pub use state::{CounterSnapshot, Metric, MonitorSnapshot, Sample, Temperature};
