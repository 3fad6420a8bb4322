use pimon_core::MonitorSnapshot;
use std::fmt::Write;

/// Render one snapshot as a single readout line, the same columns the
/// floating window shows. Temperature prints `N/A` when no sensor is
/// available, with session extrema appended once at least one reading
/// was obtained.
pub fn readout(snapshot: &MonitorSnapshot) -> String {
    let s = &snapshot.sample;
    let mut line = format!(
        "CPU {:5.1}%  RAM {:5.1}%  DISK {:5.1}%  NET ↓{:7.1} ↑{:7.1} KB/s  TEMP {}",
        s.cpu_percent, s.mem_percent, s.disk_percent, s.net_down_kbps, s.net_up_kbps, s.temp,
    );
    if let Some((max, min)) = snapshot.temp_extrema.observed() {
        let _ = write!(line, "  (max {max:.1}°C, min {min:.1}°C)");
    }
    line
}
