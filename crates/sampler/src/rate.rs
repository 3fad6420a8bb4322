use pimon_core::CounterSnapshot;

/// Convert two successive counter snapshots into `(down_kb, up_kb)` for
/// the tick that separates them.
///
/// The result is the raw per-tick delta in KB, not a time-normalized
/// rate; at the nominal one-second period the two coincide. If a counter
/// went backwards (interface reset, counter wraparound, reboot) the delta
/// is clamped to zero — a negative throughput is never reported.
pub fn compute_rate(prev: &CounterSnapshot, curr: &CounterSnapshot) -> (f64, f64) {
    let down = curr.bytes_received.saturating_sub(prev.bytes_received) as f64 / 1024.0;
    let up = curr.bytes_sent.saturating_sub(prev.bytes_sent) as f64 / 1024.0;
    (down, up)
}
