use crate::rate::compute_rate;
use crate::source::MetricSource;
use chrono::Local;
use pimon_config::MonitorConfig;
use pimon_core::{
    CounterSnapshot, ExtremaTracker, MonitorError, MonitorSnapshot, Result, RollingWindow, Sample,
    Temperature,
};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Measured tick spacing may deviate this much from the nominal period
/// before it is worth logging.
const DRIFT_TOLERANCE: f64 = 0.25;

/// Handle to the background sampling task.
///
/// Created by [`Sampler::start`], which also returns the snapshot stream.
/// The task stops when [`Sampler::stop`] is called, when the handle is
/// dropped, or when the last receiver is dropped.
#[derive(Debug)]
pub struct Sampler {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Sampler {
    /// Take the initial counter baseline and begin ticking.
    ///
    /// No snapshot is emitted for the baseline itself; the first one
    /// arrives a full period later. Failure to obtain the baseline means
    /// throughput could never be derived, so it aborts startup with
    /// [`MonitorError::Init`] and nothing is spawned. Settings the loop
    /// cannot run with (zero capacity or period) are likewise refused
    /// here instead of panicking inside the spawned task.
    pub fn start<M: MetricSource>(
        config: MonitorConfig,
        mut source: M,
    ) -> Result<(Self, mpsc::Receiver<MonitorSnapshot>)> {
        config.validate()?;

        let baseline = source
            .network_counters()
            .map_err(|e| MonitorError::Init(format!("no network counter baseline: {e}")))?;

        let (tx, rx) = mpsc::channel(4);
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(sample_loop(config, source, baseline, tx, shutdown_rx));

        Ok((Self { shutdown, task }, rx))
    }

    /// Request the sampling task to stop. Idempotent, callable from a
    /// snapshot consumer or from outside; once this returns, no further
    /// snapshot will be delivered.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Stop and wait for the task to wind down.
    pub async fn shutdown(self) {
        self.stop();
        let _ = self.task.await;
    }
}

struct Windows {
    cpu: RollingWindow<f64>,
    mem: RollingWindow<f64>,
    disk: RollingWindow<f64>,
    net_down: RollingWindow<f64>,
    net_up: RollingWindow<f64>,
    temp: RollingWindow<Temperature>,
}

impl Windows {
    fn new(capacity: usize) -> Self {
        Self {
            cpu: RollingWindow::new(capacity),
            mem: RollingWindow::new(capacity),
            disk: RollingWindow::new(capacity),
            net_down: RollingWindow::new(capacity),
            net_up: RollingWindow::new(capacity),
            temp: RollingWindow::new(capacity),
        }
    }
}

async fn sample_loop<M: MetricSource>(
    config: MonitorConfig,
    mut source: M,
    mut prev: CounterSnapshot,
    tx: mpsc::Sender<MonitorSnapshot>,
    mut shutdown: watch::Receiver<bool>,
) {
    let period = Duration::from_millis(config.sampler.tick_period_ms);
    let mut windows = Windows::new(config.sampler.history_capacity);
    let mut temp_extrema = ExtremaTracker::new();

    // The baseline tick already happened; first sample is one period out.
    let mut ticker = time::interval_at(time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        period_ms = config.sampler.tick_period_ms,
        capacity = config.sampler.history_capacity,
        "sampler running"
    );

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }
        // A tick that raced a stop request must not run.
        if *shutdown.borrow() {
            break;
        }

        // Counters are the tick's one hard dependency: without them no
        // rate can be derived, so the whole tick is skipped and nothing
        // is pushed — windows stay positionally aligned.
        let curr = match source.network_counters() {
            Ok(c) => c,
            Err(e) => {
                warn!("skipping tick: {e}");
                continue;
            }
        };

        let elapsed = curr.taken_at.duration_since(prev.taken_at).as_secs_f64();
        let nominal = period.as_secs_f64();
        if (elapsed - nominal).abs() > nominal * DRIFT_TOLERANCE {
            // Rates are per-tick deltas; drift makes them under/over-report.
            debug!(elapsed_s = elapsed, nominal_s = nominal, "tick drift");
        }

        let (net_down_kbps, net_up_kbps) = compute_rate(&prev, &curr);
        prev = curr;

        let cpu_percent = read_or_repeat(source.cpu_percent(), &windows.cpu);
        let mem_percent = read_or_repeat(source.memory_percent(), &windows.mem);
        let disk_percent = read_or_repeat(
            source.disk_percent(&config.sampler.disk_path),
            &windows.disk,
        );
        let temp = source.temperature();
        if let Some(celsius) = temp.as_celsius() {
            temp_extrema.observe(celsius);
        }

        windows.cpu.push(cpu_percent);
        windows.mem.push(mem_percent);
        windows.disk.push(disk_percent);
        windows.net_down.push(net_down_kbps);
        windows.net_up.push(net_up_kbps);
        windows.temp.push(temp);

        let snapshot = MonitorSnapshot {
            time: Local::now(),
            sample: Sample {
                cpu_percent,
                mem_percent,
                disk_percent,
                net_down_kbps,
                net_up_kbps,
                temp,
            },
            cpu_history: windows.cpu.clone(),
            mem_history: windows.mem.clone(),
            disk_history: windows.disk.clone(),
            net_down_history: windows.net_down.clone(),
            net_up_history: windows.net_up.clone(),
            temp_history: windows.temp.clone(),
            temp_extrema: temp_extrema.snapshot(),
        };

        if *shutdown.borrow() {
            break;
        }
        if tx.send(snapshot).await.is_err() {
            break; // all receivers dropped
        }
    }

    info!("sampler stopped");
}

/// Per-metric failure isolation: a failing read never cancels the tick.
/// The metric repeats its last windowed value so every window advances in
/// lockstep; before any history exists the stand-in is 0.0.
fn read_or_repeat(result: Result<f64>, window: &RollingWindow<f64>) -> f64 {
    match result {
        Ok(v) => v,
        Err(e) => {
            warn!("{e}; repeating last value");
            window.last().copied().unwrap_or(0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pimon_core::{Metric, Temperature};
    use std::collections::VecDeque;
    use std::path::Path;

    /// Deterministic metric source for driving the scheduler in tests.
    struct ScriptedSource {
        cpu: VecDeque<f64>,
        mem: f64,
        counters: VecDeque<Result<(u64, u64)>>,
        temps: VecDeque<Temperature>,
        mem_fail_on_call: Option<usize>,
        mem_calls: usize,
    }

    impl ScriptedSource {
        fn new(cpu: &[f64]) -> Self {
            Self {
                cpu: cpu.iter().copied().collect(),
                mem: 50.0,
                counters: VecDeque::new(),
                temps: VecDeque::new(),
                mem_fail_on_call: None,
                mem_calls: 0,
            }
        }

        fn with_counters(mut self, counters: Vec<Result<(u64, u64)>>) -> Self {
            self.counters = counters.into();
            self
        }

        fn with_temps(mut self, temps: &[Temperature]) -> Self {
            self.temps = temps.iter().copied().collect();
            self
        }

        fn failing_mem_on_call(mut self, call: usize) -> Self {
            self.mem_fail_on_call = Some(call);
            self
        }
    }

    impl MetricSource for ScriptedSource {
        fn cpu_percent(&mut self) -> Result<f64> {
            Ok(self.cpu.pop_front().unwrap_or(0.0))
        }

        fn memory_percent(&mut self) -> Result<f64> {
            self.mem_calls += 1;
            if self.mem_fail_on_call == Some(self.mem_calls) {
                return Err(MonitorError::transient(Metric::Memory, "scripted failure"));
            }
            self.mem += 1.0;
            Ok(self.mem)
        }

        fn disk_percent(&mut self, _path: &Path) -> Result<f64> {
            Ok(70.0)
        }

        fn network_counters(&mut self) -> Result<CounterSnapshot> {
            match self.counters.pop_front() {
                Some(Ok((recv, sent))) => Ok(CounterSnapshot::new(recv, sent)),
                Some(Err(e)) => Err(e),
                // Script exhausted: hold the counters steady.
                None => Ok(CounterSnapshot::new(u64::MAX / 2, u64::MAX / 2)),
            }
        }

        fn temperature(&mut self) -> Temperature {
            self.temps.pop_front().unwrap_or(Temperature::Unavailable)
        }
    }

    fn config(capacity: usize) -> MonitorConfig {
        let mut cfg = MonitorConfig::default();
        cfg.sampler.history_capacity = capacity;
        cfg
    }

    fn growing_counters(n: usize, step: u64) -> Vec<Result<(u64, u64)>> {
        (0..n as u64).map(|i| Ok((i * step, i * step / 2))).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn windows_roll_with_the_ticks() {
        // Baseline + 4 ticks.
        let source =
            ScriptedSource::new(&[10.0, 20.0, 30.0, 40.0]).with_counters(growing_counters(5, 2048));
        let (sampler, mut rx) = Sampler::start(config(3), source).unwrap();

        let mut last = None;
        for _ in 0..4 {
            last = rx.recv().await;
        }
        let snap = last.unwrap();

        assert_eq!(snap.cpu_history.to_vec(), vec![20.0, 30.0, 40.0]);
        assert!(snap.cpu_history.is_full());
        assert_eq!(snap.sample.cpu_percent, 40.0);
        // 2048 bytes received per tick = 2 KB down, half that up.
        assert_eq!(snap.sample.net_down_kbps, 2.0);
        assert_eq!(snap.sample.net_up_kbps, 1.0);

        sampler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failing_metric_repeats_without_stopping_the_tick() {
        // memory_percent call 2 fails (call 1 is the first tick).
        let source = ScriptedSource::new(&[10.0, 20.0, 30.0])
            .with_counters(growing_counters(4, 1024))
            .failing_mem_on_call(2);
        let (sampler, mut rx) = Sampler::start(config(8), source).unwrap();

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        let third = rx.recv().await.unwrap();

        // The failing tick still published a complete sample; mem repeated.
        assert_eq!(second.sample.mem_percent, first.sample.mem_percent);
        assert_eq!(second.sample.cpu_percent, 20.0);
        assert_eq!(
            second.mem_history.to_vec(),
            vec![first.sample.mem_percent, first.sample.mem_percent]
        );
        // And the scheduler kept running.
        assert!(third.sample.mem_percent > second.sample.mem_percent);

        sampler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn counter_failure_skips_the_whole_tick() {
        let source = ScriptedSource::new(&[10.0, 20.0]).with_counters(vec![
            Ok((0, 0)),
            Err(MonitorError::transient(Metric::Network, "scripted failure")),
            Ok((1024, 512)),
        ]);
        let (sampler, mut rx) = Sampler::start(config(8), source).unwrap();

        // Tick 1 failed hard: nothing was published or pushed for it.
        let snap = rx.recv().await.unwrap();
        assert_eq!(snap.cpu_history.len(), 1);
        assert_eq!(snap.sample.cpu_percent, 10.0);
        assert_eq!(snap.sample.net_down_kbps, 1.0);

        sampler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn temperature_extrema_skip_unavailable_readings() {
        let source = ScriptedSource::new(&[1.0, 2.0, 3.0])
            .with_counters(growing_counters(4, 0))
            .with_temps(&[
                Temperature::Celsius(45.0),
                Temperature::Unavailable,
                Temperature::Celsius(41.5),
            ]);
        let (sampler, mut rx) = Sampler::start(config(8), source).unwrap();

        let mut last = None;
        for _ in 0..3 {
            last = rx.recv().await;
        }
        let snap = last.unwrap();

        assert_eq!(snap.temp_extrema.observed(), Some((45.0, 41.5)));
        assert_eq!(
            snap.temp_history.to_vec(),
            vec![
                Temperature::Celsius(45.0),
                Temperature::Unavailable,
                Temperature::Celsius(41.5),
            ]
        );

        sampler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_stream() {
        let source = ScriptedSource::new(&[5.0; 8]).with_counters(growing_counters(9, 0));
        let (sampler, mut rx) = Sampler::start(config(8), source).unwrap();

        assert!(rx.recv().await.is_some());
        sampler.stop();
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn unrunnable_settings_are_refused_up_front() {
        // These used to surface only as a panic inside the spawned task,
        // leaving the consumer with nothing but a closed stream.
        let mut zero_capacity = MonitorConfig::default();
        zero_capacity.sampler.history_capacity = 0;
        let source = ScriptedSource::new(&[1.0]).with_counters(growing_counters(2, 0));
        assert!(matches!(
            Sampler::start(zero_capacity, source),
            Err(MonitorError::Config(_))
        ));

        let mut zero_period = MonitorConfig::default();
        zero_period.sampler.tick_period_ms = 0;
        let source = ScriptedSource::new(&[1.0]).with_counters(growing_counters(2, 0));
        assert!(matches!(
            Sampler::start(zero_period, source),
            Err(MonitorError::Config(_))
        ));
    }

    #[tokio::test]
    async fn baseline_failure_is_fatal() {
        let source = ScriptedSource::new(&[]).with_counters(vec![Err(MonitorError::transient(
            Metric::Network,
            "no interfaces",
        ))]);
        match Sampler::start(config(8), source) {
            Err(MonitorError::Init(msg)) => assert!(msg.contains("baseline")),
            other => panic!("expected init failure, got {other:?}"),
        }
    }
}
