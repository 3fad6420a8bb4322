use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time;
use tracing::{error, info, warn};

/// Quiet window a burst of events must outlast before the reload fires.
/// Editors produce several write events per save; firing on the first
/// one can catch the file mid-write, so the notification goes out on the
/// trailing edge of the burst instead.
const DEBOUNCE: Duration = Duration::from_millis(500);

/// Watches the config file and fires once per (debounced) change, so a
/// long-running monitor picks up new settings without a restart.
///
/// Dropping the handle stops the watch.
pub struct ConfigWatcher {
    path: PathBuf,
    // Held so the OS watch stays registered for the handle's lifetime.
    _watcher: Option<RecommendedWatcher>,
}

impl ConfigWatcher {
    /// Start watching `path`. Returns the handle plus a receiver that
    /// yields `()` on every detected change.
    ///
    /// Watch setup failures are logged, not fatal: the monitor still runs,
    /// just without live reload.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<()>) {
        let path = path.as_ref().to_path_buf();
        let (raw_tx, raw_rx) = mpsc::channel::<notify::Result<Event>>(16);
        let (tx, rx) = mpsc::channel(1);

        let watcher = match try_watch(&path, raw_tx) {
            Ok(w) => {
                info!("Watching config file: {}", path.display());
                Some(w)
            }
            Err(e) => {
                error!("Config watch disabled for '{}': {e}", path.display());
                None
            }
        };

        tokio::spawn(debounce_loop(raw_rx, tx));

        (
            Self {
                path,
                _watcher: watcher,
            },
            rx,
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn try_watch(
    path: &Path,
    raw_tx: mpsc::Sender<notify::Result<Event>>,
) -> notify::Result<RecommendedWatcher> {
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = raw_tx.blocking_send(res);
        },
        notify::Config::default().with_poll_interval(Duration::from_secs(2)),
    )?;
    watcher.watch(path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

async fn debounce_loop(mut raw_rx: mpsc::Receiver<notify::Result<Event>>, tx: mpsc::Sender<()>) {
    while let Some(event) = raw_rx.recv().await {
        match event {
            Ok(e) if matches!(e.kind, EventKind::Modify(_) | EventKind::Create(_)) => {}
            Ok(_) => continue,
            Err(e) => {
                warn!("Watcher error: {e}");
                continue;
            }
        }

        // A change arrived. Absorb the rest of the burst and notify only
        // once the file has gone quiet, so the write that completes the
        // save is never swallowed.
        let mut channel_open = true;
        loop {
            match time::timeout(DEBOUNCE, raw_rx.recv()).await {
                Ok(Some(Ok(_))) => {}
                Ok(Some(Err(e))) => warn!("Watcher error: {e}"),
                Ok(None) => {
                    channel_open = false;
                    break;
                }
                Err(_) => break, // quiet
            }
        }

        if tx.send(()).await.is_err() || !channel_open {
            break;
        }
    }
}
