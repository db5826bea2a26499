//! Folder watcher: triggers batches on new input files.
//!
//! A poller task scans the input directory and feeds new-file events into a
//! bounded channel; a consumer task debounces each event and starts a batch
//! only if none is in flight. Triggers arriving while a batch runs are
//! dropped, not queued, so bursts of file creation collapse into the next
//! trigger instead of stacking batches.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::models::config::WatchConfig;
use crate::models::options::ProcessingOptions;
use crate::pipeline::BatchRunner;

/// Watcher timings and queue size.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Interval between input directory scans.
    pub poll_interval: Duration,

    /// Quiescence delay after an event, so the file's writer can finish.
    pub debounce: Duration,

    /// Capacity of the event channel.
    pub queue_capacity: usize,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self::from(&WatchConfig::default())
    }
}

impl From<&WatchConfig> for WatcherConfig {
    fn from(config: &WatchConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            debounce: Duration::from_millis(config.debounce_ms),
            queue_capacity: config.queue_capacity.max(1),
        }
    }
}

/// Watches the input directory and runs at most one batch at a time.
pub struct FolderWatcher {
    runner: Arc<dyn BatchRunner>,
    options: ProcessingOptions,
    config: WatcherConfig,
    enabled: Arc<AtomicBool>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl FolderWatcher {
    pub fn new(runner: Arc<dyn BatchRunner>, options: ProcessingOptions, config: WatcherConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            runner,
            options,
            config,
            enabled: Arc::new(AtomicBool::new(false)),
            shutdown,
            tasks: Vec::new(),
        }
    }

    /// Begin raising events. Idempotent; a second call only re-enables
    /// event-raising after a `stop`.
    pub fn start(&mut self) {
        self.enabled.store(true, Ordering::SeqCst);
        if !self.tasks.is_empty() {
            return;
        }

        info!("watching folder: {}", self.options.input_dir.display());

        let (tx, rx) = mpsc::channel::<PathBuf>(self.config.queue_capacity);
        self.tasks.push(tokio::spawn(poll_loop(
            self.options.input_dir.clone(),
            self.config.poll_interval,
            Arc::clone(&self.enabled),
            self.shutdown.subscribe(),
            tx,
        )));
        self.tasks.push(tokio::spawn(consume_loop(
            Arc::clone(&self.runner),
            self.options.clone(),
            self.config.debounce,
            self.shutdown.subscribe(),
            rx,
        )));
    }

    /// Stop raising events. Idempotent; an in-flight batch runs to
    /// completion.
    pub fn stop(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        info!("watcher stopped");
    }
}

impl Drop for FolderWatcher {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

/// Scans the input directory and emits paths that were not present in the
/// previous scan. Files that disappear (because a batch moved them out) are
/// forgotten, so a re-created name triggers again.
async fn poll_loop(
    input_dir: PathBuf,
    poll_interval: Duration,
    enabled: Arc<AtomicBool>,
    mut shutdown: watch::Receiver<bool>,
    tx: mpsc::Sender<PathBuf>,
) {
    let mut seen: HashSet<PathBuf> = HashSet::new();

    loop {
        if enabled.load(Ordering::SeqCst) {
            let current = scan_dir(&input_dir);
            for path in current.difference(&seen) {
                debug!("new file detected: {}", path.display());
                // A full queue means triggers are already pending; dropping
                // this one loses nothing, the next batch lists the directory.
                let _ = tx.try_send(path.clone());
            }
            seen = current;
        }

        tokio::select! {
            _ = tokio::time::sleep(poll_interval) => {}
            _ = shutdown.changed() => return,
        }
    }
}

/// Debounces each trigger, then starts a batch unless one is in flight.
async fn consume_loop(
    runner: Arc<dyn BatchRunner>,
    options: ProcessingOptions,
    debounce: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut rx: mpsc::Receiver<PathBuf>,
) {
    let inflight = Arc::new(Semaphore::new(1));

    loop {
        let path = tokio::select! {
            received = rx.recv() => match received {
                Some(path) => path,
                None => return,
            },
            _ = shutdown.changed() => return,
        };

        // Let the file's writer finish before listing the directory.
        tokio::time::sleep(debounce).await;

        match Arc::clone(&inflight).try_acquire_owned() {
            Ok(permit) => {
                let runner = Arc::clone(&runner);
                let options = options.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    match runner.run_batch(&options).await {
                        Ok(results) => {
                            let ok = results.iter().filter(|r| r.is_success()).count();
                            info!("batch result: {ok} succeeded, {} failed", results.len() - ok);
                        }
                        Err(e) => error!("batch failed: {e}"),
                    }
                });
            }
            Err(_) => {
                debug!("skipping {}: another batch is processing", path.display());
            }
        }
    }
}

fn scan_dir(dir: &PathBuf) -> HashSet<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return HashSet::new();
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && ProcessingOptions::is_supported_image(p))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;

    use super::*;
    use crate::error::Result;
    use crate::models::receipt::ProcessingResult;

    /// Batch runner double that counts invocations and holds the batch open
    /// long enough for overlapping triggers to arrive.
    struct SlowRunner {
        invocations: AtomicUsize,
        batch_duration: Duration,
    }

    #[async_trait]
    impl BatchRunner for SlowRunner {
        async fn run_batch(&self, _options: &ProcessingOptions) -> Result<Vec<ProcessingResult>> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.batch_duration).await;
            Ok(Vec::new())
        }
    }

    /// Batch runner double that records how many batches were ever in
    /// flight at the same time.
    struct GaugeRunner {
        active: AtomicUsize,
        max_active: AtomicUsize,
        invocations: AtomicUsize,
        batch_duration: Duration,
    }

    impl GaugeRunner {
        fn new(batch_duration: Duration) -> Self {
            Self {
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
                invocations: AtomicUsize::new(0),
                batch_duration,
            }
        }
    }

    #[async_trait]
    impl BatchRunner for GaugeRunner {
        async fn run_batch(&self, _options: &ProcessingOptions) -> Result<Vec<ProcessingResult>> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);
            self.invocations.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.batch_duration).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    fn test_options(root: &tempfile::TempDir) -> ProcessingOptions {
        ProcessingOptions {
            input_dir: root.path().join("entrada"),
            output_dir: root.path().join("procesados"),
            backup_dir: root.path().join("backup"),
            log_file: root.path().join("registro.txt"),
            dictionary_path: root.path().join("proveedores.json"),
            dry_run: false,
            verbose: false,
        }
    }

    fn fast_config() -> WatcherConfig {
        WatcherConfig {
            poll_interval: Duration::from_millis(10),
            debounce: Duration::from_millis(5),
            queue_capacity: 16,
        }
    }

    #[tokio::test]
    async fn test_burst_of_files_collapses_to_one_batch() {
        let root = tempfile::tempdir().unwrap();
        let options = test_options(&root);
        std::fs::create_dir_all(&options.input_dir).unwrap();

        // All three files exist before the first scan, so their triggers
        // arrive back to back while the first batch is still running.
        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            std::fs::write(options.input_dir.join(name), b"x").unwrap();
        }

        let runner = Arc::new(SlowRunner {
            invocations: AtomicUsize::new(0),
            batch_duration: Duration::from_millis(200),
        });
        let mut watcher = FolderWatcher::new(runner.clone(), options, fast_config());
        watcher.start();

        tokio::time::sleep(Duration::from_millis(500)).await;
        watcher.stop();

        let count = runner.invocations.load(Ordering::SeqCst);
        assert!(count >= 1, "watcher never triggered a batch");
        assert!(count <= 2, "expected overlapping triggers to be dropped, got {count} batches");
    }

    #[tokio::test]
    async fn test_startup_batch_never_overlaps_watcher_batches() {
        let root = tempfile::tempdir().unwrap();
        let options = test_options(&root);
        std::fs::create_dir_all(&options.input_dir).unwrap();

        // A file is already pending when the command starts. The poller's
        // first scan raises a trigger for it, so the startup batch must run
        // to completion before the watcher is started.
        std::fs::write(options.input_dir.join("pending.jpg"), b"x").unwrap();

        let runner = Arc::new(GaugeRunner::new(Duration::from_millis(100)));
        runner.run_batch(&test_options(&root)).await.unwrap();

        let mut watcher = FolderWatcher::new(runner.clone(), options, fast_config());
        watcher.start();
        tokio::time::sleep(Duration::from_millis(300)).await;
        watcher.stop();

        // The pending file (never moved by the double) triggered at least
        // one watcher batch after the startup one
        assert!(runner.invocations.load(Ordering::SeqCst) >= 2);
        assert_eq!(
            runner.max_active.load(Ordering::SeqCst),
            1,
            "two batches ran concurrently"
        );
    }

    #[tokio::test]
    async fn test_stop_disables_triggering() {
        let root = tempfile::tempdir().unwrap();
        let options = test_options(&root);
        std::fs::create_dir_all(&options.input_dir).unwrap();

        let runner = Arc::new(SlowRunner {
            invocations: AtomicUsize::new(0),
            batch_duration: Duration::from_millis(1),
        });
        let mut watcher = FolderWatcher::new(runner.clone(), options.clone(), fast_config());
        watcher.start();
        watcher.stop();
        tokio::time::sleep(Duration::from_millis(50)).await;

        std::fs::write(options.input_dir.join("late.jpg"), b"x").unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(runner.invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let options = test_options(&root);
        std::fs::create_dir_all(&options.input_dir).unwrap();

        let runner = Arc::new(SlowRunner {
            invocations: AtomicUsize::new(0),
            batch_duration: Duration::from_millis(1),
        });
        let mut watcher = FolderWatcher::new(runner.clone(), options.clone(), fast_config());
        watcher.start();
        watcher.start();

        std::fs::write(options.input_dir.join("one.jpg"), b"x").unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;

        // A duplicated poller would have fired twice for the same file
        assert_eq!(runner.invocations.load(Ordering::SeqCst), 1);
    }
}
