//! Metrics for benchmark harnesses: process resource sampling, recall
//! against exact groundtruth, and query throughput.
//!
//! # Resource Monitoring
//!
//! [`ResourceMonitor`] samples `/proc/self/status` from a background thread
//! while a build or query phase runs, recording the peak live thread count.
//! Peak resident memory comes from the kernel's own high-water mark
//! (`VmHWM`), read once at the end:
//!
//! ```ignore
//! let monitor = ResourceMonitor::start();
//! let index = builder.build(&vectors, &attributes)?;
//! let report = monitor.finish();
//! println!("Peak thread count: {}", report.peak_threads);
//! ```

use crate::constants::monitor::SAMPLE_INTERVAL_MS;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Peak resource usage observed over a monitored interval.
#[derive(Clone, Debug, Default)]
pub struct ResourceReport {
    /// Highest number of live threads sampled in the process.
    pub peak_threads: usize,
    /// Peak resident set size in kilobytes (`VmHWM`), process lifetime.
    pub peak_rss_kb: usize,
}

/// Background sampler of process-wide resource usage.
///
/// Sampling stops when [`finish`](Self::finish) is called or the monitor is
/// dropped.
pub struct ResourceMonitor {
    stop: Arc<AtomicBool>,
    peak_threads: Arc<AtomicUsize>,
    handle: Option<JoinHandle<()>>,
}

impl ResourceMonitor {
    /// Spawn the sampling thread and begin recording.
    pub fn start() -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let peak_threads = Arc::new(AtomicUsize::new(0));

        let stop_flag = Arc::clone(&stop);
        let peak = Arc::clone(&peak_threads);
        let handle = std::thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                if let Some(threads) = read_status_field("Threads:") {
                    peak.fetch_max(threads, Ordering::Relaxed);
                }
                std::thread::sleep(Duration::from_millis(SAMPLE_INTERVAL_MS));
            }
        });

        Self {
            stop,
            peak_threads,
            handle: Some(handle),
        }
    }

    /// Stop sampling and return the observed peaks.
    pub fn finish(mut self) -> ResourceReport {
        self.halt();
        ResourceReport {
            peak_threads: self.peak_threads.load(Ordering::Relaxed),
            peak_rss_kb: read_status_field("VmHWM:").unwrap_or(0),
        }
    }

    fn halt(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ResourceMonitor {
    fn drop(&mut self) {
        self.halt();
    }
}

/// Read a numeric field from `/proc/self/status`. Returns None on platforms
/// without procfs or when the field is missing.
fn read_status_field(field: &str) -> Option<usize> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    status
        .lines()
        .find(|line| line.starts_with(field))
        .and_then(|line| line[field.len()..].split_whitespace().next())
        .and_then(|value| value.parse().ok())
}

/// Recall@k for a single query: the fraction of the k exact nearest
/// neighbors that appear among the predicted ids.
pub fn recall_at_k(predicted: &[u64], groundtruth: &[u64], k: usize) -> f32 {
    let truth = &groundtruth[..groundtruth.len().min(k)];
    if truth.is_empty() {
        return 1.0;
    }
    let matched = predicted
        .iter()
        .take(k)
        .filter(|id| truth.contains(id))
        .count();
    matched as f32 / truth.len() as f32
}

/// Aggregate recall over a query batch: total matched ids divided by total
/// groundtruth ids, with each query's groundtruth truncated to k.
pub fn recall(results: &[Vec<u64>], groundtruth: &[Vec<u64>], k: usize) -> f64 {
    let mut matched = 0usize;
    let mut total = 0usize;
    for (predicted, gt) in results.iter().zip(groundtruth) {
        let truth = &gt[..gt.len().min(k)];
        total += truth.len();
        matched += predicted
            .iter()
            .take(k)
            .filter(|id| truth.contains(id))
            .count();
    }
    if total == 0 {
        return 1.0;
    }
    matched as f64 / total as f64
}

/// Queries per second for `n` queries executed in `elapsed`.
pub fn qps(n: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        return 0.0;
    }
    n as f64 / secs
}
