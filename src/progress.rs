//! Progress reporting for pipeline phases.
//!
//! Each phase gets an indicatif bar (known length) or spinner (unknown
//! length). In log-only mode the bars are hidden and periodic progress lines
//! go to stderr instead, which keeps output readable under `tail -f`.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Global flag for log-only mode (set from args in main)
pub static LOG_ONLY: AtomicBool = AtomicBool::new(false);

/// Rows between log lines when the total is unknown
const SPINNER_LOG_INTERVAL: u64 = 100_000;

pub fn set_log_only(value: bool) {
    LOG_ONLY.store(value, Ordering::Relaxed);
}

pub fn is_log_only() -> bool {
    LOG_ONLY.load(Ordering::Relaxed)
}

/// Format duration in human-readable format
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

/// One phase of the pipeline.
pub struct PhaseProgress {
    bar: ProgressBar,
    phase: String,
    total: Option<u64>,
    interval: u64,
}

impl PhaseProgress {
    /// Progress bar over `total` items.
    pub fn bar(phase: &str, total: u64) -> Self {
        let bar = ProgressBar::new(total);
        if is_log_only() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        } else {
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, ETA: {eta})")
                    .unwrap()
                    .progress_chars("=> "),
            );
        }
        bar.set_message(phase.to_string());
        Self {
            bar,
            phase: phase.to_string(),
            total: Some(total),
            interval: (total / 10).max(1),
        }
    }

    /// Spinner for a phase whose length is not known up front.
    pub fn spinner(phase: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if is_log_only() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        } else {
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{msg} {spinner} [{elapsed_precise}] {pos}")
                    .unwrap(),
            );
            bar.enable_steady_tick(Duration::from_millis(100));
        }
        bar.set_message(phase.to_string());
        Self {
            bar,
            phase: phase.to_string(),
            total: None,
            interval: SPINNER_LOG_INTERVAL,
        }
    }

    pub fn inc(&self) {
        self.bar.inc(1);
        if is_log_only() {
            self.log(self.bar.position());
        }
    }

    fn log(&self, current: u64) {
        match self.total {
            Some(total) if current % self.interval == 0 || current == total => {
                let pct = 100.0 * current as f64 / total.max(1) as f64;
                eprintln!("[{}] {}/{} ({:.1}%)", self.phase, current, total, pct);
            }
            None if current % self.interval == 0 => {
                eprintln!("[{}] {}", self.phase, current);
            }
            _ => {}
        }
    }

    pub fn finish(self, msg: String) {
        if is_log_only() {
            eprintln!("{} ({})", msg, format_duration(self.bar.elapsed()));
        }
        self.bar.finish_with_message(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }
}
