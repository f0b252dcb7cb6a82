//! Detects when the executable has written its output.
//!
//! The executable gives no completion signal of its own, so each job carries
//! an `OutputWatch` that is ticked on an interval. A tick compares the output
//! file's modification time against the one recorded at launch.

use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant, SystemTime},
};

/// Timings of the completion poll
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Delay between two ticks
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// How long after launch the watch gives up
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Delay between detecting the output and reading it, so a file that is
    /// still being flushed isn't read half-written
    #[serde(with = "humantime_serde")]
    pub settle: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            timeout: Duration::from_secs(30),
            settle: Duration::from_millis(300),
        }
    }
}

/// Reads the modification time of the output, `None` if there is no file
pub trait OutputProbe {
    fn modified(&self, path: &Path) -> Option<SystemTime>;
}

/// `OutputProbe` backed by the real filesystem
#[derive(Copy, Clone, Debug, Default)]
pub struct FsProbe;

impl OutputProbe for FsProbe {
    fn modified(&self, path: &Path) -> Option<SystemTime> {
        let meta = std::fs::metadata(path).ok()?;
        if !meta.is_file() {
            return None;
        }
        meta.modified().ok()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PollState {
    Waiting,
    Ready,
    TimedOut,
}

/// The result of a single tick
#[derive(Clone, Debug, PartialEq)]
pub enum Tick {
    /// Nothing yet, tick again after the duration
    Rearm(Duration),
    /// The output has been (re)written
    Ready(PathBuf),
    /// The output didn't show up in time; the executable may still be running
    TimedOut,
}

/// Poll state of one job
#[derive(Clone, Debug)]
pub struct OutputWatch {
    path: PathBuf,
    baseline: Option<SystemTime>,
    started: Instant,
    config: PollConfig,
    state: PollState,
}

impl OutputWatch {
    /// Records the current modification time of `path` as the baseline any
    /// new output must be newer than
    pub fn arm(path: PathBuf, config: PollConfig, probe: &dyn OutputProbe, now: Instant) -> Self {
        let baseline = probe.modified(&path);
        log::debug!(
            "watching {} (existing output: {})",
            path.display(),
            baseline.is_some()
        );

        Self {
            path,
            baseline,
            started: now,
            config,
            state: PollState::Waiting,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn baseline(&self) -> Option<SystemTime> {
        self.baseline
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }

    /// Whether the output on disk is newer than the baseline
    pub fn is_fresh(&self, probe: &dyn OutputProbe) -> bool {
        match (probe.modified(&self.path), self.baseline) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(current), Some(baseline)) => current > baseline,
        }
    }

    /// Advances the watch. Once `Ready` or `TimedOut` is reached the watch
    /// keeps returning it and never rearms.
    pub fn tick(&mut self, now: Instant, probe: &dyn OutputProbe) -> Tick {
        match self.state {
            PollState::Ready => return Tick::Ready(self.path.clone()),
            PollState::TimedOut => return Tick::TimedOut,
            PollState::Waiting => {}
        }

        let elapsed = self.elapsed(now);
        if elapsed > self.config.timeout {
            log::info!(
                "waited {:.1}s for {} to be generated, no output detected",
                elapsed.as_secs_f32(),
                self.path.display()
            );
            self.state = PollState::TimedOut;
            return Tick::TimedOut;
        }

        if self.is_fresh(probe) {
            self.state = PollState::Ready;
            return Tick::Ready(self.path.clone());
        }

        Tick::Rearm(self.config.interval)
    }

    /// Marks the watch as done without waiting for a tick, used when the
    /// process has exited and the output is known to be complete
    pub(crate) fn mark_ready(&mut self) {
        self.state = PollState::Ready;
    }
}
