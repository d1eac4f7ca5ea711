//! Wall-clock timing of pipeline stages.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::LOG_TARGET;

/// A stage of the resolution pipeline, in execution order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Deserialize,
    Serialize,
    EnumString,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    /// Source scanning and reference resolution.
    Scan,
    /// Graph construction.
    Build,
    /// Forced overrides and cycle detection.
    Cycle,
    /// Topological sequencing.
    Sort,
    /// Layer classification and violation reporting.
    Classify,
}

/// Elapsed time of one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTiming {
    stage: Stage,
    elapsed: Duration,
}

impl StageTiming {
    /// Creates a timing record.
    #[must_use]
    pub const fn new(stage: Stage, elapsed: Duration) -> Self {
        Self { stage, elapsed }
    }

    /// Returns the stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns the elapsed time.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns the elapsed time in whole milliseconds, saturating.
    #[must_use]
    pub fn millis(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Timings of the stages that ran, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageTimings {
    entries: Vec<StageTiming>,
}

impl StageTimings {
    /// Runs `work` as `stage`, recording how long it took.
    pub fn record<T>(&mut self, stage: Stage, work: impl FnOnce() -> T) -> T {
        debug!(target: LOG_TARGET, %stage, "stage started");
        let started = Instant::now();
        let output = work();
        let timing = StageTiming::new(stage, started.elapsed());
        debug!(target: LOG_TARGET, %stage, millis = timing.millis(), "stage finished");
        self.entries.push(timing);
        output
    }

    /// Returns the timing of `stage`, if it ran.
    #[must_use]
    pub fn get(&self, stage: Stage) -> Option<&StageTiming> {
        self.entries.iter().find(|timing| timing.stage == stage)
    }

    /// Iterates over the recorded timings.
    pub fn iter(&self) -> impl Iterator<Item = &StageTiming> {
        self.entries.iter()
    }

    /// Returns the total elapsed time.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.entries.iter().map(|timing| timing.elapsed).sum()
    }
}
