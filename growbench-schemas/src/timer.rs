use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

impl Default for TimerStatus {
    fn default() -> Self {
        TimerStatus::Idle
    }
}

/// A free-standing bench timer. Invariants: `start_time` is non-null iff the
/// timer is running (the start may lie in the future for a scheduled timer),
/// and `paused_time_remaining` is non-null iff the timer is paused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StandaloneTimer {
    pub id: String,
    pub label: String,
    pub duration_minutes: f64,
    pub start_time: Option<DateTime<Utc>>,
    /// Minutes left at the moment of pausing.
    pub paused_time_remaining: Option<f64>,
    pub status: TimerStatus,
    pub created_at: DateTime<Utc>,
}

impl StandaloneTimer {
    pub fn new(
        label: impl Into<String>,
        duration_minutes: f64,
        auto_start: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            label: label.into(),
            duration_minutes,
            start_time: auto_start.then_some(now),
            paused_time_remaining: None,
            status: if auto_start {
                TimerStatus::Running
            } else {
                TimerStatus::Idle
            },
            created_at: now,
        }
    }

    /// End of the running window, when one exists.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
            .map(|start| start + minutes_to_duration(self.duration_minutes))
    }

    /// Level-triggered completion check: true once the clock has crossed the
    /// end of a running window. Safe to re-evaluate after missed ticks.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == TimerStatus::Running
            && self.end_time().map_or(false, |end| now >= end)
    }
}

/// Converts fractional minutes to a chrono duration at millisecond precision.
pub fn minutes_to_duration(minutes: f64) -> Duration {
    Duration::milliseconds((minutes * 60_000.0).round() as i64)
}

/// The minimal shape needed to create a timer, as produced by drafts and
/// protocol steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimerSpec {
    pub label: String,
    pub duration_minutes: f64,
}
