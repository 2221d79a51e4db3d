use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    StartTimer {
        timer_id: String,
    },
    PauseTimer {
        timer_id: String,
    },
    ScheduleTimer {
        timer_id: String,
        start_time: DateTime<Utc>,
    },
    UnscheduleTimer {
        timer_id: String,
    },
    StartTracking {
        experiment_id: String,
    },
    ResetTracking {
        experiment_id: String,
    },
    ToggleStep {
        protocol_id: String,
        step_id: String,
    },
    RunStepAction {
        protocol_id: String,
        step_id: String,
    },
}
