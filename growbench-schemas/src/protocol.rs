use crate::experiment::ExperimentDraft;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An optional action attached to a protocol step: completing the step can
/// spawn a bench timer or draft a new experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepAction {
    Timer {
        duration_minutes: Option<f64>,
        timer_label: Option<String>,
    },
    Experiment {
        experiment_config: ExperimentDraft,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProtocolStep {
    pub id: String,
    pub text: String,
    pub is_completed: bool,
    #[serde(default)]
    pub action: Option<StepAction>,
    /// Id of the timer spawned by this step's action, recorded so progress
    /// can be displayed against the step.
    #[serde(default)]
    pub active_timer_id: Option<String>,
}

impl ProtocolStep {
    pub fn new(text: impl Into<String>, action: Option<StepAction>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            is_completed: false,
            action,
            active_timer_id: None,
        }
    }
}

/// An ordered checklist of bench steps, some of which carry actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Protocol {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub steps: Vec<ProtocolStep>,
}

impl Protocol {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
        steps: Vec<ProtocolStep>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            tags,
            created_at: now,
            steps,
        }
    }

    pub fn completed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.is_completed).count()
    }
}
