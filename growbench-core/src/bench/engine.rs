use super::state::{BenchEvent, BenchState};
use crate::calculator::calculate_results;
use crate::error::GrowbenchError;
use crate::logger::TimeSeriesLogger;
use crate::tracking::calculate_tracking;
use chrono::{DateTime, Utc};
use growbench_schemas::{
    command::Command,
    draft::AssistantDraft,
    experiment::{Experiment, ExperimentDraft},
    protocol::{Protocol, ProtocolStep, StepAction},
    timer::{minutes_to_duration, StandaloneTimer, TimerStatus},
};

/// Fallbacks for protocol-step timer actions that omit a label or duration.
const DEFAULT_STEP_TIMER_LABEL: &str = "Protocol Timer";
const DEFAULT_STEP_TIMER_MINUTES: f64 = 10.0;

/// The mutable record store plus every state transition the planner supports.
/// All derived values (recipes, tracking, chart series, timeline layout) are
/// recomputed from this state and an explicit "now"; the bench itself never
/// reads an ambient clock.
pub struct Workbench {
    pub(super) state: BenchState,
    pub(super) logger: Option<TimeSeriesLogger>,
}

impl Workbench {
    /// Advances the bench clock by one tick. Running timers whose window the
    /// clock has crossed reset to idle; the check is level-triggered, so a
    /// missed tick resolves on the next call with the same outcome. Tracked
    /// experiments are appended to the time-series log when one is attached.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<(), GrowbenchError> {
        self.state.events.clear();
        self.state.tick += 1;

        for timer in &mut self.state.timers {
            if timer.is_due(now) {
                timer.status = TimerStatus::Idle;
                timer.start_time = None;
                timer.paused_time_remaining = None;
                self.state.events.push(BenchEvent::TimerCompleted {
                    id: timer.id.clone(),
                });
            }
        }

        if let Some(logger) = &mut self.logger {
            for exp in &self.state.experiments {
                if exp.tracking_start_time.is_none() {
                    continue;
                }
                let results = calculate_results(exp, exp.tracking_start_time, now);
                if let Some(status) =
                    calculate_tracking(exp, exp.tracking_start_time, now, &results)
                {
                    logger.log_status(self.state.tick, now, exp, &results, &status)?;
                }
            }
        }

        Ok(())
    }

    pub fn execute_command(
        &mut self,
        command: Command,
        now: DateTime<Utc>,
    ) -> Result<(), GrowbenchError> {
        match command {
            Command::StartTimer { timer_id } => {
                let timer = self.timer_mut(&timer_id)?;
                if timer.status == TimerStatus::Running {
                    return Ok(());
                }
                // Resuming backdates the start so elapsed time is continuous
                // across pause/resume; a fresh start has the full duration
                // remaining and lands exactly on "now".
                let remaining = match timer.status {
                    TimerStatus::Paused => timer
                        .paused_time_remaining
                        .unwrap_or(timer.duration_minutes),
                    _ => timer.duration_minutes,
                };
                let effective_start =
                    now - minutes_to_duration(timer.duration_minutes - remaining);
                timer.status = TimerStatus::Running;
                timer.start_time = Some(effective_start);
                timer.paused_time_remaining = None;
            }
            Command::PauseTimer { timer_id } => {
                let timer = self.timer_mut(&timer_id)?;
                if timer.status != TimerStatus::Running {
                    return Ok(());
                }
                let start = timer.start_time.unwrap_or(now);
                let elapsed = (now - start).num_milliseconds() as f64 / 60_000.0;
                timer.paused_time_remaining =
                    Some((timer.duration_minutes - elapsed).max(0.0));
                timer.status = TimerStatus::Paused;
                timer.start_time = None;
            }
            Command::ScheduleTimer {
                timer_id,
                start_time,
            } => {
                // A drop onto the timeline: the timer runs from the snapped
                // time, which may lie in the future.
                let timer = self.timer_mut(&timer_id)?;
                timer.status = TimerStatus::Running;
                timer.start_time = Some(start_time);
                timer.paused_time_remaining = None;
            }
            Command::UnscheduleTimer { timer_id } => {
                // The sole removal-from-timeline path; the record survives.
                let timer = self.timer_mut(&timer_id)?;
                timer.status = TimerStatus::Idle;
                timer.start_time = None;
                timer.paused_time_remaining = None;
            }
            Command::StartTracking { experiment_id } => {
                self.experiment_mut(&experiment_id)?.tracking_start_time = Some(now);
            }
            Command::ResetTracking { experiment_id } => {
                self.experiment_mut(&experiment_id)?.tracking_start_time = None;
            }
            Command::ToggleStep {
                protocol_id,
                step_id,
            } => {
                let step = self.step_mut(&protocol_id, &step_id)?;
                step.is_completed = !step.is_completed;
            }
            Command::RunStepAction {
                protocol_id,
                step_id,
            } => {
                let action = self
                    .step_mut(&protocol_id, &step_id)?
                    .action
                    .clone()
                    .ok_or_else(|| GrowbenchError::StepHasNoAction(step_id.clone()))?;

                match action {
                    StepAction::Timer {
                        duration_minutes,
                        timer_label,
                    } => {
                        let label = timer_label
                            .unwrap_or_else(|| DEFAULT_STEP_TIMER_LABEL.to_string());
                        let duration =
                            duration_minutes.unwrap_or(DEFAULT_STEP_TIMER_MINUTES);
                        let id = self.add_timer(label, duration, true, now);
                        self.step_mut(&protocol_id, &step_id)?.active_timer_id =
                            Some(id.clone());
                        self.state.events.push(BenchEvent::TimerSpawned {
                            id,
                            source_step: step_id,
                        });
                    }
                    StepAction::Experiment { experiment_config } => {
                        let id = self.add_experiment(Some(&experiment_config), now);
                        self.state
                            .events
                            .push(BenchEvent::ExperimentSpawned { id });
                    }
                }
            }
        }
        Ok(())
    }

    /// Creates an experiment with bench defaults, applies any overrides, and
    /// returns the new id so a collaborator can link back to it.
    pub fn add_experiment(
        &mut self,
        overrides: Option<&ExperimentDraft>,
        now: DateTime<Utc>,
    ) -> String {
        let name = format!("Exp {}", self.state.experiments.len() + 1);
        let mut experiment = Experiment::with_defaults(name, now);
        if let Some(draft) = overrides {
            experiment.apply(draft);
        }
        let id = experiment.id.clone();
        self.state.experiments.push(experiment);
        id
    }

    pub fn add_timer(
        &mut self,
        label: impl Into<String>,
        duration_minutes: f64,
        auto_start: bool,
        now: DateTime<Utc>,
    ) -> String {
        let timer = StandaloneTimer::new(label, duration_minutes, auto_start, now);
        let id = timer.id.clone();
        self.state.timers.push(timer);
        id
    }

    pub fn add_protocol(&mut self, protocol: Protocol) -> String {
        let id = protocol.id.clone();
        self.state.protocols.push(protocol);
        id
    }

    /// Accepts an assistant-produced draft as-is and returns the created id.
    pub fn apply_draft(&mut self, draft: AssistantDraft, now: DateTime<Utc>) -> String {
        match draft {
            AssistantDraft::Experiment { data } => self.add_experiment(Some(&data), now),
            AssistantDraft::Timer { data } => {
                self.add_timer(data.label, data.duration_minutes, false, now)
            }
            AssistantDraft::Protocol { data } => self.add_protocol(data),
        }
    }

    /// Field-by-field partial update of an experiment's inputs.
    pub fn update_experiment(
        &mut self,
        experiment_id: &str,
        updates: &ExperimentDraft,
    ) -> Result<(), GrowbenchError> {
        self.experiment_mut(experiment_id)?.apply(updates);
        Ok(())
    }

    pub fn remove_timer(&mut self, timer_id: &str) -> Result<(), GrowbenchError> {
        let len = self.state.timers.len();
        self.state.timers.retain(|t| t.id != timer_id);
        if self.state.timers.len() == len {
            return Err(GrowbenchError::TimerNotFound(timer_id.to_string()));
        }
        Ok(())
    }

    pub fn remove_protocol(&mut self, protocol_id: &str) -> Result<(), GrowbenchError> {
        let len = self.state.protocols.len();
        self.state.protocols.retain(|p| p.id != protocol_id);
        if self.state.protocols.len() == len {
            return Err(GrowbenchError::ProtocolNotFound(protocol_id.to_string()));
        }
        Ok(())
    }

    pub fn get_tick(&self) -> u64 {
        self.state.tick
    }

    pub fn get_events(&self) -> &[BenchEvent] {
        &self.state.events
    }

    pub fn get_experiments(&self) -> &[Experiment] {
        &self.state.experiments
    }

    pub fn get_timers(&self) -> &[StandaloneTimer] {
        &self.state.timers
    }

    pub fn get_protocols(&self) -> &[Protocol] {
        &self.state.protocols
    }

    pub fn experiment(&self, experiment_id: &str) -> Option<&Experiment> {
        self.state
            .experiments
            .iter()
            .find(|e| e.id == experiment_id)
    }

    pub fn timer(&self, timer_id: &str) -> Option<&StandaloneTimer> {
        self.state.timers.iter().find(|t| t.id == timer_id)
    }

    pub fn running_experiments(&self) -> impl Iterator<Item = &Experiment> {
        self.state
            .experiments
            .iter()
            .filter(|e| e.tracking_start_time.is_some())
    }

    /// Timers shown anywhere in the UI: running on the timeline, paused in
    /// the unscheduled list.
    pub fn active_timers(&self) -> impl Iterator<Item = &StandaloneTimer> {
        self.state.timers.iter().filter(|t| {
            matches!(t.status, TimerStatus::Running | TimerStatus::Paused)
        })
    }

    /// Timers living in the unscheduled list rather than on the timeline.
    pub fn unscheduled_timers(&self) -> impl Iterator<Item = &StandaloneTimer> {
        self.state.timers.iter().filter(|t| {
            matches!(t.status, TimerStatus::Idle | TimerStatus::Paused)
        })
    }

    fn experiment_mut(
        &mut self,
        experiment_id: &str,
    ) -> Result<&mut Experiment, GrowbenchError> {
        self.state
            .experiments
            .iter_mut()
            .find(|e| e.id == experiment_id)
            .ok_or_else(|| GrowbenchError::ExperimentNotFound(experiment_id.to_string()))
    }

    fn timer_mut(&mut self, timer_id: &str) -> Result<&mut StandaloneTimer, GrowbenchError> {
        self.state
            .timers
            .iter_mut()
            .find(|t| t.id == timer_id)
            .ok_or_else(|| GrowbenchError::TimerNotFound(timer_id.to_string()))
    }

    fn step_mut(
        &mut self,
        protocol_id: &str,
        step_id: &str,
    ) -> Result<&mut ProtocolStep, GrowbenchError> {
        let protocol = self
            .state
            .protocols
            .iter_mut()
            .find(|p| p.id == protocol_id)
            .ok_or_else(|| GrowbenchError::ProtocolNotFound(protocol_id.to_string()))?;
        protocol
            .steps
            .iter_mut()
            .find(|s| s.id == step_id)
            .ok_or_else(|| {
                GrowbenchError::StepNotFound(protocol_id.to_string(), step_id.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::builder::WorkbenchBuilder;
    use chrono::{Duration, TimeZone};
    use growbench_schemas::timer::TimerSpec;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
    }

    fn empty_bench() -> Workbench {
        WorkbenchBuilder::new().build().unwrap()
    }

    #[test]
    fn start_pause_resume_keeps_elapsed_time_continuous() {
        let mut bench = empty_bench();
        let now = fixed_now();
        let id = bench.add_timer("Blocking", 60.0, false, now);

        bench
            .execute_command(Command::StartTimer { timer_id: id.clone() }, now)
            .unwrap();
        assert_eq!(bench.timer(&id).unwrap().start_time, Some(now));

        // Pause 12 minutes in.
        let pause_at = now + Duration::minutes(12);
        bench
            .execute_command(Command::PauseTimer { timer_id: id.clone() }, pause_at)
            .unwrap();
        let timer = bench.timer(&id).unwrap();
        assert_eq!(timer.status, TimerStatus::Paused);
        assert!(timer.start_time.is_none());
        assert!((timer.paused_time_remaining.unwrap() - 48.0).abs() < 1e-9);

        // Resume 30 minutes later; elapsed accounting picks up at 12 again.
        let resume_at = now + Duration::minutes(42);
        bench
            .execute_command(Command::StartTimer { timer_id: id.clone() }, resume_at)
            .unwrap();
        let timer = bench.timer(&id).unwrap();
        assert_eq!(timer.status, TimerStatus::Running);
        assert_eq!(timer.paused_time_remaining, None);
        let elapsed = (resume_at - timer.start_time.unwrap()).num_milliseconds() as f64
            / 60_000.0;
        assert!((elapsed - 12.0).abs() < 1e-9, "no time jump across pause");
    }

    #[test]
    fn pause_on_non_running_timer_is_a_no_op() {
        let mut bench = empty_bench();
        let now = fixed_now();
        let id = bench.add_timer("Idle", 10.0, false, now);
        bench
            .execute_command(Command::PauseTimer { timer_id: id.clone() }, now)
            .unwrap();
        assert_eq!(bench.timer(&id).unwrap().status, TimerStatus::Idle);
    }

    #[test]
    fn schedule_ahead_and_unschedule() {
        let mut bench = empty_bench();
        let now = fixed_now();
        let id = bench.add_timer("Elution", 30.0, false, now);
        let slot = now + Duration::minutes(90);

        bench
            .execute_command(
                Command::ScheduleTimer {
                    timer_id: id.clone(),
                    start_time: slot,
                },
                now,
            )
            .unwrap();
        let timer = bench.timer(&id).unwrap();
        assert_eq!(timer.status, TimerStatus::Running);
        assert_eq!(timer.start_time, Some(slot));

        bench
            .execute_command(Command::UnscheduleTimer { timer_id: id.clone() }, now)
            .unwrap();
        let timer = bench.timer(&id).unwrap();
        assert_eq!(timer.status, TimerStatus::Idle);
        assert_eq!(timer.start_time, None);
        assert_eq!(timer.paused_time_remaining, None);
        assert!(bench.timer(&id).is_some(), "unschedule never deletes");
    }

    #[test]
    fn scheduling_a_paused_timer_clears_the_pause() {
        let mut bench = empty_bench();
        let now = fixed_now();
        let id = bench.add_timer("Transfer", 60.0, false, now);
        bench
            .execute_command(Command::StartTimer { timer_id: id.clone() }, now)
            .unwrap();
        bench
            .execute_command(
                Command::PauseTimer { timer_id: id.clone() },
                now + Duration::minutes(5),
            )
            .unwrap();
        bench
            .execute_command(
                Command::ScheduleTimer {
                    timer_id: id.clone(),
                    start_time: now + Duration::minutes(120),
                },
                now + Duration::minutes(6),
            )
            .unwrap();
        assert_eq!(bench.timer(&id).unwrap().paused_time_remaining, None);
    }

    #[test]
    fn tick_auto_resets_due_timers_idempotently() {
        let mut bench = empty_bench();
        let now = fixed_now();
        let id = bench.add_timer("Heat Shock", 0.75, true, now);

        bench.tick(now + Duration::seconds(30)).unwrap();
        assert_eq!(bench.timer(&id).unwrap().status, TimerStatus::Running);
        assert!(bench.get_events().is_empty());

        // Simulate a missed tick: first evaluation after the window closed.
        let late = now + Duration::minutes(10);
        bench.tick(late).unwrap();
        let timer = bench.timer(&id).unwrap();
        assert_eq!(timer.status, TimerStatus::Idle);
        assert_eq!(timer.start_time, None);
        assert_eq!(
            bench.get_events(),
            &[BenchEvent::TimerCompleted { id: id.clone() }]
        );

        // Re-evaluating resolves cleanly with no duplicate event.
        bench.tick(late + Duration::seconds(1)).unwrap();
        assert!(bench.get_events().is_empty());
        assert_eq!(bench.get_tick(), 3);
    }

    #[test]
    fn tracking_commands_set_and_clear_the_baseline() {
        let mut bench = empty_bench();
        let now = fixed_now();
        let id = bench.add_experiment(None, now);

        bench
            .execute_command(Command::StartTracking { experiment_id: id.clone() }, now)
            .unwrap();
        assert_eq!(
            bench.experiment(&id).unwrap().tracking_start_time,
            Some(now)
        );
        assert_eq!(bench.running_experiments().count(), 1);

        bench
            .execute_command(Command::ResetTracking { experiment_id: id.clone() }, now)
            .unwrap();
        assert_eq!(bench.experiment(&id).unwrap().tracking_start_time, None);
    }

    #[test]
    fn step_timer_action_spawns_and_links_back() {
        let mut bench = empty_bench();
        let now = fixed_now();
        let step = ProtocolStep::new(
            "Incubate on ice for 30 minutes.",
            Some(StepAction::Timer {
                duration_minutes: Some(30.0),
                timer_label: Some("Ice Incubation".to_string()),
            }),
        );
        let step_id = step.id.clone();
        let protocol_id = bench.add_protocol(Protocol::new(
            "Heat Shock Transformation",
            "Chemically competent E. coli.",
            vec!["Cloning".to_string()],
            vec![step],
            now,
        ));

        bench
            .execute_command(
                Command::RunStepAction {
                    protocol_id: protocol_id.clone(),
                    step_id: step_id.clone(),
                },
                now,
            )
            .unwrap();

        let linked = bench.get_protocols()[0].steps[0]
            .active_timer_id
            .clone()
            .expect("step must record the spawned timer id");
        let timer = bench.timer(&linked).unwrap();
        assert_eq!(timer.label, "Ice Incubation");
        assert_eq!(timer.duration_minutes, 30.0);
        assert_eq!(timer.status, TimerStatus::Running, "step timers auto-start");
        assert!(matches!(
            bench.get_events(),
            [BenchEvent::TimerSpawned { .. }]
        ));
    }

    #[test]
    fn step_timer_action_falls_back_to_defaults() {
        let mut bench = empty_bench();
        let now = fixed_now();
        let step = ProtocolStep::new(
            "Incubate sample.",
            Some(StepAction::Timer {
                duration_minutes: None,
                timer_label: None,
            }),
        );
        let step_id = step.id.clone();
        let protocol_id = bench.add_protocol(Protocol::new(
            "Generic",
            "",
            vec![],
            vec![step],
            now,
        ));

        bench
            .execute_command(Command::RunStepAction { protocol_id, step_id }, now)
            .unwrap();
        let timer = &bench.get_timers()[0];
        assert_eq!(timer.label, "Protocol Timer");
        assert_eq!(timer.duration_minutes, 10.0);
    }

    #[test]
    fn step_experiment_action_spawns_with_overrides() {
        let mut bench = empty_bench();
        let now = fixed_now();
        let step = ProtocolStep::new(
            "Calculate volume required for subculture.",
            Some(StepAction::Experiment {
                experiment_config: ExperimentDraft {
                    name: Some("Growth Curve".to_string()),
                    target_start_od: Some("0.05".into()),
                    target_volume: Some("50".into()),
                    ..Default::default()
                },
            }),
        );
        let step_id = step.id.clone();
        let protocol_id = bench.add_protocol(Protocol::new(
            "Bacterial Growth Setup",
            "",
            vec!["Microbiology".to_string()],
            vec![step],
            now,
        ));

        bench
            .execute_command(Command::RunStepAction { protocol_id, step_id }, now)
            .unwrap();
        let exp = &bench.get_experiments()[0];
        assert_eq!(exp.name, "Growth Curve");
        assert_eq!(exp.target_start_od.parse(), Some(0.05));
        assert_eq!(exp.inoculum_od.parse(), Some(2.5), "defaults retained");
    }

    #[test]
    fn step_without_action_is_an_error() {
        let mut bench = empty_bench();
        let now = fixed_now();
        let step = ProtocolStep::new("Add SOC media.", None);
        let step_id = step.id.clone();
        let protocol_id =
            bench.add_protocol(Protocol::new("P", "", vec![], vec![step], now));
        let err = bench
            .execute_command(Command::RunStepAction { protocol_id, step_id }, now)
            .unwrap_err();
        assert!(matches!(err, GrowbenchError::StepHasNoAction(_)));
    }

    #[test]
    fn drafts_create_entities_and_return_ids() {
        let mut bench = empty_bench();
        let now = fixed_now();

        let timer_id = bench.apply_draft(
            AssistantDraft::Timer {
                data: TimerSpec {
                    label: "10 min spin".to_string(),
                    duration_minutes: 10.0,
                },
            },
            now,
        );
        assert_eq!(bench.timer(&timer_id).unwrap().status, TimerStatus::Idle);

        let exp_id = bench.apply_draft(
            AssistantDraft::Experiment {
                data: ExperimentDraft {
                    target_harvest_od: Some("0.6".into()),
                    ..Default::default()
                },
            },
            now,
        );
        assert_eq!(
            bench.experiment(&exp_id).unwrap().target_harvest_od.parse(),
            Some(0.6)
        );
    }

    #[test]
    fn unknown_ids_surface_as_errors() {
        let mut bench = empty_bench();
        let now = fixed_now();
        assert!(matches!(
            bench.execute_command(
                Command::StartTimer { timer_id: "missing".to_string() },
                now
            ),
            Err(GrowbenchError::TimerNotFound(_))
        ));
        assert!(matches!(
            bench.remove_protocol("missing"),
            Err(GrowbenchError::ProtocolNotFound(_))
        ));
    }

    #[test]
    fn field_edits_apply_partially_and_removal_drops_the_record() {
        let mut bench = empty_bench();
        let now = fixed_now();
        let exp_id = bench.add_experiment(None, now);
        bench
            .update_experiment(
                &exp_id,
                &ExperimentDraft {
                    doubling_time: Some("35".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        let exp = bench.experiment(&exp_id).unwrap();
        assert_eq!(exp.doubling_time.parse(), Some(35.0));
        assert_eq!(exp.target_volume.parse(), Some(500.0), "other fields kept");

        let timer_id = bench.add_timer("Scratch", 5.0, false, now);
        bench.remove_timer(&timer_id).unwrap();
        assert!(bench.timer(&timer_id).is_none());
    }

    #[test]
    fn paused_timers_are_active_but_unscheduled() {
        let mut bench = empty_bench();
        let now = fixed_now();
        let running = bench.add_timer("Run Gel", 60.0, true, now);
        let paused = bench.add_timer("Transfer", 60.0, true, now);
        bench
            .execute_command(
                Command::PauseTimer { timer_id: paused.clone() },
                now + Duration::minutes(5),
            )
            .unwrap();
        bench.add_timer("Queued", 15.0, false, now);

        let active: Vec<_> = bench.active_timers().map(|t| t.id.clone()).collect();
        assert_eq!(active, vec![running.clone(), paused.clone()]);

        let unscheduled: Vec<_> =
            bench.unscheduled_timers().map(|t| t.label.clone()).collect();
        assert_eq!(unscheduled, vec!["Transfer".to_string(), "Queued".to_string()]);
    }

    #[test]
    fn experiments_get_sequential_default_names() {
        let mut bench = empty_bench();
        let now = fixed_now();
        bench.add_experiment(None, now);
        bench.add_experiment(None, now);
        let names: Vec<_> = bench.get_experiments().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, vec!["Exp 1", "Exp 2"]);
    }
}
