use crate::core::config::AppConfig;
use crate::core::display::{DisplayState, Presenter};
use crate::core::mode_selector::ModeSelector;
use crate::core::rep_counter::RepCounter;
use crate::core::session_manager::{SessionController, SessionStart, SessionStatus, TickOutcome};
use crate::models::pose::{LandmarkSample, PoseFrame};
use crate::models::workout::{score_percent, Language, Mode, Phase, SessionSummary, WorkoutResult};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, trace};

/// Something the presentation layer should react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    SessionStarted { session_id: String, countdown_secs: u32 },
    Countdown { remaining: u32 },
    CountingEnabled,
    Rep { count: u32, score_percent: u32 },
    ModeChanged { mode: Mode },
    Summary(SessionSummary),
    Display(DisplayState),
}

/// Single owner of all workout state.
///
/// Every input (button press, countdown tick, landmark frame) is a method call on
/// this object; resulting notifications queue up until `take_notifications()`.
pub struct Workout {
    session: SessionController,
    counter: RepCounter,
    modes: ModeSelector,
    presenter: Presenter,
    min_landmark_visibility: f32,
    outbox: Vec<Notification>,
}

impl Workout {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            session: SessionController::new(config.countdown_secs),
            counter: RepCounter::new(config.low_threshold, config.high_threshold),
            modes: ModeSelector::new(config.default_mode),
            presenter: Presenter::new(config.default_language, config.zoom),
            min_landmark_visibility: config.min_landmark_visibility,
            outbox: Vec::new(),
        }
    }

    // ==========================================================================
    // Session
    // ==========================================================================

    pub fn start(&mut self, now: Instant) -> SessionStart {
        let start = self.session.start(now);

        self.counter.reset();
        self.counter.set_counting_enabled(self.session.counting_enabled());
        self.presenter.session_started();

        self.outbox.push(Notification::SessionStarted {
            session_id: start.session_id.clone(),
            countdown_secs: start.countdown_ticks,
        });

        if start.countdown_ticks > 0 {
            self.presenter.countdown(start.countdown_ticks);
            self.outbox.push(Notification::Countdown {
                remaining: start.countdown_ticks,
            });
        } else {
            self.enable_counting();
        }

        self.push_display();
        start
    }

    pub fn countdown_tick(&mut self, generation: u64) {
        match self.session.tick(generation) {
            TickOutcome::Ignored => {}
            TickOutcome::Remaining(remaining) => {
                self.presenter.countdown(remaining);
                self.outbox.push(Notification::Countdown { remaining });
                self.push_display();
            }
            TickOutcome::CountingEnabled => {
                self.enable_counting();
                self.push_display();
            }
        }
    }

    fn enable_counting(&mut self) {
        self.counter.set_counting_enabled(true);
        self.presenter.counting_enabled();
        self.outbox.push(Notification::CountingEnabled);
    }

    pub fn stop(&mut self, now: Instant) -> SessionSummary {
        if !self.session.is_active() {
            debug!("Stop requested with no running session");
            return self.session.stop(now, 0);
        }

        self.counter.set_counting_enabled(false);
        let summary = self.session.stop(now, self.counter.count());

        self.presenter.session_stopped(&summary);
        self.outbox.push(Notification::Summary(summary.clone()));
        self.push_display();
        summary
    }

    // ==========================================================================
    // Rep counting
    // ==========================================================================

    /// Handle one frame from the pose source. Frames without usable hip/knee
    /// landmarks are skipped without touching any state.
    pub fn observe_frame(&mut self, frame: &PoseFrame) -> Option<u32> {
        if !self.session.is_active() {
            return None;
        }

        match frame.sample(self.min_landmark_visibility) {
            Some(sample) => self.observe(sample),
            None => {
                trace!("Frame {} has no usable hip/knee landmarks", frame.timestamp);
                None
            }
        }
    }

    /// Feed one hip/knee sample. Returns the new count when a rep completes.
    pub fn observe(&mut self, sample: LandmarkSample) -> Option<u32> {
        let count = self.counter.observe(sample)?;

        debug!("Rep {} completed", count);
        self.presenter.rep_completed(count);
        self.outbox.push(Notification::Rep {
            count,
            score_percent: score_percent(count),
        });
        self.push_display();
        Some(count)
    }

    // ==========================================================================
    // Controls
    // ==========================================================================

    pub fn select_mode(&mut self, tag: &str) -> WorkoutResult<Mode> {
        let mode = self.modes.select(tag)?;

        self.counter.reset();
        self.presenter.mode_changed(mode);
        self.outbox.push(Notification::ModeChanged { mode });
        self.push_display();
        Ok(mode)
    }

    pub fn toggle_language(&mut self) -> Language {
        let language = self.presenter.toggle_language();
        info!("Language switched to {}", language);
        self.push_display();
        language
    }

    pub fn zoom_in(&mut self) -> u32 {
        let percent = self.presenter.zoom_mut().zoom_in();
        self.push_display();
        percent
    }

    pub fn zoom_out(&mut self) -> u32 {
        let percent = self.presenter.zoom_mut().zoom_out();
        self.push_display();
        percent
    }

    pub fn reset_zoom(&mut self) -> u32 {
        let percent = self.presenter.zoom_mut().reset();
        self.push_display();
        percent
    }

    // ==========================================================================
    // Queries
    // ==========================================================================

    pub fn display_state(&self) -> DisplayState {
        self.presenter.snapshot(self.counter.count(), self.modes.current())
    }

    pub fn count(&self) -> u32 {
        self.counter.count()
    }

    pub fn phase(&self) -> Phase {
        self.counter.phase()
    }

    pub fn mode(&self) -> Mode {
        self.modes.current()
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn counting_enabled(&self) -> bool {
        self.counter.counting_enabled()
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }

    fn push_display(&mut self) {
        let state = self.display_state();
        self.outbox.push(Notification::Display(state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pose::test_pose;
    use crate::models::workout::WorkoutError;
    use std::time::Duration;

    fn config(countdown_secs: u32) -> AppConfig {
        AppConfig {
            countdown_secs,
            ..AppConfig::default()
        }
    }

    fn squat(workout: &mut Workout, diffs: &[f32]) {
        for &diff in diffs {
            workout.observe(LandmarkSample::new(0.0, diff));
        }
    }

    fn active_workout() -> Workout {
        let mut workout = Workout::new(&config(2));
        let start = workout.start(Instant::now());
        workout.countdown_tick(start.generation);
        workout.countdown_tick(start.generation);
        assert!(workout.counting_enabled());
        workout
    }

    #[test]
    fn test_counting_blocked_during_countdown() {
        let mut workout = Workout::new(&config(5));
        let start = workout.start(Instant::now());
        assert_eq!(workout.status(), SessionStatus::CountingDown);

        for _ in 0..4 {
            squat(&mut workout, &[0.20, 0.01, 0.30]);
            workout.countdown_tick(start.generation);
            assert_eq!(workout.count(), 0);
            assert_eq!(workout.phase(), Phase::Up);
        }

        workout.countdown_tick(start.generation);
        assert_eq!(workout.status(), SessionStatus::Active);
        squat(&mut workout, &[0.20, 0.01, 0.30]);
        assert_eq!(workout.count(), 1);
    }

    #[test]
    fn test_frames_are_ignored_when_idle() {
        let mut workout = Workout::new(&config(0));
        assert_eq!(workout.observe_frame(&PoseFrame::new(0, Some(test_pose(0.5, 0.51)))), None);
        assert_eq!(workout.phase(), Phase::Up);
        assert!(!workout.counting_enabled());
    }

    #[test]
    fn test_frames_drive_counter() {
        let mut workout = Workout::new(&config(0));
        workout.start(Instant::now());

        let frames = [
            PoseFrame::new(1, Some(test_pose(0.50, 0.70))),
            PoseFrame::new(2, None),
            PoseFrame::new(3, Some(test_pose(0.60, 0.62))),
            PoseFrame::new(4, None),
            PoseFrame::new(5, Some(test_pose(0.50, 0.70))),
        ];
        let completed: Vec<Option<u32>> = frames.iter().map(|f| workout.observe_frame(f)).collect();
        assert_eq!(completed, vec![None, None, None, None, Some(1)]);
    }

    #[test]
    fn test_occluded_frame_changes_nothing() {
        let mut workout = active_workout();
        squat(&mut workout, &[0.01]);
        assert_eq!(workout.phase(), Phase::Down);
        workout.take_notifications();

        let mut hidden = test_pose(0.5, 0.9);
        hidden.keypoints[25].visibility = 0.1;
        assert_eq!(workout.observe_frame(&PoseFrame::new(9, Some(hidden))), None);
        assert_eq!(workout.phase(), Phase::Down);
        assert_eq!(workout.count(), 0);
        assert!(workout.take_notifications().is_empty());
    }

    #[test]
    fn test_mode_switches_reset_count() {
        let mut workout = active_workout();
        squat(&mut workout, &[0.01, 0.30, 0.01, 0.30, 0.01]);
        assert_eq!(workout.count(), 2);

        assert_eq!(workout.select_mode("SIDE").unwrap(), Mode::Side);
        assert_eq!(workout.count(), 0);
        assert_eq!(workout.phase(), Phase::Up);

        squat(&mut workout, &[0.01, 0.30]);
        assert_eq!(workout.count(), 1);

        assert_eq!(workout.select_mode("AUTO").unwrap(), Mode::Auto);
        assert_eq!(workout.count(), 0);

        let state = workout.display_state();
        assert_eq!(state.rep_text, "0");
        assert_eq!(state.score_text, "--%");
        assert_eq!(state.feedback, "Mode: AUTO");
    }

    #[test]
    fn test_invalid_mode_leaves_state() {
        let mut workout = active_workout();
        squat(&mut workout, &[0.01, 0.30, 0.01]);
        workout.take_notifications();

        assert_eq!(
            workout.select_mode("LUNGE"),
            Err(WorkoutError::InvalidMode("LUNGE".to_string()))
        );
        assert_eq!(workout.count(), 1);
        assert_eq!(workout.phase(), Phase::Down);
        assert_eq!(workout.mode(), Mode::Auto);
        assert!(workout.take_notifications().is_empty());
    }

    #[test]
    fn test_stop_reports_and_closes_gate() {
        let mut workout = Workout::new(&config(0));
        let t0 = Instant::now();
        workout.start(t0);
        squat(&mut workout, &[0.01, 0.30, 0.01, 0.30, 0.01, 0.30]);

        let summary = workout.stop(t0 + Duration::from_secs(20));
        assert_eq!(summary.reps, 3);
        assert_eq!(summary.score_percent, 30);
        assert_eq!(summary.to_text(), "Time: 20s | Reps: 3");
        assert!(!workout.counting_enabled());

        squat(&mut workout, &[0.01, 0.30]);
        assert_eq!(workout.count(), 3);

        let again = workout.stop(t0 + Duration::from_secs(50));
        assert_eq!(again, summary);
        assert_eq!(
            workout.display_state().summary_text.as_deref(),
            Some("Time: 20s | Reps: 3")
        );
    }

    #[test]
    fn test_zoom_with_oversized_settings() {
        let mut config = AppConfig::default();
        config.zoom.step_percent = u32::MAX;
        let mut workout = Workout::new(&config);
        assert_eq!(workout.zoom_in(), 300);
        assert_eq!(workout.zoom_out(), 50);

        config.zoom.min_percent = 300;
        config.zoom.max_percent = 50;
        let mut workout = Workout::new(&config);
        assert_eq!(workout.reset_zoom(), 50);
        assert_eq!(workout.display_state().zoom_percent, 50);
    }

    #[test]
    fn test_stop_before_start() {
        let mut workout = Workout::new(&AppConfig::default());
        let summary = workout.stop(Instant::now());
        assert_eq!(summary.duration_ms, 0);
        assert_eq!(summary.reps, 0);
        assert!(workout.take_notifications().is_empty());
    }

    #[test]
    fn test_late_tick_after_stop() {
        let mut workout = Workout::new(&config(1));
        let t0 = Instant::now();
        let start = workout.start(t0);
        workout.stop(t0);

        workout.countdown_tick(start.generation);
        assert!(!workout.counting_enabled());
        assert_eq!(workout.status(), SessionStatus::Idle);
    }

    #[test]
    fn test_restart_resets_counter() {
        let mut workout = active_workout();
        squat(&mut workout, &[0.01, 0.30, 0.01]);
        assert_eq!(workout.count(), 1);

        let start = workout.start(Instant::now());
        assert_eq!(workout.count(), 0);
        assert_eq!(workout.phase(), Phase::Up);
        assert!(!workout.counting_enabled());
        assert_eq!(workout.display_state().score_text, "0%");
        assert_eq!(start.countdown_ticks, 2);
    }

    #[test]
    fn test_notifications_for_session() {
        let mut workout = Workout::new(&config(2));
        let start = workout.start(Instant::now());
        workout.countdown_tick(start.generation);
        workout.countdown_tick(start.generation);
        squat(&mut workout, &[0.01, 0.30]);

        let events: Vec<Notification> = workout
            .take_notifications()
            .into_iter()
            .filter(|n| !matches!(n, Notification::Display(_)))
            .collect();

        assert_eq!(
            events,
            vec![
                Notification::SessionStarted {
                    session_id: start.session_id.clone(),
                    countdown_secs: 2
                },
                Notification::Countdown { remaining: 2 },
                Notification::Countdown { remaining: 1 },
                Notification::CountingEnabled,
                Notification::Rep {
                    count: 1,
                    score_percent: 10
                },
            ]
        );
    }

    #[test]
    fn test_language_and_zoom() {
        let mut workout = Workout::new(&AppConfig::default());
        assert_eq!(workout.display_state().score_label, "คะแนน");
        assert_eq!(workout.toggle_language(), Language::En);
        assert_eq!(workout.display_state().score_label, "SCORE");

        assert_eq!(workout.zoom_in(), 110);
        assert_eq!(workout.zoom_out(), 100);
        assert_eq!(workout.zoom_out(), 90);
        assert_eq!(workout.reset_zoom(), 100);
        assert_eq!(workout.display_state().zoom_percent, 100);
    }
}
