use crate::core::countdown::{Countdown, CountdownStep};
use crate::models::workout::{score_percent, SessionSummary};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

// ==============================================================================
// Session Types
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    CountingDown,
    Active,
}

impl SessionStatus {
    pub fn to_string(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::CountingDown => "counting_down",
            SessionStatus::Active => "active",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    /// Monotonic start, used for the elapsed duration
    pub started_at: Instant,
    /// Wall-clock start in UTC milliseconds
    pub start_timestamp: i64,
    countdown: Countdown,
}

impl Session {
    pub fn counting_enabled(&self) -> bool {
        self.countdown.is_finished()
    }
}

/// Returned by `start()` so the caller can arm the countdown timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStart {
    pub session_id: String,
    /// Identifies this session's countdown ticks; stale ticks carry an older value
    pub generation: u64,
    pub countdown_ticks: u32,
}

/// Outcome of a countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale generation, no session, or countdown already done
    Ignored,
    Remaining(u32),
    CountingEnabled,
}

// ==============================================================================
// Session Controller
// ==============================================================================

/// Owns the session lifecycle: IDLE → COUNTING_DOWN → ACTIVE → IDLE.
///
/// Counting is enabled exactly when the session is ACTIVE, so the gate can
/// never be open while no session is running.
pub struct SessionController {
    current: Option<Session>,
    countdown_secs: u32,
    generation: u64,
    last_summary: Option<SessionSummary>,
}

impl SessionController {
    pub fn new(countdown_secs: u32) -> Self {
        Self {
            current: None,
            countdown_secs,
            generation: 0,
            last_summary: None,
        }
    }

    /// Begin a new session. A running session is discarded and its countdown invalidated.
    pub fn start(&mut self, now: Instant) -> SessionStart {
        if let Some(previous) = self.current.take() {
            debug!("Restarting session {}", previous.id);
        }

        self.generation += 1;

        let session = Session {
            id: Uuid::new_v4().to_string(),
            started_at: now,
            start_timestamp: chrono::Utc::now().timestamp_millis(),
            countdown: Countdown::new(self.countdown_secs),
        };

        info!(
            "Started session {} with {}s countdown",
            session.id, self.countdown_secs
        );

        let start = SessionStart {
            session_id: session.id.clone(),
            generation: self.generation,
            countdown_ticks: self.countdown_secs,
        };
        self.current = Some(session);
        start
    }

    /// Advance the countdown of session `generation` by one tick
    pub fn tick(&mut self, generation: u64) -> TickOutcome {
        if generation != self.generation {
            debug!("Dropping stale countdown tick (generation {})", generation);
            return TickOutcome::Ignored;
        }

        let Some(session) = self.current.as_mut() else {
            return TickOutcome::Ignored;
        };

        match session.countdown.tick() {
            CountdownStep::Remaining(n) => TickOutcome::Remaining(n),
            CountdownStep::Finished => {
                info!("Countdown finished, counting enabled for {}", session.id);
                TickOutcome::CountingEnabled
            }
            CountdownStep::Expired => TickOutcome::Ignored,
        }
    }

    /// End the current session and report it.
    ///
    /// Without a running session this returns the previous summary again, or an
    /// all-zero summary if nothing was ever started.
    pub fn stop(&mut self, now: Instant, reps: u32) -> SessionSummary {
        let Some(session) = self.current.take() else {
            return self
                .last_summary
                .clone()
                .unwrap_or_else(SessionSummary::empty);
        };

        // Invalidate any countdown tick still in flight
        self.generation += 1;

        let duration = now.saturating_duration_since(session.started_at);
        let summary = SessionSummary {
            session_id: Some(session.id.clone()),
            started_at: Some(session.start_timestamp),
            duration_ms: duration.as_millis() as u64,
            reps,
            score_percent: score_percent(reps),
        };

        info!(
            "Stopped session {} after {}s with {} reps",
            session.id,
            summary.duration_secs(),
            reps
        );

        self.last_summary = Some(summary.clone());
        summary
    }

    pub fn status(&self) -> SessionStatus {
        match &self.current {
            None => SessionStatus::Idle,
            Some(session) if session.counting_enabled() => SessionStatus::Active,
            Some(_) => SessionStatus::CountingDown,
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn counting_enabled(&self) -> bool {
        self.status() == SessionStatus::Active
    }

    pub fn last_summary(&self) -> Option<&SessionSummary> {
        self.last_summary.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_lifecycle() {
        let mut controller = SessionController::new(3);
        let t0 = Instant::now();
        assert_eq!(controller.status(), SessionStatus::Idle);

        let start = controller.start(t0);
        assert_eq!(start.countdown_ticks, 3);
        assert_eq!(controller.status(), SessionStatus::CountingDown);
        assert!(!controller.counting_enabled());

        assert_eq!(controller.tick(start.generation), TickOutcome::Remaining(2));
        assert_eq!(controller.tick(start.generation), TickOutcome::Remaining(1));
        assert!(!controller.counting_enabled());
        assert_eq!(controller.tick(start.generation), TickOutcome::CountingEnabled);
        assert_eq!(controller.status(), SessionStatus::Active);
        assert_eq!(controller.tick(start.generation), TickOutcome::Ignored);

        let summary = controller.stop(t0 + Duration::from_millis(42_400), 6);
        assert_eq!(summary.duration_secs(), 42);
        assert_eq!(summary.reps, 6);
        assert_eq!(summary.score_percent, 60);
        assert_eq!(summary.session_id.as_deref(), Some(start.session_id.as_str()));
        assert_eq!(controller.status(), SessionStatus::Idle);
        assert!(!controller.counting_enabled());
    }

    #[test]
    fn test_counting_enabled_exactly_after_nth_tick() {
        for n in 1..=8 {
            let mut controller = SessionController::new(n);
            let start = controller.start(Instant::now());
            let mut enabled_at = Vec::new();
            for i in 1..=(n + 3) {
                if controller.tick(start.generation) == TickOutcome::CountingEnabled {
                    enabled_at.push(i);
                }
                assert_eq!(controller.counting_enabled(), i >= n);
            }
            assert_eq!(enabled_at, vec![n]);
        }
    }

    #[test]
    fn test_zero_countdown_is_active_immediately() {
        let mut controller = SessionController::new(0);
        let start = controller.start(Instant::now());
        assert_eq!(start.countdown_ticks, 0);
        assert_eq!(controller.status(), SessionStatus::Active);
    }

    #[test]
    fn test_stop_without_start_is_zero() {
        let mut controller = SessionController::new(5);
        let summary = controller.stop(Instant::now(), 0);
        assert_eq!(summary, SessionSummary::empty());
        assert_eq!(summary.duration_ms, 0);
    }

    #[test]
    fn test_stop_twice_repeats_summary() {
        let mut controller = SessionController::new(1);
        let t0 = Instant::now();
        let start = controller.start(t0);
        controller.tick(start.generation);

        let first = controller.stop(t0 + Duration::from_secs(10), 3);
        let second = controller.stop(t0 + Duration::from_secs(99), 0);
        assert_eq!(first, second);
        assert_eq!(controller.last_summary(), Some(&first));
    }

    #[test]
    fn test_tick_after_stop_is_ignored() {
        let mut controller = SessionController::new(2);
        let t0 = Instant::now();
        let start = controller.start(t0);
        controller.tick(start.generation);
        controller.stop(t0, 0);

        assert_eq!(controller.tick(start.generation), TickOutcome::Ignored);
        assert_eq!(controller.status(), SessionStatus::Idle);
    }

    #[test]
    fn test_restart_invalidates_old_countdown() {
        let mut controller = SessionController::new(2);
        let t0 = Instant::now();
        let first = controller.start(t0);
        controller.tick(first.generation);

        let second = controller.start(t0);
        assert_ne!(first.session_id, second.session_id);
        assert_eq!(controller.tick(first.generation), TickOutcome::Ignored);
        assert_eq!(controller.tick(second.generation), TickOutcome::Remaining(1));
        assert_eq!(controller.tick(second.generation), TickOutcome::CountingEnabled);
    }
}
