use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::pomodoro::pomodoro::{PomodoroPhase, WORK_BLOCK_SECS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionMode {
    #[default]
    Idle,
    Boarding,
    Flying,
}

impl SessionMode {
    pub fn as_str(&self) -> &str {
        match self {
            SessionMode::Idle => "IDLE",
            SessionMode::Boarding => "BOARDING",
            SessionMode::Flying => "FLYING",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chosen once per flight when boarding completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FocusStrategy {
    Snacks,
    NoSnacks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A break began on a flight with snack service.
    BreakStartedWithSnacks,
    PhaseChanged { phase: PomodoroPhase, seconds: u64 },
    Landed,
    Aborted,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {operation} while {mode}")]
    InvalidTransition {
        operation: &'static str,
        mode: SessionMode,
    },
    #[error("flight duration must be at least one second")]
    InvalidDuration,
}

/// Snapshot of the flight and pomodoro clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub mode: SessionMode,
    pub pomodoro_phase: PomodoroPhase,
    pub pomodoro_seconds_remaining: u64,
    pub flight_seconds_remaining: u64,
    pub strategy: Option<FocusStrategy>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            mode: SessionMode::Idle,
            pomodoro_phase: PomodoroPhase::Work,
            pomodoro_seconds_remaining: WORK_BLOCK_SECS,
            flight_seconds_remaining: 0,
            strategy: None,
        }
    }
}

/// Result of one clock step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub state: SessionState,
    pub events: Vec<SessionEvent>,
}

/// Reducer over [`SessionState`]. It owns no clock; every second of flight is
/// a call to [`SessionEngine::tick`].
#[derive(Debug, Default)]
pub struct SessionEngine {
    state: SessionState,
}

impl SessionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> SessionState {
        self.state
    }

    pub fn board(&mut self) -> Result<SessionState, SessionError> {
        match self.state.mode {
            SessionMode::Flying => Err(self.invalid("board")),
            SessionMode::Idle | SessionMode::Boarding => {
                self.state.mode = SessionMode::Boarding;
                debug!("boarding");
                Ok(self.state)
            }
        }
    }

    pub fn cancel_boarding(&mut self) -> Result<SessionState, SessionError> {
        if self.state.mode != SessionMode::Boarding {
            return Err(self.invalid("cancel boarding"));
        }
        self.state = SessionState::default();
        debug!("boarding cancelled");
        Ok(self.state)
    }

    pub fn start(
        &mut self,
        flight_seconds: u64,
        strategy: FocusStrategy,
    ) -> Result<SessionState, SessionError> {
        if self.state.mode == SessionMode::Flying {
            return Err(self.invalid("start"));
        }
        if flight_seconds == 0 {
            return Err(SessionError::InvalidDuration);
        }

        self.state = SessionState {
            mode: SessionMode::Flying,
            pomodoro_phase: PomodoroPhase::Work,
            pomodoro_seconds_remaining: PomodoroPhase::Work.block_secs(flight_seconds),
            flight_seconds_remaining: flight_seconds,
            strategy: Some(strategy),
        };
        info!(flight_seconds, ?strategy, "departed");
        Ok(self.state)
    }

    pub fn tick(&mut self) -> Result<Tick, SessionError> {
        if self.state.mode != SessionMode::Flying {
            return Err(self.invalid("tick"));
        }

        let mut events = Vec::new();
        let state = &mut self.state;

        state.flight_seconds_remaining = state.flight_seconds_remaining.saturating_sub(1);

        let expired = if state.pomodoro_seconds_remaining == 0 {
            true
        } else {
            state.pomodoro_seconds_remaining -= 1;
            state.pomodoro_seconds_remaining == 0
        };

        if expired {
            let phase = state.pomodoro_phase.next();
            let seconds = phase.block_secs(state.flight_seconds_remaining);
            state.pomodoro_phase = phase;
            state.pomodoro_seconds_remaining = seconds;

            debug!(phase = phase.as_str(), seconds, "pomodoro phase switched");
            events.push(SessionEvent::PhaseChanged { phase, seconds });
            // a zero-length break only happens on the landing tick
            if phase == PomodoroPhase::Break
                && seconds > 0
                && state.strategy == Some(FocusStrategy::Snacks)
            {
                events.push(SessionEvent::BreakStartedWithSnacks);
            }
        }

        if state.flight_seconds_remaining == 0 {
            *state = SessionState::default();
            info!("landed");
            events.push(SessionEvent::Landed);
        }

        Ok(Tick {
            state: self.state,
            events,
        })
    }

    /// Drops back to idle from any mode, discarding remaining time.
    pub fn abort(&mut self) -> SessionState {
        if self.state.mode == SessionMode::Flying {
            info!(
                flight_seconds_remaining = self.state.flight_seconds_remaining,
                "flight aborted"
            );
        }
        self.state = SessionState::default();
        self.state
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            operation,
            mode: self.state.mode,
        }
    }
}
