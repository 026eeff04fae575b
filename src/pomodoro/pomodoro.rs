use serde::{Deserialize, Serialize};

pub const WORK_BLOCK_SECS: u64 = 1800; // Longest focus block
pub const BREAK_BLOCK_SECS: u64 = 300; // Longest break block

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PomodoroPhase {
    #[default]
    Work,
    Break,
}

impl PomodoroPhase {
    pub fn as_str(&self) -> &str {
        match self {
            PomodoroPhase::Work => "WORK",
            PomodoroPhase::Break => "BREAK",
        }
    }

    pub fn emoji(&self) -> &str {
        match self {
            PomodoroPhase::Work => "💼",
            PomodoroPhase::Break => "☕",
        }
    }

    /// The phase that follows this one.
    pub fn next(self) -> Self {
        match self {
            PomodoroPhase::Work => PomodoroPhase::Break,
            PomodoroPhase::Break => PomodoroPhase::Work,
        }
    }

    /// Length of a block of this phase, truncated to the flight time left.
    pub fn block_secs(self, flight_secs_remaining: u64) -> u64 {
        let cap = match self {
            PomodoroPhase::Work => WORK_BLOCK_SECS,
            PomodoroPhase::Break => BREAK_BLOCK_SECS,
        };
        cap.min(flight_secs_remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_alternates() {
        assert_eq!(PomodoroPhase::Work.next(), PomodoroPhase::Break);
        assert_eq!(PomodoroPhase::Break.next(), PomodoroPhase::Work);
    }

    #[test]
    fn test_block_secs_truncated_by_flight() {
        assert_eq!(PomodoroPhase::Work.block_secs(10_000), 1800);
        assert_eq!(PomodoroPhase::Work.block_secs(42), 42);
        assert_eq!(PomodoroPhase::Break.block_secs(10_000), 300);
        assert_eq!(PomodoroPhase::Break.block_secs(200), 200);
        assert_eq!(PomodoroPhase::Break.block_secs(0), 0);
    }

    #[test]
    fn test_phase_serialization() {
        let json = serde_json::to_string(&PomodoroPhase::Break).unwrap();
        assert_eq!(json, "\"BREAK\"");
    }

    #[test]
    fn test_label_matches_wire_name() {
        for phase in [PomodoroPhase::Work, PomodoroPhase::Break] {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase.as_str()));
        }
    }
}
