use std::time::Duration;

use notify_rust::Notification;
use serde::Serialize;

use crate::session::engine::SessionEvent;

pub const BANNER_DURATION: Duration = Duration::from_secs(8);
pub const SNACK_MESSAGE: &str = "SNACK TIME - UNFASTEN UR SEATS";
pub const SNACK_DETAIL: &str = "Service cart is approaching your row";

/// One sine tone of the cabin chime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tone {
    pub frequency_hz: f64,
    pub start_secs: f64,
    pub duration_secs: f64,
}

/// High-low cabin chime (A5 then F5).
pub const CHIME: [Tone; 2] = [
    Tone {
        frequency_hz: 880.0,
        start_secs: 0.0,
        duration_secs: 0.8,
    },
    Tone {
        frequency_hz: 698.46,
        start_secs: 0.4,
        duration_secs: 1.2,
    },
];

/// What the presentation layer should show and play.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub message: &'static str,
    pub detail: &'static str,
    pub duration_ms: u64,
    pub chime: &'static [Tone],
}

impl Banner {
    pub fn snack_time() -> Self {
        Self {
            message: SNACK_MESSAGE,
            detail: SNACK_DETAIL,
            duration_ms: BANNER_DURATION.as_millis() as u64,
            chime: &CHIME,
        }
    }

    pub fn for_event(event: &SessionEvent) -> Option<Self> {
        match event {
            SessionEvent::BreakStartedWithSnacks => Some(Self::snack_time()),
            _ => None,
        }
    }
}

pub fn send_notification(banner: &Banner) -> Result<(), notify_rust::error::Error> {
    Notification::new()
        .summary(banner.message)
        .body(banner.detail)
        .timeout(notify_rust::Timeout::Milliseconds(banner.duration_ms as u32))
        .show()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_snack_break_raises_banner() {
        assert_eq!(
            Banner::for_event(&SessionEvent::BreakStartedWithSnacks),
            Some(Banner::snack_time())
        );
        assert_eq!(Banner::for_event(&SessionEvent::Landed), None);
        assert_eq!(Banner::for_event(&SessionEvent::Aborted), None);
    }

    #[test]
    fn test_banner_serialization() {
        let json = serde_json::to_string(&Banner::snack_time()).unwrap();
        assert!(json.contains("\"message\":\"SNACK TIME - UNFASTEN UR SEATS\""));
        assert!(json.contains("\"durationMs\":8000"));
        assert!(json.contains("\"frequencyHz\":698.46"));
    }
}
