// timer/types.rs - Timer records, tick transitions and errors

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const ONE_MINUTE_WARNING: &str = "One minute remaining";
pub const THIRTY_SECONDS_WARNING: &str = "30 seconds remaining";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(Uuid);

impl TimerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// One countdown. `remaining_seconds` never exceeds `duration_seconds` and
/// only decreases while `is_running`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: TimerId,
    pub duration_seconds: u32,
    pub remaining_seconds: u32,
    pub is_running: bool,
    pub label: String,
    pub started_at: String,
}

impl Timer {
    pub fn new(duration_seconds: u32, label: impl Into<String>) -> Self {
        Self {
            id: TimerId::new(),
            duration_seconds,
            remaining_seconds: duration_seconds,
            is_running: true,
            label: label.into(),
            started_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_seconds == 0
    }

    /// The state one second later, plus whatever that second announces.
    pub fn advanced(&self) -> (Timer, Option<TimerEvent>) {
        if !self.is_running || self.is_finished() {
            return (self.clone(), None);
        }

        let mut next = self.clone();
        next.remaining_seconds -= 1;

        let event = match next.remaining_seconds {
            0 => {
                next.is_running = false;
                Some(TimerEvent::Completed {
                    id: next.id,
                    label: next.label.clone(),
                })
            }
            60 | 30 => Some(TimerEvent::Milestone {
                id: next.id,
                remaining_seconds: next.remaining_seconds,
            }),
            _ => None,
        };

        (next, event)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    Milestone { id: TimerId, remaining_seconds: u32 },
    Completed { id: TimerId, label: String },
}

impl TimerEvent {
    pub fn timer_id(&self) -> TimerId {
        match self {
            TimerEvent::Milestone { id, .. } | TimerEvent::Completed { id, .. } => *id,
        }
    }

    /// Text narrated when this event fires.
    pub fn announcement(&self) -> String {
        match self {
            TimerEvent::Milestone {
                remaining_seconds: 60,
                ..
            } => ONE_MINUTE_WARNING.to_string(),
            TimerEvent::Milestone {
                remaining_seconds: 30,
                ..
            } => THIRTY_SECONDS_WARNING.to_string(),
            TimerEvent::Milestone {
                remaining_seconds, ..
            } => format!("{} remaining", format_remaining(*remaining_seconds)),
            TimerEvent::Completed { label, .. } => format!("Timer complete! {}", label),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TimerError {
    #[error("Timer duration must be a positive number of minutes, got {0}")]
    InvalidDuration(f64),

    #[error("Timer duration too long: {0} minutes")]
    DurationTooLong(f64),
}

/// `M:SS`, minutes unpadded.
pub fn format_remaining(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Minutes as spoken/printed: `5`, `1.5`.
pub fn format_minutes(minutes: f64) -> String {
    if minutes.fract() == 0.0 {
        format!("{}", minutes as u64)
    } else {
        format!("{}", minutes)
    }
}
