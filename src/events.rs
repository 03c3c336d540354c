use crate::narration::SpeechEvent;
use crate::timer::TimerId;
use tokio::sync::mpsc;

pub type EventSender = mpsc::UnboundedSender<SessionEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Everything that changes session state outside of a direct command.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// One second elapsed for `timer` during its running stretch `run`.
    TimerTick { timer: TimerId, run: u64 },
    /// The start-of-session delay expired.
    IntroDue { token: u64 },
    Speech(SpeechEvent),
}

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
