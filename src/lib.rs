pub mod clock;
pub mod config;
pub mod console;
pub mod duration;
pub mod events;
pub mod narration;
pub mod recipe;
pub mod scaling;
pub mod session;
pub mod timer;

pub use clock::{Clock, ManualClock, ScheduleHandle, TokioClock};
pub use config::{ConfigError, CookModeConfig};
pub use duration::extract_suggested_minutes;
pub use events::SessionEvent;
pub use narration::{NarrationChannel, NullSpeech, RecordingSpeech, SpeechBackend, SpeechLog};
pub use recipe::Recipe;
pub use scaling::{scale_ingredient_line, ServingsScaler};
pub use session::{
    CookModeSnapshot, CookSession, HostCapabilities, NoWakeLock, SessionState, WakeLock,
    WakeLockError,
};
pub use timer::{format_remaining, Timer, TimerError, TimerEvent, TimerId};
