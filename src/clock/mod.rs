// clock/mod.rs - Scheduling seam for timer ticks and delayed narration

mod manual;

pub use manual::ManualClock;

use crate::events::{EventSender, SessionEvent};
use std::fmt;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{interval_at, Instant};

#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    #[error("No tokio runtime available")]
    NoRuntime,
}

/// Delivers scheduled events into a session inbox.
pub trait Clock: Send + Sync {
    /// Send `event` every `period`, first delivery one period from now.
    fn every(&self, period: Duration, event: SessionEvent, sink: EventSender) -> ScheduleHandle;

    /// Send `event` once after `delay`.
    fn after(&self, delay: Duration, event: SessionEvent, sink: EventSender) -> ScheduleHandle;
}

/// Cancels its schedule when cancelled or dropped.
pub struct ScheduleHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl ScheduleHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        self.fire();
    }

    fn fire(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.fire();
    }
}

impl fmt::Debug for ScheduleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleHandle")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Wall-clock scheduling on a tokio runtime, one task per schedule.
#[derive(Debug, Clone)]
pub struct TokioClock {
    runtime: Handle,
}

impl TokioClock {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    pub fn current() -> Result<Self, ClockError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| ClockError::NoRuntime)
    }
}

impl Clock for TokioClock {
    fn every(&self, period: Duration, event: SessionEvent, sink: EventSender) -> ScheduleHandle {
        let task = self.runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if sink.send(event.clone()).is_err() {
                    break;
                }
            }
        });
        ScheduleHandle::new(move || task.abort())
    }

    fn after(&self, delay: Duration, event: SessionEvent, sink: EventSender) -> ScheduleHandle {
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = sink.send(event);
        });
        ScheduleHandle::new(move || task.abort())
    }
}
