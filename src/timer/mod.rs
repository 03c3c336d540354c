// timer/mod.rs - Registry of independently running cooking timers

mod types;

pub use types::{
    format_minutes, format_remaining, Timer, TimerError, TimerEvent, TimerId,
    ONE_MINUTE_WARNING, THIRTY_SECONDS_WARNING,
};

use crate::clock::{Clock, ScheduleHandle};
use crate::events::{EventSender, SessionEvent};
use std::sync::Arc;
use std::time::Duration;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);
pub const MAX_TIMER_MINUTES: f64 = 24.0 * 60.0;

struct TimerSlot {
    timer: Timer,
    run: Option<RunningStretch>,
}

/// A live tick schedule. Dropping it cancels the schedule.
struct RunningStretch {
    token: u64,
    _schedule: ScheduleHandle,
}

/// Owns every timer of a cook session and the tick schedule of each running one.
pub struct TimerRegistry {
    clock: Arc<dyn Clock>,
    sink: EventSender,
    slots: Vec<TimerSlot>,
    next_run: u64,
}

impl TimerRegistry {
    pub fn new(clock: Arc<dyn Clock>, sink: EventSender) -> Self {
        Self {
            clock,
            sink,
            slots: Vec::new(),
            next_run: 1,
        }
    }

    /// Register and immediately start a countdown of `minutes`.
    pub fn create(&mut self, minutes: f64, label: Option<&str>) -> Result<TimerId, TimerError> {
        if !minutes.is_finite() || minutes <= 0.0 {
            return Err(TimerError::InvalidDuration(minutes));
        }
        if minutes > MAX_TIMER_MINUTES {
            return Err(TimerError::DurationTooLong(minutes));
        }

        let duration_seconds = (minutes * 60.0).round() as u32;
        if duration_seconds == 0 {
            return Err(TimerError::InvalidDuration(minutes));
        }

        let label = label
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} minute timer", format_minutes(minutes)));

        let timer = Timer::new(duration_seconds, label);
        let id = timer.id;
        tracing::info!(
            "Timer {} created: {}s ({})",
            id,
            timer.duration_seconds,
            timer.label
        );

        let run = self.start_run(id);
        self.slots.push(TimerSlot {
            timer,
            run: Some(run),
        });
        Ok(id)
    }

    /// Cancel and forget a timer. Returns false if it was not registered.
    pub fn remove(&mut self, id: TimerId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        self.slots.remove(idx);
        tracing::info!("Timer {} removed", id);
        true
    }

    /// Pause a running timer or resume a paused one. Finished timers stay
    /// finished. Returns the new running state, or `None` if nothing changed.
    pub fn toggle(&mut self, id: TimerId) -> Option<bool> {
        let idx = self.index_of(id)?;

        if self.slots[idx].timer.is_running {
            let slot = &mut self.slots[idx];
            slot.timer.is_running = false;
            slot.run = None;
            tracing::debug!("Timer {} paused at {}s", id, slot.timer.remaining_seconds);
            return Some(false);
        }

        if self.slots[idx].timer.is_finished() {
            tracing::debug!("Timer {} already finished; toggle ignored", id);
            return None;
        }

        let run = self.start_run(id);
        let slot = &mut self.slots[idx];
        slot.timer.is_running = true;
        slot.run = Some(run);
        tracing::debug!("Timer {} resumed at {}s", id, slot.timer.remaining_seconds);
        Some(true)
    }

    /// Apply one elapsed second. Ticks from a cancelled stretch or for an
    /// unknown timer are ignored.
    pub fn on_tick(&mut self, id: TimerId, run: u64) -> Option<TimerEvent> {
        let Some(slot) = self.slots.iter_mut().find(|slot| slot.timer.id == id) else {
            tracing::debug!("Tick for unknown timer {} ignored", id);
            return None;
        };

        if slot.run.as_ref().map(|stretch| stretch.token) != Some(run) {
            tracing::debug!("Stale tick for timer {} (run {}) ignored", id, run);
            return None;
        }

        let (next, event) = slot.timer.advanced();
        slot.timer = next;

        if let Some(TimerEvent::Completed { .. }) = &event {
            slot.run = None;
            tracing::info!("Timer {} complete: {}", id, slot.timer.label);
        }

        event
    }

    /// Cancel every schedule and drop every timer.
    pub fn clear(&mut self) -> usize {
        let count = self.slots.len();
        self.slots.clear();
        if count > 0 {
            tracing::info!("Cleared {} timers", count);
        }
        count
    }

    pub fn get(&self, id: TimerId) -> Option<&Timer> {
        self.slots
            .iter()
            .map(|slot| &slot.timer)
            .find(|timer| timer.id == id)
    }

    /// Snapshots in creation order.
    pub fn timers(&self) -> Vec<Timer> {
        self.slots.iter().map(|slot| slot.timer.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn running_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.run.is_some()).count()
    }

    fn index_of(&self, id: TimerId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.timer.id == id)
    }

    fn start_run(&mut self, id: TimerId) -> RunningStretch {
        let token = self.next_run;
        self.next_run += 1;
        let schedule = self.clock.every(
            TICK_PERIOD,
            SessionEvent::TimerTick { timer: id, run: token },
            self.sink.clone(),
        );
        RunningStretch {
            token,
            _schedule: schedule,
        }
    }
}
