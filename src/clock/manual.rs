use super::{Clock, ScheduleHandle};
use crate::events::{EventSender, SessionEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Virtual-time clock for hosts that drive time themselves (and for tests).
/// Nothing is delivered until [`ManualClock::advance`] is called.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualState>>,
}

#[derive(Debug, Default)]
struct ManualState {
    now: Duration,
    next_seq: u64,
    entries: Vec<Entry>,
}

#[derive(Debug)]
struct Entry {
    seq: u64,
    due: Duration,
    period: Option<Duration>,
    event: SessionEvent,
    sink: EventSender,
    cancelled: Arc<AtomicBool>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.state().now
    }

    /// Number of schedules that have not been cancelled or completed.
    pub fn scheduled(&self) -> usize {
        self.state()
            .entries
            .iter()
            .filter(|entry| !entry.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Move virtual time forward, delivering every due event in deadline
    /// order. Returns how many events were sent.
    pub fn advance(&self, by: Duration) -> usize {
        let mut state = self.state();
        let target = state.now + by;
        let mut delivered = 0;

        loop {
            state
                .entries
                .retain(|entry| !entry.cancelled.load(Ordering::SeqCst));

            let next = state
                .entries
                .iter()
                .enumerate()
                .filter(|(_, entry)| entry.due <= target)
                .min_by_key(|(_, entry)| (entry.due, entry.seq))
                .map(|(idx, _)| idx);
            let Some(idx) = next else {
                break;
            };

            let (due, period) = {
                let entry = &state.entries[idx];
                let _ = entry.sink.send(entry.event.clone());
                (entry.due, entry.period)
            };
            delivered += 1;

            match period {
                Some(period) => state.entries[idx].due = due + period,
                None => {
                    state.entries.remove(idx);
                }
            }
            state.now = due;
        }

        state.now = target;
        delivered
    }

    pub fn advance_secs(&self, secs: u64) -> usize {
        self.advance(Duration::from_secs(secs))
    }

    fn schedule(
        &self,
        delay: Duration,
        period: Option<Duration>,
        event: SessionEvent,
        sink: EventSender,
    ) -> ScheduleHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut state = self.state();
        let seq = state.next_seq;
        state.next_seq += 1;
        let due = state.now + delay;
        state.entries.push(Entry {
            seq,
            due,
            period,
            event,
            sink,
            cancelled: cancelled.clone(),
        });

        ScheduleHandle::new(move || cancelled.store(true, Ordering::SeqCst))
    }

    fn state(&self) -> MutexGuard<'_, ManualState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for ManualClock {
    fn every(&self, period: Duration, event: SessionEvent, sink: EventSender) -> ScheduleHandle {
        let period = period.max(MIN_PERIOD);
        self.schedule(period, Some(period), event, sink)
    }

    fn after(&self, delay: Duration, event: SessionEvent, sink: EventSender) -> ScheduleHandle {
        self.schedule(delay, None, event, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events;

    fn collect(rx: &mut events::EventReceiver) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[test]
    fn periodic_schedule_fires_once_per_period() {
        let clock = ManualClock::new();
        let (tx, mut rx) = events::channel();
        let _handle = clock.every(
            Duration::from_secs(1),
            SessionEvent::IntroDue { token: 1 },
            tx,
        );

        assert_eq!(clock.advance(Duration::from_millis(999)), 0);
        assert_eq!(clock.advance(Duration::from_millis(1)), 1);
        assert_eq!(clock.advance_secs(4), 4);
        assert_eq!(collect(&mut rx).len(), 5);
        assert_eq!(clock.now(), Duration::from_secs(5));
    }

    #[test]
    fn events_are_delivered_in_deadline_order() {
        let clock = ManualClock::new();
        let (tx, mut rx) = events::channel();
        let _slow = clock.after(
            Duration::from_millis(1500),
            SessionEvent::IntroDue { token: 2 },
            tx.clone(),
        );
        let _fast = clock.every(
            Duration::from_secs(1),
            SessionEvent::IntroDue { token: 1 },
            tx,
        );

        clock.advance_secs(2);
        let tokens: Vec<u64> = collect(&mut rx)
            .into_iter()
            .map(|event| match event {
                SessionEvent::IntroDue { token } => token,
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(tokens, vec![1, 2, 1]);
    }

    #[test]
    fn cancelled_schedules_stop_delivering() {
        let clock = ManualClock::new();
        let (tx, mut rx) = events::channel();
        let handle = clock.every(
            Duration::from_secs(1),
            SessionEvent::IntroDue { token: 3 },
            tx,
        );
        assert_eq!(clock.scheduled(), 1);

        clock.advance_secs(2);
        handle.cancel();
        assert_eq!(clock.scheduled(), 0);
        assert_eq!(clock.advance_secs(10), 0);
        assert_eq!(collect(&mut rx).len(), 2);
    }

    #[test]
    fn one_shot_is_removed_after_delivery() {
        let clock = ManualClock::new();
        let (tx, _rx) = events::channel();
        let _handle = clock.after(
            Duration::from_millis(500),
            SessionEvent::IntroDue { token: 4 },
            tx,
        );

        assert_eq!(clock.advance_secs(1), 1);
        assert_eq!(clock.scheduled(), 0);
    }
}
