// session/mod.rs - Cook mode state machine: step position, lifecycle, timers and narration

mod snapshot;
mod wake_lock;

pub use snapshot::{progress_percent, CookModeSnapshot, SessionState};
pub use wake_lock::{NoWakeLock, WakeLock, WakeLockError};

use crate::clock::{Clock, ScheduleHandle};
use crate::config::CookModeConfig;
use crate::duration::extract_suggested_minutes;
use crate::events::{self, EventReceiver, EventSender, SessionEvent};
use crate::narration::{NarrationChannel, SpeechBackend};
use crate::timer::{format_minutes, Timer, TimerError, TimerEvent, TimerId, TimerRegistry};
use std::sync::Arc;
use std::time::Duration;

pub const COMPLETION_MESSAGE: &str =
    "Congratulations! You've completed all the steps. Enjoy your meal!";

/// What the host environment provides to a session.
pub struct HostCapabilities {
    pub speech: Box<dyn SpeechBackend>,
    pub clock: Arc<dyn Clock>,
    pub wake_lock: Box<dyn WakeLock>,
}

impl HostCapabilities {
    pub fn new(speech: Box<dyn SpeechBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            speech,
            clock,
            wake_lock: Box::new(NoWakeLock),
        }
    }

    pub fn with_wake_lock(mut self, wake_lock: Box<dyn WakeLock>) -> Self {
        self.wake_lock = wake_lock;
        self
    }
}

struct PendingIntro {
    token: u64,
    _schedule: ScheduleHandle,
}

pub struct CookSession {
    instructions: Vec<String>,
    state: SessionState,
    current_step: usize,
    suggested_minutes: Option<u32>,
    timers: TimerRegistry,
    narration: NarrationChannel,
    clock: Arc<dyn Clock>,
    wake_lock: Box<dyn WakeLock>,
    wake_lock_held: bool,
    intro: Option<PendingIntro>,
    next_intro: u64,
    intro_delay: Duration,
    quick_timer_minutes: Vec<u32>,
    on_complete: Option<Box<dyn FnMut() + Send>>,
    sink: EventSender,
    inbox: EventReceiver,
}

impl CookSession {
    pub fn new(instructions: Vec<String>, host: HostCapabilities, config: &CookModeConfig) -> Self {
        let (sink, inbox) = events::channel();
        let timers = TimerRegistry::new(host.clock.clone(), sink.clone());
        let mut narration = NarrationChannel::new(host.speech, sink.clone(), config.voice.clone());
        narration.set_enabled(config.voice_enabled);

        let mut session = Self {
            instructions,
            state: SessionState::Idle,
            current_step: 0,
            suggested_minutes: None,
            timers,
            narration,
            clock: host.clock,
            wake_lock: host.wake_lock,
            wake_lock_held: false,
            intro: None,
            next_intro: 1,
            intro_delay: Duration::from_millis(config.intro_delay_ms),
            quick_timer_minutes: config.quick_timer_minutes.clone(),
            on_complete: None,
            sink,
            inbox,
        };
        session.set_step(0);
        session
    }

    /// Called when the user advances past the final step.
    pub fn set_on_complete(&mut self, on_complete: impl FnMut() + Send + 'static) {
        self.on_complete = Some(Box::new(on_complete));
    }

    pub fn start(&mut self) {
        if self.is_active() {
            tracing::debug!("Cook mode already active; start ignored");
            return;
        }
        if self.instructions.is_empty() {
            tracing::debug!("No instructions; start ignored");
            return;
        }

        self.state = SessionState::Active;
        self.set_step(0);
        self.acquire_wake_lock();

        let token = self.next_intro;
        self.next_intro += 1;
        let schedule = self
            .clock
            .after(self.intro_delay, SessionEvent::IntroDue { token }, self.sink.clone());
        self.intro = Some(PendingIntro {
            token,
            _schedule: schedule,
        });

        tracing::info!("Cook mode started ({} steps)", self.instructions.len());
    }

    /// Return to Idle at step 0 with no timers and silent narration. Nothing
    /// scheduled before this call changes state afterwards.
    pub fn exit(&mut self) {
        let was_active = self.is_active();
        self.state = SessionState::Idle;
        self.set_step(0);
        self.intro = None;

        let cleared = self.timers.clear();
        if let Some(ended) = self.narration.stop() {
            tracing::debug!("Silenced {} on exit", ended.id);
        }
        self.release_wake_lock();

        if was_active {
            tracing::info!("Cook mode exited ({} timers cleared)", cleared);
        }
    }

    /// Report completion, then exit.
    pub fn finish(&mut self) {
        if !self.is_active() {
            tracing::debug!("Cook mode not active; finish ignored");
            return;
        }
        self.notify_complete();
        self.exit();
    }

    /// Swap in another recipe's steps. The session is fully reset first.
    pub fn replace_instructions(&mut self, instructions: Vec<String>) {
        self.exit();
        self.instructions = instructions;
        self.set_step(0);
        tracing::debug!("Instructions replaced ({} steps)", self.instructions.len());
    }

    pub fn go_to_step(&mut self, step: usize) {
        if !self.is_active() || step >= self.instructions.len() {
            tracing::debug!("Step {} not reachable; ignored", step);
            return;
        }
        self.set_step(step);
        self.say(&self.step_announcement(""));
    }

    pub fn next(&mut self) {
        if !self.is_active() {
            return;
        }
        if self.current_step + 1 < self.instructions.len() {
            self.set_step(self.current_step + 1);
            self.say(&self.step_announcement(""));
        } else {
            self.say(COMPLETION_MESSAGE);
            self.notify_complete();
        }
    }

    pub fn previous(&mut self) {
        if !self.is_active() || self.current_step == 0 {
            return;
        }
        self.set_step(self.current_step - 1);
        self.say(&self.step_announcement("Going back. "));
    }

    pub fn repeat(&mut self) {
        if !self.is_active() {
            return;
        }
        self.say(&self.step_announcement(""));
    }

    /// Does not silence an utterance in flight; pair with
    /// [`stop_speaking`](Self::stop_speaking) for that.
    pub fn set_voice_enabled(&mut self, enabled: bool) {
        self.narration.set_enabled(enabled);
        tracing::info!("Voice {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn stop_speaking(&mut self) {
        self.narration.stop();
    }

    pub fn create_timer(&mut self, minutes: f64, label: Option<&str>) -> Result<TimerId, TimerError> {
        let id = self.timers.create(minutes, label)?;
        self.say(&format!("Timer set for {} minutes", format_minutes(minutes)));
        Ok(id)
    }

    /// Start a timer for the current step's suggested duration, if any.
    pub fn accept_suggested_timer(&mut self) -> Option<TimerId> {
        let minutes = self.suggested_minutes?;
        let label = format!("Step {}", self.current_step + 1);
        match self.create_timer(f64::from(minutes), Some(label.as_str())) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::debug!("Suggested timer rejected: {}", e);
                None
            }
        }
    }

    pub fn remove_timer(&mut self, id: TimerId) -> bool {
        self.timers.remove(id)
    }

    pub fn toggle_timer(&mut self, id: TimerId) -> Option<bool> {
        self.timers.toggle(id)
    }

    /// Apply one asynchronous event. Returns the timer event it produced, if any.
    pub fn handle_event(&mut self, event: SessionEvent) -> Option<TimerEvent> {
        match event {
            SessionEvent::TimerTick { timer, run } => {
                let fired = self.timers.on_tick(timer, run)?;
                self.say(&fired.announcement());
                Some(fired)
            }
            SessionEvent::IntroDue { token } => {
                self.on_intro_due(token);
                None
            }
            SessionEvent::Speech(speech) => {
                if let Some(ended) = self.narration.handle(speech) {
                    tracing::debug!("{} ended: {:?}", ended.id, ended.reason);
                }
                None
            }
        }
    }

    /// Apply everything already queued without waiting.
    pub fn pump(&mut self) -> Vec<TimerEvent> {
        let mut fired = Vec::new();
        while let Ok(event) = self.inbox.try_recv() {
            fired.extend(self.handle_event(event));
        }
        fired
    }

    /// Wait for the next event and apply it.
    pub async fn process_next(&mut self) -> Option<TimerEvent> {
        let event = self.inbox.recv().await?;
        self.handle_event(event)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.instructions.len()
    }

    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    pub fn current_instruction(&self) -> Option<&str> {
        self.instructions.get(self.current_step).map(String::as_str)
    }

    pub fn suggested_minutes(&self) -> Option<u32> {
        self.suggested_minutes
    }

    pub fn is_speaking(&self) -> bool {
        self.narration.is_speaking()
    }

    pub fn voice_enabled(&self) -> bool {
        self.narration.is_enabled()
    }

    pub fn timers(&self) -> Vec<Timer> {
        self.timers.timers()
    }

    pub fn timer(&self, id: TimerId) -> Option<&Timer> {
        self.timers.get(id)
    }

    pub fn quick_timer_presets(&self) -> &[u32] {
        &self.quick_timer_minutes
    }

    pub fn snapshot(&self) -> CookModeSnapshot {
        CookModeSnapshot {
            state: self.state,
            is_active: self.is_active(),
            current_step_index: self.current_step,
            total_steps: self.total_steps(),
            current_instruction: self.current_instruction().map(str::to_string),
            progress_percent: progress_percent(self.current_step, self.total_steps()),
            is_speaking: self.is_speaking(),
            voice_enabled: self.voice_enabled(),
            suggested_minutes: self.suggested_minutes,
            timers: self.timers(),
        }
    }

    fn set_step(&mut self, step: usize) {
        self.current_step = step;
        self.suggested_minutes = self
            .instructions
            .get(step)
            .and_then(|text| extract_suggested_minutes(text))
            .filter(|minutes| *minutes > 0);
    }

    fn step_announcement(&self, prefix: &str) -> String {
        format!(
            "{}Step {}: {}",
            prefix,
            self.current_step + 1,
            self.current_instruction().unwrap_or_default()
        )
    }

    fn say(&mut self, text: &str) {
        if let Some(ended) = self.narration.speak(text) {
            tracing::debug!("{} superseded", ended.id);
        }
    }

    fn on_intro_due(&mut self, token: u64) {
        if self.intro.as_ref().map(|intro| intro.token) != Some(token) {
            tracing::debug!("Stale intro {} ignored", token);
            return;
        }
        self.intro = None;
        if let Some(first) = self.instructions.first() {
            let text = format!("Let's start cooking! Step 1: {}", first);
            self.say(&text);
        }
    }

    fn notify_complete(&mut self) {
        tracing::info!("All {} steps completed", self.instructions.len());
        if let Some(on_complete) = self.on_complete.as_mut() {
            on_complete();
        }
    }

    fn acquire_wake_lock(&mut self) {
        match self.wake_lock.acquire() {
            Ok(()) => self.wake_lock_held = true,
            Err(e) => tracing::warn!("Wake lock not available: {}", e),
        }
    }

    fn release_wake_lock(&mut self) {
        if self.wake_lock_held {
            self.wake_lock.release();
            self.wake_lock_held = false;
        }
    }
}

impl Drop for CookSession {
    fn drop(&mut self) {
        self.release_wake_lock();
    }
}
