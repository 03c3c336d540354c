// narration/mod.rs - Single-slot speech output for cook mode

mod backends;
mod types;
mod voice;

pub use backends::{NullSpeech, RecordingSpeech, SpeechLog};
pub use types::{
    EndReason, SpeechError, SpeechEvent, Utterance, UtteranceEnded, UtteranceId, VoiceInfo,
    VoicePreferences,
};
pub use voice::select_voice;

use crate::events::EventSender;

/// Host text-to-speech capability
pub trait SpeechBackend: Send {
    fn is_available(&self) -> bool {
        true
    }

    /// Voices the engine offers, used for preference matching.
    fn voices(&self) -> Vec<VoiceInfo> {
        Vec::new()
    }

    /// Begin voicing `utterance` and return at once. Progress is reported as
    /// [`SpeechEvent`]s through `sink`.
    fn speak(&mut self, utterance: &Utterance, sink: EventSender) -> Result<(), SpeechError>;

    /// Silence whatever is being voiced.
    fn cancel(&mut self);
}

/// At most one utterance in flight; a new one always supersedes the old.
pub struct NarrationChannel {
    backend: Box<dyn SpeechBackend>,
    sink: EventSender,
    voice: VoicePreferences,
    enabled: bool,
    current: Option<UtteranceId>,
    speaking: bool,
    next_id: u64,
}

impl NarrationChannel {
    pub fn new(backend: Box<dyn SpeechBackend>, sink: EventSender, voice: VoicePreferences) -> Self {
        Self {
            backend,
            sink,
            voice,
            enabled: true,
            current: None,
            speaking: false,
            next_id: 1,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Does not silence an utterance already in flight; call [`stop`](Self::stop) for that.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    pub fn current(&self) -> Option<UtteranceId> {
        self.current
    }

    /// Voice `text`, cutting off anything in flight. Returns the end record of
    /// the superseded utterance, if there was one.
    pub fn speak(&mut self, text: &str) -> Option<UtteranceEnded> {
        if !self.enabled {
            tracing::debug!("Narration disabled; skipped: {}", text);
            return None;
        }
        if !self.backend.is_available() {
            tracing::debug!("No speech capability; skipped: {}", text);
            return None;
        }

        let superseded = self.cancel_current();

        let id = UtteranceId(self.next_id);
        self.next_id += 1;
        let voice_name = select_voice(&self.backend.voices(), &self.voice).map(|v| v.name.clone());
        let utterance = Utterance {
            id,
            text: text.to_string(),
            voice: self.voice.clone(),
            voice_name,
        };

        match self.backend.speak(&utterance, self.sink.clone()) {
            Ok(()) => {
                tracing::debug!("Speaking {}: {}", id, text);
                self.current = Some(id);
            }
            Err(e) => {
                tracing::warn!("Speech failed for {}: {}", id, e);
                self.speaking = false;
            }
        }

        superseded
    }

    /// Silence the channel. Safe when idle.
    pub fn stop(&mut self) -> Option<UtteranceEnded> {
        let ended = self.cancel_current();
        self.speaking = false;
        ended
    }

    /// Apply a backend report. Reports for anything but the current utterance
    /// are ignored.
    pub fn handle(&mut self, event: SpeechEvent) -> Option<UtteranceEnded> {
        match event {
            SpeechEvent::Started(id) if self.current == Some(id) => {
                self.speaking = true;
                None
            }
            SpeechEvent::Finished(id) if self.current == Some(id) => {
                self.current = None;
                self.speaking = false;
                Some(UtteranceEnded {
                    id,
                    reason: EndReason::Finished,
                })
            }
            SpeechEvent::Failed { id, reason } if self.current == Some(id) => {
                tracing::warn!("Speech error on {}: {}", id, reason);
                self.current = None;
                self.speaking = false;
                Some(UtteranceEnded {
                    id,
                    reason: EndReason::Failed(reason),
                })
            }
            other => {
                tracing::debug!("Stale speech event ignored: {:?}", other);
                None
            }
        }
    }

    fn cancel_current(&mut self) -> Option<UtteranceEnded> {
        let id = self.current.take()?;
        self.backend.cancel();
        self.speaking = false;
        Some(UtteranceEnded {
            id,
            reason: EndReason::Cancelled,
        })
    }
}
