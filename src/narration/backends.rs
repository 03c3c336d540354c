use super::types::{SpeechError, SpeechEvent, Utterance, UtteranceId, VoiceInfo};
use super::SpeechBackend;
use crate::events::{EventSender, SessionEvent};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Host without speech output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSpeech;

impl SpeechBackend for NullSpeech {
    fn is_available(&self) -> bool {
        false
    }

    fn speak(&mut self, _utterance: &Utterance, _sink: EventSender) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable)
    }

    fn cancel(&mut self) {}
}

/// Backend that records what it was asked to say. Utterances start at once
/// and finish only when told to through the paired [`SpeechLog`].
#[derive(Debug)]
pub struct RecordingSpeech {
    log: SpeechLog,
    voices: Vec<VoiceInfo>,
}

impl RecordingSpeech {
    pub fn new() -> (Self, SpeechLog) {
        let log = SpeechLog::default();
        let backend = Self {
            log: log.clone(),
            voices: Vec::new(),
        };
        (backend, log)
    }

    pub fn with_voices(mut self, voices: Vec<VoiceInfo>) -> Self {
        self.voices = voices;
        self
    }
}

impl SpeechBackend for RecordingSpeech {
    fn voices(&self) -> Vec<VoiceInfo> {
        self.voices.clone()
    }

    fn speak(&mut self, utterance: &Utterance, sink: EventSender) -> Result<(), SpeechError> {
        let mut state = self.log.state();
        state.spoken.push(utterance.clone());
        let _ = sink.send(SessionEvent::Speech(SpeechEvent::Started(utterance.id)));
        state.current = Some((utterance.id, sink));
        Ok(())
    }

    fn cancel(&mut self) {
        let mut state = self.log.state();
        if state.current.take().is_some() {
            state.cancels += 1;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpeechLog {
    inner: Arc<Mutex<LogState>>,
}

#[derive(Debug, Default)]
struct LogState {
    spoken: Vec<Utterance>,
    cancels: usize,
    current: Option<(UtteranceId, EventSender)>,
}

impl SpeechLog {
    pub fn spoken(&self) -> Vec<String> {
        self.state()
            .spoken
            .iter()
            .map(|utterance| utterance.text.clone())
            .collect()
    }

    pub fn utterances(&self) -> Vec<Utterance> {
        self.state().spoken.clone()
    }

    pub fn last(&self) -> Option<String> {
        self.state()
            .spoken
            .last()
            .map(|utterance| utterance.text.clone())
    }

    /// How many in-flight utterances were cut off.
    pub fn cancel_count(&self) -> usize {
        self.state().cancels
    }

    pub fn current(&self) -> Option<UtteranceId> {
        self.state().current.as_ref().map(|(id, _)| *id)
    }

    /// Report natural completion of the in-flight utterance.
    pub fn finish_current(&self) -> bool {
        self.end_current(|id| SpeechEvent::Finished(id))
    }

    /// Report a synthesis error for the in-flight utterance.
    pub fn fail_current(&self, reason: &str) -> bool {
        self.end_current(|id| SpeechEvent::Failed {
            id,
            reason: reason.to_string(),
        })
    }

    pub fn clear(&self) {
        let mut state = self.state();
        state.spoken.clear();
        state.cancels = 0;
    }

    fn end_current(&self, event: impl FnOnce(UtteranceId) -> SpeechEvent) -> bool {
        let Some((id, sink)) = self.state().current.take() else {
            return false;
        };
        sink.send(SessionEvent::Speech(event(id))).is_ok()
    }

    fn state(&self) -> MutexGuard<'_, LogState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
