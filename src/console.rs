// console.rs - Terminal speech backend: prints utterances and paces them like speech

use crate::events::{EventSender, SessionEvent};
use crate::narration::{SpeechBackend, SpeechError, SpeechEvent, Utterance};
use std::io::Write;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

const WORDS_PER_MINUTE: f32 = 160.0;
const MIN_UTTERANCE: Duration = Duration::from_millis(300);

pub struct ConsoleSpeech {
    runtime: Handle,
    speaking: Option<JoinHandle<()>>,
}

impl ConsoleSpeech {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            speaking: None,
        }
    }
}

impl SpeechBackend for ConsoleSpeech {
    fn speak(&mut self, utterance: &Utterance, sink: EventSender) -> Result<(), SpeechError> {
        self.cancel();

        let mut out = std::io::stdout().lock();
        writeln!(out, "  >> {}", utterance.text)
            .and_then(|_| out.flush())
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?;

        let id = utterance.id;
        let _ = sink.send(SessionEvent::Speech(SpeechEvent::Started(id)));
        let length = speaking_time(&utterance.text, utterance.voice.rate);
        self.speaking = Some(self.runtime.spawn(async move {
            tokio::time::sleep(length).await;
            let _ = sink.send(SessionEvent::Speech(SpeechEvent::Finished(id)));
        }));
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(task) = self.speaking.take() {
            task.abort();
        }
    }
}

impl Drop for ConsoleSpeech {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Rough time to read `text` aloud at `rate` (1.0 = normal pace).
pub fn speaking_time(text: &str, rate: f32) -> Duration {
    let words = text.split_whitespace().count() as f32;
    let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
    let secs = words * 60.0 / (WORDS_PER_MINUTE * rate);
    Duration::from_secs_f32(secs).max(MIN_UTTERANCE)
}
