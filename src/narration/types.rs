// narration/types.rs - Utterances, speech events and errors

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UtteranceId(pub u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "utterance-{}", self.0)
    }
}

/// How text should be voiced. Backends apply what they can.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoicePreferences {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// Language prefix such as "en".
    pub language: String,
    /// Name fragments that mark a natural-sounding voice.
    pub preferred_names: Vec<String>,
}

impl Default for VoicePreferences {
    fn default() -> Self {
        Self {
            rate: 0.9,
            pitch: 1.0,
            volume: 1.0,
            language: "en".to_string(),
            preferred_names: vec!["Natural".to_string(), "Google".to_string()],
        }
    }
}

/// A voice offered by the host speech engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub name: String,
    pub lang: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub voice: VoicePreferences,
    /// Resolved from the backend's voice list, if it offers one.
    pub voice_name: Option<String>,
}

/// Lifecycle reports a backend sends back for an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Started(UtteranceId),
    Finished(UtteranceId),
    Failed { id: UtteranceId, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    Finished,
    Cancelled,
    Failed(String),
}

/// The single end signal every utterance produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceEnded {
    pub id: UtteranceId,
    pub reason: EndReason,
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("Speech synthesis unavailable")]
    Unavailable,

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),
}
