use crate::narration::VoicePreferences;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "cook-mode.json";
pub const DEFAULT_INTRO_DELAY_MS: u64 = 500;
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_QUICK_TIMERS: [u32; 7] = [1, 3, 5, 10, 15, 20, 30];

pub const ENV_VOICE: &str = "COOK_MODE_VOICE";
pub const ENV_INTRO_DELAY_MS: &str = "COOK_MODE_INTRO_DELAY_MS";
pub const ENV_SPEECH_RATE: &str = "COOK_MODE_SPEECH_RATE";
pub const ENV_VOICE_LANG: &str = "COOK_MODE_VOICE_LANG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookModeConfig {
    pub voice_enabled: bool,
    pub intro_delay_ms: u64,
    pub voice: VoicePreferences,
    pub quick_timer_minutes: Vec<u32>,
}

impl Default for CookModeConfig {
    fn default() -> Self {
        Self {
            voice_enabled: true,
            intro_delay_ms: DEFAULT_INTRO_DELAY_MS,
            voice: VoicePreferences::default(),
            quick_timer_minutes: DEFAULT_QUICK_TIMERS.to_vec(),
        }
    }
}

impl CookModeConfig {
    /// Read `path`, writing defaults if it does not exist. An unparseable
    /// file is kept as `<name>.json.bak` and replaced with defaults.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            save_raw(path, &config)?;
            tracing::info!("Created default config at {}", path.display());
            return Ok(config);
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match serde_json::from_str::<CookModeConfig>(&raw) {
            Ok(mut config) => {
                config.normalize();
                Ok(config)
            }
            Err(e) => {
                let backup = path.with_extension("json.bak");
                tracing::warn!(
                    "Invalid config {} ({}); backing up to {}",
                    path.display(),
                    e,
                    backup.display()
                );
                let _ = fs::copy(path, backup);
                let config = Self::default();
                save_raw(path, &config)?;
                Ok(config)
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        save_raw(path, self)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
        self.normalize();
    }

    /// Unparseable values are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(voice) = lookup(ENV_VOICE).and_then(|v| parse_switch(&v)) {
            self.voice_enabled = voice;
        }
        if let Some(delay) = lookup(ENV_INTRO_DELAY_MS).and_then(|v| v.trim().parse().ok()) {
            self.intro_delay_ms = delay;
        }
        if let Some(rate) = lookup(ENV_SPEECH_RATE).and_then(|v| v.trim().parse().ok()) {
            self.voice.rate = rate;
        }
        if let Some(lang) = lookup(ENV_VOICE_LANG) {
            self.voice.language = lang;
        }
    }

    pub fn normalize(&mut self) {
        self.voice.rate = clamp_or(self.voice.rate, 0.1, 10.0, 0.9);
        self.voice.pitch = clamp_or(self.voice.pitch, 0.0, 2.0, 1.0);
        self.voice.volume = clamp_or(self.voice.volume, 0.0, 1.0, 1.0);
        self.voice.language = normalize_language(&self.voice.language);

        self.quick_timer_minutes.retain(|minutes| *minutes > 0);
        self.quick_timer_minutes.sort_unstable();
        self.quick_timer_minutes.dedup();
    }
}

pub fn normalize_language(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        DEFAULT_LANGUAGE.to_string()
    } else {
        trimmed.to_string()
    }
}

fn parse_switch(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

fn save_raw(path: &Path, config: &CookModeConfig) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(config)?;
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, json).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
