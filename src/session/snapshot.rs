use crate::timer::Timer;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Idle,
    Active,
}

/// Read model handed to a rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CookModeSnapshot {
    pub state: SessionState,
    pub is_active: bool,
    pub current_step_index: usize,
    pub total_steps: usize,
    pub current_instruction: Option<String>,
    pub progress_percent: f64,
    pub is_speaking: bool,
    pub voice_enabled: bool,
    pub suggested_minutes: Option<u32>,
    pub timers: Vec<Timer>,
}

pub fn progress_percent(current_step_index: usize, total_steps: usize) -> f64 {
    if total_steps == 0 {
        return 0.0;
    }
    (current_step_index + 1) as f64 / total_steps as f64 * 100.0
}
