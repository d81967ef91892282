use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// One recorded key press/release pair with timing and correctness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeystrokeEvent {
    /// The character that was typed
    pub key: char,
    /// Key-down timestamp, epoch milliseconds
    pub pressed_at_ms: f64,
    /// Key-up timestamp; `None` when the terminal never reported the release
    pub released_at_ms: Option<f64>,
    /// Hold duration; `None` exactly when the release was not captured
    pub duration_ms: Option<f64>,
    /// Whether the key matched the expected reference character at press time
    pub correct: bool,
    /// Character index in the reference text the press was compared against
    pub index: usize,
}

impl KeystrokeEvent {
    /// A freshly pressed key with no release recorded yet
    pub fn pressed(key: char, at_ms: f64, correct: bool, index: usize) -> Self {
        Self {
            key,
            pressed_at_ms: at_ms,
            released_at_ms: None,
            duration_ms: None,
            correct,
            index,
        }
    }

    /// Record the key-up for this event. A release timestamp earlier than the
    /// press (clock adjustment mid-hold) yields a zero duration.
    pub fn release(&mut self, at_ms: f64) {
        self.released_at_ms = Some(at_ms);
        self.duration_ms = Some((at_ms - self.pressed_at_ms).max(0.0));
    }

    pub fn is_released(&self) -> bool {
        self.released_at_ms.is_some()
    }
}

/// Current wall-clock time in epoch milliseconds
pub fn epoch_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
        * 1000.0
}
