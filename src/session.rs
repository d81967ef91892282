use crate::keystroke::KeystrokeEvent;
use crate::metrics::PerformanceMetrics;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One completed typing attempt, as persisted and exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingSession {
    pub id: Uuid,
    pub started_at: DateTime<Local>,
    pub duration_ms: u64,
    pub reference: String,
    pub typed: String,
    pub events: Vec<KeystrokeEvent>,
    pub metrics: PerformanceMetrics,
}

impl TypingSession {
    /// First 8 hex digits of the id, enough to address a session from the CLI
    pub fn short_id(&self) -> String {
        self.id.to_string().chars().take(8).collect()
    }

    pub fn duration_secs(&self) -> u64 {
        (self.duration_ms as f64 / 1000.0).round() as u64
    }
}

impl fmt::Display for TypingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metrics;
        writeln!(
            f,
            "session {}  {}",
            self.short_id(),
            self.started_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(f, "  duration     {}s", self.duration_secs())?;
        writeln!(f, "  wpm          {}", m.wpm)?;
        writeln!(
            f,
            "  accuracy     {}%  (error rate {}%)",
            m.accuracy, m.error_rate
        )?;
        writeln!(
            f,
            "  keystrokes   {}  ({} correct, {} incorrect)",
            m.total_keystrokes, m.correct_keystrokes, m.incorrect_keystrokes
        )?;
        writeln!(
            f,
            "  hold time    {} ms mean, {} ms std dev",
            m.mean_keystroke_ms, m.keystroke_std_dev_ms
        )?;
        writeln!(f, "  tremor       {}/100", m.tremor_score)?;
        if m.fatigue_detected {
            write!(f, "  fatigue      detected ({}% decline)", m.fatigue_score)
        } else {
            write!(f, "  fatigue      none ({}% decline)", m.fatigue_score)
        }
    }
}
