use crate::keystroke::KeystrokeEvent;
use serde::{Deserialize, Serialize};

/// Words per minute using the 5-characters-per-word convention.
/// Returns 0 for a zero-length window instead of dividing by it.
pub fn words_per_minute(char_count: usize, duration_ms: f64) -> u32 {
    if duration_ms <= 0.0 {
        return 0;
    }
    let words = char_count as f64 / 5.0;
    let minutes = duration_ms / 60000.0;
    (words / minutes).round() as u32
}

/// Position-wise accuracy percentage.
///
/// The denominator is the length of the TYPED text, not the comparison
/// length: typing past the end of the reference lowers the score even when
/// the shared prefix matches perfectly. Historical sessions were scored this
/// way, so it stays.
pub fn accuracy(typed: &str, reference: &str) -> u32 {
    let typed_len = typed.chars().count();
    if typed_len == 0 {
        return 100;
    }
    let matches = typed
        .chars()
        .zip(reference.chars())
        .filter(|(t, r)| t == r)
        .count();
    ((matches as f64 / typed_len as f64) * 100.0).round() as u32
}

pub fn error_rate(typed: &str, reference: &str) -> u32 {
    100 - accuracy(typed, reference)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DurationStats {
    pub mean_ms: u64,
    pub std_dev_ms: u64,
}

/// Mean and population standard deviation of keystroke hold durations.
///
/// Events without a captured release are skipped; both fields are 0 when no
/// timed events remain. Every intermediate is rounded to a whole number of
/// milliseconds before the next stage uses it (mean before variance,
/// variance before the square root). Recorded sessions must reproduce their
/// stored numbers exactly, so the quantization is part of the contract.
pub fn duration_stats(events: &[KeystrokeEvent]) -> DurationStats {
    let durations: Vec<f64> = events.iter().filter_map(|e| e.duration_ms).collect();
    if durations.is_empty() {
        return DurationStats::default();
    }
    let count = durations.len() as f64;
    let mean = (durations.iter().sum::<f64>() / count).round();
    let variance = (durations
        .iter()
        .map(|d| {
            let diff = d - mean;
            diff * diff
        })
        .sum::<f64>()
        / count)
        .round();
    DurationStats {
        mean_ms: mean as u64,
        std_dev_ms: variance.sqrt().round() as u64,
    }
}

/// 0-100 motor-variability score from the coefficient of variation of hold
/// durations. The x2 scaling and the clamp at 100 are fixed calibration
/// constants.
pub fn tremor_score(events: &[KeystrokeEvent]) -> u32 {
    let stats = duration_stats(events);
    if stats.mean_ms == 0 {
        return 0;
    }
    let coefficient_of_variation = (stats.std_dev_ms as f64 / stats.mean_ms as f64) * 100.0;
    ((coefficient_of_variation * 2.0).round() as u32).min(100)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FatigueAnalysis {
    pub detected: bool,
    /// Percentage decline in throughput, clamped at 0 below (speeding up is
    /// not negative fatigue). No upper bound.
    pub score: u32,
    pub early_wpm: u32,
    pub late_wpm: u32,
}

/// Compares keystroke throughput between the first and last third of the
/// attempt window. The middle third belongs to neither group, which keeps
/// the early and late samples well separated.
///
/// Returns the zeroed result below 10 events, or when either group is empty.
/// Group WPM uses the group's keystroke count as the character-count proxy.
pub fn fatigue_analysis(events: &[KeystrokeEvent], start_ms: f64, end_ms: f64) -> FatigueAnalysis {
    if events.len() < 10 {
        return FatigueAnalysis::default();
    }

    let third_ms = (end_ms - start_ms) / 3.0;
    let first_third_end = start_ms + third_ms;
    let last_third_start = end_ms - third_ms;

    let early = events
        .iter()
        .filter(|e| e.pressed_at_ms < first_third_end)
        .count();
    let late = events
        .iter()
        .filter(|e| e.pressed_at_ms > last_third_start)
        .count();

    if early == 0 || late == 0 {
        return FatigueAnalysis::default();
    }

    let early_wpm = words_per_minute(early, third_ms);
    let late_wpm = words_per_minute(late, third_ms);

    let decline = if early_wpm > 0 {
        (early_wpm as f64 - late_wpm as f64) / early_wpm as f64 * 100.0
    } else {
        0.0
    };

    FatigueAnalysis {
        detected: decline > 20.0,
        score: decline.round().max(0.0) as u32,
        early_wpm,
        late_wpm,
    }
}

/// The derived numbers persisted with every session. Integer-valued after
/// rounding; never recomputed once stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub wpm: u32,
    pub accuracy: u32,
    pub error_rate: u32,
    pub total_keystrokes: usize,
    pub correct_keystrokes: usize,
    pub incorrect_keystrokes: usize,
    pub mean_keystroke_ms: u64,
    pub keystroke_std_dev_ms: u64,
    pub tremor_score: u32,
    pub fatigue_detected: bool,
    pub fatigue_score: u32,
}

impl PerformanceMetrics {
    /// Assembles the full record from a finished timeline. Field assembly
    /// only; all arithmetic lives in the functions above.
    pub fn compute(
        typed: &str,
        reference: &str,
        events: &[KeystrokeEvent],
        start_ms: f64,
        end_ms: f64,
    ) -> Self {
        let stats = duration_stats(events);
        let fatigue = fatigue_analysis(events, start_ms, end_ms);
        let correct = events.iter().filter(|e| e.correct).count();

        Self {
            wpm: words_per_minute(typed.chars().count(), end_ms - start_ms),
            accuracy: accuracy(typed, reference),
            error_rate: error_rate(typed, reference),
            total_keystrokes: events.len(),
            correct_keystrokes: correct,
            incorrect_keystrokes: events.len() - correct,
            mean_keystroke_ms: stats.mean_ms,
            keystroke_std_dev_ms: stats.std_dev_ms,
            tremor_score: tremor_score(events),
            fatigue_detected: fatigue.detected,
            fatigue_score: fatigue.score,
        }
    }
}
