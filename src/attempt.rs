use crate::keystroke::{epoch_ms, KeystrokeEvent};
use crate::metrics::PerformanceMetrics;
use crate::session::TypingSession;
use crate::TICK_RATE_MS;
use chrono::{DateTime, Local};
use uuid::Uuid;

/// An in-progress typing test.
///
/// The timeline is append-only: one event per physical keypress, never
/// removed. Backspace edits the typed buffer but leaves the timeline intact,
/// so mistakes that were corrected still count against the keystroke tally.
#[derive(Debug)]
pub struct Attempt {
    reference: String,
    typed: String,
    events: Vec<KeystrokeEvent>,
    started_at: Option<DateTime<Local>>,
    started_at_ms: Option<f64>,
    seconds_remaining: Option<f64>,
}

impl Attempt {
    pub fn new(reference: String, number_of_secs: Option<f64>) -> Self {
        Self {
            reference,
            typed: String::new(),
            events: vec![],
            started_at: None,
            started_at_ms: None,
            seconds_remaining: number_of_secs,
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn events(&self) -> &[KeystrokeEvent] {
        &self.events
    }

    pub fn seconds_remaining(&self) -> Option<f64> {
        self.seconds_remaining
    }

    /// Records a keypress and appends to the typed buffer. The first press
    /// starts the clock. Returns whether the key matched the reference
    /// character at the current position; positions past the end of the
    /// reference are incorrect.
    pub fn press(&mut self, c: char) -> bool {
        if self.started_at_ms.is_none() {
            self.started_at = Some(Local::now());
            self.started_at_ms = Some(epoch_ms());
        }

        let index = self.typed.chars().count();
        let correct = self.reference.chars().nth(index) == Some(c);
        self.events
            .push(KeystrokeEvent::pressed(c, epoch_ms(), correct, index));
        self.typed.push(c);
        correct
    }

    /// Records the key-up for the most recent unreleased press of `c`.
    /// Releases with no matching press are ignored; terminals without the
    /// keyboard enhancement protocol never deliver them at all.
    pub fn release(&mut self, c: char) {
        if let Some(event) = self
            .events
            .iter_mut()
            .rev()
            .find(|e| e.key == c && !e.is_released())
        {
            event.release(epoch_ms());
        }
    }

    /// Pops the last typed character. The timeline keeps its event. Returns
    /// whether anything was removed.
    pub fn backspace(&mut self) -> bool {
        self.typed.pop().is_some()
    }

    pub fn on_tick(&mut self) {
        if let Some(remaining) = self.seconds_remaining {
            self.seconds_remaining = Some(remaining - (TICK_RATE_MS as f64 / 1000.0));
        }
    }

    pub fn has_started(&self) -> bool {
        self.started_at_ms.is_some()
    }

    pub fn has_finished(&self) -> bool {
        self.typed.chars().count() >= self.reference.chars().count()
            || self.seconds_remaining.is_some_and(|s| s <= 0.0)
    }

    /// Freezes the attempt window, derives the metrics and produces the
    /// session record. An attempt with no keypresses gets a zero-length
    /// window and the engine's documented zero defaults.
    pub fn finish(self) -> TypingSession {
        let end_ms = epoch_ms();
        let start_ms = self.started_at_ms.unwrap_or(end_ms);
        let metrics =
            PerformanceMetrics::compute(&self.typed, &self.reference, &self.events, start_ms, end_ms);

        TypingSession {
            id: Uuid::new_v4(),
            started_at: self.started_at.unwrap_or_else(Local::now),
            duration_ms: (end_ms - start_ms).max(0.0).round() as u64,
            reference: self.reference,
            typed: self.typed,
            events: self.events,
            metrics,
        }
    }
}
