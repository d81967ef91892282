use crate::attempt::Attempt;
use crate::runtime::{CaptureEvent, CaptureEventSource, Runner, Ticker};
use crossterm::style::Stylize;
use std::io::{self, Write};

/// How a capture loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The reference was typed through, or the timer ran out
    Completed,
    /// Esc, Ctrl+C, or a dead event source; nothing should be saved
    Aborted,
}

/// Drives an [`Attempt`] from a [`Runner`] until it finishes or is aborted.
///
/// Presses append to the timeline with a colored inline echo, releases fill
/// hold durations, backspace erases the last echoed character, ticks advance
/// the countdown. A closed event source aborts: input can never arrive
/// again, so waiting on would-be keystrokes is pointless. Output goes to any
/// writer, so tests run this without a terminal. The caller owns raw mode
/// and keyboard enhancement state.
pub fn run_capture<E, T, W>(
    runner: &Runner<E, T>,
    attempt: &mut Attempt,
    out: &mut W,
) -> io::Result<CaptureOutcome>
where
    E: CaptureEventSource,
    T: Ticker,
    W: Write,
{
    loop {
        match runner.step() {
            CaptureEvent::Tick => {
                if attempt.has_started() && !attempt.has_finished() {
                    attempt.on_tick();
                    if attempt.has_finished() {
                        return Ok(CaptureOutcome::Completed);
                    }
                }
            }
            CaptureEvent::Press(c) => {
                let correct = attempt.press(c);
                if correct {
                    write!(out, "{}", c.green())?;
                } else {
                    write!(out, "{}", c.red())?;
                }
                out.flush()?;
                if attempt.has_finished() {
                    return Ok(CaptureOutcome::Completed);
                }
            }
            CaptureEvent::Release(c) => attempt.release(c),
            CaptureEvent::Backspace => {
                if attempt.backspace() {
                    write!(out, "\u{8} \u{8}")?;
                    out.flush()?;
                }
            }
            CaptureEvent::Abort => return Ok(CaptureOutcome::Aborted),
            CaptureEvent::Closed => return Ok(CaptureOutcome::Aborted),
        }
    }
}
