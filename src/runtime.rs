use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What the capture loop consumes: terminal input decoded down to the
/// actions a typing attempt understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureEvent {
    /// A printable key went down
    Press(char),
    /// A printable key came back up; only terminals with the keyboard
    /// enhancement protocol report these
    Release(char),
    Backspace,
    /// Esc or Ctrl+C
    Abort,
    Tick,
    /// The event source is gone; no further input will ever arrive
    Closed,
}

/// Decodes one raw key event, or None for input an attempt has no use for:
/// control chords, navigation keys, and auto-repeat (which is not a
/// physical keypress and must not enter the timeline).
pub fn decode_key(key: KeyEvent) -> Option<CaptureEvent> {
    match key.kind {
        KeyEventKind::Press => match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(CaptureEvent::Abort)
            }
            KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => None,
            KeyCode::Char(c) => Some(CaptureEvent::Press(c)),
            KeyCode::Backspace => Some(CaptureEvent::Backspace),
            KeyCode::Esc => Some(CaptureEvent::Abort),
            _ => None,
        },
        KeyEventKind::Release => match key.code {
            KeyCode::Char(c) => Some(CaptureEvent::Release(c)),
            _ => None,
        },
        KeyEventKind::Repeat => None,
    }
}

/// Source of decoded capture events
pub trait CaptureEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<CaptureEvent, RecvTimeoutError>;
}

/// Production event source: a reader thread that drains crossterm and
/// forwards the decoded events. Everything else (resize, focus, mouse) is
/// dropped here so the capture loop never sees it.
pub struct CrosstermEventSource {
    rx: Receiver<CaptureEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if let Some(ev) = decode_key(key) {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<CaptureEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<CaptureEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<CaptureEvent>) -> Self {
        Self { rx }
    }
}

impl CaptureEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<CaptureEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the capture loop one event at a time
pub struct Runner<E: CaptureEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: CaptureEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to the tick interval and returns the next event: Tick on
    /// timeout, Closed once the source has hung up.
    pub fn step(&self) -> CaptureEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => CaptureEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => CaptureEvent::Closed,
        }
    }
}
