// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod attempt;
pub mod capture;
pub mod config;
pub mod export;
pub mod keystroke;
pub mod metrics;
pub mod runtime;
pub mod session;
pub mod store;
pub mod texts;

/// Countdown resolution for timed attempts
pub const TICK_RATE_MS: u64 = 100;
