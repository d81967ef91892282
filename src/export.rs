use crate::session::TypingSession;
use csv::WriterBuilder;
use serde::Serialize;
use std::io::{self, Write};

/// The fixed CSV schema. Column order is part of the format; downstream
/// spreadsheets key on it.
const CSV_COLUMNS: [&str; 9] = [
    "id",
    "date",
    "duration_secs",
    "wpm",
    "accuracy",
    "error_rate",
    "keystrokes",
    "tremor_score",
    "fatigue_score",
];

#[derive(Debug, Serialize)]
struct CsvRow {
    id: String,
    date: String,
    duration_secs: u64,
    wpm: u32,
    accuracy: u32,
    error_rate: u32,
    keystrokes: usize,
    tremor_score: u32,
    fatigue_score: u32,
}

impl From<&TypingSession> for CsvRow {
    fn from(s: &TypingSession) -> Self {
        Self {
            id: s.id.to_string(),
            date: s.started_at.to_rfc3339(),
            duration_secs: s.duration_secs(),
            wpm: s.metrics.wpm,
            accuracy: s.metrics.accuracy,
            error_rate: s.metrics.error_rate,
            keystrokes: s.metrics.total_keystrokes,
            tremor_score: s.metrics.tremor_score,
            fatigue_score: s.metrics.fatigue_score,
        }
    }
}

/// One row per session. The header row is written even for an empty history.
pub fn write_csv<W: Write>(sessions: &[TypingSession], out: W) -> csv::Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);

    writer.write_record(CSV_COLUMNS)?;
    for session in sessions {
        writer.serialize(CsvRow::from(session))?;
    }
    writer.flush()?;

    Ok(())
}

/// Field-preserving pretty JSON of the full session records, timeline
/// included.
pub fn write_json<W: Write>(sessions: &[TypingSession], mut out: W) -> io::Result<()> {
    let json = serde_json::to_string_pretty(sessions)?;
    writeln!(out, "{json}")
}
