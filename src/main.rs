use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand, ValueEnum};
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode},
    tty::IsTty,
};
use itertools::Itertools;
use kadans::{
    attempt::Attempt,
    capture::{run_capture, CaptureOutcome},
    config::{Config, ConfigStore, FileConfigStore},
    export,
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    session::TypingSession,
    store::SessionStore,
    texts::TextSet,
    TICK_RATE_MS,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin, Write},
    path::PathBuf,
    time::Duration,
};
use time_humanize::{Accuracy, HumanTime, Tense};
use unicode_width::UnicodeWidthChar;

/// terminal typing test with keystroke timing, tremor scoring and fatigue analysis
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing test that records per-keystroke timing, scores motor variability (tremor) and within-session fatigue, and keeps a local history with CSV/JSON export."
)]
struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// run a typing attempt (the default when no subcommand is given)
    Run(RunArgs),
    /// list past sessions, newest first
    History,
    /// show the full metrics for one session
    Show {
        /// session id, or an unambiguous prefix of one
        id: String,
    },
    /// export the session history to CSV or JSON
    Export {
        #[clap(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// write to a file instead of stdout
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// delete one session
    Delete {
        /// session id, or an unambiguous prefix of one
        id: String,
        /// skip the confirmation prompt
        #[clap(long)]
        yes: bool,
    },
    /// delete the entire session history
    Clear {
        /// skip the confirmation prompt
        #[clap(long)]
        yes: bool,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
struct RunArgs {
    /// which embedded text set to draw the reference from
    #[clap(short = 't', long, value_enum)]
    text_set: Option<TextSetKind>,

    /// custom reference text to type instead of a drawn passage
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// number of seconds to run the attempt
    #[clap(short = 's', long)]
    seconds: Option<u64>,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
enum TextSetKind {
    Common,
    Pangrams,
    Quotes,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
enum ExportFormat {
    Csv,
    Json,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => run(args),
        Command::History => history(),
        Command::Show { id } => show(&id),
        Command::Export { format, output } => export_history(format, output),
        Command::Delete { id, yes } => delete(&id, yes),
        Command::Clear { yes } => clear(yes),
    }
}

fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let config = config_store.load();

    let set_name = resolve_text_set(
        args.text_set
            .map(|k| k.to_string().to_lowercase())
            .unwrap_or_else(|| config.text_set.clone()),
    );
    let seconds = args.seconds.or(config.number_of_secs);

    let reference = match args.prompt {
        Some(p) => p,
        None => TextSet::load(&set_name).pick(),
    };

    println!("{reference}");
    println!();
    println!("type the text above; Esc aborts");
    println!();

    let mut attempt = Attempt::new(reference, seconds.map(|s| s as f64));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    let enhanced = matches!(terminal::supports_keyboard_enhancement(), Ok(true));
    if enhanced {
        // release events carry the hold durations; without them the
        // duration-based metrics fall back to their zero defaults
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let outcome = run_capture(&runner, &mut attempt, &mut stdout);

    if enhanced {
        let _ = execute!(stdout, PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    println!();

    if let CaptureOutcome::Aborted = outcome? {
        println!("aborted; nothing saved");
        return Ok(());
    }

    let session = attempt.finish();
    println!();
    println!("{session}");

    match SessionStore::new() {
        Ok(store) => {
            if let Err(e) = store.insert(&session) {
                eprintln!("warning: session not saved: {e}");
            }
        }
        Err(e) => eprintln!("warning: session not saved: {e}"),
    }

    let _ = config_store.save(&Config {
        text_set: set_name,
        number_of_secs: seconds,
    });

    Ok(())
}

fn history() -> Result<(), Box<dyn Error>> {
    let sessions = SessionStore::new()?.all()?;
    if sessions.is_empty() {
        println!("no sessions recorded yet");
        return Ok(());
    }

    for (day, group) in &sessions.iter().chunk_by(|s| s.started_at.date_naive()) {
        println!("{}", day.format("%Y-%m-%d"));
        for s in group {
            let age = chrono::Local::now()
                .signed_duration_since(s.started_at)
                .to_std()
                .unwrap_or_default();
            println!(
                "  {}  {:>16}  {:>3} wpm  {:>3}% acc  tremor {:>3}  fatigue {:>3}  {}",
                s.short_id(),
                HumanTime::from(age).to_text_en(Accuracy::Rough, Tense::Past),
                s.metrics.wpm,
                s.metrics.accuracy,
                s.metrics.tremor_score,
                s.metrics.fatigue_score,
                preview(&s.reference, 32),
            );
        }
    }

    Ok(())
}

fn show(id: &str) -> Result<(), Box<dyn Error>> {
    let sessions = SessionStore::new()?.all()?;
    let session = find_by_prefix(sessions, id);

    println!("{session}");
    println!();
    println!("reference: {}", session.reference);
    println!("typed:     {}", session.typed);

    Ok(())
}

fn export_history(format: ExportFormat, output: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let sessions = SessionStore::new()?.all()?;

    let out: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };

    match format {
        ExportFormat::Csv => export::write_csv(&sessions, out)?,
        ExportFormat::Json => export::write_json(&sessions, out)?,
    }

    Ok(())
}

fn delete(id: &str, yes: bool) -> Result<(), Box<dyn Error>> {
    let store = SessionStore::new()?;
    let session = find_by_prefix(store.all()?, id);

    if !yes && !confirm(&format!("delete session {}?", session.short_id()))? {
        println!("not deleted");
        return Ok(());
    }

    store.delete(&session.id)?;
    println!("deleted session {}", session.short_id());

    Ok(())
}

fn clear(yes: bool) -> Result<(), Box<dyn Error>> {
    let store = SessionStore::new()?;

    if !yes && !confirm("delete the entire session history?")? {
        println!("nothing deleted");
        return Ok(());
    }

    let removed = store.clear()?;
    println!("deleted {removed} sessions");

    Ok(())
}

/// Resolves a full id or an unambiguous prefix, or exits with a clap error
fn find_by_prefix(sessions: Vec<TypingSession>, needle: &str) -> TypingSession {
    let mut hits: Vec<TypingSession> = sessions
        .into_iter()
        .filter(|s| s.id.to_string().starts_with(needle))
        .collect();

    match hits.len() {
        1 => hits.remove(0),
        0 => Cli::command()
            .error(
                ErrorKind::InvalidValue,
                format!("no session matching '{needle}'"),
            )
            .exit(),
        n => Cli::command()
            .error(
                ErrorKind::InvalidValue,
                format!("'{needle}' is ambiguous ({n} sessions match)"),
            )
            .exit(),
    }
}

/// The config file is hand-editable; an unknown set name falls back to the
/// default instead of panicking inside `TextSet::load`
fn resolve_text_set(name: String) -> String {
    if TextSet::exists(&name) {
        name
    } else {
        let fallback = Config::default().text_set;
        eprintln!("unknown text set '{name}'; using {fallback}");
        fallback
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().eq_ignore_ascii_case("y"))
}

/// Truncates to a display width, appending an ellipsis when text is cut
fn preview(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + w > max_width {
            out.push('…');
            return out;
        }
        width += w;
        out.push(ch);
    }
    out
}
