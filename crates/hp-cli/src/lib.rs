use std::ffi::OsString;
use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser;
use hp_core::HoneyPotError;
use tracing_subscriber::EnvFilter;

mod cli_args;
mod error_map;
mod line_tui;
mod models;
mod rows;
mod session;
mod tui;
mod tui_actions;
mod tui_render;
mod tui_state;

pub(crate) use cli_args::{Cli, InspectArgs, Mode, SessionArgs};
pub(crate) use error_map::{
    emit_error, map_cli_log_open, map_cli_options_read, map_cli_output, map_cli_script_read,
    map_cli_state_read, map_tui_io,
};
pub(crate) use line_tui::run_watch_line_mode;
pub(crate) use models::WatchCommandAction;
pub(crate) use session::Session;

const LOG_ENV: &str = "HONEYPOT_LOG";

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, HoneyPotError> {
    let full_screen = matches!(cli.command, Mode::Tui(_));
    init_tracing(cli.log_file.as_deref(), full_screen)?;
    match cli.command {
        Mode::Inspect(args) => run_inspect(args),
        Mode::Watch(args) => run_watch(args),
        Mode::Tui(args) => run_tui(args),
    }
}

/// Logs go to `log_file` when given, otherwise to stderr. A full-screen
/// session without a log file keeps logs off the terminal entirely.
fn init_tracing(log_file: Option<&str>, full_screen: bool) -> Result<(), HoneyPotError> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(map_cli_log_open)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None if full_screen => return Ok(()),
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}

fn open_session(args: &SessionArgs) -> Result<Session, HoneyPotError> {
    let mut session = Session::open(args)?;
    // Discovery has to settle before any mode is useful.
    let events = session.engine.drain_events();
    if let Some(error) = Session::discovery_error(&events) {
        return Err(error);
    }
    for event in events {
        tracing::info!("{}", line_tui::describe_event(&event));
    }
    Ok(session)
}

fn run_inspect(args: InspectArgs) -> Result<i32, HoneyPotError> {
    let mut session = open_session(&args.session)?;
    if let Some(pattern) = &args.filter {
        session.engine.filter_some(pattern);
    }
    let engine = &session.engine;
    println!("RESULT:OK");
    println!("ROOT:{}", engine.root_expression());
    if let Some(title) = engine.title() {
        println!(
            "TITLE_JSON:{}",
            serde_json::to_string(title).map_err(map_cli_output)?
        );
    }
    for entry in engine.model().entries() {
        let path = entry.path();
        if !engine.view().is_visible(path) {
            continue;
        }
        let editor_text = entry.editor_text();
        println!(
            "PATH:{}|{}|{}",
            path,
            entry.leaf_type().as_str(),
            editor_text
        );
        if args.json {
            let label = path
                .last_segment()
                .map(hp_core::humanize_label)
                .unwrap_or_default();
            let record = rows::LeafRecord {
                path: path.as_str(),
                id: path.row_id(),
                label: &label,
                leaf_type: entry.leaf_type(),
                editor_type: entry.leaf_type().editor_kind().input_type(),
                editor_text: &editor_text,
                checked: entry.boolean_view(),
                tooltip: path.tooltip(),
            };
            println!(
                "ROW_JSON:{}",
                serde_json::to_string(&record).map_err(map_cli_output)?
            );
        }
    }
    Ok(0)
}

fn run_watch(args: SessionArgs) -> Result<i32, HoneyPotError> {
    let mut session = open_session(&args)?;
    run_watch_line_mode(&mut session)
}

fn run_tui(args: SessionArgs) -> Result<i32, HoneyPotError> {
    let mut session = open_session(&args)?;
    tui::run_watch_ratatui_mode(&mut session)
}
