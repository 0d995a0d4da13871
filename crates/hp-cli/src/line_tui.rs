use std::io::{self, BufRead, Write};

use hp_core::{HoneyPotError, Path};
use hp_runtime::EngineEvent;

use crate::rows::{format_row, visible_rows};
use crate::{map_tui_io, Session, WatchCommandAction};

const HELP_TEXT: &str = "commands: :help :list :edit <path> <text> :lock <path> [text] :unlock <path> \
:filter [text] :highlight [text] :find <text> :refresh <path> :tick [n] :run <rhai> \
:auto on|off :interval <ms> :collapse [path] :expand [path] :unchange :status :quit";

pub(crate) fn run_watch_line_mode(session: &mut Session) -> Result<i32, HoneyPotError> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();
    run_watch_line_mode_with_io(session, &mut reader, &mut writer)
}

pub(crate) fn run_watch_line_mode_with_io(
    session: &mut Session,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<i32, HoneyPotError> {
    writeln!(writer, "HoneyPot watch").map_err(map_tui_io)?;
    writeln!(writer, "{}", HELP_TEXT).map_err(map_tui_io)?;
    report_events(session, writer)?;

    loop {
        let Some(raw) = prompt_input_from("> ", reader, writer)? else {
            return Ok(0);
        };
        let mut lines = Vec::new();
        let mut emit = |line: String| lines.push(line);
        let action = match handle_line_cmd(raw.trim(), session, &mut emit) {
            Ok(action) => action,
            Err(error) => {
                emit(format!("error: {}", error));
                WatchCommandAction::Continue
            }
        };
        for line in lines {
            writeln!(writer, "{}", line).map_err(map_tui_io)?;
        }
        match action {
            WatchCommandAction::Quit => return Ok(0),
            WatchCommandAction::NotHandled => {
                writeln!(writer, "unknown command: {} (try :help)", raw.trim())
                    .map_err(map_tui_io)?;
            }
            WatchCommandAction::Continue => {}
        }
        session.settle();
        report_events(session, writer)?;
    }
}

fn report_events(session: &mut Session, writer: &mut dyn Write) -> Result<(), HoneyPotError> {
    for event in session.drain_events() {
        writeln!(writer, "{}", describe_event(&event)).map_err(map_tui_io)?;
    }
    Ok(())
}

pub(crate) fn describe_event(event: &EngineEvent) -> String {
    match event {
        EngineEvent::Discovered { name, expression } => {
            format!("discovered: {} ({})", name, expression)
        }
        EngineEvent::TitleResolved(title) => format!("title: {}", title),
        EngineEvent::FieldChanged {
            path, editor_text, ..
        } => format!("changed: {} = {}", path, editor_text),
        EngineEvent::FieldWritten { path } => format!("written: {}", path),
        EngineEvent::Error(error) => format!("error: {}", error),
    }
}

/// Splits `":cmd rest of line"` into the command word and its argument text.
fn split_command(raw: &str) -> (&str, &str) {
    match raw.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (raw, ""),
    }
}

fn required_path(argument: &str, usage: &str) -> Result<Path, HoneyPotError> {
    let (path, _) = split_command(argument);
    if path.is_empty() {
        return Err(HoneyPotError::new(
            "TUI_COMMAND_USAGE",
            format!("usage: {}", usage),
        ));
    }
    Ok(Path::parse(path))
}

pub(crate) fn handle_line_cmd(
    raw: &str,
    session: &mut Session,
    emit: &mut dyn FnMut(String),
) -> Result<WatchCommandAction, HoneyPotError> {
    let (command, argument) = split_command(raw);
    let engine = &mut session.engine;
    match command {
        "" => Ok(WatchCommandAction::Continue),
        ":help" => {
            emit(HELP_TEXT.to_string());
            Ok(WatchCommandAction::Continue)
        }
        ":list" => {
            for row in visible_rows(engine) {
                emit(format_row(&row));
            }
            Ok(WatchCommandAction::Continue)
        }
        ":status" => {
            let next_poll = match session.engine.next_deadline() {
                Some(due) => format!(
                    "{}ms",
                    due.saturating_duration_since(session.now()).as_millis()
                ),
                None => "idle".to_string(),
            };
            emit(format!(
                "root: {} | title: {} | automatic: {} | interval: {}ms | next poll: {} | locked: {} | pending: {}",
                session.engine.root_expression(),
                session.engine.title().unwrap_or("-"),
                session.engine.options().automatic,
                session.interval().as_millis(),
                next_poll,
                session.engine.model().locked_paths().len(),
                session.engine.pending_len()
            ));
            Ok(WatchCommandAction::Continue)
        }
        ":edit" => {
            let path = required_path(argument, ":edit <path> <text>")?;
            let (_, text) = split_command(argument);
            engine.on_edit(&path, text)?;
            Ok(WatchCommandAction::Continue)
        }
        ":lock" => {
            let path = required_path(argument, ":lock <path> [text]")?;
            let (_, text) = split_command(argument);
            let text = if text.is_empty() {
                engine.model().entry(&path)?.editor_text()
            } else {
                text.to_string()
            };
            engine.on_lock(&path, true, &text)?;
            emit(format!("locked: {} = {}", path, text));
            Ok(WatchCommandAction::Continue)
        }
        ":unlock" => {
            let path = required_path(argument, ":unlock <path>")?;
            let text = engine.model().entry(&path)?.editor_text();
            engine.on_lock(&path, false, &text)?;
            emit(format!("unlocked: {}", path));
            Ok(WatchCommandAction::Continue)
        }
        ":filter" => {
            engine.filter_some(argument);
            Ok(WatchCommandAction::Continue)
        }
        ":highlight" => {
            engine.highlight_some(argument);
            Ok(WatchCommandAction::Continue)
        }
        ":find" => {
            let found = engine.find_with_values(argument);
            if found.is_empty() {
                emit("no match".to_string());
            }
            for path in found {
                emit(format!("found: {}", path));
            }
            Ok(WatchCommandAction::Continue)
        }
        ":refresh" => {
            let path = required_path(argument, ":refresh <path>")?;
            engine.refresh_field(&path)?;
            Ok(WatchCommandAction::Continue)
        }
        ":tick" => {
            let count = if argument.is_empty() {
                1
            } else {
                argument.parse::<u32>().map_err(|_| {
                    HoneyPotError::new(
                        "TUI_COMMAND_USAGE",
                        format!("Invalid tick count: {}", argument),
                    )
                })?
            };
            let interval = session.interval();
            let mut polls = 0;
            for _ in 0..count {
                if session.tick(interval)? {
                    polls += 1;
                }
            }
            emit(format!("ticked {} ({} polls)", count, polls));
            Ok(WatchCommandAction::Continue)
        }
        ":run" => {
            session.run(argument)?;
            Ok(WatchCommandAction::Continue)
        }
        ":auto" => {
            let automatic = match argument {
                "on" => true,
                "off" => false,
                _ => {
                    return Err(HoneyPotError::new(
                        "TUI_COMMAND_USAGE",
                        "usage: :auto on|off",
                    ))
                }
            };
            let now = session.now();
            session.engine.set_automatic(automatic, now);
            emit(format!("automatic: {}", automatic));
            Ok(WatchCommandAction::Continue)
        }
        ":interval" => {
            let interval_ms = argument.parse::<u64>().map_err(|_| {
                HoneyPotError::new(
                    "TUI_COMMAND_USAGE",
                    format!("Invalid interval: {}", argument),
                )
            })?;
            engine.set_interval_ms(interval_ms);
            emit(format!("interval: {}ms", session.interval().as_millis()));
            Ok(WatchCommandAction::Continue)
        }
        ":collapse" | ":expand" => {
            if argument.is_empty() {
                engine.expand_collapse_all(command == ":collapse");
            } else {
                let path = Path::parse(argument);
                let collapsed = engine.view().is_collapsed(&path);
                if collapsed != (command == ":collapse") {
                    engine.toggle_collapsed(&path);
                }
            }
            Ok(WatchCommandAction::Continue)
        }
        ":unchange" => {
            engine.clear_all_changed();
            Ok(WatchCommandAction::Continue)
        }
        ":quit" => {
            emit("bye".to_string());
            Ok(WatchCommandAction::Quit)
        }
        _ => Ok(WatchCommandAction::NotHandled),
    }
}

/// Reads one line; `None` once the input is exhausted.
pub(crate) fn prompt_input_from(
    prefix: &str,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<Option<String>, HoneyPotError> {
    write!(writer, "{}", prefix).map_err(map_tui_io)?;
    writer.flush().map_err(map_tui_io)?;
    let mut input = String::new();
    let read = reader.read_line(&mut input).map_err(map_tui_io)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(&['\r', '\n'][..]).to_string()))
}
