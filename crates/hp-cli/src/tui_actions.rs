use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use hp_core::{HoneyPotError, LeafType};

use crate::rows::RowKind;
use crate::tui_state::{InputMode, WatchUiState};
use crate::Session;

/// Applies one key press. Returns `true` when the user asked to quit.
pub(crate) fn handle_key(
    key: KeyEvent,
    session: &mut Session,
    ui: &mut WatchUiState,
) -> Result<bool, HoneyPotError> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(true);
    }
    match std::mem::take(&mut ui.input) {
        InputMode::Browse => handle_browse_key(key, session, ui),
        InputMode::Edit { path, mut buffer } => {
            match key.code {
                KeyCode::Esc => ui.status = "edit cancelled".to_string(),
                KeyCode::Enter => {
                    session.engine.on_edit(&path, &buffer)?;
                    ui.status = format!("writing {}", path);
                }
                KeyCode::Backspace | KeyCode::Delete => {
                    buffer.pop();
                    ui.input = InputMode::Edit { path, buffer };
                }
                KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::ALT) => {
                    buffer.push(ch);
                    ui.input = InputMode::Edit { path, buffer };
                }
                _ => ui.input = InputMode::Edit { path, buffer },
            }
            Ok(false)
        }
        InputMode::Filter { mut buffer } => {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    ui.status = format!("filter: {}", buffer);
                    return Ok(false);
                }
                KeyCode::Backspace | KeyCode::Delete => {
                    buffer.pop();
                }
                KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::ALT) => buffer.push(ch),
                _ => {}
            }
            session.engine.filter_some(&buffer);
            ui.input = InputMode::Filter { buffer };
            Ok(false)
        }
    }
}

fn handle_browse_key(
    key: KeyEvent,
    session: &mut Session,
    ui: &mut WatchUiState,
) -> Result<bool, HoneyPotError> {
    let engine = &mut session.engine;
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => return Ok(true),
        KeyCode::Char('h') => ui.help_visible = !ui.help_visible,
        KeyCode::Up => ui.move_up(),
        KeyCode::Down => ui.move_down(),
        KeyCode::Char('/') => {
            ui.input = InputMode::Filter {
                buffer: engine.view().pattern().to_string(),
            };
        }
        KeyCode::Char('c') => {
            engine.expand_collapse_all(true);
            ui.status = "collapsed all".to_string();
        }
        KeyCode::Char('e') => {
            engine.expand_collapse_all(false);
            ui.status = "expanded all".to_string();
        }
        KeyCode::Char('a') => {
            let automatic = !engine.options().automatic;
            let now = session.now();
            session.engine.set_automatic(automatic, now);
            ui.status = format!("automatic: {}", automatic);
        }
        KeyCode::Char('p') => {
            engine.poll_now();
            ui.status = "polled".to_string();
        }
        KeyCode::Char('u') => {
            engine.clear_all_changed();
            ui.status = "cleared changes".to_string();
        }
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('l') | KeyCode::Char('f') => {
            let Some(row) = ui.selected_row().cloned() else {
                ui.status = "nothing selected".to_string();
                return Ok(false);
            };
            if matches!(row.kind, RowKind::Container { .. }) {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    engine.toggle_collapsed(&row.path);
                }
                return Ok(false);
            }
            // Rows can lag one poll behind; act on what the model holds now.
            let entry = engine.model().entry(&row.path)?;
            let editor_text = entry.editor_text();
            let locked = entry.locked();
            match key.code {
                KeyCode::Enter | KeyCode::Char(' ') if entry.leaf_type() == LeafType::Boolean => {
                    let flipped = if editor_text == "true" { "false" } else { "true" };
                    engine.on_edit(&row.path, flipped)?;
                    ui.status = format!("writing {}", row.path);
                }
                KeyCode::Enter => {
                    ui.input = InputMode::Edit {
                        path: row.path.clone(),
                        buffer: editor_text,
                    };
                }
                KeyCode::Char('l') => {
                    engine.on_lock(&row.path, !locked, &editor_text)?;
                    ui.status = format!(
                        "{} {}",
                        if locked { "unlocked" } else { "locked" },
                        row.path
                    );
                }
                KeyCode::Char('f') => {
                    engine.refresh_field(&row.path)?;
                    ui.status = format!("refreshing {}", row.path);
                }
                _ => {}
            }
        }
        _ => {}
    }
    Ok(false)
}
