#[cfg(coverage)]
pub(crate) fn run_watch_ratatui_mode(
    session: &mut super::Session,
) -> Result<i32, hp_core::HoneyPotError> {
    super::run_watch_line_mode(session)
}

#[cfg(not(coverage))]
mod rich {
    use std::io;
    use std::time::{Duration, Instant};

    use crossterm::event::{self, Event, KeyEventKind};
    use crossterm::terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
    };
    use crossterm::ExecutableCommand;
    use hp_core::HoneyPotError;
    use ratatui::backend::CrosstermBackend;
    use ratatui::Terminal;

    use crate::line_tui::describe_event;
    use crate::rows::visible_rows;
    use crate::tui_actions::handle_key;
    use crate::tui_render::{render_watch, viewport_rows_for};
    use crate::tui_state::WatchUiState;
    use crate::{map_tui_io, Session};

    const INPUT_POLL_MS: u64 = 50;

    struct TuiTerminal {
        terminal: Terminal<CrosstermBackend<io::Stdout>>,
    }

    impl TuiTerminal {
        fn new() -> Result<Self, HoneyPotError> {
            enable_raw_mode().map_err(map_tui_io)?;
            io::stdout()
                .execute(EnterAlternateScreen)
                .map_err(map_tui_io)?;
            let backend = CrosstermBackend::new(io::stdout());
            let terminal = Terminal::new(backend).map_err(map_tui_io)?;
            Ok(Self { terminal })
        }

        fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<io::Stdout>> {
            &mut self.terminal
        }
    }

    impl Drop for TuiTerminal {
        fn drop(&mut self) {
            let _ = disable_raw_mode();
            let _ = io::stdout().execute(LeaveAlternateScreen);
        }
    }

    fn sync_ui(session: &mut Session, ui: &mut WatchUiState) {
        session.settle();
        for event in session.drain_events() {
            ui.push_event(describe_event(&event));
        }
        ui.replace_rows(visible_rows(&session.engine));
    }

    pub(crate) fn run_watch_ratatui_mode(
        session: &mut Session,
    ) -> Result<i32, HoneyPotError> {
        let mut terminal = TuiTerminal::new()?;
        let mut ui = WatchUiState {
            status: "ready".to_string(),
            ..WatchUiState::default()
        };
        sync_ui(session, &mut ui);

        let input_poll = Duration::from_millis(INPUT_POLL_MS);
        let mut last_tick = Instant::now();

        loop {
            let height = terminal.terminal_mut().size().map_err(map_tui_io)?.height;
            ui.set_viewport_rows(viewport_rows_for(height, &ui));
            terminal
                .terminal_mut()
                .draw(|frame| render_watch(frame, &ui, session))
                .map_err(map_tui_io)?;

            let elapsed = last_tick.elapsed();
            if elapsed >= session.interval() {
                last_tick = Instant::now();
                if let Err(error) = session.tick(elapsed) {
                    ui.status = error.message;
                }
                sync_ui(session, &mut ui);
                continue;
            }

            if !event::poll(input_poll).map_err(map_tui_io)? {
                continue;
            }
            let evt = event::read().map_err(map_tui_io)?;
            if let Event::Key(key) = evt {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let should_quit = match handle_key(key, session, &mut ui) {
                    Ok(should_quit) => should_quit,
                    Err(error) => {
                        ui.status = error.message;
                        false
                    }
                };
                if should_quit {
                    break;
                }
                sync_ui(session, &mut ui);
            }
        }

        Ok(0)
    }
}

#[cfg(not(coverage))]
pub(crate) use rich::run_watch_ratatui_mode;
