use hp_core::Path;

use crate::rows::ViewRow;

pub(crate) const ROW_VIEWPORT_MIN: usize = 3;
const EVENT_LOG_CAPACITY: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum InputMode {
    #[default]
    Browse,
    Edit {
        path: Path,
        buffer: String,
    },
    Filter {
        buffer: String,
    },
}

#[derive(Debug, Default)]
pub(crate) struct WatchUiState {
    pub(crate) rows: Vec<ViewRow>,
    pub(crate) selected: usize,
    pub(crate) scroll_offset: usize,
    pub(crate) viewport_rows: usize,
    pub(crate) input: InputMode,
    pub(crate) help_visible: bool,
    pub(crate) status: String,
    pub(crate) event_log: Vec<String>,
}

impl WatchUiState {
    /// Swaps in freshly computed rows, keeping the cursor on the same path
    /// when it is still visible.
    pub(crate) fn replace_rows(&mut self, rows: Vec<ViewRow>) {
        let selected_path = self.selected_row().map(|row| row.path.clone());
        self.rows = rows;
        self.selected = selected_path
            .and_then(|path| self.rows.iter().position(|row| row.path == path))
            .unwrap_or(self.selected)
            .min(self.rows.len().saturating_sub(1));
        self.keep_selection_visible();
    }

    pub(crate) fn selected_row(&self) -> Option<&ViewRow> {
        self.rows.get(self.selected)
    }

    pub(crate) fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.keep_selection_visible();
    }

    pub(crate) fn move_down(&mut self) {
        let last = self.rows.len().saturating_sub(1);
        self.selected = (self.selected + 1).min(last);
        self.keep_selection_visible();
    }

    pub(crate) fn set_viewport_rows(&mut self, rows: usize) {
        self.viewport_rows = rows.max(ROW_VIEWPORT_MIN);
        self.keep_selection_visible();
    }

    fn keep_selection_visible(&mut self) {
        let viewport = self.viewport_rows.max(ROW_VIEWPORT_MIN);
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + viewport {
            self.scroll_offset = self.selected + 1 - viewport;
        }
    }

    pub(crate) fn push_event(&mut self, line: String) {
        self.event_log.push(line);
        if self.event_log.len() > EVENT_LOG_CAPACITY {
            self.event_log.remove(0);
        }
    }
}
