use std::collections::BTreeSet;

use hp_core::Path;

use crate::model::PathModel;

fn is_blank(pattern: &str) -> bool {
    pattern.trim().is_empty()
}

/// Read-only derived views over a [`PathModel`]: filter visibility,
/// highlight marks and collapsed containers.
///
/// Label highlighting and value highlighting share one slot per path, and
/// the value pass runs last, so a leaf's highlight always reflects whether
/// its value text matched.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    hidden: BTreeSet<Path>,
    highlighted: BTreeSet<Path>,
    collapsed: BTreeSet<Path>,
    pattern: String,
}

impl ViewState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_visible(&self, path: &Path) -> bool {
        !self.hidden.contains(path)
    }

    pub fn is_highlighted(&self, path: &Path) -> bool {
        self.highlighted.contains(path)
    }

    pub fn is_collapsed(&self, path: &Path) -> bool {
        self.collapsed.contains(path)
    }

    /// True when some enclosing container of `path` is collapsed.
    pub fn is_folded(&self, path: &Path) -> bool {
        let mut ancestor = Path::root();
        let depth = path.depth();
        for segment in path.segments().take(depth.saturating_sub(1)) {
            ancestor = ancestor.child(segment);
            if self.collapsed.contains(&ancestor) {
                return true;
            }
        }
        false
    }

    pub fn filter_some(&mut self, model: &PathModel, pattern: &str) {
        let needle = pattern.to_lowercase();
        for entry in model.entries() {
            let path = entry.path();
            if is_blank(pattern) || path.identifier().contains(&needle) {
                self.hidden.remove(path);
            } else {
                self.hidden.insert(path.clone());
            }
        }
        self.highlight_some(model, pattern);
    }

    pub fn highlight_some(&mut self, model: &PathModel, pattern: &str) {
        self.pattern = pattern.to_string();
        let needle = pattern.to_lowercase();
        for label in model.labels() {
            if is_blank(pattern) || !label.tag_text().to_lowercase().contains(&needle) {
                self.highlighted.remove(&label.path);
            } else {
                self.highlighted.insert(label.path.clone());
            }
        }
        self.find_with_values(model, pattern);
    }

    /// Marks leaves whose editor text contains `pattern`; returns the marked paths.
    pub fn find_with_values(&mut self, model: &PathModel, pattern: &str) -> Vec<Path> {
        let needle = pattern.to_lowercase();
        let mut found = Vec::new();
        for entry in model.entries() {
            let path = entry.path();
            if is_blank(pattern)
                || entry.value().is_null()
                || !entry.editor_text().to_lowercase().contains(&needle)
            {
                self.highlighted.remove(path);
            } else {
                self.highlighted.insert(path.clone());
                found.push(path.clone());
            }
        }
        found
    }

    /// Root stays expanded; empty containers have nothing to collapse.
    pub fn expand_collapse_all(&mut self, model: &PathModel, collapse: bool) {
        for container in model.containers() {
            if container.path.is_root() || container.empty {
                continue;
            }
            if collapse {
                self.collapsed.insert(container.path.clone());
            } else {
                self.collapsed.remove(&container.path);
            }
        }
    }

    pub fn toggle_collapsed(&mut self, path: &Path) {
        if !self.collapsed.remove(path) {
            self.collapsed.insert(path.clone());
        }
    }
}
