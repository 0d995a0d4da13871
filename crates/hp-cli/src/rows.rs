use std::collections::BTreeMap;

use hp_core::{HoneyPotError, LeafType, Path};
use hp_runtime::{ContainerKind, ControlHandle, EvalBoundary, SyncEngine};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RowKind {
    Container {
        kind: ContainerKind,
        collapsed: bool,
    },
    Leaf {
        leaf_type: LeafType,
        editor_text: String,
        locked: bool,
        changed: bool,
    },
}

/// One visible line of the variable tree, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ViewRow {
    pub(crate) path: Path,
    pub(crate) depth: usize,
    pub(crate) label: String,
    pub(crate) highlighted: bool,
    pub(crate) kind: RowKind,
}

/// Gives each leaf that has no control yet a handle: its position in
/// discovery order. Returns how many were attached.
pub(crate) fn attach_controls<B: EvalBoundary>(
    engine: &mut SyncEngine<B>,
) -> Result<usize, HoneyPotError> {
    let unassigned = engine
        .model()
        .entries()
        .enumerate()
        .filter(|(_, entry)| !entry.control().is_assigned())
        .map(|(position, entry)| (entry.path().clone(), ControlHandle(position as u64)))
        .collect::<Vec<_>>();
    for (path, handle) in &unassigned {
        engine.attach_control(path, *handle)?;
    }
    Ok(unassigned.len())
}

/// Rows the renderer should show: filtered leaves are dropped, and so is
/// everything under a collapsed container.
pub(crate) fn visible_rows<B: EvalBoundary>(engine: &SyncEngine<B>) -> Vec<ViewRow> {
    let model = engine.model();
    let view = engine.view();
    let containers = model
        .containers()
        .iter()
        .map(|container| (&container.path, container.kind))
        .collect::<BTreeMap<_, _>>();

    let mut rows = Vec::new();
    for label in model.labels() {
        let path = &label.path;
        if view.is_folded(path) {
            continue;
        }
        let kind = if let Some(kind) = containers.get(path) {
            RowKind::Container {
                kind: *kind,
                collapsed: view.is_collapsed(path),
            }
        } else if let Some(entry) = model.get(path) {
            if !view.is_visible(path) {
                continue;
            }
            RowKind::Leaf {
                leaf_type: entry.leaf_type(),
                editor_text: entry.editor_text(),
                locked: entry.locked(),
                changed: entry.changed(),
            }
        } else {
            continue;
        };
        rows.push(ViewRow {
            path: path.clone(),
            depth: path.depth().saturating_sub(1),
            label: label.text(),
            highlighted: view.is_highlighted(path),
            kind,
        });
    }
    rows
}

pub(crate) fn format_row(row: &ViewRow) -> String {
    let indent = "  ".repeat(row.depth);
    let mark = if row.highlighted { "*" } else { " " };
    match &row.kind {
        RowKind::Container { collapsed, .. } => {
            let fold = if *collapsed { "+" } else { "-" };
            format!("{}  {}{} {}", mark, indent, fold, row.label)
        }
        RowKind::Leaf {
            leaf_type,
            editor_text,
            locked,
            changed,
        } => format!(
            "{}{} {}{} = {} ({}){}",
            mark,
            if *locked { "L" } else { " " },
            indent,
            row.label,
            editor_text,
            leaf_type.as_str(),
            if *changed { " !" } else { "" }
        ),
    }
}

/// Machine-readable leaf line for `inspect --json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LeafRecord<'a> {
    pub(crate) path: &'a str,
    pub(crate) id: String,
    pub(crate) label: &'a str,
    pub(crate) leaf_type: LeafType,
    pub(crate) editor_type: &'static str,
    pub(crate) editor_text: &'a str,
    pub(crate) checked: bool,
    pub(crate) tooltip: String,
}
