use hp_core::{humanize_label, HoneyPotError, HpValue, LeafType, Path, Step};
use indexmap::IndexMap;

/// Opaque handle of the control a renderer created for one leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlHandle(pub u64);

/// Write-once holder for a [`ControlHandle`].
#[derive(Debug, Clone, Default)]
pub struct ControlSlot(Option<ControlHandle>);

impl ControlSlot {
    pub fn get(&self) -> Result<ControlHandle, HoneyPotError> {
        self.0.ok_or_else(|| {
            HoneyPotError::new("CONTROL_UNASSIGNED", "Control handle isn't initialized.")
        })
    }

    pub fn assign(&mut self, handle: ControlHandle) -> Result<(), HoneyPotError> {
        if self.0.is_some() {
            return Err(HoneyPotError::new(
                "CONTROL_REASSIGNED",
                "Control handle is already initialized.",
            ));
        }
        self.0 = Some(handle);
        Ok(())
    }

    pub fn is_assigned(&self) -> bool {
        self.0.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct LeafEntry {
    path: Path,
    steps: Vec<Step>,
    leaf_type: LeafType,
    pub(crate) value: HpValue,
    pub(crate) locked: bool,
    pub(crate) locked_value: HpValue,
    pub(crate) changed: bool,
    pub(crate) control: ControlSlot,
}

impl LeafEntry {
    fn new(path: Path, steps: Vec<Step>, leaf_type: LeafType, value: HpValue) -> Self {
        Self {
            path,
            steps,
            leaf_type,
            locked_value: value.clone(),
            value,
            locked: false,
            changed: false,
            control: ControlSlot::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether each segment of the path keys an object or indexes a sequence.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn leaf_type(&self) -> LeafType {
        self.leaf_type
    }

    pub fn value(&self) -> &HpValue {
        &self.value
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn locked_value(&self) -> &HpValue {
        &self.locked_value
    }

    /// Set when reconciliation observed a value the user did not write.
    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn control(&self) -> &ControlSlot {
        &self.control
    }

    pub fn editor_text(&self) -> String {
        self.leaf_type.to_editor_text(&self.value)
    }

    pub fn boolean_view(&self) -> bool {
        self.leaf_type.to_boolean_view(&self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Object,
    Sequence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub path: Path,
    pub kind: ContainerKind,
    pub empty: bool,
}

/// One child key of a container, whatever the child's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub path: Path,
    pub key: String,
    pub parent: ContainerKind,
}

impl Label {
    /// Text the highlight pass searches: the label's tag classes.
    pub fn tag_text(&self) -> String {
        format!("label {}", self.key)
    }

    pub fn text(&self) -> String {
        match self.parent {
            ContainerKind::Object => humanize_label(&self.key),
            ContainerKind::Sequence => self.key.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathModel {
    entries: IndexMap<Path, LeafEntry>,
    containers: Vec<ContainerInfo>,
    labels: Vec<Label>,
}

impl PathModel {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &LeafEntry> {
        self.entries.values()
    }

    pub fn paths(&self) -> Vec<Path> {
        self.entries.keys().cloned().collect()
    }

    pub fn get(&self, path: &Path) -> Option<&LeafEntry> {
        self.entries.get(path)
    }

    pub fn entry(&self, path: &Path) -> Result<&LeafEntry, HoneyPotError> {
        self.entries
            .get(path)
            .ok_or_else(|| HoneyPotError::unknown_path(path.as_str()))
    }

    pub(crate) fn entry_mut(&mut self, path: &Path) -> Result<&mut LeafEntry, HoneyPotError> {
        self.entries
            .get_mut(path)
            .ok_or_else(|| HoneyPotError::unknown_path(path.as_str()))
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut LeafEntry> {
        self.entries.values_mut()
    }

    pub fn containers(&self) -> &[ContainerInfo] {
        &self.containers
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.containers.clear();
        self.labels.clear();
    }
}

/// Flattens `snapshot` into leaf entries in depth-first order.
///
/// Object keys are visited in ascending order, sequence items by index.
/// Nulls and opaque host values produce no entry.
pub fn build_model(snapshot: &HpValue) -> PathModel {
    let mut model = PathModel::default();
    collect(snapshot, Path::root(), &[], &mut model);
    model
}

fn collect(value: &HpValue, path: Path, steps: &[Step], model: &mut PathModel) {
    match value {
        HpValue::Map(entries) => {
            model.containers.push(ContainerInfo {
                path: path.clone(),
                kind: ContainerKind::Object,
                empty: entries.is_empty(),
            });
            for (key, child) in entries {
                let child_path = path.child(key);
                model.labels.push(Label {
                    path: child_path.clone(),
                    key: key.clone(),
                    parent: ContainerKind::Object,
                });
                collect(child, child_path, &with_step(steps, Step::Key), model);
            }
        }
        HpValue::Array(items) => {
            model.containers.push(ContainerInfo {
                path: path.clone(),
                kind: ContainerKind::Sequence,
                empty: items.is_empty(),
            });
            for (index, child) in items.iter().enumerate() {
                let child_path = path.child(index);
                model.labels.push(Label {
                    path: child_path.clone(),
                    key: index.to_string(),
                    parent: ContainerKind::Sequence,
                });
                collect(child, child_path, &with_step(steps, Step::Index), model);
            }
        }
        other => {
            if let Some(leaf_type) = other.leaf_type() {
                let entry = LeafEntry::new(path.clone(), steps.to_vec(), leaf_type, other.clone());
                model.entries.insert(path, entry);
            }
        }
    }
}

fn with_step(steps: &[Step], step: Step) -> Vec<Step> {
    let mut out = Vec::with_capacity(steps.len() + 1);
    out.extend_from_slice(steps);
    out.push(step);
    out
}
