//! Per-path lock state layered on [`PathModel`].

use hp_core::{HoneyPotError, HpValue, Path};

use crate::model::PathModel;

impl PathModel {
    /// Records the lock and captures `value` as the locked value.
    ///
    /// Returns `true` when the stored value differs and the external source
    /// has to be forced to the locked value right away.
    pub fn set_lock(
        &mut self,
        path: &Path,
        locked: bool,
        value: HpValue,
    ) -> Result<bool, HoneyPotError> {
        let entry = self.entry_mut(path)?;
        entry.locked = locked;
        entry.locked_value = value;
        Ok(entry.value != entry.locked_value)
    }

    pub fn is_locked(&self, path: &Path) -> Result<bool, HoneyPotError> {
        Ok(self.entry(path)?.locked())
    }

    pub fn locked_value(&self, path: &Path) -> Result<&HpValue, HoneyPotError> {
        Ok(self.entry(path)?.locked_value())
    }

    pub fn locked_paths(&self) -> Vec<Path> {
        self.entries()
            .filter(|entry| entry.locked())
            .map(|entry| entry.path().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::build_model;
    use std::collections::BTreeMap;

    fn model() -> PathModel {
        build_model(&HpValue::Map(BTreeMap::from([(
            "hp".to_string(),
            HpValue::Integer(10),
        )])))
    }

    #[test]
    fn set_lock_reports_when_a_forced_write_is_needed() {
        let mut model = model();
        let hp = Path::parse(".hp");
        assert!(!model.is_locked(&hp).expect("known path"));
        assert!(model
            .set_lock(&hp, true, HpValue::Integer(99))
            .expect("lock"));
        assert!(model.is_locked(&hp).expect("known path"));
        assert_eq!(model.locked_value(&hp), Ok(&HpValue::Integer(99)));
        assert!(!model
            .set_lock(&hp, true, HpValue::Integer(10))
            .expect("lock at current value"));
        assert_eq!(model.locked_paths(), vec![hp]);
    }

    #[test]
    fn locking_an_unknown_path_fails() {
        let mut model = model();
        let error = model
            .set_lock(&Path::parse(".mp"), true, HpValue::Integer(1))
            .expect_err("unknown");
        assert_eq!(error.code, "UNKNOWN_PATH");
    }
}
