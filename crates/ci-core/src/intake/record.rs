use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::fields::StepProjection;

/// The accumulated intake form: one flat object whose keys are the union of
/// every step slice submitted so far. Optional fields stay absent until set.
///
/// This is exactly the shape persisted by the draft store, so it also
/// serves as the durable layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntakeRecord(Map<String, Value>);

impl IntakeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Additive shallow merge: every key in `partial` overwrites its
    /// counterpart, every key not in `partial` is preserved.
    pub fn merge(&mut self, partial: Map<String, Value>) {
        for (key, value) in partial {
            self.0.insert(key, value);
        }
    }

    /// The slice of the record covered by one step projection, used to seed
    /// a step screen's defaults on mount.
    pub fn slice(&self, step: &StepProjection) -> Map<String, Value> {
        step.fields
            .iter()
            .filter_map(|spec| {
                self.0
                    .get(spec.name)
                    .map(|value| (spec.name.to_string(), value.clone()))
            })
            .collect()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
