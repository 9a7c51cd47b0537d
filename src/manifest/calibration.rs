use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Morph index value that marks a control as absent on a model.
pub const UNUSED_INDEX: i64 = -1;

/// Per-model named constants: morph-target indices and iris angle bounds.
///
/// Stored as raw JSON values so a manifest can carry keys this viewer does
/// not know about. Lookups are typed and never fail loudly; a key that is
/// missing or malformed reads as "not present".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Calibration(BTreeMap<String, Value>);

impl Calibration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Morph-target index for `key`.
    ///
    /// `None` when the key is missing, holds the unused sentinel, or is not a
    /// non-negative whole number.
    pub fn morph_index(&self, key: &str) -> Option<usize> {
        let value = self.0.get(key)?;
        let raw = match value.as_i64() {
            Some(n) => n,
            None => {
                let f = value.as_f64()?;
                if f.fract() != 0.0 {
                    return None;
                }
                f as i64
            }
        };
        // Only the sentinel means unused; index 0 is a real morph target.
        if raw == UNUSED_INDEX {
            return None;
        }
        usize::try_from(raw).ok()
    }

    /// Angle in degrees stored under `key`.
    pub fn angle(&self, key: &str) -> Option<f32> {
        self.0.get(key)?.as_f64().map(|v| v as f32)
    }
}

impl FromIterator<(String, Value)> for Calibration {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Skeleton bone names the rotation controls drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoneNames {
    pub neck: String,
    pub left_eye: String,
    pub right_eye: String,
}

impl Default for BoneNames {
    fn default() -> Self {
        Self {
            neck: "首".to_string(),
            left_eye: "左目".to_string(),
            right_eye: "右目".to_string(),
        }
    }
}
