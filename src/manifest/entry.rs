use crate::error::{ManifestError, ViewerError};
use crate::manifest::calibration::{BoneNames, Calibration};
use serde::{Deserialize, Serialize};

/// Contents of `model_data.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub modellist: Vec<ManifestEntry>,
}

/// One model in the manifest. Every key other than `location` and `bones`
/// lands in the calibration map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub location: String,
    #[serde(default)]
    pub bones: BoneNames,
    #[serde(flatten)]
    pub calibration: Calibration,
}

impl Manifest {
    pub fn parse(json: &str) -> Result<Self, ViewerError> {
        let manifest: Manifest = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if self.modellist.is_empty() {
            return Err(ManifestError::Empty);
        }
        if let Some(index) = self
            .modellist
            .iter()
            .position(|entry| entry.location.trim().is_empty())
        {
            return Err(ManifestError::EmptyLocation { index });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_location_and_calibration() {
        let manifest = Manifest::parse(
            r#"{
                "modellist": [
                    { "location": "models/a.glb", "mouth_aaa": 3, "eye_wink_left": -1, "LXNA": -10 },
                    { "location": "models/b.glb" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.modellist.len(), 2);
        let first = &manifest.modellist[0];
        assert_eq!(first.location, "models/a.glb");
        assert_eq!(first.calibration.morph_index("mouth_aaa"), Some(3));
        assert_eq!(first.calibration.morph_index("eye_wink_left"), None);
        assert_eq!(first.calibration.angle("LXNA"), Some(-10.0));
        assert_eq!(first.calibration.len(), 3);
        assert_eq!(first.bones, BoneNames::default());
        assert!(manifest.modellist[1].calibration.is_empty());
    }

    #[test]
    fn bones_are_not_part_of_calibration() {
        let manifest = Manifest::parse(
            r#"{ "modellist": [ { "location": "a.glb", "bones": { "neck": "Neck" }, "mouth_iii": 1 } ] }"#,
        )
        .unwrap();
        let entry = &manifest.modellist[0];
        assert_eq!(entry.bones.neck, "Neck");
        assert_eq!(entry.calibration.len(), 1);
    }

    #[test]
    fn empty_list_is_rejected() {
        let err = Manifest::parse(r#"{ "modellist": [] }"#).unwrap_err();
        assert_eq!(err.key, "manifest-error");
    }

    #[test]
    fn blank_location_is_rejected() {
        let err = Manifest::parse(r#"{ "modellist": [ { "location": " " } ] }"#).unwrap_err();
        assert!(err.to_string().contains("model entry 0"));
    }

    #[test]
    fn missing_modellist_is_a_parse_error() {
        let err = Manifest::parse(r#"{ "models": [] }"#).unwrap_err();
        assert_eq!(err.key, "serde_json::Error");
    }
}
