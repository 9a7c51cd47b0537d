mod import;
mod source;

pub use import::{import_path, import_slice};
pub use source::{AssetLocation, fetch_bytes};

use crate::error::ViewerError;
use crate::manifest::{Manifest, ManifestEntry};
use crate::model::{LoadedModel, ModelEntry};

pub async fn load_manifest(location: &AssetLocation) -> Result<Manifest, ViewerError> {
    let bytes = fetch_bytes(location).await?;
    let text = String::from_utf8_lossy(&bytes);
    Manifest::parse(&text).map_err(|e| {
        ViewerError::new("manifest-load")
            .with_arg("location", location)
            .push_viewer(e)
    })
}

/// Fetch the manifest and every model it lists.
///
/// Models load concurrently; the returned list keeps manifest order. The
/// first failure aborts the whole load.
pub async fn load_models(manifest_location: &str) -> Result<Vec<ModelEntry>, ViewerError> {
    let base = AssetLocation::parse(manifest_location)?;
    let manifest = load_manifest(&base).await?;
    log::info!("Manifest {base} lists {} models", manifest.modellist.len());

    let mut handles = Vec::with_capacity(manifest.modellist.len());
    for (index, entry) in manifest.modellist.into_iter().enumerate() {
        let location = base.resolve(&entry.location)?;
        handles.push(tokio::spawn(load_entry(index, entry, location)));
    }

    let mut models = Vec::with_capacity(handles.len());
    for handle in handles {
        models.push(handle.await??);
    }
    Ok(models)
}

async fn load_entry(
    index: usize,
    entry: ManifestEntry,
    location: AssetLocation,
) -> Result<ModelEntry, ViewerError> {
    let name = location.file_name();
    log::info!("Loading model {index}: {location}");

    let model = load_asset(&name, &location).await.map_err(|e| {
        ViewerError::new("model-load")
            .with_arg("index", index)
            .with_arg("location", &location)
            .push_viewer(e)
    })?;

    Ok(ModelEntry {
        location: entry.location,
        calibration: entry.calibration,
        bones: entry.bones,
        model,
    })
}

async fn load_asset(name: &str, location: &AssetLocation) -> Result<LoadedModel, ViewerError> {
    let name = name.to_string();
    match location {
        // External buffer URIs only resolve against the filesystem
        AssetLocation::Local(path) if location.extension().as_deref() == Some("gltf") => {
            let path = path.clone();
            tokio::task::spawn_blocking(move || import_path(&name, &path)).await?
        }
        _ => {
            let bytes = fetch_bytes(location).await?;
            tokio::task::spawn_blocking(move || import_slice(&name, &bytes)).await?
        }
    }
}

#[cfg(test)]
mod tests {
    use super::import::fixtures;
    use super::*;
    use crate::scene::Scene;
    use crate::settings::DisplaySettings;
    use crate::switcher::{ModelSwitcher, Step};

    #[tokio::test]
    async fn missing_manifest_fails_with_path() {
        let err = load_models("definitely/not/here/model_data.json")
            .await
            .unwrap_err();
        assert_eq!(err.key, "asset-read");
        assert!(err.to_string().contains("model_data.json"));
    }

    #[tokio::test]
    async fn manifest_with_unreadable_model_aborts() {
        let dir = std::env::temp_dir().join(format!("morphvis-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let manifest = dir.join("model_data.json");
        std::fs::write(&manifest, r#"{ "modellist": [ { "location": "missing.glb", "mouth_aaa": 3 } ] }"#)
            .unwrap();

        let err = load_models(manifest.to_str().unwrap()).await.unwrap_err();
        assert_eq!(err.key, "model-load");
        assert!(err.to_string().contains("missing.glb"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn invalid_model_bytes_are_an_import_error() {
        let dir = std::env::temp_dir().join(format!("morphvis-import-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("broken.glb"), b"not a gltf").unwrap();
        let manifest = dir.join("model_data.json");
        std::fs::write(&manifest, r#"{ "modellist": [ { "location": "broken.glb" } ] }"#).unwrap();

        let err = load_models(manifest.to_str().unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("gltf-import"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn loaded_models_drive_the_switcher_controls() {
        let dir = std::env::temp_dir().join(format!("morphvis-figures-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        fixtures::write_figure_gltf(&dir);
        std::fs::write(dir.join("figure.glb"), fixtures::figure_glb()).unwrap();
        let manifest = dir.join("model_data.json");
        std::fs::write(
            &manifest,
            r#"{ "modellist": [
                { "location": "figure.gltf", "mouth_aaa": 3, "mouth_iii": -1 },
                { "location": "figure.glb", "mouth_aaa": 0 }
            ] }"#,
        )
        .unwrap();

        let models = load_models(manifest.to_str().unwrap()).await.unwrap();
        std::fs::remove_dir_all(&dir).unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].location, "figure.gltf");
        assert_eq!(models[1].location, "figure.glb");

        let mut scene = Scene::new(&DisplaySettings::default(), 1.0);
        let mut switcher = ModelSwitcher::new(models, &mut scene).unwrap();
        assert!(switcher.set_control("mouth_aaa", 0.5));
        assert!(switcher.set_control("mouth_iii", 0.5));
        assert_eq!(switcher.active().model.rig.morph_target_influences, vec![0.0, 0.0, 0.0, 0.5]);

        let panel = switcher.panel().unwrap();
        assert_eq!(panel.is_inert("head_x"), Some(false));
        assert_eq!(panel.is_inert("iris_rotation_x"), Some(true));

        // index 0 is a real target, not a missing calibration
        assert_eq!(switcher.step(Step::Next, &mut scene), 1);
        assert!(switcher.set_control("mouth_aaa", 1.0));
        assert_eq!(switcher.active().model.rig.morph_target_influences, vec![1.0, 0.0, 0.0, 0.0]);
    }
}
