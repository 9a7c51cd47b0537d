use std::{collections::BTreeMap, fmt, io, sync::Arc};

#[derive(Debug, Clone)]
pub struct ViewerError {
    pub key: &'static str,
    pub args: BTreeMap<&'static str, String>,
    pub causes: Vec<ViewerCause>,
}

#[derive(Debug, Clone)]
pub enum ViewerCause {
    Viewer(Box<ViewerError>),
    Std(Arc<dyn std::error::Error + Send + Sync>),
}

/// Structural problems with `model_data.json` that serde alone does not catch.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("manifest lists no models")]
    Empty,
    #[error("model entry {index} has an empty location")]
    EmptyLocation { index: usize },
}

impl ViewerError {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            args: BTreeMap::new(),
            causes: Vec::new(),
        }
    }

    pub fn with_arg(mut self, k: &'static str, v: impl ToString) -> Self {
        self.args.insert(k, v.to_string());
        self
    }

    pub fn push_viewer(mut self, cause: ViewerError) -> Self {
        self.causes.push(ViewerCause::Viewer(Box::new(cause)));
        self
    }

    pub fn push_std(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.causes.push(ViewerCause::Std(Arc::new(cause)));
        self
    }
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.key)?;
        let mut first = true;
        for (k, v) in &self.args {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        write!(f, ")")?;
        for cause in &self.causes {
            match cause {
                ViewerCause::Viewer(e) => write!(f, ": {e}")?,
                ViewerCause::Std(e) => write!(f, ": {e}")?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes.iter().find_map(|c| match c {
            ViewerCause::Viewer(e) => Some(e.as_ref() as &dyn std::error::Error),
            ViewerCause::Std(e) => Some(e.as_ref() as &(dyn std::error::Error + 'static)),
        })
    }
}

impl From<ManifestError> for ViewerError {
    fn from(err: ManifestError) -> Self {
        ViewerError::new("manifest-error").push_std(err)
    }
}

impl From<io::Error> for ViewerError {
    fn from(err: io::Error) -> Self {
        ViewerError::new("io-error").push_std(err)
    }
}

impl From<reqwest::Error> for ViewerError {
    fn from(err: reqwest::Error) -> Self {
        ViewerError::new("reqwest::Error").push_std(err)
    }
}

impl From<serde_json::Error> for ViewerError {
    fn from(err: serde_json::Error) -> Self {
        ViewerError::new("serde_json::Error").push_std(err)
    }
}

impl From<gltf::Error> for ViewerError {
    fn from(err: gltf::Error) -> Self {
        ViewerError::new("gltf::Error").push_std(err)
    }
}

impl From<tokio::task::JoinError> for ViewerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ViewerError::new("tokio::task::JoinError").push_std(err)
    }
}

impl From<wgpu::CreateSurfaceError> for ViewerError {
    fn from(err: wgpu::CreateSurfaceError) -> Self {
        ViewerError::new("wgpu::CreateSurfaceError").push_std(err)
    }
}

impl From<wgpu::RequestAdapterError> for ViewerError {
    fn from(err: wgpu::RequestAdapterError) -> Self {
        ViewerError::new("wgpu::RequestAdapterError").push_std(err)
    }
}

impl From<wgpu::RequestDeviceError> for ViewerError {
    fn from(err: wgpu::RequestDeviceError) -> Self {
        ViewerError::new("wgpu::RequestDeviceError").push_std(err)
    }
}

impl From<winit::error::EventLoopError> for ViewerError {
    fn from(err: winit::error::EventLoopError) -> Self {
        ViewerError::new("winit::error::EventLoopError").push_std(err)
    }
}

impl From<winit::error::OsError> for ViewerError {
    fn from(err: winit::error::OsError) -> Self {
        ViewerError::new("winit::error::OsError").push_std(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_args_in_key_order() {
        let err = ViewerError::new("model-load")
            .with_arg("location", "a.glb")
            .with_arg("index", 2);
        assert_eq!(err.to_string(), "model-load(index=2, location=a.glb)");
    }

    #[test]
    fn display_appends_causes() {
        let err = ViewerError::new("manifest-load").push_viewer(ManifestError::Empty.into());
        assert_eq!(
            err.to_string(),
            "manifest-load(): manifest-error(): manifest lists no models"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn std_cause_is_reachable_through_source() {
        let io = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err = ViewerError::new("asset-read").with_arg("path", "a.glb").push_std(io);
        assert_eq!(err.to_string(), "asset-read(path=a.glb): gone");

        let source = std::error::Error::source(&err).unwrap();
        let io = source.downcast_ref::<io::Error>().unwrap();
        assert_eq!(io.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn nested_viewer_error_keeps_its_own_causes() {
        let inner = ViewerError::new("asset-read").push_std(io::Error::other("gone"));
        let outer = ViewerError::new("model-load").with_arg("index", 0).push_viewer(inner);
        assert_eq!(outer.to_string(), "model-load(index=0): asset-read(): gone");

        let inner = std::error::Error::source(&outer)
            .and_then(|e| e.downcast_ref::<ViewerError>())
            .unwrap();
        assert_eq!(inner.key, "asset-read");
    }
}
