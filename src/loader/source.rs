use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::error::ViewerError;

/// Where an asset lives: on disk or behind an HTTP(S) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    Local(PathBuf),
    Remote(Url),
}

impl AssetLocation {
    pub fn parse(location: &str) -> Result<Self, ViewerError> {
        if !is_url(location) {
            return Ok(AssetLocation::Local(PathBuf::from(location)));
        }
        let url = Url::parse(location).map_err(|e| {
            ViewerError::new("asset-url")
                .with_arg("location", location)
                .push_std(e)
        })?;
        Ok(AssetLocation::Remote(url))
    }

    /// Resolve a manifest-relative `location` against this asset.
    ///
    /// Remote bases follow URL reference rules, so `/x.glb` is host-rooted
    /// and `../x.glb` climbs out of the manifest's directory.
    pub fn resolve(&self, location: &str) -> Result<AssetLocation, ViewerError> {
        match self {
            AssetLocation::Local(_) if is_url(location) => AssetLocation::parse(location),
            AssetLocation::Local(path) if !Path::new(location).is_absolute() => {
                let dir = path.parent().unwrap_or_else(|| Path::new(""));
                Ok(AssetLocation::Local(dir.join(location)))
            }
            AssetLocation::Local(_) => Ok(AssetLocation::Local(PathBuf::from(location))),
            AssetLocation::Remote(base) => {
                let url = base.join(location).map_err(|e| {
                    ViewerError::new("asset-resolve")
                        .with_arg("base", base)
                        .with_arg("location", location)
                        .push_std(e)
                })?;
                Ok(AssetLocation::Remote(url))
            }
        }
    }

    pub fn file_name(&self) -> String {
        match self {
            AssetLocation::Local(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            AssetLocation::Remote(url) => url
                .path_segments()
                .and_then(|segments| segments.last())
                .filter(|name| !name.is_empty())
                .unwrap_or(url.as_str())
                .to_string(),
        }
    }

    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        let (_, ext) = name.rsplit_once('.')?;
        Some(ext.to_ascii_lowercase())
    }
}

impl fmt::Display for AssetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetLocation::Local(path) => write!(f, "{}", path.display()),
            AssetLocation::Remote(url) => write!(f, "{url}"),
        }
    }
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Whole-number download percentage, as printed in the progress log.
pub fn progress_percent(loaded: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((loaded as f64 / total as f64) * 100.0).round().min(100.0) as u32
}

/// Read an asset into memory, logging download progress for remote files.
pub async fn fetch_bytes(location: &AssetLocation) -> Result<Vec<u8>, ViewerError> {
    match location {
        AssetLocation::Local(path) => tokio::fs::read(path).await.map_err(|e| {
            ViewerError::new("asset-read")
                .with_arg("path", path.display())
                .push_std(e)
        }),
        AssetLocation::Remote(url) => download(url).await,
    }
}

async fn download(url: &Url) -> Result<Vec<u8>, ViewerError> {
    let mut response = reqwest::get(url.clone()).await?;

    if !response.status().is_success() {
        return Err(ViewerError::new("asset-download")
            .with_arg("url", url)
            .with_arg("status", response.status()));
    }

    let total = response.content_length();
    let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
    let mut last_percent = None;

    while let Some(chunk) = response.chunk().await? {
        bytes.extend_from_slice(&chunk);
        if let Some(total) = total {
            let percent = progress_percent(bytes.len() as u64, total);
            if last_percent != Some(percent) {
                log::info!("{url}: {percent}% downloaded");
                last_percent = Some(percent);
            }
        }
    }

    Ok(bytes)
}
