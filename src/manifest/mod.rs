pub mod calibration;
pub mod entry;

pub use calibration::{BoneNames, Calibration};
pub use entry::{Manifest, ManifestEntry};

/// Manifest looked up when no path is given on the command line.
pub const DEFAULT_MANIFEST: &str = "model_data.json";
