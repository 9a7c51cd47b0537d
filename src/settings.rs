use serde::{Deserialize, Serialize};

pub const CONFY_APP_NAME: &str = "morphvis-rs";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub background_color: [f32; 3],
    pub ambient_color: [f32; 3],
    pub light_color: [f32; 3],
    pub light_direction: [f32; 3],
    /// Visible height of the orthographic frustum in world units.
    pub frustum_size: f32,
    pub camera_z: f32,
    pub model_offset_y: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            background_color: [1.0, 1.0, 1.0],
            // 0x666666 and 0x887766
            ambient_color: [0.4, 0.4, 0.4],
            light_color: [0.533, 0.467, 0.4],
            light_direction: [-1.0, 1.0, 1.0],
            frustum_size: 30.0,
            camera_z: 25.0,
            model_offset_y: -10.0,
            min_zoom: 0.25,
            max_zoom: 2.5,
        }
    }
}

impl DisplaySettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "display").unwrap_or_default()
    }

    pub fn save(&self) {
        if let Err(e) = confy::store(CONFY_APP_NAME, "display", self) {
            log::warn!("Failed to save display settings: {e}");
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineSettings {
    pub enabled: bool,
    pub thickness: f32,
    pub color: [f32; 3],
}

impl Default for OutlineSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            thickness: 0.05,
            color: [0.0, 0.0, 0.0],
        }
    }
}

impl OutlineSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "outline").unwrap_or_default()
    }

    pub fn save(&self) {
        if let Err(e) = confy::store(CONFY_APP_NAME, "outline", self) {
            log::warn!("Failed to save outline settings: {e}");
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    pub show_controls: bool,
    pub show_display_settings: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            show_controls: true,
            show_display_settings: false,
        }
    }
}

impl UiSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "ui").unwrap_or_default()
    }

    pub fn save(&self) {
        if let Err(e) = confy::store(CONFY_APP_NAME, "ui", self) {
            log::warn!("Failed to save ui settings: {e}");
        }
    }
}

// Aggregate struct for convenience
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub display: DisplaySettings,
    pub outline: OutlineSettings,
    pub ui: UiSettings,
}

impl Settings {
    pub fn load() -> Self {
        Self {
            display: DisplaySettings::load(),
            outline: OutlineSettings::load(),
            ui: UiSettings::load(),
        }
    }
}
