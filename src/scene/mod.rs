mod camera;
mod controller;

pub use camera::OrthographicCamera;
pub use controller::CameraController;

use nalgebra_glm as glm;

use crate::settings::DisplaySettings;

#[derive(Debug, Clone)]
pub struct DirectionalLight {
    pub color: glm::Vec3,
    /// Normalized direction the light comes from.
    pub direction: glm::Vec3,
}

/// What the renderer draws: lights, camera and at most one attached model.
#[derive(Debug, Clone)]
pub struct Scene {
    pub background: [f32; 3],
    pub ambient: glm::Vec3,
    pub light: DirectionalLight,
    pub camera: OrthographicCamera,
    pub model_offset: glm::Vec3,
    attached: Option<usize>,
}

impl Scene {
    pub fn new(display: &DisplaySettings, aspect: f32) -> Self {
        let mut scene = Self {
            background: display.background_color,
            ambient: glm::Vec3::from(display.ambient_color),
            light: DirectionalLight {
                color: glm::Vec3::from(display.light_color),
                direction: glm::vec3(0.0, 0.0, 1.0),
            },
            camera: OrthographicCamera::new(display.frustum_size, aspect, display.camera_z),
            model_offset: glm::vec3(0.0, display.model_offset_y, 0.0),
            attached: None,
        };
        scene.apply_display(display);
        scene
    }

    /// Push edited display settings into the scene. The camera's pan and
    /// zoom are kept.
    pub fn apply_display(&mut self, display: &DisplaySettings) {
        self.background = display.background_color;
        self.ambient = glm::Vec3::from(display.ambient_color);
        self.light.color = glm::Vec3::from(display.light_color);
        let direction = glm::Vec3::from(display.light_direction);
        if glm::length(&direction) > f32::EPSILON {
            self.light.direction = glm::normalize(&direction);
        }
        self.camera.frustum_size = display.frustum_size;
        self.model_offset = glm::vec3(0.0, display.model_offset_y, 0.0);
    }

    /// Attach a model by index, returning the one it replaced.
    pub fn attach(&mut self, model: usize) -> Option<usize> {
        self.attached.replace(model)
    }

    pub fn detach(&mut self) -> Option<usize> {
        self.attached.take()
    }

    pub fn attached(&self) -> Option<usize> {
        self.attached
    }

    pub fn model_matrix(&self) -> glm::Mat4 {
        glm::translation(&self.model_offset)
    }

    pub fn view_proj(&self) -> glm::Mat4 {
        self.camera.projection() * self.camera.view() * self.model_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_model_is_attached() {
        let mut scene = Scene::new(&DisplaySettings::default(), 1.0);
        assert_eq!(scene.attached(), None);
        assert_eq!(scene.attach(0), None);
        assert_eq!(scene.attach(2), Some(0));
        assert_eq!(scene.attached(), Some(2));
        assert_eq!(scene.detach(), Some(2));
        assert_eq!(scene.attached(), None);
    }

    #[test]
    fn light_direction_is_normalized() {
        let scene = Scene::new(&DisplaySettings::default(), 1.0);
        assert!((glm::length(&scene.light.direction) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn model_offset_lowers_the_figure() {
        let scene = Scene::new(&DisplaySettings::default(), 1.0);
        let origin = scene.view_proj() * glm::vec4(0.0, 0.0, 0.0, 1.0);
        // y = -10 in a 30 unit tall frustum
        assert!((origin.y + 10.0 / 15.0).abs() < 1e-5);
    }
}
