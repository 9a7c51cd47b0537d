use nalgebra_glm as glm;

/// Orthographic camera looking down -Z. `zoom` scales the visible area.
#[derive(Debug, Clone)]
pub struct OrthographicCamera {
    pub frustum_size: f32,
    pub aspect: f32,
    pub zoom: f32,
    pub position: glm::Vec3,
    pub near: f32,
    pub far: f32,
    default_position: glm::Vec3,
}

impl OrthographicCamera {
    pub fn new(frustum_size: f32, aspect: f32, camera_z: f32) -> Self {
        let position = glm::vec3(0.0, 0.0, camera_z);
        Self {
            frustum_size,
            aspect,
            zoom: 1.0,
            position,
            near: 0.1,
            far: 1000.0,
            default_position: position,
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Half extents of the visible area in world units.
    pub fn half_extents(&self) -> (f32, f32) {
        let half_height = self.frustum_size / 2.0 / self.zoom;
        (half_height * self.aspect, half_height)
    }

    pub fn projection(&self) -> glm::Mat4 {
        let (half_width, half_height) = self.half_extents();
        glm::ortho_rh_zo(
            -half_width,
            half_width,
            -half_height,
            half_height,
            self.near,
            self.far,
        )
    }

    pub fn view(&self) -> glm::Mat4 {
        let target = self.position - glm::vec3(0.0, 0.0, 1.0);
        glm::look_at_rh(&self.position, &target, &glm::vec3(0.0, 1.0, 0.0))
    }

    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.position = self.default_position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frustum_edges_map_to_clip_edges() {
        let camera = OrthographicCamera::new(30.0, 2.0, 25.0);
        let view_proj = camera.projection() * camera.view();

        let top_right = view_proj * glm::vec4(30.0, 15.0, 0.0, 1.0);
        assert!((top_right.x - 1.0).abs() < 1e-5);
        assert!((top_right.y - 1.0).abs() < 1e-5);
        assert!(top_right.z > 0.0 && top_right.z < 1.0);
    }

    #[test]
    fn zoom_shrinks_visible_area() {
        let mut camera = OrthographicCamera::new(30.0, 1.0, 25.0);
        camera.zoom = 2.0;
        assert_eq!(camera.half_extents(), (7.5, 7.5));
        camera.reset();
        assert_eq!(camera.half_extents(), (15.0, 15.0));
    }

    #[test]
    fn zero_sized_window_keeps_aspect() {
        let mut camera = OrthographicCamera::new(30.0, 1.5, 25.0);
        camera.set_aspect(0, 600);
        assert_eq!(camera.aspect, 1.5);
        camera.set_aspect(800, 400);
        assert_eq!(camera.aspect, 2.0);
    }
}
