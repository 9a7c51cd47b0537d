use winit::event::MouseButton;

use super::OrthographicCamera;

/// Mouse pan and wheel zoom for the orthographic camera. No rotation.
pub struct CameraController {
    middle_mouse_pressed: bool,
    right_mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    min_zoom: f32,
    max_zoom: f32,
}

impl CameraController {
    pub fn new(min_zoom: f32, max_zoom: f32) -> Self {
        Self {
            middle_mouse_pressed: false,
            right_mouse_pressed: false,
            last_mouse_pos: None,
            min_zoom,
            max_zoom: max_zoom.max(min_zoom),
        }
    }

    pub fn set_zoom_limits(&mut self, min_zoom: f32, max_zoom: f32) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom.max(min_zoom);
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        match button {
            MouseButton::Middle => self.middle_mouse_pressed = pressed,
            MouseButton::Right => self.right_mouse_pressed = pressed,
            _ => return,
        }
        if !pressed {
            self.last_mouse_pos = None;
        }
    }

    /// Pan while a pan button is held. `viewport_height` is in pixels.
    pub fn on_mouse_move(
        &mut self,
        position: (f64, f64),
        viewport_height: u32,
        camera: &mut OrthographicCamera,
    ) -> bool {
        if !(self.middle_mouse_pressed || self.right_mouse_pressed) {
            self.last_mouse_pos = None;
            return false;
        }

        let mut handled = false;
        if let Some(last_pos) = self.last_mouse_pos {
            let delta_x = (position.0 - last_pos.0) as f32;
            let delta_y = (position.1 - last_pos.1) as f32;
            Self::pan(camera, delta_x, delta_y, viewport_height);
            handled = true;
        }
        self.last_mouse_pos = Some(position);
        handled
    }

    /// Positive `delta` zooms in.
    pub fn on_scroll(&mut self, delta: f32, camera: &mut OrthographicCamera) {
        let zoom_factor = 1.0 + delta * 0.1;
        if zoom_factor > 0.0 {
            camera.zoom = (camera.zoom * zoom_factor).clamp(self.min_zoom, self.max_zoom);
        }
    }

    fn pan(camera: &mut OrthographicCamera, delta_x: f32, delta_y: f32, viewport_height: u32) {
        if viewport_height == 0 {
            return;
        }
        let (_, half_height) = camera.half_extents();
        let world_per_pixel = 2.0 * half_height / viewport_height as f32;
        // Content follows the cursor
        camera.position.x -= delta_x * world_per_pixel;
        camera.position.y += delta_y * world_per_pixel;
    }

    pub fn reset(&mut self, camera: &mut OrthographicCamera) {
        camera.reset();
        self.last_mouse_pos = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_is_clamped() {
        let mut camera = OrthographicCamera::new(30.0, 1.0, 25.0);
        let mut controller = CameraController::new(0.25, 2.5);
        for _ in 0..100 {
            controller.on_scroll(1.0, &mut camera);
        }
        assert_eq!(camera.zoom, 2.5);
        for _ in 0..100 {
            controller.on_scroll(-1.0, &mut camera);
        }
        assert_eq!(camera.zoom, 0.25);
    }

    #[test]
    fn drag_without_pan_button_does_nothing() {
        let mut camera = OrthographicCamera::new(30.0, 1.0, 25.0);
        let mut controller = CameraController::new(0.25, 2.5);
        controller.on_mouse_button(MouseButton::Left, true);
        assert!(!controller.on_mouse_move((0.0, 0.0), 600, &mut camera));
        assert!(!controller.on_mouse_move((50.0, 50.0), 600, &mut camera));
        assert_eq!(camera.position, glm_origin(25.0));
    }

    #[test]
    fn middle_drag_pans_by_world_units() {
        let mut camera = OrthographicCamera::new(30.0, 1.0, 25.0);
        let mut controller = CameraController::new(0.25, 2.5);
        controller.on_mouse_button(MouseButton::Middle, true);
        controller.on_mouse_move((100.0, 100.0), 300, &mut camera);
        assert!(controller.on_mouse_move((110.0, 100.0), 300, &mut camera));
        // 30 world units over 300 pixels
        assert!((camera.position.x + 1.0).abs() < 1e-5);
        assert_eq!(camera.position.z, 25.0);

        controller.reset(&mut camera);
        assert_eq!(camera.position, glm_origin(25.0));
    }

    fn glm_origin(z: f32) -> nalgebra_glm::Vec3 {
        nalgebra_glm::vec3(0.0, 0.0, z)
    }
}
