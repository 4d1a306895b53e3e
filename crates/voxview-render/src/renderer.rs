//! Renderer: a camera bound to a viewport, with the coordinate pipeline
//! between viewport and world space.

use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::camera::Camera;

/// A pixel-space rectangle within a window. Origin is the lower-left corner,
/// y grows upward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge in window pixels.
    pub x: f32,
    /// Bottom edge in window pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Viewport {
    /// Creates a viewport from its lower-left corner and size.
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    /// Returns (width, height).
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Returns width / height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }

    /// Returns true if the pixel position lies inside the viewport.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1280.0, 720.0)
    }
}

/// A camera bound to a viewport.
///
/// All conversions between viewport and world space run through the camera's
/// view-projection matrix; depth values are NDC depth in [0, 1]. Converting a
/// 2D viewport position uses the focal-plane depth (the depth of the camera
/// target) so picked points land on the plane the user is looking at.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    camera: Camera,
    viewport: Viewport,
}

impl Renderer {
    /// Creates a renderer for the given viewport, with the camera aspect
    /// ratio matched to it.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            camera: Camera::new(viewport.aspect_ratio()),
            viewport,
        }
    }

    /// Returns the camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Returns the camera for mutation. Aspect ratio is the caller's
    /// responsibility when changed directly; prefer [`Renderer::set_viewport`].
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Returns the viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Replaces the viewport and keeps the camera aspect ratio in sync.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.set_aspect_ratio(viewport.aspect_ratio());
    }

    /// Projects a world-space position into viewport coordinates.
    ///
    /// Returns (x, y) in viewport pixels and z as NDC depth in [0, 1].
    #[must_use]
    pub fn world_to_viewport(&self, world: Vec3) -> Vec3 {
        let clip = self.camera.view_projection_matrix() * world.extend(1.0);
        let ndc = clip.xyz() / clip.w;
        Vec3::new(
            self.viewport.x + (ndc.x + 1.0) * 0.5 * self.viewport.width,
            self.viewport.y + (ndc.y + 1.0) * 0.5 * self.viewport.height,
            ndc.z,
        )
    }

    /// Converts a 2D viewport position to world space at the focal-plane
    /// depth.
    #[must_use]
    pub fn viewport_to_world(&self, x: f32, y: f32) -> Vec3 {
        self.viewport_to_world_at_depth(x, y, self.focal_depth())
    }

    /// Converts a viewport position with explicit NDC depth to world space.
    #[must_use]
    pub fn viewport_to_world_at_depth(&self, x: f32, y: f32, z: f32) -> Vec3 {
        let ndc = Vec3::new(
            (x - self.viewport.x) / self.viewport.width * 2.0 - 1.0,
            (y - self.viewport.y) / self.viewport.height * 2.0 - 1.0,
            z,
        );
        self.unproject(ndc)
    }

    /// Converts a normalized [0, 1] viewport position to world space at the
    /// focal-plane depth.
    #[must_use]
    pub fn normalized_viewport_to_world(&self, x: f32, y: f32) -> Vec3 {
        self.normalized_viewport_to_world_at_depth(x, y, self.focal_depth())
    }

    /// Converts a normalized [0, 1] viewport position with explicit NDC depth
    /// to world space.
    #[must_use]
    pub fn normalized_viewport_to_world_at_depth(&self, x: f32, y: f32, z: f32) -> Vec3 {
        self.viewport_to_world_at_depth(
            self.viewport.x + x * self.viewport.width,
            self.viewport.y + y * self.viewport.height,
            z,
        )
    }

    /// NDC depth of the camera target.
    fn focal_depth(&self) -> f32 {
        self.world_to_viewport(self.camera.target).z
    }

    fn unproject(&self, ndc: Vec3) -> Vec3 {
        let inv = self.camera.view_projection_matrix().inverse();
        let h = inv * Vec4::new(ndc.x, ndc.y, ndc.z, 1.0);
        h.xyz() / h.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::ProjectionMode;
    use proptest::prelude::*;

    fn test_renderer() -> Renderer {
        let mut renderer = Renderer::new(Viewport::new(100.0, 50.0, 800.0, 600.0));
        renderer.camera_mut().position = Vec3::new(2.0, 3.0, 10.0);
        renderer.camera_mut().target = Vec3::new(0.5, -0.5, 0.0);
        // Keep the depth range well-conditioned for f32 round trips.
        renderer.camera_mut().set_near(0.1);
        renderer.camera_mut().set_far(100.0);
        renderer
    }

    #[test]
    fn test_focal_point_projects_to_viewport_center() {
        let renderer = test_renderer();
        let p = renderer.world_to_viewport(renderer.camera().target);
        assert!((p.x - 500.0).abs() < 0.1);
        assert!((p.y - 350.0).abs() < 0.1);
        assert!(p.z > 0.0 && p.z < 1.0);
    }

    #[test]
    fn test_viewport_to_world_lands_on_focal_plane() {
        let renderer = test_renderer();
        let world = renderer.viewport_to_world(500.0, 350.0);
        assert!((world - renderer.camera().target).length() < 0.02);
    }

    #[test]
    fn test_normalized_agrees_with_absolute() {
        let renderer = test_renderer();
        let absolute = renderer.viewport_to_world(300.0, 200.0);
        // normalized = (absolute - origin) / size
        let normalized = renderer.normalized_viewport_to_world(
            (300.0 - 100.0) / 800.0,
            (200.0 - 50.0) / 600.0,
        );
        assert!((absolute - normalized).length() < 1e-2);
    }

    #[test]
    fn test_round_trip_orthographic() {
        let mut renderer = test_renderer();
        renderer.camera_mut().set_projection_mode(ProjectionMode::Orthographic);
        renderer.camera_mut().set_ortho_scale(5.0);
        let world = renderer.viewport_to_world_at_depth(640.0, 130.0, 0.4);
        let back = renderer.world_to_viewport(world);
        assert!((back - Vec3::new(640.0, 130.0, 0.4)).length() < 1e-2);
    }

    proptest! {
        #[test]
        fn prop_round_trip_recovers_viewport_coords(
            x in 110.0_f32..890.0,
            y in 60.0_f32..640.0,
            z in 0.2_f32..0.9,
        ) {
            let renderer = test_renderer();
            let world = renderer.viewport_to_world_at_depth(x, y, z);
            let back = renderer.world_to_viewport(world);
            prop_assert!((back.x - x).abs() < 0.05);
            prop_assert!((back.y - y).abs() < 0.05);
            prop_assert!((back.z - z).abs() < 1e-3);
        }

        #[test]
        fn prop_world_round_trip_on_focal_plane(
            x in 150.0_f32..850.0,
            y in 100.0_f32..600.0,
        ) {
            let renderer = test_renderer();
            let world = renderer.viewport_to_world(x, y);
            let back = renderer.world_to_viewport(world);
            prop_assert!((back.x - x).abs() < 0.05);
            prop_assert!((back.y - y).abs() < 0.05);
        }
    }
}
