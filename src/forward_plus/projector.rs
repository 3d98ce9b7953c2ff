//! Screen-space bounds of a light's influence volume
//!
//! Pixel space has its origin in the top-left corner with y pointing down,
//! matching `gl_FragCoord` on wgpu and Vulkan. NDC depth is expected in
//! [0, 1], which is what [`glam::Mat4::perspective_rh`] and
//! [`glam::Mat4::orthographic_rh`] produce.

use glam::{Mat4, Vec3};

use super::tile_grid::Viewport;
use crate::scene::CameraMatrices;

/// Clip-space `w` at or below this is treated as lying on or behind the
/// camera plane.
const W_EPSILON: f32 = 1e-6;

/// Axis-aligned pixel rectangle covered by a light this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl ScreenRect {
    /// A rectangle left of and above every viewport.
    pub const OFF_SCREEN: Self = Self {
        min_x: -1.0,
        max_x: -1.0,
        min_y: -1.0,
        max_y: -1.0,
    };

    /// Result of a singular camera transform.
    pub const DEGENERATE: Self = Self {
        min_x: f32::NAN,
        max_x: f32::NAN,
        min_y: f32::NAN,
        max_y: f32::NAN,
    };

    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn full(viewport: Viewport) -> Self {
        Self::new(0.0, viewport.width as f32, 0.0, viewport.height as f32)
    }

    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.max_x.is_finite()
            && self.min_y.is_finite()
            && self.max_y.is_finite()
    }

    pub fn is_off_screen(&self, viewport: Viewport) -> bool {
        self.max_x < 0.0
            || self.min_x > viewport.width as f32
            || self.max_y < 0.0
            || self.min_y > viewport.height as f32
    }

    pub fn clamped(&self, viewport: Viewport) -> Self {
        let (w, h) = (viewport.width as f32, viewport.height as f32);
        Self::new(
            self.min_x.clamp(0.0, w),
            self.max_x.clamp(0.0, w),
            self.min_y.clamp(0.0, h),
            self.max_y.clamp(0.0, h),
        )
    }

    pub fn contains(&self, other: &ScreenRect, tolerance: f32) -> bool {
        other.min_x >= self.min_x - tolerance
            && other.max_x <= self.max_x + tolerance
            && other.min_y >= self.min_y - tolerance
            && other.max_y <= self.max_y + tolerance
    }
}

/// How a light's bounding sphere is turned into a screen rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoundsMode {
    /// Project the 8 corners of the sphere's bounding cube. Slightly larger
    /// than the sphere's true footprint, works for any projection.
    #[default]
    CubeCorners,
    /// Exact bounds of the sphere's silhouette for symmetric perspective
    /// projections; other projections use [`BoundsMode::CubeCorners`].
    Sphere,
}

/// Projects light volumes into pixel space
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenBoundsProjector {
    mode: BoundsMode,
}

impl ScreenBoundsProjector {
    pub fn new(mode: BoundsMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> BoundsMode {
        self.mode
    }

    /// Conservative pixel bounds of the sphere at `center` (world space).
    ///
    /// Volumes entirely behind the camera, before the near plane or beyond
    /// the far plane come back as [`ScreenRect::OFF_SCREEN`]. Volumes that
    /// cross the camera plane cover the whole viewport. A singular camera
    /// yields a non-finite rectangle.
    pub fn project(
        &self,
        camera: &CameraMatrices,
        viewport: Viewport,
        center: Vec3,
        radius: f32,
    ) -> ScreenRect {
        match self.mode {
            BoundsMode::CubeCorners => project_cube_corners(camera, viewport, center, radius),
            BoundsMode::Sphere => project_sphere(camera, viewport, center, radius)
                .unwrap_or_else(|| project_cube_corners(camera, viewport, center, radius)),
        }
    }
}

fn project_cube_corners(
    camera: &CameraMatrices,
    viewport: Viewport,
    center: Vec3,
    radius: f32,
) -> ScreenRect {
    let half_w = viewport.width as f32 * 0.5;
    let half_h = viewport.height as f32 * 0.5;

    let mut rect = ScreenRect::new(f32::MAX, f32::MIN, f32::MAX, f32::MIN);
    let mut behind = 0;
    let mut before_near = 0;
    let mut beyond_far = 0;

    for corner in 0..8u32 {
        let offset = Vec3::new(
            if corner & 1 == 0 { -radius } else { radius },
            if corner & 2 == 0 { -radius } else { radius },
            if corner & 4 == 0 { -radius } else { radius },
        );
        let clip = camera.view_projection * (center + offset).extend(1.0);
        if !clip.is_finite() {
            return ScreenRect::DEGENERATE;
        }
        if clip.w <= W_EPSILON {
            behind += 1;
            continue;
        }

        let ndc = clip.truncate() / clip.w;
        if !ndc.is_finite() {
            return ScreenRect::DEGENERATE;
        }
        if ndc.z < 0.0 {
            before_near += 1;
        } else if ndc.z > 1.0 {
            beyond_far += 1;
        }

        let x = ndc.x * half_w + half_w;
        let y = half_h - ndc.y * half_h;
        rect.min_x = rect.min_x.min(x);
        rect.max_x = rect.max_x.max(x);
        rect.min_y = rect.min_y.min(y);
        rect.max_y = rect.max_y.max(y);
    }

    match behind {
        8 => ScreenRect::OFF_SCREEN,
        0 if before_near == 8 || beyond_far == 8 => ScreenRect::OFF_SCREEN,
        0 => rect,
        _ => ScreenRect::full(viewport),
    }
}

/// `None` when the projection is not a symmetric [0, 1] depth perspective.
fn project_sphere(
    camera: &CameraMatrices,
    viewport: Viewport,
    center: Vec3,
    radius: f32,
) -> Option<ScreenRect> {
    let proj = camera.projection;
    if !is_symmetric_perspective(&proj) {
        return None;
    }

    let view_center = camera.view.transform_point3(center);
    if !view_center.is_finite() {
        return Some(ScreenRect::DEGENERATE);
    }

    let depth = -view_center.z;
    if depth + radius <= W_EPSILON {
        return Some(ScreenRect::OFF_SCREEN);
    }
    if depth - radius <= W_EPSILON {
        return Some(ScreenRect::full(viewport));
    }

    let ndc_depth = |d: f32| (proj.w_axis.z - proj.z_axis.z * d) / d;
    if ndc_depth(depth + radius) < 0.0 || ndc_depth(depth - radius) > 1.0 {
        return Some(ScreenRect::OFF_SCREEN);
    }

    let (min_sx, max_sx) = tangent_slopes(view_center.x, depth, radius);
    let (min_sy, max_sy) = tangent_slopes(view_center.y, depth, radius);

    let half_w = viewport.width as f32 * 0.5;
    let half_h = viewport.height as f32 * 0.5;
    let to_x = |slope: f32| proj.x_axis.x * slope * half_w + half_w;
    let to_y = |slope: f32| half_h - proj.y_axis.y * slope * half_h;

    // Larger view-space y is higher on screen, so it bounds min_y.
    Some(ScreenRect::new(
        to_x(min_sx),
        to_x(max_sx),
        to_y(max_sy),
        to_y(min_sy),
    ))
}

/// Depth must grow with view distance, so reversed-Z matrices are rejected.
fn is_symmetric_perspective(proj: &Mat4) -> bool {
    proj.z_axis.w == -1.0
        && proj.z_axis.z < 0.0
        && proj.w_axis.z < 0.0
        && proj.w_axis.w == 0.0
        && proj.z_axis.x == 0.0
        && proj.z_axis.y == 0.0
        && proj.x_axis.y == 0.0
        && proj.y_axis.x == 0.0
}

/// Slopes (`a / depth`) of the two lines through the eye tangent to a circle
/// at (`a`, `depth`) with radius `r`. Requires `depth > r`.
fn tangent_slopes(a: f32, depth: f32, r: f32) -> (f32, f32) {
    let t = (a * a + depth * depth - r * r).sqrt();
    let low = (a * t - r * depth) / (depth * t + a * r);
    let high = (a * t + r * depth) / (depth * t - a * r);
    (low, high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Camera, Projection};

    const VIEWPORT: Viewport = Viewport {
        width: 640,
        height: 480,
    };

    fn camera() -> CameraMatrices {
        Camera::new(Vec3::ZERO, Vec3::NEG_Z)
            .with_projection(Projection::perspective(60.0, 640.0 / 480.0, 0.1, 100.0))
            .matrices()
    }

    #[test]
    fn test_centered_light_is_centered() {
        let projector = ScreenBoundsProjector::default();
        let rect = projector.project(&camera(), VIEWPORT, Vec3::new(0.0, 0.0, -10.0), 1.0);
        assert!(rect.is_finite());
        assert!(((rect.min_x + rect.max_x) * 0.5 - 320.0).abs() < 1e-3);
        assert!(((rect.min_y + rect.max_y) * 0.5 - 240.0).abs() < 1e-3);
        assert!(rect.max_x - rect.min_x > 0.0);
    }

    #[test]
    fn test_screen_y_points_down() {
        let projector = ScreenBoundsProjector::default();
        let rect = projector.project(&camera(), VIEWPORT, Vec3::new(0.0, 3.0, -10.0), 0.5);
        assert!(rect.max_y < 240.0);
    }

    #[test]
    fn test_light_at_camera_covers_viewport() {
        for mode in [BoundsMode::CubeCorners, BoundsMode::Sphere] {
            let rect = ScreenBoundsProjector::new(mode).project(&camera(), VIEWPORT, Vec3::ZERO, 100.0);
            assert_eq!(rect, ScreenRect::full(VIEWPORT));
        }
    }

    #[test]
    fn test_light_behind_camera_is_off_screen() {
        for mode in [BoundsMode::CubeCorners, BoundsMode::Sphere] {
            let rect = ScreenBoundsProjector::new(mode).project(
                &camera(),
                VIEWPORT,
                Vec3::new(0.0, 0.0, 10.0),
                2.0,
            );
            assert!(rect.is_off_screen(VIEWPORT));
        }
    }

    #[test]
    fn test_light_beyond_far_plane_is_off_screen() {
        for mode in [BoundsMode::CubeCorners, BoundsMode::Sphere] {
            let rect = ScreenBoundsProjector::new(mode).project(
                &camera(),
                VIEWPORT,
                Vec3::new(0.0, 0.0, -150.0),
                10.0,
            );
            assert!(rect.is_off_screen(VIEWPORT));
        }
    }

    #[test]
    fn test_singular_camera_is_degenerate() {
        let broken = CameraMatrices::new(Mat4::NAN, Mat4::IDENTITY);
        let rect = ScreenBoundsProjector::default().project(&broken, VIEWPORT, Vec3::ZERO, 1.0);
        assert!(!rect.is_finite());
    }

    #[test]
    fn test_sphere_bounds_inside_cube_bounds() {
        let cube = ScreenBoundsProjector::new(BoundsMode::CubeCorners);
        let sphere = ScreenBoundsProjector::new(BoundsMode::Sphere);
        let camera = camera();

        for x in [-12.0f32, -3.0, 0.0, 4.0, 9.0] {
            for y in [-7.0f32, 0.0, 5.0] {
                for z in [-4.0f32, -15.0, -40.0] {
                    for radius in [0.5f32, 2.0, 3.5] {
                        let center = Vec3::new(x, y, z);
                        let tight = sphere.project(&camera, VIEWPORT, center, radius);
                        let loose = cube.project(&camera, VIEWPORT, center, radius);
                        assert!(
                            loose.contains(&tight, 1e-2),
                            "{center:?} r={radius}: {tight:?} not in {loose:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_sphere_bounds_enclose_silhouette() {
        let sphere = ScreenBoundsProjector::new(BoundsMode::Sphere);
        let camera = camera();
        let center = Vec3::new(6.0, -2.0, -12.0);
        let radius = 3.0;
        let rect = sphere.project(&camera, VIEWPORT, center, radius);

        for i in 0..24 {
            for j in 1..12 {
                let theta = i as f32 / 24.0 * std::f32::consts::TAU;
                let phi = j as f32 / 12.0 * std::f32::consts::PI;
                let dir = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
                let clip = camera.view_projection * (center + dir * radius).extend(1.0);
                let ndc = clip.truncate() / clip.w;
                let x = ndc.x * 320.0 + 320.0;
                let y = 240.0 - ndc.y * 240.0;
                assert!(x >= rect.min_x - 1e-2 && x <= rect.max_x + 1e-2);
                assert!(y >= rect.min_y - 1e-2 && y <= rect.max_y + 1e-2);
            }
        }
    }

    #[test]
    fn test_orthographic_falls_back_to_corners() {
        let camera = CameraMatrices::new(
            Mat4::IDENTITY,
            Projection::pixel_aligned(640.0, 480.0, 0.1, 100.0).matrix(),
        );
        let center = Vec3::new(120.0, 75.0, -10.0);
        let sphere = ScreenBoundsProjector::new(BoundsMode::Sphere).project(&camera, VIEWPORT, center, 20.0);
        let cube = ScreenBoundsProjector::new(BoundsMode::CubeCorners).project(&camera, VIEWPORT, center, 20.0);
        assert_eq!(sphere, cube);
        assert!((cube.min_x - 100.0).abs() < 1e-3 && (cube.max_x - 140.0).abs() < 1e-3);
        assert!((cube.min_y - 55.0).abs() < 1e-3 && (cube.max_y - 95.0).abs() < 1e-3);
    }

    #[test]
    fn test_reversed_z_falls_back_to_corners() {
        let camera = CameraMatrices::new(
            Mat4::IDENTITY,
            Mat4::perspective_infinite_reverse_rh(60f32.to_radians(), 4.0 / 3.0, 0.5),
        );
        let center = Vec3::new(0.0, 0.0, -2.0);
        let sphere = ScreenBoundsProjector::new(BoundsMode::Sphere).project(&camera, VIEWPORT, center, 1.9);
        let cube = ScreenBoundsProjector::new(BoundsMode::CubeCorners).project(&camera, VIEWPORT, center, 1.9);
        assert_eq!(sphere, cube);
        assert!(!sphere.is_off_screen(VIEWPORT));
    }

    #[test]
    fn test_rect_off_screen_and_clamp() {
        let rect = ScreenRect::new(-50.0, 700.0, 100.0, 200.0);
        assert!(!rect.is_off_screen(VIEWPORT));
        assert_eq!(rect.clamped(VIEWPORT), ScreenRect::new(0.0, 640.0, 100.0, 200.0));

        assert!(ScreenRect::new(-50.0, -1.0, 0.0, 10.0).is_off_screen(VIEWPORT));
        assert!(ScreenRect::new(0.0, 10.0, 481.0, 500.0).is_off_screen(VIEWPORT));
        assert!(ScreenRect::OFF_SCREEN.is_off_screen(VIEWPORT));
    }
}
