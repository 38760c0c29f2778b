use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

/// Vertical field of view, degrees.
pub const FOV_Y: f32 = 60.0;
pub const NEAR_PLANE: f32 = 0.2;
pub const FAR_PLANE: f32 = 20.0;

/// Degrees added to the view's Y rotation every frame.
pub const AUTO_ORBIT_STEP: f32 = 0.1;

/// Zoom stays inside the frustum with some margin so the scene never
/// crosses the near or far plane.
pub const ZOOM_MIN: f32 = -(FAR_PLANE - 1.0);
pub const ZOOM_MAX: f32 = -(NEAR_PLANE + 0.3);

/// Smallest allowed linear scale factor.
pub const MIN_SCALE: f32 = 0.01;

/// Rotation from Euler angles in degrees: roll about Z first, then
/// pitch about X, then yaw about Y, so the overall rotation is
/// Ry * Rx * Rz.
pub fn euler_rotation(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        degrees.y.to_radians(),
        degrees.x.to_radians(),
        degrees.z.to_radians(),
    )
}

/// The matrix that maps surface normals into view space: the
/// inverse-transpose of the linear part of the model-view product.
pub fn normal_transform(model_view: &Mat4) -> Mat3 {
    Mat3::from_mat4(*model_view).inverse().transpose()
}

/// Per-object placement and motion.
///
/// Rotation angles are in degrees and accumulate without bound; the
/// trigonometric composition is periodic, and at f32 precision the
/// accumulated angle stays exact far beyond any realistic session.
#[derive(Debug, Clone)]
pub struct ObjectState {
    pub rotation: Vec3,
    pub rotation_speed: f32,
    pub scale: f32,
    pub translation: Vec3,
}

impl ObjectState {
    pub fn new(translation: Vec3, rotation_speed: f32, scale: f32) -> Self {
        Self {
            rotation: Vec3::ZERO,
            rotation_speed,
            scale,
            translation,
        }
    }

    /// Advances the spin by one frame.
    pub fn advance(&mut self) {
        self.rotation.y += self.rotation_speed;
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale.max(MIN_SCALE);
    }

    /// translate * scale * rotate, translation outermost.
    pub fn model_transform(&self) -> Mat4 {
        Mat4::from_translation(self.translation)
            * Mat4::from_scale(Vec3::splat(self.scale))
            * Mat4::from_quat(euler_rotation(self.rotation))
    }
}

/// Camera state: accumulated orbit rotation plus a zoom distance along -Z.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub rotation: Vec3,
    zoom: f32,
}

impl ViewState {
    pub fn new(zoom: f32) -> Self {
        Self {
            rotation: Vec3::ZERO,
            zoom: zoom.clamp(ZOOM_MIN, ZOOM_MAX),
        }
    }

    /// Advances the auto-orbit by one frame.
    pub fn advance(&mut self) {
        self.rotation.y += AUTO_ORBIT_STEP;
    }

    /// Adds a user rotation delta, degrees.
    pub fn orbit(&mut self, delta: Vec3) {
        self.rotation += delta;
    }

    /// Scales a raw input delta down to a zoom step, keeping the camera
    /// between the clip planes.
    pub fn change_zoom(&mut self, delta: f32) {
        self.zoom = (self.zoom + 0.001 * delta).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    #[allow(dead_code)]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// translate(0, 0, zoom) * rotate(rotation).
    pub fn view_transform(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, self.zoom))
            * Mat4::from_quat(euler_rotation(self.rotation))
    }
}

/// Perspective projection, rebuilt only when the viewport aspect changes.
#[derive(Debug, Clone)]
pub struct Projection {
    aspect: f32,
    matrix: Mat4,
}

impl Projection {
    pub fn new(width: f32, height: f32) -> Self {
        let aspect = width / height;
        Self {
            aspect,
            matrix: Self::perspective(aspect),
        }
    }

    fn perspective(aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(FOV_Y.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        let aspect = width / height;
        if aspect != self.aspect {
            self.aspect = aspect;
            self.matrix = Self::perspective(aspect);
        }
    }

    #[allow(dead_code)]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4, Vec4Swizzles};

    const EPS: f32 = 1e-5;

    fn assert_mat4_eq(a: &Mat4, b: &Mat4) {
        for (x, y) in a.to_cols_array().iter().zip(b.to_cols_array().iter()) {
            assert!((x - y).abs() < EPS, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn model_transform_composes_translate_scale_rotate() {
        let mut state = ObjectState::new(Vec3::new(2.0, 0.0, 0.0), 1.5, 0.5);
        for _ in 0..10 {
            state.advance();
        }

        // After N updates the rotation is exactly N * speed around Y
        assert_eq!(state.rotation.y, 15.0);

        let expected = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0))
            * Mat4::from_scale(Vec3::splat(0.5))
            * Mat4::from_quat(euler_rotation(Vec3::new(0.0, 15.0, 0.0)));
        assert_mat4_eq(&state.model_transform(), &expected);
    }

    #[test]
    fn rotation_accumulates_without_bound() {
        let mut state = ObjectState::new(Vec3::ZERO, 1.0, 1.0);
        for _ in 0..400 {
            state.advance();
        }
        assert_eq!(state.rotation.y, 400.0);
    }

    #[test]
    fn euler_rotation_applies_roll_pitch_yaw_in_order() {
        // Roll about Z is applied first, yaw about Y last, so the
        // combined rotation is Ry * Rx * Rz.
        let q = euler_rotation(Vec3::new(90.0, 90.0, 0.0));
        let composed = Quat::from_rotation_y(90.0_f32.to_radians())
            * Quat::from_rotation_x(90.0_f32.to_radians());
        let v = q * Vec3::Z;
        assert!((v - composed * Vec3::Z).length() < EPS, "{v:?}");
        assert!((v - Vec3::new(0.0, -1.0, 0.0)).length() < EPS, "{v:?}");

        // With roll in the mix the order is observable: Rz(90) takes +X
        // to +Y, then Rx(90) takes +Y to +Z.
        let q = euler_rotation(Vec3::new(90.0, 0.0, 90.0));
        let v = q * Vec3::X;
        assert!((v - Vec3::Z).length() < EPS, "{v:?}");
    }

    #[test]
    fn normal_transform_keeps_normals_perpendicular() {
        // Non-uniform scale shears normals unless the inverse-transpose
        // is used; a surface tangent and its normal must stay at 90°.
        let model = Mat4::from_scale(Vec3::new(2.0, 0.5, 1.0))
            * Mat4::from_quat(euler_rotation(Vec3::new(30.0, 45.0, 10.0)));
        let view = ViewState::new(-4.0).view_transform();
        let model_view = view * model;

        let tangent = Vec3::new(1.0, 0.0, 0.0); // lies in the z=0 surface
        let normal = Vec3::new(0.0, 0.0, 1.0);

        let t = (model_view * Vec4::new(tangent.x, tangent.y, tangent.z, 0.0)).xyz();
        let n = normal_transform(&model_view) * normal;

        assert!(t.dot(n).abs() < EPS, "dot = {}", t.dot(n));
    }

    #[test]
    fn normal_transform_of_rigid_motion_is_its_rotation() {
        let rotation = euler_rotation(Vec3::new(20.0, 40.0, 60.0));
        let mv = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)) * Mat4::from_quat(rotation);
        let expected = Mat3::from_quat(rotation);

        let got = normal_transform(&mv);
        for (x, y) in got
            .to_cols_array()
            .iter()
            .zip(expected.to_cols_array().iter())
        {
            assert!((x - y).abs() < EPS);
        }
    }

    #[test]
    fn view_transform_composes_zoom_then_rotation() {
        let mut view = ViewState::new(-4.0);
        view.orbit(Vec3::new(0.0, 90.0, 0.0));

        let expected = Mat4::from_translation(Vec3::new(0.0, 0.0, -4.0))
            * Mat4::from_quat(euler_rotation(Vec3::new(0.0, 90.0, 0.0)));
        assert_mat4_eq(&view.view_transform(), &expected);
    }

    #[test]
    fn auto_orbit_advances_by_fixed_step() {
        let mut view = ViewState::new(-4.0);
        for _ in 0..30 {
            view.advance();
        }
        assert!((view.rotation.y - 3.0).abs() < EPS);
    }

    #[test]
    fn zoom_is_scaled_and_clamped() {
        let mut view = ViewState::new(-4.0);
        view.change_zoom(-1000.0);
        assert!((view.zoom() - -5.0).abs() < EPS);

        view.change_zoom(-1.0e9);
        assert_eq!(view.zoom(), ZOOM_MIN);

        view.change_zoom(1.0e9);
        assert_eq!(view.zoom(), ZOOM_MAX);
    }

    #[test]
    fn projection_tracks_viewport_aspect() {
        let mut proj = Projection::new(800.0, 600.0);
        assert!((proj.aspect() - 4.0 / 3.0).abs() < EPS);

        proj.set_viewport(400.0, 800.0);
        assert!((proj.aspect() - 0.5).abs() < EPS);

        // fov / near / far are unchanged by a resize
        let expected = Mat4::perspective_rh_gl(FOV_Y.to_radians(), 0.5, NEAR_PLANE, FAR_PLANE);
        assert_mat4_eq(&proj.matrix(), &expected);
    }
}
