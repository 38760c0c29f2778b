use eframe::glow;
use glam::Vec3;

use crate::gfx::{
    mesh::MeshError,
    shader::ShaderUniformTypes,
    Mesh, Shader, Texture,
};
use crate::scene::transform::{normal_transform, ObjectState, Projection, ViewState};
use crate::scene::{Lighting, Scene, ShadingMode};

/// Motion table for the four demo slots.
const ROTATION_SPEEDS: [f32; 4] = [1.5, 1.0, 1.0, 1.3];
const BASE_SCALES: [f32; 4] = [1.2, 0.5, 1.1, 0.9];
const SLOT_SPACING: f32 = 2.0;

const INITIAL_ZOOM: f32 = -4.0;
const CLEAR_COLOR: [f32; 4] = [0.2, 0.5, 0.7, 0.0];

/// Animation and camera state of the multi-object scene, kept apart from
/// the GPU resources so frame updates stay plain math.
#[derive(Debug, Clone)]
pub struct ObjectsAnimation {
    pub objects: Vec<ObjectState>,
    pub view: ViewState,
    pub projection: Projection,
    pub shading: ShadingMode,
}

impl ObjectsAnimation {
    pub fn new(slots: usize, width: f32, height: f32) -> Self {
        let objects = (0..slots)
            .map(|idx| {
                ObjectState::new(
                    Vec3::new(idx as f32 * SLOT_SPACING, 0.0, 0.0),
                    ROTATION_SPEEDS[idx % ROTATION_SPEEDS.len()],
                    BASE_SCALES[idx % BASE_SCALES.len()],
                )
            })
            .collect();

        Self {
            objects,
            view: ViewState::new(INITIAL_ZOOM),
            projection: Projection::new(width, height),
            shading: ShadingMode::Phong,
        }
    }

    /// One frame: every object spins by its own speed, the view auto-orbits.
    pub fn tick(&mut self) {
        for object in &mut self.objects {
            object.advance();
        }
        self.view.advance();
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        for object in &mut self.objects {
            object.rotation = rotation;
        }
    }

    pub fn set_scale(&mut self, percent: i32) {
        let scale = percent as f32 / 100.0;
        for object in &mut self.objects {
            object.set_scale(scale);
        }
    }
}

/// The four-mesh rotating scene.
pub struct ObjectsScene {
    anim: ObjectsAnimation,
    parts: Vec<(Mesh, Texture)>,
    lighting: Lighting,

    normal_shader: Shader,
    gouraud_shader: Shader,
    phong_shader: Shader,
}

impl ObjectsScene {
    pub fn new(
        gl: &glow::Context,
        normal_shader: Shader,
        gouraud_shader: Shader,
        phong_shader: Shader,
        mut parts: Vec<(Mesh, Texture)>,
        width: f32,
        height: f32,
    ) -> Result<Self, MeshError> {
        for (mesh, _) in &mut parts {
            mesh.setup_gl(gl)?;
        }

        Ok(Self {
            anim: ObjectsAnimation::new(parts.len(), width, height),
            parts,
            lighting: Lighting::default(),
            normal_shader,
            gouraud_shader,
            phong_shader,
        })
    }

    /// User drag rotating the camera, degrees.
    pub fn orbit_view(&mut self, delta: Vec3) {
        self.anim.view.orbit(delta);
    }

    /// Raw scroll delta; scaled down and clamped by the view state.
    pub fn change_view_distance(&mut self, delta: f32) {
        self.anim.view.change_zoom(delta);
    }

    fn active_shader(&self) -> &Shader {
        match self.anim.shading {
            ShadingMode::Normal => &self.normal_shader,
            ShadingMode::Gouraud => &self.gouraud_shader,
            ShadingMode::Phong => &self.phong_shader,
        }
    }
}

impl Scene for ObjectsScene {
    fn tick(&mut self) {
        self.anim.tick();
    }

    fn set_viewport(&mut self, width: f32, height: f32) {
        self.anim.projection.set_viewport(width, height);
    }

    fn draw(&mut self, gl: &glow::Context) {
        use glow::HasContext as _;

        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LEQUAL);
            gl.enable(glow::CULL_FACE);
            gl.clear_color(
                CLEAR_COLOR[0],
                CLEAR_COLOR[1],
                CLEAR_COLOR[2],
                CLEAR_COLOR[3],
            );
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let shader = self.active_shader();
        shader.use_program(gl);

        let projection = self.anim.projection.matrix();
        let view = self.anim.view.view_transform();

        for (state, (mesh, texture)) in self.anim.objects.iter().zip(&self.parts) {
            let model_view = view * state.model_transform();
            let normal = normal_transform(&model_view);

            shader.set_uniform(gl, "projectionTransform", ShaderUniformTypes::Mat4(&projection));
            shader.set_uniform(gl, "modelViewTransform", ShaderUniformTypes::Mat4(&model_view));
            shader.set_uniform(gl, "normalTransform", ShaderUniformTypes::Mat3(&normal));

            // Only the lit programs resolve these; for the normal-visualization
            // program the writes fall through as no-ops.
            shader.set_uniform(
                gl,
                "material",
                ShaderUniformTypes::Vec4(&self.lighting.material),
            );
            shader.set_uniform(
                gl,
                "lightPosition",
                ShaderUniformTypes::Vec3(&self.lighting.light_position),
            );
            shader.set_uniform(
                gl,
                "lightColour",
                ShaderUniformTypes::Vec3(&self.lighting.light_colour),
            );
            shader.set_uniform(gl, "textureSampler", ShaderUniformTypes::I32(0));

            texture.bind(gl, 0);
            mesh.draw(gl);
        }
    }

    fn set_rotation(&mut self, rotation: Vec3) {
        self.anim.set_rotation(rotation);
    }

    fn set_scale(&mut self, percent: i32) {
        self.anim.set_scale(percent);
    }

    fn set_shading_mode(&mut self, mode: ShadingMode) {
        log::debug!("objects scene: shading mode -> {}", mode.label());
        self.anim.shading = mode;
    }

    fn shading_mode(&self) -> ShadingMode {
        self.anim.shading
    }

    fn supported_modes(&self) -> &'static [ShadingMode] {
        &ShadingMode::ALL
    }

    fn destroy_gl(&mut self, gl: &glow::Context) {
        for (mesh, texture) in &mut self.parts {
            mesh.destroy_gl(gl);
            texture.destroy(gl);
        }
        self.normal_shader.destroy(gl);
        self.gouraud_shader.destroy(gl);
        self.phong_shader.destroy(gl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    fn anim() -> ObjectsAnimation {
        ObjectsAnimation::new(4, 800.0, 600.0)
    }

    fn model_transforms(anim: &ObjectsAnimation) -> Vec<Mat4> {
        anim.objects.iter().map(|o| o.model_transform()).collect()
    }

    #[test]
    fn slots_follow_the_motion_table() {
        let anim = anim();
        assert_eq!(anim.objects.len(), 4);
        for (idx, object) in anim.objects.iter().enumerate() {
            assert_eq!(object.translation.x, idx as f32 * 2.0);
            assert_eq!(object.rotation_speed, ROTATION_SPEEDS[idx]);
            assert_eq!(object.scale, BASE_SCALES[idx]);
        }
    }

    #[test]
    fn tick_spins_each_object_at_its_own_speed() {
        let mut anim = anim();
        for _ in 0..20 {
            anim.tick();
        }
        assert_eq!(anim.objects[0].rotation.y, 30.0);
        assert!((anim.objects[3].rotation.y - 26.0).abs() < 1e-4);
        assert!((anim.view.rotation.y - 2.0).abs() < 1e-4);
    }

    #[test]
    fn set_scale_converts_percent_to_factor() {
        let mut anim = anim();
        anim.set_scale(50);
        assert!(anim.objects.iter().all(|o| o.scale == 0.5));
        anim.set_scale(150);
        assert!(anim.objects.iter().all(|o| o.scale == 1.5));
    }

    #[test]
    fn set_rotation_is_absolute_for_all_objects() {
        let mut anim = anim();
        anim.tick();
        anim.set_rotation(Vec3::new(10.0, 20.0, 30.0));
        for object in &anim.objects {
            assert_eq!(object.rotation, Vec3::new(10.0, 20.0, 30.0));
        }
    }

    #[test]
    fn shading_switch_does_not_touch_transforms() {
        let mut anim = anim();
        for _ in 0..7 {
            anim.tick();
        }

        let before = model_transforms(&anim);
        anim.shading = ShadingMode::Normal;
        assert_eq!(model_transforms(&anim), before);
        anim.shading = ShadingMode::Phong;
        assert_eq!(model_transforms(&anim), before);
    }
}
