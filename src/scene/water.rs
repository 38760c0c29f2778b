use std::f32::consts::{FRAC_PI_2, SQRT_2};

use eframe::glow;
use glam::Vec3;

use crate::gfx::{mesh::MeshError, shader::ShaderUniformTypes, Mesh, Shader};
use crate::scene::transform::{normal_transform, ObjectState, Projection};
use crate::scene::{Lighting, Scene, ShadingMode};

/// Seconds of shader time added per frame tick (2 per 60 frames).
pub const TIME_STEP: f32 = 2.0 / 60.0;

const MESH_OFFSET: Vec3 = Vec3::new(0.0, 0.0, -4.0);
const CLEAR_COLOR: [f32; 4] = [0.2, 0.2, 0.2, 0.0];

pub const NUM_WAVES: usize = 6;

/// The sinusoidal components summed in the vertex shader. Write-once;
/// only the time value ever changes after construction.
#[derive(Debug, Clone)]
pub struct WaveParams {
    pub frequencies: [f32; NUM_WAVES],
    pub phases: [f32; NUM_WAVES],
    pub amplitudes: [f32; NUM_WAVES],
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            frequencies: [5.3, 2.0 * SQRT_2, FRAC_PI_2, 6.3, 1.5, 0.55],
            phases: [0.3, 2.0, 0.2, 1.0, 1.3, 3.8],
            amplitudes: [0.041, 0.033, 0.034, 0.015, 0.019, 0.029],
        }
    }
}

/// Animation state of the water scene. The grid itself never rotates on
/// its own; only the wave time advances each frame.
#[derive(Debug, Clone)]
pub struct WaterAnimation {
    pub mesh_state: ObjectState,
    pub waves: WaveParams,
    pub time: f32,
    pub projection: Projection,
    pub shading: ShadingMode,
}

impl WaterAnimation {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            mesh_state: ObjectState::new(MESH_OFFSET, 0.0, 1.0),
            waves: WaveParams::default(),
            time: 0.0,
            projection: Projection::new(width, height),
            shading: ShadingMode::Phong,
        }
    }

    pub fn tick(&mut self) {
        self.time += TIME_STEP;
    }
}

/// The animated water grid scene. The view transform is the identity; the
/// grid is pushed in front of the camera by its own translation.
pub struct WaterScene {
    anim: WaterAnimation,
    mesh: Mesh,
    lighting: Lighting,

    normal_shader: Shader,
    phong_shader: Shader,
}

impl WaterScene {
    pub fn new(
        gl: &glow::Context,
        normal_shader: Shader,
        phong_shader: Shader,
        mut mesh: Mesh,
        width: f32,
        height: f32,
    ) -> Result<Self, MeshError> {
        mesh.setup_gl(gl)?;

        Ok(Self {
            anim: WaterAnimation::new(width, height),
            mesh,
            lighting: Lighting::default(),
            normal_shader,
            phong_shader,
        })
    }

    fn active_shader(&self) -> &Shader {
        match self.anim.shading {
            ShadingMode::Phong => &self.phong_shader,
            // Gouraud never becomes active in this scene
            _ => &self.normal_shader,
        }
    }
}

impl Scene for WaterScene {
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
            // The grid is viewed from both sides while orbiting, so
            // back faces stay on (the context is shared with the
            // culling objects scene).
            gl.disable(glow::CULL_FACE);
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
        // The view transform is the identity here, so the model transform
        // is the model-view product.
        let model_view = self.anim.mesh_state.model_transform();
        let normal = normal_transform(&model_view);

        shader.set_uniform(gl, "projectionTransform", ShaderUniformTypes::Mat4(&projection));
        shader.set_uniform(gl, "modelViewTransform", ShaderUniformTypes::Mat4(&model_view));
        shader.set_uniform(gl, "normalTransform", ShaderUniformTypes::Mat3(&normal));

        let waves = &self.anim.waves;
        shader.set_uniform(gl, "numwaves", ShaderUniformTypes::I32(NUM_WAVES as i32));
        shader.set_uniform(gl, "amplitude", ShaderUniformTypes::F32Slice(&waves.amplitudes));
        shader.set_uniform(gl, "frequency", ShaderUniformTypes::F32Slice(&waves.frequencies));
        shader.set_uniform(gl, "phase", ShaderUniformTypes::F32Slice(&waves.phases));
        shader.set_uniform(gl, "t", ShaderUniformTypes::F32(self.anim.time));

        // Lit water only; the normal-visualization program skips these.
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

        self.mesh.draw(gl);
    }

    fn set_rotation(&mut self, rotation: Vec3) {
        self.anim.mesh_state.rotation = rotation;
    }

    fn set_scale(&mut self, percent: i32) {
        self.anim.mesh_state.set_scale(percent as f32 / 100.0);
    }

    fn set_shading_mode(&mut self, mode: ShadingMode) {
        if mode == ShadingMode::Gouraud {
            log::warn!("water scene: Gouraud shading is not available");
            return;
        }
        log::debug!("water scene: shading mode -> {}", mode.label());
        self.anim.shading = mode;
    }

    fn shading_mode(&self) -> ShadingMode {
        self.anim.shading
    }

    fn supported_modes(&self) -> &'static [ShadingMode] {
        &[ShadingMode::Normal, ShadingMode::Phong]
    }

    fn destroy_gl(&mut self, gl: &glow::Context) {
        self.mesh.destroy_gl(gl);
        self.normal_shader.destroy(gl);
        self.phong_shader.destroy(gl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_advances_by_two_sixtieths_per_tick() {
        let mut anim = WaterAnimation::new(800.0, 600.0);
        for _ in 0..30 {
            anim.tick();
        }
        assert!((anim.time - 1.0).abs() < 1e-5);
    }

    #[test]
    fn wave_parameters_match_the_fixed_table() {
        let waves = WaveParams::default();
        assert_eq!(waves.frequencies.len(), NUM_WAVES);
        assert!((waves.frequencies[1] - 2.0_f32.sqrt() * 2.0).abs() < 1e-6);
        assert!((waves.frequencies[2] - std::f32::consts::PI / 2.0).abs() < 1e-6);
        assert_eq!(waves.phases[5], 3.8);
        assert_eq!(waves.amplitudes[0], 0.041);
    }

    #[test]
    fn mesh_sits_in_front_of_the_camera() {
        let anim = WaterAnimation::new(800.0, 600.0);
        let transform = anim.mesh_state.model_transform();
        // translate(0,0,-4) * scale(1) * rotate(0): the origin maps to the offset
        let origin = transform * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(origin, glam::Vec4::new(0.0, 0.0, -4.0, 1.0));
    }

    #[test]
    fn rotation_stays_put_without_user_input() {
        let mut anim = WaterAnimation::new(800.0, 600.0);
        for _ in 0..10 {
            anim.tick();
        }
        assert_eq!(anim.mesh_state.rotation, Vec3::ZERO);
    }
}
