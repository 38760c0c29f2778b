pub mod objects;
pub mod transform;
pub mod water;

pub use objects::ObjectsScene;
pub use water::WaterScene;

use eframe::glow;
use glam::{Vec3, Vec4};

/// Which lighting program is active. Switching is immediate and only
/// changes which uniform set gets written on the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingMode {
    Normal,
    Gouraud,
    Phong,
}

impl ShadingMode {
    pub const ALL: [ShadingMode; 3] = [Self::Normal, Self::Gouraud, Self::Phong];

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Gouraud => "Gouraud",
            Self::Phong => "Phong",
        }
    }
}

/// Material and light state shared by the lit shading modes.
///
/// `material` packs (ambient, diffuse, specular, shininess).
#[derive(Debug, Clone)]
pub struct Lighting {
    pub material: Vec4,
    pub light_position: Vec3,
    pub light_colour: Vec3,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            material: Vec4::new(0.2, 0.8, 0.6, 32.0),
            light_position: Vec3::new(0.0, 3.0, 2.0),
            light_colour: Vec3::ONE,
        }
    }
}

/// The per-frame surface every scene variant exposes to the host widget.
pub trait Scene {
    /// Advances one frame of animation. Driven by the host at a fixed
    /// cadence; holds no timer of its own.
    fn tick(&mut self);

    /// Recomputes the projection when the canvas size changes.
    fn set_viewport(&mut self, width: f32, height: f32);

    /// Clears the canvas and issues one draw call per mesh.
    fn draw(&mut self, gl: &glow::Context);

    /// Absolute rotation in degrees, applied to every mesh.
    fn set_rotation(&mut self, rotation: Vec3);

    /// Linear scale from an integer percentage.
    fn set_scale(&mut self, percent: i32);

    fn set_shading_mode(&mut self, mode: ShadingMode);
    fn shading_mode(&self) -> ShadingMode;

    /// Shading modes this scene can render.
    fn supported_modes(&self) -> &'static [ShadingMode];

    fn destroy_gl(&mut self, gl: &glow::Context);
}
