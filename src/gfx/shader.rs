use std::collections::HashMap;
use std::{error::Error, fmt};

use eframe::glow;
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

/// Value variants accepted by [`Shader::set_uniform`].
#[allow(dead_code)]
pub enum ShaderUniformTypes<'a> {
    Mat4(&'a Mat4),
    Mat3(&'a Mat3),
    Vec4(&'a Vec4),
    Vec3(&'a Vec3),
    Vec2(&'a Vec2),
    F32(f32),
    F32Slice(&'a [f32]),
    I32(i32),
}

#[derive(Debug, Clone)]
pub enum ShaderError {
    Compile { stage: &'static str, log: String },
    Link { log: String },
    Create { what: &'static str, reason: String },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile { stage, log } => {
                write!(f, "ShaderError: could not compile {stage} shader: {log}")
            }
            Self::Link { log } => write!(f, "ShaderError: could not link program: {log}"),
            Self::Create { what, reason } => {
                write!(f, "ShaderError: could not create {what}: {reason}")
            }
        }
    }
}
impl Error for ShaderError {}

/// A linked GL program together with its resolved uniform locations.
///
/// Every active uniform is looked up once at link time; writes to names the
/// program does not use are silently skipped, so the same bind code can serve
/// programs that only consume a subset of the scene state.
#[derive(Debug, Clone)]
pub struct Shader {
    program: glow::Program,
    uniforms: HashMap<String, glow::UniformLocation>,
}

impl Shader {
    pub fn from_src(gl: &glow::Context, vtx: &str, frag: &str) -> Result<Self, ShaderError> {
        use glow::HasContext as _;

        unsafe {
            let program = gl.create_program().map_err(|reason| ShaderError::Create {
                what: "program",
                reason,
            })?;

            let shader_sources = [
                (glow::VERTEX_SHADER, "vertex", vtx),
                (glow::FRAGMENT_SHADER, "fragment", frag),
            ];

            let mut shaders = Vec::with_capacity(shader_sources.len());
            for (shader_type, stage, shader_source) in shader_sources {
                let shader =
                    gl.create_shader(shader_type)
                        .map_err(|reason| ShaderError::Create {
                            what: "shader",
                            reason,
                        })?;
                gl.shader_source(shader, shader_source);
                gl.compile_shader(shader);
                if !gl.get_shader_compile_status(shader) {
                    let log = gl.get_shader_info_log(shader);
                    gl.delete_shader(shader);
                    gl.delete_program(program);
                    return Err(ShaderError::Compile { stage, log });
                }
                gl.attach_shader(program, shader);
                shaders.push(shader);
            }

            gl.link_program(program);
            let linked = gl.get_program_link_status(program);

            for shader in shaders {
                gl.detach_shader(program, shader);
                gl.delete_shader(shader);
            }

            if !linked {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(ShaderError::Link { log });
            }

            Ok(Self {
                uniforms: Self::resolve_uniforms(gl, program),
                program,
            })
        }
    }

    /// Builds the name -> location map for every active uniform.
    ///
    /// Array uniforms are reported as `name[0]`; they are stored under the
    /// bare name, which is what the binder writes to.
    fn resolve_uniforms(
        gl: &glow::Context,
        program: glow::Program,
    ) -> HashMap<String, glow::UniformLocation> {
        use glow::HasContext as _;

        let mut uniforms = HashMap::new();
        unsafe {
            for idx in 0..gl.get_active_uniforms(program) {
                let Some(active) = gl.get_active_uniform(program, idx) else {
                    continue;
                };
                let name = active.name.trim_end_matches("[0]").to_owned();
                if let Some(location) = gl.get_uniform_location(program, &active.name) {
                    uniforms.insert(name, location);
                }
            }
        }
        uniforms
    }

    /// Writes one uniform. Unknown names are a no-op.
    pub fn set_uniform(&self, gl: &glow::Context, name: &str, uniform: ShaderUniformTypes) {
        use glow::HasContext as _;

        let Some(location) = self.uniforms.get(name) else {
            return;
        };
        let location = Some(location);

        unsafe {
            match uniform {
                ShaderUniformTypes::Mat4(value) => {
                    gl.uniform_matrix_4_f32_slice(location, false, &value.to_cols_array());
                }
                ShaderUniformTypes::Mat3(value) => {
                    gl.uniform_matrix_3_f32_slice(location, false, &value.to_cols_array());
                }
                ShaderUniformTypes::Vec4(value) => {
                    gl.uniform_4_f32_slice(location, &value.to_array());
                }
                ShaderUniformTypes::Vec3(value) => {
                    gl.uniform_3_f32_slice(location, &value.to_array());
                }
                ShaderUniformTypes::Vec2(value) => {
                    gl.uniform_2_f32_slice(location, &value.to_array());
                }
                ShaderUniformTypes::F32(value) => {
                    gl.uniform_1_f32(location, value);
                }
                ShaderUniformTypes::F32Slice(values) => {
                    gl.uniform_1_f32_slice(location, values);
                }
                ShaderUniformTypes::I32(value) => {
                    gl.uniform_1_i32(location, value);
                }
            }
        }
    }

    pub fn use_program(&self, gl: &glow::Context) {
        use glow::HasContext as _;

        unsafe {
            gl.use_program(Some(self.program));
        }
    }

    pub fn destroy(&self, gl: &glow::Context) {
        use glow::HasContext as _;

        unsafe {
            gl.delete_program(self.program);
        }
    }
}
