use std::{error::Error, fmt, mem::offset_of, ptr::slice_from_raw_parts};

use eframe::glow;

use crate::gfx::Vertex;

#[derive(Debug, Clone)]
pub enum MeshError {
    Create { what: &'static str, reason: String },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create { what, reason } => {
                write!(f, "MeshError: could not create {what}: {reason}")
            }
        }
    }
}
impl Error for MeshError {}

/// Static geometry uploaded once: one VAO/VBO pair holding tightly
/// interleaved vertices (position, normal, texcoord at locations 0/1/2),
/// drawn as a non-indexed triangle list.
#[derive(Debug, Clone)]
pub struct Mesh {
    verts: Vec<Vertex>,
    vao: Option<glow::VertexArray>,
    vbo: Option<glow::Buffer>,
}

impl Mesh {
    pub fn new(verts: Vec<Vertex>) -> Self {
        Self {
            verts,
            vao: None,
            vbo: None,
        }
    }

    pub fn setup_gl(&mut self, gl: &glow::Context) -> Result<(), MeshError> {
        use glow::HasContext as _;

        // Do not upload twice
        if self.vao.is_some() || self.vbo.is_some() {
            return Ok(());
        }

        unsafe {
            let vao = gl
                .create_vertex_array()
                .map_err(|reason| MeshError::Create {
                    what: "vertex array",
                    reason,
                })?;
            let vbo = gl.create_buffer().map_err(|reason| MeshError::Create {
                what: "buffer",
                reason,
            })?;
            self.vao = Some(vao);
            self.vbo = Some(vbo);

            gl.bind_vertex_array(self.vao);
            gl.bind_buffer(glow::ARRAY_BUFFER, self.vbo);

            let bind_data = slice_from_raw_parts(
                self.verts.as_ptr() as *const u8,
                self.verts.len() * size_of::<Vertex>(),
            )
            .as_ref()
            .unwrap();
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bind_data, glow::STATIC_DRAW);

            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, size_of::<Vertex>() as _, 0);

            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(
                1,
                3,
                glow::FLOAT,
                false,
                size_of::<Vertex>() as _,
                offset_of!(Vertex, nrm) as _,
            );

            gl.enable_vertex_attrib_array(2);
            gl.vertex_attrib_pointer_f32(
                2,
                2,
                glow::FLOAT,
                false,
                size_of::<Vertex>() as _,
                offset_of!(Vertex, uv) as _,
            );

            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_vertex_array(None);
        }

        Ok(())
    }

    pub fn destroy_gl(&mut self, gl: &glow::Context) {
        use glow::HasContext as _;

        unsafe {
            if let (Some(vao), Some(vbo)) = (self.vao, self.vbo) {
                gl.delete_vertex_array(vao);
                gl.delete_buffer(vbo);
            }
        }

        self.vao = None;
        self.vbo = None;
    }

    pub fn draw(&self, gl: &glow::Context) {
        use glow::HasContext as _;

        if self.vao.is_none() {
            return;
        }

        unsafe {
            gl.bind_vertex_array(self.vao);
            gl.draw_arrays(glow::TRIANGLES, 0, self.verts.len() as _);
            gl.bind_vertex_array(None);
        }
    }
}
