#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct Vertex {
    pub pos: glam::Vec3,
    pub nrm: glam::Vec3,
    pub uv: glam::Vec2,
}

impl Vertex {
    pub fn new(pos: glam::Vec3, nrm: glam::Vec3, uv: glam::Vec2) -> Self {
        Self {
            pos,
            nrm: nrm.normalize_or_zero(),
            uv,
        }
    }
}
