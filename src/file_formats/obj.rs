use std::{
    error::Error,
    fmt, fs,
    io::{self, BufRead, BufReader, Read},
    path::Path,
};

use glam::{Vec2, Vec3};

use crate::gfx::Vertex;

#[derive(Debug)]
pub enum ObjError {
    Io(io::Error),
    Parse { line: usize, msg: String },
    IndexOutOfBounds,
    Empty,
}

impl fmt::Display for ObjError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "ObjError: {e}"),
            Self::Parse { line, msg } => write!(f, "ObjError: line {line}: {msg}"),
            Self::IndexOutOfBounds => write!(f, "ObjError: face index out of bounds"),
            Self::Empty => write!(f, "ObjError: file contains no faces"),
        }
    }
}
impl Error for ObjError {}

impl From<io::Error> for ObjError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

#[derive(Debug, Clone, Copy)]
struct FaceVertex {
    pos: usize,
    uv: Option<usize>,
    nrm: Option<usize>,
}

/// A triangulated Wavefront OBJ mesh (`v`/`vt`/`vn`/`f` records only,
/// polygons fanned into triangles).
#[derive(Debug, Clone)]
pub struct ObjModel {
    positions: Vec<Vec3>,
    uvs: Vec<Vec2>,
    normals: Vec<Vec3>,
    faces: Vec<[FaceVertex; 3]>,
}

impl ObjModel {
    pub fn from_file(path: &Path) -> Result<Self, ObjError> {
        let file = fs::File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: BufReader<R>) -> Result<Self, ObjError> {
        let mut positions = Vec::new();
        let mut uvs = Vec::new();
        let mut normals = Vec::new();
        let mut faces = Vec::new();

        for (num, line) in reader.lines().enumerate() {
            let line = line?;
            let line_num = num + 1;
            let mut fields = line.split_whitespace();

            match fields.next() {
                Some("v") => positions.push(parse_vec3(&mut fields, line_num)?),
                Some("vt") => {
                    let u = parse_float(fields.next(), line_num)?;
                    let v = parse_float(fields.next(), line_num)?;
                    uvs.push(Vec2::new(u, v));
                }
                Some("vn") => normals.push(parse_vec3(&mut fields, line_num)?),
                Some("f") => {
                    let corners = fields
                        .map(|field| parse_face_vertex(field, line_num))
                        .collect::<Result<Vec<_>, _>>()?;
                    if corners.len() < 3 {
                        return Err(ObjError::Parse {
                            line: line_num,
                            msg: format!("face with {} vertices", corners.len()),
                        });
                    }
                    // Fan triangulation for quads and larger polygons
                    for i in 1..corners.len() - 1 {
                        faces.push([corners[0], corners[i], corners[i + 1]]);
                    }
                }
                // Groups, materials and comments are ignored
                _ => {}
            }
        }

        if faces.is_empty() {
            return Err(ObjError::Empty);
        }

        let model = Self {
            positions,
            uvs,
            normals,
            faces,
        };
        model.check_indices()?;
        Ok(model)
    }

    fn check_indices(&self) -> Result<(), ObjError> {
        for face in &self.faces {
            for fv in face {
                let in_bounds = fv.pos < self.positions.len()
                    && fv.uv.map_or(true, |i| i < self.uvs.len())
                    && fv.nrm.map_or(true, |i| i < self.normals.len());
                if !in_bounds {
                    return Err(ObjError::IndexOutOfBounds);
                }
            }
        }
        Ok(())
    }

    /// Recenters the mesh on the origin and scales its longest axis to
    /// span the [-1, 1] cube.
    pub fn unitize(&mut self) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for &pos in &self.positions {
            min = min.min(pos);
            max = max.max(pos);
        }

        let center = (min + max) / 2.0;
        let extent = (max - min).max_element();
        let scale = if extent > 0.0 { 2.0 / extent } else { 1.0 };

        for pos in &mut self.positions {
            *pos = (*pos - center) * scale;
        }
    }

    /// Flattens the indexed faces into the interleaved vertex stream the
    /// GPU buffers expect. Corners without a normal get their face normal;
    /// corners without texcoords get (0, 0).
    pub fn interleaved(&self) -> Vec<Vertex> {
        let mut verts = Vec::with_capacity(self.faces.len() * 3);
        for face in &self.faces {
            let fallback_nrm = {
                let [a, b, c] = face.map(|fv| self.positions[fv.pos]);
                (b - a).cross(c - a)
            };
            for fv in face {
                let nrm = fv.nrm.map_or(fallback_nrm, |i| self.normals[i]);
                let uv = fv.uv.map_or(Vec2::ZERO, |i| self.uvs[i]);
                verts.push(Vertex::new(self.positions[fv.pos], nrm, uv));
            }
        }
        verts
    }

    pub fn vertex_count(&self) -> usize {
        self.faces.len() * 3
    }
}

fn parse_float(field: Option<&str>, line: usize) -> Result<f32, ObjError> {
    let field = field.ok_or_else(|| ObjError::Parse {
        line,
        msg: "missing coordinate".to_owned(),
    })?;
    field.parse().map_err(|_| ObjError::Parse {
        line,
        msg: format!("invalid number {field:?}"),
    })
}

fn parse_vec3<'a, I: Iterator<Item = &'a str>>(
    fields: &mut I,
    line: usize,
) -> Result<Vec3, ObjError> {
    Ok(Vec3::new(
        parse_float(fields.next(), line)?,
        parse_float(fields.next(), line)?,
        parse_float(fields.next(), line)?,
    ))
}

/// Parses one `f` corner: `v`, `v/vt`, `v//vn` or `v/vt/vn` (1-based).
fn parse_face_vertex(field: &str, line: usize) -> Result<FaceVertex, ObjError> {
    let mut parts = field.split('/');

    let parse_index = |part: Option<&str>| -> Result<Option<usize>, ObjError> {
        match part {
            None | Some("") => Ok(None),
            Some(text) => {
                let idx: usize = text.parse().map_err(|_| ObjError::Parse {
                    line,
                    msg: format!("invalid face index {text:?}"),
                })?;
                if idx == 0 {
                    return Err(ObjError::Parse {
                        line,
                        msg: "face indices are 1-based".to_owned(),
                    });
                }
                Ok(Some(idx - 1))
            }
        }
    };

    let pos = parse_index(parts.next())?.ok_or_else(|| ObjError::Parse {
        line,
        msg: format!("invalid face corner {field:?}"),
    })?;
    let uv = parse_index(parts.next())?;
    let nrm = parse_index(parts.next())?;

    Ok(FaceVertex { pos, uv, nrm })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    fn parse(src: &str) -> ObjModel {
        ObjModel::from_reader(BufReader::new(src.as_bytes())).expect("valid obj")
    }

    const QUAD: &str = "\
v 0 0 0
v 4 0 0
v 4 2 0
v 0 2 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn quad_fans_into_two_triangles() {
        let model = parse(QUAD);
        assert_eq!(model.vertex_count(), 6);

        let verts = model.interleaved();
        assert_eq!(verts.len(), 6);
        assert_eq!(verts[0].pos, glam::Vec3::ZERO);
        assert_eq!(verts[0].nrm, glam::Vec3::Z);
        assert_eq!(verts[2].uv, glam::Vec2::new(1.0, 1.0));
        // Second triangle of the fan starts back at the first corner
        assert_eq!(verts[3].pos, verts[0].pos);
    }

    #[test]
    fn unitize_fits_longest_axis_to_unit_cube() {
        let mut model = parse(QUAD);
        model.unitize();

        let verts = model.interleaved();
        let xs: Vec<f32> = verts.iter().map(|v| v.pos.x).collect();
        let ys: Vec<f32> = verts.iter().map(|v| v.pos.y).collect();
        assert_eq!(xs.iter().cloned().fold(f32::INFINITY, f32::min), -1.0);
        assert_eq!(xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max), 1.0);
        // The shorter axis scales by the same factor
        assert_eq!(ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max), 0.5);
    }

    #[test]
    fn missing_normals_fall_back_to_face_normal() {
        let model = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        let verts = model.interleaved();
        for vert in &verts {
            assert_eq!(vert.nrm, glam::Vec3::Z);
            assert_eq!(vert.uv, glam::Vec2::ZERO);
        }
    }

    #[test]
    fn bad_face_index_is_an_error() {
        let result = ObjModel::from_reader(BufReader::new("v 0 0 0\nf 1 2 3\n".as_bytes()));
        assert!(result.is_err());
    }

    #[test]
    fn no_faces_is_an_error() {
        let result = ObjModel::from_reader(BufReader::new("v 0 0 0\n".as_bytes()));
        assert!(matches!(result, Err(ObjError::Empty)));
    }
}
