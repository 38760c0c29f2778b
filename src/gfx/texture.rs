use std::{error::Error, fmt, path::Path, path::PathBuf};

use eframe::glow;

#[derive(Debug)]
pub enum TextureError {
    Decode { path: PathBuf, source: image::ImageError },
    Create { reason: String },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode { path, source } => {
                write!(f, "TextureError: could not load {}: {}", path.display(), source)
            }
            Self::Create { reason } => write!(f, "TextureError: could not create texture: {reason}"),
        }
    }
}
impl Error for TextureError {}

/// An RGBA8 2D texture with nearest filtering and clamp-to-edge wrap.
#[derive(Debug, Clone)]
pub struct Texture(glow::Texture);

impl Texture {
    /// Decodes an image file and uploads it to texture unit state.
    ///
    /// Fails at load time on missing or undecodable files rather than
    /// handing the driver undefined pixel data.
    pub fn from_file(gl: &glow::Context, path: &Path) -> Result<Self, TextureError> {
        let image = image::open(path)
            .map_err(|source| TextureError::Decode {
                path: path.to_owned(),
                source,
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();

        Self::from_rgba8(gl, width as i32, height as i32, &image.into_raw())
    }

    pub fn from_rgba8(
        gl: &glow::Context,
        width: i32,
        height: i32,
        pixels: &[u8],
    ) -> Result<Self, TextureError> {
        use glow::HasContext as _;

        unsafe {
            let texture = gl
                .create_texture()
                .map_err(|reason| TextureError::Create { reason })?;

            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::NEAREST as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::NEAREST as i32,
            );

            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                width,
                height,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(pixels),
            );
            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(Self(texture))
        }
    }

    /// Binds to the given texture unit.
    pub fn bind(&self, gl: &glow::Context, unit: u32) {
        use glow::HasContext as _;

        unsafe {
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.0));
        }
    }

    pub fn destroy(&self, gl: &glow::Context) {
        use glow::HasContext as _;

        unsafe {
            gl.delete_texture(self.0);
        }
    }
}
