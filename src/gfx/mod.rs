pub mod mesh;
pub mod shader;
pub mod texture;
pub mod vertex;

pub use mesh::Mesh;
pub use shader::Shader;
pub use texture::Texture;
pub use vertex::Vertex;
