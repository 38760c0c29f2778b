pub mod obj;

pub use obj::ObjModel;
