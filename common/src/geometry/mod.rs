pub use cube::Cube;
pub use error::MeshError;
pub use mesh::{Drawable, MeshBuffers};
pub use plane::{Plane, PlaneMaterial};
pub use vertex::Vertex;

mod cube;
mod error;
pub mod mesh;
mod plane;
pub mod vertex;
