use std::fmt;

use crate::gpu::GpuError;
use crate::texture::TextureLoadError;

#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// Buffer or vertex array allocation failed. The context is unusable, nothing retries this.
    ResourceCreation(GpuError),
    Texture(TextureLoadError),
    /// Plane construction failed and every resource it had created was released.
    PlaneInitialization(Box<MeshError>),
    DrawBeforeInit,
    Draw(GpuError),
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceCreation(err) => write!(f, "Failed to create mesh resources: {}", err),
            Self::Texture(err) => write!(f, "Failed to load texture: {}", err),
            Self::PlaneInitialization(err) => write!(f, "Failed to initialize plane: {}", err),
            Self::DrawBeforeInit => write!(f, "Attempted to draw an uninitialized mesh"),
            Self::Draw(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for MeshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ResourceCreation(err) | Self::Draw(err) => Some(err),
            Self::Texture(err) => Some(err),
            Self::PlaneInitialization(err) => Some(err.as_ref()),
            Self::DrawBeforeInit => None,
        }
    }
}
