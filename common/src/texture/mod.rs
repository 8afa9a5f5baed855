pub use texture::{Texture, TextureKind, TextureLoadError};

#[cfg(test)]
pub(crate) mod fixtures;
mod texture;
