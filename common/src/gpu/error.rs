use std::fmt;

use crate::gpu::{BufferTarget, ResourceId, ResourceKind};

#[derive(Debug, Clone, PartialEq)]
pub enum GpuError {
    /// Allocation failed, the context is unusable.
    ResourceCreation(ResourceKind, String),
    EmptyData(BufferTarget),
    ShaderCompilation(String),
    NotBound(&'static str),
    UnknownResource(ResourceKind, ResourceId),
    LayoutMismatch(u32),
    IncompleteLayout(Vec<u32>),
    IndexOutOfRange { count: usize, available: usize },
    NoFrame,
    Draw(String),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceCreation(kind, reason) => {
                write!(f, "Failed to create {}: {}", kind, reason)
            }
            Self::EmptyData(target) => write!(f, "Cannot create an empty {:?} buffer", target),
            Self::ShaderCompilation(reason) => write!(f, "Failed to compile program: {}", reason),
            Self::NotBound(what) => write!(f, "No {} is bound", what),
            Self::UnknownResource(kind, id) => write!(f, "Unknown {} {}", kind, id),
            Self::LayoutMismatch(slot) => {
                write!(f, "Attribute slot {} does not match the vertex layout", slot)
            }
            Self::IncompleteLayout(missing) => {
                write!(f, "Vertex layout is missing attribute slots {:?}", missing)
            }
            Self::IndexOutOfRange { count, available } => write!(
                f,
                "Cannot draw {} indices from an index buffer of {}",
                count, available
            ),
            Self::NoFrame => write!(f, "Draw issued outside of a frame"),
            Self::Draw(reason) => write!(f, "Draw call failed: {}", reason),
        }
    }
}

impl std::error::Error for GpuError {}
