use std::mem::offset_of;

use glium::implement_vertex;
use serde::{Deserialize, Serialize};

use crate::gpu::{ElementType, VertexAttribute};

pub const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

/// Vertex shared by every primitive. The field order is the attribute slot order and every
/// attribute description below depends on it.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    // Always white for now
    pub color: [f32; 3],
    pub tex_coord: [f32; 2],
}

implement_vertex!(Vertex, position, normal, color, tex_coord);

pub const FLOATS_PER_VERTEX: usize = 11;
pub const STRIDE: usize = size_of::<Vertex>();

const _: () = assert!(STRIDE == FLOATS_PER_VERTEX * size_of::<f32>());

pub const POSITION: VertexAttribute = attribute(0, 3, offset_of!(Vertex, position));
pub const NORMAL: VertexAttribute = attribute(1, 3, offset_of!(Vertex, normal));
pub const COLOR: VertexAttribute = attribute(2, 3, offset_of!(Vertex, color));
pub const TEX_COORD: VertexAttribute = attribute(3, 2, offset_of!(Vertex, tex_coord));

pub const ATTRIBUTES: [VertexAttribute; 4] = [POSITION, NORMAL, COLOR, TEX_COORD];

const fn attribute(slot: u32, components: u8, offset: usize) -> VertexAttribute {
    VertexAttribute {
        slot,
        components,
        element_type: ElementType::Float,
        stride: STRIDE,
        offset,
    }
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            color: WHITE,
            tex_coord,
        }
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            normal: [0.0, 0.0, 0.0],
            color: WHITE,
            tex_coord: [0.0, 0.0],
        }
    }
}
