use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::Context;
use log::info;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::colors::{self, Color};
use crate::geometry::PlaneMaterial;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Room Scene".to_owned(),
            width: 1920,
            height: 1080,
        }
    }
}

/// Width along X, height along Y, depth along Z.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Dimensions {
    pub const fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct MaterialsConfig {
    pub floor: PlaneMaterial,
    pub walls: PlaneMaterial,
    pub ceiling: PlaneMaterial,
    pub beams: PlaneMaterial,
}

fn texture_set(directory: &str, name: &str, third_map: &str) -> PlaneMaterial {
    let path = |map: &str| format!("assets/textures/{directory}/{name}_{map}_2k.jpg");

    PlaneMaterial::new(path("diff"), path("nor_gl"), path(third_map))
}

impl Default for MaterialsConfig {
    fn default() -> Self {
        let planks = texture_set("floor", "dark_wooden_planks", "arm");

        Self {
            floor: planks.clone().with_repeat(2.0, 3.0),
            walls: texture_set("walls", "stone_brick_wall_001", "rough").with_repeat(1.5, 1.25),
            ceiling: texture_set("ceiling", "corrugated_iron_02", "arm").with_repeat(2.0, 2.0),
            beams: planks.with_repeat(0.5, 0.3),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    pub color: Color,
    pub lamp_color: Color,
    /// How far below the middle beam the lamp hangs.
    pub lamp_drop: f32,
    pub lamp_marker_size: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            color: colors::WHITE,
            lamp_color: colors::LAMP,
            lamp_drop: 2.5,
            lamp_marker_size: 0.3,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ShaderConfig {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
    pub light_vertex: PathBuf,
    pub light_fragment: PathBuf,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            vertex: PathBuf::from("assets/shaders/default.vert"),
            fragment: PathBuf::from("assets/shaders/default.frag"),
            light_vertex: PathBuf::from("assets/shaders/light.vert"),
            light_fragment: PathBuf::from("assets/shaders/light.frag"),
        }
    }
}

/// Everything the room scene reads at startup. Missing fields fall back to the defaults below,
/// so `{}` is a complete configuration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RoomConfig {
    pub window: WindowConfig,
    pub room: Dimensions,
    pub beam: Dimensions,
    pub beam_count: u32,
    /// Gap between the top of the walls and the ceiling.
    pub ceiling_gap: f32,
    /// Added to the room height when scaling the walls so they meet the raised ceiling.
    pub wall_overhang: f32,
    pub materials: MaterialsConfig,
    pub lighting: LightingConfig,
    pub camera_position: Point3<f32>,
    pub shaders: ShaderConfig,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            room: Dimensions::new(30.0, 15.0, 50.0),
            beam: Dimensions::new(30.0, 1.0, 2.0),
            beam_count: 3,
            ceiling_gap: 2.0,
            wall_overhang: 4.0,
            materials: MaterialsConfig::default(),
            lighting: LightingConfig::default(),
            camera_position: Point3::new(0.0, 1.0, 5.0),
            shaders: ShaderConfig::default(),
        }
    }
}

impl RoomConfig {
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading room configuration {:?}", path);

        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Could not read room configuration {:?}", path))?;

        Self::from_string(&contents)
            .wrap_err_with(|| format!("Invalid room configuration {:?}", path))
    }

    pub fn from_string(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str::<RoomConfig>(contents)?)
    }
}
