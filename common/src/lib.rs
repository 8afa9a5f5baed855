pub mod application;
pub mod camera;
pub mod colors;
pub mod config;
pub mod context;
pub mod debug;
pub mod geometry;
pub mod gpu;
pub mod import;
pub mod input;
pub mod light;
pub mod maths;
pub mod room;
pub mod run;
pub mod texture;
