use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};

fn temp_path(extension: &str) -> PathBuf {
    std::env::temp_dir().join(format!("room-fixture-{}.{}", fastrand::u64(..), extension))
}

pub fn write_png(width: u32, height: u32) -> PathBuf {
    let path = temp_path("png");

    RgbaImage::from_pixel(width, height, Rgba([200, 120, 40, 255]))
        .save(&path)
        .unwrap();

    path
}

pub fn write_garbage() -> PathBuf {
    let path = temp_path("jpg");
    std::fs::write(&path, b"not an image").unwrap();
    path
}

pub fn missing() -> PathBuf {
    temp_path("png")
}

pub fn remove(path: &Path) {
    let _ = std::fs::remove_file(path);
}
