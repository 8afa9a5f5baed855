use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader};
use log::info;

#[derive(Debug, Clone, PartialEq)]
pub enum ImageLoadError {
    ImageNotFound(PathBuf),
    UnsupportedImage(PathBuf, String),
}

impl std::fmt::Display for ImageLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ImageNotFound(path) => write!(f, "The image {:?} could not be found", path),
            Self::UnsupportedImage(path, reason) => {
                write!(f, "The image {:?} could not be decoded: {}", path, reason)
            }
        }
    }
}

impl std::error::Error for ImageLoadError {}

pub fn load_dynamic_image(path: &Path) -> Result<DynamicImage, ImageLoadError> {
    info!("Loading image {:?}", path);

    let image =
        ImageReader::open(path).map_err(|_| ImageLoadError::ImageNotFound(path.to_path_buf()))?;

    // Guess from the content so a mislabelled extension still decodes
    let image = image
        .with_guessed_format()
        .map_err(|_| ImageLoadError::ImageNotFound(path.to_path_buf()))?;

    let decoded = image
        .decode()
        .map_err(|err| ImageLoadError::UnsupportedImage(path.to_path_buf(), err.to_string()))?;

    Ok(decoded)
}
