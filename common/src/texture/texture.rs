use std::fmt;
use std::fmt::Formatter;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::debug;

use crate::gpu::state::MAX_TEXTURE_UNITS;
use crate::gpu::{Gpu, GpuError, ResourceId, ShaderProgram, UniformValue, WrapMode};
use crate::import;
use crate::import::image::ImageLoadError;

#[derive(Debug, Clone, PartialEq)]
pub enum TextureLoadError {
    ImageLoadError(ImageLoadError),
    CreateTextureError(GpuError),
    UnitOutOfRange(u32),
}

impl fmt::Display for TextureLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoadError(err) => write!(f, "{}", err),
            Self::CreateTextureError(err) => write!(f, "Failed to create texture: {}", err),
            Self::UnitOutOfRange(unit) => write!(
                f,
                "Texture unit {} is out of range, only {} units exist",
                unit, MAX_TEXTURE_UNITS
            ),
        }
    }
}

impl std::error::Error for TextureLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoadError(err) => Some(err),
            Self::CreateTextureError(err) => Some(err),
            Self::UnitOutOfRange(_) => None,
        }
    }
}

/// What a texture is sampled for. Decides the sampler uniform it is matched to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Normal,
    Roughness,
}

impl TextureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diffuse => "diffuse",
            Self::Normal => "normal",
            Self::Roughness => "roughness",
        }
    }
}

/// Every texture in this renderer repeats on both axes.
const WRAP_MODE: WrapMode = WrapMode::Repeat;

#[derive(Debug)]
pub struct Texture {
    id: Option<ResourceId>,
    kind: TextureKind,
    unit: u32,
    path: PathBuf,
    gpu: Gpu,
}

impl Texture {
    /// Decodes `path` and uploads it. Nothing is allocated on the GPU unless decoding succeeds.
    pub fn load(
        gpu: &Gpu,
        path: &Path,
        kind: TextureKind,
        unit: u32,
    ) -> Result<Self, TextureLoadError> {
        if unit >= MAX_TEXTURE_UNITS {
            return Err(TextureLoadError::UnitOutOfRange(unit));
        }

        let image =
            import::image::load_dynamic_image(path).map_err(TextureLoadError::ImageLoadError)?;

        debug!(
            "Decoded {:?} with {} channels",
            path,
            image.color().channel_count()
        );

        let mut texture = Self::from_image(gpu, &image.into_rgba8(), kind, unit)?;
        texture.path = path.to_path_buf();

        Ok(texture)
    }

    pub fn from_image(
        gpu: &Gpu,
        image: &RgbaImage,
        kind: TextureKind,
        unit: u32,
    ) -> Result<Self, TextureLoadError> {
        if unit >= MAX_TEXTURE_UNITS {
            return Err(TextureLoadError::UnitOutOfRange(unit));
        }

        let id = gpu
            .with(|context| context.create_texture(image))
            .map_err(TextureLoadError::CreateTextureError)?;

        Ok(Self {
            id: Some(id),
            kind,
            unit,
            path: PathBuf::new(),
            gpu: gpu.clone(),
        })
    }

    pub fn id(&self) -> Option<ResourceId> {
        self.id
    }

    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    pub fn unit(&self) -> u32 {
        self.unit
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_live(&self) -> bool {
        self.id.is_some()
    }

    /// Name of the shader sampler this texture feeds, e.g. `diffuse0`.
    pub fn sampler_name(&self) -> String {
        format!("{}0", self.kind.as_str())
    }

    /// Binds the texture to its unit and applies the wrap mode.
    pub fn bind(&self) {
        if let Some(id) = self.id {
            self.gpu.with(|context| {
                context.bind_texture(self.unit, Some(id));
                context.set_texture_wrap(self.unit, WRAP_MODE);
            });
        }
    }

    pub fn unbind(&self) {
        if self.id.is_some() {
            self.gpu
                .with(|context| context.bind_texture(self.unit, None));
        }
    }

    /// Points the matching sampler of `shader` at this texture's unit.
    pub fn assign_unit(&self, shader: &ShaderProgram) {
        if self.id.is_some() {
            shader.set_uniform(&self.sampler_name(), UniformValue::Sampler(self.unit));
        }
    }

    pub fn delete(&mut self) {
        if let Some(id) = self.id.take() {
            self.gpu.with(|context| context.delete_texture(id));
        }
    }

    pub fn take(&mut self) -> Self {
        Self {
            id: self.id.take(),
            kind: self.kind,
            unit: self.unit,
            path: std::mem::take(&mut self.path),
            gpu: self.gpu.clone(),
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.delete();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::gpu::{GpuContext, HeadlessContext, ResourceKind};
    use crate::texture::fixtures;

    #[test]
    fn load_uploads_image_dimensions() {
        let context = Rc::new(RefCell::new(HeadlessContext::new()));
        let gpu = Gpu::from_shared(context.clone());
        let path = fixtures::write_png(4, 2);

        let texture = Texture::load(&gpu, &path, TextureKind::Normal, 1).unwrap();
        fixtures::remove(&path);

        let id = texture.id().unwrap();
        let context = context.borrow();
        let record = context.state().texture(id).unwrap();

        assert_eq!((record.width, record.height), (4, 2));
        assert_eq!(texture.sampler_name(), "normal0");
        assert_eq!(texture.path(), path.as_path());
    }

    #[test]
    fn decode_failure_allocates_nothing() {
        let context = Rc::new(RefCell::new(HeadlessContext::new()));
        let gpu = Gpu::from_shared(context.clone());
        let path = fixtures::write_garbage();

        let result = Texture::load(&gpu, &path, TextureKind::Diffuse, 0);
        fixtures::remove(&path);

        assert!(matches!(
            result,
            Err(TextureLoadError::ImageLoadError(ImageLoadError::UnsupportedImage(..)))
        ));
        assert_eq!(context.borrow().live(ResourceKind::Texture), 0);
        assert!(context.borrow().calls().is_empty());
    }

    #[test]
    fn bind_applies_repeat_wrap() {
        let context = Rc::new(RefCell::new(HeadlessContext::new()));
        let gpu = Gpu::from_shared(context.clone());

        let image = RgbaImage::new(1, 1);
        let texture = Texture::from_image(&gpu, &image, TextureKind::Roughness, 2).unwrap();

        {
            let mut context = context.borrow_mut();
            context.bind_texture(2, texture.id());
            context.set_texture_wrap(2, WrapMode::ClampToEdge);
            context.bind_texture(2, None);
        }

        texture.bind();

        let context = context.borrow();
        assert_eq!(context.state().bound_texture(2), texture.id());
        assert_eq!(
            context.state().texture(texture.id().unwrap()).unwrap().wrap,
            WrapMode::Repeat
        );
    }

    #[test]
    fn unit_out_of_range_is_rejected() {
        let context = Rc::new(RefCell::new(HeadlessContext::new()));
        let gpu = Gpu::from_shared(context.clone());

        let result = Texture::from_image(
            &gpu,
            &RgbaImage::new(1, 1),
            TextureKind::Diffuse,
            MAX_TEXTURE_UNITS,
        );

        assert_eq!(
            result.unwrap_err(),
            TextureLoadError::UnitOutOfRange(MAX_TEXTURE_UNITS)
        );
        assert_eq!(context.borrow().live_total(), 0);
    }

    #[test]
    fn delete_twice_releases_once() {
        let context = Rc::new(RefCell::new(HeadlessContext::new()));
        let gpu = Gpu::from_shared(context.clone());

        let mut texture =
            Texture::from_image(&gpu, &RgbaImage::new(1, 1), TextureKind::Diffuse, 0).unwrap();
        texture.delete();
        texture.delete();
        drop(texture);

        let context = context.borrow();
        assert_eq!(context.live(ResourceKind::Texture), 0);
        assert_eq!(context.state().redundant_deletes(), 0);
    }
}
