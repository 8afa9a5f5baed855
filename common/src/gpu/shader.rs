use std::fs;
use std::path::Path;

use color_eyre::Result;
use color_eyre::eyre::Context;
use log::{info, warn};

use crate::gpu::{Gpu, GpuError, ResourceId, UniformValue};

#[derive(Debug)]
pub struct ShaderProgram {
    id: Option<ResourceId>,
    gpu: Gpu,
}

impl ShaderProgram {
    pub fn from_source(
        gpu: &Gpu,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, GpuError> {
        let id = gpu.with(|context| context.create_program(vertex_source, fragment_source))?;

        Ok(Self {
            id: Some(id),
            gpu: gpu.clone(),
        })
    }

    pub fn from_files(gpu: &Gpu, vertex_path: &Path, fragment_path: &Path) -> Result<Self> {
        info!("Compiling shaders {:?} and {:?}", vertex_path, fragment_path);

        let vertex_source = fs::read_to_string(vertex_path)
            .wrap_err_with(|| format!("Could not read vertex shader {:?}", vertex_path))?;
        let fragment_source = fs::read_to_string(fragment_path)
            .wrap_err_with(|| format!("Could not read fragment shader {:?}", fragment_path))?;

        Ok(Self::from_source(gpu, &vertex_source, &fragment_source)?)
    }

    pub fn id(&self) -> Option<ResourceId> {
        self.id
    }

    pub fn activate(&self) {
        if let Some(id) = self.id {
            self.gpu.with(|context| context.use_program(Some(id)));
        }
    }

    pub fn set_uniform(&self, name: &str, value: UniformValue) {
        match self.id {
            Some(id) => self
                .gpu
                .with(|context| context.set_uniform(id, name, value)),
            None => warn!("Setting uniform {} on a deleted program", name),
        }
    }

    pub fn delete(&mut self) {
        if let Some(id) = self.id.take() {
            self.gpu.with(|context| context.delete_program(id));
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        self.delete();
    }
}
