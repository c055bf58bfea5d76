// SPDX-License-Identifier: MIT OR Apache-2.0
//! Texture services provided by the windowing host.

use egui::TextureId;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Texture loading errors
#[derive(Debug, Error)]
pub enum HostError {
    /// The file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not a supported image
    #[error("Failed to decode {path}: {source}")]
    Decode {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: image::ImageError,
    },

    /// Any other host failure
    #[error("Host error: {0}")]
    Unknown(String),
}

/// Texture management offered to the application
pub trait TextureHost {
    /// Load an image file into a texture
    fn load_texture(&mut self, path: &Path) -> Result<TextureId, HostError>;

    /// Release a texture; unknown ids are ignored
    fn destroy_texture(&mut self, id: TextureId);

    /// Texture width in pixels, 0 for unknown ids
    fn texture_width(&self, id: TextureId) -> usize;

    /// Texture height in pixels, 0 for unknown ids
    fn texture_height(&self, id: TextureId) -> usize;
}

/// [`TextureHost`] backed by egui-managed textures
pub struct EguiTextureHost {
    ctx: egui::Context,
    textures: IndexMap<TextureId, egui::TextureHandle>,
}

impl EguiTextureHost {
    /// Create a host bound to an egui context
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            textures: IndexMap::new(),
        }
    }

    /// Number of textures still alive
    pub fn outstanding(&self) -> usize {
        self.textures.len()
    }
}

impl TextureHost for EguiTextureHost {
    fn load_texture(&mut self, path: &Path) -> Result<TextureId, HostError> {
        let data = std::fs::read(path).map_err(|source| HostError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = decode_image(&data).map_err(|source| HostError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        if image.width() == 0 || image.height() == 0 {
            return Err(HostError::Unknown(format!("{} is empty", path.display())));
        }

        let name = path.to_string_lossy();
        let handle = self
            .ctx
            .load_texture(name, image, egui::TextureOptions::LINEAR_REPEAT);
        let id = handle.id();
        self.textures.insert(id, handle);

        tracing::info!("Loaded texture {} ({id:?})", path.display());
        Ok(id)
    }

    fn destroy_texture(&mut self, id: TextureId) {
        // Dropping the last handle frees the texture
        if self.textures.shift_remove(&id).is_some() {
            tracing::debug!("Destroyed texture {id:?}");
        }
    }

    fn texture_width(&self, id: TextureId) -> usize {
        self.textures.get(&id).map_or(0, |handle| handle.size()[0])
    }

    fn texture_height(&self, id: TextureId) -> usize {
        self.textures.get(&id).map_or(0, |handle| handle.size()[1])
    }
}

/// Decode an encoded image into egui's pixel format
pub fn decode_image(data: &[u8]) -> Result<egui::ColorImage, image::ImageError> {
    let image = image::load_from_memory(data)?;
    let size = [image.width() as usize, image.height() as usize];
    let pixels = image.to_rgba8().into_raw();
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, &pixels))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x1 RGBA PNG
    fn tiny_png() -> Vec<u8> {
        let mut bytes = Vec::new();
        let buffer = image::RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 255, 0, 128]).unwrap();
        image::DynamicImage::ImageRgba8(buffer)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_image() {
        let image = decode_image(&tiny_png()).unwrap();
        assert_eq!(image.size, [2, 1]);
        assert_eq!(image.pixels[0], egui::Color32::from_rgb(255, 0, 0));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(decode_image(b"not an image").is_err());
    }

    #[test]
    fn test_load_and_destroy() {
        let path = std::env::temp_dir().join(format!("material_editor_{}_tiny.png", std::process::id()));
        std::fs::write(&path, tiny_png()).unwrap();

        let mut host = EguiTextureHost::new(egui::Context::default());
        let id = host.load_texture(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(host.outstanding(), 1);
        assert_eq!(host.texture_width(id), 2);
        assert_eq!(host.texture_height(id), 1);

        host.destroy_texture(id);
        host.destroy_texture(id);
        assert_eq!(host.outstanding(), 0);
        assert_eq!(host.texture_width(id), 0);
    }

    #[test]
    fn test_missing_file() {
        let mut host = EguiTextureHost::new(egui::Context::default());
        let result = host.load_texture(Path::new("does/not/exist.png"));
        assert!(matches!(result, Err(HostError::Io { .. })));
        assert_eq!(host.outstanding(), 0);
    }
}
