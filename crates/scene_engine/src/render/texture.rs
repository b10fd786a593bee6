//! Decoded images and the texture store

use super::resources::Texture;
use super::{RenderError, RenderResult, TextureId};
use image::DynamicImage;
use std::collections::HashMap;
use std::path::Path;

/// Pixel layouts the backends accept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// One 8-bit channel
    R8,
    /// Two 8-bit channels
    Rg8,
    /// Three 8-bit channels
    Rgb8,
    /// Four 8-bit channels
    Rgba8,
}

impl TextureFormat {
    /// Bytes per pixel
    pub fn channels(self) -> usize {
        match self {
            Self::R8 => 1,
            Self::Rg8 => 2,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// CPU-side image ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    name: String,
    width: u32,
    height: u32,
    format: TextureFormat,
    pixels: Vec<u8>,
}

impl TextureImage {
    /// Wrap raw pixels, checking their length against the dimensions
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        format: TextureFormat,
        pixels: Vec<u8>,
    ) -> RenderResult<Self> {
        let name = name.into();
        let expected = width as usize * height as usize * format.channels();
        if pixels.len() != expected {
            return Err(RenderError::ResourceCreationFailure(format!(
                "texture '{name}' has {} bytes, expected {expected}",
                pixels.len()
            )));
        }
        Ok(Self {
            name,
            width,
            height,
            format,
            pixels,
        })
    }

    /// One-pixel RGBA image
    pub fn solid(name: impl Into<String>, rgba: [u8; 4]) -> Self {
        Self {
            name: name.into(),
            width: 1,
            height: 1,
            format: TextureFormat::Rgba8,
            pixels: rgba.to_vec(),
        }
    }

    /// Decode an encoded image (PNG, ...) from memory
    pub fn decode(name: impl Into<String>, bytes: &[u8]) -> RenderResult<Self> {
        Self::from_dynamic(name, image::load_from_memory(bytes)?)
    }

    /// Decode an image file
    pub fn open(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        Self::from_dynamic(path.display().to_string(), image::open(path)?)
    }

    /// Keep 8-bit images as they are; anything else is unsupported
    pub fn from_dynamic(name: impl Into<String>, image: DynamicImage) -> RenderResult<Self> {
        let name = name.into();
        let (width, height) = (image.width(), image.height());
        let (format, pixels) = match image {
            DynamicImage::ImageLuma8(buffer) => (TextureFormat::R8, buffer.into_raw()),
            DynamicImage::ImageLumaA8(buffer) => (TextureFormat::Rg8, buffer.into_raw()),
            DynamicImage::ImageRgb8(buffer) => (TextureFormat::Rgb8, buffer.into_raw()),
            DynamicImage::ImageRgba8(buffer) => (TextureFormat::Rgba8, buffer.into_raw()),
            other => {
                return Err(RenderError::UnsupportedTextureFormat(format!(
                    "'{name}' uses {:?}",
                    other.color()
                )))
            }
        };
        Self::new(name, width, height, format, pixels)
    }

    /// Debug name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel layout
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Tightly packed rows of pixels
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Index into a [`TextureStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(usize);

/// Uploaded textures, deduplicated by name
#[derive(Debug, Default)]
pub struct TextureStore {
    textures: Vec<Texture>,
    names: HashMap<String, TextureHandle>,
}

impl TextureStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle of the texture registered under `name`
    pub fn find(&self, name: &str) -> Option<TextureHandle> {
        self.names.get(name).copied()
    }

    /// Register an uploaded texture under `name`
    ///
    /// If the name is taken, the existing handle is returned and `texture`
    /// is dropped, which schedules its release.
    pub fn insert(&mut self, name: impl Into<String>, texture: Texture) -> TextureHandle {
        let name = name.into();
        if let Some(handle) = self.find(&name) {
            return handle;
        }
        let handle = TextureHandle(self.textures.len());
        self.textures.push(texture);
        self.names.insert(name, handle);
        handle
    }

    /// Uploaded texture behind `handle`
    pub fn get(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle.0)
    }

    /// Backend id behind `handle`
    pub fn texture_id(&self, handle: TextureHandle) -> Option<TextureId> {
        self.get(handle).map(Texture::id)
    }

    /// Number of textures
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Drop every texture; outstanding handles become dangling
    pub fn clear(&mut self) {
        self.textures.clear();
        self.names.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ReleaseQueue;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 100, 50, 255]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let image = TextureImage::decode("checker", &png_bytes(3, 2)).unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
        assert_eq!(image.format(), TextureFormat::Rgba8);
        assert_eq!(&image.pixels()[..4], &[200, 100, 50, 255]);
    }

    #[test]
    fn test_garbage_bytes_fail() {
        assert!(matches!(
            TextureImage::decode("junk", b"not an image"),
            Err(RenderError::Image(_))
        ));
    }

    #[test]
    fn test_sixteen_bit_images_are_unsupported() {
        let deep = DynamicImage::ImageRgb16(image::ImageBuffer::new(1, 1));
        assert!(matches!(
            TextureImage::from_dynamic("deep", deep),
            Err(RenderError::UnsupportedTextureFormat(_))
        ));
    }

    #[test]
    fn test_pixel_length_is_checked() {
        assert!(TextureImage::new("short", 2, 2, TextureFormat::Rgb8, vec![0; 11]).is_err());
        assert!(TextureImage::new("exact", 2, 2, TextureFormat::Rgb8, vec![0; 12]).is_ok());
    }

    #[test]
    fn test_store_deduplicates_by_name() {
        let queue = ReleaseQueue::new();
        let mut store = TextureStore::new();
        let first = store.insert("albedo", Texture::new(TextureId(1), queue.clone()));
        let second = store.insert("albedo", Texture::new(TextureId(2), queue.clone()));

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
        assert_eq!(store.texture_id(first), Some(TextureId(1)));
        // the duplicate upload is released right away
        assert_eq!(queue.len(), 1);

        store.clear();
        assert_eq!(queue.len(), 2);
    }
}
