use crate::gfx::TextureData;
use smallvec::SmallVec;
use std::path::Path;
use strum_macros::Display;

/// Image formats the loader can be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
    Gif,
    Bmp,
}

impl ImageFormat {
    fn to_image(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Webp => image::ImageFormat::WebP,
            ImageFormat::Gif => image::ImageFormat::Gif,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
        }
    }

    fn from_image(format: image::ImageFormat) -> Option<Self> {
        Some(match format {
            image::ImageFormat::Png => ImageFormat::Png,
            image::ImageFormat::Jpeg => ImageFormat::Jpeg,
            image::ImageFormat::WebP => ImageFormat::Webp,
            image::ImageFormat::Gif => ImageFormat::Gif,
            image::ImageFormat::Bmp => ImageFormat::Bmp,
            _ => return None,
        })
    }

    /// Returns true if this build is able to decode the format
    #[inline]
    pub fn is_supported(self) -> bool {
        self.to_image().reading_enabled()
    }
}

/// RGBA8 pixels decoded from an image file
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    #[inline]
    pub fn as_texture_data(&self) -> TextureData<'_> {
        TextureData {
            bytes: &self.pixels,
            width: self.width,
            height: self.height,
        }
    }
}

/// Image decoding subsystem, restricted to the formats it was initiated with
#[derive(Debug)]
pub struct ImageLoader {
    formats: SmallVec<ImageFormat, 4>,
}

impl ImageLoader {
    pub fn init(formats: &[ImageFormat]) -> Result<Self, String> {
        if formats.is_empty() {
            return Err("No image formats requested".to_string());
        }

        let unsupported: SmallVec<String, 4> = formats
            .iter()
            .filter(|f| !f.is_supported())
            .map(|f| f.to_string())
            .collect();

        if !unsupported.is_empty() {
            return Err(format!(
                "Image formats not supported by this build: {}",
                unsupported.join(", ")
            ));
        }

        let mut enabled: SmallVec<ImageFormat, 4> = SmallVec::new();
        for format in formats {
            if !enabled.contains(format) {
                enabled.push(*format);
            }
        }

        log::debug!("Image loader initiated with formats {:?}", enabled.as_slice());
        Ok(Self { formats: enabled })
    }

    #[inline]
    pub fn formats(&self) -> &[ImageFormat] {
        &self.formats
    }

    /// Reads and decodes the file at `path`
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<DecodedImage, String> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| format!("Cannot read '{}': {e}", path.display()))?;

        self.decode(&bytes)
            .map_err(|e| format!("Cannot decode '{}': {e}", path.display()))
    }

    /// Decodes `bytes`, the format is detected from the content
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, String> {
        let raw_format = image::guess_format(bytes).map_err(|e| e.to_string())?;
        let format = ImageFormat::from_image(raw_format)
            .filter(|f| self.formats.contains(f))
            .ok_or_else(|| format!("Image format '{raw_format:?}' is not enabled"))?;

        let img = image::load_from_memory_with_format(bytes, raw_format)
            .map_err(|e| e.to_string())?
            .to_rgba8();

        let (width, height) = img.dimensions();
        log::trace!("Decoded {format} image {width}x{height}");

        Ok(DecodedImage {
            format,
            width,
            height,
            pixels: img.into_raw(),
        })
    }

    pub fn quit(self) {
        log::debug!("Image loader closed");
    }
}
