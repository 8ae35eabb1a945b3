use crate::math::{UVec2, uvec2};

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct TextureId(pub(crate) u64);

impl From<u64> for TextureId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<TextureId> for u64 {
    fn from(value: TextureId) -> Self {
        value.0
    }
}

/// RGBA8 pixels, row by row without padding
#[derive(Debug, Default, Copy, Clone)]
pub struct TextureData<'a> {
    pub bytes: &'a [u8],
    pub width: u32,
    pub height: u32,
}

impl TextureData<'_> {
    #[inline]
    pub fn size(&self) -> UVec2 {
        uvec2(self.width, self.height)
    }

    /// Checks that there is exactly one RGBA8 pixel for each texel
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "Invalid texture size {}x{}",
                self.width, self.height
            ));
        }

        let expected = self.width as usize * self.height as usize * 4;
        if self.bytes.len() != expected {
            return Err(format!(
                "Texture data has {} bytes but {}x{} RGBA8 needs {expected}",
                self.bytes.len(),
                self.width,
                self.height
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_texture_data() {
        let bytes = [255u8; 16];
        let data = TextureData {
            bytes: &bytes,
            width: 2,
            height: 2,
        };
        assert!(data.validate().is_ok());
        assert_eq!(data.size(), uvec2(2, 2));

        let short = TextureData {
            bytes: &bytes[..12],
            width: 2,
            height: 2,
        };
        assert!(short.validate().is_err());

        let empty = TextureData {
            bytes: &[],
            width: 0,
            height: 4,
        };
        assert!(empty.validate().is_err());
    }
}
