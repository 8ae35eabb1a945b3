use crate::policy::{Policy, PrimitivesPolicy, ViewportsPolicy};
#[cfg(feature = "logs")]
use corelib::app::LogConfig;
use corelib::app::WindowConfig;
use corelib::gfx::Color;
use corelib::images::ImageFormat;
use corelib::option_usize_env;
use smallvec::{SmallVec, smallvec};
use std::path::PathBuf;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

const DEFAULT_OUTLINE_SCALE_PERCENT: usize = 150;
const DEFAULT_DOT_SPACING: u32 = 5;

/// Which [`Policy`] draws the frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PolicyKind {
    Primitives,
    #[default]
    Viewports,
}

impl PolicyKind {
    /// Value of `GFXDEMO_POLICY` at build time
    pub fn from_env() -> Self {
        Self::parse_or_default(option_env!("GFXDEMO_POLICY"))
    }

    pub fn parse_or_default(value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Self::default();
        };

        Self::from_str(&value.to_lowercase()).unwrap_or_else(|_| {
            log::warn!(
                "Unknown render policy '{value}', using '{}'",
                Self::default()
            );
            Self::default()
        })
    }
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub texture_path: PathBuf,
    pub image_formats: SmallVec<ImageFormat, 4>,
    pub policy: PolicyKind,
    pub outline_scale: f32,
    pub dot_spacing: u32,
    pub clear_color: Color,
    #[cfg(feature = "logs")]
    pub logs: LogConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        let outline_percent =
            option_usize_env!("GFXDEMO_OUTLINE_SCALE", DEFAULT_OUTLINE_SCALE_PERCENT);

        Self {
            window: WindowConfig::default(),
            texture_path: PathBuf::from("assets/texture.png"),
            image_formats: smallvec![ImageFormat::Png],
            policy: PolicyKind::from_env(),
            outline_scale: outline_percent as f32 / 100.0,
            dot_spacing: DEFAULT_DOT_SPACING,
            clear_color: Color::BLACK,
            #[cfg(feature = "logs")]
            logs: LogConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the window configuration
    pub fn window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    /// Set the window's title
    pub fn title(mut self, title: &str) -> Self {
        self.window = self.window.title(title);
        self
    }

    /// Set the window's size
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.window = self.window.size(width, height);
        self
    }

    /// Image loaded as texture at startup
    pub fn texture_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.texture_path = path.into();
        self
    }

    /// Formats the image subsystem is initiated with
    pub fn image_formats(mut self, formats: &[ImageFormat]) -> Self {
        self.image_formats = formats.iter().copied().collect();
        self
    }

    pub fn policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    /// Size of the outline relative to the filled rect
    pub fn outline_scale(mut self, scale: f32) -> Self {
        self.outline_scale = scale;
        self
    }

    /// Vertical distance between the dots of the dotted line
    pub fn dot_spacing(mut self, spacing: u32) -> Self {
        self.dot_spacing = spacing.max(1);
        self
    }

    /// Color used to clear the frame behind the viewports
    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    #[cfg(feature = "logs")]
    pub fn logs(mut self, logs: LogConfig) -> Self {
        self.logs = logs;
        self
    }

    /// Builds the configured render policy
    pub fn render_policy(&self) -> Policy {
        match self.policy {
            PolicyKind::Primitives => Policy::Primitives(PrimitivesPolicy {
                outline_scale: self.outline_scale,
                dot_spacing: self.dot_spacing,
            }),
            PolicyKind::Viewports => Policy::Viewports(ViewportsPolicy {
                clear_color: self.clear_color,
            }),
        }
    }
}
