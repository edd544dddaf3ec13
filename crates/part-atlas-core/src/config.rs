use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Encoding for the atlas page image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            _ => Err(()),
        }
    }
}

/// Atlas build configuration. All parts are equal-size squares of
/// `part_size` pixels; `jpeg_quality` only applies when `format` is lossy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasConfig {
    /// Square cell edge in pixels.
    #[serde(default = "default_part_size")]
    pub part_size: u32,
    #[serde(default = "default_format")]
    pub format: OutputFormat,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            part_size: default_part_size(),
            format: default_format(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl AtlasConfig {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.part_size == 0 {
            return Err(crate::error::AtlasError::InvalidInput(
                "part_size must be non-zero".into(),
            ));
        }
        Ok(())
    }

    pub fn builder() -> AtlasConfigBuilder {
        AtlasConfigBuilder::new()
    }
}

fn default_part_size() -> u32 {
    128
}
fn default_format() -> OutputFormat {
    OutputFormat::Png
}
fn default_jpeg_quality() -> u8 {
    60
}

/// Builder for `AtlasConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct AtlasConfigBuilder {
    cfg: AtlasConfig,
}

impl AtlasConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: AtlasConfig::default(),
        }
    }
    pub fn part_size(mut self, v: u32) -> Self {
        self.cfg.part_size = v;
        self
    }
    pub fn format(mut self, v: OutputFormat) -> Self {
        self.cfg.format = v;
        self
    }
    pub fn jpeg_quality(mut self, v: u8) -> Self {
        self.cfg.jpeg_quality = v;
        self
    }
    pub fn build(self) -> AtlasConfig {
        self.cfg
    }
}
