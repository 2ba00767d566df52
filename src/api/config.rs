//! Hardware texture configuration.

use crate::native::{Filter, PixelFormat};

/// Configuration for a hardware texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureConfig {
    /// Map the buffer for CPU writes at construction (default: true)
    pub cpu_access: bool,

    /// Pixel layout of the buffer (default: BGRA8888)
    pub format: PixelFormat,

    /// Sampling filter of the GPU texture object (default: linear)
    pub filter: Filter,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            cpu_access: true,
            format: PixelFormat::Bgra8888,
            filter: Filter::Linear,
        }
    }
}

impl TextureConfig {
    /// A buffer only the GPU touches, in the platform default format.
    pub fn gpu_only() -> Self {
        Self {
            cpu_access: false,
            format: PixelFormat::Rgba8888,
            filter: Filter::Linear,
        }
    }

    /// Builder pattern: set CPU access.
    pub fn with_cpu_access(mut self, cpu_access: bool) -> Self {
        self.cpu_access = cpu_access;
        self
    }

    /// Builder pattern: select BGRA8888 or the platform default.
    pub fn with_bgra(mut self, use_bgra: bool) -> Self {
        self.format = PixelFormat::from_bgra(use_bgra);
        self
    }

    /// Builder pattern: set pixel format.
    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    /// Builder pattern: set sampling filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }
}
