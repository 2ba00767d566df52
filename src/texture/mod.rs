//! Texture resources.
//!
//! [`Texture`] is the generic GPU texture object. [`HardwareTexture`] composes
//! it with a hardware buffer, a CPU mapping and a GPU image import, and is
//! exposed to renderers through the [`GpuImportable`] capability.

mod base;
mod hardware;

pub use base::Texture;
pub use hardware::HardwareTexture;

use crate::api::error::TextureError;
use crate::native::{Extent, ImageHandle, TextureId};

/// Description of the surface a texture mirrors (e.g. an X11 drawable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub width: u32,
    pub height: u32,
    /// Source contents changed since the last update
    pub dirty: bool,
}

impl SourceDescriptor {
    pub fn new(width: u32, height: u32, dirty: bool) -> Self {
        Self { width, height, dirty }
    }

    pub fn extent(&self) -> Extent {
        Extent::new(self.width, self.height)
    }
}

/// A texture whose GPU image can be imported instead of uploaded.
pub trait GpuImportable {
    /// Create the texture object and import the backing storage. Idempotent.
    ///
    /// `payload` is ignored: pixels arrive through the CPU mapping or GPU writes.
    fn allocate_texture(&mut self, width: u32, height: u32, payload: Option<&[u8]>) -> Result<(), TextureError>;

    /// Lazily allocate, then clear the pending-update flag. Never copies pixels.
    fn update_from_source(&mut self, source: &SourceDescriptor) -> Result<(), TextureError>;

    /// The underlying texture object.
    fn texture(&self) -> &Texture;

    /// Imported GPU image, if the import succeeded.
    fn image_handle(&self) -> Option<ImageHandle>;

    /// True when the GPU samples the backing buffer directly: both the buffer
    /// and its imported image are live.
    fn is_zero_copy(&self) -> bool;

    /// Texture object id, if allocated.
    fn texture_id(&self) -> Option<TextureId> {
        self.texture().id()
    }

    /// Release every native resource. Safe to call more than once.
    fn destroy(&mut self);
}
