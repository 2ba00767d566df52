//! Generic GPU texture resource.

use crate::native::{Extent, Filter, PixelFormat, TextureBackend, TextureDesc, TextureId};

/// A GPU texture object: id, allocation state and the pending-update flag.
///
/// Hardware textures compose this type and add their own import behavior on
/// top. The texture object itself is created lazily.
#[derive(Debug)]
pub struct Texture {
    id: Option<TextureId>,
    format: PixelFormat,
    filter: Filter,
    needs_update: bool,
}

impl Texture {
    /// Create an unallocated texture.
    pub fn new(format: PixelFormat, filter: Filter) -> Self {
        Self {
            id: None,
            format,
            filter,
            needs_update: true,
        }
    }

    /// Create and bind the texture object if it does not exist yet.
    ///
    /// Returns the texture id, or `None` if the backend could not create one.
    pub fn allocate<B: TextureBackend + ?Sized>(&mut self, backend: &B, extent: Extent) -> Option<TextureId> {
        if self.id.is_none() {
            self.id = backend.create_texture(&TextureDesc {
                extent,
                format: self.format,
                filter: self.filter,
            });
            log::trace!("texture object created: {:?} ({})", self.id, extent);
        }
        self.id
    }

    /// Delete the texture object, if any.
    pub fn destroy<B: TextureBackend + ?Sized>(&mut self, backend: &B) {
        if let Some(id) = self.id.take() {
            backend.delete_texture(id);
            log::trace!("texture object deleted: {:?}", id);
        }
    }

    /// Texture object id.
    pub fn id(&self) -> Option<TextureId> {
        self.id
    }

    /// True once the texture object exists.
    pub fn is_allocated(&self) -> bool {
        self.id.is_some()
    }

    /// True while the sampled contents are stale.
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    pub fn set_needs_update(&mut self, needs_update: bool) {
        self.needs_update = needs_update;
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }
}
