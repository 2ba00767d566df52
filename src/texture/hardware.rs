//! Hardware-buffer-backed textures.
//!
//! A [`HardwareTexture`] owns three coupled native resources:
//!
//! 1. a hardware buffer, allocated at construction;
//! 2. an optional CPU mapping of that buffer, also taken at construction;
//! 3. a GPU image imported from the buffer and bound to the texture object,
//!    created lazily by [`HardwareTexture::allocate_texture`].
//!
//! Teardown runs in the reverse dependency order: GPU image, then buffer
//! (unmapping it if locked), then the texture object. Any of the three may be
//! missing, so teardown is safe on a partially constructed texture, and it
//! runs at most once, either explicitly or on drop.
//!
//! ## Concurrency
//!
//! A texture is owned by one thread at a time (normally the render thread).
//! The CPU mapping may be handed to a producer thread through
//! [`HardwareTexture::cpu_mapping`]; ordering those writes against GPU reads
//! (e.g. with a frame fence) is the caller's job.

use std::sync::Arc;

use crate::api::config::TextureConfig;
use crate::api::error::TextureError;
use crate::native::{
    BufferHandle, BufferLayout, Extent, ImageHandle, MappedRegion, NativeBackend, PixelFormat,
    TextureId,
};
use crate::{ht_emit_ctx, texture::{GpuImportable, SourceDescriptor, Texture}};

/// A GPU texture sampling a CPU-writable hardware buffer without upload copies.
pub struct HardwareTexture<B: NativeBackend> {
    backend: Arc<B>,
    base: Texture,
    extent: Extent,
    buffer: Option<BufferHandle>,
    image: Option<ImageHandle>,
    mapping: Option<MappedRegion>,
    locked: bool,
    layout: BufferLayout,
    destroyed: bool,
    #[cfg(feature = "debug")]
    destroyed_at: Option<backtrace::Backtrace>,
}

impl<B: NativeBackend> HardwareTexture<B> {
    /// Allocate a CPU-mapped BGRA8888 buffer.
    pub fn new(backend: Arc<B>, width: u32, height: u32) -> Self {
        Self::with_config(backend, width, height, &TextureConfig::default())
    }

    /// Allocate a BGRA8888 buffer, mapped for the CPU if `cpu_access` is set.
    pub fn with_cpu_access(backend: Arc<B>, width: u32, height: u32, cpu_access: bool) -> Self {
        Self::with_config(
            backend,
            width,
            height,
            &TextureConfig::default().with_cpu_access(cpu_access),
        )
    }

    /// Allocate a buffer as described by `config`.
    ///
    /// Never fails: if the buffer cannot be allocated the texture is valid but
    /// reports no buffer handle. A failed CPU mapping leaves the texture
    /// unlocked but keeps the buffer.
    pub fn with_config(backend: Arc<B>, width: u32, height: u32, config: &TextureConfig) -> Self {
        let extent = Extent::new(width, height);
        let mut texture = Self {
            backend,
            base: Texture::new(config.format, config.filter),
            extent,
            buffer: None,
            image: None,
            mapping: None,
            locked: false,
            layout: BufferLayout::default(),
            destroyed: false,
            #[cfg(feature = "debug")]
            destroyed_at: None,
        };

        if extent.is_empty() {
            ht_emit_ctx!(HT001, "size={} is empty", extent);
            return texture;
        }

        let Some(allocated) = texture
            .backend
            .allocate_buffer(extent, config.cpu_access, config.format)
        else {
            ht_emit_ctx!(HT001, "size={} format={:?}", extent, config.format);
            return texture;
        };
        texture.buffer = Some(allocated.handle);
        texture.layout = allocated.layout;
        log::debug!(
            "hardware buffer {:?} allocated: {} {:?}, stride={}",
            allocated.handle,
            extent,
            config.format,
            allocated.layout.row_stride
        );

        if config.cpu_access {
            match texture.backend.map_buffer(allocated.handle) {
                Some(region) => {
                    texture.mapping = Some(region);
                    texture.locked = true;
                    log::trace!("hardware buffer {:?} locked ({} bytes)", allocated.handle, region.len());
                }
                None => ht_emit_ctx!(HT002, "buffer={:?} size={}", allocated.handle, extent),
            }
        }

        texture
    }

    /// Create the texture object and import the buffer as its GPU image.
    ///
    /// Idempotent: once the texture object exists this does nothing, even if
    /// the earlier import failed. `payload` is ignored.
    pub fn allocate_texture(&mut self, width: u32, height: u32, payload: Option<&[u8]>) -> Result<(), TextureError> {
        self.ensure_live()?;
        self.ensure_extent(Extent::new(width, height))?;
        if self.base.is_allocated() {
            return Ok(());
        }
        if payload.is_some() {
            log::trace!("initial payload ignored for hardware texture {}", self.extent);
        }

        // The import binds against the texture id, so the id must exist first.
        let Some(texture_id) = self.base.allocate(&*self.backend, self.extent) else {
            ht_emit_ctx!(HT101, "size={}", self.extent);
            return Ok(());
        };

        match self.buffer {
            Some(buffer) => {
                self.image = self.backend.import_buffer(buffer, texture_id);
                match self.image {
                    Some(image) => log::debug!(
                        "hardware buffer {:?} imported as {:?} on texture {:?}",
                        buffer,
                        image,
                        texture_id
                    ),
                    None => ht_emit_ctx!(HT102, "buffer={:?} texture={:?}", buffer, texture_id),
                }
            }
            None => log::debug!("texture {:?} has no hardware buffer to import", texture_id),
        }

        Ok(())
    }

    /// Lazily allocate for `source`, then clear the pending-update flag.
    ///
    /// No pixels are copied: writes through the CPU mapping are what the GPU
    /// samples.
    pub fn update_from_source(&mut self, source: &SourceDescriptor) -> Result<(), TextureError> {
        self.ensure_live()?;
        self.ensure_extent(source.extent())?;
        if !self.base.is_allocated() {
            self.allocate_texture(source.width, source.height, None)?;
        }
        if source.dirty {
            log::trace!("source dirty, texture {:?} samples the mapping directly", self.base.id());
        }
        self.base.set_needs_update(false);
        Ok(())
    }

    /// Release the GPU image, then the buffer and its mapping, then the
    /// texture object.
    ///
    /// A second call releases nothing and emits warning `HT203`.
    pub fn destroy(&mut self) {
        if self.destroyed {
            ht_emit_ctx!(HT203, "size={}", self.extent);
            return;
        }
        self.release();
    }

    fn release(&mut self) {
        // This texture owns both handles, and the mapping is cleared before
        // anything can observe it again.
        unsafe {
            if let Some(image) = self.image.take() {
                self.backend.release_image(image);
            }
            if let Some(buffer) = self.buffer.take() {
                self.backend.release_buffer(buffer, self.locked);
            }
        }
        self.mapping = None;
        self.locked = false;
        self.base.destroy(&*self.backend);
        self.destroyed = true;

        #[cfg(feature = "debug")]
        {
            self.destroyed_at = Some(backtrace::Backtrace::new_unresolved());
        }

        log::debug!("hardware texture {} destroyed", self.extent);
    }

    /// CPU mapping of the buffer, present while locked.
    pub fn cpu_mapping(&self) -> Option<MappedRegion> {
        self.mapping
    }

    /// Mutable view of the pixel storage, present while locked.
    ///
    /// Rows are [`row_stride`](Self::row_stride) pixels apart.
    pub fn pixels_mut(&mut self) -> Option<&mut [u8]> {
        let region = self.mapping?;
        // Only release() frees the buffer, and it clears the mapping first.
        // Backends cannot free it behind our back: their release calls are unsafe.
        Some(unsafe { std::slice::from_raw_parts_mut(region.as_ptr(), region.len()) })
    }

    /// Row stride in pixels, 0 if no buffer was allocated.
    pub fn row_stride(&self) -> u32 {
        self.layout.row_stride
    }

    /// Platform handle of the buffer, 0 if unknown.
    pub fn native_handle(&self) -> i32 {
        self.layout.native_handle
    }

    pub fn buffer_handle(&self) -> Option<BufferHandle> {
        self.buffer
    }

    pub fn image_handle(&self) -> Option<ImageHandle> {
        self.image
    }

    pub fn texture_id(&self) -> Option<TextureId> {
        self.base.id()
    }

    /// True once the texture object exists.
    pub fn is_allocated(&self) -> bool {
        self.base.is_allocated()
    }

    /// True while the buffer is CPU-mapped.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// True when the GPU samples the buffer directly.
    pub fn is_zero_copy(&self) -> bool {
        self.buffer.is_some() && self.image.is_some()
    }

    pub fn needs_update(&self) -> bool {
        self.base.needs_update()
    }

    /// Flag the contents as stale until the next update.
    pub fn mark_dirty(&mut self) {
        self.base.set_needs_update(true);
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn format(&self) -> PixelFormat {
        self.base.format()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Device this texture was allocated on.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    fn ensure_live(&self) -> Result<(), TextureError> {
        if !self.destroyed {
            return Ok(());
        }

        #[cfg(feature = "debug")]
        {
            let mut trace = self.destroyed_at.clone().unwrap_or_else(backtrace::Backtrace::new_unresolved);
            trace.resolve();
            ht_emit_ctx!(HT201, "size={} destroyed at:\n{:?}", self.extent, trace);
        }
        #[cfg(not(feature = "debug"))]
        ht_emit_ctx!(HT201, "size={}", self.extent);

        Err(TextureError::Destroyed)
    }

    fn ensure_extent(&self, requested: Extent) -> Result<(), TextureError> {
        if requested == self.extent {
            return Ok(());
        }
        ht_emit_ctx!(HT202, "expected={} actual={}", self.extent, requested);
        Err(TextureError::SizeMismatch {
            expected: self.extent,
            actual: requested,
        })
    }
}

impl<B: NativeBackend> GpuImportable for HardwareTexture<B> {
    fn allocate_texture(&mut self, width: u32, height: u32, payload: Option<&[u8]>) -> Result<(), TextureError> {
        HardwareTexture::allocate_texture(self, width, height, payload)
    }

    fn update_from_source(&mut self, source: &SourceDescriptor) -> Result<(), TextureError> {
        HardwareTexture::update_from_source(self, source)
    }

    fn texture(&self) -> &Texture {
        &self.base
    }

    fn image_handle(&self) -> Option<ImageHandle> {
        self.image
    }

    fn is_zero_copy(&self) -> bool {
        HardwareTexture::is_zero_copy(self)
    }

    fn destroy(&mut self) {
        HardwareTexture::destroy(self)
    }
}

impl<B: NativeBackend> Drop for HardwareTexture<B> {
    fn drop(&mut self) {
        if !self.destroyed {
            self.release();
        }
    }
}

impl<B: NativeBackend> std::fmt::Debug for HardwareTexture<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HardwareTexture")
            .field("extent", &self.extent)
            .field("buffer", &self.buffer)
            .field("image", &self.image)
            .field("texture", &self.base.id())
            .field("locked", &self.locked)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{DummyBackend, DummyCapabilities, NativeCall};

    fn device() -> Arc<DummyBackend> {
        Arc::new(DummyBackend::new())
    }

    #[test]
    fn test_construction_locks_when_cpu_access() {
        let device = device();
        let texture = HardwareTexture::new(Arc::clone(&device), 64, 32);

        assert!(texture.buffer_handle().is_some());
        assert!(texture.cpu_mapping().is_some());
        assert!(texture.is_locked());
        assert_eq!(texture.row_stride(), 64);
        assert!(!texture.is_allocated());
        assert!(texture.needs_update());
    }

    #[test]
    fn test_no_cpu_access_never_maps() {
        let device = device();
        let texture = HardwareTexture::with_cpu_access(Arc::clone(&device), 64, 32, false);

        assert!(texture.buffer_handle().is_some());
        assert!(texture.cpu_mapping().is_none());
        assert!(!texture.is_locked());
        assert_eq!(device.stats().live_mappings, 0);
    }

    #[test]
    fn test_mapping_failure_is_not_fatal() {
        let device = Arc::new(DummyBackend::with_capabilities(DummyCapabilities::without_mapping()));
        let mut texture = HardwareTexture::new(Arc::clone(&device), 16, 16);

        assert!(texture.buffer_handle().is_some());
        assert!(texture.cpu_mapping().is_none());
        assert!(!texture.is_locked());

        texture.destroy();
        assert!(device.stats().is_clean());
    }

    #[test]
    fn test_allocation_failure_leaves_inert_texture() {
        let device = Arc::new(DummyBackend::with_capabilities(DummyCapabilities::without_buffers()));
        let mut texture = HardwareTexture::new(Arc::clone(&device), 16, 16);

        assert!(texture.buffer_handle().is_none());
        assert!(texture.cpu_mapping().is_none());
        assert_eq!(texture.row_stride(), 0);
        assert_eq!(device.take_calls(), vec![NativeCall::AllocateBuffer(None)]);

        texture.destroy();
        assert!(device.stats().is_clean());
    }

    #[test]
    fn test_empty_size_skips_allocator() {
        let device = device();
        let texture = HardwareTexture::new(Arc::clone(&device), 0, 16);
        assert!(texture.buffer_handle().is_none());
        assert!(device.take_calls().is_empty());
    }

    #[test]
    fn test_allocate_texture_is_idempotent() {
        let device = device();
        let mut texture = HardwareTexture::new(Arc::clone(&device), 32, 32);

        texture.allocate_texture(32, 32, None).unwrap();
        let id = texture.texture_id();
        let image = texture.image_handle();
        assert!(id.is_some());
        assert!(image.is_some());

        texture.allocate_texture(32, 32, None).unwrap();
        assert_eq!(texture.texture_id(), id);
        assert_eq!(texture.image_handle(), image);
        assert_eq!(device.stats().live_images, 1);
    }

    #[test]
    fn test_texture_created_before_import() {
        let device = device();
        let mut texture = HardwareTexture::new(Arc::clone(&device), 8, 8);
        device.take_calls();

        texture.allocate_texture(8, 8, Some(&[0u8; 4][..])).unwrap();
        let calls = device.take_calls();
        let texture_id = texture.texture_id().unwrap();
        assert_eq!(
            calls,
            vec![
                NativeCall::CreateTexture(Some(texture_id)),
                NativeCall::ImportBuffer {
                    buffer: texture.buffer_handle().unwrap(),
                    texture: texture_id,
                },
            ]
        );
    }

    #[test]
    fn test_import_failure_keeps_texture_id() {
        let device = Arc::new(DummyBackend::with_capabilities(DummyCapabilities::without_import()));
        let mut texture = HardwareTexture::new(Arc::clone(&device), 8, 8);

        texture.allocate_texture(8, 8, None).unwrap();
        assert!(texture.is_allocated());
        assert!(texture.image_handle().is_none());
        assert!(!texture.is_zero_copy());
    }

    #[test]
    fn test_texture_failure_skips_import() {
        let device = Arc::new(DummyBackend::with_capabilities(DummyCapabilities::without_textures()));
        let mut texture = HardwareTexture::new(Arc::clone(&device), 8, 8);

        texture.allocate_texture(8, 8, None).unwrap();
        assert!(!texture.is_allocated());
        assert!(texture.image_handle().is_none());
    }

    #[test]
    fn test_size_mismatch_is_an_error() {
        let device = device();
        let mut texture = HardwareTexture::new(Arc::clone(&device), 8, 8);

        let err = texture.allocate_texture(16, 8, None).unwrap_err();
        assert_eq!(
            err,
            TextureError::SizeMismatch {
                expected: Extent::new(8, 8),
                actual: Extent::new(16, 8),
            }
        );
        assert!(!texture.is_allocated());

        let source = SourceDescriptor::new(8, 4, true);
        assert!(texture.update_from_source(&source).is_err());
        assert!(texture.needs_update());
    }

    #[test]
    fn test_update_from_source_allocates_lazily() {
        let device = device();
        let mut texture = HardwareTexture::new(Arc::clone(&device), 8, 8);

        texture.update_from_source(&SourceDescriptor::new(8, 8, true)).unwrap();
        assert!(texture.is_allocated());
        assert!(!texture.needs_update());
        let image = texture.image_handle();

        texture.mark_dirty();
        assert!(texture.needs_update());
        texture.update_from_source(&SourceDescriptor::new(8, 8, true)).unwrap();
        assert!(!texture.needs_update());
        assert_eq!(texture.image_handle(), image);
        assert_eq!(device.stats().live_images, 1);
    }

    #[test]
    fn test_destroy_releases_in_order() {
        let device = device();
        let mut texture = HardwareTexture::new(Arc::clone(&device), 8, 8);
        texture.allocate_texture(8, 8, None).unwrap();
        let buffer = texture.buffer_handle().unwrap();
        let image = texture.image_handle().unwrap();
        let texture_id = texture.texture_id().unwrap();
        device.take_calls();

        texture.destroy();
        assert_eq!(
            device.take_calls(),
            vec![
                NativeCall::ReleaseImage(image),
                NativeCall::ReleaseBuffer { buffer, was_locked: true },
                NativeCall::DeleteTexture(texture_id),
            ]
        );
        assert!(texture.buffer_handle().is_none());
        assert!(texture.image_handle().is_none());
        assert!(texture.texture_id().is_none());
        assert!(texture.cpu_mapping().is_none());
        assert!(!texture.is_locked());
        assert!(device.stats().is_clean());
    }

    #[test]
    fn test_double_destroy_is_noop() {
        let device = device();
        let mut texture = HardwareTexture::new(Arc::clone(&device), 8, 8);
        texture.allocate_texture(8, 8, None).unwrap();

        texture.destroy();
        device.take_calls();
        texture.destroy();
        assert!(device.take_calls().is_empty());
        assert!(device.stats().is_clean());
    }

    #[test]
    fn test_use_after_destroy_is_rejected() {
        let device = device();
        let mut texture = HardwareTexture::new(Arc::clone(&device), 8, 8);
        texture.destroy();

        assert_eq!(texture.allocate_texture(8, 8, None), Err(TextureError::Destroyed));
        assert_eq!(
            texture.update_from_source(&SourceDescriptor::new(8, 8, false)),
            Err(TextureError::Destroyed)
        );
        assert!(!texture.is_allocated());
        assert_eq!(device.stats().live_textures, 0);
    }

    #[test]
    fn test_drop_releases_everything() {
        let device = device();
        {
            let mut texture = HardwareTexture::new(Arc::clone(&device), 8, 8);
            texture.allocate_texture(8, 8, None).unwrap();
            assert_eq!(device.stats().live_images, 1);
        }
        assert!(device.stats().is_clean());
    }

    #[test]
    fn test_pixels_are_visible_to_gpu() {
        let device = device();
        let mut texture = HardwareTexture::new(Arc::clone(&device), 8, 8);
        texture.allocate_texture(8, 8, None).unwrap();

        let pixels = texture.pixels_mut().unwrap();
        pixels[..4].copy_from_slice(&[1, 2, 3, 4]);

        let image = texture.image_handle().unwrap();
        assert_eq!(&device.sample_image(image).unwrap()[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_pixels_end_with_the_owning_texture() {
        let device = device();
        let mut texture = HardwareTexture::new(Arc::clone(&device), 8, 8);
        let buffer = texture.buffer_handle().unwrap();
        assert!(texture.pixels_mut().is_some());

        texture.destroy();
        assert!(texture.pixels_mut().is_none());
        assert!(texture.cpu_mapping().is_none());

        let releases: Vec<_> = device
            .take_calls()
            .into_iter()
            .filter(|c| matches!(c, NativeCall::ReleaseBuffer { .. }))
            .collect();
        assert_eq!(releases, vec![NativeCall::ReleaseBuffer { buffer, was_locked: true }]);

        drop(texture);
        assert!(device.take_calls().is_empty());
        assert!(device.stats().is_clean());
    }

    #[test]
    fn test_zero_copy_through_trait_object() {
        let capable = device();
        let fallback = Arc::new(DummyBackend::with_capabilities(DummyCapabilities::without_import()));
        let mut textures: Vec<Box<dyn GpuImportable>> = vec![
            Box::new(HardwareTexture::new(Arc::clone(&capable), 8, 8)),
            Box::new(HardwareTexture::new(Arc::clone(&fallback), 8, 8)),
        ];
        for texture in &mut textures {
            texture.allocate_texture(8, 8, None).unwrap();
        }

        assert!(textures[0].is_zero_copy());
        assert!(!textures[1].is_zero_copy());
        assert!(textures[1].texture_id().is_some());

        textures[0].destroy();
        assert!(!textures[0].is_zero_copy());
    }
}
