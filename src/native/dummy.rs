//! Dummy device implementation for testing
//!
//! Buffers are plain RAM, images and texture objects are bookkeeping entries.
//! The device checks the same ordering rules a real driver depends on and
//! counts every violation instead of crashing, so tests can assert on them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crossbeam_queue::SegQueue;

use super::traits::*;
use crate::sync::atomics::{AtomicCounter, AtomicGauge};
use crate::sync::mutex::Mutex;
use crate::util::layout::{buffer_len, row_stride, DEFAULT_ROW_ALIGN};

/// Which subsystems of the dummy device work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DummyCapabilities {
    /// Buffer allocation succeeds
    pub buffers: bool,
    /// CPU mapping succeeds
    pub mapping: bool,
    /// GPU import succeeds
    pub import: bool,
    /// Texture object creation succeeds
    pub textures: bool,
    /// Largest width or height the allocator accepts
    pub max_dimension: u32,
}

impl Default for DummyCapabilities {
    fn default() -> Self {
        Self {
            buffers: true,
            mapping: true,
            import: true,
            textures: true,
            max_dimension: 4096,
        }
    }
}

impl DummyCapabilities {
    /// A device without a hardware buffer allocator.
    pub fn without_buffers() -> Self {
        Self { buffers: false, ..Self::default() }
    }

    /// A device whose buffers cannot be CPU-mapped.
    pub fn without_mapping() -> Self {
        Self { mapping: false, ..Self::default() }
    }

    /// A device whose GPU cannot import hardware buffers.
    pub fn without_import() -> Self {
        Self { import: false, ..Self::default() }
    }

    /// A device with no current GPU context.
    pub fn without_textures() -> Self {
        Self { textures: false, ..Self::default() }
    }
}

/// A native call as observed by the dummy device, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeCall {
    AllocateBuffer(Option<BufferHandle>),
    MapBuffer(BufferHandle),
    ImportBuffer { buffer: BufferHandle, texture: TextureId },
    ReleaseImage(ImageHandle),
    ReleaseBuffer { buffer: BufferHandle, was_locked: bool },
    CreateTexture(Option<TextureId>),
    DeleteTexture(TextureId),
}

/// Live-resource statistics of the dummy device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DummyStats {
    /// Buffers allocated and not yet released
    pub live_buffers: usize,
    /// Buffers currently CPU-mapped
    pub live_mappings: usize,
    /// GPU images not yet released
    pub live_images: usize,
    /// Texture objects not yet deleted
    pub live_textures: usize,
    /// Bytes held by live buffers
    pub allocated_bytes: usize,
    /// Peak bytes held
    pub peak_bytes: usize,
    /// Protocol violations observed (double release, wrong lock flag, bad ordering)
    pub violations: u64,
}

impl DummyStats {
    /// True when nothing is leaked and no rule was broken.
    pub fn is_clean(&self) -> bool {
        self.live_buffers == 0
            && self.live_mappings == 0
            && self.live_images == 0
            && self.live_textures == 0
            && self.violations == 0
    }
}

struct DummyBuffer {
    storage: Box<[u8]>,
    mapped: bool,
}

struct DummyImage {
    buffer: BufferHandle,
    texture: TextureId,
}

#[derive(Default)]
struct DeviceState {
    buffers: HashMap<BufferHandle, DummyBuffer>,
    images: HashMap<ImageHandle, DummyImage>,
    textures: HashMap<TextureId, TextureDesc>,
}

/// Dummy device for testing
pub struct DummyBackend {
    capabilities: DummyCapabilities,
    state: Mutex<DeviceState>,
    next_handle: AtomicU64,
    next_texture: AtomicU32,
    calls: SegQueue<NativeCall>,
    violations: AtomicCounter,
    allocated_bytes: AtomicGauge,
    peak_bytes: AtomicGauge,
}

impl DummyBackend {
    /// Create a fully capable dummy device.
    pub fn new() -> Self {
        Self::with_capabilities(DummyCapabilities::default())
    }

    /// Create a dummy device with limited support.
    pub fn with_capabilities(capabilities: DummyCapabilities) -> Self {
        Self {
            capabilities,
            state: Mutex::new(DeviceState::default()),
            next_handle: AtomicU64::new(1),
            next_texture: AtomicU32::new(1),
            calls: SegQueue::new(),
            violations: AtomicCounter::new(0),
            allocated_bytes: AtomicGauge::new(0),
            peak_bytes: AtomicGauge::new(0),
        }
    }

    /// Capabilities this device was created with.
    pub fn capabilities(&self) -> DummyCapabilities {
        self.capabilities
    }

    /// Current statistics.
    pub fn stats(&self) -> DummyStats {
        let state = self.state.lock();
        DummyStats {
            live_buffers: state.buffers.len(),
            live_mappings: state.buffers.values().filter(|b| b.mapped).count(),
            live_images: state.images.len(),
            live_textures: state.textures.len(),
            allocated_bytes: self.allocated_bytes.get(),
            peak_bytes: self.peak_bytes.get(),
            violations: self.violations.get(),
        }
    }

    /// Drain the native calls recorded so far.
    pub fn take_calls(&self) -> Vec<NativeCall> {
        std::iter::from_fn(|| self.calls.pop()).collect()
    }

    /// Read the pixels the GPU would sample through an imported image.
    pub fn sample_image(&self, image: ImageHandle) -> Option<Vec<u8>> {
        let state = self.state.lock();
        let bound = state.images.get(&image)?;
        state.textures.get(&bound.texture)?;
        state.buffers.get(&bound.buffer).map(|b| b.storage.to_vec())
    }

    /// Texture object bound to an imported image.
    pub fn image_texture(&self, image: ImageHandle) -> Option<TextureId> {
        self.state.lock().images.get(&image).map(|i| i.texture)
    }

    fn next_raw_handle(&self) -> u64 {
        self.next_handle.fetch_add(1, Ordering::Relaxed)
    }

    fn violation(&self, what: &str) {
        let total = self.violations.increment();
        log::warn!("dummy device: protocol violation #{}: {}", total, what);
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareBufferBackend for DummyBackend {
    fn allocate_buffer(
        &self,
        extent: Extent,
        _cpu_access: bool,
        format: PixelFormat,
    ) -> Option<AllocatedBuffer> {
        let max = self.capabilities.max_dimension;
        let fits = !extent.is_empty() && extent.width <= max && extent.height <= max;

        let allocated = if self.capabilities.buffers && fits {
            let stride = row_stride(extent.width, DEFAULT_ROW_ALIGN);
            let len = buffer_len(stride, extent.height, format.bytes_per_pixel());
            let handle = BufferHandle::new(self.next_raw_handle())?;

            self.state.lock().buffers.insert(
                handle,
                DummyBuffer {
                    storage: vec![0u8; len].into_boxed_slice(),
                    mapped: false,
                },
            );
            let total = self.allocated_bytes.add(len);
            self.peak_bytes.update_max(total);

            Some(AllocatedBuffer {
                handle,
                layout: BufferLayout {
                    native_handle: (handle.raw() & 0x7fff_ffff) as i32,
                    row_stride: stride,
                },
            })
        } else {
            None
        };

        self.calls.push(NativeCall::AllocateBuffer(allocated.map(|b| b.handle)));
        allocated
    }

    fn map_buffer(&self, buffer: BufferHandle) -> Option<MappedRegion> {
        self.calls.push(NativeCall::MapBuffer(buffer));
        if !self.capabilities.mapping {
            return None;
        }

        let mut state = self.state.lock();
        let mapped = match state.buffers.get_mut(&buffer) {
            Some(entry) if !entry.mapped => {
                entry.mapped = true;
                // The boxed storage never moves while the buffer is live.
                Ok(unsafe { MappedRegion::from_raw(entry.storage.as_mut_ptr(), entry.storage.len()) })
            }
            Some(_) => Err("buffer mapped twice"),
            None => Err("map of unknown buffer"),
        };
        drop(state);

        mapped.unwrap_or_else(|what| {
            self.violation(what);
            None
        })
    }

    fn import_buffer(&self, buffer: BufferHandle, texture: TextureId) -> Option<ImageHandle> {
        self.calls.push(NativeCall::ImportBuffer { buffer, texture });
        if !self.capabilities.import {
            return None;
        }

        let mut state = self.state.lock();
        if !state.buffers.contains_key(&buffer) || !state.textures.contains_key(&texture) {
            drop(state);
            self.violation("import against unknown buffer or texture");
            return None;
        }
        let image = ImageHandle::new(self.next_raw_handle())?;
        state.images.insert(image, DummyImage { buffer, texture });
        Some(image)
    }

    unsafe fn release_image(&self, image: ImageHandle) {
        self.calls.push(NativeCall::ReleaseImage(image));
        if self.state.lock().images.remove(&image).is_none() {
            self.violation("release of unknown image");
        }
    }

    unsafe fn release_buffer(&self, buffer: BufferHandle, was_locked: bool) {
        self.calls.push(NativeCall::ReleaseBuffer { buffer, was_locked });

        let mut state = self.state.lock();
        let still_imported = state.images.values().any(|i| i.buffer == buffer);
        let removed = state.buffers.remove(&buffer);
        drop(state);

        if still_imported {
            self.violation("buffer released while a GPU image still references it");
        }
        match removed {
            Some(entry) => {
                if entry.mapped != was_locked {
                    self.violation("release lock flag does not match mapping state");
                }
                self.allocated_bytes.sub(entry.storage.len());
            }
            None => self.violation("release of unknown buffer"),
        }
    }
}

impl TextureBackend for DummyBackend {
    fn create_texture(&self, desc: &TextureDesc) -> Option<TextureId> {
        let texture = if self.capabilities.textures {
            TextureId::new(self.next_texture.fetch_add(1, Ordering::Relaxed))
        } else {
            None
        };
        if let Some(id) = texture {
            self.state.lock().textures.insert(id, *desc);
        }
        self.calls.push(NativeCall::CreateTexture(texture));
        texture
    }

    fn delete_texture(&self, texture: TextureId) {
        self.calls.push(NativeCall::DeleteTexture(texture));

        let mut state = self.state.lock();
        let still_imported = state.images.values().any(|i| i.texture == texture);
        let removed = state.textures.remove(&texture);
        drop(state);

        if still_imported {
            self.violation("texture deleted while a GPU image is bound to it");
        }
        if removed.is_none() {
            self.violation("delete of unknown texture");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(extent: Extent) -> TextureDesc {
        TextureDesc {
            extent,
            format: PixelFormat::Bgra8888,
            filter: Filter::Linear,
        }
    }

    #[test]
    fn test_allocate_and_release() {
        let device = DummyBackend::new();
        let buffer = device
            .allocate_buffer(Extent::new(8, 8), false, PixelFormat::Bgra8888)
            .unwrap();
        assert_eq!(buffer.layout.row_stride, 16);
        assert_eq!(device.stats().allocated_bytes, 16 * 8 * 4);

        unsafe { device.release_buffer(buffer.handle, false) };
        assert!(device.stats().is_clean());
    }

    #[test]
    fn test_rejects_oversized_buffers() {
        let device = DummyBackend::new();
        assert!(device
            .allocate_buffer(Extent::new(8192, 8), true, PixelFormat::Rgba8888)
            .is_none());
        assert_eq!(device.take_calls(), vec![NativeCall::AllocateBuffer(None)]);
    }

    #[test]
    fn test_import_requires_existing_texture() {
        let device = DummyBackend::new();
        let buffer = device
            .allocate_buffer(Extent::new(8, 8), true, PixelFormat::Bgra8888)
            .unwrap();
        let bogus = TextureId::new(99).unwrap();

        assert!(device.import_buffer(buffer.handle, bogus).is_none());
        assert_eq!(device.stats().violations, 1);
    }

    #[test]
    fn test_wrong_lock_flag_is_a_violation() {
        let device = DummyBackend::new();
        let buffer = device
            .allocate_buffer(Extent::new(8, 8), true, PixelFormat::Bgra8888)
            .unwrap();
        assert!(device.map_buffer(buffer.handle).is_some());

        unsafe { device.release_buffer(buffer.handle, false) };
        assert_eq!(device.stats().violations, 1);
    }

    #[test]
    fn test_sample_sees_cpu_writes() {
        let device = DummyBackend::new();
        let buffer = device
            .allocate_buffer(Extent::new(8, 8), true, PixelFormat::Bgra8888)
            .unwrap();
        let region = device.map_buffer(buffer.handle).unwrap();
        let texture = device.create_texture(&desc(Extent::new(8, 8))).unwrap();
        let image = device.import_buffer(buffer.handle, texture).unwrap();

        unsafe { region.as_ptr().write(0xAB) };
        assert_eq!(device.sample_image(image).unwrap()[0], 0xAB);
        assert_eq!(device.image_texture(image), Some(texture));

        unsafe {
            device.release_image(image);
            device.release_buffer(buffer.handle, true);
        }
        device.delete_texture(texture);
        assert!(device.stats().is_clean());
    }

    #[test]
    fn test_limited_devices() {
        let device = DummyBackend::with_capabilities(DummyCapabilities::without_textures());
        assert!(device.create_texture(&desc(Extent::new(4, 4))).is_none());

        let device = DummyBackend::with_capabilities(DummyCapabilities::without_buffers());
        assert!(device
            .allocate_buffer(Extent::new(4, 4), true, PixelFormat::Bgra8888)
            .is_none());
    }
}
