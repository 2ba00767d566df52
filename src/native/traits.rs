//! Native collaborator traits and handle types
//!
//! This module defines the seam between the texture state machine and the
//! platform subsystems it coordinates (buffer allocator, CPU mapping, GPU
//! driver) WITHOUT pulling in any backend-specific dependencies.
//!
//! Native layers report failure with a zero handle or a null pointer. Here the
//! sentinel is `None`: every handle is a non-zero newtype, so a live handle
//! can never be confused with "no resource".

use std::fmt;
use std::num::{NonZeroU32, NonZeroU64};
use std::ptr::NonNull;

/// Opaque identifier of a native hardware buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(NonZeroU64);

impl BufferHandle {
    /// Wrap a raw native value. Returns `None` for the zero sentinel.
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Get the raw native value.
    pub const fn raw(self) -> u64 {
        self.0.get()
    }
}

/// Opaque identifier of a GPU-side image imported from a hardware buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(NonZeroU64);

impl ImageHandle {
    /// Wrap a raw native value. Returns `None` for the zero sentinel.
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Get the raw native value.
    pub const fn raw(self) -> u64 {
        self.0.get()
    }
}

/// GPU texture object name (e.g. a GL texture id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(NonZeroU32);

impl TextureId {
    /// Wrap a raw texture name. Returns `None` for the zero sentinel.
    pub const fn new(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Get the raw texture name.
    pub const fn raw(self) -> u32 {
        self.0.get()
    }
}

/// Size of an image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    /// Create a new extent.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if either dimension is zero.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered.
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel layout of the hardware buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// 8-bit BGRA, matching X11 drawables byte for byte
    #[default]
    Bgra8888,
    /// 8-bit RGBA, the platform default
    Rgba8888,
}

impl PixelFormat {
    /// Select BGRA8888 when `use_bgra` is set, the platform default otherwise.
    pub const fn from_bgra(use_bgra: bool) -> Self {
        if use_bgra {
            PixelFormat::Bgra8888
        } else {
            PixelFormat::Rgba8888
        }
    }

    /// Bytes per pixel.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Bgra8888 | PixelFormat::Rgba8888 => 4,
        }
    }
}

/// Sampling filter for the GPU texture object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    /// Bilinear filtering
    #[default]
    Linear,
    /// Point sampling
    Nearest,
}

/// Descriptive addressing of a hardware buffer, reported by the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferLayout {
    /// Platform handle backing the buffer (e.g. a dma-buf fd), 0 if unknown
    pub native_handle: i32,
    /// Distance between rows, in pixels
    pub row_stride: u32,
}

/// A freshly allocated hardware buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatedBuffer {
    pub handle: BufferHandle,
    pub layout: BufferLayout,
}

/// Parameters for creating a GPU texture object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    pub extent: Extent,
    pub format: PixelFormat,
    pub filter: Filter,
}

/// CPU-visible view over the pixel storage of a locked hardware buffer.
///
/// The region is borrowed from the allocator. It stays valid until the buffer
/// is released with `was_locked = true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedRegion {
    ptr: NonNull<u8>,
    len: usize,
}

impl MappedRegion {
    /// Create a region from a mapped address. Returns `None` for a null address.
    ///
    /// # Safety
    ///
    /// `ptr` must point to `len` writable bytes that stay valid until the
    /// owning buffer is released.
    pub unsafe fn from_raw(ptr: *mut u8, len: usize) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr, len })
    }

    /// Mapped base address.
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Length of the mapping in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the mapping covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

// The region is a plain address range. Producer threads may write through it;
// ordering against GPU reads is the caller's responsibility.
unsafe impl Send for MappedRegion {}
unsafe impl Sync for MappedRegion {}

/// Hardware buffer allocator, CPU mapping and GPU import.
///
/// Every failure is reported as `None`. Implementations must never panic on a
/// native failure.
pub trait HardwareBufferBackend: Send + Sync {
    /// Allocate a buffer usable as a sampled GPU image, optionally CPU-mappable.
    fn allocate_buffer(
        &self,
        extent: Extent,
        cpu_access: bool,
        format: PixelFormat,
    ) -> Option<AllocatedBuffer>;

    /// Map the buffer for CPU reads and writes.
    fn map_buffer(&self, buffer: BufferHandle) -> Option<MappedRegion>;

    /// Import the buffer as a GPU image bound to an existing texture object.
    fn import_buffer(&self, buffer: BufferHandle, texture: TextureId) -> Option<ImageHandle>;

    /// Release a GPU image import.
    ///
    /// # Safety
    ///
    /// `image` must not be released twice, and no texture that still samples
    /// it may be used afterwards. Normally only the owning texture's destroy
    /// path calls this.
    unsafe fn release_image(&self, image: ImageHandle);

    /// Release a buffer. When `was_locked` is set the mapping is dropped first.
    ///
    /// # Safety
    ///
    /// Every [`MappedRegion`] obtained for `buffer` dangles afterwards. The
    /// caller must own the buffer and guarantee no mapping of it is read or
    /// written again, which is why safe code cannot free a buffer behind the
    /// texture that owns it:
    ///
    /// ```compile_fail,E0133
    /// use std::sync::Arc;
    /// use hwtexture::{DummyBackend, HardwareBufferBackend, HardwareTexture};
    ///
    /// let device = Arc::new(DummyBackend::new());
    /// let texture = HardwareTexture::new(Arc::clone(&device), 8, 8);
    /// device.release_buffer(texture.buffer_handle().unwrap(), true);
    /// ```
    unsafe fn release_buffer(&self, buffer: BufferHandle, was_locked: bool);
}

/// GPU texture object management for the base texture path.
pub trait TextureBackend: Send + Sync {
    /// Create and bind a texture object.
    fn create_texture(&self, desc: &TextureDesc) -> Option<TextureId>;

    /// Delete a texture object.
    fn delete_texture(&self, texture: TextureId);
}

/// A device able to back hardware textures.
pub trait NativeBackend: HardwareBufferBackend + TextureBackend {}

impl<T: HardwareBufferBackend + TextureBackend> NativeBackend for T {}
