//! Native collaborator seam
//!
//! The texture state machine talks to the platform only through the traits in
//! [`traits`]. Backends:
//! - `dummy`: in-memory device for tests and headless use (always available)
//! - `android`: AHardwareBuffer + EGLImage + GLES (enable `android` feature)

// Always present for API stability: traits define the interface
pub mod traits;
pub use traits::{
    AllocatedBuffer, BufferHandle, BufferLayout, Extent, Filter, HardwareBufferBackend,
    ImageHandle, MappedRegion, NativeBackend, PixelFormat, TextureBackend, TextureDesc, TextureId,
};

// Dummy device for testing (always available)
pub mod dummy;
pub use dummy::{DummyBackend, DummyCapabilities, DummyStats, NativeCall};

// Platform backends are conditionally compiled
#[cfg(all(feature = "android", target_os = "android"))]
pub mod android;

#[cfg(all(feature = "android", target_os = "android"))]
pub use android::AndroidBackend;
