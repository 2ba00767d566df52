//! # hwtexture
//!
//! Hardware-buffer-backed GPU textures: a CPU-writable pixel surface the GPU
//! samples directly, without an upload copy.
//!
//! ## Features
//!
//! - One object owns the hardware buffer, its CPU mapping and the GPU image
//!   imported from it, and releases them in dependency order
//! - Native failures never panic: missing resources show up as `None` handles
//! - Lazy GPU import on first allocation or update
//! - Capability probe deciding up front whether the zero-copy path works
//! - Coded diagnostics with an optional strict mode for CI
//! - In-memory dummy device for tests, AHardwareBuffer/EGL backend on Android
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use hwtexture::{DummyBackend, HardwareTexture, SourceDescriptor};
//!
//! let device = Arc::new(DummyBackend::new());
//! let mut texture = HardwareTexture::new(device, 256, 256);
//!
//! // Producer writes pixels straight into the buffer
//! if let Some(pixels) = texture.pixels_mut() {
//!     pixels[..4].copy_from_slice(&[0x00, 0x00, 0xff, 0xff]);
//! }
//!
//! // Render thread: import on first use, no copy afterwards
//! texture.update_from_source(&SourceDescriptor::new(256, 256, true)).unwrap();
//! assert!(texture.is_zero_copy());
//!
//! texture.destroy();
//! ```

pub mod api;
pub mod capability;
pub mod diagnostics;
pub mod native;
pub mod texture;

mod sync;
mod util;

// Re-export public API at crate root for convenience
pub use api::config::TextureConfig;
pub use api::error::TextureError;

pub use texture::{GpuImportable, HardwareTexture, SourceDescriptor, Texture};

pub use capability::{
    check_is_supported, is_supported, probe, support_state, ProbeReport, SupportState,
    ZeroCopySupport,
};

pub use native::{
    BufferHandle, BufferLayout, Extent, Filter, HardwareBufferBackend, ImageHandle, MappedRegion,
    NativeBackend, PixelFormat, TextureBackend, TextureDesc, TextureId,
};
pub use native::{DummyBackend, DummyCapabilities, DummyStats, NativeCall};

#[cfg(all(feature = "android", target_os = "android"))]
pub use native::AndroidBackend;

// Diagnostics
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use diagnostics::{set_strict_mode, StrictMode, StrictModeGuard};
pub use diagnostics::{HT001, HT002, HT101, HT102, HT201, HT202, HT203, HT301};
