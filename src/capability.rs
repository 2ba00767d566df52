//! Zero-copy capability detection.
//!
//! Whether hardware textures work is a property of the device, not of a single
//! texture. [`check_is_supported`] builds an 8x8 probe texture, forces the GPU
//! import, and records whether buffer, image and CPU mapping all came up. The
//! probe texture is always destroyed.
//!
//! The result is published once to process-wide state ([`is_supported`]) and
//! is also returned as a [`ZeroCopySupport`] value so renderer setup can
//! thread it to consumers explicitly.
//!
//! ```rust
//! use std::sync::Arc;
//! use hwtexture::{capability, DummyBackend};
//!
//! let device = Arc::new(DummyBackend::new());
//! let support = capability::ZeroCopySupport::detect(&device);
//! assert!(support.is_available());
//! assert!(capability::is_supported());
//! ```

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::native::{Extent, NativeBackend};
use crate::texture::HardwareTexture;
use crate::ht_emit_ctx;

/// Size of the probe texture.
pub const PROBE_EXTENT: Extent = Extent::new(8, 8);

/// Which resources the probe texture obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbeReport {
    /// A hardware buffer was allocated
    pub buffer: bool,
    /// The buffer was imported as a GPU image
    pub image: bool,
    /// The buffer was mapped for the CPU
    pub mapping: bool,
}

impl ProbeReport {
    /// True only if all three resources were obtained at once.
    pub fn is_supported(&self) -> bool {
        self.buffer && self.image && self.mapping
    }
}

/// Process-wide support state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SupportState {
    /// No probe has run yet.
    Unknown = 0,
    /// The last probe obtained buffer, image and mapping.
    Supported = 1,
    /// The last probe was missing at least one resource.
    Unsupported = 2,
}

impl From<u8> for SupportState {
    fn from(val: u8) -> Self {
        match val {
            1 => SupportState::Supported,
            2 => SupportState::Unsupported,
            _ => SupportState::Unknown,
        }
    }
}

static SUPPORT_STATE: AtomicU8 = AtomicU8::new(SupportState::Unknown as u8);

/// Run the probe without publishing the result.
pub fn probe<B: NativeBackend>(backend: &Arc<B>) -> ProbeReport {
    let mut texture = HardwareTexture::new(Arc::clone(backend), PROBE_EXTENT.width, PROBE_EXTENT.height);
    if let Err(err) = texture.allocate_texture(PROBE_EXTENT.width, PROBE_EXTENT.height, None) {
        log::warn!("capability probe could not allocate: {}", err);
    }

    let report = ProbeReport {
        buffer: texture.buffer_handle().is_some(),
        image: texture.image_handle().is_some(),
        mapping: texture.cpu_mapping().is_some(),
    };
    texture.destroy();

    log::debug!("capability probe: {:?}", report);
    report
}

/// Run the probe and publish the result process-wide.
///
/// Re-runnable: each call overwrites the previous result.
pub fn check_is_supported<B: NativeBackend>(backend: &Arc<B>) -> ProbeReport {
    let report = probe(backend);
    let state = if report.is_supported() {
        SupportState::Supported
    } else {
        ht_emit_ctx!(
            HT301,
            "buffer={} image={} mapping={}",
            report.buffer,
            report.image,
            report.mapping
        );
        SupportState::Unsupported
    };
    SUPPORT_STATE.store(state as u8, Ordering::Release);
    report
}

/// True if the last published probe succeeded. False before any probe ran.
pub fn is_supported() -> bool {
    support_state() == SupportState::Supported
}

/// Current process-wide support state.
pub fn support_state() -> SupportState {
    SupportState::from(SUPPORT_STATE.load(Ordering::Acquire))
}

/// Forget the published result (for testing).
pub fn reset_support_state() {
    SUPPORT_STATE.store(SupportState::Unknown as u8, Ordering::Release);
}

/// Result of capability detection, passed to whoever picks a texture path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroCopySupport {
    report: ProbeReport,
}

impl ZeroCopySupport {
    /// Probe `backend`, publish the result, and return it.
    pub fn detect<B: NativeBackend>(backend: &Arc<B>) -> Self {
        Self::from_report(check_is_supported(backend))
    }

    /// Wrap an existing probe report.
    pub fn from_report(report: ProbeReport) -> Self {
        Self { report }
    }

    /// True if hardware textures can be used.
    pub fn is_available(&self) -> bool {
        self.report.is_supported()
    }

    pub fn report(&self) -> ProbeReport {
        self.report
    }
}
