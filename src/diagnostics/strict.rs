//! Strict mode: which diagnostics abort the process.
//!
//! Native failures (HT0xx, HT1xx) are already recovered from by the texture
//! and are never fatal. Strict mode only escalates lifecycle misuse:
//! - `Warn`: report everything, never panic
//! - `PanicOnError`: panic on misuse errors (use after destroy, size mismatch)
//! - `PanicOnWarning`: also panic on misuse warnings (repeated destroy)

use std::sync::atomic::{AtomicU8, Ordering};

use super::kind::{Diagnostic, DiagnosticKind};

/// Strict mode behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum StrictMode {
    #[default]
    Warn = 0,
    PanicOnError = 1,
    PanicOnWarning = 2,
}

impl From<u8> for StrictMode {
    fn from(val: u8) -> Self {
        match val {
            1 => StrictMode::PanicOnError,
            2 => StrictMode::PanicOnWarning,
            _ => StrictMode::Warn,
        }
    }
}

impl StrictMode {
    /// Parse a mode name as accepted by `HWTEXTURE_STRICT`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "1" | "error" | "true" => StrictMode::PanicOnError,
            "2" | "warning" | "all" => StrictMode::PanicOnWarning,
            _ => StrictMode::Warn,
        }
    }

    /// True if emitting `diag` under this mode must panic.
    pub fn is_fatal(self, diag: &Diagnostic) -> bool {
        if diag.recoverable {
            return false;
        }
        match diag.kind {
            DiagnosticKind::Error => self != StrictMode::Warn,
            DiagnosticKind::Warning => self == StrictMode::PanicOnWarning,
            DiagnosticKind::Note => false,
        }
    }
}

static STRICT_MODE: AtomicU8 = AtomicU8::new(StrictMode::Warn as u8);

/// Set the process-wide strict mode.
pub fn set_strict_mode(mode: StrictMode) {
    STRICT_MODE.store(mode as u8, Ordering::Relaxed);
}

/// Current process-wide strict mode.
pub fn strict_mode() -> StrictMode {
    StrictMode::from(STRICT_MODE.load(Ordering::Relaxed))
}

/// Sets strict mode for a scope and restores the previous mode on drop.
///
/// ```rust
/// use hwtexture::{StrictMode, StrictModeGuard};
///
/// {
///     let _guard = StrictModeGuard::panic_on_error();
///     assert_eq!(hwtexture::diagnostics::strict_mode(), StrictMode::PanicOnError);
/// }
/// assert_eq!(hwtexture::diagnostics::strict_mode(), StrictMode::Warn);
/// ```
pub struct StrictModeGuard {
    previous: StrictMode,
}

impl StrictModeGuard {
    pub fn new(mode: StrictMode) -> Self {
        let previous = strict_mode();
        set_strict_mode(mode);
        Self { previous }
    }

    pub fn panic_on_error() -> Self {
        Self::new(StrictMode::PanicOnError)
    }
}

impl Drop for StrictModeGuard {
    fn drop(&mut self) {
        set_strict_mode(self.previous);
    }
}

/// Read strict mode from `HWTEXTURE_STRICT`, if set.
///
/// Accepts "0"/"warn", "1"/"error", "2"/"warning". Anything else means warn.
pub fn init_from_env() {
    if let Ok(val) = std::env::var("HWTEXTURE_STRICT") {
        set_strict_mode(StrictMode::parse(&val));
    }
}
