//! Diagnostic kinds and core types.
//!
//! Mirrors rustc's diagnostic levels for familiar UX.

/// The severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A hard error - the caller misused the texture.
    Error,
    /// A warning - a native resource could not be obtained.
    Warning,
    /// Informational context.
    Note,
}

impl DiagnosticKind {
    /// Get the display prefix for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Warning => "warning",
            DiagnosticKind::Note => "note",
        }
    }
}

/// A diagnostic message with code, message, and optional context.
///
/// Diagnostic codes follow the pattern:
/// - `HT0xx` - Buffer allocation and CPU mapping
/// - `HT1xx` - GPU texture creation and import
/// - `HT2xx` - Misuse of the texture lifecycle
/// - `HT3xx` - Capability detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level.
    pub kind: DiagnosticKind,
    /// Diagnostic code (e.g., "HT001").
    pub code: &'static str,
    /// Primary message.
    pub message: &'static str,
    /// Optional additional context.
    pub note: Option<&'static str>,
    /// Optional fix suggestion.
    pub help: Option<&'static str>,
    /// Native failures the texture already recovers from. Never fatal, even
    /// under strict mode.
    pub recoverable: bool,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub const fn error(code: &'static str, message: &'static str) -> Self {
        Self {
            kind: DiagnosticKind::Error,
            code,
            message,
            note: None,
            help: None,
            recoverable: false,
        }
    }

    /// Create a new warning diagnostic.
    pub const fn warning(code: &'static str, message: &'static str) -> Self {
        Self {
            kind: DiagnosticKind::Warning,
            code,
            message,
            note: None,
            help: None,
            recoverable: false,
        }
    }

    /// Create a new note diagnostic.
    pub const fn note(code: &'static str, message: &'static str) -> Self {
        Self {
            kind: DiagnosticKind::Note,
            code,
            message,
            note: None,
            help: None,
            recoverable: false,
        }
    }

    /// Add a note to this diagnostic.
    pub const fn with_note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }

    /// Add a help message to this diagnostic.
    pub const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    /// Mark as a recovered native failure.
    pub const fn recoverable(mut self) -> Self {
        self.recoverable = true;
        self
    }
}

// =============================================================================
// Predefined diagnostics (HT0xx - Buffer allocation)
// =============================================================================

/// HT001: Hardware buffer allocation failed.
pub const HT001: Diagnostic = Diagnostic::warning(
    "HT001",
    "hardware buffer allocation failed"
).with_note("the texture stays unallocated and reports no buffer handle")
 .with_help("check the requested size against platform buffer limits, or use the upload path")
 .recoverable();

/// HT002: CPU mapping failed.
pub const HT002: Diagnostic = Diagnostic::warning(
    "HT002",
    "hardware buffer could not be mapped for CPU access"
).with_note("the buffer is kept but has no CPU mapping")
 .with_help("write pixels through the GPU, or construct without cpu_access")
 .recoverable();

// =============================================================================
// Predefined diagnostics (HT1xx - GPU import)
// =============================================================================

/// HT101: Base texture creation failed.
pub const HT101: Diagnostic = Diagnostic::warning(
    "HT101",
    "GPU texture object could not be created"
).with_note("no GPU context may be current on this thread")
 .with_help("allocate textures on the rendering thread")
 .recoverable();

/// HT102: GPU import failed.
pub const HT102: Diagnostic = Diagnostic::warning(
    "HT102",
    "hardware buffer could not be imported as a GPU image"
).with_note("the texture id is valid but not backed by the buffer")
 .with_help("fall back to uploading pixels through the ordinary texture path")
 .recoverable();

// =============================================================================
// Predefined diagnostics (HT2xx - Misuse)
// =============================================================================

/// HT201: Operation on a destroyed texture.
pub const HT201: Diagnostic = Diagnostic::error(
    "HT201",
    "operation on a destroyed hardware texture"
).with_note("all native handles were released by destroy()")
 .with_help("create a new HardwareTexture instead of reusing a destroyed one");

/// HT202: Size does not match construction size.
pub const HT202: Diagnostic = Diagnostic::error(
    "HT202",
    "requested size does not match the hardware buffer size"
).with_note("a hardware texture represents one image of one resolution for its lifetime")
 .with_help("create a new HardwareTexture for the new size");

/// HT203: Explicit destroy of an already destroyed texture.
pub const HT203: Diagnostic = Diagnostic::warning(
    "HT203",
    "destroy() called on an already destroyed hardware texture"
).with_note("the second call releases nothing")
 .with_help("drop the texture instead of destroying it twice");

// =============================================================================
// Predefined diagnostics (HT3xx - Capability)
// =============================================================================

/// HT301: Zero-copy path unavailable.
pub const HT301: Diagnostic = Diagnostic::note(
    "HT301",
    "zero-copy hardware textures are not supported on this device"
).with_help("render through the upload path");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined_kinds() {
        assert_eq!(HT001.kind, DiagnosticKind::Warning);
        assert_eq!(HT201.kind, DiagnosticKind::Error);
        assert_eq!(HT301.kind, DiagnosticKind::Note);
        assert!(HT202.help.is_some());
    }

    #[test]
    fn test_native_failures_are_recoverable() {
        for diag in [&HT001, &HT002, &HT101, &HT102] {
            assert!(diag.recoverable, "{}", diag.code);
        }
        for diag in [&HT201, &HT202, &HT203, &HT301] {
            assert!(!diag.recoverable, "{}", diag.code);
        }
    }
}
