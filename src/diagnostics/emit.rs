//! Diagnostic emission backend.
//!
//! Every diagnostic is forwarded to the `log` crate. Debug builds (or builds
//! with the `diagnostics` feature) also print a rustc-style block to stderr.

use std::sync::atomic::{AtomicBool, Ordering};

use super::kind::{Diagnostic, DiagnosticKind};
use super::strict::strict_mode;

/// Global flag to suppress stderr output (for testing).
static DIAGNOSTICS_SUPPRESSED: AtomicBool = AtomicBool::new(false);

/// Suppress stderr diagnostic output. Log forwarding is unaffected.
pub fn suppress_diagnostics(suppress: bool) {
    DIAGNOSTICS_SUPPRESSED.store(suppress, Ordering::Relaxed);
}

/// Check if diagnostics are suppressed.
pub fn is_suppressed() -> bool {
    DIAGNOSTICS_SUPPRESSED.load(Ordering::Relaxed)
}

/// Emit a diagnostic.
pub fn emit(diag: &Diagnostic) {
    emit_inner(diag, None);
}

/// Emit a diagnostic with additional runtime context.
pub fn emit_with_context(diag: &Diagnostic, context: &str) {
    emit_inner(diag, Some(context));
}

fn emit_inner(diag: &Diagnostic, context: Option<&str>) {
    emit_to_log(diag, context);

    #[cfg(any(debug_assertions, feature = "diagnostics"))]
    {
        if !is_suppressed() {
            emit_to_stderr(diag, context);
        }
    }

    if strict_mode().is_fatal(diag) {
        panic!(
            "[hwtexture][{}] {}\nContext: {}\nStrict mode enabled - diagnostic is fatal.",
            diag.code,
            diag.message,
            context.unwrap_or("none")
        );
    }
}

/// Internal: emit to stderr.
#[cfg(any(debug_assertions, feature = "diagnostics"))]
fn emit_to_stderr(diag: &Diagnostic, context: Option<&str>) {
    use std::io::Write;

    let mut stderr = std::io::stderr().lock();

    let _ = writeln!(
        stderr,
        "[hwtexture][{}] {}: {}",
        diag.code,
        diag.kind.prefix(),
        diag.message
    );
    if let Some(context) = context {
        let _ = writeln!(stderr, "  context: {}", context);
    }
    if let Some(note) = diag.note {
        let _ = writeln!(stderr, "  note: {}", note);
    }
    if let Some(help) = diag.help {
        let _ = writeln!(stderr, "  help: {}", help);
    }
    let _ = writeln!(stderr);
}

/// Forward a diagnostic to the log crate.
fn emit_to_log(diag: &Diagnostic, context: Option<&str>) {
    let context = context.unwrap_or("-");
    match diag.kind {
        DiagnosticKind::Error => {
            log::error!("[{}] {} ({})", diag.code, diag.message, context);
        }
        DiagnosticKind::Warning => {
            log::warn!("[{}] {} ({})", diag.code, diag.message, context);
        }
        DiagnosticKind::Note => {
            log::info!("[{}] {} ({})", diag.code, diag.message, context);
        }
    }

    if let Some(help) = diag.help {
        log::debug!("  help: {}", help);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::kind::HT301;

    #[test]
    fn test_suppression() {
        suppress_diagnostics(true);
        assert!(is_suppressed());
        suppress_diagnostics(false);
        assert!(!is_suppressed());
    }

    #[test]
    fn test_note_never_panics() {
        emit_with_context(&HT301, "probe=8x8");
    }
}
