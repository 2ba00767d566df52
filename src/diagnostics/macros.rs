//! Diagnostic macros for internal call sites.

/// Emit a predefined diagnostic with formatted context.
///
/// ```rust,ignore
/// ht_emit_ctx!(HT202, "expected={} actual={}", expected, actual);
/// ```
#[macro_export]
macro_rules! ht_emit_ctx {
    ($code:ident, $($arg:tt)+) => {{
        $crate::diagnostics::emit::emit_with_context(
            &$crate::diagnostics::$code,
            &format!($($arg)+),
        );
    }};
}
