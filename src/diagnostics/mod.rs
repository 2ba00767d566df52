//! Coded diagnostics for the texture lifecycle.
//!
//! Native failures never propagate as errors; they are reported here so a
//! renderer can see why it fell back to the upload path, and strict mode never
//! makes them fatal. Misuse of a texture (use after destroy, size mismatch,
//! repeated destroy) becomes a panic under strict mode.
//!
//! ## Diagnostic Codes
//!
//! | Code  | Meaning                        |
//! |-------|--------------------------------|
//! | HT0xx | Buffer allocation and mapping  |
//! | HT1xx | GPU texture creation / import  |
//! | HT2xx | Lifecycle misuse               |
//! | HT3xx | Capability detection           |

pub mod emit;
pub mod kind;
pub mod macros;
pub mod strict;

pub use emit::{emit, emit_with_context, suppress_diagnostics};
pub use kind::{Diagnostic, DiagnosticKind};
pub use strict::{init_from_env, set_strict_mode, strict_mode, StrictMode, StrictModeGuard};

pub use kind::{HT001, HT002, HT101, HT102, HT201, HT202, HT203, HT301};
