//! Strict mode turns lifecycle misuse into a panic.

use hwtexture::{DummyBackend, HardwareTexture, StrictMode, StrictModeGuard};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

#[test]
fn test_use_after_destroy_panics_in_strict_mode() {
    hwtexture::diagnostics::suppress_diagnostics(true);
    let device = Arc::new(DummyBackend::new());
    let mut texture = HardwareTexture::new(Arc::clone(&device), 8, 8);
    texture.destroy();

    {
        let _guard = StrictModeGuard::panic_on_error();
        let result = catch_unwind(AssertUnwindSafe(|| texture.allocate_texture(8, 8, None)));
        assert!(result.is_err());

        // Native failures are warnings and stay non-fatal.
        let unmapped = HardwareTexture::new(Arc::clone(&device), 0, 0);
        assert!(unmapped.buffer_handle().is_none());
    }

    assert_eq!(hwtexture::diagnostics::strict_mode(), StrictMode::Warn);
    assert!(texture.allocate_texture(8, 8, None).is_err());
    assert!(device.stats().is_clean());

    std::env::set_var("HWTEXTURE_STRICT", "error");
    hwtexture::diagnostics::init_from_env();
    assert_eq!(hwtexture::diagnostics::strict_mode(), StrictMode::PanicOnError);
    hwtexture::set_strict_mode(StrictMode::Warn);
}
