//! Build script for hwtexture.
//!
//! Reports feature/target combinations that will not behave as expected.

use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_ANDROID");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_DEBUG");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_PARKING_LOT");

    let android_enabled = env::var("CARGO_FEATURE_ANDROID").is_ok();
    let debug_enabled = env::var("CARGO_FEATURE_DEBUG").is_ok();
    let parking_lot_enabled = env::var("CARGO_FEATURE_PARKING_LOT").is_ok();

    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let is_release = profile == "release";
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();

    // --- Android backend ---
    if android_enabled && target_os != "android" {
        emit_warning("'android' feature enabled for a non-Android target");
        emit_note("AndroidBackend is only compiled for target_os = \"android\".");
        emit_note("Only DummyBackend will be available in this build.");
    }

    // --- Debug features ---
    if debug_enabled {
        emit_info("Debug features enabled (destroy-site backtraces)");
        if is_release {
            emit_warning("Debug features enabled in release build!");
            emit_note("Every destroy captures a backtrace. Consider disabling for production.");
        }
    }

    // --- Parking Lot ---
    if parking_lot_enabled {
        emit_info("Using parking_lot for mutexes");
    }
}

fn emit_info(msg: &str) {
    println!("cargo:warning=[hwtexture] {}", msg);
}

fn emit_note(msg: &str) {
    println!("cargo:warning=[hwtexture]    {}", msg);
}

fn emit_warning(msg: &str) {
    println!("cargo:warning=[hwtexture] warning: {}", msg);
}
