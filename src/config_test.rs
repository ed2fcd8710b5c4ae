#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn env_parse_missing_returns_default() {
    let val: usize = env_parse("__STUDIO_TEST_MISSING__", 42);
    assert_eq!(val, 42);
}

#[test]
fn env_parse_present_valid() {
    unsafe { std::env::set_var("__STUDIO_TEST_VALID__", " 2.5 ") };
    let val: f32 = env_parse("__STUDIO_TEST_VALID__", 1.0);
    assert_eq!(val, 2.5);
    unsafe { std::env::remove_var("__STUDIO_TEST_VALID__") };
}

#[test]
fn env_parse_present_invalid_returns_default() {
    unsafe { std::env::set_var("__STUDIO_TEST_INVALID__", "lots") };
    let val: usize = env_parse("__STUDIO_TEST_INVALID__", 7);
    assert_eq!(val, 7);
    unsafe { std::env::remove_var("__STUDIO_TEST_INVALID__") };
}

#[test]
fn defaults_match_canvas_constants() {
    let config = ExportConfig::default();
    assert_eq!(config.export_scale, 3.0);
    assert_eq!(config.customization_fee, 10.0);
    assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
}

// Only test that touches the STUDIO_* keys.
#[test]
fn from_env_reads_overrides_and_rejects_bad_scale() {
    unsafe {
        std::env::set_var("STUDIO_EXPORT_SCALE", "-2");
        std::env::set_var("STUDIO_CUSTOMIZATION_FEE", "12.5");
        std::env::set_var("STUDIO_MAX_UPLOAD_BYTES", "1024");
    }
    let config = ExportConfig::from_env();
    unsafe {
        std::env::remove_var("STUDIO_EXPORT_SCALE");
        std::env::remove_var("STUDIO_CUSTOMIZATION_FEE");
        std::env::remove_var("STUDIO_MAX_UPLOAD_BYTES");
    }

    assert_eq!(config.export_scale, 3.0);
    assert_eq!(config.customization_fee, 12.5);
    assert_eq!(config.max_upload_bytes, 1024);
}
