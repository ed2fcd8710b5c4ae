use super::*;

#[test]
fn parses_hex() {
    assert_eq!(parse("#3B82F6").unwrap(), Rgba::new(0x3B, 0x82, 0xF6, 255));
}

#[test]
fn parses_short_hex_and_names() {
    assert_eq!(parse("#fff").unwrap(), Rgba::WHITE);
    assert_eq!(parse("black").unwrap(), Rgba::BLACK);
}

#[test]
fn parses_rgba_function() {
    let c = parse("rgba(255, 0, 0, 0.5)").unwrap();
    assert_eq!((c.r, c.g, c.b), (255, 0, 0));
    assert!((127..=128).contains(&c.a));
}

#[test]
fn rejects_garbage() {
    let err = parse("not-a-color").unwrap_err();
    assert_eq!(err.input, "not-a-color");
}

#[test]
fn parse_or_falls_back() {
    assert_eq!(parse_or("nope", Rgba::new(1, 2, 3, 4)), Rgba::new(1, 2, 3, 4));
    assert_eq!(parse_or("#000", Rgba::WHITE), Rgba::BLACK);
}

#[test]
fn with_opacity_scales_alpha() {
    assert_eq!(Rgba::BLACK.with_opacity(0.5).a, 128);
    assert_eq!(Rgba::BLACK.with_opacity(2.0).a, 255);
    assert_eq!(Rgba::BLACK.with_opacity(f64::NAN).a, 255);
}
