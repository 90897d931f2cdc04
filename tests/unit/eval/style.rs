use super::*;

#[test]
fn font_weight_keywords_and_numbers() {
    assert_eq!(resolve_font_weight("normal"), 400);
    assert_eq!(resolve_font_weight("Bold"), 700);
    assert_eq!(resolve_font_weight("lighter"), 300);
    assert_eq!(resolve_font_weight("bolder"), 800);
    assert_eq!(resolve_font_weight("600"), 600);
    assert_eq!(resolve_font_weight("0"), 400);
    assert_eq!(resolve_font_weight("heavy"), 400);
}

#[test]
fn family_list_is_unquoted() {
    assert_eq!(
        font_families(r#""Helvetica Neue", 'Arial' , sans-serif,"#),
        vec!["Helvetica Neue", "Arial", "sans-serif"]
    );
    assert!(font_families("  ").is_empty());
}

#[test]
fn default_style_shadow_parses_exactly() {
    let s = resolve_shadow(Some("2px 2px 4px rgba(0,0,0,0.8)")).unwrap();
    assert_eq!(s, Shadow::FALLBACK);
}

#[test]
fn shadow_variants() {
    assert!(resolve_shadow(None).is_none());
    assert!(resolve_shadow(Some("none")).is_none());
    assert!(resolve_shadow(Some("")).is_none());

    let s = resolve_shadow(Some("#ff0000 1px -3px")).unwrap();
    assert_eq!((s.dx, s.dy, s.blur), (1.0, -3.0, 0.0));
    assert_eq!(s.color, Rgba8::rgb(255, 0, 0));

    let s = resolve_shadow(Some("0 0 8px white, 1px 1px black")).unwrap();
    assert_eq!(s.blur, 8.0);
    assert_eq!(s.color, Rgba8::WHITE);

    assert_eq!(resolve_shadow(Some("glow")).unwrap(), Shadow::FALLBACK);
    assert_eq!(resolve_shadow(Some("1px")).unwrap(), Shadow::FALLBACK);
}

#[test]
fn bad_color_falls_back_to_white() {
    assert_eq!(resolve_color("e", "not-a-color"), Rgba8::WHITE);
    assert_eq!(resolve_color("e", "#000"), Rgba8::rgb(0, 0, 0));
}
