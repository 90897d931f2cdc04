use super::*;

#[test]
fn default_template_is_valid_quote_template() {
    let t = Template::default();
    t.validate().unwrap();
    assert_eq!(t.settings.canvas(), Canvas { width: 1080, height: 1920 });
    assert_eq!(t.text_elements.len(), 1);
    let el = &t.text_elements[0];
    assert_eq!(el.id, "quote-text");
    assert_eq!(el.style.font_weight, "bold");
    assert_eq!(el.style.font_size, 32.0);
    assert_eq!(el.timing, Timing { start_time: 1.0, end_time: 9.0 });
    assert!(t.background_source().is_none());
    assert!(t.audio_source().is_none());
    assert_eq!(t.audio_track.as_ref().unwrap().volume, 0.7);
}

#[test]
fn json_uses_host_field_names() {
    let json = r##"{
        "id": "t",
        "name": "Demo",
        "duration": 5,
        "backgroundMedia": { "type": "video", "source": { "path": "bg.mp4", "mime": "video/mp4" } },
        "textElements": [{
            "id": "a",
            "text": "hi\nthere",
            "position": { "x": 10, "y": 20 },
            "style": {
                "fontSize": 40,
                "fontWeight": "700",
                "color": "#ff0000",
                "fontFamily": "Inter",
                "textAlign": "left"
            },
            "animation": { "type": "slide-in", "delay": 0, "duration": 0.5 },
            "timing": { "startTime": 0, "endTime": 5 }
        }],
        "audioTrack": { "volume": 0.25 },
        "settings": { "width": 720, "height": 1280, "fps": 24 }
    }"##;
    let t = Template::from_json_str(json).unwrap();
    t.validate().unwrap();
    assert_eq!(t.duration_s, 5.0);
    let (kind, handle) = t.background_source().unwrap();
    assert_eq!(kind, MediaKind::Video);
    assert_eq!(handle.mime.as_deref(), Some("video/mp4"));
    let el = &t.text_elements[0];
    assert_eq!(el.style.text_align, TextAlign::Left);
    assert_eq!(el.animation.unwrap().kind, AnimationKind::SlideIn);
    assert!(el.style.text_shadow.is_none());

    let back = t.to_json_string().unwrap();
    assert!(back.contains("\"textElements\""));
    assert!(back.contains("\"slide-in\""));
    assert_eq!(Template::from_json_str(&back).unwrap(), t);
}

#[test]
fn validate_rejects_bad_ranges() {
    let mut t = Template::default();
    t.duration_s = 0.0;
    assert!(t.validate().is_err());

    let mut t = Template::default();
    t.settings.fps = 0;
    assert!(t.validate().is_err());

    let mut t = Template::default();
    t.audio_track.as_mut().unwrap().volume = 1.5;
    assert!(t.validate().is_err());

    let mut t = Template::default();
    t.text_elements[0].timing = Timing { start_time: 5.0, end_time: 4.0 };
    assert!(t.validate().is_err());

    let mut t = Template::default();
    t.text_elements.push(t.text_elements[0].clone());
    assert!(t.validate().is_err());
}

#[test]
fn validate_rejects_non_positive_animation_duration() {
    for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let mut t = Template::default();
        t.text_elements[0].animation.as_mut().unwrap().duration = bad;
        let err = t.validate().unwrap_err();
        assert!(err.to_string().contains("animation duration"), "{bad}: {err}");
    }

    let mut t = Template::default();
    t.text_elements[0].animation.as_mut().unwrap().duration = 0.25;
    t.validate().unwrap();
}

#[test]
fn timing_window_is_inclusive() {
    let w = Timing { start_time: 1.0, end_time: 9.0 };
    assert!(!w.contains(0.999));
    assert!(w.contains(1.0));
    assert!(w.contains(9.0));
    assert!(!w.contains(9.01));
}
