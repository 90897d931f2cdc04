use super::*;

#[test]
fn add_update_remove_roundtrip() {
    let mut t = Template::default();
    t.add_text_element(TextElement::new("second")).unwrap();
    assert_eq!(t.text_elements.len(), 2);
    assert!(t.add_text_element(TextElement::new("second")).is_err());

    let patch = TextElementPatch {
        text: Some("Hello".to_string()),
        animation: Some(None),
        ..TextElementPatch::default()
    };
    t.update_text_element("second", &patch).unwrap();
    let el = t.text_element("second").unwrap();
    assert_eq!(el.text, "Hello");
    assert!(el.animation.is_none());

    let removed = t.remove_text_element("second").unwrap();
    assert_eq!(removed.id, "second");
    assert!(t.remove_text_element("second").is_err());
}

#[test]
fn invalid_patch_leaves_element_unchanged() {
    let mut t = Template::default();
    let before = t.clone();
    let patch = TextElementPatch {
        text: Some("changed".to_string()),
        timing: Some(Timing {
            start_time: 8.0,
            end_time: 2.0,
        }),
        ..TextElementPatch::default()
    };
    assert!(t.update_text_element("quote-text", &patch).is_err());
    assert_eq!(t, before);
    assert!(t.update_text_element("missing", &TextElementPatch::default()).is_err());
}

#[test]
fn template_patch_is_atomic() {
    let mut t = Template::default();
    let before = t.clone();
    let bad = TemplatePatch {
        name: Some("Renamed".to_string()),
        fps: Some(0),
        ..TemplatePatch::default()
    };
    assert!(t.apply_patch(&bad).is_err());
    assert_eq!(t, before);

    let good = TemplatePatch {
        duration_s: Some(4.0),
        width: Some(720),
        height: Some(1280),
        ..TemplatePatch::default()
    };
    t.apply_patch(&good).unwrap();
    assert_eq!(t.duration_s, 4.0);
    assert_eq!(t.settings.width, 720);
}

#[test]
fn media_setters_toggle_sources() {
    let mut t = Template::default();
    t.set_background(MediaKind::Video, MediaHandle::new("clip.mp4"));
    assert_eq!(t.background_source().unwrap().0, MediaKind::Video);
    t.clear_background();
    assert!(t.background_source().is_none());

    t.set_audio_source(MediaHandle::new("song.mp3"));
    assert_eq!(t.audio_source().unwrap().1, 0.7);
    t.set_audio_volume(0.3).unwrap();
    assert!(t.set_audio_volume(-0.1).is_err());
    assert_eq!(t.audio_source().unwrap().1, 0.3);
    t.clear_audio_source();
    assert!(t.audio_source().is_none());
}

#[test]
fn template_patch_replaces_elements_and_media() {
    let mut t = Template::default();
    let patch = TemplatePatch {
        text_elements: Some(vec![TextElement::new("a"), TextElement::new("b")]),
        audio_track: Some(None),
        ..TemplatePatch::default()
    };
    t.apply_patch(&patch).unwrap();
    assert_eq!(t.text_elements.len(), 2);
    assert!(t.audio_track.is_none());

    let dup = TemplatePatch {
        text_elements: Some(vec![TextElement::new("a"), TextElement::new("a")]),
        ..TemplatePatch::default()
    };
    assert!(t.apply_patch(&dup).is_err());
    assert_eq!(t.text_elements[1].id, "b");

    t.set_background(MediaKind::Video, MediaHandle::new("clip.webm"));
    t.clear_background();
    assert_eq!(t.background_media.as_ref().unwrap().kind, MediaKind::Image);
}
