use super::*;
use crate::template::model::{MediaHandle, Position, Timing};

fn single(kind: AnimationKind) -> Template {
    let mut t = Template::default();
    let el = &mut t.text_elements[0];
    el.animation = Some(Animation {
        kind,
        delay: 1.0,
        duration: 1.0,
    });
    t
}

fn text_layers(f: &FrameLayers) -> Vec<&TextLayer> {
    f.text_layers().collect()
}

#[test]
fn background_first_then_elements_in_order() {
    let mut t = Template::default();
    let mut b = TextElement::new("b");
    b.timing = Timing {
        start_time: 0.0,
        end_time: 10.0,
    };
    let mut a = TextElement::new("a");
    a.timing = b.timing;
    t.text_elements = vec![b, a];

    let f = evaluate(&t, 5.0);
    assert!(matches!(
        f.layers[0],
        Layer::Background(BackgroundLayer::Gradient {
            top: GRADIENT_TOP,
            bottom: GRADIENT_BOTTOM
        })
    ));
    let ids: Vec<_> = text_layers(&f).iter().map(|l| l.element_id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
}

#[test]
fn media_backgrounds_carry_time_only_for_video() {
    let mut t = Template::default();
    t.set_background(MediaKind::Image, MediaHandle::new("bg.png"));
    let f = evaluate(&t, 3.0);
    assert!(matches!(&f.layers[0], Layer::Background(BackgroundLayer::Image { .. })));
    assert!(!f.has_time_varying_media());

    t.set_background(MediaKind::Video, MediaHandle::new("bg.mp4"));
    let f = evaluate(&t, 3.0);
    match &f.layers[0] {
        Layer::Background(BackgroundLayer::Video { time_s, .. }) => assert_eq!(*time_s, 3.0),
        other => panic!("unexpected {other:?}"),
    }
    assert!(f.has_time_varying_media());
}

#[test]
fn all_animations_start_transparent_and_settle() {
    for kind in [
        AnimationKind::FadeIn,
        AnimationKind::ScaleIn,
        AnimationKind::SlideIn,
    ] {
        let t = single(kind);
        let start = evaluate(&t, 1.0);
        assert_eq!(text_layers(&start)[0].opacity, 0.0, "{kind:?}");

        let done = evaluate(&t, 2.5);
        let l = text_layers(&done)[0];
        assert_eq!((l.opacity, l.scale, l.y_offset), (1.0, 1.0, 0.0), "{kind:?}");
    }
}

#[test]
fn scale_in_halfway_is_three_quarters() {
    let t = single(AnimationKind::ScaleIn);
    let f = evaluate(&t, 1.5);
    let l = text_layers(&f)[0];
    assert_eq!(l.scale, 0.75);
    assert_eq!(l.font_size_px, 32.0 * 0.75);
}

#[test]
fn slide_in_offsets_down_then_settles() {
    let t = single(AnimationKind::SlideIn);
    let f = evaluate(&t, 1.0);
    let l = text_layers(&f)[0];
    assert_eq!(l.y_offset, 50.0);
    assert_eq!(l.y, 960.0 + 50.0);
}

#[test]
fn no_animation_is_fully_visible() {
    let mut t = single(AnimationKind::None);
    let f = evaluate(&t, 1.0);
    assert_eq!(text_layers(&f)[0].opacity, 1.0);

    t.text_elements[0].animation = None;
    let f = evaluate(&t, 1.0);
    assert_eq!(text_layers(&f)[0].opacity, 1.0);
}

#[test]
fn zero_duration_falls_back_to_one_second() {
    let mut t = single(AnimationKind::FadeIn);
    t.text_elements[0].animation = Some(Animation {
        kind: AnimationKind::FadeIn,
        delay: 0.0,
        duration: 0.0,
    });
    let f = evaluate(&t, 1.25);
    assert_eq!(text_layers(&f)[0].opacity, 0.25);
}

#[test]
fn delay_is_ignored_unless_requested() {
    let t = single(AnimationKind::FadeIn);
    let f = evaluate(&t, 1.5);
    assert_eq!(text_layers(&f)[0].opacity, 0.5);

    let ev = Evaluator::new(EvalOptions {
        honor_animation_delay: true,
    });
    let f = ev.eval_frame(&t, 1.5);
    assert_eq!(text_layers(&f)[0].opacity, 0.0);
    let f = ev.eval_frame(&t, 2.5);
    assert_eq!(text_layers(&f)[0].opacity, 0.5);
}

#[test]
fn multi_line_block_is_centered() {
    let mut t = Template::default();
    let el = &mut t.text_elements[0];
    el.text = "one\ntwo\nthree".to_string();
    el.animation = None;
    el.position = Position { x: 25.0, y: 50.0 };

    let f = evaluate(&t, 5.0);
    let l = text_layers(&f)[0];
    assert_eq!(l.x, 270.0);
    assert_eq!(l.lines.len(), 3);
    let spacing = 32.0 * 1.2;
    assert_eq!(l.lines[1].y, 960.0);
    assert!((l.lines[1].y - l.lines[0].y - spacing).abs() < 1e-9);
    assert!((l.lines[2].y - l.lines[1].y - spacing).abs() < 1e-9);
}

#[test]
fn resolved_style_fields() {
    let t = Template::default();
    let f = evaluate(&t, 5.0);
    let l = text_layers(&f)[0];
    assert_eq!(l.font_weight, 700);
    assert_eq!(l.font_families, vec!["Arial", "sans-serif"]);
    assert_eq!(l.color, Rgba8::WHITE);
    assert_eq!(l.shadow, Some(crate::eval::layers::Shadow::FALLBACK));
}
