use super::*;

#[test]
fn fps_rejects_zero() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn whole_fps_frame_times_are_exact_quotients() {
    let fps = Fps::whole(30).unwrap();
    for i in 0..300u64 {
        assert_eq!(fps.frames_to_secs(i), i as f64 / 30.0);
    }
}

#[test]
fn frames_before_counts_strictly_earlier_frames() {
    let fps = Fps::whole(30).unwrap();
    assert_eq!(fps.frames_before(10.0), 300);
    assert_eq!(fps.frames_before(0.5), 15);
    assert_eq!(fps.frames_before(0.51), 16);
    assert_eq!(fps.frames_before(0.0), 0);
    assert_eq!(fps.frames_before(f64::NAN), 0);

    let ntsc = Fps::new(30000, 1001).unwrap();
    let n = ntsc.frames_before(2.0);
    assert!(ntsc.frames_to_secs(n - 1) < 2.0);
    assert!(ntsc.frames_to_secs(n) >= 2.0);
}

#[test]
fn rgba_lerp_hits_endpoints() {
    let a = Rgba8::rgb(0x66, 0x7e, 0xea);
    let b = Rgba8::rgb(0x76, 0x4b, 0xa2);
    assert_eq!(a.lerp(b, 0.0), a);
    assert_eq!(a.lerp(b, 1.0), b);
    assert_eq!(a.lerp(b, 7.0), b);
}

#[test]
fn premultiply_rounds() {
    let p = Rgba8::rgba(255, 128, 0, 128).premultiplied();
    assert_eq!(p.to_array(), [128, 64, 0, 128]);
}
