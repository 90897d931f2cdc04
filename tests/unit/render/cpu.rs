use std::io::Cursor;

use super::*;
use crate::eval::evaluator::{GRADIENT_BOTTOM, GRADIENT_TOP, evaluate};
use crate::template::model::MediaHandle;

fn no_fonts() -> CpuRenderer {
    CpuRenderer::new(CpuRendererOpts {
        load_system_fonts: false,
        ..CpuRendererOpts::default()
    })
}

fn small_template() -> Template {
    let mut t = Template::default();
    t.settings.width = 8;
    t.settings.height = 4;
    t
}

struct TempFileGuard(PathBuf);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn write_png(name: &str, w: u32, h: u32, rgba: [u8; 4]) -> TempFileGuard {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    let path = std::env::temp_dir().join(format!("reelforge_{}_{name}.png", std::process::id()));
    std::fs::write(&path, buf).unwrap();
    TempFileGuard(path)
}

#[test]
fn gradient_rows_interpolate_top_to_bottom() {
    let t = small_template();
    let mut r = no_fonts();
    let mut s = Surface::for_canvas(t.settings.canvas()).unwrap();
    r.render(&mut s, &evaluate(&t, 0.0)).unwrap();

    let top = GRADIENT_TOP.lerp(GRADIENT_BOTTOM, 0.125).premultiplied().to_array();
    let bottom = GRADIENT_TOP.lerp(GRADIENT_BOTTOM, 0.875).premultiplied().to_array();
    assert_eq!(s.pixel(0, 0), Some(top));
    assert_eq!(s.pixel(7, 0), Some(top));
    assert_eq!(s.pixel(3, 3), Some(bottom));
}

#[test]
fn rendering_is_deterministic_and_ignores_missing_fonts() {
    let t = small_template();
    let frame = evaluate(&t, 5.0);
    assert_eq!(frame.text_layers().count(), 1);

    let mut r = no_fonts();
    r.prepare(&t).unwrap();
    let mut a = Surface::for_canvas(t.settings.canvas()).unwrap();
    let mut b = a.clone();
    r.render(&mut a, &frame).unwrap();
    r.render(&mut b, &frame).unwrap();
    assert_eq!(a, b);

    let mut bg_only = a.clone();
    r.render(&mut bg_only, &evaluate(&t, 0.0)).unwrap();
    assert_eq!(a, bg_only);
}

#[test]
fn canvas_mismatch_is_a_render_error() {
    let t = small_template();
    let mut r = no_fonts();
    let mut s = Surface::new(4, 4).unwrap();
    let err = r.render(&mut s, &evaluate(&t, 0.0)).unwrap_err();
    assert!(matches!(err, ReelforgeError::Render(_)));
}

#[test]
fn image_background_fills_frame_with_or_without_prepare() {
    let png = write_png("solid", 2, 2, [255, 0, 0, 255]);
    let mut t = small_template();
    t.set_background(MediaKind::Image, MediaHandle::new(&png.0));
    let frame = evaluate(&t, 0.0);

    let mut lazy = no_fonts();
    let mut a = Surface::for_canvas(t.settings.canvas()).unwrap();
    lazy.render(&mut a, &frame).unwrap();
    let [r_, g, b, alpha] = a.pixel(4, 2).unwrap();
    assert!(r_ >= 250 && alpha >= 250, "{:?}", [r_, g, b, alpha]);
    assert_eq!((g, b), (0, 0));

    let mut warmed = no_fonts();
    warmed.prepare(&t).unwrap();
    let mut b = Surface::for_canvas(t.settings.canvas()).unwrap();
    warmed.render(&mut b, &frame).unwrap();
    assert_eq!(a, b);
}

#[test]
fn swapped_background_is_decoded_and_old_one_dropped() {
    let red = write_png("swap_red", 2, 2, [255, 0, 0, 255]);
    let blue = write_png("swap_blue", 2, 2, [0, 0, 255, 255]);
    let mut t = small_template();
    let mut r = no_fonts();
    let mut s = Surface::for_canvas(t.settings.canvas()).unwrap();

    t.set_background(MediaKind::Image, MediaHandle::new(&red.0));
    r.prepare(&t).unwrap();
    r.render(&mut s, &evaluate(&t, 0.0)).unwrap();

    t.set_background(MediaKind::Image, MediaHandle::new(&blue.0));
    r.render(&mut s, &evaluate(&t, 0.0)).unwrap();
    let [r_, _, b, _] = s.pixel(4, 2).unwrap();
    assert!(b >= 250 && r_ <= 5, "{:?}", s.pixel(4, 2));
    assert_eq!(r.images.len(), 1);
    assert!(r.images.contains_key(&blue.0));
    assert!(r.stretched.keys().all(|k| k.path == blue.0));
}

#[test]
fn render_reports_unreadable_background() {
    let mut t = small_template();
    t.set_background(
        MediaKind::Image,
        MediaHandle::new("/nonexistent/reelforge/missing.png"),
    );
    let mut s = Surface::for_canvas(t.settings.canvas()).unwrap();
    let err = no_fonts().render(&mut s, &evaluate(&t, 0.0)).unwrap_err();
    assert!(matches!(err, ReelforgeError::Other(_)), "{err}");
}

#[test]
fn prepare_reports_unreadable_background() {
    let mut t = small_template();
    t.set_background(
        MediaKind::Image,
        MediaHandle::new("/nonexistent/reelforge/missing.png"),
    );
    assert!(no_fonts().prepare(&t).is_err());
}

#[test]
fn video_cache_capacity_prefers_explicit_option() {
    let opts = CpuRendererOpts {
        video_cache_capacity: Some(3),
        ..CpuRendererOpts::default()
    };
    assert_eq!(opts.resolved_video_cache_capacity(), 3);
    let zero = CpuRendererOpts {
        video_cache_capacity: Some(0),
        ..CpuRendererOpts::default()
    };
    assert!(zero.resolved_video_cache_capacity() > 0);
}
