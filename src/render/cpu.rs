use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::decode::{PreparedImage, premultiply_rgba8_in_place, read_image_file};
use crate::assets::fonts::{FontBook, ResolvedFace};
use crate::assets::media::{
    VideoSourceInfo, decode_video_frame_rgba8, probe_video, video_source_time,
};
use crate::assets::text::{ShapedLine, TextLayoutEngine};
use crate::eval::layers::{BackgroundLayer, FrameLayers, Layer, TextLayer};
use crate::eval::style::{font_families, resolve_font_weight};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{ReelforgeError, ReelforgeResult};
use crate::render::backend::Renderer;
use crate::render::blur::blur_rgba8_premul;
use crate::render::composite::over_in_place;
use crate::render::surface::Surface;
use crate::template::model::{MediaKind, Template, TextAlign};

/// Environment override for the decoded video frame cache size.
pub const VIDEO_CACHE_CAPACITY_ENV: &str = "REELFORGE_VIDEO_CACHE_CAPACITY";
const DEFAULT_VIDEO_CACHE_CAPACITY: usize = 64;

/// Options for [`CpuRenderer`].
#[derive(Clone, Debug)]
pub struct CpuRendererOpts {
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` files.
    pub font_dirs: Vec<PathBuf>,
    pub load_system_fonts: bool,
    /// Decoded video frames kept per source. `None` reads
    /// [`VIDEO_CACHE_CAPACITY_ENV`], then falls back to 64.
    pub video_cache_capacity: Option<usize>,
}

impl Default for CpuRendererOpts {
    fn default() -> Self {
        Self {
            font_dirs: Vec::new(),
            load_system_fonts: true,
            video_cache_capacity: None,
        }
    }
}

impl CpuRendererOpts {
    fn resolved_video_cache_capacity(&self) -> usize {
        self.video_cache_capacity
            .or_else(|| {
                std::env::var(VIDEO_CACHE_CAPACITY_ENV)
                    .ok()
                    .and_then(|v| v.parse::<usize>().ok())
            })
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_VIDEO_CACHE_CAPACITY)
    }
}

struct VideoFrameDecoder {
    info: VideoSourceInfo,
    frame_cache: HashMap<u64, vello_cpu::Image>,
    lru: VecDeque<u64>,
    capacity: usize,
}

impl VideoFrameDecoder {
    fn new(info: VideoSourceInfo, capacity: usize) -> Self {
        Self {
            info,
            frame_cache: HashMap::new(),
            lru: VecDeque::new(),
            capacity,
        }
    }

    fn decode_at(&mut self, source_time_s: f64) -> ReelforgeResult<vello_cpu::Image> {
        let key = (source_time_s.max(0.0) * 1000.0).round() as u64;
        if let Some(img) = self.frame_cache.get(&key).cloned() {
            self.touch(key);
            return Ok(img);
        }

        let mut rgba = decode_video_frame_rgba8(&self.info, source_time_s)?;
        premultiply_rgba8_in_place(&mut rgba);
        let image = premul_bytes_to_image(&rgba, self.info.width, self.info.height)?;
        self.frame_cache.insert(key, image.clone());
        self.touch(key);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.frame_cache.remove(&old);
            }
        }
        Ok(image)
    }

    fn touch(&mut self, key: u64) {
        if let Some(pos) = self.lru.iter().position(|x| *x == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct StretchKey {
    path: PathBuf,
    width: u32,
    height: u32,
}

struct PlacedLine {
    shaped: ShapedLine,
    x: f64,
    y: f64,
}

/// Software renderer built on `vello_cpu` for glyphs and image sampling.
pub struct CpuRenderer {
    opts: CpuRendererOpts,
    fonts: Option<FontBook>,
    text: TextLayoutEngine,
    font_data: HashMap<u32, vello_cpu::peniko::FontData>,
    images: HashMap<PathBuf, PreparedImage>,
    stretched: HashMap<StretchKey, Arc<Vec<u8>>>,
    videos: HashMap<PathBuf, VideoFrameDecoder>,
    ctx: Option<vello_cpu::RenderContext>,
    scratch: Option<vello_cpu::Pixmap>,
}

impl Default for CpuRenderer {
    fn default() -> Self {
        Self::new(CpuRendererOpts::default())
    }
}

impl CpuRenderer {
    pub fn new(opts: CpuRendererOpts) -> Self {
        Self {
            opts,
            fonts: None,
            text: TextLayoutEngine::new(),
            font_data: HashMap::new(),
            images: HashMap::new(),
            stretched: HashMap::new(),
            videos: HashMap::new(),
            ctx: None,
            scratch: None,
        }
    }

    pub fn opts(&self) -> &CpuRendererOpts {
        &self.opts
    }

    fn fonts(&mut self) -> &mut FontBook {
        self.fonts
            .get_or_insert_with(|| FontBook::new(&self.opts.font_dirs, self.opts.load_system_fonts))
    }

    fn prepare_background(&mut self, kind: MediaKind, path: &Path) -> ReelforgeResult<()> {
        match kind {
            MediaKind::Image => {
                if !self.images.contains_key(path) {
                    let img = read_image_file(path)?;
                    tracing::debug!(
                        path = %path.display(),
                        width = img.width,
                        height = img.height,
                        "decoded background image"
                    );
                    self.images.insert(path.to_path_buf(), img);
                }
            }
            MediaKind::Video => {
                if !self.videos.contains_key(path) {
                    let info = probe_video(path)?;
                    tracing::debug!(
                        path = %path.display(),
                        width = info.width,
                        height = info.height,
                        duration_s = info.duration_s,
                        "probed background video"
                    );
                    let capacity = self.opts.resolved_video_cache_capacity();
                    self.videos
                        .insert(path.to_path_buf(), VideoFrameDecoder::new(info, capacity));
                }
            }
        }
        Ok(())
    }

    /// Drop decoded media for every background other than `current`.
    fn retain_background(&mut self, current: Option<&Path>) {
        self.images.retain(|p, _| Some(p.as_path()) == current);
        self.videos.retain(|p, _| Some(p.as_path()) == current);
        self.stretched.retain(|k, _| Some(k.path.as_path()) == current);
    }

    /// Decode `path` on first sight, e.g. after the host swapped the background mid-preview.
    fn ensure_background(&mut self, kind: MediaKind, path: &Path) -> ReelforgeResult<()> {
        let known = match kind {
            MediaKind::Image => self.images.contains_key(path),
            MediaKind::Video => self.videos.contains_key(path),
        };
        if !known {
            self.retain_background(Some(path));
            self.prepare_background(kind, path)?;
        }
        Ok(())
    }

    fn draw_background(&mut self, surface: &mut Surface, bg: &BackgroundLayer) -> ReelforgeResult<()> {
        match bg {
            BackgroundLayer::Gradient { top, bottom } => {
                fill_vertical_gradient(surface, *top, *bottom);
                Ok(())
            }
            BackgroundLayer::Image { source } => {
                self.ensure_background(MediaKind::Image, &source.path)?;
                let bytes = self.stretched_image(&source.path, surface.width(), surface.height())?;
                over_in_place(surface.data_mut(), &bytes, 1.0)
            }
            BackgroundLayer::Video { source, time_s } => {
                self.ensure_background(MediaKind::Video, &source.path)?;
                let decoder = self.videos.get_mut(&source.path).ok_or_else(|| {
                    ReelforgeError::render(format!(
                        "background video '{}' was not prepared",
                        source.path.display()
                    ))
                })?;
                let src_t = video_source_time(*time_s, decoder.info.duration_s);
                let image = decoder.decode_at(src_t)?;
                let (iw, ih) = (decoder.info.width, decoder.info.height);
                let pixels = self.stretch_to_scratch(image, iw, ih, surface.width(), surface.height())?;
                over_in_place(surface.data_mut(), pixels, 1.0)
            }
        }
    }

    fn stretched_image(&mut self, path: &Path, width: u32, height: u32) -> ReelforgeResult<Arc<Vec<u8>>> {
        let key = StretchKey {
            path: path.to_path_buf(),
            width,
            height,
        };
        if let Some(hit) = self.stretched.get(&key) {
            return Ok(hit.clone());
        }
        let img = self.images.get(path).ok_or_else(|| {
            ReelforgeError::render(format!(
                "background image '{}' was not prepared",
                path.display()
            ))
        })?;
        let (iw, ih) = (img.width, img.height);
        let image = premul_bytes_to_image(&img.rgba8_premul, iw, ih)?;
        let bytes = Arc::new(self.stretch_to_scratch(image, iw, ih, width, height)?.to_vec());
        self.stretched.insert(key, bytes.clone());
        Ok(bytes)
    }

    fn stretch_to_scratch(
        &mut self,
        image: vello_cpu::Image,
        src_w: u32,
        src_h: u32,
        width: u32,
        height: u32,
    ) -> ReelforgeResult<&[u8]> {
        if src_w == 0 || src_h == 0 {
            return Err(ReelforgeError::render("background media has zero size"));
        }
        let (w, h) = (to_u16(width)?, to_u16(height)?);
        let ctx = ensure_ctx(&mut self.ctx, w, h);
        ctx.set_transform(vello_cpu::kurbo::Affine::scale_non_uniform(
            f64::from(width) / f64::from(src_w),
            f64::from(height) / f64::from(src_h),
        ));
        ctx.set_paint(image);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(src_w),
            f64::from(src_h),
        ));
        ctx.flush();
        let pixmap = ensure_pixmap(&mut self.scratch, w, h);
        ctx.render_to_pixmap(pixmap);
        Ok(pixmap.data_as_u8_slice())
    }

    fn draw_text(&mut self, surface: &mut Surface, layer: &TextLayer) -> ReelforgeResult<()> {
        if layer.opacity <= 0.0 || !layer.font_size_px.is_finite() || layer.font_size_px <= 0.0 {
            return Ok(());
        }
        let Some(face) = self.fonts().resolve(&layer.font_families, layer.font_weight) else {
            return Ok(());
        };
        let font = self.font_data_for(&face);

        let mut placed = Vec::with_capacity(layer.lines.len());
        for line in &layer.lines {
            if line.text.trim().is_empty() {
                continue;
            }
            let shaped = self
                .text
                .layout_line(&face, &line.text, layer.font_size_px as f32)?;
            let w = f64::from(shaped.width);
            let x = layer.x
                + match layer.align {
                    TextAlign::Left => 0.0,
                    TextAlign::Center => -w / 2.0,
                    TextAlign::Right => -w,
                };
            let y = line.y - f64::from(shaped.height) / 2.0;
            placed.push(PlacedLine { shaped, x, y });
        }
        if placed.is_empty() {
            return Ok(());
        }

        let (width, height) = (surface.width(), surface.height());
        let opacity = layer.opacity.clamp(0.0, 1.0) as f32;
        if let Some(shadow) = layer.shadow.filter(|s| s.color.a > 0) {
            let glyphs =
                self.paint_glyphs(width, height, &font, &placed, shadow.color, (shadow.dx, shadow.dy))?;
            let sigma = (shadow.blur / 2.0) as f32;
            if sigma > 0.0 {
                let blurred = blur_rgba8_premul(glyphs, width, height, sigma)?;
                over_in_place(surface.data_mut(), &blurred, opacity)?;
            } else {
                over_in_place(surface.data_mut(), glyphs, opacity)?;
            }
        }
        let glyphs = self.paint_glyphs(width, height, &font, &placed, layer.color, (0.0, 0.0))?;
        over_in_place(surface.data_mut(), glyphs, opacity)
    }

    fn font_data_for(&mut self, face: &ResolvedFace) -> vello_cpu::peniko::FontData {
        self.font_data
            .entry(face.key)
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(face.data.as_ref().clone()),
                    face.index,
                )
            })
            .clone()
    }

    fn paint_glyphs(
        &mut self,
        width: u32,
        height: u32,
        font: &vello_cpu::peniko::FontData,
        placed: &[PlacedLine],
        color: Rgba8,
        offset: (f64, f64),
    ) -> ReelforgeResult<&[u8]> {
        let (w, h) = (to_u16(width)?, to_u16(height)?);
        let ctx = ensure_ctx(&mut self.ctx, w, h);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        for pl in placed {
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((
                pl.x + offset.0,
                pl.y + offset.1,
            )));
            for line in pl.shaped.layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        }
        ctx.flush();
        let pixmap = ensure_pixmap(&mut self.scratch, w, h);
        ctx.render_to_pixmap(pixmap);
        Ok(pixmap.data_as_u8_slice())
    }
}

impl Renderer for CpuRenderer {
    #[tracing::instrument(level = "debug", skip_all, fields(template_id = %template.id))]
    fn prepare(&mut self, template: &Template) -> ReelforgeResult<()> {
        let current = template.background_source().map(|(_, s)| s.path.clone());
        self.retain_background(current.as_deref());

        if let Some((kind, source)) = template.background_source() {
            self.prepare_background(kind, &source.path)?;
        }

        for el in &template.text_elements {
            let families = font_families(&el.style.font_family);
            let weight = resolve_font_weight(&el.style.font_weight);
            self.fonts().resolve(&families, weight);
        }
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip_all, fields(t = frame.time_s, layers = frame.layers.len()))]
    fn render(&mut self, surface: &mut Surface, frame: &FrameLayers) -> ReelforgeResult<()> {
        if surface.canvas() != frame.canvas {
            return Err(ReelforgeError::render(format!(
                "surface is {}x{} but frame is {}x{}",
                surface.width(),
                surface.height(),
                frame.canvas.width,
                frame.canvas.height
            )));
        }
        surface.clear();
        for layer in &frame.layers {
            match layer {
                Layer::Background(bg) => self.draw_background(surface, bg)?,
                Layer::Text(text) => self.draw_text(surface, text)?,
            }
        }
        Ok(())
    }
}

/// Paint a top-to-bottom gradient, sampling each row at its center.
fn fill_vertical_gradient(surface: &mut Surface, top: Rgba8, bottom: Rgba8) {
    let (w, h) = (surface.width() as usize, surface.height());
    let row_len = w * 4;
    for (y, row) in surface.data_mut().chunks_exact_mut(row_len).enumerate() {
        let t = (y as f64 + 0.5) / f64::from(h);
        let px = top.lerp(bottom, t).premultiplied().to_array();
        for dst in row.chunks_exact_mut(4) {
            dst.copy_from_slice(&px);
        }
    }
}

fn ensure_ctx(slot: &mut Option<vello_cpu::RenderContext>, w: u16, h: u16) -> &mut vello_cpu::RenderContext {
    let reusable = matches!(slot, Some(ctx) if ctx.width() == w && ctx.height() == h);
    if !reusable {
        *slot = None;
    }
    let ctx = slot.get_or_insert_with(|| vello_cpu::RenderContext::new(w, h));
    ctx.reset();
    ctx
}

fn ensure_pixmap(slot: &mut Option<vello_cpu::Pixmap>, w: u16, h: u16) -> &mut vello_cpu::Pixmap {
    let reusable = matches!(slot, Some(p) if p.width() == w && p.height() == h);
    if !reusable {
        *slot = None;
    }
    let pixmap = slot.get_or_insert_with(|| vello_cpu::Pixmap::new(w, h));
    pixmap.data_as_u8_slice_mut().fill(0);
    pixmap
}

fn to_u16(v: u32) -> ReelforgeResult<u16> {
    u16::try_from(v).map_err(|_| ReelforgeError::render(format!("dimension {v} exceeds u16")))
}

fn premul_bytes_to_image(bytes: &[u8], width: u32, height: u32) -> ReelforgeResult<vello_cpu::Image> {
    let (w, h) = (to_u16(width)?, to_u16(height)?);
    if bytes.len() != (width as usize) * (height as usize) * 4 {
        return Err(ReelforgeError::render("pixmap byte length mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
