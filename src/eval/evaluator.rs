use crate::eval::layers::{BackgroundLayer, FrameLayers, Layer, TextLayer, TextLine};
use crate::eval::style::{font_families, resolve_color, resolve_font_weight, resolve_shadow};
use crate::foundation::core::Rgba8;
use crate::template::model::{Animation, AnimationKind, MediaKind, Template, TextElement};

pub const GRADIENT_TOP: Rgba8 = Rgba8::rgb(0x66, 0x7e, 0xea);
pub const GRADIENT_BOTTOM: Rgba8 = Rgba8::rgb(0x76, 0x4b, 0xa2);

/// Distance in pixels a `slide-in` element travels.
pub const SLIDE_IN_DISTANCE_PX: f64 = 50.0;
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvalOptions {
    /// Start each entrance ramp at `startTime + animation.delay` instead of `startTime`.
    pub honor_animation_delay: bool,
}

/// Stateless timeline evaluator.
///
/// `eval_frame` is a pure function of the template snapshot, the time and the options, so the
/// same evaluator can be shared by preview and export.
#[derive(Clone, Copy, Debug, Default)]
pub struct Evaluator {
    opts: EvalOptions,
}

impl Evaluator {
    pub fn new(opts: EvalOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> EvalOptions {
        self.opts
    }

    #[tracing::instrument(level = "trace", skip(self, template), fields(template_id = %template.id))]
    pub fn eval_frame(&self, template: &Template, t: f64) -> FrameLayers {
        let canvas = template.settings.canvas();
        let mut layers = Vec::with_capacity(template.text_elements.len() + 1);
        layers.push(Layer::Background(background_layer(template, t)));

        let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
        for el in &template.text_elements {
            if !el.timing.contains(t) {
                continue;
            }
            layers.push(Layer::Text(self.text_layer(el, t, w, h)));
        }

        FrameLayers {
            time_s: t,
            canvas,
            layers,
        }
    }

    fn text_layer(&self, el: &TextElement, t: f64, width: f64, height: f64) -> TextLayer {
        let p = self.progress(el, t);
        let motion = Motion::at(el.animation.map(|a| a.kind), p);

        let x = el.position.x / 100.0 * width;
        let y = el.position.y / 100.0 * height + motion.y_offset;
        let font_size_px = el.style.font_size * motion.scale;
        let line_height = font_size_px * LINE_HEIGHT_FACTOR;

        let texts: Vec<&str> = el.text.split('\n').collect();
        let center = (texts.len() as f64 - 1.0) / 2.0;
        let lines = texts
            .iter()
            .enumerate()
            .map(|(i, text)| TextLine {
                text: (*text).to_string(),
                y: y + (i as f64 - center) * line_height,
            })
            .collect();

        TextLayer {
            element_id: el.id.clone(),
            x,
            y,
            font_size_px,
            font_families: font_families(&el.style.font_family),
            font_weight: resolve_font_weight(&el.style.font_weight),
            color: resolve_color(&el.id, &el.style.color),
            align: el.style.text_align,
            opacity: motion.opacity,
            scale: motion.scale,
            y_offset: motion.y_offset,
            line_height,
            shadow: resolve_shadow(el.style.text_shadow.as_deref()),
            lines,
        }
    }

    fn progress(&self, el: &TextElement, t: f64) -> f64 {
        let anim = el.animation.as_ref();
        let duration = anim
            .map(|a| a.duration)
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(1.0);
        let ramp_start = el.timing.start_time + self.delay(anim);
        ((t - ramp_start) / duration).clamp(0.0, 1.0)
    }

    fn delay(&self, anim: Option<&Animation>) -> f64 {
        match anim {
            Some(a) if self.opts.honor_animation_delay && a.delay.is_finite() => a.delay.max(0.0),
            _ => 0.0,
        }
    }
}

/// Evaluate `template` at `t` with default options.
pub fn evaluate(template: &Template, t: f64) -> FrameLayers {
    Evaluator::default().eval_frame(template, t)
}

fn background_layer(template: &Template, t: f64) -> BackgroundLayer {
    match template.background_source() {
        Some((MediaKind::Image, source)) => BackgroundLayer::Image {
            source: source.clone(),
        },
        Some((MediaKind::Video, source)) => BackgroundLayer::Video {
            source: source.clone(),
            time_s: t,
        },
        None => BackgroundLayer::Gradient {
            top: GRADIENT_TOP,
            bottom: GRADIENT_BOTTOM,
        },
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Motion {
    opacity: f64,
    scale: f64,
    y_offset: f64,
}

impl Motion {
    fn at(kind: Option<AnimationKind>, p: f64) -> Self {
        match kind {
            Some(AnimationKind::FadeIn) => Self {
                opacity: p,
                scale: 1.0,
                y_offset: 0.0,
            },
            Some(AnimationKind::ScaleIn) => Self {
                opacity: p,
                scale: 0.5 + 0.5 * p,
                y_offset: 0.0,
            },
            Some(AnimationKind::SlideIn) => Self {
                opacity: p,
                scale: 1.0,
                y_offset: (1.0 - p) * SLIDE_IN_DISTANCE_PX,
            },
            Some(AnimationKind::None) | None => Self {
                opacity: 1.0,
                scale: 1.0,
                y_offset: 0.0,
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/evaluator.rs"]
mod tests;
