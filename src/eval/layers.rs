use crate::foundation::core::{Canvas, Rgba8};
use crate::template::model::{MediaHandle, TextAlign};

/// Everything the renderer needs to paint one frame, in painter's order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameLayers {
    pub time_s: f64,
    pub canvas: Canvas,
    pub layers: Vec<Layer>,
}

impl FrameLayers {
    /// `true` when any layer depends on the frame time beyond its evaluated fields.
    pub fn has_time_varying_media(&self) -> bool {
        self.layers
            .iter()
            .any(|l| matches!(l, Layer::Background(BackgroundLayer::Video { .. })))
    }

    pub fn text_layers(&self) -> impl Iterator<Item = &TextLayer> {
        self.layers.iter().filter_map(|l| match l {
            Layer::Text(t) => Some(t),
            Layer::Background(_) => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum Layer {
    Background(BackgroundLayer),
    Text(TextLayer),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum BackgroundLayer {
    /// Vertical gradient from `top` to `bottom`.
    Gradient { top: Rgba8, bottom: Rgba8 },
    /// Still image stretched to the frame.
    Image { source: MediaHandle },
    /// Video sampled at `time_s`, stretched to the frame.
    Video { source: MediaHandle, time_s: f64 },
}

/// A text element resolved for one frame.
///
/// Pixel values are in output-frame coordinates. `font_size_px` and `line_height` already
/// include `scale`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextLayer {
    pub element_id: String,
    /// Horizontal anchor.
    pub x: f64,
    /// Vertical center of the line block, including `y_offset`.
    pub y: f64,
    pub font_size_px: f64,
    pub font_families: Vec<String>,
    pub font_weight: u16,
    pub color: Rgba8,
    pub align: TextAlign,
    pub opacity: f64,
    pub scale: f64,
    pub y_offset: f64,
    pub line_height: f64,
    pub shadow: Option<Shadow>,
    pub lines: Vec<TextLine>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextLine {
    pub text: String,
    /// Vertical center of the line.
    pub y: f64,
}

/// Resolved drop shadow (pixels).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Shadow {
    pub dx: f64,
    pub dy: f64,
    pub blur: f64,
    pub color: Rgba8,
}

impl Shadow {
    /// `2px 2px 4px rgba(0,0,0,0.8)`, used when a shadow spec does not parse.
    pub const FALLBACK: Self = Self {
        dx: 2.0,
        dy: 2.0,
        blur: 4.0,
        color: Rgba8::rgba(0, 0, 0, 204),
    };
}
