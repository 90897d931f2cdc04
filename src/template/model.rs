use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelforgeError, ReelforgeResult};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A complete description of one short video.
///
/// A template is plain data owned by the host. The evaluator and the frame drivers only ever read
/// it, one snapshot per frame, so the host may mutate it freely between frames.
pub struct Template {
    /// Template identifier.
    pub id: String,
    /// Display name; also used to derive the exported file name.
    pub name: String,
    /// Total duration in seconds (must be finite and > 0).
    #[serde(rename = "duration")]
    pub duration_s: f64,
    /// Background media reference. `None` or a reference without a source draws the default
    /// gradient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_media: Option<BackgroundMedia>,
    /// Text overlays in painter's order.
    #[serde(default)]
    pub text_elements: Vec<TextElement>,
    /// Optional background audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_track: Option<AudioTrack>,
    /// Output dimensions and frame rate.
    pub settings: Settings,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Host-side handle to an uploaded media file.
pub struct MediaHandle {
    /// Filesystem path of the media.
    pub path: PathBuf,
    /// MIME type reported at upload time, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
}

impl MediaHandle {
    /// Build a handle for `path` without MIME information.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mime: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Kind of background media.
pub enum MediaKind {
    /// Still image, stretched to the frame.
    Image,
    /// Video, sampled at the frame time.
    Video,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Background media reference.
pub struct BackgroundMedia {
    /// Media kind.
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Uploaded media; `None` means "no media selected".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<MediaHandle>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Background audio reference.
pub struct AudioTrack {
    /// Uploaded audio; `None` means "no audio selected".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<MediaHandle>,
    /// Playback volume in `[0, 1]`.
    pub volume: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Output settings.
pub struct Settings {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Target frames per second.
    pub fps: u32,
}

impl Settings {
    /// Output canvas dimensions.
    pub fn canvas(self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Frame rate as a rational [`Fps`].
    pub fn frame_rate(self) -> ReelforgeResult<Fps> {
        Fps::whole(self.fps)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// One timed, styled, optionally animated text overlay.
pub struct TextElement {
    /// Identifier, unique within a template.
    pub id: String,
    /// Text content; `\n` separates lines.
    pub text: String,
    /// Anchor position in percent of the frame.
    pub position: Position,
    /// Visual style.
    pub style: TextStyle,
    /// Entrance animation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
    /// Visibility window.
    pub timing: Timing,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Position in percent (0–100) of the frame width/height.
pub struct Position {
    /// Horizontal anchor.
    pub x: f64,
    /// Vertical anchor (line block center).
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Text style as authored (CSS-like strings are resolved at evaluation time).
pub struct TextStyle {
    /// Font size in pixels.
    pub font_size: f64,
    /// CSS font weight (`normal`, `bold`, `100`..`900`).
    pub font_weight: String,
    /// CSS color string.
    pub color: String,
    /// CSS font family list, e.g. `Arial, sans-serif`.
    pub font_family: String,
    /// Horizontal alignment relative to the anchor.
    pub text_align: TextAlign,
    /// Optional CSS `text-shadow` spec.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_shadow: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Horizontal text alignment.
pub enum TextAlign {
    /// Text starts at the anchor.
    Left,
    /// Text is centered on the anchor.
    #[default]
    Center,
    /// Text ends at the anchor.
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Entrance animation.
pub struct Animation {
    /// Animation kind.
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    /// Delay in seconds (see `EvalOptions::honor_animation_delay`).
    #[serde(default)]
    pub delay: f64,
    /// Ramp duration in seconds (finite and > 0). The evaluator ramps over 1 s when handed an
    /// unvalidated non-positive duration.
    pub duration: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Entrance animation kinds.
pub enum AnimationKind {
    /// Opacity ramps 0 → 1.
    FadeIn,
    /// Opacity ramps 0 → 1 while the text slides up 50 px into place.
    SlideIn,
    /// Opacity ramps 0 → 1 while scale ramps 0.5 → 1.
    ScaleIn,
    /// No animation.
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Inclusive visibility window in seconds.
pub struct Timing {
    /// First visible time.
    pub start_time: f64,
    /// Last visible time.
    pub end_time: f64,
}

impl Timing {
    /// `true` when `start_time <= t <= end_time`.
    pub fn contains(self, t: f64) -> bool {
        self.start_time <= t && t <= self.end_time
    }
}

impl Default for Template {
    fn default() -> Self {
        Self {
            id: "template-1".to_string(),
            name: "Quote Video Template".to_string(),
            duration_s: 10.0,
            background_media: Some(BackgroundMedia {
                kind: MediaKind::Image,
                source: None,
            }),
            text_elements: vec![TextElement {
                id: "quote-text".to_string(),
                text: "Your inspirational quote here".to_string(),
                position: Position { x: 50.0, y: 50.0 },
                style: TextStyle {
                    font_size: 32.0,
                    font_weight: "bold".to_string(),
                    ..TextStyle::default()
                },
                animation: Some(Animation {
                    kind: AnimationKind::FadeIn,
                    delay: 1.0,
                    duration: 1.0,
                }),
                timing: Timing {
                    start_time: 1.0,
                    end_time: 9.0,
                },
            }],
            audio_track: Some(AudioTrack {
                source: None,
                volume: 0.7,
            }),
            settings: Settings {
                width: 1080,
                height: 1920,
                fps: 30,
            },
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 24.0,
            font_weight: "normal".to_string(),
            color: "#ffffff".to_string(),
            font_family: "Arial, sans-serif".to_string(),
            text_align: TextAlign::Center,
            text_shadow: Some("2px 2px 4px rgba(0,0,0,0.8)".to_string()),
        }
    }
}

impl TextElement {
    /// A new centered element visible for the first ten seconds with a one second fade-in.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: "New text element".to_string(),
            position: Position { x: 50.0, y: 50.0 },
            style: TextStyle::default(),
            animation: Some(Animation {
                kind: AnimationKind::FadeIn,
                delay: 0.0,
                duration: 1.0,
            }),
            timing: Timing {
                start_time: 0.0,
                end_time: 10.0,
            },
        }
    }

    /// Validate element-local invariants.
    pub fn validate(&self) -> ReelforgeResult<()> {
        if self.id.trim().is_empty() {
            return Err(ReelforgeError::validation("text element id must be non-empty"));
        }
        if !self.position.x.is_finite() || !self.position.y.is_finite() {
            return Err(ReelforgeError::validation(format!(
                "text element '{}' position must be finite",
                self.id
            )));
        }
        if !self.style.font_size.is_finite() || self.style.font_size <= 0.0 {
            return Err(ReelforgeError::validation(format!(
                "text element '{}' font size must be finite and > 0",
                self.id
            )));
        }
        let Timing {
            start_time,
            end_time,
        } = self.timing;
        if !start_time.is_finite() || !end_time.is_finite() {
            return Err(ReelforgeError::validation(format!(
                "text element '{}' timing must be finite",
                self.id
            )));
        }
        if start_time > end_time {
            return Err(ReelforgeError::validation(format!(
                "text element '{}' startTime must be <= endTime",
                self.id
            )));
        }
        if let Some(anim) = &self.animation
            && (!anim.delay.is_finite() || anim.delay < 0.0)
        {
            return Err(ReelforgeError::validation(format!(
                "text element '{}' animation delay must be finite and >= 0",
                self.id
            )));
        }
        if let Some(anim) = &self.animation
            && (!anim.duration.is_finite() || anim.duration <= 0.0)
        {
            return Err(ReelforgeError::validation(format!(
                "text element '{}' animation duration must be finite and > 0",
                self.id
            )));
        }
        Ok(())
    }
}

impl Template {
    /// Validate template invariants.
    pub fn validate(&self) -> ReelforgeResult<()> {
        if !self.duration_s.is_finite() || self.duration_s <= 0.0 {
            return Err(ReelforgeError::validation(
                "duration must be finite and > 0 seconds",
            ));
        }
        if self.settings.width == 0 || self.settings.height == 0 {
            return Err(ReelforgeError::validation("width/height must be > 0"));
        }
        if self.settings.fps == 0 {
            return Err(ReelforgeError::validation("fps must be > 0"));
        }
        if let Some(audio) = &self.audio_track {
            validate_volume(audio.volume)?;
        }

        let mut seen = BTreeSet::new();
        for el in &self.text_elements {
            el.validate()?;
            if !seen.insert(el.id.as_str()) {
                return Err(ReelforgeError::validation(format!(
                    "duplicate text element id '{}'",
                    el.id
                )));
            }
        }
        Ok(())
    }

    /// Background media source, if one is selected.
    pub fn background_source(&self) -> Option<(MediaKind, &MediaHandle)> {
        let bg = self.background_media.as_ref()?;
        bg.source.as_ref().map(|s| (bg.kind, s))
    }

    /// Audio source and volume, if a source is selected.
    pub fn audio_source(&self) -> Option<(&MediaHandle, f64)> {
        let audio = self.audio_track.as_ref()?;
        audio.source.as_ref().map(|s| (s, audio.volume))
    }

    /// Look up a text element by id.
    pub fn text_element(&self, id: &str) -> Option<&TextElement> {
        self.text_elements.iter().find(|e| e.id == id)
    }

    /// Parse a template from JSON.
    pub fn from_json_str(s: &str) -> ReelforgeResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> ReelforgeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub(crate) fn validate_volume(volume: f64) -> ReelforgeResult<()> {
    if !volume.is_finite() || !(0.0..=1.0).contains(&volume) {
        return Err(ReelforgeError::validation("audio volume must be in [0, 1]"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/template/model.rs"]
mod tests;
