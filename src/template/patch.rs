use crate::foundation::error::{ReelforgeError, ReelforgeResult};
use crate::template::model::{
    Animation, AudioTrack, BackgroundMedia, MediaHandle, MediaKind, Position, Template,
    TextElement, TextStyle, Timing, validate_volume,
};

#[derive(Clone, Debug, Default, PartialEq)]
/// Partial update for a [`TextElement`]. `None` fields are left untouched.
pub struct TextElementPatch {
    pub text: Option<String>,
    pub position: Option<Position>,
    pub style: Option<TextStyle>,
    /// `Some(None)` removes the animation.
    pub animation: Option<Option<Animation>>,
    pub timing: Option<Timing>,
}

impl TextElementPatch {
    fn apply_to(&self, el: &mut TextElement) {
        if let Some(text) = &self.text {
            el.text.clone_from(text);
        }
        if let Some(position) = self.position {
            el.position = position;
        }
        if let Some(style) = &self.style {
            el.style.clone_from(style);
        }
        if let Some(animation) = self.animation {
            el.animation = animation;
        }
        if let Some(timing) = self.timing {
            el.timing = timing;
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Partial update for template-level fields.
pub struct TemplatePatch {
    pub name: Option<String>,
    pub duration_s: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    /// `Some(None)` removes the background reference.
    pub background_media: Option<Option<BackgroundMedia>>,
    /// `Some(None)` removes the audio reference.
    pub audio_track: Option<Option<AudioTrack>>,
    /// Replaces the whole element list.
    pub text_elements: Option<Vec<TextElement>>,
}

impl Template {
    /// Append `element`; its id must be unique.
    pub fn add_text_element(&mut self, element: TextElement) -> ReelforgeResult<()> {
        element.validate()?;
        if self.text_element(&element.id).is_some() {
            return Err(ReelforgeError::validation(format!(
                "duplicate text element id '{}'",
                element.id
            )));
        }
        self.text_elements.push(element);
        Ok(())
    }

    /// Apply `patch` to the element with `id`. On error the element is unchanged.
    pub fn update_text_element(&mut self, id: &str, patch: &TextElementPatch) -> ReelforgeResult<()> {
        let Some(el) = self.text_elements.iter_mut().find(|e| e.id == id) else {
            return Err(ReelforgeError::validation(format!(
                "unknown text element id '{id}'"
            )));
        };
        let mut next = el.clone();
        patch.apply_to(&mut next);
        next.validate()?;
        *el = next;
        Ok(())
    }

    /// Remove and return the element with `id`.
    pub fn remove_text_element(&mut self, id: &str) -> ReelforgeResult<TextElement> {
        let idx = self
            .text_elements
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| ReelforgeError::validation(format!("unknown text element id '{id}'")))?;
        Ok(self.text_elements.remove(idx))
    }

    /// Apply template-level changes. On error the template is unchanged.
    pub fn apply_patch(&mut self, patch: &TemplatePatch) -> ReelforgeResult<()> {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.name.clone_from(name);
        }
        if let Some(d) = patch.duration_s {
            next.duration_s = d;
        }
        if let Some(w) = patch.width {
            next.settings.width = w;
        }
        if let Some(h) = patch.height {
            next.settings.height = h;
        }
        if let Some(fps) = patch.fps {
            next.settings.fps = fps;
        }
        if let Some(bg) = &patch.background_media {
            next.background_media.clone_from(bg);
        }
        if let Some(audio) = &patch.audio_track {
            next.audio_track.clone_from(audio);
        }
        if let Some(elements) = &patch.text_elements {
            next.text_elements.clone_from(elements);
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn set_background(&mut self, kind: MediaKind, source: MediaHandle) {
        self.background_media = Some(BackgroundMedia {
            kind,
            source: Some(source),
        });
    }

    /// Drop the background source; rendering falls back to the gradient.
    pub fn clear_background(&mut self) {
        self.background_media = Some(BackgroundMedia {
            kind: MediaKind::Image,
            source: None,
        });
    }

    pub fn set_audio_source(&mut self, source: MediaHandle) {
        match &mut self.audio_track {
            Some(track) => track.source = Some(source),
            None => {
                self.audio_track = Some(AudioTrack {
                    source: Some(source),
                    volume: 1.0,
                })
            }
        }
    }

    pub fn clear_audio_source(&mut self) {
        if let Some(track) = &mut self.audio_track {
            track.source = None;
        }
    }

    pub fn set_audio_volume(&mut self, volume: f64) -> ReelforgeResult<()> {
        validate_volume(volume)?;
        match &mut self.audio_track {
            Some(track) => track.volume = volume,
            None => {
                self.audio_track = Some(AudioTrack {
                    source: None,
                    volume,
                })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/patch.rs"]
mod tests;
