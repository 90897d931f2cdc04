use std::path::PathBuf;

use crate::encode::naming::{artifact_file_name, unix_millis_now};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelforgeError, ReelforgeResult};
use crate::render::surface::Surface;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Template name, used to derive artifact names.
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// Template duration in seconds.
    pub duration_s: f64,
    /// Background audio to mux, if any.
    pub audio: Option<AudioInputConfig>,
}

/// Background audio handed to sinks that can mux it.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInputConfig {
    pub path: PathBuf,
    /// Linear gain in `[0, 1]`.
    pub volume: f64,
}

/// The finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// File on disk, when the sink writes one.
    pub path: Option<PathBuf>,
    pub file_name: String,
    pub media_type: String,
    pub size_bytes: u64,
}

/// Consumer of rendered frames during export.
///
/// `push_frame` is called in strictly increasing `FrameIndex` order between `begin` and `end`.
/// After an error, or when the export is abandoned, the driver calls `discard` instead of `end`.
pub trait FrameSink: Send {
    fn begin(&mut self, cfg: SinkConfig) -> ReelforgeResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, frame: &Surface) -> ReelforgeResult<()>;
    /// Finalize and describe the artifact.
    fn end(&mut self) -> ReelforgeResult<ExportArtifact>;
    /// Drop any partial output. Must be safe to call in any state.
    fn discard(&mut self);
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn begin(&mut self, cfg: SinkConfig) -> ReelforgeResult<()> {
        (**self).begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Surface) -> ReelforgeResult<()> {
        (**self).push_frame(idx, frame)
    }

    fn end(&mut self) -> ReelforgeResult<ExportArtifact> {
        (**self).end()
    }

    fn discard(&mut self) {
        (**self).discard()
    }
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn begin(&mut self, cfg: SinkConfig) -> ReelforgeResult<()> {
        (**self).begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Surface) -> ReelforgeResult<()> {
        (**self).push_frame(idx, frame)
    }

    fn end(&mut self) -> ReelforgeResult<ExportArtifact> {
        (**self).end()
    }

    fn discard(&mut self) {
        (**self).discard()
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    retain_frames: bool,
    frames: Vec<(FrameIndex, Surface)>,
    indices: Vec<FrameIndex>,
    bytes: u64,
    discarded: bool,
}

impl Default for InMemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySink {
    /// Sink that keeps a copy of every frame.
    pub fn new() -> Self {
        Self {
            cfg: None,
            retain_frames: true,
            frames: Vec::new(),
            indices: Vec::new(),
            bytes: 0,
            discarded: false,
        }
    }

    /// Sink that records frame indices and byte counts only.
    pub fn counting() -> Self {
        Self {
            retain_frames: false,
            ..Self::new()
        }
    }

    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    pub fn frames(&self) -> &[(FrameIndex, Surface)] {
        &self.frames
    }

    pub fn indices(&self) -> &[FrameIndex] {
        &self.indices
    }

    pub fn was_discarded(&self) -> bool {
        self.discarded
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelforgeResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.indices.clear();
        self.bytes = 0;
        self.discarded = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Surface) -> ReelforgeResult<()> {
        if self.cfg.is_none() {
            return Err(ReelforgeError::encode("in-memory sink not started"));
        }
        if let Some(last) = self.indices.last()
            && idx <= *last
        {
            return Err(ReelforgeError::encode("out-of-order frame index"));
        }
        self.indices.push(idx);
        self.bytes += frame.data().len() as u64;
        if self.retain_frames {
            self.frames.push((idx, frame.clone()));
        }
        Ok(())
    }

    fn end(&mut self) -> ReelforgeResult<ExportArtifact> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelforgeError::encode("in-memory sink not started"))?;
        Ok(ExportArtifact {
            path: None,
            file_name: artifact_file_name(&cfg.name, unix_millis_now(), "rgba"),
            media_type: "application/octet-stream".to_string(),
            size_bytes: self.bytes,
        })
    }

    fn discard(&mut self) {
        self.frames.clear();
        self.indices.clear();
        self.bytes = 0;
        self.discarded = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
