use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::encode::sink::{AudioInputConfig, ExportArtifact, FrameSink, SinkConfig};
use crate::eval::evaluator::Evaluator;
use crate::eval::layers::Layer;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelforgeError, ReelforgeResult};
use crate::render::backend::Renderer;
use crate::render::surface::Surface;
use crate::template::model::Template;

/// Export failure, split by phase.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The surface, renderer or sink could not be set up. Nothing was produced.
    #[error("export setup failed: {0}")]
    Setup(#[source] ReelforgeError),
    /// A frame or the finalization failed. The partial artifact was discarded.
    #[error("export failed: {0}")]
    Runtime(#[source] ReelforgeError),
    /// The host aborted the export. The partial artifact was discarded.
    #[error("export aborted")]
    Aborted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportProgress {
    /// Frames completed so far.
    pub frame: u64,
    pub total: u64,
}

impl ExportProgress {
    /// Completed fraction in `[0, 1]`; exactly `1.0` once every frame is done.
    pub fn fraction(self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.frame as f64 / self.total as f64
    }

    pub fn is_complete(self) -> bool {
        self.frame >= self.total
    }
}

/// How [`export_video`] spaces frames in wall-clock time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FramePacing {
    /// Sleep one frame duration (`1/fps`) after each frame, like a real-time capture.
    #[default]
    FixedDelay,
    /// Render as fast as possible.
    Unthrottled,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ExportOptions {
    pub evaluator: Evaluator,
    pub pacing: FramePacing,
    /// Re-submit the previous pixels when a frame evaluates to the same layers.
    pub static_frame_elision: bool,
}

/// Cooperative cancellation flag shared between the host and a running export.
#[derive(Clone, Debug, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionState {
    Open,
    Finished,
    Discarded,
}

/// One frame-stepped export of a template snapshot.
///
/// Every exit path either finalizes the sink (`finish`) or discards it (`abort`, an error, or
/// dropping the session).
pub struct ExportSession<R, K>
where
    R: Renderer,
    K: FrameSink,
{
    template: Template,
    evaluator: Evaluator,
    renderer: R,
    sink: K,
    surface: Surface,
    fps: Fps,
    total: u64,
    next: u64,
    elide_static: bool,
    last_layers: Option<Vec<Layer>>,
    state: SessionState,
}

impl<R, K> ExportSession<R, K>
where
    R: Renderer,
    K: FrameSink,
{
    /// Validate the template, acquire the surface, prepare the renderer and start the sink.
    #[tracing::instrument(skip_all, fields(template_id = %template.id))]
    pub fn begin(
        template: &Template,
        mut renderer: R,
        mut sink: K,
        opts: &ExportOptions,
    ) -> Result<Self, ExportError> {
        let setup = (|| -> ReelforgeResult<(Fps, Surface)> {
            template.validate()?;
            let fps = template.settings.frame_rate()?;
            let surface = Surface::for_canvas(template.settings.canvas())?;
            renderer.prepare(template)?;
            sink.begin(sink_config(template, fps))?;
            Ok((fps, surface))
        })();

        let (fps, surface) = match setup {
            Ok(v) => v,
            Err(err) => {
                sink.discard();
                tracing::debug!(%err, "export setup failed");
                return Err(ExportError::Setup(err));
            }
        };

        let total = fps.frames_before(template.duration_s);
        tracing::debug!(total, fps = fps.as_f64(), "export started");
        Ok(Self {
            template: template.clone(),
            evaluator: opts.evaluator,
            renderer,
            sink,
            surface,
            fps,
            total,
            next: 0,
            elide_static: opts.static_frame_elision,
            last_layers: None,
            state: SessionState::Open,
        })
    }

    pub fn total_frames(&self) -> u64 {
        self.total
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn progress(&self) -> ExportProgress {
        ExportProgress {
            frame: self.next,
            total: self.total,
        }
    }

    /// Render and submit the next frame. Returns `Ok(None)` once every frame has been submitted.
    pub fn step(&mut self) -> Result<Option<ExportProgress>, ExportError> {
        if self.state != SessionState::Open {
            return Err(ExportError::Runtime(ReelforgeError::encode(
                "export session is closed",
            )));
        }
        if self.next >= self.total {
            return Ok(None);
        }

        let idx = self.next;
        match self.render_frame(idx) {
            Ok(()) => {
                self.next += 1;
                Ok(Some(self.progress()))
            }
            Err(err) => {
                tracing::debug!(frame = idx, %err, "export frame failed");
                self.discard_sink();
                Err(ExportError::Runtime(err))
            }
        }
    }

    /// Finalize the sink after the last frame.
    pub fn finish(mut self) -> Result<ExportArtifact, ExportError> {
        if self.state != SessionState::Open {
            return Err(ExportError::Runtime(ReelforgeError::encode(
                "export session is closed",
            )));
        }
        if self.next < self.total {
            self.discard_sink();
            return Err(ExportError::Runtime(ReelforgeError::encode(format!(
                "export finished after {} of {} frames",
                self.next, self.total
            ))));
        }

        let artifact = match self.sink.end() {
            Ok(a) => a,
            Err(err) => {
                self.discard_sink();
                return Err(ExportError::Runtime(err));
            }
        };
        if artifact.size_bytes == 0 {
            self.discard_sink();
            return Err(ExportError::Runtime(ReelforgeError::encode(
                "export produced an empty artifact",
            )));
        }

        self.state = SessionState::Finished;
        tracing::debug!(
            file = %artifact.file_name,
            size_bytes = artifact.size_bytes,
            "export finished"
        );
        Ok(artifact)
    }

    /// Stop early and discard the partial artifact.
    pub fn abort(mut self) {
        tracing::debug!(frame = self.next, total = self.total, "export aborted");
        self.discard_sink();
    }

    fn render_frame(&mut self, idx: u64) -> ReelforgeResult<()> {
        let t = self.fps.frames_to_secs(idx);
        let frame = self.evaluator.eval_frame(&self.template, t);

        let reuse = self.elide_static
            && !frame.has_time_varying_media()
            && self.last_layers.as_deref() == Some(frame.layers.as_slice());
        if reuse {
            tracing::trace!(frame = idx, "static frame re-submitted");
        } else {
            self.renderer.render(&mut self.surface, &frame)?;
            if self.elide_static {
                self.last_layers = Some(frame.layers);
            }
        }

        self.sink.push_frame(FrameIndex(idx), &self.surface)
    }

    fn discard_sink(&mut self) {
        if self.state == SessionState::Open {
            self.sink.discard();
            self.state = SessionState::Discarded;
        }
    }
}

impl<R, K> Drop for ExportSession<R, K>
where
    R: Renderer,
    K: FrameSink,
{
    fn drop(&mut self) {
        self.discard_sink();
    }
}

fn sink_config(template: &Template, fps: Fps) -> SinkConfig {
    SinkConfig {
        name: template.name.clone(),
        width: template.settings.width,
        height: template.settings.height,
        fps,
        duration_s: template.duration_s,
        audio: template
            .audio_source()
            .map(|(handle, volume)| AudioInputConfig {
                path: handle.path.clone(),
                volume,
            }),
    }
}

/// Export `template` frame by frame into `sink`.
///
/// `abort` is checked before every frame and `on_progress` is called after every frame; the last
/// call reports a fraction of exactly `1.0`.
#[tracing::instrument(skip_all, fields(template_id = %template.id))]
pub fn export_video<R, K, F>(
    template: &Template,
    renderer: R,
    sink: K,
    opts: &ExportOptions,
    abort: &AbortHandle,
    mut on_progress: F,
) -> Result<ExportArtifact, ExportError>
where
    R: Renderer,
    K: FrameSink,
    F: FnMut(ExportProgress),
{
    let mut session = ExportSession::begin(template, renderer, sink, opts)?;
    let delay = session.fps().frame_duration();

    loop {
        if abort.is_aborted() {
            session.abort();
            return Err(ExportError::Aborted);
        }
        let Some(progress) = session.step()? else {
            break;
        };
        on_progress(progress);
        if opts.pacing == FramePacing::FixedDelay && !progress.is_complete() {
            std::thread::sleep(delay);
        }
    }

    session.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/driver/export.rs"]
mod tests;
