use std::time::Duration;

use crate::driver::clock::Clock;
use crate::driver::schedule::{FrameScheduler, FrameTicket};
use crate::eval::evaluator::Evaluator;
use crate::foundation::error::ReelforgeResult;
use crate::render::backend::Renderer;
use crate::render::surface::Surface;
use crate::template::model::Template;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PreviewState {
    /// Stopped or paused; `time_s` is retained.
    #[default]
    Idle,
    /// A frame callback is scheduled.
    Running,
}

/// Real-time playback of a template onto one surface.
///
/// The host forwards every delivered [`FrameTicket`] to [`PreviewDriver::on_frame`]. While running
/// exactly one ticket is outstanding; `pause` and `reset` cancel it before returning.
#[derive(Debug)]
pub struct PreviewDriver<C, S>
where
    C: Clock,
    S: FrameScheduler,
{
    clock: C,
    scheduler: S,
    evaluator: Evaluator,
    state: PreviewState,
    t: f64,
    // `clock.now() - reference == t` while running.
    reference: Duration,
    pending: Option<FrameTicket>,
}

impl<C, S> PreviewDriver<C, S>
where
    C: Clock,
    S: FrameScheduler,
{
    pub fn new(clock: C, scheduler: S, evaluator: Evaluator) -> Self {
        Self {
            clock,
            scheduler,
            evaluator,
            state: PreviewState::Idle,
            t: 0.0,
            reference: Duration::ZERO,
            pending: None,
        }
    }

    pub fn state(&self) -> PreviewState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PreviewState::Running
    }

    pub fn time_s(&self) -> f64 {
        self.t
    }

    /// `time_s / duration`, in `[0, 1]`.
    pub fn progress(&self, template: &Template) -> f64 {
        if template.duration_s > 0.0 {
            (self.t / template.duration_s).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Begin or resume playback from `time_s`. At or past the end, playback restarts from 0.
    pub fn start(&mut self, template: &Template) {
        if self.is_running() {
            return;
        }
        if self.t >= template.duration_s {
            self.t = 0.0;
        }
        let now = self.clock.now();
        self.reference = now.saturating_sub(Duration::from_secs_f64(self.t.max(0.0)));
        self.pending = Some(self.scheduler.request_frame());
        self.state = PreviewState::Running;
        tracing::debug!(t = self.t, "preview started");
    }

    /// Stop at the current time.
    pub fn pause(&mut self) {
        if !self.is_running() {
            return;
        }
        self.cancel_pending();
        self.state = PreviewState::Idle;
        tracing::debug!(t = self.t, "preview paused");
    }

    pub fn toggle(&mut self, template: &Template) {
        match self.state {
            PreviewState::Running => self.pause(),
            PreviewState::Idle => self.start(template),
        }
    }

    /// Stop and rewind to 0.
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.state = PreviewState::Idle;
        self.t = 0.0;
        tracing::debug!("preview reset");
    }

    /// Handle a delivered frame callback.
    ///
    /// Returns `Ok(false)` without drawing when `ticket` is stale. On a render error the driver
    /// stops and the error is returned.
    pub fn on_frame<R>(
        &mut self,
        ticket: FrameTicket,
        template: &Template,
        renderer: &mut R,
        surface: &mut Surface,
    ) -> ReelforgeResult<bool>
    where
        R: Renderer + ?Sized,
    {
        if !self.is_running() || self.pending != Some(ticket) {
            tracing::trace!(ticket = ticket.0, "stale preview frame ignored");
            return Ok(false);
        }
        self.pending = None;

        let elapsed = self.clock.now().saturating_sub(self.reference).as_secs_f64();
        let finished = elapsed >= template.duration_s;
        self.t = if finished {
            template.duration_s
        } else {
            elapsed
        };

        let frame = self.evaluator.eval_frame(template, self.t);
        if let Err(err) = renderer.render(surface, &frame) {
            self.state = PreviewState::Idle;
            tracing::debug!(t = self.t, %err, "preview stopped on render error");
            return Err(err);
        }

        if finished {
            self.state = PreviewState::Idle;
            tracing::debug!(t = self.t, "preview finished");
        } else {
            self.pending = Some(self.scheduler.request_frame());
        }
        Ok(true)
    }

    /// Draw the frame at `time_s` without touching the playback state.
    pub fn redraw<R>(
        &self,
        template: &Template,
        renderer: &mut R,
        surface: &mut Surface,
    ) -> ReelforgeResult<()>
    where
        R: Renderer + ?Sized,
    {
        let frame = self.evaluator.eval_frame(template, self.t);
        renderer.render(surface, &frame)
    }

    fn cancel_pending(&mut self) {
        if let Some(ticket) = self.pending.take() {
            self.scheduler.cancel_frame(ticket);
        }
    }
}

impl<C, S> Drop for PreviewDriver<C, S>
where
    C: Clock,
    S: FrameScheduler,
{
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/driver/preview.rs"]
mod tests;
