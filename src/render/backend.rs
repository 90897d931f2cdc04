use crate::eval::layers::FrameLayers;
use crate::foundation::error::ReelforgeResult;
use crate::render::surface::Surface;
use crate::template::model::Template;

/// Rasterizes evaluated frames onto a [`Surface`].
///
/// Implementations must be deterministic: identical layers produce identical pixels.
pub trait Renderer {
    /// Decode media and resolve fonts used by `template` ahead of a frame loop.
    fn prepare(&mut self, template: &Template) -> ReelforgeResult<()>;

    /// Clear `surface` and paint `frame` onto it.
    fn render(&mut self, surface: &mut Surface, frame: &FrameLayers) -> ReelforgeResult<()>;
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn prepare(&mut self, template: &Template) -> ReelforgeResult<()> {
        (**self).prepare(template)
    }

    fn render(&mut self, surface: &mut Surface, frame: &FrameLayers) -> ReelforgeResult<()> {
        (**self).render(surface, frame)
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn prepare(&mut self, template: &Template) -> ReelforgeResult<()> {
        (**self).prepare(template)
    }

    fn render(&mut self, surface: &mut Surface, frame: &FrameLayers) -> ReelforgeResult<()> {
        (**self).render(surface, frame)
    }
}
