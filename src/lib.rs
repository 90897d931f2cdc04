//! Reelforge turns short-video templates into frames and exported video files.
//!
//! A [`Template`] is plain data: a background (gradient, image or video), timed and animated text
//! overlays, optional background audio, and output settings. The engine is split into:
//!
//! - an [`Evaluator`] that maps `(template, t)` to an ordered list of [`Layer`]s with no I/O
//! - a [`Renderer`] ([`CpuRenderer`]) that paints those layers onto a [`Surface`]
//! - a [`PreviewDriver`] that plays a template in real time from host display-refresh callbacks
//! - [`export_video`] / [`ExportSession`], which step through every frame into a [`FrameSink`]
//!   such as [`FfmpegSink`]
#![forbid(unsafe_code)]

mod assets;
mod foundation;

pub(crate) mod driver;
pub(crate) mod encode;
pub(crate) mod eval;
pub(crate) mod render;
pub(crate) mod template;

pub use crate::foundation::color::parse_css_color;
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Rgba8, Rgba8Premul};
pub use crate::foundation::error::{ReelforgeError, ReelforgeResult};

pub use crate::template::model::{
    Animation, AnimationKind, AudioTrack, BackgroundMedia, MediaHandle, MediaKind, Position,
    Settings, Template, TextAlign, TextElement, TextStyle, Timing,
};
pub use crate::template::patch::{TemplatePatch, TextElementPatch};
pub use crate::template::upload::{
    MAX_AUDIO_BYTES, MAX_BACKGROUND_BYTES, validate_audio_upload, validate_background_upload,
};

pub use crate::eval::evaluator::{
    EvalOptions, Evaluator, GRADIENT_BOTTOM, GRADIENT_TOP, LINE_HEIGHT_FACTOR,
    SLIDE_IN_DISTANCE_PX, evaluate,
};
pub use crate::eval::layers::{BackgroundLayer, FrameLayers, Layer, Shadow, TextLayer, TextLine};

pub use crate::render::backend::Renderer;
pub use crate::render::cpu::{CpuRenderer, CpuRendererOpts, VIDEO_CACHE_CAPACITY_ENV};
pub use crate::render::surface::Surface;

pub use crate::encode::ffmpeg::{
    Container, ExportQuality, FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, is_ffmpeg_on_path,
};
pub use crate::encode::naming::artifact_file_name;
pub use crate::encode::sink::{
    AudioInputConfig, ExportArtifact, FrameSink, InMemorySink, SinkConfig,
};

pub use crate::driver::clock::{Clock, ManualClock, SystemClock};
pub use crate::driver::export::{
    AbortHandle, ExportError, ExportOptions, ExportProgress, ExportSession, FramePacing,
    export_video,
};
pub use crate::driver::preview::{PreviewDriver, PreviewState};
pub use crate::driver::schedule::{FrameScheduler, FrameTicket, QueuedScheduler};
