use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use anyhow::Context as _;

use crate::encode::naming::{artifact_file_name, unix_millis_now};
use crate::encode::sink::{ExportArtifact, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelforgeError, ReelforgeResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::surface::Surface;

/// Output container and codec pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Container {
    /// WebM with VP9 video and Opus audio.
    #[default]
    WebM,
    /// MP4 with H.264 video and AAC audio.
    Mp4,
}

impl Container {
    pub fn extension(self) -> &'static str {
        match self {
            Self::WebM => "webm",
            Self::Mp4 => "mp4",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            Self::WebM => "video/webm",
            Self::Mp4 => "video/mp4",
        }
    }

    fn video_args(self, quality: ExportQuality) -> Vec<String> {
        let bitrate = quality.video_bitrate().to_string();
        match self {
            Self::WebM => vec![
                "-c:v".into(),
                "libvpx-vp9".into(),
                "-b:v".into(),
                bitrate,
                "-row-mt".into(),
                "1".into(),
                "-pix_fmt".into(),
                "yuv420p".into(),
            ],
            Self::Mp4 => vec![
                "-c:v".into(),
                "libx264".into(),
                "-b:v".into(),
                bitrate,
                "-pix_fmt".into(),
                "yuv420p".into(),
                "-movflags".into(),
                "+faststart".into(),
            ],
        }
    }

    fn audio_codec(self) -> &'static str {
        match self {
            Self::WebM => "libopus",
            Self::Mp4 => "aac",
        }
    }
}

/// Target video bitrate preset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExportQuality {
    /// 5 Mbit/s.
    #[default]
    High,
    /// 2.5 Mbit/s.
    Medium,
    /// 1 Mbit/s.
    Low,
}

impl ExportQuality {
    pub fn video_bitrate(self) -> u32 {
        match self {
            Self::High => 5_000_000,
            Self::Medium => 2_500_000,
            Self::Low => 1_000_000,
        }
    }
}

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
    pub container: Container,
    pub quality: ExportQuality,
    /// Background color used to flatten alpha (straight RGBA8).
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            container: Container::WebM,
            quality: ExportQuality::High,
            bg_rgba: [0, 0, 0, 255],
        }
    }

    /// Options writing `<dir>/<name_with_underscores>_<now_ms>.<ext>`.
    pub fn in_dir(dir: impl AsRef<Path>, template_name: &str, container: Container) -> Self {
        let file = artifact_file_name(template_name, unix_millis_now(), container.extension());
        Self {
            container,
            ..Self::new(dir.as_ref().join(file))
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    // Output file may exist and belongs to this sink.
    owns_output: bool,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
            owns_output: false,
        }
    }

    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    fn command(&self, cfg: &SinkConfig) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);

        if let Some(audio) = &cfg.audio {
            cmd.arg("-i").arg(&audio.path);
            cmd.args(["-map", "0:v:0", "-map", "1:a:0"]);
            cmd.args(self.opts.container.video_args(self.opts.quality));
            cmd.args([
                "-filter:a",
                &format!("volume={:.3}", audio.volume.clamp(0.0, 1.0)),
                "-c:a",
                self.opts.container.audio_codec(),
                "-t",
                &format!("{:.6}", cfg.duration_s),
            ]);
        } else {
            cmd.arg("-an");
            cmd.args(self.opts.container.video_args(self.opts.quality));
        }
        cmd.arg(&self.opts.out_path);
        cmd
    }

    fn kill_child(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelforgeResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReelforgeError::encode(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ReelforgeError::encode(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }
        if let Some(audio) = &cfg.audio
            && !audio.path.is_file()
        {
            return Err(ReelforgeError::encode(format!(
                "audio source '{}' is not a readable file",
                audio.path.display()
            )));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ReelforgeError::encode(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(ReelforgeError::encode(
                "ffmpeg is required for video export, but was not found on PATH",
            ));
        }

        let mut child = self.command(&cfg).spawn().map_err(|e| {
            ReelforgeError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelforgeError::encode("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelforgeError::encode("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            out = %self.opts.out_path.display(),
            container = ?self.opts.container,
            audio = cfg.audio.is_some(),
            "ffmpeg sink started"
        );
        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.owns_output = true;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Surface) -> ReelforgeResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelforgeError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelforgeError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        if frame.width() != cfg.width || frame.height() != cfg.height {
            return Err(ReelforgeError::encode(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }
        self.last_idx = Some(idx);

        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, frame.data(), self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelforgeError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            ReelforgeError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> ReelforgeResult<ExportArtifact> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelforgeError::encode("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            ReelforgeError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelforgeError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ReelforgeError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        self.cfg = None;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ReelforgeError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        let size_bytes = std::fs::metadata(&self.opts.out_path)
            .with_context(|| format!("stat export '{}'", self.opts.out_path.display()))?
            .len();
        let file_name = self
            .opts
            .out_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(ExportArtifact {
            path: Some(self.opts.out_path.clone()),
            file_name,
            media_type: self.opts.container.media_type().to_string(),
            size_bytes,
        })
    }

    fn discard(&mut self) {
        self.kill_child();
        self.cfg = None;
        self.last_idx = None;
        if std::mem::take(&mut self.owns_output)
            && self.opts.out_path.exists()
            && let Err(err) = std::fs::remove_file(&self.opts.out_path)
        {
            tracing::warn!(
                out = %self.opts.out_path.display(),
                %err,
                "failed to remove partial export"
            );
        }
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.discard();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> ReelforgeResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelforgeError::encode(
            "flatten expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255u16 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelforgeResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
