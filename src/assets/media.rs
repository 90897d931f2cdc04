use std::path::{Path, PathBuf};

use crate::foundation::error::ReelforgeResult;
#[cfg(not(feature = "media-ffmpeg"))]
use crate::foundation::error::ReelforgeError;

#[derive(Clone, Debug)]
#[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
pub(crate) struct VideoSourceInfo {
    pub(crate) source_path: PathBuf,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) duration_s: f64,
}

/// Source time sampled for timeline time `t`: the video loops over its own duration.
pub(crate) fn video_source_time(t: f64, duration_s: f64) -> f64 {
    let t = if t.is_finite() { t.max(0.0) } else { 0.0 };
    if duration_s.is_finite() && duration_s > 0.0 {
        t.rem_euclid(duration_s)
    } else {
        t
    }
}

#[cfg(feature = "media-ffmpeg")]
pub(crate) fn probe_video(source_path: &Path) -> ReelforgeResult<VideoSourceInfo> {
    use crate::foundation::error::ReelforgeError;

    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| ReelforgeError::render(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ReelforgeError::render(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| ReelforgeError::render(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ReelforgeError::render("no video stream found"))?;
    let (Some(width), Some(height)) = (video_stream.width, video_stream.height) else {
        return Err(ReelforgeError::render("missing video dimensions from ffprobe"));
    };
    let duration_s = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        duration_s,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
pub(crate) fn probe_video(_source_path: &Path) -> ReelforgeResult<VideoSourceInfo> {
    Err(ReelforgeError::render(
        "video backgrounds require the 'media-ffmpeg' feature",
    ))
}

/// Decode one straight-alpha RGBA8 frame at `source_time_s`.
#[cfg(feature = "media-ffmpeg")]
pub(crate) fn decode_video_frame_rgba8(
    source: &VideoSourceInfo,
    source_time_s: f64,
) -> ReelforgeResult<Vec<u8>> {
    use crate::foundation::error::ReelforgeError;

    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{source_time_s:.6}")])
        .arg("-i")
        .arg(&source.source_path)
        .args([
            "-frames:v",
            "1",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| ReelforgeError::render(format!("failed to run ffmpeg for video decode: {e}")))?;

    if !out.status.success() {
        return Err(ReelforgeError::render(format!(
            "ffmpeg video decode failed for '{}': {}",
            source.source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected_len = source.width as usize * source.height as usize * 4;
    if expected_len == 0 {
        return Err(ReelforgeError::render(
            "decoded video frame size is zero (invalid source dimensions)",
        ));
    }
    if out.stdout.len() < expected_len {
        return Err(ReelforgeError::render(format!(
            "decoded video frame is short: got {} bytes, expected {expected_len}",
            out.stdout.len()
        )));
    }
    let mut frame = out.stdout;
    frame.truncate(expected_len);
    Ok(frame)
}

#[cfg(not(feature = "media-ffmpeg"))]
pub(crate) fn decode_video_frame_rgba8(
    _source: &VideoSourceInfo,
    _source_time_s: f64,
) -> ReelforgeResult<Vec<u8>> {
    Err(ReelforgeError::render(
        "video backgrounds require the 'media-ffmpeg' feature",
    ))
}
