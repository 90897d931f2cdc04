use crate::foundation::error::{ReelforgeError, ReelforgeResult};
use crate::template::model::MediaKind;

pub const MAX_BACKGROUND_BYTES: u64 = 50 * 1024 * 1024;
pub const MAX_AUDIO_BYTES: u64 = 20 * 1024 * 1024;

/// Check a background upload by MIME type and size, returning the media kind it maps to.
pub fn validate_background_upload(mime: &str, size_bytes: u64) -> ReelforgeResult<MediaKind> {
    let kind = match mime_top_level(mime).as_deref() {
        Some("image") => MediaKind::Image,
        Some("video") => MediaKind::Video,
        _ => {
            return Err(ReelforgeError::validation(format!(
                "background must be an image or video, got '{mime}'"
            )));
        }
    };
    check_size(size_bytes, MAX_BACKGROUND_BYTES)?;
    Ok(kind)
}

/// Check an audio upload by MIME type and size.
pub fn validate_audio_upload(mime: &str, size_bytes: u64) -> ReelforgeResult<()> {
    if mime_top_level(mime).as_deref() != Some("audio") {
        return Err(ReelforgeError::validation(format!(
            "audio track must be an audio file, got '{mime}'"
        )));
    }
    check_size(size_bytes, MAX_AUDIO_BYTES)
}

fn mime_top_level(mime: &str) -> Option<String> {
    let (top, sub) = mime.trim().split_once('/')?;
    if top.is_empty() || sub.is_empty() {
        return None;
    }
    Some(top.to_ascii_lowercase())
}

fn check_size(size_bytes: u64, max: u64) -> ReelforgeResult<()> {
    if size_bytes > max {
        return Err(ReelforgeError::validation(format!(
            "file is {size_bytes} bytes; limit is {}MB",
            max / (1024 * 1024)
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/template/upload.rs"]
mod tests;
