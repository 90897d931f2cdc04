use std::time::{SystemTime, UNIX_EPOCH};

/// `<name with whitespace runs as underscores>_<timestamp_ms>.<ext>`
pub fn artifact_file_name(name: &str, timestamp_ms: u128, ext: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    let mut in_ws = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_ws {
                stem.push('_');
            }
            in_ws = true;
        } else {
            stem.push(c);
            in_ws = false;
        }
    }
    format!("{stem}_{timestamp_ms}.{ext}")
}

pub(crate) fn unix_millis_now() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
