pub(crate) mod ffmpeg;
pub(crate) mod naming;
pub(crate) mod sink;
