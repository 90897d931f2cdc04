use super::*;

#[test]
fn background_uploads_map_to_kind() {
    assert_eq!(
        validate_background_upload("image/png", 1024).unwrap(),
        MediaKind::Image
    );
    assert_eq!(
        validate_background_upload("Video/MP4", MAX_BACKGROUND_BYTES).unwrap(),
        MediaKind::Video
    );
    assert!(validate_background_upload("audio/mpeg", 10).is_err());
    assert!(validate_background_upload("image", 10).is_err());
    assert!(validate_background_upload("image/jpeg", MAX_BACKGROUND_BYTES + 1).is_err());
}

#[test]
fn audio_uploads_have_smaller_limit() {
    validate_audio_upload("audio/mpeg", MAX_AUDIO_BYTES).unwrap();
    assert!(validate_audio_upload("audio/wav", MAX_AUDIO_BYTES + 1).is_err());
    assert!(validate_audio_upload("video/mp4", 10).is_err());
}
