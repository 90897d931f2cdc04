use super::*;
use crate::encode::sink::InMemorySink;
use crate::eval::layers::FrameLayers;
use crate::template::model::{AudioTrack, MediaHandle};

#[derive(Default)]
struct Recorder {
    times: Vec<f64>,
    prepared: usize,
    fail_at: Option<usize>,
}

impl Renderer for Recorder {
    fn prepare(&mut self, _template: &Template) -> ReelforgeResult<()> {
        self.prepared += 1;
        Ok(())
    }

    fn render(&mut self, surface: &mut Surface, frame: &FrameLayers) -> ReelforgeResult<()> {
        if self.fail_at == Some(self.times.len()) {
            return Err(ReelforgeError::render("frame failed"));
        }
        self.times.push(frame.time_s);
        surface.data_mut().fill(0xff);
        Ok(())
    }
}

fn small_template() -> Template {
    let mut t = Template::default();
    t.settings.width = 4;
    t.settings.height = 4;
    t
}

fn unthrottled() -> ExportOptions {
    ExportOptions {
        pacing: FramePacing::Unthrottled,
        ..ExportOptions::default()
    }
}

#[test]
fn ten_seconds_at_30fps_is_300_frames_at_i_over_30() {
    let template = small_template();
    let mut renderer = Recorder::default();
    let mut sink = InMemorySink::counting();
    let mut progress = Vec::new();

    let artifact = export_video(
        &template,
        &mut renderer,
        &mut sink,
        &unthrottled(),
        &AbortHandle::new(),
        |p| progress.push(p.fraction()),
    )
    .unwrap();

    assert_eq!(renderer.prepared, 1);
    assert_eq!(renderer.times.len(), 300);
    for (i, t) in renderer.times.iter().enumerate() {
        assert_eq!(*t, i as f64 / 30.0);
    }
    assert_eq!(progress.len(), 300);
    assert!(progress.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(*progress.last().unwrap(), 1.0);
    assert_eq!(sink.indices().len(), 300);
    assert_eq!(artifact.size_bytes, 300 * 4 * 4 * 4);
    assert!(artifact.file_name.starts_with("Quote_Video_Template_"));
}

#[test]
fn abort_discards_the_sink() {
    let template = small_template();
    let abort = AbortHandle::new();
    let mut sink = InMemorySink::counting();
    let mut seen = 0;

    let err = export_video(
        &template,
        Recorder::default(),
        &mut sink,
        &unthrottled(),
        &abort.clone(),
        |p| {
            seen = p.frame;
            if p.frame == 5 {
                abort.abort();
            }
        },
    )
    .unwrap_err();

    assert!(matches!(err, ExportError::Aborted));
    assert_eq!(seen, 5);
    assert!(sink.was_discarded());
}

#[test]
fn invalid_template_is_a_setup_failure() {
    let mut template = small_template();
    template.duration_s = 0.0;
    let mut sink = InMemorySink::counting();
    let mut renderer = Recorder::default();

    let err = ExportSession::begin(&template, &mut renderer, &mut sink, &unthrottled())
        .err()
        .unwrap();
    assert!(matches!(err, ExportError::Setup(ReelforgeError::Validation(_))));
    assert!(sink.was_discarded());
    assert_eq!(renderer.prepared, 0);
}

#[test]
fn frame_failure_is_a_runtime_failure() {
    let template = small_template();
    let mut sink = InMemorySink::counting();
    let renderer = Recorder {
        fail_at: Some(3),
        ..Recorder::default()
    };

    let err = export_video(
        &template,
        renderer,
        &mut sink,
        &unthrottled(),
        &AbortHandle::new(),
        |_| {},
    )
    .unwrap_err();
    assert!(matches!(err, ExportError::Runtime(ReelforgeError::Render(_))));
    assert!(sink.was_discarded());
}

#[test]
fn dropping_an_unfinished_session_discards() {
    let template = small_template();
    let mut sink = InMemorySink::counting();
    {
        let mut session =
            ExportSession::begin(&template, Recorder::default(), &mut sink, &unthrottled())
                .unwrap();
        session.step().unwrap();
    }
    assert!(sink.was_discarded());
}

#[test]
fn finishing_early_is_refused() {
    let template = small_template();
    let mut sink = InMemorySink::counting();
    let mut session =
        ExportSession::begin(&template, Recorder::default(), &mut sink, &unthrottled()).unwrap();
    session.step().unwrap();
    assert!(matches!(session.finish(), Err(ExportError::Runtime(_))));
    assert!(sink.was_discarded());
}

#[test]
fn static_frames_are_resubmitted_without_rendering() {
    let mut template = small_template();
    template.text_elements.clear();
    let mut renderer = Recorder::default();
    let mut sink = InMemorySink::counting();
    let opts = ExportOptions {
        static_frame_elision: true,
        ..unthrottled()
    };

    export_video(
        &template,
        &mut renderer,
        &mut sink,
        &opts,
        &AbortHandle::new(),
        |_| {},
    )
    .unwrap();
    assert_eq!(renderer.times, vec![0.0]);
    assert_eq!(sink.indices().len(), 300);
}

#[test]
fn audio_source_reaches_the_sink() {
    let mut template = small_template();
    template.audio_track = Some(AudioTrack {
        source: Some(MediaHandle::new("music.mp3")),
        volume: 0.5,
    });
    let mut sink = InMemorySink::counting();
    let session =
        ExportSession::begin(&template, Recorder::default(), &mut sink, &unthrottled()).unwrap();
    session.abort();

    let audio = sink.config().unwrap().audio.clone().unwrap();
    assert_eq!(audio.path, std::path::PathBuf::from("music.mp3"));
    assert_eq!(audio.volume, 0.5);
}

#[test]
fn progress_fraction_edges() {
    assert_eq!(ExportProgress { frame: 0, total: 0 }.fraction(), 1.0);
    assert_eq!(ExportProgress { frame: 3, total: 4 }.fraction(), 0.75);
    assert!(ExportProgress { frame: 4, total: 4 }.is_complete());
}
