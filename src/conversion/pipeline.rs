//! Background conversion runner
//!
//! `Pipeline::start` checks everything that would stop a run from starting and
//! reports those problems synchronously. Once the run is accepted, all work
//! happens on one worker thread and everything else arrives as
//! `ProgressEvent`s through the returned `RunHandle`.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use futures::Stream;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use super::events::ProgressEvent;
use super::ffmpeg::{EncodeOutcome, EncodePlan, Encoder};
use crate::audio::metadata::{AudiobookMetadata, DEFAULT_AUTHOR};
use crate::audio::probe::{probe_track, ProbedTrack};
use crate::audio::{write_sidecar, DurationProbe, DEFAULT_EXTENSIONS, FALLBACK_DURATION_SECS};
use crate::core::chapters::{plan_chapters, total_duration, TimedTrack};
use crate::core::{format_duration, scan_tracks, Bitrate, TrackRef};
use crate::error::ConvertError;

/// What to convert and how
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    /// Book title; blank means "Audiobook"
    pub title: String,
    /// Book author; blank means "Unknown"
    pub author: String,
    pub bitrate: Bitrate,
    /// Extensions treated as tracks
    pub extensions: Vec<String>,
}

impl ConversionRequest {
    pub fn new(input_dir: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_path: output_path.into(),
            title: String::new(),
            author: DEFAULT_AUTHOR.to_string(),
            bitrate: Bitrate::default(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_bitrate(mut self, bitrate: Bitrate) -> Self {
        self.bitrate = bitrate;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }
}

/// Probed tracks and the metadata derived from them
#[derive(Debug, Clone, PartialEq)]
pub struct BookLayout {
    pub tracks: Vec<ProbedTrack>,
    pub metadata: AudiobookMetadata,
}

impl BookLayout {
    pub fn total_duration(&self) -> f64 {
        total_duration(&self.metadata.chapters)
    }

    pub fn estimated_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.estimated).count()
    }
}

/// Probe every track in order and lay out the chapters
///
/// `on_estimate` is called for each track whose duration had to be guessed.
pub fn describe_book(
    prober: &dyn DurationProbe,
    tracks: &[TrackRef],
    title: &str,
    author: &str,
    mut on_estimate: impl FnMut(&ProbedTrack),
) -> BookLayout {
    let probed: Vec<ProbedTrack> = tracks
        .iter()
        .map(|track| {
            let probed = probe_track(prober, track);
            if probed.estimated {
                on_estimate(&probed);
            }
            probed
        })
        .collect();

    let timed: Vec<TimedTrack> = probed.iter().map(|p| p.timed.clone()).collect();
    let metadata = AudiobookMetadata::new(title, author, plan_chapters(&timed));

    BookLayout {
        tracks: probed,
        metadata,
    }
}

/// Runs conversions one at a time on a background thread
///
/// Clones share the same in-flight flag.
#[derive(Clone)]
pub struct Pipeline {
    prober: Arc<dyn DurationProbe>,
    encoder: Arc<dyn Encoder>,
    active: Arc<AtomicBool>,
}

impl Pipeline {
    pub fn new(prober: Arc<dyn DurationProbe>, encoder: Arc<dyn Encoder>) -> Self {
        Self {
            prober,
            encoder,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True while a run is in flight
    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Check the request and list its tracks without starting anything
    pub fn prepare(&self, request: &ConversionRequest) -> Result<Vec<TrackRef>, ConvertError> {
        if request.input_dir.as_os_str().is_empty() {
            return Err(ConvertError::InputDirMissing(request.input_dir.clone()));
        }
        if !request.input_dir.exists() {
            return Err(ConvertError::InputDirMissing(request.input_dir.clone()));
        }
        if !request.input_dir.is_dir() {
            return Err(ConvertError::NotADirectory(request.input_dir.clone()));
        }
        if request.output_path.as_os_str().is_empty() {
            return Err(ConvertError::MissingOutput);
        }

        let tracks = scan_tracks(&request.input_dir, &request.extensions)?;
        if tracks.is_empty() {
            return Err(ConvertError::NoTracks {
                dir: request.input_dir.clone(),
                extensions: request.extensions.join("/"),
            });
        }

        self.encoder.verify()?;
        Ok(tracks)
    }

    /// Probe and lay out the book synchronously, without encoding
    pub fn preview(&self, request: &ConversionRequest) -> Result<BookLayout, ConvertError> {
        let tracks = self.prepare(request)?;
        Ok(describe_book(
            self.prober.as_ref(),
            &tracks,
            &request.title,
            &request.author,
            |_| {},
        ))
    }

    /// Start converting in the background
    ///
    /// Precondition failures (bad folder, no tracks, missing encoder, a run
    /// already in flight) are returned here and no events are produced.
    pub fn start(&self, request: ConversionRequest) -> Result<RunHandle, ConvertError> {
        if self.is_running() {
            return Err(ConvertError::Busy);
        }

        let tracks = self.prepare(&request)?;

        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ConvertError::Busy);
        }

        log::info!(
            "Starting conversion: {} tracks from {} -> {}",
            tracks.len(),
            request.input_dir.display(),
            request.output_path.display()
        );

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let job = Job {
            tracks,
            request,
            prober: self.prober.clone(),
            encoder: self.encoder.clone(),
        };
        let active = self.active.clone();

        let spawned = thread::Builder::new()
            .name("audiobook-encoder".to_string())
            .spawn(move || run_job(job, events_tx, active));

        match spawned {
            Ok(worker) => Ok(RunHandle {
                events: events_rx,
                worker: Some(worker),
                finished: false,
            }),
            Err(e) => {
                self.active.store(false, Ordering::SeqCst);
                Err(ConvertError::Io(e))
            }
        }
    }
}

/// Work owned by one background run
struct Job {
    tracks: Vec<TrackRef>,
    request: ConversionRequest,
    prober: Arc<dyn DurationProbe>,
    encoder: Arc<dyn Encoder>,
}

/// Worker entry point: always ends with exactly one terminal event
fn run_job(job: Job, events: UnboundedSender<ProgressEvent>, active: Arc<AtomicBool>) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| convert(&job, &events)));

    let terminal = match result {
        Ok(Ok(outcome)) if outcome.success => {
            let output_path = job.request.output_path.clone();
            ProgressEvent::Success {
                message: format!("Conversion completed!\nSaved: {}", output_path.display()),
                output_path,
            }
        }
        Ok(Ok(outcome)) => ProgressEvent::Error(outcome.failure_text()),
        Ok(Err(e)) => {
            log::error!("Conversion failed: {}", e);
            ProgressEvent::Error(format!("Error during conversion:\n{}", e))
        }
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            log::error!("Conversion worker panicked: {}", reason);
            ProgressEvent::Error(format!("Error during conversion:\n{}", reason))
        }
    };

    // Clear before the terminal event so a consumer may start again right away
    active.store(false, Ordering::SeqCst);
    let _ = events.send(terminal);
}

/// Steps 2-9 of a run; the scratch folder lives exactly as long as this call
fn convert(
    job: &Job,
    events: &UnboundedSender<ProgressEvent>,
) -> Result<EncodeOutcome, ConvertError> {
    let status = |message: String| {
        log::debug!("{}", message);
        let _ = events.send(ProgressEvent::Status(message));
    };

    status(format!("Converting {} files...", job.tracks.len()));

    let book = describe_book(
        job.prober.as_ref(),
        &job.tracks,
        &job.request.title,
        &job.request.author,
        |probed| {
            status(format!(
                "Could not read the duration of {}; assuming {}",
                probed.timed.track.file_name(),
                format_duration(FALLBACK_DURATION_SECS)
            ))
        },
    );

    status("Creating chapter metadata...".to_string());
    log::debug!(
        "{} chapters, total {} ({} estimated)",
        book.metadata.chapters.len(),
        format_duration(book.total_duration()),
        book.estimated_count()
    );

    let scratch = tempfile::Builder::new()
        .prefix("audiobook-binder-")
        .tempdir()?;
    let sidecar = write_sidecar(&book.metadata, scratch.path())?;

    let plan = EncodePlan::new(
        job.tracks.clone(),
        sidecar,
        job.request.bitrate,
        job.request.output_path.clone(),
    );

    status("Encoding audio... Please wait.".to_string());
    let outcome = job.encoder.encode(&plan);

    let scratch_path = scratch.path().to_path_buf();
    if let Err(e) = scratch.close() {
        log::warn!("Failed to remove {}: {}", scratch_path.display(), e);
    }

    outcome
}

/// Receiving end of one run's events
pub struct RunHandle {
    events: UnboundedReceiver<ProgressEvent>,
    worker: Option<JoinHandle<()>>,
    finished: bool,
}

impl RunHandle {
    /// Next pending event, without blocking
    ///
    /// Suited to a UI timer or poll loop. Returns `None` when nothing is
    /// pending or the run is over.
    pub fn try_recv(&mut self) -> Option<ProgressEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(self.observe(event)),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Next event, blocking the calling thread until one arrives
    ///
    /// Returns `None` after the terminal event. Must not be called from
    /// inside an async runtime; use `into_stream` there.
    pub fn recv_blocking(&mut self) -> Option<ProgressEvent> {
        self.events.blocking_recv().map(|event| self.observe(event))
    }

    /// True once the terminal event has been received
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Block until the run ends and return every remaining event
    pub fn wait(mut self) -> Vec<ProgressEvent> {
        let mut collected = Vec::new();
        while let Some(event) = self.recv_blocking() {
            collected.push(event);
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        collected
    }

    /// Consume the handle as an async stream of events
    pub fn into_stream(self) -> impl Stream<Item = ProgressEvent> + Send + Unpin {
        Box::pin(futures::stream::unfold(self.events, |mut events| async move {
            events.recv().await.map(|event| (event, events))
        }))
    }

    fn observe(&mut self, event: ProgressEvent) -> ProgressEvent {
        if event.is_terminal() {
            self.finished = true;
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::ProbeError;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Durations by file name; unknown names fail to probe
    struct StubProbe(HashMap<String, f64>);

    impl StubProbe {
        fn new(entries: &[(&str, f64)]) -> Self {
            Self(entries.iter().map(|(n, d)| (n.to_string(), *d)).collect())
        }
    }

    impl DurationProbe for StubProbe {
        fn probe(&self, path: &Path) -> Result<f64, ProbeError> {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            self.0
                .get(&name)
                .copied()
                .ok_or_else(|| ProbeError::Unparseable("N/A".to_string()))
        }
    }

    #[derive(Clone, Copy)]
    enum Behaviour {
        Succeed,
        Fail,
        CannotLaunch,
        Panic,
    }

    /// Records each plan and the sidecar as it looked during encoding
    struct StubEncoder {
        behaviour: Behaviour,
        available: bool,
        seen: Mutex<Vec<(EncodePlan, String)>>,
    }

    impl StubEncoder {
        fn new(behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                behaviour,
                available: true,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn unavailable() -> Arc<Self> {
            Arc::new(Self {
                behaviour: Behaviour::Succeed,
                available: false,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn last(&self) -> (EncodePlan, String) {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Encoder for StubEncoder {
        fn verify(&self) -> Result<(), ConvertError> {
            if self.available {
                Ok(())
            } else {
                Err(ConvertError::ToolMissing {
                    tool: "ffmpeg".to_string(),
                    reason: "not found on PATH".to_string(),
                    hint: crate::error::FFMPEG_INSTALL_HINT,
                })
            }
        }

        fn encode(&self, plan: &EncodePlan) -> Result<EncodeOutcome, ConvertError> {
            let sidecar = std::fs::read_to_string(plan.metadata_path()).unwrap();
            self.seen.lock().unwrap().push((plan.clone(), sidecar));
            match self.behaviour {
                Behaviour::Succeed => Ok(EncodeOutcome {
                    success: true,
                    diagnostics: String::new(),
                    status: "exit status: 0".to_string(),
                }),
                Behaviour::Fail => Ok(EncodeOutcome {
                    success: false,
                    diagnostics: "[mp3 @ 0x1] Header missing\nError while decoding stream #0:0\n"
                        .to_string(),
                    status: "exit status: 1".to_string(),
                }),
                Behaviour::CannotLaunch => Err(ConvertError::Launch {
                    tool: "ffmpeg".to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                }),
                Behaviour::Panic => panic!("encoder exploded"),
            }
        }
    }

    /// Encoder that waits for a signal before succeeding
    struct GatedEncoder(Mutex<std::sync::mpsc::Receiver<()>>);

    impl Encoder for GatedEncoder {
        fn verify(&self) -> Result<(), ConvertError> {
            Ok(())
        }

        fn encode(&self, _plan: &EncodePlan) -> Result<EncodeOutcome, ConvertError> {
            let _ = self.0.lock().unwrap().recv();
            Ok(EncodeOutcome {
                success: true,
                diagnostics: String::new(),
                status: "exit status: 0".to_string(),
            })
        }
    }

    fn book_dir(names: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for name in names {
            std::fs::write(temp.path().join(name), b"").unwrap();
        }
        temp
    }

    fn demo_request(dir: &Path) -> ConversionRequest {
        ConversionRequest::new(dir, dir.join("Demo.m4b"))
            .with_title("Demo")
            .with_author("Tester")
            .with_bitrate(Bitrate::K64)
    }

    fn assert_single_terminal(events: &[ProgressEvent]) {
        let (last, rest) = events.split_last().expect("no events");
        assert!(last.is_terminal(), "last event not terminal: {:?}", last);
        assert!(
            rest.iter().all(|e| !e.is_terminal()),
            "terminal event before the end: {:?}",
            events
        );
    }

    #[test]
    fn test_end_to_end_success() {
        let dir = book_dir(&["02.mp3", "01.mp3"]);
        let encoder = StubEncoder::new(Behaviour::Succeed);
        let pipeline = Pipeline::new(
            Arc::new(StubProbe::new(&[("01.mp3", 5.0), ("02.mp3", 7.0)])),
            encoder.clone(),
        );

        let events = pipeline.start(demo_request(dir.path())).unwrap().wait();

        assert_single_terminal(&events);
        assert_eq!(
            events.last().unwrap(),
            &ProgressEvent::Success {
                output_path: dir.path().join("Demo.m4b"),
                message: format!("Conversion completed!\nSaved: {}", dir.path().join("Demo.m4b").display()),
            }
        );
        assert_eq!(
            events[0],
            ProgressEvent::Status("Converting 2 files...".to_string())
        );
        assert!(events.contains(&ProgressEvent::Status("Encoding audio... Please wait.".to_string())));

        let (plan, sidecar) = encoder.last();
        let inputs: Vec<String> = plan.inputs().iter().map(|t| t.file_name()).collect();
        assert_eq!(inputs, vec!["01.mp3", "02.mp3"]);
        assert_eq!(plan.metadata_input_index(), 2);
        assert_eq!(plan.bitrate(), Bitrate::K64);
        assert_eq!(plan.output_path(), dir.path().join("Demo.m4b"));

        assert!(sidecar.starts_with(";FFMETADATA1\ntitle=Demo\nartist=Tester\n"));
        assert!(sidecar.contains("START=0\nEND=5000\ntitle=Chapter 1: 01\n"));
        assert!(sidecar.contains("START=5000\nEND=12000\ntitle=Chapter 2: 02\n"));
    }

    #[test]
    fn test_scratch_folder_removed_on_every_outcome() {
        for behaviour in [
            Behaviour::Succeed,
            Behaviour::Fail,
            Behaviour::CannotLaunch,
            Behaviour::Panic,
        ] {
            let dir = book_dir(&["01.mp3"]);
            let encoder = StubEncoder::new(behaviour);
            let pipeline = Pipeline::new(Arc::new(StubProbe::new(&[("01.mp3", 1.0)])), encoder.clone());

            let events = pipeline.start(demo_request(dir.path())).unwrap().wait();
            assert_single_terminal(&events);

            let (plan, _) = encoder.last();
            assert!(!plan.metadata_path().exists());
            assert!(!plan.metadata_path().parent().unwrap().exists());
        }
    }

    #[test]
    fn test_probe_failure_uses_fallback_and_finishes() {
        let dir = book_dir(&["01.mp3", "02.mp3"]);
        let encoder = StubEncoder::new(Behaviour::Succeed);
        let pipeline = Pipeline::new(Arc::new(StubProbe::new(&[("02.mp3", 10.0)])), encoder.clone());

        let events = pipeline.start(demo_request(dir.path())).unwrap().wait();

        assert_single_terminal(&events);
        assert!(matches!(events.last(), Some(ProgressEvent::Success { .. })));
        assert!(events.contains(&ProgressEvent::Status(
            "Could not read the duration of 01.mp3; assuming 30m 0s".to_string()
        )));

        let (_, sidecar) = encoder.last();
        assert!(sidecar.contains("START=0\nEND=1800000\ntitle=Chapter 1: 01\n"));
        assert!(sidecar.contains("START=1800000\nEND=1810000\ntitle=Chapter 2: 02\n"));
    }

    #[test]
    fn test_encoder_failure_reports_diagnostics_verbatim() {
        let dir = book_dir(&["01.mp3"]);
        let pipeline = Pipeline::new(
            Arc::new(StubProbe::new(&[("01.mp3", 1.0)])),
            StubEncoder::new(Behaviour::Fail),
        );

        let events = pipeline.start(demo_request(dir.path())).unwrap().wait();

        assert_single_terminal(&events);
        assert_eq!(
            events.last().unwrap(),
            &ProgressEvent::Error(
                "[mp3 @ 0x1] Header missing\nError while decoding stream #0:0\n".to_string()
            )
        );
    }

    #[test]
    fn test_launch_failure_becomes_error_event() {
        let dir = book_dir(&["01.mp3"]);
        let pipeline = Pipeline::new(
            Arc::new(StubProbe::new(&[])),
            StubEncoder::new(Behaviour::CannotLaunch),
        );

        let events = pipeline.start(demo_request(dir.path())).unwrap().wait();

        assert_single_terminal(&events);
        match events.last().unwrap() {
            ProgressEvent::Error(text) => {
                assert!(text.starts_with("Error during conversion:\nFailed to launch ffmpeg"));
            }
            other => panic!("expected Error, got {:?}", other),
        }
    }

    #[test]
    fn test_worker_panic_becomes_error_event() {
        let dir = book_dir(&["01.mp3"]);
        let pipeline = Pipeline::new(
            Arc::new(StubProbe::new(&[("01.mp3", 1.0)])),
            StubEncoder::new(Behaviour::Panic),
        );

        let events = pipeline.start(demo_request(dir.path())).unwrap().wait();

        assert_single_terminal(&events);
        assert_eq!(
            events.last().unwrap(),
            &ProgressEvent::Error("Error during conversion:\nencoder exploded".to_string())
        );
        assert!(!pipeline.is_running());
    }

    #[test]
    fn test_empty_folder_is_rejected_before_starting() {
        let dir = book_dir(&["cover.jpg"]);
        let encoder = StubEncoder::new(Behaviour::Succeed);
        let pipeline = Pipeline::new(Arc::new(StubProbe::new(&[])), encoder.clone());

        let result = pipeline.start(demo_request(dir.path()));

        assert!(matches!(result, Err(ConvertError::NoTracks { .. })));
        assert!(encoder.seen.lock().unwrap().is_empty());
        assert!(!pipeline.is_running());
    }

    #[test]
    fn test_other_preconditions() {
        let pipeline = Pipeline::new(
            Arc::new(StubProbe::new(&[])),
            StubEncoder::new(Behaviour::Succeed),
        );

        let missing = ConversionRequest::new("/nonexistent/book", "/tmp/out.m4b");
        assert!(matches!(
            pipeline.start(missing),
            Err(ConvertError::InputDirMissing(_))
        ));

        let dir = book_dir(&["01.mp3"]);
        let no_output = ConversionRequest::new(dir.path(), "");
        assert!(matches!(
            pipeline.start(no_output),
            Err(ConvertError::MissingOutput)
        ));

        let no_ffmpeg = Pipeline::new(Arc::new(StubProbe::new(&[])), StubEncoder::unavailable());
        assert!(matches!(
            no_ffmpeg.start(demo_request(dir.path())),
            Err(ConvertError::ToolMissing { .. })
        ));
        assert!(!no_ffmpeg.is_running());
    }

    #[test]
    fn test_second_run_while_busy_is_rejected() {
        let dir = book_dir(&["01.mp3"]);
        let (release, gate) = std::sync::mpsc::channel();
        let pipeline = Pipeline::new(
            Arc::new(StubProbe::new(&[("01.mp3", 1.0)])),
            Arc::new(GatedEncoder(Mutex::new(gate))),
        );

        let first = pipeline.start(demo_request(dir.path())).unwrap();
        assert!(pipeline.is_running());
        assert!(matches!(
            pipeline.clone().start(demo_request(dir.path())),
            Err(ConvertError::Busy)
        ));

        release.send(()).unwrap();
        let events = first.wait();
        assert!(matches!(events.last(), Some(ProgressEvent::Success { .. })));
        assert!(!pipeline.is_running());

        // Gate sender dropped: the next encode returns immediately
        drop(release);
        let again = pipeline.start(demo_request(dir.path())).unwrap().wait();
        assert_single_terminal(&again);
    }

    #[test]
    fn test_poll_loop_sees_events_in_order() {
        let dir = book_dir(&["1.mp3", "2.mp3", "10.mp3"]);
        let pipeline = Pipeline::new(
            Arc::new(StubProbe::new(&[("1.mp3", 1.0), ("2.mp3", 2.0), ("10.mp3", 3.0)])),
            StubEncoder::new(Behaviour::Succeed),
        );

        let mut handle = pipeline.start(demo_request(dir.path())).unwrap();
        let mut events = Vec::new();
        while !handle.is_finished() {
            match handle.try_recv() {
                Some(event) => events.push(event),
                None => std::thread::sleep(std::time::Duration::from_millis(5)),
            }
        }

        assert_single_terminal(&events);
        assert_eq!(
            events,
            vec![
                ProgressEvent::Status("Converting 3 files...".to_string()),
                ProgressEvent::Status("Creating chapter metadata...".to_string()),
                ProgressEvent::Status("Encoding audio... Please wait.".to_string()),
                events.last().unwrap().clone(),
            ]
        );
        assert!(handle.try_recv().is_none());
    }

    #[test]
    fn test_preview_lays_out_chapters() {
        let dir = book_dir(&["01.mp3", "02.mp3"]);
        let pipeline = Pipeline::new(
            Arc::new(StubProbe::new(&[("01.mp3", 5.0), ("02.mp3", 7.0)])),
            StubEncoder::new(Behaviour::Succeed),
        );

        let layout = pipeline.preview(&demo_request(dir.path())).unwrap();
        let chapters: Vec<(f64, f64, &str)> = layout
            .metadata
            .chapters
            .iter()
            .map(|c| (c.start, c.end, c.title.as_str()))
            .collect();
        assert_eq!(
            chapters,
            vec![(0.0, 5.0, "Chapter 1: 01"), (5.0, 12.0, "Chapter 2: 02")]
        );
        assert_eq!(layout.total_duration(), 12.0);
        assert_eq!(layout.estimated_count(), 0);
        assert!(!pipeline.is_running());
    }

    #[tokio::test]
    async fn test_event_stream() {
        use futures::StreamExt;

        let dir = book_dir(&["01.mp3"]);
        let pipeline = Pipeline::new(
            Arc::new(StubProbe::new(&[])),
            StubEncoder::new(Behaviour::Succeed),
        );

        let events: Vec<ProgressEvent> = pipeline
            .start(demo_request(dir.path()))
            .unwrap()
            .into_stream()
            .collect()
            .await;

        assert_single_terminal(&events);
        assert!(matches!(events.last(), Some(ProgressEvent::Success { .. })));
    }
}
