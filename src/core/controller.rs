//! The single consumer of the event bus.
//!
//! The controller owns the file set, the task queue, the settings and the
//! session. Workers and the registry only send events; everything they cause
//! is applied here, one event at a time, and then reported to the observer.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace};

use crate::commands::{Command, CommandHandle};
use crate::core::{
    Activity, ErrorPolicy, Event, EventReceiver, EventSender, FatalContext, FatalError, FileEntry,
    FileSet, FileStatus, Observer, Session, SessionConfig, Settings, TaskQueue,
};
use crate::processing::{executor, spawn_registry, DiscoveryRequest, Engine, ModelSessions};
use crate::utils::CoreResult;
use crate::worker::WorkerError;

/// How a session ended without a programming fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Shutdown was requested, or every command handle was dropped
    Shutdown,
    /// A fatal error was reported to the observer
    Fatal(FatalError),
}

pub struct Controller<E: Engine, O: Observer> {
    engine: Arc<E>,
    observer: O,
    config: SessionConfig,
    session: Session<E::Handle>,
    settings: Settings,
    files: FileSet,
    queue: TaskQueue,
    /// Discovery runs requested but not finished
    discovering: usize,
    activity: Option<Activity>,
    events_tx: EventSender<E::Handle>,
    events: EventReceiver<E::Handle>,
    commands: mpsc::UnboundedReceiver<Command>,
    faults: mpsc::UnboundedReceiver<WorkerError>,
}

impl<E: Engine, O: Observer> Controller<E, O> {
    /// Builds a controller and the handle used to send it commands.
    ///
    /// Must be called within a tokio runtime. Nothing is loaded until
    /// [`Controller::run`] is awaited.
    pub fn new(engine: Arc<E>, observer: O, config: SessionConfig) -> CoreResult<(Self, CommandHandle)> {
        config.validate()?;
        let (faults_tx, faults) = mpsc::unbounded_channel();
        let (events_tx, events) = mpsc::unbounded_channel();
        let (handle, commands) = CommandHandle::channel();
        let session = Session::new(&config, faults_tx);

        let controller = Self {
            engine,
            observer,
            config,
            session,
            settings: Settings::default(),
            files: FileSet::new(),
            queue: TaskQueue::new(),
            discovering: 0,
            activity: None,
            events_tx,
            events,
            commands,
            faults,
        };
        Ok((controller, handle))
    }

    /// Replaces the initial settings (e.g. restored user preferences).
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Loads the models and processes events and commands until the session ends.
    ///
    /// Returns `Err` only for programming faults (a panicking job, an
    /// impossible status transition).
    pub async fn run(mut self) -> CoreResult<SessionOutcome> {
        info!("=== Session starting ===");
        spawn_registry(
            Arc::clone(&self.engine),
            self.config.model_workers,
            self.events_tx.clone(),
        );
        self.refresh_activity();

        loop {
            let outcome = tokio::select! {
                biased;
                Some(fault) = self.faults.recv() => {
                    error!("Worker fault: {}", fault);
                    self.session.close();
                    return Err(fault.into());
                }
                Some(event) = self.events.recv() => self.handle_event(event)?,
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command)?,
                    None => {
                        debug!("All command handles dropped");
                        Some(SessionOutcome::Shutdown)
                    }
                },
            };
            self.refresh_activity();

            if let Some(outcome) = outcome {
                // Queued jobs must not start once the session is over.
                self.session.close();
                let counts = self.files.counts();
                info!(
                    "Session ending ({:?}) - seen: {}, done: {}, failed: {}, unfinished: {}",
                    outcome,
                    self.queue.seen_len(),
                    counts.done,
                    counts.error,
                    counts.pending + counts.running
                );
                return Ok(outcome);
            }
        }
    }

    fn handle_event(&mut self, event: Event<E::Handle>) -> CoreResult<Option<SessionOutcome>> {
        trace!("Event: {:?}", event);
        match event {
            Event::Discovered { source, output } => {
                self.on_discovered(source, output)?;
            }
            Event::DiscoveryFinished => {
                self.discovering = self.discovering.saturating_sub(1);
            }
            Event::ModelsLoaded(sessions) => {
                self.on_models_loaded(sessions)?;
            }
            Event::StatusChanged { source, status } => {
                self.on_status_changed(source, status)?;
            }
            Event::Fatal(fatal) => return Ok(self.on_fatal(fatal)),
        }
        Ok(None)
    }

    fn handle_command(&mut self, command: Command) -> CoreResult<Option<SessionOutcome>> {
        match command {
            Command::Discover(request) => self.start_discovery(request)?,
            Command::UpdateSettings(settings) => {
                debug!("Settings changed: {:?}", settings);
                self.settings = settings;
            }
            Command::ClearCompleted => {
                let removed = self.files.clear_completed();
                debug!("Cleared {} completed files", removed.len());
                if !removed.is_empty() {
                    self.observer.set_changed(&self.files);
                }
            }
            Command::Remove(source) => {
                if self.files.remove(&source).is_some() {
                    self.observer.set_changed(&self.files);
                }
            }
            Command::Shutdown => return Ok(Some(SessionOutcome::Shutdown)),
        }
        Ok(None)
    }

    /// Runs one discovery request on the discover pool.
    fn start_discovery(&mut self, request: DiscoveryRequest) -> CoreResult<()> {
        debug!("Discovery requested: {:?}", request);
        let events = self.events_tx.clone();
        self.session.discover_pool().submit(move || {
            for found in request.into_discoveries() {
                let event = Event::Discovered {
                    source: found.source,
                    output: found.output,
                };
                if events.send(event).is_err() {
                    return;
                }
            }
            let _ = events.send(Event::DiscoveryFinished);
        })?;
        self.discovering += 1;
        Ok(())
    }

    fn on_discovered(&mut self, source: PathBuf, output: PathBuf) -> CoreResult<()> {
        if !self.queue.enqueue(source.clone()) {
            trace!("Already seen: {}", source.display());
            return Ok(());
        }

        let entry = FileEntry::pending(source, output);
        self.files.insert(entry.clone());
        self.observer.discovered(&entry);
        self.observer.set_changed(&self.files);

        if self.session.is_ready() {
            self.flush_queue()?;
        }
        Ok(())
    }

    fn on_models_loaded(&mut self, sessions: Arc<ModelSessions<E::Handle>>) -> CoreResult<()> {
        self.session.publish(sessions)?;
        info!("Models ready, dispatching {} queued files", self.queue.pending_len());
        self.flush_queue()
    }

    fn on_status_changed(&mut self, source: PathBuf, status: FileStatus) -> CoreResult<()> {
        if self.files.transition(&source, status)?.is_none() {
            debug!("Status {} for removed file {}", status, source.display());
            return Ok(());
        }
        self.observer.set_changed(&self.files);
        Ok(())
    }

    fn on_fatal(&mut self, fatal: FatalError) -> Option<SessionOutcome> {
        error!("{}", fatal);
        self.observer.fatal(&fatal);
        match (&fatal.context, self.config.error_policy) {
            (FatalContext::File(_), ErrorPolicy::Continue) => None,
            _ => Some(SessionOutcome::Fatal(fatal)),
        }
    }

    /// Submits every queued file. Only called once the models are published.
    fn flush_queue(&mut self) -> CoreResult<()> {
        for source in self.queue.drain() {
            let Some(entry) = self.files.get(&source) else {
                debug!("Removed before dispatch: {}", source.display());
                continue;
            };
            executor::submit(&self.engine, &self.session, entry, self.settings, &self.events_tx)?;
        }
        Ok(())
    }

    fn refresh_activity(&mut self) {
        let activity = Activity::derive(self.discovering, self.session.is_ready(), &self.files);
        if self.activity != Some(activity) {
            let pool = self.session.work_pool();
            debug!(
                "Activity: {} - Active: {}, Queued: {}",
                activity,
                pool.active(),
                pool.queued()
            );
            self.activity = Some(activity);
            self.observer.activity(activity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Condvar, Mutex};
    use std::time::Duration;
    use image::{DynamicImage, Rgba, RgbaImage};
    use tokio::task::JoinHandle;
    use crate::core::{BgColor, ModelKind};
    use crate::utils::CoreError;

    /// Images this wide make the fake engine fail.
    const FAILING_WIDTH: u32 = 13;

    /// Blocks model loading until opened.
    struct Gate {
        open: Mutex<bool>,
        opened: Condvar,
    }

    impl Gate {
        fn closed() -> Arc<Self> {
            Arc::new(Self { open: Mutex::new(false), opened: Condvar::new() })
        }

        fn open(&self) {
            *self.open.lock().unwrap() = true;
            self.opened.notify_all();
        }

        fn wait(&self) {
            let mut open = self.open.lock().unwrap();
            while !*open {
                open = self.opened.wait(open).unwrap();
            }
        }
    }

    #[derive(Default)]
    struct FakeEngine {
        gate: Option<Arc<Gate>>,
        /// Holds every successful background removal until opened
        work_gate: Option<Arc<Gate>>,
        fail_model: Option<ModelKind>,
        calls: AtomicUsize,
        /// Widths of the images handed to the engine, in call order
        widths: Mutex<Vec<u32>>,
    }

    impl Engine for FakeEngine {
        type Handle = ModelKind;

        fn load_model(&self, model: ModelKind) -> anyhow::Result<ModelKind> {
            if let Some(gate) = &self.gate {
                gate.wait();
            }
            if self.fail_model == Some(model) {
                anyhow::bail!("weights missing");
            }
            Ok(model)
        }

        fn remove_background(&self, _: &ModelKind, image: &DynamicImage) -> anyhow::Result<RgbaImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.widths.lock().unwrap().push(image.width());
            if image.width() == FAILING_WIDTH {
                anyhow::bail!("inference failed");
            }
            if let Some(gate) = &self.work_gate {
                gate.wait();
            }
            let mut cutout = image.to_rgba8();
            for pixel in cutout.pixels_mut() {
                pixel[3] = 0;
            }
            Ok(cutout)
        }
    }

    #[derive(Debug, Clone)]
    enum Notice {
        Discovered(PathBuf),
        Changed(Vec<FileEntry>),
        Fatal(FatalError),
        Activity(Activity),
    }

    struct Recorder(mpsc::UnboundedSender<Notice>);

    impl Observer for Recorder {
        fn discovered(&mut self, file: &FileEntry) {
            let _ = self.0.send(Notice::Discovered(file.source.clone()));
        }

        fn set_changed(&mut self, files: &FileSet) {
            let _ = self.0.send(Notice::Changed(files.entries()));
        }

        fn fatal(&mut self, error: &FatalError) {
            let _ = self.0.send(Notice::Fatal(error.clone()));
        }

        fn activity(&mut self, activity: Activity) {
            let _ = self.0.send(Notice::Activity(activity));
        }
    }

    struct Harness {
        engine: Arc<FakeEngine>,
        handle: CommandHandle,
        notices: mpsc::UnboundedReceiver<Notice>,
        seen: Vec<Notice>,
        outcome: JoinHandle<CoreResult<SessionOutcome>>,
    }

    impl Harness {
        fn start(engine: FakeEngine, config: SessionConfig) -> Self {
            let engine = Arc::new(engine);
            let (tx, notices) = mpsc::unbounded_channel();
            let (controller, handle) = Controller::new(Arc::clone(&engine), Recorder(tx), config).unwrap();
            Self {
                engine,
                handle,
                notices,
                seen: Vec::new(),
                outcome: tokio::spawn(controller.run()),
            }
        }

        /// Waits for the first notice matching `pred`, keeping everything received.
        async fn until(&mut self, pred: impl Fn(&Notice) -> bool) -> Notice {
            loop {
                let notice = tokio::time::timeout(Duration::from_secs(10), self.notices.recv())
                    .await
                    .expect("timed out waiting for notice")
                    .expect("observer dropped");
                self.seen.push(notice.clone());
                if pred(&notice) {
                    return notice;
                }
            }
        }

        async fn until_settled(&mut self, count: usize) -> Vec<FileEntry> {
            match self
                .until(|n| matches!(n, Notice::Changed(files)
                    if files.len() == count && files.iter().all(|f| f.status.is_terminal())))
                .await
            {
                Notice::Changed(files) => files,
                _ => unreachable!(),
            }
        }

        async fn finish(mut self) -> (SessionOutcome, Vec<Notice>) {
            let outcome = tokio::time::timeout(Duration::from_secs(10), self.outcome)
                .await
                .expect("session did not end")
                .unwrap()
                .unwrap();
            while let Ok(notice) = self.notices.try_recv() {
                self.seen.push(notice);
            }
            (outcome, self.seen)
        }

        fn calls(&self) -> usize {
            self.engine.calls.load(Ordering::SeqCst)
        }
    }

    fn write_png(path: &Path, width: u32) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbaImage::from_pixel(width, 2, Rgba([200, 10, 10, 255])).save(path).unwrap();
    }

    fn discovered_count(notices: &[Notice], source: &Path) -> usize {
        notices
            .iter()
            .filter(|n| matches!(n, Notice::Discovered(s) if s == source))
            .count()
    }

    fn status_history(notices: &[Notice], source: &Path) -> Vec<FileStatus> {
        let mut history: Vec<FileStatus> = Vec::new();
        for notice in notices {
            let Notice::Changed(files) = notice else { continue };
            if let Some(entry) = files.iter().find(|f| f.source == source) {
                if history.last() != Some(&entry.status) {
                    history.push(entry.status);
                }
            }
        }
        history
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn folder_is_processed_to_done() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        write_png(&root.join("a.png"), 4);
        write_png(&root.join("nested").join("b.png"), 4);

        let mut harness = Harness::start(FakeEngine::default(), SessionConfig::default());
        harness
            .handle
            .update_settings(Settings { model: ModelKind::U2netp, bgcolor: BgColor::White })
            .unwrap();
        harness.handle.open_folder(&root).unwrap();

        let files = harness.until_settled(2).await;
        assert!(files.iter().all(|f| f.status == FileStatus::Done));
        harness.until(|n| matches!(n, Notice::Activity(Activity::Idle))).await;

        let output = dir.path().join("root_rembg").join("nested").join("b.png");
        let written = image::open(&output).unwrap().to_rgba8();
        assert_eq!(*written.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(harness.calls(), 2);

        harness.handle.shutdown().unwrap();
        let (outcome, notices) = harness.finish().await;
        assert_eq!(outcome, SessionOutcome::Shutdown);
        assert_eq!(
            status_history(&notices, &root.join("a.png")),
            vec![FileStatus::Pending, FileStatus::Running, FileStatus::Done]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn files_found_while_loading_run_once() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("photo.png");
        write_png(&photo, 4);
        let gate = Gate::closed();

        let engine = FakeEngine { gate: Some(Arc::clone(&gate)), ..Default::default() };
        let mut harness = Harness::start(engine, SessionConfig::default());

        // the same file twice, both discoveries finish before the models load
        harness.handle.open_files([&photo]).unwrap();
        harness.until(|n| matches!(n, Notice::Activity(Activity::Discovering))).await;
        harness.until(|n| matches!(n, Notice::Activity(Activity::LoadingModels))).await;
        harness.handle.open_mixed([&photo]).unwrap();
        harness.until(|n| matches!(n, Notice::Activity(Activity::Discovering))).await;
        harness.until(|n| matches!(n, Notice::Activity(Activity::LoadingModels))).await;
        assert_eq!(harness.calls(), 0);

        gate.open();
        let files = harness.until_settled(1).await;
        assert_eq!(files[0].status, FileStatus::Done);
        assert_eq!(files[0].output, dir.path().join("rembg").join("photo.png"));
        assert_eq!(harness.calls(), 1);

        harness.handle.shutdown().unwrap();
        let (_, notices) = harness.finish().await;
        assert_eq!(discovered_count(&notices, &photo), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn engine_failure_halts_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.png");
        write_png(&broken, FAILING_WIDTH);

        let harness = Harness::start(FakeEngine::default(), SessionConfig::default());
        harness.handle.open_files([&broken]).unwrap();

        let (outcome, notices) = harness.finish().await;
        let SessionOutcome::Fatal(fatal) = outcome else {
            panic!("expected a fatal outcome, got {outcome:?}");
        };
        assert_eq!(fatal.context, FatalContext::File(broken.clone()));
        assert!(fatal.detail.contains("inference failed"));

        let fatals = notices.iter().filter(|n| matches!(n, Notice::Fatal(_))).count();
        assert_eq!(fatals, 1);
        assert_eq!(status_history(&notices, &broken).last(), Some(&FileStatus::Error));
        assert!(!dir.path().join("rembg").join("broken.png").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn halted_session_starts_no_queued_job() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.png");
        write_png(&broken, FAILING_WIDTH);
        let mut sources = vec![broken.clone()];
        for i in 0..6 {
            let path = dir.path().join(format!("fine{i}.png"));
            write_png(&path, 4);
            sources.push(path);
        }
        let work_gate = Gate::closed();

        let engine = FakeEngine { work_gate: Some(Arc::clone(&work_gate)), ..Default::default() };
        let config = SessionConfig { work_workers: 1, ..Default::default() };
        let mut harness = Harness::start(engine, config);
        harness.until(|n| matches!(n, Notice::Activity(Activity::Idle))).await;
        harness.handle.open_files(&sources).unwrap();

        let engine = Arc::clone(&harness.engine);
        let (outcome, _) = harness.finish().await;
        assert!(matches!(outcome, SessionOutcome::Fatal(_)));

        // let the job that may have started in the meantime run to completion
        work_gate.open();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(engine.calls.load(Ordering::SeqCst) <= 2);
        let written = std::fs::read_dir(dir.path().join("rembg"))
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert!(written <= 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn queued_files_run_in_discovery_order() {
        let dir = tempfile::tempdir().unwrap();
        let widths = [7, 5, 9, 6];
        let sources: Vec<PathBuf> = widths
            .iter()
            .map(|width| {
                let path = dir.path().join(format!("w{width}.png"));
                write_png(&path, *width);
                path
            })
            .collect();
        let gate = Gate::closed();

        let engine = FakeEngine { gate: Some(Arc::clone(&gate)), ..Default::default() };
        let config = SessionConfig { work_workers: 1, ..Default::default() };
        let mut harness = Harness::start(engine, config);
        harness.handle.open_files(&sources).unwrap();
        harness.until(|n| matches!(n, Notice::Activity(Activity::Discovering))).await;
        harness.until(|n| matches!(n, Notice::Activity(Activity::LoadingModels))).await;
        assert_eq!(harness.calls(), 0);

        gate.open();
        harness.until_settled(widths.len()).await;
        assert_eq!(*harness.engine.widths.lock().unwrap(), widths.to_vec());

        harness.handle.shutdown().unwrap();
        let (_, notices) = harness.finish().await;
        for source in &sources {
            assert_eq!(discovered_count(&notices, source), 1);
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn continue_policy_keeps_processing() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.png");
        let fine = dir.path().join("fine.png");
        write_png(&broken, FAILING_WIDTH);
        write_png(&fine, 4);

        let config = SessionConfig {
            work_workers: 1,
            error_policy: ErrorPolicy::Continue,
            ..Default::default()
        };
        let mut harness = Harness::start(FakeEngine::default(), config);
        harness.handle.open_files([&broken, &fine]).unwrap();

        let files = harness.until_settled(2).await;
        // errors sort first
        assert_eq!(files[0].source, broken);
        assert_eq!(files[0].status, FileStatus::Error);
        assert_eq!(files[1].status, FileStatus::Done);

        harness.handle.shutdown().unwrap();
        let (outcome, notices) = harness.finish().await;
        assert_eq!(outcome, SessionOutcome::Shutdown);
        assert_eq!(notices.iter().filter(|n| matches!(n, Notice::Fatal(_))).count(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn model_failure_dispatches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("photo.png");
        write_png(&photo, 4);
        let gate = Gate::closed();

        let engine = FakeEngine {
            gate: Some(Arc::clone(&gate)),
            fail_model: Some(ModelKind::Silueta),
            ..Default::default()
        };
        let mut harness = Harness::start(engine, SessionConfig::default());
        harness.handle.open_files([&photo]).unwrap();
        harness.until(|n| matches!(n, Notice::Discovered(_))).await;
        gate.open();

        let engine = Arc::clone(&harness.engine);
        let (outcome, notices) = harness.finish().await;
        match outcome {
            SessionOutcome::Fatal(fatal) => assert_eq!(fatal.context, FatalContext::Model(ModelKind::Silueta)),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
        assert_eq!(status_history(&notices, &photo), vec![FileStatus::Pending]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn non_images_never_enter_the_set() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.png");
        std::fs::write(&notes, "not an image").unwrap();
        let photo = dir.path().join("photo.png");
        write_png(&photo, 4);

        let mut harness = Harness::start(FakeEngine::default(), SessionConfig::default());
        harness.handle.open_files([&notes, &photo]).unwrap();
        harness.until_settled(1).await;

        harness.handle.shutdown().unwrap();
        let (_, notices) = harness.finish().await;
        assert_eq!(discovered_count(&notices, &notes), 0);
        assert_eq!(discovered_count(&notices, &photo), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cleared_files_are_not_rediscovered() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.png");
        let second = dir.path().join("second.png");
        write_png(&first, 4);
        write_png(&second, 4);

        let mut harness = Harness::start(FakeEngine::default(), SessionConfig::default());
        harness.handle.open_files([&first]).unwrap();
        harness.until_settled(1).await;

        harness.handle.clear_completed().unwrap();
        harness.until(|n| matches!(n, Notice::Changed(files) if files.is_empty())).await;

        harness.handle.open_files([&first]).unwrap();
        harness.handle.open_files([&second]).unwrap();
        harness.until(|n| matches!(n, Notice::Discovered(s) if *s == second)).await;
        let files = harness.until_settled(1).await;
        assert_eq!(files[0].source, second);

        harness.handle.remove(&second).unwrap();
        harness.until(|n| matches!(n, Notice::Changed(files) if files.is_empty())).await;

        harness.handle.shutdown().unwrap();
        let (_, notices) = harness.finish().await;
        assert_eq!(discovered_count(&notices, &first), 1);
        assert_eq!(started_count(&notices), 2);
    }

    /// Files seen running in any snapshot
    fn started_count(notices: &[Notice]) -> usize {
        notices
            .iter()
            .filter_map(|n| match n {
                Notice::Changed(files) => Some(files),
                _ => None,
            })
            .flatten()
            .filter(|f| f.status == FileStatus::Running)
            .map(|f| f.source.clone())
            .collect::<std::collections::BTreeSet<_>>()
            .len()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn dropping_every_handle_ends_the_session() {
        let harness = Harness::start(FakeEngine::default(), SessionConfig::default());
        let Harness { outcome, handle, .. } = harness;
        drop(handle);
        let outcome = tokio::time::timeout(Duration::from_secs(10), outcome)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(outcome, SessionOutcome::Shutdown);
    }

    #[tokio::test]
    async fn zero_sized_pool_is_rejected() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let config = SessionConfig { work_workers: 0, ..Default::default() };
        let result = Controller::new(Arc::new(FakeEngine::default()), Recorder(tx), config);
        assert!(matches!(result, Err(CoreError::Config(_))));
    }
}
