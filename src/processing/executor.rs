//! Work dispatcher: schedules one job per file and runs the job body.
//!
//! Each job runs on a blocking worker thread. It reports every status change
//! as an event; the controller owns the file set and applies them.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::{Event, EventSender, FatalError, FileEntry, FileStatus, Session, Settings};
use crate::processing::compose::over_background;
use crate::processing::{Engine, ModelSessions};
use crate::utils::{
    ensure_parent_dir, extract_filename, CoreError, CoreResult, ProcessError, ProcessResult,
    OUTPUT_FORMAT,
};

/// Schedules `entry` on the session's work pool without waiting for it.
///
/// `settings` is captured as-is; later changes do not affect this job.
pub fn submit<E: Engine>(
    engine: &Arc<E>,
    session: &Session<E::Handle>,
    entry: &FileEntry,
    settings: Settings,
    events: &EventSender<E::Handle>,
) -> CoreResult<()> {
    let sessions = session.model_sessions().ok_or(CoreError::NotReady)?;
    let engine = Arc::clone(engine);
    let sessions = Arc::clone(sessions);
    let events = events.clone();
    let source = entry.source.clone();
    let output = entry.output.clone();

    debug!(
        "Queueing {} (model {}, background {:?})",
        extract_filename(&source),
        settings.model,
        settings.bgcolor
    );
    session
        .work_pool()
        .submit(move || run_job(engine.as_ref(), &sessions, source, output, settings, &events))?;
    Ok(())
}

/// Job body: moves the file through Running to Done or Error.
pub fn run_job<E: Engine>(
    engine: &E,
    sessions: &ModelSessions<E::Handle>,
    source: PathBuf,
    output: PathBuf,
    settings: Settings,
    events: &EventSender<E::Handle>,
) {
    emit(events, Event::StatusChanged {
        source: source.clone(),
        status: FileStatus::Running,
    });

    match process_file(engine, sessions, &source, &output, settings) {
        Ok(()) => {
            debug!("{} -> {}", extract_filename(&source), output.display());
            emit(events, Event::StatusChanged {
                source,
                status: FileStatus::Done,
            });
        }
        Err(e) => {
            warn!("Processing failed for {}: {}", source.display(), e);
            let fatal = FatalError::file(source.clone(), &e);
            emit(events, Event::StatusChanged {
                source,
                status: FileStatus::Error,
            });
            emit(events, Event::Fatal(fatal));
        }
    }
}

/// Removes the background of one image and writes the composited result.
pub fn process_file<E: Engine>(
    engine: &E,
    sessions: &ModelSessions<E::Handle>,
    source: &Path,
    output: &Path,
    settings: Settings,
) -> ProcessResult<()> {
    let handle = sessions
        .get(settings.model)
        .ok_or(ProcessError::ModelUnavailable(settings.model))?;

    let image = image::open(source).map_err(|e| ProcessError::Decode {
        path: source.to_path_buf(),
        source: e,
    })?;
    debug!(
        "Loaded '{}': {}x{}",
        extract_filename(source),
        image.width(),
        image.height()
    );

    let cutout = engine
        .remove_background(handle, &image)
        .map_err(|e| ProcessError::engine(source, e))?;
    let composed = over_background(&cutout, settings.bgcolor);

    ensure_parent_dir(output)?;
    composed
        .save_with_format(output, OUTPUT_FORMAT)
        .map_err(|e| ProcessError::Encode {
            path: output.to_path_buf(),
            source: e,
        })
}

fn emit<H>(events: &EventSender<H>, event: Event<H>) {
    if let Err(e) = events.send(event) {
        debug!("Session closed, dropping {:?}", e.0);
    }
}
