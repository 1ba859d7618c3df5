//! Core types and state management.
//!
//! - [`Controller`]: single consumer loop owning all observable state
//! - [`Session`]: model sessions and worker pools
//! - [`FileSet`] / [`FileEntry`]: the files shown to the user
//! - [`TaskQueue`]: deduplication and hold-until-ready queue
//! - [`Event`] / [`Observer`]: the event bus and its subscriber

mod controller;
mod events;
mod file;
mod queue;
mod state;
mod types;

pub use controller::{Controller, SessionOutcome};
pub use events::{Activity, Event, EventReceiver, EventSender, FatalContext, FatalError, Observer};
pub use file::{FileEntry, FileSet, StatusCounts};
pub use queue::TaskQueue;
pub use state::Session;
pub use types::{BgColor, ErrorPolicy, FileStatus, ModelKind, SessionConfig, Settings};
