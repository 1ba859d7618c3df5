// Module declarations in dependency order
pub mod utils;
pub mod worker;
pub mod core;
pub mod processing;
pub mod commands;

// Public exports for the GUI layer
pub use commands::{Command, CommandHandle};
pub use self::core::{
    Activity, BgColor, Controller, ErrorPolicy, FatalContext, FatalError, FileEntry, FileSet,
    FileStatus, ModelKind, Observer, SessionConfig, SessionOutcome, Settings, StatusCounts,
};
pub use processing::{DiscoveryRequest, Engine, ModelSessions};
pub use utils::{init_logging, CoreError, CoreResult, ModelLoadError, ProcessError};

// The GUI and the inference engine live outside this crate: the GUI drives a
// `Controller` through its `CommandHandle` and implements `Observer`; the
// engine implements `Engine`.
