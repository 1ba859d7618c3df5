//! Everything that touches images: discovery, the engine contract, the model
//! registry and the per-file job.

pub mod compose;
pub mod discovery;
pub mod engine;
pub mod executor;
pub mod registry;

pub use discovery::{open_files, open_folder, open_mixed, Discovered, DiscoveryRequest};
pub use engine::Engine;
pub use registry::{load_models, spawn_registry, ModelSessions};
