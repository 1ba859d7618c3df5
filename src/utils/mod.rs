pub mod error;
pub mod formats;
pub mod fs;
pub mod logging;

pub use error::{
    error_chain, BoxError, CoreError, CoreResult, ModelLoadError, ProcessError, ProcessResult,
};
pub use formats::{probe_image, with_output_extension, OUTPUT_EXTENSION, OUTPUT_FORMAT};
pub use fs::{absolutize, ensure_parent_dir, extract_filename};
pub use logging::init_logging;
