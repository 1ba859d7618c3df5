//! Contract of the background-removal engine.

use image::{DynamicImage, RgbaImage};
use crate::core::ModelKind;

/// External component that does the actual background removal.
///
/// Both calls are synchronous and may block for a long time; the core only
/// ever invokes them from blocking worker threads.
pub trait Engine: Send + Sync + 'static {
    /// Loaded model, shared read-only by every job using that model
    type Handle: Send + Sync + 'static;

    fn load_model(&self, model: ModelKind) -> anyhow::Result<Self::Handle>;

    /// Returns `image` with its background made transparent.
    fn remove_background(
        &self,
        handle: &Self::Handle,
        image: &DynamicImage,
    ) -> anyhow::Result<RgbaImage>;
}
