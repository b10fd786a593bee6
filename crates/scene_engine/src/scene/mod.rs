//! Scenes and per-frame context

mod frame;
#[allow(clippy::module_inception)]
mod scene;

pub use frame::{FrameContext, Viewport};
pub use scene::{Scene, Updatable};
