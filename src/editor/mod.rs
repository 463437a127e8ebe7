//! In-app raster editor: masked inpainting, crop/resize, and color filters
//! over the most recent generated image.

pub mod crop;
pub mod filters;
pub mod mapper;
pub mod mask;
pub mod session;
pub mod surface;

pub use session::{ApplyPlan, EditSession, EditTool, MagicMode};
