//! CPU rasterizer
//!
//! Features:
//! - Full view-volume clipping (Sutherland-Hodgman) with re-triangulation
//! - Fixed-point edge functions with the top-left fill rule
//! - Perspective-correct varyings (toggleable for affine warping)
//! - Depth buffer with configurable compare function
//! - Wireframe mode via Bresenham lines

mod clip;
mod fill;
mod line;
mod render;
mod target;
mod types;

pub use clip::*;
pub use fill::*;
pub use line::*;
pub use render::*;
pub use target::*;
pub use types::*;
