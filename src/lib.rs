//! softraster: a software rasterizer
//!
//! Renders a scene graph of meshes, cameras and lights into a CPU-side
//! color + depth buffer. Nothing is delegated to a GPU:
//! - Clip-space clipping against the full view volume
//! - Fixed-point triangle fill with the top-left rule
//! - Perspective-correct interpolation and depth testing
//! - Solid, normal-debug and Blinn-Phong materials
//! - RON scene files, PNG output

pub mod error;
pub mod logging;
pub mod material;
pub mod math;
pub mod rasterizer;
pub mod scene;

pub use error::{Error, Result};
pub use material::{Material, MaterialKind};
pub use rasterizer::{Color, RasterSettings, Rasterizer, RenderTarget};
pub use scene::{Camera, Geometry, Light, Mesh, Node, NodeId, NodeKind, Scene};

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
