//! Scene graph: nodes, cameras, lights, geometry and scene files

mod camera;
mod file;
mod geometry;
mod graph;
mod light;
mod node;

pub use camera::*;
pub use file::*;
pub use geometry::*;
pub use graph::*;
pub use light::*;
pub use node::*;
