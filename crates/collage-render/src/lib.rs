//! Rendering boundary for Collage.
//!
//! `RenderEngine` is what the editor talks to. `CpuEngine` is the bundled
//! implementation: a retained draw tree rasterized with tiny-skia.

pub mod engine;
pub mod filter;
pub mod hit;
pub mod paint;
pub mod raster;
pub mod tree;

pub use engine::{
    CoordSpace, EncodedImage, RenderEngine, RenderError, SnapshotFormat, SnapshotRequest,
};
pub use filter::FilterSet;
pub use raster::CpuEngine;
pub use tree::{DrawNode, DrawTree, TransformHandle};
