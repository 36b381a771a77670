pub mod error;
pub mod factory;
pub mod id;
pub mod model;
pub mod scene;
pub mod viewport;

pub use error::{CanvasSizeError, FactoryError};
pub use factory::{MediaDescriptor, MediaObjectFactory, fit_within};
pub use id::{IdGenerator, ObjectId};
pub use model::*;
pub use scene::SceneGraph;
pub use viewport::{CanvasSize, Resized, ScaleLimits, ViewTransform};

// Re-export kurbo geometry so downstream crates agree on the types
pub use kurbo::{Point, Rect, Size, Vec2};
