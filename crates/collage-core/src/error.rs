use crate::model::{MediaClass, MediaKind};

/// Why a decoded asset could not be turned into a media object.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FactoryError {
    #[error("media has no usable size ({width}×{height})")]
    EmptyMedia { width: f64, height: f64 },

    #[error("{kind:?} cannot be built from {class:?} media")]
    KindMismatch { kind: MediaKind, class: MediaClass },
}

/// Rejected canvas resize request.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
#[error("canvas dimensions must be positive, got {width}×{height}")]
pub struct CanvasSizeError {
    pub width: f64,
    pub height: f64,
}
