use collage_core::{CanvasSizeError, FactoryError};
use collage_render::RenderError;

pub type EditorResult<T> = Result<T, EditorError>;

/// Why media could not be decoded into a descriptor.
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("cannot decode '{name}': {reason}")]
    Undecodable { name: String, reason: String },

    #[error("'{name}' is not an image")]
    NotAnImage { name: String },

    #[error("invalid video URL: {0}")]
    InvalidUrl(String),

    #[error("video backend failed for '{url}': {reason}")]
    Backend { url: String, reason: String },
}

#[derive(thiserror::Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Factory(#[from] FactoryError),

    #[error(transparent)]
    CanvasSize(#[from] CanvasSizeError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("invalid color '{0}'")]
    InvalidColor(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl EditorError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            EditorError::config("x")
                .to_string()
                .contains("configuration error:")
        );
        let err: EditorError = DecodeError::InvalidUrl("   ".into()).into();
        assert!(err.to_string().contains("invalid video URL"));
        let err: EditorError = CanvasSizeError {
            width: 0.0,
            height: 1.0,
        }
        .into();
        assert!(err.to_string().contains("must be positive"));
    }
}
