//! Asynchronous media decoding.
//!
//! Each media class has one `decode → MediaDescriptor` operation. Nothing
//! touches the scene until the returned future resolves successfully; a
//! failed decode surfaces as a `DecodeError` and leaves the scene alone.

use crate::error::DecodeError;
use collage_core::{Bitmap, MediaDescriptor, Playback, VideoSource};

/// A file handed over by the input layer.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    /// Declared MIME type, e.g. `image/png`.
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// Decode an image off the event loop.
pub async fn decode_image(name: &str, bytes: Vec<u8>) -> Result<MediaDescriptor, DecodeError> {
    let owned = name.to_string();
    let bitmap = tokio::task::spawn_blocking(move || decode_bitmap(&owned, &bytes))
        .await
        .map_err(|e| DecodeError::Undecodable {
            name: name.to_string(),
            reason: e.to_string(),
        })??;
    Ok(MediaDescriptor::image(name, bitmap))
}

/// Decode encoded image bytes into a straight-alpha RGBA bitmap.
pub fn decode_bitmap(name: &str, bytes: &[u8]) -> Result<Bitmap, DecodeError> {
    let undecodable = |reason: String| DecodeError::Undecodable {
        name: name.to_string(),
        reason,
    };
    let decoded = image::load_from_memory(bytes).map_err(|e| undecodable(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::debug!("decoded image '{name}' {width}×{height}");
    Bitmap::from_rgba(width, height, rgba.into_raw())
        .ok_or_else(|| undecodable("image has no pixels".into()))
}

/// An opened video as reported by the host.
#[derive(Debug)]
pub struct VideoStream {
    pub width: f64,
    pub height: f64,
    /// First decoded frame, if the host could seek to one.
    pub poster: Option<Bitmap>,
    pub playback: Option<Box<dyn Playback>>,
}

/// Host-side video loading (metadata, first frame, playback).
#[allow(async_fn_in_trait)]
pub trait VideoBackend {
    async fn open(&self, url: &str) -> Result<VideoStream, String>;
}

const VIDEO_SCHEMES: [&str; 4] = ["http://", "https://", "blob:", "data:"];

/// Trim and check a video URL before any decode starts.
pub fn validate_video_url(url: &str) -> Result<&str, DecodeError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(DecodeError::InvalidUrl("empty URL".into()));
    }
    let lower = url.to_ascii_lowercase();
    let scheme = VIDEO_SCHEMES.iter().find(|s| lower.starts_with(*s));
    match scheme {
        Some(s) if url.len() > s.len() => Ok(url),
        _ => Err(DecodeError::InvalidUrl(url.to_string())),
    }
}

/// Display name for a video: the last path segment of its URL.
pub fn video_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    // drop scheme and host
    let path = match path.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map_or("", |(_, p)| p),
        None => path,
    };
    path.rsplit('/')
        .find(|seg| !seg.is_empty() && !seg.contains(':'))
        .unwrap_or("video")
        .to_string()
}

pub async fn decode_video<B: VideoBackend>(
    backend: &B,
    url: &str,
) -> Result<MediaDescriptor, DecodeError> {
    let url = validate_video_url(url)?;
    let stream = backend.open(url).await.map_err(|reason| DecodeError::Backend {
        url: url.to_string(),
        reason,
    })?;
    log::debug!("opened video '{url}' {}×{}", stream.width, stream.height);
    Ok(MediaDescriptor::video(
        video_name(url),
        stream.width,
        stream.height,
        VideoSource::new(stream.poster, stream.playback),
    ))
}
