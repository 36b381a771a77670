//! Style panel state for the active object.

use collage_core::{Color, MediaKind, MediaObject, ObjectId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StylePanelState {
    pub id: ObjectId,
    pub name: String,
    pub kind: MediaKind,
    pub opacity: f64,
    /// Rounded opacity shown next to the slider.
    pub opacity_percent: u32,
    pub brightness: f64,
    pub contrast: f64,
    pub shadow_blur: f64,
    pub shadow_color: String,
    pub border_width: f64,
    pub border_color: String,
    pub locked: bool,
    pub lock_label: &'static str,
    /// `None` for non-video objects.
    pub playing: Option<bool>,
}

impl StylePanelState {
    pub fn from_object(object: &MediaObject) -> Self {
        let style = &object.style;
        let shadow = style.shadow();
        Self {
            id: object.id,
            name: object.name.clone(),
            kind: object.kind(),
            opacity: style.opacity(),
            opacity_percent: (style.opacity() * 100.0).round() as u32,
            brightness: style.brightness(),
            contrast: style.contrast(),
            shadow_blur: shadow.blur,
            shadow_color: shadow.color.to_hex(),
            border_width: style.stroke_width(),
            border_color: style
                .stroke()
                .map_or(Color::BLACK, |s| s.color)
                .to_hex(),
            locked: object.locked,
            lock_label: if object.locked {
                "Unlock Position"
            } else {
                "Lock Position"
            },
            playing: object.source.video().map(|v| v.is_playing()),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
