//! Flattened snapshot export.
//!
//! The compositor hides selection UI and freezes playing videos for the
//! duration of one snapshot, then puts everything back the way it was,
//! whether or not the snapshot succeeded.

use collage_core::{ObjectId, SceneGraph};
use collage_render::{RenderEngine, RenderError, SnapshotFormat, SnapshotRequest};

/// Base name of exported files.
pub const EXPORT_FILE_STEM: &str = "canvas-export";

/// An encoded image ready to be saved or downloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportCompositor {
    pub pixel_ratio: f64,
    pub jpeg_quality: f32,
}

impl Default for ExportCompositor {
    fn default() -> Self {
        Self {
            pixel_ratio: 2.0,
            jpeg_quality: 0.8,
        }
    }
}

/// What the compositor suspended and must put back.
#[derive(Debug, Default)]
struct Suspended {
    paused: Vec<ObjectId>,
    frame_loops: Vec<ObjectId>,
}

impl ExportCompositor {
    pub fn quality(&self, format: SnapshotFormat) -> f32 {
        match format {
            SnapshotFormat::Png => 1.0,
            SnapshotFormat::Jpeg => self.jpeg_quality,
        }
    }

    pub fn export(
        &self,
        scene: &mut SceneGraph,
        engine: &mut dyn RenderEngine,
        format: SnapshotFormat,
    ) -> Result<ExportPayload, RenderError> {
        engine.set_handle_visible(false);
        engine.set_overlays_visible(false);
        let suspended = freeze(scene, engine);
        engine.request_redraw();

        let request = SnapshotRequest {
            format,
            quality: self.quality(format),
            pixel_ratio: self.pixel_ratio,
        };
        let result = engine.snapshot(&request);

        thaw(scene, engine, suspended);
        engine.set_overlays_visible(true);
        engine.set_handle_visible(true);
        engine.request_redraw();

        let image = result?;
        let file_name = format!("{EXPORT_FILE_STEM}.{}", format.extension());
        log::info!(
            "exported {file_name} {}×{} ({} bytes)",
            image.width,
            image.height,
            image.bytes.len()
        );
        Ok(ExportPayload {
            mime: format.mime(),
            file_name,
            width: image.width,
            height: image.height,
            bytes: image.bytes,
        })
    }
}

fn freeze(scene: &mut SceneGraph, engine: &mut dyn RenderEngine) -> Suspended {
    let mut suspended = Suspended::default();
    for object in scene.iter_mut() {
        let id = object.id;
        if let Some(video) = object.source.video_mut()
            && video.is_playing()
        {
            video.pause();
            suspended.paused.push(id);
            engine.sync(object);
        }
        if engine.frame_loop_active(id) {
            engine.stop_frame_loop(id);
            suspended.frame_loops.push(id);
        }
    }
    if !suspended.paused.is_empty() {
        log::debug!("paused {} videos for export", suspended.paused.len());
    }
    suspended
}

fn thaw(scene: &mut SceneGraph, engine: &mut dyn RenderEngine, suspended: Suspended) {
    for id in suspended.paused {
        if let Some(object) = scene.get_mut(id) {
            if let Some(video) = object.source.video_mut() {
                video.play();
            }
            engine.sync(object);
        }
    }
    for id in suspended.frame_loops {
        engine.start_frame_loop(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collage_core::*;
    use collage_render::CpuEngine;
    use pretty_assertions::assert_eq;

    #[test]
    fn quality_per_format() {
        let c = ExportCompositor::default();
        assert_eq!(c.quality(SnapshotFormat::Png), 1.0);
        assert_eq!(c.quality(SnapshotFormat::Jpeg), 0.8);
    }

    #[test]
    fn export_restores_handle_and_names_file() {
        let mut scene = SceneGraph::new();
        let mut engine = CpuEngine::new(CanvasSize::new(20.0, 10.0));
        let draft = MediaObjectFactory::default()
            .build(
                MediaDescriptor::image("dot", Bitmap::solid(4, 4, Color::BLACK).unwrap()),
                None,
                Point::new(10.0, 5.0),
            )
            .unwrap();
        let id = scene.add(draft);
        engine.mount(scene.get(id).unwrap());
        engine.attach_handle(Some(id));

        let payload = ExportCompositor::default()
            .export(&mut scene, &mut engine, SnapshotFormat::Jpeg)
            .unwrap();
        assert_eq!(payload.file_name, "canvas-export.jpg");
        assert_eq!(payload.mime, "image/jpeg");
        assert_eq!((payload.width, payload.height), (40, 20));
        assert!(engine.tree().handle.visible);
        assert!(engine.tree().overlays_visible);
        assert_eq!(engine.tree().handle.target, Some(id));
    }
}
