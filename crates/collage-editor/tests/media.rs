//! Integration tests: async media loading, video playback and export.
//!
//! Videos come from a scripted backend whose playback handles record what
//! the editor did to them.

use collage_core::*;
use collage_editor::{
    DecodeError, Editor, EditorConfig, EditorError, FileUpload, VideoBackend, VideoStream,
};
use collage_render::{CpuEngine, RenderEngine, SnapshotFormat};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct PlaybackLog {
    playing: bool,
    released: bool,
    plays: u32,
    pauses: u32,
    /// What the decoder would show now.
    frame: Option<Bitmap>,
}

#[derive(Debug)]
struct FakePlayback(Rc<RefCell<PlaybackLog>>);

impl Playback for FakePlayback {
    fn play(&mut self) {
        let mut log = self.0.borrow_mut();
        log.playing = true;
        log.plays += 1;
    }

    fn pause(&mut self) {
        let mut log = self.0.borrow_mut();
        log.playing = false;
        log.pauses += 1;
    }

    fn is_playing(&self) -> bool {
        self.0.borrow().playing
    }

    fn release(&mut self) {
        let mut log = self.0.borrow_mut();
        log.playing = false;
        log.released = true;
    }

    fn current_frame(&self) -> Option<Bitmap> {
        self.0.borrow().frame.clone()
    }
}

#[derive(Default)]
struct FakeBackend {
    log: Rc<RefCell<PlaybackLog>>,
}

impl VideoBackend for FakeBackend {
    async fn open(&self, url: &str) -> Result<VideoStream, String> {
        if url.contains("missing") {
            return Err("404".into());
        }
        Ok(VideoStream {
            width: 1280.0,
            height: 720.0,
            poster: Bitmap::solid(16, 9, Color::rgba(0.0, 0.0, 1.0, 1.0)),
            playback: Some(Box::new(FakePlayback(self.log.clone()))),
        })
    }
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn editor() -> Editor<CpuEngine> {
    Editor::headless(EditorConfig::default()).unwrap()
}

// ─── Images ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn upload_cascades_and_skips_non_images() {
    let mut editor = editor();
    let report = editor
        .upload(vec![
            FileUpload::new("a.png", "image/png", png(40, 40)),
            FileUpload::new("notes.txt", "text/plain", b"hello".to_vec()),
            FileUpload::new("broken.png", "image/png", vec![1, 2, 3]),
            FileUpload::new("b.png", "image/png", png(40, 40)),
        ])
        .await;

    assert_eq!(report.placed.len(), 2);
    assert_eq!(report.skipped, vec!["notes.txt".to_string()]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "broken.png");

    let positions: Vec<_> = report
        .placed
        .iter()
        .map(|id| editor.scene().get(*id).unwrap().position)
        .collect();
    // slots follow the batch index, skipped and failed files included
    assert_eq!(
        positions,
        vec![Point::new(200.0, 200.0), Point::new(350.0, 350.0)]
    );
    assert_eq!(editor.selection(), Some(report.placed[1]));
}

#[tokio::test]
async fn skipped_file_keeps_its_cascade_slot() {
    let mut editor = editor();
    let report = editor
        .upload(vec![
            FileUpload::new("notes.txt", "text/plain", b"hello".to_vec()),
            FileUpload::new("a.png", "image/png", png(40, 40)),
        ])
        .await;
    assert_eq!(report.placed.len(), 1);
    let object = editor.scene().get(report.placed[0]).unwrap();
    assert_eq!(object.position, Point::new(250.0, 250.0));
}

#[tokio::test]
async fn failed_drop_leaves_scene_alone() {
    let mut editor = editor();
    let err = editor
        .drop_image("junk.png", vec![0; 8], None, Point::new(10.0, 10.0))
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::Decode(DecodeError::Undecodable { .. })));
    assert!(editor.scene().is_empty());
}

#[tokio::test]
async fn drop_lands_under_the_pointer_at_any_zoom() {
    let mut editor = editor();
    editor.set_scale(2.0, Point::ZERO);
    let id = editor
        .drop_image("Triangle.png", png(400, 300), None, Point::new(300.0, 200.0))
        .await
        .unwrap();
    let object = editor.scene().get(id).unwrap();
    assert_eq!(object.position, Point::new(150.0, 100.0));
    assert_eq!(object.kind(), MediaKind::ShapeTriangle);
    // 400×300 → 200×150, radius = 75
    assert!(matches!(object.geometry, Geometry::Triangle { radius, .. } if radius == 75.0));
}

// ─── Videos ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn invalid_urls_are_rejected_before_decode() {
    let mut editor = editor();
    let backend = FakeBackend::default();
    for url in ["", "   ", "ftp://host/clip.mp4", "clip.mp4"] {
        let err = editor.add_video(&backend, url).await.unwrap_err();
        assert!(matches!(err, EditorError::Decode(DecodeError::InvalidUrl(_))));
    }
    let err = editor
        .add_video(&backend, "https://cdn.example/missing.mp4")
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::Decode(DecodeError::Backend { .. })));
    assert!(editor.scene().is_empty());
}

#[tokio::test]
async fn video_is_downscaled_and_centred() {
    let mut editor = editor();
    let backend = FakeBackend::default();
    let id = editor
        .add_video(&backend, " https://cdn.example/media/clip.mp4 ")
        .await
        .unwrap();
    let object = editor.scene().get(id).unwrap();
    assert_eq!(object.name, "clip.mp4");
    assert_eq!(object.kind(), MediaKind::Video);
    assert_eq!(
        object.geometry,
        Geometry::Video {
            width: 250.0,
            height: 140.625,
        }
    );
    assert_eq!(object.position, Point::new(400.0, 300.0));
    assert_eq!(editor.style_panel().unwrap().playing, Some(false));
}

#[tokio::test]
async fn playback_toggle_drives_the_frame_loop() {
    let mut editor = editor();
    let backend = FakeBackend::default();
    let id = editor
        .add_video(&backend, "https://cdn.example/clip.mp4")
        .await
        .unwrap();

    assert_eq!(editor.toggle_playback(id), Some(true));
    assert!(backend.log.borrow().playing);
    assert!(editor.engine().frame_loop_active(id));
    assert!(editor.engine().tree().node(id).unwrap().playing);

    assert_eq!(editor.toggle_playback(id), Some(false));
    assert!(!backend.log.borrow().playing);
    assert!(!editor.engine().frame_loop_active(id));
}

#[tokio::test]
async fn delete_releases_the_video() {
    let mut editor = editor();
    let backend = FakeBackend::default();
    let id = editor
        .add_video(&backend, "https://cdn.example/clip.mp4")
        .await
        .unwrap();
    editor.toggle_playback(id);

    assert_eq!(editor.delete_selected(), Some(id));
    let log = backend.log.borrow();
    assert!(log.released);
    assert!(!log.playing);
    assert!(!editor.engine().frame_loop_active(id));
}

#[tokio::test]
async fn duplicated_video_is_a_frozen_frame() {
    let mut editor = editor();
    let backend = FakeBackend::default();
    let original = editor
        .add_video(&backend, "https://cdn.example/clip.mp4")
        .await
        .unwrap();
    let clone = editor.duplicate_selected().unwrap();

    assert_eq!(editor.toggle_playback(clone), None);
    assert_eq!(editor.toggle_playback(original), Some(true));

    // deleting the frozen copy leaves the original playing
    assert_eq!(editor.selection(), Some(clone));
    editor.delete_selected();
    assert!(!backend.log.borrow().released);
    assert!(backend.log.borrow().playing);
}

#[tokio::test]
async fn clear_releases_every_video() {
    let mut editor = editor();
    let backend = FakeBackend::default();
    let id = editor
        .add_video(&backend, "https://cdn.example/clip.mp4")
        .await
        .unwrap();
    editor.toggle_playback(id);
    assert_eq!(editor.clear_canvas(|| true), 1);
    assert!(backend.log.borrow().released);
    assert!(!editor.engine().frame_loop_active(id));
}

// ─── Frame refresh ──────────────────────────────────────────────────────

fn solid(color: Color) -> Bitmap {
    Bitmap::solid(16, 9, color).unwrap()
}

#[tokio::test]
async fn ticking_pulls_frames_only_while_playing() {
    let mut editor = editor();
    let backend = FakeBackend::default();
    let id = editor
        .add_video(&backend, "https://cdn.example/clip.mp4")
        .await
        .unwrap();

    // not playing yet: the poster stays
    backend.log.borrow_mut().frame = Some(solid(Color::WHITE));
    assert_eq!(editor.tick_frames(), 0);

    editor.toggle_playback(id);
    let green = solid(Color::rgba(0.0, 1.0, 0.0, 1.0));
    backend.log.borrow_mut().frame = Some(green.clone());
    assert_eq!(editor.tick_frames(), 1);
    let node = editor.engine().tree().node(id).unwrap();
    assert!(node.frame.as_ref().unwrap().shares_pixels(&green));
    // same frame again is not a refresh
    assert_eq!(editor.tick_frames(), 0);

    editor.toggle_playback(id);
    backend.log.borrow_mut().frame = Some(solid(Color::WHITE));
    assert_eq!(editor.tick_frames(), 0);
    let node = editor.engine().tree().node(id).unwrap();
    assert!(node.frame.as_ref().unwrap().shares_pixels(&green));
}

#[tokio::test]
async fn new_frames_are_refiltered() {
    let mut editor = editor();
    let backend = FakeBackend::default();
    let id = editor
        .add_video(&backend, "https://cdn.example/clip.mp4")
        .await
        .unwrap();
    editor.set_brightness(-1.0);
    editor.toggle_playback(id);

    backend.log.borrow_mut().frame = Some(solid(Color::WHITE));
    assert_eq!(editor.tick_frames(), 1);
    let node = editor.engine().tree().node(id).unwrap();
    assert_eq!(&node.frame.as_ref().unwrap().pixels()[..4], &[255u8, 255, 255, 255]);
    assert_eq!(&node.raster().unwrap().pixels()[..4], &[0u8, 0, 0, 255]);
}

#[tokio::test]
async fn export_captures_the_frame_on_screen() {
    let mut editor = editor();
    let backend = FakeBackend::default();
    let id = editor
        .add_video(&backend, "https://cdn.example/clip.mp4")
        .await
        .unwrap();
    editor.toggle_playback(id);
    backend.log.borrow_mut().frame = Some(solid(Color::rgba(1.0, 0.0, 0.0, 1.0)));
    editor.tick_frames();
    editor.deselect();

    // the decoder moves on, but nothing ticked since
    backend.log.borrow_mut().frame = Some(solid(Color::WHITE));
    let payload = editor.export(SnapshotFormat::Png).unwrap();
    let decoded = image::load_from_memory(&payload.bytes).unwrap().to_rgba8();
    // video centre (400,300) at pixel ratio 2
    assert_eq!(decoded.get_pixel(800, 600).0, [255, 0, 0, 255]);

    // the loop is back after export and picks up the newer frame
    assert!(editor.engine().frame_loop_active(id));
    assert_eq!(editor.tick_frames(), 1);
}

// ─── Export ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn export_freezes_video_then_restores() {
    let mut editor = editor();
    let backend = FakeBackend::default();
    let id = editor
        .add_video(&backend, "https://cdn.example/clip.mp4")
        .await
        .unwrap();
    editor.toggle_playback(id);
    let pauses = backend.log.borrow().pauses;

    let payload = editor.export(SnapshotFormat::Png).unwrap();
    assert_eq!(payload.file_name, "canvas-export.png");
    assert_eq!(payload.mime, "image/png");
    assert_eq!((payload.width, payload.height), (1600, 1200));

    let log = backend.log.borrow();
    assert_eq!(log.pauses, pauses + 1);
    assert_eq!(log.plays, 2);
    assert!(log.playing);
    assert!(editor.engine().frame_loop_active(id));
    assert!(editor.engine().tree().handle.visible);
    assert!(editor.engine().tree().overlays_visible);
    assert_eq!(editor.engine().tree().handle.target, Some(id));
}

#[test]
fn export_hides_the_handle_in_the_image() {
    let mut editor = editor();
    let red = Color::rgba(1.0, 0.0, 0.0, 1.0);
    let bitmap = Bitmap::solid(100, 100, red).unwrap();
    editor
        .place(MediaDescriptor::image("tile", bitmap), None, Point::new(400.0, 300.0))
        .unwrap();

    // the corner anchor covers the object's top-left corner (350,250)
    let (x, y) = (2 * 350 + 3, 2 * 250 + 3);
    let live = editor.engine().render(2.0).unwrap();
    let anchor = live.pixel(x, y).unwrap();
    assert_eq!((anchor.green(), anchor.blue()), (255, 255));

    let payload = editor.export(SnapshotFormat::Png).unwrap();
    let decoded = image::load_from_memory(&payload.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(x, y).0, [255, 0, 0, 255]);
    // outside the object nothing is painted
    assert_eq!(decoded.get_pixel(10, 10).0[3], 0);
}

#[test]
fn jpeg_export_is_opaque() {
    let mut editor = editor();
    let payload = editor.export(SnapshotFormat::Jpeg).unwrap();
    assert_eq!(payload.file_name, "canvas-export.jpg");
    let decoded = image::load_from_memory(&payload.bytes).unwrap().to_rgb8();
    let px = decoded.get_pixel(5, 5).0;
    assert!(px.iter().all(|c| *c > 240), "{px:?}");
}
