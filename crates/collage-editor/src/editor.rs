//! The top-level editor state object.
//!
//! `Editor` owns the scene graph, the selection, the viewport and the
//! rendering engine. Every input event maps to one method here, and each
//! method leaves scene, selection and engine consistent before returning.

use crate::config::EditorConfig;
use crate::decode::{FileUpload, VideoBackend, decode_image, decode_video};
use crate::error::{EditorError, EditorResult};
use crate::export::{ExportCompositor, ExportPayload};
use crate::panel::StylePanelState;
use crate::selection::SelectionController;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::viewport::ViewportController;
use collage_core::{
    CanvasSize, Color, MediaDescriptor, MediaKind, MediaObject, MediaObjectFactory,
    ObjectTransform, ObjectId, Point, Resized, SceneGraph, Style, Vec2, ViewTransform,
};
use collage_render::{CpuEngine, FilterSet, RenderEngine, SnapshotFormat};

/// Outcome of a multi-file upload.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub placed: Vec<ObjectId>,
    /// Files skipped because they are not images.
    pub skipped: Vec<String>,
    pub failed: Vec<(String, EditorError)>,
}

pub struct Editor<E: RenderEngine> {
    config: EditorConfig,
    factory: MediaObjectFactory,
    compositor: ExportCompositor,
    scene: SceneGraph,
    selection: SelectionController,
    viewport: ViewportController,
    engine: E,
}

impl Editor<CpuEngine> {
    /// Editor backed by the CPU engine, sized from `config`.
    pub fn headless(config: EditorConfig) -> EditorResult<Self> {
        let engine = CpuEngine::new(config.canvas);
        Self::new(config, engine)
    }
}

impl<E: RenderEngine> Editor<E> {
    /// Fails when `config` does not validate.
    pub fn new(config: EditorConfig, mut engine: E) -> EditorResult<Self> {
        config.validate()?;
        let viewport = ViewportController::new(&config);
        engine.resize(viewport.canvas());
        engine.set_view(viewport.view());
        Ok(Self {
            factory: config.factory(),
            compositor: ExportCompositor {
                pixel_ratio: config.export_pixel_ratio,
                jpeg_quality: config.jpeg_quality,
            },
            scene: SceneGraph::new(),
            selection: SelectionController::new(),
            viewport,
            engine,
            config,
        })
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn selection(&self) -> Option<ObjectId> {
        self.selection.active()
    }

    pub fn selected(&self) -> Option<&MediaObject> {
        self.scene.get(self.selection.active()?)
    }

    pub fn view(&self) -> ViewTransform {
        self.viewport.view()
    }

    pub fn canvas(&self) -> CanvasSize {
        self.viewport.canvas()
    }

    // ─── Placement ───────────────────────────────────────────────────────

    /// Build an object from decoded media, add it on top and select it.
    /// `position` is in content space.
    pub fn place(
        &mut self,
        descriptor: MediaDescriptor,
        kind: Option<MediaKind>,
        position: Point,
    ) -> EditorResult<ObjectId> {
        let draft = self.factory.build(descriptor, kind, position)?;
        let id = self.scene.add(draft);
        if let Some(object) = self.scene.get(id) {
            self.engine.mount(object);
        }
        log::debug!("placed {id} at ({:.1}, {:.1})", position.x, position.y);
        self.selection.select(&self.scene, &mut self.engine, id);
        Ok(id)
    }

    /// Decode a dropped image and place it under the drop point.
    pub async fn drop_image(
        &mut self,
        name: &str,
        bytes: Vec<u8>,
        kind: Option<MediaKind>,
        screen: Point,
    ) -> EditorResult<ObjectId> {
        let descriptor = decode_image(name, bytes)
            .await
            .inspect_err(|e| log::warn!("drop rejected: {e}"))?;
        let position = self.viewport.to_content(screen);
        self.place(descriptor, kind, position)
    }

    /// Place every image among `files` on a diagonal cascade keyed by the
    /// file's index in the batch. Other files are skipped but keep their
    /// slot; a failed decode only skips that file.
    pub async fn upload(&mut self, files: Vec<FileUpload>) -> UploadReport {
        let mut report = UploadReport::default();
        for (index, file) in files.into_iter().enumerate() {
            if !file.is_image() {
                log::debug!("skipping '{}' ({})", file.name, file.mime);
                report.skipped.push(file.name);
                continue;
            }
            let offset = self.config.upload_origin + self.config.upload_step * index as f64;
            let placed = match decode_image(&file.name, file.bytes).await {
                Ok(descriptor) => self.place(descriptor, None, Point::new(offset, offset)),
                Err(e) => Err(e.into()),
            };
            match placed {
                Ok(id) => report.placed.push(id),
                Err(e) => {
                    log::warn!("upload of '{}' failed: {e}", file.name);
                    report.failed.push((file.name, e));
                }
            }
        }
        report
    }

    /// Open a video by URL and place it at the centre of the visible area.
    pub async fn add_video<B: VideoBackend>(
        &mut self,
        backend: &B,
        url: &str,
    ) -> EditorResult<ObjectId> {
        let descriptor = decode_video(backend, url)
            .await
            .inspect_err(|e| log::warn!("video rejected: {e}"))?;
        let position = self.viewport.to_content(self.viewport.canvas().center());
        self.place(descriptor, Some(MediaKind::Video), position)
    }

    // ─── Selection & direct manipulation ─────────────────────────────────

    /// Select the topmost object under a canvas pixel, or deselect when
    /// the pixel hits background.
    pub fn click(&mut self, screen: Point) -> Option<ObjectId> {
        match self.engine.hit_test(screen) {
            Some(id) => {
                self.selection.select(&self.scene, &mut self.engine, id);
                Some(id)
            }
            None => {
                self.selection.deselect_all(&mut self.engine);
                None
            }
        }
    }

    pub fn select(&mut self, id: ObjectId) -> bool {
        self.selection.select(&self.scene, &mut self.engine, id)
    }

    pub fn deselect(&mut self) {
        self.selection.deselect_all(&mut self.engine);
    }

    /// Move the active object by a screen-space delta. Locked objects
    /// stay put.
    pub fn drag_selected(&mut self, dx: f64, dy: f64) -> bool {
        let scale = self.viewport.scale();
        let Some(object) = active_object(&mut self.scene, &self.selection) else {
            return false;
        };
        if object.locked {
            return false;
        }
        object.position += Vec2::new(dx, dy) / scale;
        self.engine.sync(object);
        self.engine.request_redraw();
        true
    }

    /// Apply a transform-handle edit. Ignored while the handle is detached.
    pub fn transform_selected(&mut self, scale_x: f64, scale_y: f64, rotation_deg: f64) -> bool {
        if ![scale_x, scale_y, rotation_deg].iter().all(|v| v.is_finite()) {
            return false;
        }
        let Some(object) = active_object(&mut self.scene, &self.selection) else {
            return false;
        };
        if object.locked {
            return false;
        }
        object.transform = ObjectTransform {
            scale_x: scale_x.max(ObjectTransform::MIN_SCALE),
            scale_y: scale_y.max(ObjectTransform::MIN_SCALE),
            rotation_deg,
        };
        self.engine.sync(object);
        self.engine.request_redraw();
        true
    }

    // ─── Style ───────────────────────────────────────────────────────────

    pub fn style_panel(&self) -> Option<StylePanelState> {
        self.selected().map(StylePanelState::from_object)
    }

    pub fn set_opacity(&mut self, opacity: f64) -> bool {
        self.restyle(|s| s.set_opacity(opacity))
    }

    pub fn set_brightness(&mut self, brightness: f64) -> bool {
        self.restyle(|s| s.set_brightness(brightness))
    }

    pub fn set_contrast(&mut self, contrast: f64) -> bool {
        self.restyle(|s| s.set_contrast(contrast))
    }

    /// Set the shadow blur, keeping the current shadow colour.
    pub fn set_shadow_blur(&mut self, blur: f64) -> bool {
        self.restyle(|s| s.set_shadow(blur, s.shadow().color))
    }

    pub fn set_shadow_color(&mut self, hex: &str) -> EditorResult<bool> {
        let color = parse_color(hex)?;
        Ok(self.restyle(|s| s.set_shadow_color(color)))
    }

    /// Set border width and colour. Width 0 removes the border.
    pub fn set_border(&mut self, width: f64, hex: &str) -> EditorResult<bool> {
        let color = parse_color(hex)?;
        Ok(self.restyle(|s| s.set_stroke(width, color)))
    }

    pub fn set_border_color(&mut self, hex: &str) -> EditorResult<bool> {
        let color = parse_color(hex)?;
        Ok(self.restyle(|s| s.set_stroke_color(color)))
    }

    fn restyle(&mut self, edit: impl FnOnce(&mut Style)) -> bool {
        let Some(object) = active_object(&mut self.scene, &self.selection) else {
            return false;
        };
        let before = filters_of(&object.style);
        edit(&mut object.style);
        let after = filters_of(&object.style);
        let id = object.id;
        self.engine.sync(object);
        if after != before {
            self.engine.apply_filters(id, after);
        }
        self.engine.request_redraw();
        true
    }

    // ─── Selection commands ──────────────────────────────────────────────

    pub fn delete_selected(&mut self) -> Option<ObjectId> {
        self.selection.delete(&mut self.scene, &mut self.engine)
    }

    pub fn duplicate_selected(&mut self) -> Option<ObjectId> {
        let offset = self.config.duplicate_offset;
        self.selection.duplicate(&mut self.scene, &mut self.engine, offset)
    }

    pub fn toggle_lock(&mut self) -> Option<bool> {
        self.selection.toggle_lock(&mut self.scene, &mut self.engine)
    }

    pub fn bring_forward(&mut self) -> bool {
        self.selection.move_up(&mut self.scene, &mut self.engine)
    }

    pub fn send_backward(&mut self) -> bool {
        self.selection.move_down(&mut self.scene, &mut self.engine)
    }

    /// Play or pause a video object. Returns the new playing state, or
    /// `None` when `id` has no playable video.
    pub fn toggle_playback(&mut self, id: ObjectId) -> Option<bool> {
        let object = self.scene.get_mut(id)?;
        let video = object.source.video_mut()?;
        let playing = if video.is_playing() {
            video.pause();
            self.engine.stop_frame_loop(id);
            false
        } else {
            if !video.play() {
                return None;
            }
            self.engine.start_frame_loop(id);
            true
        };
        self.engine.sync(object);
        self.engine.request_redraw();
        log::debug!("{id} {}", if playing { "playing" } else { "paused" });
        Some(playing)
    }

    /// Pull the current frame of every video whose refresh loop is
    /// running. Returns how many nodes received a new frame.
    pub fn tick_frames(&mut self) -> usize {
        let mut refreshed = 0;
        for object in self.scene.iter_mut() {
            if !self.engine.frame_loop_active(object.id) {
                continue;
            }
            let Some(video) = object.source.video_mut() else {
                continue;
            };
            if video.refresh_frame() {
                self.engine.sync(object);
                refreshed += 1;
            }
        }
        if refreshed > 0 {
            log::trace!("refreshed {refreshed} video frames");
            self.engine.request_redraw();
        }
        refreshed
    }

    /// Remove every object once `confirm` agrees. Returns how many were
    /// removed; the viewport and the handle node are kept.
    pub fn clear_canvas(&mut self, confirm: impl FnOnce() -> bool) -> usize {
        if !confirm() {
            log::warn!("clear canvas declined");
            return 0;
        }
        self.selection.deselect_all(&mut self.engine);
        let mut removed = self.scene.clear();
        for object in &mut removed {
            self.engine.stop_frame_loop(object.id);
            object.source.release();
        }
        self.engine.unmount_all();
        self.engine.request_redraw();
        log::debug!("cleared {} objects", removed.len());
        removed.len()
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn set_scale(&mut self, target: f64, focal: Point) -> bool {
        self.viewport.set_scale(target, focal, &mut self.engine)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.viewport.zoom_in(&mut self.engine)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.viewport.zoom_out(&mut self.engine)
    }

    pub fn wheel(&mut self, delta_y: f64, precise: bool, pointer: Point) -> bool {
        self.viewport.wheel(delta_y, precise, pointer, &mut self.engine)
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset_zoom(&mut self.engine);
    }

    pub fn fit_to_screen(&mut self) {
        self.viewport.fit_to_screen(&mut self.engine);
    }

    pub fn resize_canvas(&mut self, width: f64, height: f64) -> EditorResult<Resized> {
        Ok(self
            .viewport
            .resize_canvas(width, height, &mut self.engine)?)
    }

    // ─── Export & input ──────────────────────────────────────────────────

    pub fn export(&mut self, format: SnapshotFormat) -> EditorResult<ExportPayload> {
        Ok(self
            .compositor
            .export(&mut self.scene, &mut self.engine, format)?)
    }

    /// Resolve and run a keyboard shortcut. Returns the action that ran.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let action = ShortcutMap::resolve(key, ctrl, shift, alt, meta)?;
        if action.needs_selection() && self.selection.active().is_none() {
            return None;
        }
        match action {
            ShortcutAction::Delete => {
                self.delete_selected();
            }
            ShortcutAction::Duplicate => {
                self.duplicate_selected();
            }
            ShortcutAction::ToggleLock => {
                self.toggle_lock();
            }
            ShortcutAction::ZoomIn => {
                self.zoom_in();
            }
            ShortcutAction::ZoomOut => {
                self.zoom_out();
            }
            ShortcutAction::ZoomToFit => self.fit_to_screen(),
            ShortcutAction::ResetZoom => self.reset_zoom(),
            ShortcutAction::BringForward => {
                self.bring_forward();
            }
            ShortcutAction::SendBackward => {
                self.send_backward();
            }
            ShortcutAction::Deselect => self.deselect(),
        }
        Some(action)
    }
}

fn active_object<'a>(
    scene: &'a mut SceneGraph,
    selection: &SelectionController,
) -> Option<&'a mut MediaObject> {
    scene.get_mut(selection.active()?)
}

fn filters_of(style: &Style) -> FilterSet {
    FilterSet {
        brightness: style.brightness(),
        contrast: style.contrast(),
    }
}

fn parse_color(hex: &str) -> EditorResult<Color> {
    Color::from_hex(hex).ok_or_else(|| EditorError::InvalidColor(hex.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use collage_core::{Bitmap, ScaleLimits};
    use pretty_assertions::assert_eq;

    fn editor_with_square() -> (Editor<CpuEngine>, ObjectId) {
        let mut editor = Editor::headless(EditorConfig::default()).unwrap();
        let bitmap = Bitmap::solid(100, 100, Color::WHITE).unwrap();
        let id = editor
            .place(
                MediaDescriptor::image("square", bitmap),
                None,
                Point::new(400.0, 300.0),
            )
            .unwrap();
        (editor, id)
    }

    #[test]
    fn placing_selects() {
        let (editor, id) = editor_with_square();
        assert_eq!(editor.selection(), Some(id));
        assert_eq!(editor.engine().tree().handle.target, Some(id));
    }

    #[test]
    fn click_selects_and_background_deselects() {
        let (mut editor, id) = editor_with_square();
        editor.deselect();
        assert_eq!(editor.click(Point::new(400.0, 300.0)), Some(id));
        assert_eq!(editor.selection(), Some(id));
        assert_eq!(editor.click(Point::new(5.0, 5.0)), None);
        assert_eq!(editor.selection(), None);
    }

    #[test]
    fn drag_divides_by_scale() {
        let (mut editor, id) = editor_with_square();
        editor.set_scale(2.0, Point::ZERO);
        assert!(editor.drag_selected(20.0, 10.0));
        assert_eq!(editor.scene().get(id).unwrap().position, Point::new(410.0, 305.0));

        editor.toggle_lock();
        assert!(!editor.drag_selected(20.0, 10.0));
        assert!(!editor.transform_selected(2.0, 2.0, 45.0));
    }

    #[test]
    fn transform_floors_scale() {
        let (mut editor, id) = editor_with_square();
        assert!(editor.transform_selected(0.0, 3.0, 90.0));
        let t = editor.scene().get(id).unwrap().transform;
        assert_eq!(t.scale_x, ObjectTransform::MIN_SCALE);
        assert_eq!((t.scale_y, t.rotation_deg), (3.0, 90.0));
    }

    #[test]
    fn brightness_reaches_the_engine_raster() {
        let (mut editor, id) = editor_with_square();
        assert!(editor.set_brightness(-5.0));
        assert_eq!(editor.selected().unwrap().style.brightness(), -1.0);
        let node = editor.engine().tree().node(id).unwrap();
        assert_eq!(&node.raster().unwrap().pixels()[..4], &[0u8, 0, 0, 255]);
    }

    #[test]
    fn bad_color_is_rejected_without_change() {
        let (mut editor, _) = editor_with_square();
        let err = editor.set_border(4.0, "red").unwrap_err();
        assert!(matches!(err, EditorError::InvalidColor(_)));
        assert_eq!(editor.selected().unwrap().style.stroke(), None);
    }

    #[test]
    fn style_setters_need_selection() {
        let (mut editor, _) = editor_with_square();
        editor.deselect();
        assert!(!editor.set_opacity(0.5));
        assert_eq!(editor.style_panel(), None);
    }

    #[test]
    fn shortcuts_without_selection_do_nothing() {
        let (mut editor, _) = editor_with_square();
        editor.deselect();
        assert_eq!(editor.handle_key("Delete", false, false, false, false), None);
        assert_eq!(editor.scene().len(), 1);
        assert_eq!(
            editor.handle_key("=", true, false, false, false),
            Some(ShortcutAction::ZoomIn)
        );
        assert_eq!(editor.view().scale, 1.25);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EditorConfig {
            scale: ScaleLimits { min: 4.0, max: 0.5 },
            ..EditorConfig::default()
        };
        let err = Editor::headless(config).err().unwrap();
        assert!(matches!(err, EditorError::Config(_)));
    }

    #[test]
    fn declined_clear_keeps_everything() {
        let (mut editor, id) = editor_with_square();
        assert_eq!(editor.clear_canvas(|| false), 0);
        assert_eq!(editor.scene().len(), 1);
        assert_eq!(editor.selection(), Some(id));
    }
}
