//! Draw tree → tiny-skia raster.
//!
//! Walks the nodes in paint order and emits shadow, pattern fill and
//! stroke for each, then the transform handle at its z-slot and the
//! per-object playback badges.

use crate::filter::box_blur;
use crate::tree::{DrawNode, DrawTree};
use collage_core::{Bitmap, Color, VisualShape};
use kurbo::{Affine, BezPath, PathEl, Point, Rect, Shape};
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, Paint, Path, PathBuilder, Pattern, Pixmap, PixmapPaint,
    SpreadMode, Stroke as SkStroke, Transform,
};

const HANDLE_COLOR: Color = Color::rgba(0.0, 0.631, 1.0, 1.0);
const HANDLE_ANCHOR: f64 = 10.0;
const ROTATE_ANCHOR_OFFSET: f64 = 30.0;
const PLACEHOLDER: Color = Color::rgba(0.2, 0.2, 0.2, 1.0);

/// Paint the whole tree. `base` maps canvas pixels to output pixels.
pub fn paint_tree(pixmap: &mut Pixmap, tree: &DrawTree, base: Affine) {
    let view = base * tree.view.affine();
    let ratio = base.as_coeffs()[0].abs().max(f64::EPSILON);

    for (z, node) in tree.nodes.iter().enumerate() {
        if tree.handle.z == z {
            paint_handle(pixmap, tree, view, ratio);
        }
        paint_node(pixmap, node, view);
    }
    if tree.handle.z >= tree.nodes.len() {
        paint_handle(pixmap, tree, view, ratio);
    }

    if tree.overlays_visible {
        for node in tree.nodes.iter().filter(|n| n.is_video) {
            paint_playback_badge(pixmap, node, view, ratio);
        }
    }
}

fn paint_node(pixmap: &mut Pixmap, node: &DrawNode, view: Affine) {
    let Some(path) = to_path(&node.geometry.outline()) else {
        return;
    };
    let ts = to_transform(view * node.affine);
    let opacity = node.opacity.clamp(0.0, 1.0);
    log::trace!("PAINT {} opacity={opacity}", node.name);

    if node.shadow.blur > 0.0 {
        paint_shadow(pixmap, &path, ts, node, view);
    }

    let pattern = node.raster().and_then(bitmap_to_pixmap);
    let mut paint = Paint {
        anti_alias: true,
        ..Paint::default()
    };
    match &pattern {
        Some(pm) => {
            let size = node.geometry.content_size();
            let pattern_ts = Transform::from_row(
                (size.width / pm.width() as f64) as f32,
                0.0,
                0.0,
                (size.height / pm.height() as f64) as f32,
                (-size.width / 2.0) as f32,
                (-size.height / 2.0) as f32,
            );
            paint.shader = Pattern::new(
                pm.as_ref(),
                SpreadMode::Pad,
                FilterQuality::Bilinear,
                opacity as f32,
                pattern_ts,
            );
        }
        // video still decoding its first frame
        None => paint.set_color(sk_color(PLACEHOLDER, opacity)),
    }
    pixmap.fill_path(&path, &paint, FillRule::Winding, ts, None);

    if let Some(stroke) = node.stroke {
        let mut paint = Paint {
            anti_alias: true,
            ..Paint::default()
        };
        paint.set_color(sk_color(stroke.color, opacity));
        let sk_stroke = SkStroke {
            width: stroke.width as f32,
            ..SkStroke::default()
        };
        pixmap.stroke_path(&path, &paint, &sk_stroke, ts, None);
    }
}

fn paint_shadow(pixmap: &mut Pixmap, path: &Path, ts: Transform, node: &DrawNode, view: Affine) {
    let Some(mut layer) = Pixmap::new(pixmap.width(), pixmap.height()) else {
        return;
    };
    let mut paint = Paint {
        anti_alias: true,
        ..Paint::default()
    };
    paint.set_color(sk_color(node.shadow.color, node.opacity));
    layer.fill_path(path, &paint, FillRule::Winding, ts, None);

    let scale = view.as_coeffs()[0].hypot(view.as_coeffs()[1]);
    let radius = (node.shadow.blur * scale / 2.0).round() as usize;
    let (w, h) = (layer.width() as usize, layer.height() as usize);
    box_blur(layer.data_mut(), w, h, radius);

    pixmap.draw_pixmap(
        0,
        0,
        layer.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
}

fn paint_handle(pixmap: &mut Pixmap, tree: &DrawTree, view: Affine, ratio: f64) {
    if !tree.handle.visible {
        return;
    }
    let Some(node) = tree.handle.target.and_then(|id| tree.node(id)) else {
        return;
    };
    let frame = (view * node.affine).transform_rect_bbox(node.geometry.local_bounds());

    let mut line = Paint {
        anti_alias: true,
        ..Paint::default()
    };
    line.set_color(sk_color(HANDLE_COLOR, 1.0));
    let thin = SkStroke {
        width: ratio as f32,
        ..SkStroke::default()
    };
    if let Some(path) = to_path(&frame.to_path(0.1)) {
        pixmap.stroke_path(&path, &line, &thin, Transform::identity(), None);
    }

    let top_mid = Point::new(frame.center().x, frame.y0);
    let rotate = Point::new(top_mid.x, top_mid.y - ROTATE_ANCHOR_OFFSET * ratio);
    let anchors = [
        Point::new(frame.x0, frame.y0),
        top_mid,
        Point::new(frame.x1, frame.y0),
        Point::new(frame.x1, frame.center().y),
        Point::new(frame.x0, frame.center().y),
        Point::new(frame.x0, frame.y1),
        Point::new(frame.center().x, frame.y1),
        Point::new(frame.x1, frame.y1),
        rotate,
    ];

    let mut fill = Paint::default();
    fill.set_color(sk_color(Color::WHITE, 1.0));
    let half = HANDLE_ANCHOR * ratio / 2.0;
    for p in anchors {
        let square = Rect::new(p.x - half, p.y - half, p.x + half, p.y + half);
        if let Some(path) = to_path(&square.to_path(0.1)) {
            pixmap.fill_path(&path, &fill, FillRule::Winding, Transform::identity(), None);
            pixmap.stroke_path(&path, &line, &thin, Transform::identity(), None);
        }
    }
}

fn paint_playback_badge(pixmap: &mut Pixmap, node: &DrawNode, view: Affine, ratio: f64) {
    let frame = (view * node.affine).transform_rect_bbox(node.geometry.local_bounds());
    let r = 12.0 * ratio;
    let c = Point::new(frame.x0 + r + 4.0 * ratio, frame.y0 + r + 4.0 * ratio);

    let mut disc = Paint {
        anti_alias: true,
        ..Paint::default()
    };
    disc.set_color(sk_color(Color::rgba(0.0, 0.0, 0.0, 0.6), 1.0));
    if let Some(path) = to_path(&kurbo::Circle::new(c, r).to_path(0.1)) {
        pixmap.fill_path(&path, &disc, FillRule::Winding, Transform::identity(), None);
    }

    let mut glyph = BezPath::new();
    let s = r * 0.5;
    if node.playing {
        // pause bars
        glyph.extend(Rect::new(c.x - s, c.y - s, c.x - s / 3.0, c.y + s).path_elements(0.1));
        glyph.extend(Rect::new(c.x + s / 3.0, c.y - s, c.x + s, c.y + s).path_elements(0.1));
    } else {
        glyph.move_to((c.x - s * 0.6, c.y - s));
        glyph.line_to((c.x + s, c.y));
        glyph.line_to((c.x - s * 0.6, c.y + s));
        glyph.close_path();
    }
    let mut paint = Paint {
        anti_alias: true,
        ..Paint::default()
    };
    paint.set_color(sk_color(Color::WHITE, 1.0));
    if let Some(path) = to_path(&glyph) {
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
}

// ─── Conversions ─────────────────────────────────────────────────────────────

pub fn to_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

pub fn to_path(path: &BezPath) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => {
                pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32)
            }
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

/// Straight RGBA → premultiplied pixmap.
pub fn bitmap_to_pixmap(bitmap: &Bitmap) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(bitmap.width, bitmap.height)?;
    for (dst, src) in pixmap
        .pixels_mut()
        .iter_mut()
        .zip(bitmap.pixels().chunks_exact(4))
    {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Some(pixmap)
}

fn sk_color(color: Color, opacity: f64) -> tiny_skia::Color {
    let a = (color.a as f64 * opacity).clamp(0.0, 1.0) as f32;
    tiny_skia::Color::from_rgba(
        color.r.clamp(0.0, 1.0),
        color.g.clamp(0.0, 1.0),
        color.b.clamp(0.0, 1.0),
        a,
    )
    .unwrap_or(tiny_skia::Color::BLACK)
}
