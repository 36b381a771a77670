//! Collage CLI: lay image files out on a canvas and export the composite.
//!
//! ```text
//! collage a.png Circle-b.jpg --out board.png --fit
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use clap::{Parser, ValueEnum};
use collage_core::{MediaKind, Point};
use collage_editor::{Editor, EditorConfig, FileUpload};
use collage_render::SnapshotFormat;

#[derive(Parser, Debug)]
#[command(name = "collage", version, about)]
struct Cli {
    /// Image files, placed bottom-first.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Output format. Defaults to the output file's extension.
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Display kind for every image. `auto` infers it from the file name.
    #[arg(long, value_enum, default_value_t = Shape::Auto)]
    shape: Shape,

    /// Canvas width in pixels.
    #[arg(long, requires = "height")]
    width: Option<f64>,

    /// Canvas height in pixels.
    #[arg(long, requires = "width")]
    height: Option<f64>,

    /// Zoom so all content fills the canvas before exporting.
    #[arg(long, default_value_t = false)]
    fit: bool,

    /// Editor configuration (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Png,
    Jpeg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Shape {
    Auto,
    Rect,
    Circle,
    Triangle,
}

impl Shape {
    fn kind(self) -> Option<MediaKind> {
        match self {
            Shape::Auto => None,
            Shape::Rect => Some(MediaKind::ImageRect),
            Shape::Circle => Some(MediaKind::ShapeCircle),
            Shape::Triangle => Some(MediaKind::ShapeTriangle),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("start runtime")?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read config '{}'", path.display()))?;
            EditorConfig::from_toml_str(&text)
                .with_context(|| format!("parse config '{}'", path.display()))?
        }
        None => EditorConfig::default(),
    };
    log::debug!("{config:?}");
    let mut editor = Editor::headless(config)?;

    if let (Some(width), Some(height)) = (cli.width, cli.height) {
        let resized = editor.resize_canvas(width, height)?;
        if resized.clamped {
            eprintln!(
                "canvas clamped to {}×{}",
                resized.size.width, resized.size.height
            );
        }
    }

    let files = cli
        .images
        .iter()
        .map(|path| load(path))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let placed = place_all(&mut editor, files, cli.shape).await;
    if placed == 0 {
        bail!("none of the {} inputs could be placed", cli.images.len());
    }

    editor.deselect();
    if cli.fit {
        editor.fit_to_screen();
    }

    let format = match cli.format {
        Some(Format::Png) => SnapshotFormat::Png,
        Some(Format::Jpeg) => SnapshotFormat::Jpeg,
        None => format_from_extension(&cli.out),
    };
    let payload = editor.export(format)?;

    if let Some(parent) = cli.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&cli.out, &payload.bytes)
        .with_context(|| format!("write {} '{}'", payload.mime, cli.out.display()))?;

    eprintln!(
        "wrote {} ({}×{}, {placed} objects)",
        cli.out.display(),
        payload.width,
        payload.height
    );
    Ok(())
}

/// Place every file and return how many made it onto the canvas.
async fn place_all<E: collage_render::RenderEngine>(
    editor: &mut Editor<E>,
    files: Vec<FileUpload>,
    shape: Shape,
) -> usize {
    let Some(kind) = shape.kind() else {
        let report = editor.upload(files).await;
        for name in &report.skipped {
            eprintln!("skipped '{name}': not an image");
        }
        for (name, err) in &report.failed {
            eprintln!("skipped '{name}': {err}");
        }
        return report.placed.len();
    };

    let (origin, step) = (editor.config().upload_origin, editor.config().upload_step);
    let mut placed = 0;
    for (index, file) in files.into_iter().enumerate() {
        let offset = origin + step * index as f64;
        let at = editor.view().to_screen(Point::new(offset, offset));
        match editor.drop_image(&file.name, file.bytes, Some(kind), at).await {
            Ok(_) => placed += 1,
            Err(err) => eprintln!("skipped '{}': {err}", file.name),
        }
    }
    placed
}

fn load(path: &Path) -> anyhow::Result<FileUpload> {
    let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    let mime = image::ImageFormat::from_path(path)
        .map(|f| f.to_mime_type())
        .unwrap_or("application/octet-stream");
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(FileUpload::new(name, mime, bytes))
}

fn format_from_extension(path: &Path) -> SnapshotFormat {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => SnapshotFormat::Jpeg,
        _ => SnapshotFormat::Png,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(format_from_extension(Path::new("a/b.JPG")), SnapshotFormat::Jpeg);
        assert_eq!(format_from_extension(Path::new("b.png")), SnapshotFormat::Png);
        assert_eq!(format_from_extension(Path::new("noext")), SnapshotFormat::Png);
    }

    #[test]
    fn shape_kinds() {
        assert_eq!(Shape::Auto.kind(), None);
        assert_eq!(Shape::Triangle.kind(), Some(MediaKind::ShapeTriangle));
    }
}
