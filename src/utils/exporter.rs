use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::canvas::surface::Surface;
use crate::error::{EditorError, EditorResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    PNG,
    JPEG,
    TIFF,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::PNG, ExportFormat::JPEG, ExportFormat::TIFF];

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::PNG => "PNG",
            ExportFormat::JPEG => "JPEG",
            ExportFormat::TIFF => "TIFF",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::PNG => "png",
            ExportFormat::JPEG => "jpg",
            ExportFormat::TIFF => "tiff",
        }
    }

    /// Guess the format from a file extension, defaulting to PNG.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => ExportFormat::JPEG,
            Some("tif") | Some("tiff") => ExportFormat::TIFF,
            _ => ExportFormat::PNG,
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            ExportFormat::PNG => ImageFormat::Png,
            ExportFormat::JPEG => ImageFormat::Jpeg,
            ExportFormat::TIFF => ImageFormat::Tiff,
        }
    }
}

/// Save a flattened surface to disk.
pub fn save_surface(
    surface: &Surface,
    path: impl Into<PathBuf>,
    format: ExportFormat,
) -> EditorResult<()> {
    let path = path.into();
    let rgba = surface.to_rgba_image();
    let result = match format {
        // JPEG has no alpha channel.
        ExportFormat::JPEG => DynamicImage::ImageRgba8(rgba)
            .to_rgb8()
            .save_with_format(&path, format.image_format()),
        _ => rgba.save_with_format(&path, format.image_format()),
    };
    result.map_err(|e| EditorError::Export(e.to_string()))?;
    log::info!("Exported {}x{} image to {}", surface.width(), surface.height(), path.display());
    Ok(())
}

/// Decode any supported image blob into a surface.
pub fn decode_image(bytes: &[u8]) -> EditorResult<Surface> {
    let img = image::load_from_memory(bytes).map_err(|e| EditorError::Decode(e.to_string()))?;
    Ok(Surface::from_rgba_image(&img.to_rgba8()))
}
