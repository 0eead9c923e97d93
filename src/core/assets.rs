//! Image asset discovery and validation
//!
//! The generated document embeds two images: the page header artwork
//! (`Encabezado.png`) and the institution badge (`Insignia.png`). Base
//! copies live in a `resources/images` directory next to the executable;
//! user-selected images override them per project.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::project::ImageOverrides;

/// Accepted image file extensions.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Largest accepted image file.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Smallest accepted image side.
pub const MIN_DIMENSION: u32 = 50;

/// Base file name for the page header artwork.
pub const HEADER_FILE: &str = "Encabezado.png";

/// Base file name for the institution badge.
pub const BADGE_FILE: &str = "Insignia.png";

/// Recommended and maximum pixel sizes for an image slot
#[derive(Debug, Clone, Copy)]
pub struct SizeEnvelope {
    pub recommended: (u32, u32),
    pub max: (u32, u32),
}

pub const HEADER_ENVELOPE: SizeEnvelope = SizeEnvelope {
    recommended: (600, 100),
    max: (800, 150),
};

pub const BADGE_ENVELOPE: SizeEnvelope = SizeEnvelope {
    recommended: (100, 100),
    max: (200, 200),
};

/// Why an image file was rejected
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("el archivo no existe: {}", .0.display())]
    Missing(PathBuf),
    #[error("formato no soportado: \"{0}\" (se admiten png, jpg, jpeg, bmp y gif)")]
    UnsupportedFormat(String),
    #[error("el archivo pesa {0} bytes y supera el máximo de 10 MB")]
    TooLarge(u64),
    #[error("imagen demasiado pequeña: {0}x{1} px (mínimo 50x50)")]
    TooSmall(u32, u32),
    #[error("no se pudo leer la imagen: {0}")]
    Unreadable(#[from] image::ImageError),
    #[error("no se pudo acceder al archivo: {0}")]
    Io(#[from] std::io::Error),
}

/// Facts about a validated image
#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
    pub warnings: Vec<String>,
}

/// Check that a file is a usable image: known extension, within the size
/// limit, decodable and not below the minimum dimensions.
pub fn validate_image(path: &Path) -> Result<ImageInfo, ImageError> {
    if !path.exists() {
        return Err(ImageError::Missing(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ImageError::UnsupportedFormat(extension));
    }

    let file_size = fs::metadata(path)?.len();
    if file_size > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge(file_size));
    }

    let (width, height) = image::image_dimensions(path)?;
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Err(ImageError::TooSmall(width, height));
    }

    Ok(ImageInfo {
        width,
        height,
        file_size,
        warnings: Vec::new(),
    })
}

/// Validate an image and compare it against the recommended envelope for
/// its slot, collecting size warnings.
pub fn analyze_image(path: &Path, envelope: SizeEnvelope) -> Result<ImageInfo, ImageError> {
    let mut info = validate_image(path)?;

    let (rec_w, rec_h) = envelope.recommended;
    let (max_w, max_h) = envelope.max;

    if info.width > max_w || info.height > max_h {
        info.warnings.push(format!(
            "La imagen mide {}x{} px y supera el máximo recomendado de {}x{} px",
            info.width, info.height, max_w, max_h
        ));
    } else if info.width.abs_diff(rec_w) > rec_w / 2 || info.height.abs_diff(rec_h) > rec_h / 2 {
        info.warnings.push(format!(
            "La imagen mide {}x{} px; el tamaño recomendado es {}x{} px",
            info.width, info.height, rec_w, rec_h
        ));
    }

    Ok(info)
}

/// Resolves header and badge images, preferring per-project overrides
/// over the bundled base files.
#[derive(Debug, Clone)]
pub struct AssetLibrary {
    resources_dir: PathBuf,
}

impl AssetLibrary {
    /// Locate the resources directory next to the executable, falling
    /// back to the working directory.
    pub fn discover() -> Self {
        let mut candidates = Vec::new();
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                candidates.push(dir.join("resources").join("images"));
            }
        }
        candidates.push(PathBuf::from("resources").join("images"));

        let resources_dir = candidates
            .iter()
            .find(|dir| dir.is_dir())
            .cloned()
            .unwrap_or_else(|| PathBuf::from("resources").join("images"));
        Self { resources_dir }
    }

    pub fn with_root(resources_dir: impl Into<PathBuf>) -> Self {
        Self {
            resources_dir: resources_dir.into(),
        }
    }

    pub fn resources_dir(&self) -> &Path {
        &self.resources_dir
    }

    fn base_file(&self, name: &str) -> Option<PathBuf> {
        let path = self.resources_dir.join(name);
        path.exists().then_some(path)
    }

    /// Bundled header artwork, when present.
    pub fn base_header(&self) -> Option<PathBuf> {
        self.base_file(HEADER_FILE)
    }

    /// Bundled institution badge, when present.
    pub fn base_badge(&self) -> Option<PathBuf> {
        self.base_file(BADGE_FILE)
    }

    /// Header artwork for a project: the override when it still exists,
    /// otherwise the base image.
    pub fn header_image(&self, overrides: &ImageOverrides) -> Option<PathBuf> {
        overrides
            .header
            .as_ref()
            .filter(|p| p.exists())
            .cloned()
            .or_else(|| self.base_header())
    }

    /// Badge image for a project, override first.
    pub fn badge_image(&self, overrides: &ImageOverrides) -> Option<PathBuf> {
        overrides
            .badge
            .as_ref()
            .filter(|p| p.exists())
            .cloned()
            .or_else(|| self.base_badge())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbaImage};

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("proyecta_assets_{}_{}", tag, std::process::id()));
        let _ = fs::create_dir_all(&dir);
        dir
    }

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(width, height));
        img.save(path).unwrap();
    }

    #[test]
    fn test_validate_image_ok() {
        let dir = temp_dir("ok");
        let path = dir.join("foto.png");
        write_png(&path, 60, 60);

        let info = validate_image(&path).unwrap();
        assert_eq!((info.width, info.height), (60, 60));
        assert!(info.file_size > 0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_validate_image_rejections() {
        let dir = temp_dir("bad");

        let missing = dir.join("nada.png");
        assert!(matches!(validate_image(&missing), Err(ImageError::Missing(_))));

        let text = dir.join("nota.txt");
        fs::write(&text, b"no soy imagen").unwrap();
        assert!(matches!(
            validate_image(&text),
            Err(ImageError::UnsupportedFormat(_))
        ));

        let tiny = dir.join("tiny.png");
        write_png(&tiny, 10, 10);
        assert!(matches!(validate_image(&tiny), Err(ImageError::TooSmall(10, 10))));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_analyze_envelope_warnings() {
        let dir = temp_dir("envelope");

        let badge = dir.join("insignia.png");
        write_png(&badge, 90, 110);
        let info = analyze_image(&badge, BADGE_ENVELOPE).unwrap();
        assert!(info.warnings.is_empty());

        let big = dir.join("grande.png");
        write_png(&big, 250, 250);
        let info = analyze_image(&big, BADGE_ENVELOPE).unwrap();
        assert_eq!(info.warnings.len(), 1);

        let off = dir.join("desvio.png");
        write_png(&off, 60, 60);
        let info = analyze_image(&off, HEADER_ENVELOPE).unwrap();
        assert_eq!(info.warnings.len(), 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_library_override_priority() {
        let dir = temp_dir("library");
        let library = AssetLibrary::with_root(&dir);

        let mut overrides = ImageOverrides::default();
        assert!(library.badge_image(&overrides).is_none());

        let base = dir.join(BADGE_FILE);
        write_png(&base, 100, 100);
        assert_eq!(library.badge_image(&overrides), Some(base.clone()));

        let custom = dir.join("propia.png");
        write_png(&custom, 100, 100);
        overrides.badge = Some(custom.clone());
        assert_eq!(library.badge_image(&overrides), Some(custom));

        overrides.badge = Some(dir.join("borrada.png"));
        assert_eq!(library.badge_image(&overrides), Some(base));

        let _ = fs::remove_dir_all(&dir);
    }
}
