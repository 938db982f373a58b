//! Export of the rendered diagram as a downloadable blob.

use std::str::FromStr;

use super::surface::Container;
use crate::error::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Svg,
    Png,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            other => Err(format!("unknown export format '{other}' (expected svg or png)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime: &'static str,
    pub bytes: Vec<u8>,
    /// `{programId}-flowchart.{ext}`
    pub file_name: String,
}

pub fn file_name(program_id: &str, format: ExportFormat) -> String {
    format!("{program_id}-flowchart.{}", format.extension())
}

/// Export what `container` currently shows, selection classes included.
pub fn export(
    container: &Container,
    program_id: &str,
    format: ExportFormat,
) -> Result<Blob, ExportError> {
    let svg = container.to_svg().ok_or(ExportError::NothingRendered)?;
    let bytes = match format {
        ExportFormat::Svg => svg.into_bytes(),
        ExportFormat::Png => rasterize(&svg)?,
    };
    Ok(Blob {
        mime: format.mime(),
        bytes,
        file_name: file_name(program_id, format),
    })
}

#[cfg(feature = "raster")]
fn rasterize(svg: &str) -> Result<Vec<u8>, ExportError> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| ExportError::Raster(e.to_string()))?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| ExportError::Raster("cannot allocate pixmap".into()))?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    pixmap
        .encode_png()
        .map_err(|e| ExportError::Raster(e.to_string()))
}

#[cfg(not(feature = "raster"))]
fn rasterize(_svg: &str) -> Result<Vec<u8>, ExportError> {
    Err(ExportError::FormatUnavailable("png"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderers::svg::SvgGenerator;

    fn rendered() -> Container {
        let svg = SvgGenerator::default()
            .render("flowchart-germany-1", "Start([Start]) --> job-offer[Secure Job Offer]")
            .unwrap();
        let mut c = Container::new();
        c.insert(svg).unwrap();
        c
    }

    #[test]
    fn test_svg_blob() {
        let blob = export(&rendered(), "germany", ExportFormat::Svg).unwrap();
        assert_eq!(blob.mime, "image/svg+xml");
        assert_eq!(blob.file_name, "germany-flowchart.svg");
        let text = String::from_utf8(blob.bytes).unwrap();
        assert!(text.starts_with("<svg"));
        assert!(text.contains("Secure Job Offer"));
    }

    #[test]
    fn test_export_includes_selection_state() {
        let mut c = rendered();
        c.nodes_mut()[1].add_class("node-selected");
        let blob = export(&c, "germany", ExportFormat::Svg).unwrap();
        let text = String::from_utf8(blob.bytes).unwrap();
        assert!(text.contains(r#"class="node node-selected" id="flowchart-job-offer-1""#));
    }

    #[test]
    fn test_nothing_rendered() {
        let err = export(&Container::new(), "germany", ExportFormat::Svg).unwrap_err();
        assert!(matches!(err, ExportError::NothingRendered));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<ExportFormat>(), Ok(ExportFormat::Png));
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[cfg(not(feature = "raster"))]
    #[test]
    fn test_png_unavailable_without_raster() {
        let err = export(&rendered(), "germany", ExportFormat::Png).unwrap_err();
        assert!(matches!(err, ExportError::FormatUnavailable("png")));
    }

    #[cfg(feature = "raster")]
    #[test]
    fn test_png_blob() {
        let blob = export(&rendered(), "germany", ExportFormat::Png).unwrap();
        assert_eq!(blob.mime, "image/png");
        assert_eq!(blob.file_name, "germany-flowchart.png");
        assert_eq!(&blob.bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
