//! Input document format detection.
//!
//! The analysis service accepts PDF, PNG, JPEG and TIFF input. Detecting the
//! format locally turns an obviously wrong upload into an immediate error
//! instead of a round trip to the service.

use crate::error::{Error, Result};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Document formats the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Portable Document Format
    Pdf,
    /// PNG image
    Png,
    /// JPEG image
    Jpeg,
    /// TIFF image (either byte order)
    Tiff,
}

impl DocumentFormat {
    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Png => "png",
            DocumentFormat::Jpeg => "jpg",
            DocumentFormat::Tiff => "tiff",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Png => "PNG",
            DocumentFormat::Jpeg => "JPEG",
            DocumentFormat::Tiff => "TIFF",
        };
        f.write_str(name)
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = b"\xff\xd8\xff";
const TIFF_LE_MAGIC: &[u8] = b"II*\x00";
const TIFF_BE_MAGIC: &[u8] = b"MM\x00*";
const HEADER_LEN: usize = 8;

/// Detect the document format from a file path.
///
/// # Example
/// ```no_run
/// use untextract::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("scan.pdf").unwrap();
/// println!("Format: {}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<DocumentFormat> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(HEADER_LEN);
    BufReader::new(file)
        .take(HEADER_LEN as u64)
        .read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect the document format from its leading bytes.
///
/// # Returns
/// * `Ok(DocumentFormat)` if the data starts with a known signature
/// * `Err(Error::InvalidRequest)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocumentFormat> {
    let format = if data.starts_with(PDF_MAGIC) {
        DocumentFormat::Pdf
    } else if data.starts_with(PNG_MAGIC) {
        DocumentFormat::Png
    } else if data.starts_with(JPEG_MAGIC) {
        DocumentFormat::Jpeg
    } else if data.starts_with(TIFF_LE_MAGIC) || data.starts_with(TIFF_BE_MAGIC) {
        DocumentFormat::Tiff
    } else {
        return Err(Error::InvalidRequest(
            "unknown document format: expected PDF, PNG, JPEG or TIFF".to_string(),
        ));
    };

    Ok(format)
}

/// Check if bytes start with a supported document signature.
pub fn is_supported_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_pdf() {
        let data = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3";
        assert_eq!(detect_format_from_bytes(data).unwrap(), DocumentFormat::Pdf);
    }

    #[test]
    fn test_detect_images() {
        assert_eq!(
            detect_format_from_bytes(b"\x89PNG\r\n\x1a\n\x00\x00").unwrap(),
            DocumentFormat::Png
        );
        assert_eq!(
            detect_format_from_bytes(b"\xff\xd8\xff\xe0\x00\x10JFIF").unwrap(),
            DocumentFormat::Jpeg
        );
        assert_eq!(
            detect_format_from_bytes(b"II*\x00\x08\x00\x00\x00").unwrap(),
            DocumentFormat::Tiff
        );
        assert_eq!(
            detect_format_from_bytes(b"MM\x00*\x00\x00\x00\x08").unwrap(),
            DocumentFormat::Tiff
        );
    }

    #[test]
    fn test_detect_invalid_format() {
        let result = detect_format_from_bytes(b"<!DOCTYPE html>");
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn test_detect_empty() {
        assert!(!is_supported_bytes(b""));
        assert!(!is_supported_bytes(b"%PD"));
    }

    #[test]
    fn test_detect_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\n").unwrap();
        assert_eq!(detect_format_from_path(&path).unwrap(), DocumentFormat::Png);
    }
}
