//! Writing the raw service result next to the analyzed document.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Path of the result dump for a source document.
///
/// The source extension is replaced with `.json` (`scan.pdf` becomes
/// `scan.json`); a source without an extension gets `.json` appended. With
/// `output_dir` the file name is kept and the directory replaced.
pub fn dump_path<P: AsRef<Path>>(source: P, output_dir: Option<&Path>) -> PathBuf {
    let source = source.as_ref();
    let renamed = source.with_extension("json");

    match (output_dir, renamed.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => renamed,
    }
}

/// Write a value as pretty-printed JSON, creating parent directories.
pub fn write_dump<T, P>(value: &T, path: P) -> Result<()>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(value).map_err(|e| Error::Render(e.to_string()))?;
    fs::write(path, json)?;
    log::debug!("Wrote result dump to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, ResultPage};

    #[test]
    fn test_dump_path_replaces_extension() {
        assert_eq!(dump_path("docs/scan.pdf", None), PathBuf::from("docs/scan.json"));
        assert_eq!(dump_path("invoice.final.png", None), PathBuf::from("invoice.final.json"));
    }

    #[test]
    fn test_dump_path_without_extension() {
        assert_eq!(dump_path("receipt", None), PathBuf::from("receipt.json"));
    }

    #[test]
    fn test_dump_path_into_output_dir() {
        let out = Path::new("/tmp/out");
        assert_eq!(
            dump_path("docs/scan.tiff", Some(out)),
            PathBuf::from("/tmp/out/scan.json")
        );
    }

    #[test]
    fn test_write_dump_is_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scan.json");
        let page = ResultPage::with_blocks(vec![Block::line("l1", "Hello")]);

        write_dump(&page, &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("{\n  \"Blocks\": ["));
        let back: ResultPage = serde_json::from_str(&written).unwrap();
        assert_eq!(back, page);
    }
}
