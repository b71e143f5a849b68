//! File Loader
//!
//! Turns an uploaded file into something the model can read. The declared
//! content type picks one of three decoders:
//!
//! - `text/csv` → [`Table`] (re-serialized as CSV for the prompt)
//! - `text/plain` → UTF-8 text
//! - `application/pdf` → page text via [`pdf::extract_text_from_pdf`]

pub mod pdf;
pub mod table;

pub use pdf::{extract_text_from_pdf, PagedText};
pub use table::Table;

use std::path::Path;
use tracing::{debug, info};

pub const MIME_CSV: &str = "text/csv";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_PDF: &str = "application/pdf";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unsupported content type: {0}")]
    UnsupportedType(String),

    #[error("CSV parse failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("text is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("CSV has no columns to parse")]
    EmptyTable,

    #[error("CSV line {line} has {found} fields, expected at most {expected}")]
    RowTooLong {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Decoder selected by the declared content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Tabular,
    Text,
    Pdf,
}

impl DocumentKind {
    /// Map a declared MIME type; parameters such as `charset` are ignored.
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let parsed: mime::Mime = content_type.trim().parse().ok()?;
        match parsed.essence_str() {
            MIME_CSV => Some(DocumentKind::Tabular),
            MIME_TEXT => Some(DocumentKind::Text),
            MIME_PDF => Some(DocumentKind::Pdf),
            _ => None,
        }
    }
}

/// Raw upload: name, declared type and bytes.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, declaring its type from the extension.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, content_type, bytes))
    }
}

/// Decoded document content
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedContent {
    Table(Table),
    Text(String),
}

impl LoadedContent {
    /// The text placed into the system prompt.
    pub fn context(&self) -> Result<String, LoadError> {
        match self {
            LoadedContent::Table(table) => Ok(table.to_csv()?),
            LoadedContent::Text(text) => Ok(text.clone()),
        }
    }
}

/// Decode an upload according to its declared content type.
pub fn load_file(file: &UploadedFile) -> Result<LoadedContent, LoadError> {
    let kind = DocumentKind::from_mime(&file.content_type)
        .ok_or_else(|| LoadError::UnsupportedType(file.content_type.clone()))?;

    debug!(?kind, bytes = file.bytes.len(), "Decoding upload");

    let content = match kind {
        DocumentKind::Tabular => LoadedContent::Table(Table::from_csv(&file.bytes)?),
        DocumentKind::Text => LoadedContent::Text(String::from_utf8(file.bytes.clone())?),
        DocumentKind::Pdf => LoadedContent::Text(extract_text_from_pdf(&file.bytes)?),
    };

    info!(?kind, "Upload decoded");
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_kind_from_mime() {
        assert_eq!(DocumentKind::from_mime("text/csv"), Some(DocumentKind::Tabular));
        assert_eq!(DocumentKind::from_mime("text/plain; charset=utf-8"), Some(DocumentKind::Text));
        assert_eq!(DocumentKind::from_mime("application/pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_mime("image/png"), None);
        assert_eq!(DocumentKind::from_mime("not a mime"), None);
    }

    #[test]
    fn test_load_csv() {
        let file = UploadedFile::new("data.csv", "text/csv", b"a,b\n1,2\n".to_vec());
        let content = load_file(&file).unwrap();
        assert!(matches!(content, LoadedContent::Table(_)));
        assert_eq!(content.context().unwrap(), "a,b\n1,2\n");
    }

    #[test]
    fn test_load_text() {
        let file = UploadedFile::new("notes.txt", "text/plain", "안녕하세요\nhello".as_bytes().to_vec());
        let content = load_file(&file).unwrap();
        assert_eq!(content, LoadedContent::Text("안녕하세요\nhello".to_string()));
    }

    #[test]
    fn test_load_csv_with_short_row() {
        let file = UploadedFile::new("data.csv", "text/csv", b"a,b,c\n1,2\n3,4,5\n".to_vec());
        let content = load_file(&file).unwrap();
        assert_eq!(content.context().unwrap(), "a,b,c\n1,2,\n3,4,5\n");
    }

    #[test]
    fn test_load_empty_csv_fails() {
        let file = UploadedFile::new("empty.csv", "text/csv", Vec::new());
        assert!(matches!(load_file(&file), Err(LoadError::EmptyTable)));
    }

    #[test]
    fn test_load_pdf() {
        let bytes = pdf::tests::build_pdf(&["Page 1 text", "Page 2 text"]);
        let file = UploadedFile::new("paper.pdf", "application/pdf", bytes);
        match load_file(&file).unwrap() {
            LoadedContent::Text(text) => {
                let first = text.find("Page 1 text").unwrap();
                let second = text.find("Page 2 text").unwrap();
                assert!(first < second);
            }
            other => panic!("expected text content, got {:?}", other),
        }
    }

    #[test]
    fn test_load_invalid_utf8_text() {
        let file = UploadedFile::new("bad.txt", "text/plain", vec![0xff, 0xfe, 0x00]);
        assert!(matches!(load_file(&file), Err(LoadError::Utf8(_))));
    }

    #[test]
    fn test_load_unsupported_type() {
        let file = UploadedFile::new("image.png", "image/png", vec![1, 2, 3]);
        match load_file(&file) {
            Err(LoadError::UnsupportedType(ct)) => assert_eq!(ct, "image/png"),
            other => panic!("expected unsupported type, got {:?}", other),
        }
    }

    #[test]
    fn test_load_malformed_pdf() {
        let file = UploadedFile::new("broken.pdf", "application/pdf", b"not a pdf".to_vec());
        assert!(matches!(load_file(&file), Err(LoadError::Pdf(_))));
    }

    #[test]
    fn test_from_path_declares_type_by_extension() {
        let dir = tempfile::TempDir::new().unwrap();

        let csv_path = dir.path().join("scores.csv");
        std::fs::File::create(&csv_path)
            .unwrap()
            .write_all(b"name,score\nkim,90\n")
            .unwrap();
        let file = UploadedFile::from_path(&csv_path).unwrap();
        assert_eq!(file.name, "scores.csv");
        assert_eq!(file.content_type, "text/csv");

        let txt_path = dir.path().join("memo.txt");
        std::fs::write(&txt_path, "memo").unwrap();
        assert_eq!(UploadedFile::from_path(&txt_path).unwrap().content_type, "text/plain");

        let pdf_path = dir.path().join("paper.pdf");
        std::fs::write(&pdf_path, b"%PDF").unwrap();
        assert_eq!(UploadedFile::from_path(&pdf_path).unwrap().content_type, "application/pdf");
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = UploadedFile::from_path(Path::new("/definitely/not/here.txt"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }
}
