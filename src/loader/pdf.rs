//! PDF Extractor
//!
//! Opens PDF bytes as a paginated document and joins the text of every page
//! in page-number order. Pages are concatenated as-is; whatever separators
//! the per-page extraction produces are the only ones in the result.

use super::LoadError;
use lopdf::Document;
use tracing::debug;

/// A document whose pages can be read as text one at a time.
pub trait PagedText {
    /// Page numbers in reading order.
    fn page_numbers(&self) -> Vec<u32>;

    fn page_text(&self, page: u32) -> Result<String, LoadError>;
}

impl PagedText for Document {
    fn page_numbers(&self) -> Vec<u32> {
        // BTreeMap keys: already ascending
        self.get_pages().into_keys().collect()
    }

    fn page_text(&self, page: u32) -> Result<String, LoadError> {
        self.extract_text(&[page])
            .map_err(|e| LoadError::Pdf(format!("page {}: {}", page, e)))
    }
}

/// Concatenate the text of all pages. The first failing page fails the whole
/// document.
pub fn concat_pages<D: PagedText + ?Sized>(doc: &D) -> Result<String, LoadError> {
    let mut text = String::new();
    for page in doc.page_numbers() {
        text.push_str(&doc.page_text(page)?);
    }
    Ok(text)
}

/// Extract the full text of a PDF held in memory.
pub fn extract_text_from_pdf(bytes: &[u8]) -> Result<String, LoadError> {
    let doc = Document::load_mem(bytes).map_err(|e| LoadError::Pdf(e.to_string()))?;
    debug!(pages = doc.get_pages().len(), "PDF opened");
    concat_pages(&doc)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use std::collections::BTreeMap;

    struct FakePages(BTreeMap<u32, Result<String, String>>);

    impl PagedText for FakePages {
        fn page_numbers(&self) -> Vec<u32> {
            self.0.keys().copied().collect()
        }

        fn page_text(&self, page: u32) -> Result<String, LoadError> {
            match &self.0[&page] {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(LoadError::Pdf(e.clone())),
            }
        }
    }

    /// Build a PDF with one line of text per page.
    pub(crate) fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_concat_has_no_inserted_separators() {
        let doc = FakePages(BTreeMap::from([
            (1, Ok("Page 1 text".to_string())),
            (2, Ok("Page 2 text".to_string())),
            (3, Ok("Page 3 text".to_string())),
        ]));
        assert_eq!(concat_pages(&doc).unwrap(), "Page 1 textPage 2 textPage 3 text");
    }

    #[test]
    fn test_concat_fails_on_bad_page() {
        let doc = FakePages(BTreeMap::from([
            (1, Ok("fine".to_string())),
            (2, Err("corrupt stream".to_string())),
            (3, Ok("never read".to_string())),
        ]));
        assert!(matches!(concat_pages(&doc), Err(LoadError::Pdf(_))));
    }

    #[test]
    fn test_empty_document() {
        let doc = FakePages(BTreeMap::new());
        assert_eq!(concat_pages(&doc).unwrap(), "");
    }

    #[test]
    fn test_extract_real_pdf_in_page_order() {
        let bytes = build_pdf(&["Page 1 text", "Page 2 text", "Page 3 text"]);
        let text = extract_text_from_pdf(&bytes).unwrap();

        let p1 = text.find("Page 1 text").expect("page 1 missing");
        let p2 = text.find("Page 2 text").expect("page 2 missing");
        let p3 = text.find("Page 3 text").expect("page 3 missing");
        assert!(p1 < p2 && p2 < p3);
    }

    #[test]
    fn test_malformed_pdf_is_an_error() {
        assert!(matches!(
            extract_text_from_pdf(b"%PDF-1.5 garbage"),
            Err(LoadError::Pdf(_))
        ));
        assert!(extract_text_from_pdf(&[]).is_err());
    }
}
