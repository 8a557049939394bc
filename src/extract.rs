// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use lopdf::Document;

use crate::error::AppError;
use crate::error::Fallible;

/// Extract the plain text of a PDF, page by page.
///
/// Pages are visited in order; the text runs of a page are joined with
/// single spaces, and pages are joined with a blank line. Size limits are
/// the caller's responsibility.
pub fn extract_text(bytes: &[u8]) -> Fallible<String> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| AppError::Extraction(format!("failed to parse PDF: {e}")))?;

    let mut pages = Vec::new();
    for (page_number, _) in doc.get_pages() {
        let text = doc
            .extract_text(&[page_number])
            .map_err(|e| AppError::Extraction(format!("page {page_number}: {e}")))?;
        pages.push(text.split_whitespace().collect::<Vec<_>>().join(" "));
    }
    Ok(pages.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use lopdf::Object;
    use lopdf::Stream;
    use lopdf::content::Content;
    use lopdf::content::Operation;
    use lopdf::dictionary;

    use super::*;

    fn page_content(text: &str) -> Content {
        Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        }
    }

    fn two_page_pdf(first: &str, second: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let mut kids = Vec::new();
        for text in [first, second] {
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                page_content(text).encode().unwrap(),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => 2,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_page_order_is_preserved() -> Fallible<()> {
        let bytes = two_page_pdf("first page text", "second page text");
        let text = extract_text(&bytes)?;
        let first = text.find("first page text").unwrap();
        let second = text.find("second page text").unwrap();
        assert!(first < second);
        Ok(())
    }

    #[test]
    fn test_pages_are_separated_by_a_blank_line() -> Fallible<()> {
        let bytes = two_page_pdf("alpha", "beta");
        let text = extract_text(&bytes)?;
        assert_eq!(text, "alpha\n\nbeta");
        Ok(())
    }

    #[test]
    fn test_corrupt_bytes_fail_with_extraction_error() {
        let result = extract_text(b"this is not a pdf");
        match result {
            Err(AppError::Extraction(_)) => {}
            other => panic!("expected extraction error, got {other:?}"),
        }
    }
}
