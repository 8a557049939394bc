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

use std::io::Cursor;

use docx_rs::Docx;
use docx_rs::Paragraph;
use docx_rs::Run;

use crate::card::Card;
use crate::error::AppError;
use crate::error::Fallible;
use crate::export::DocumentRenderer;
use crate::export::ExportFormat;

/// DOCX rendering: per card, a paragraph with a bold "Câu hỏi N: " run
/// followed by the question, then a paragraph with a bold "Trả lời: " run
/// followed by the answer.
pub struct DocxRenderer;

impl DocumentRenderer for DocxRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Docx
    }

    fn render(&self, cards: &[Card]) -> Fallible<Vec<u8>> {
        let mut docx = Docx::new();
        for (index, card) in cards.iter().enumerate() {
            docx = docx.add_paragraph(
                Paragraph::new()
                    .add_run(
                        Run::new()
                            .add_text(format!("Câu hỏi {}: ", index + 1))
                            .bold(),
                    )
                    .add_run(Run::new().add_text(card.question.as_str())),
            );
            docx = docx.add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text("Trả lời: ").bold())
                    .add_run(Run::new().add_text(card.answer.as_str())),
            );
        }
        let mut cursor = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut cursor)
            .map_err(|e| AppError::Other(format!("DOCX packing: {e}")))?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_produces_a_zip_container() -> Fallible<()> {
        let cards = vec![Card::new("What is the capital of France?", "Paris")];
        let bytes = DocxRenderer.render(&cards)?;
        // DOCX is a ZIP archive.
        assert!(bytes.starts_with(b"PK"));
        Ok(())
    }

    #[test]
    fn test_render_of_an_empty_deck_still_packs() -> Fallible<()> {
        let bytes = DocxRenderer.render(&[])?;
        assert!(bytes.starts_with(b"PK"));
        Ok(())
    }
}
