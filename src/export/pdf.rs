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

use std::io::BufWriter;

use printpdf::BuiltinFont;
use printpdf::IndirectFontRef;
use printpdf::Mm;
use printpdf::PdfDocument;
use printpdf::PdfDocumentReference;
use printpdf::PdfLayerReference;

use crate::card::Card;
use crate::error::AppError;
use crate::error::Fallible;
use crate::export::DocumentRenderer;
use crate::export::ExportFormat;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const LINE_HEIGHT_MM: f32 = 6.0;
const BODY_SIZE: f32 = 11.0;
const HEADING_SIZE: f32 = 18.0;
// Rough fit for 11pt Helvetica across the printable width.
const WRAP_COLUMNS: usize = 90;

/// A4 text rendering of the deck, one block per card, paginated.
///
/// Builtin PDF fonts are WinAnsi-encoded; code points outside Latin-1
/// degrade. Best-effort output, like the original's canvas-sliced export.
pub struct PdfRenderer;

impl DocumentRenderer for PdfRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn render(&self, cards: &[Card]) -> Fallible<Vec<u8>> {
        let (doc, page, layer) =
            PdfDocument::new("Flashcards", Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "content");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::Other(format!("PDF font: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::Other(format!("PDF font: {e}")))?;

        let mut writer = PageWriter {
            layer: doc.get_page(page).get_layer(layer),
            doc: &doc,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        };
        writer.write_line("Flashcards", &bold, HEADING_SIZE);
        writer.skip_line();

        for (index, card) in cards.iter().enumerate() {
            writer.write_line(&format!("Câu hỏi {}:", index + 1), &bold, BODY_SIZE);
            for line in wrap(&card.question, WRAP_COLUMNS) {
                writer.write_line(&line, &regular, BODY_SIZE);
            }
            writer.write_line("Trả lời:", &bold, BODY_SIZE);
            for line in wrap(&card.answer, WRAP_COLUMNS) {
                writer.write_line(&line, &regular, BODY_SIZE);
            }
            writer.skip_line();
        }

        let mut buffer = BufWriter::new(Vec::new());
        doc.save(&mut buffer)
            .map_err(|e| AppError::Other(format!("PDF rendering: {e}")))?;
        buffer
            .into_inner()
            .map_err(|e| AppError::Other(format!("PDF rendering: {e}")))
    }
}

struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl PageWriter<'_> {
    fn write_line(&mut self, text: &str, font: &IndirectFontRef, size: f32) {
        if self.y < MARGIN_MM + LINE_HEIGHT_MM {
            let (page, layer) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "content");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        self.layer
            .use_text(text, size, Mm(MARGIN_MM), Mm(self.y), font);
        self.y -= LINE_HEIGHT_MM;
    }

    fn skip_line(&mut self) {
        self.y -= LINE_HEIGHT_MM;
    }
}

/// Greedy word wrap by character count.
fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > columns {
            lines.push(current);
            current = String::new();
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
