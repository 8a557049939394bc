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

pub mod docx;
pub mod pdf;

use crate::card::Card;
use crate::error::Fallible;
use crate::export::docx::DocxRenderer;
use crate::export::pdf::PdfRenderer;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExportFormat {
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pdf" => Some(ExportFormat::Pdf),
            "docx" => Some(ExportFormat::Docx),
            _ => None,
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "flashcards.pdf",
            ExportFormat::Docx => "flashcards.docx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Notice shown when export is requested before the renderer for this
    /// format has been registered.
    pub fn not_ready_message(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => {
                "Thư viện xuất PDF chưa sẵn sàng. Vui lòng đợi một lát rồi thử lại."
            }
            ExportFormat::Docx => {
                "Thư viện xuất DOCX chưa sẵn sàng. Vui lòng đợi một lát rồi thử lại."
            }
        }
    }
}

/// Renders a card collection, read-only, into a downloadable file.
pub trait DocumentRenderer: Send + Sync {
    fn format(&self) -> ExportFormat;
    fn render(&self, cards: &[Card]) -> Fallible<Vec<u8>>;
}

/// Renderer capabilities, resolved once and cached.
///
/// Consumers look a renderer up at export time; an absent entry means the
/// capability is not ready and the export must be refused with a notice
/// rather than attempted.
pub struct ExporterRegistry {
    renderers: Vec<Box<dyn DocumentRenderer>>,
}

impl ExporterRegistry {
    pub fn empty() -> Self {
        ExporterRegistry {
            renderers: Vec::new(),
        }
    }

    /// Both built-in renderers.
    pub fn with_defaults() -> Self {
        let mut registry = ExporterRegistry::empty();
        registry.register(Box::new(PdfRenderer));
        registry.register(Box::new(DocxRenderer));
        registry
    }

    pub fn register(&mut self, renderer: Box<dyn DocumentRenderer>) {
        self.renderers.push(renderer);
    }

    pub fn get(&self, format: ExportFormat) -> Option<&dyn DocumentRenderer> {
        self.renderers
            .iter()
            .find(|renderer| renderer.format() == format)
            .map(|renderer| renderer.as_ref())
    }
}
