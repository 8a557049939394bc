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

use axum::extract::State;
use axum::response::Html;
use maud::Markup;
use maud::html;

use crate::card::Card;
use crate::card::Deck;
use crate::fetch::ContentFetcher;
use crate::generate::CardGenerator;
use crate::server::state::ServerState;
use crate::server::template::error_banner;
use crate::server::template::page_template;
use crate::session::SessionState;
use crate::session::Viewer;

pub async fn get_handler<G, F>(State(state): State<ServerState<G, F>>) -> Html<String>
where
    G: CardGenerator + 'static,
    F: ContentFetcher + 'static,
{
    let session = state.session.lock().unwrap();
    let error = session.error().map(|text| text.to_string());
    let (body, refresh) = match session.state() {
        SessionState::Input => (
            input_screen(error.as_deref(), state.orchestrator.max_file_size_mb()),
            false,
        ),
        SessionState::Loading { message } => (loading_screen(message), true),
        SessionState::Editing { deck } => (editing_screen(deck, error.as_deref()), false),
        SessionState::Viewing { viewer } => (viewing_screen(viewer, error.as_deref()), false),
    };
    Html(page_template(body, refresh).into_string())
}

fn input_screen(error: Option<&str>, max_file_size_mb: u64) -> Markup {
    html! {
        @if let Some(message) = error {
            (error_banner(message))
        }
        section class="source-panel" {
            h2 { "Dán văn bản" }
            form method="post" action="/" {
                textarea
                    name="text"
                    rows="8"
                    placeholder="Dán nội dung văn bản của bạn vào đây..." {}
                button type="submit" name="action" value="generate-text" {
                    "Bắt đầu tạo thẻ"
                }
            }
        }
        section class="source-panel" {
            h2 { "Tải lên PDF" }
            form method="post" action="/upload" enctype="multipart/form-data" {
                input type="file" name="file" accept=".pdf,application/pdf";
                p class="hint" {
                    "Kích thước file tối đa: " (max_file_size_mb) "MB"
                }
                button type="submit" { "Bắt đầu tạo thẻ" }
            }
        }
        section class="source-panel" {
            h2 { "Từ URL" }
            form method="post" action="/" {
                input type="url" name="url" placeholder="Nhập URL của trang web";
                button type="submit" name="action" value="generate-url" {
                    "Bắt đầu tạo thẻ"
                }
            }
        }
        section class="source-panel" {
            h2 { "Từ YouTube" }
            form method="post" action="/" {
                input type="url" name="url" placeholder="Nhập URL của video YouTube";
                p class="hint" {
                    "Lưu ý: Tính năng này đang trong giai đoạn phát triển"
                }
                button type="submit" name="action" value="generate-youtube" {
                    "Bắt đầu tạo thẻ"
                }
            }
        }
    }
}

fn loading_screen(message: &str) -> Markup {
    html! {
        div class="loader" {
            div class="spinner" {}
            p { (message) }
        }
    }
}

fn editing_screen(deck: &Deck, error: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = error {
            (error_banner(message))
        }
        h2 { "Chỉnh sửa bộ thẻ của bạn" }
        form method="post" action="/" {
            button type="submit" name="action" value="start-over" class="secondary" {
                "Bắt đầu lại"
            }
        }
        form method="post" action="/" {
            @for (index, card) in deck.cards().iter().enumerate() {
                (card_editor(index, card))
            }
            button type="submit" name="action" value="add-card" {
                "Thêm thẻ mới"
            }
            button type="submit" name="action" value="save" {
                "Lưu và Bắt đầu học"
            }
        }
    }
}

fn card_editor(index: usize, card: &Card) -> Markup {
    let question_field = format!("question-{}", card.id.as_str());
    let answer_field = format!("answer-{}", card.id.as_str());
    html! {
        div class="card-editor" {
            span class="card-number" { "Thẻ " (index + 1) }
            button type="submit" name="delete" value=(card.id.as_str()) class="delete" {
                "Xóa thẻ"
            }
            label for=(question_field) { "Câu hỏi" }
            textarea id=(question_field) name=(question_field) rows="2" {
                (card.question)
            }
            label for=(answer_field) { "Câu trả lời" }
            textarea id=(answer_field) name=(answer_field) rows="3" {
                (card.answer)
            }
        }
    }
}

fn viewing_screen(viewer: &Viewer, error: Option<&str>) -> Markup {
    let Some(card) = viewer.current() else {
        return html! {
            @if let Some(message) = error {
                (error_banner(message))
            }
            p { "Không có thẻ nào để hiển thị." }
            form method="post" action="/" {
                button type="submit" name="action" value="start-over" {
                    "Bắt đầu lại"
                }
            }
        };
    };
    html! {
        @if let Some(message) = error {
            (error_banner(message))
        }
        div class="flashcard" {
            @if viewer.is_flipped() {
                span class="face-label" { "CÂU TRẢ LỜI" }
                p class="face-text" { (card.answer) }
            } @else {
                span class="face-label" { "CÂU HỎI" }
                p class="face-text" { (card.question) }
                p class="hint" { "Nhấn để xem câu trả lời" }
            }
        }
        p class="counter" { "Thẻ " (viewer.index() + 1) " / " (viewer.deck().len()) }
        form method="post" action="/" class="controls" {
            button type="submit" name="action" value="prev" aria-label="Thẻ trước" { "❮" }
            button type="submit" name="action" value="flip" { "Lật thẻ" }
            button type="submit" name="action" value="next" aria-label="Thẻ tiếp theo" { "❯" }
        }
        div class="exports" {
            a href="/export/pdf" { "Tải về PDF" }
            a href="/export/docx" { "Tải về DOCX" }
        }
        form method="post" action="/" {
            button type="submit" name="action" value="start-over" class="secondary" {
                "Bắt đầu lại"
            }
        }
    }
}
