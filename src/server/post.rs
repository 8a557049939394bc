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

use axum::Form;
use axum::extract::Multipart;
use axum::extract::State;
use axum::response::Redirect;

use crate::error::MSG_UNKNOWN_ERROR;
use crate::fetch::ContentFetcher;
use crate::generate::CardGenerator;
use crate::server::state::ServerState;
use crate::session::MSG_NO_CONTENT;
use crate::session::SourceSelection;

pub async fn post_handler<G, F>(
    State(state): State<ServerState<G, F>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Redirect
where
    G: CardGenerator + 'static,
    F: ContentFetcher + 'static,
{
    let value_of = |name: &str| {
        fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    };
    let action = value_of("action").unwrap_or("");

    match action {
        "generate-text" => {
            let text = value_of("text").unwrap_or("").to_string();
            if text.trim().is_empty() {
                state.session.lock().unwrap().set_error(MSG_NO_CONTENT);
            } else {
                state
                    .orchestrator
                    .submit(&state.session, SourceSelection::Text(text))
                    .await;
            }
        }
        "generate-url" => {
            let url = value_of("url").unwrap_or("").to_string();
            if url.trim().is_empty() {
                state.session.lock().unwrap().set_error(MSG_NO_CONTENT);
            } else {
                state
                    .orchestrator
                    .submit(&state.session, SourceSelection::Url(url))
                    .await;
            }
        }
        "generate-youtube" => {
            let url = value_of("url").unwrap_or("").to_string();
            state
                .orchestrator
                .submit(&state.session, SourceSelection::Youtube(url))
                .await;
        }
        "start-over" => {
            state.session.lock().unwrap().start_over();
        }
        "next" => {
            let mut session = state.session.lock().unwrap();
            if let Some(viewer) = session.viewer_mut() {
                viewer.next();
            }
        }
        "prev" => {
            let mut session = state.session.lock().unwrap();
            if let Some(viewer) = session.viewer_mut() {
                viewer.prev();
            }
        }
        "flip" => {
            let mut session = state.session.lock().unwrap();
            if let Some(viewer) = session.viewer_mut() {
                viewer.flip();
            }
        }
        _ => {
            apply_editor_fields(&state, &fields, action);
        }
    }
    Redirect::to("/")
}

// The editor submits every textarea alongside whichever button was pressed,
// so text edits are applied before the button's own effect.
fn apply_editor_fields<G, F>(
    state: &ServerState<G, F>,
    fields: &[(String, String)],
    action: &str,
) where
    G: CardGenerator + 'static,
    F: ContentFetcher + 'static,
{
    let mut session = state.session.lock().unwrap();
    let Some(deck) = session.deck_mut() else {
        return;
    };
    let mut deleted: Option<&str> = None;
    for (name, value) in fields {
        if let Some(id) = name.strip_prefix("question-") {
            deck.set_question(id, value.clone());
        } else if let Some(id) = name.strip_prefix("answer-") {
            deck.set_answer(id, value.clone());
        } else if name == "delete" {
            deleted = Some(value);
        }
    }
    if let Some(id) = deleted {
        deck.remove(id);
    }
    match action {
        "add-card" => {
            deck.add_blank();
        }
        "save" => {
            session.save();
        }
        _ => {}
    }
}

pub async fn upload_handler<G, F>(
    State(state): State<ServerState<G, F>>,
    mut multipart: Multipart,
) -> Redirect
where
    G: CardGenerator + 'static,
    F: ContentFetcher + 'static,
{
    let mut upload: Option<(String, Vec<u8>)> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                let file_name = field
                    .file_name()
                    .unwrap_or("document.pdf")
                    .to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some((file_name, bytes.to_vec()));
                        break;
                    }
                    Err(err) => {
                        log::warn!("Failed to read uploaded file: {err}");
                        state.session.lock().unwrap().set_error(MSG_UNKNOWN_ERROR);
                        return Redirect::to("/");
                    }
                }
            }
            Ok(None) => break,
            Err(err) => {
                log::warn!("Malformed multipart upload: {err}");
                state.session.lock().unwrap().set_error(MSG_UNKNOWN_ERROR);
                return Redirect::to("/");
            }
        }
    }
    match upload {
        Some((file_name, bytes)) if !bytes.is_empty() => {
            state
                .orchestrator
                .submit(&state.session, SourceSelection::Pdf { file_name, bytes })
                .await;
        }
        _ => {
            state.session.lock().unwrap().set_error(MSG_NO_CONTENT);
        }
    }
    Redirect::to("/")
}
