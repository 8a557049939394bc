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

use std::future::Future;

use serde::Deserialize;

use crate::card::Card;
use crate::config::Config;
use crate::error::AppError;
use crate::error::Fallible;

pub const MSG_API_KEY_MISSING: &str =
    "API key is missing. Please set the API_KEY environment variable.";

/// Turns source text into a set of cards.
pub trait CardGenerator: Send + Sync {
    fn generate(&self, text: &str) -> impl Future<Output = Fallible<Vec<Card>>> + Send;
}

/// Card generator backed by the Gemini `generateContent` endpoint.
///
/// One outbound call per invocation, no retries, no caching. The response
/// is constrained to a JSON array of `{question, answer}` objects;
/// identifiers are assigned client-side after parsing.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    api_base_url: String,
    model: String,
}

impl GeminiGenerator {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        GeminiGenerator {
            client,
            api_key: config.api_key.clone(),
            api_base_url: config.api_base_url.clone(),
            model: config.model.clone(),
        }
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// Card data as returned by the service, before an id is assigned.
#[derive(Deserialize)]
struct RawCard {
    question: String,
    answer: String,
}

fn build_prompt(text: &str) -> String {
    format!(
        "Tạo một bộ flashcards học tập chất lượng cao từ tài liệu được cung cấp, \
trong đó mỗi flashcard bao gồm một câu hỏi sâu sắc (Mặt 1) và một câu trả lời \
ngắn gọn, chính xác (Mặt 2), tập trung vào các khái niệm, định nghĩa và thông \
tin quan trọng nhất.\n\nVĂN BẢN:\n---\n{text}\n---\n"
    )
}

fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "question": {
                    "type": "STRING",
                    "description": "Câu hỏi cho flashcard."
                },
                "answer": {
                    "type": "STRING",
                    "description": "Câu trả lời cho câu hỏi."
                }
            },
            "required": ["question", "answer"]
        }
    })
}

impl CardGenerator for GeminiGenerator {
    async fn generate(&self, text: &str) -> Fallible<Vec<Card>> {
        // The credential check happens before any network traffic.
        let api_key = match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => return Err(AppError::Config(MSG_API_KEY_MISSING.to_string())),
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base_url, self.model
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": build_prompt(text) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
            }
        });

        log::debug!("calling {} with model {}", self.api_base_url, self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Generation(format!(
                "status {status}: {detail}"
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("malformed response: {e}")))?;

        let json_text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .concat()
            })
            .ok_or_else(|| AppError::Generation("response has no candidates".to_string()))?;

        let raw: Vec<RawCard> = serde_json::from_str(&json_text)
            .map_err(|e| AppError::Generation(format!("schema violation: {e}")))?;
        if raw.is_empty() {
            return Err(AppError::Generation("empty card set".to_string()));
        }

        Ok(raw
            .into_iter()
            .map(|card| Card::new(card.question, card.answer))
            .collect())
    }
}
