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

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

/// User-facing sentence for an unrecognized internal failure.
pub const MSG_UNKNOWN_ERROR: &str = "Đã xảy ra lỗi không xác định.";

const MSG_EXTRACTION_FAILED: &str =
    "Không thể xử lý tệp PDF. Tệp có thể bị hỏng hoặc không được hỗ trợ.";
const MSG_FETCH_FAILED: &str =
    "Could not fetch content from the provided URL. This might be a CORS issue or an invalid URL.";
const MSG_GENERATION_FAILED: &str = "Đã xảy ra lỗi khi giao tiếp. Vui lòng thử lại sau.";

/// Application error taxonomy.
///
/// `Config`, `Validation` and `Unsupported` carry sentences that are shown
/// to the user verbatim. The remaining variants carry the underlying cause,
/// which is logged but never shown: the user sees one fixed sentence per
/// category.
#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid credential configuration.
    Config(String),
    /// Oversize file, empty submission, empty extracted text, empty result.
    Validation(String),
    /// A source type that is recognized but not implemented.
    Unsupported(String),
    /// The PDF could not be parsed or read.
    Extraction(String),
    /// The URL could not be fetched.
    Fetch(String),
    /// The generative service call, or parsing its response, failed.
    Generation(String),
    Io(std::io::Error),
    Other(String),
}

impl AppError {
    /// The sentence shown in the error banner for this failure.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Unsupported(msg) => msg.clone(),
            AppError::Extraction(_) => MSG_EXTRACTION_FAILED.to_string(),
            AppError::Fetch(_) => MSG_FETCH_FAILED.to_string(),
            AppError::Generation(_) => MSG_GENERATION_FAILED.to_string(),
            AppError::Io(_) | AppError::Other(_) => MSG_UNKNOWN_ERROR.to_string(),
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "configuration error: {msg}"),
            AppError::Validation(msg) => write!(f, "validation error: {msg}"),
            AppError::Unsupported(msg) => write!(f, "unsupported source: {msg}"),
            AppError::Extraction(cause) => write!(f, "extraction error: {cause}"),
            AppError::Fetch(cause) => write!(f, "fetch error: {cause}"),
            AppError::Generation(cause) => write!(f, "generation error: {cause}"),
            AppError::Io(cause) => write!(f, "I/O error: {cause}"),
            AppError::Other(msg) => write!(f, "error: {msg}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Io(cause) => Some(cause),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        AppError::Other(format!("JSON error: {value}"))
    }
}

pub type Fallible<T> = Result<T, AppError>;

pub fn fail<T>(msg: impl Into<String>) -> Fallible<T> {
    Err(AppError::Other(msg.into()))
}
