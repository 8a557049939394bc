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

use std::env;
use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;
use crate::error::Fallible;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 10;
const CONFIG_FILE_NAME: &str = "learncard.toml";

/// Runtime configuration.
///
/// The API key comes from the environment (`GEMINI_API_KEY`, falling back
/// to `API_KEY`); everything else has defaults that an optional
/// `learncard.toml` can override.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub model: String,
    pub max_file_size_mb: u64,
}

/// Optional settings accepted in `learncard.toml`.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    model: Option<String>,
    api_base_url: Option<String>,
    max_file_size_mb: Option<u64>,
}

impl Config {
    /// Load configuration from the environment and, if present, a TOML file.
    ///
    /// With an explicit `path` the file must exist and parse; without one,
    /// `learncard.toml` in the working directory is used when present.
    pub fn load(path: Option<&Path>) -> Fallible<Config> {
        let file = match path {
            Some(path) => Some(read_config_file(path)?),
            None => {
                let default = Path::new(CONFIG_FILE_NAME);
                if default.exists() {
                    Some(read_config_file(default)?)
                } else {
                    None
                }
            }
        };
        let file = file.unwrap_or_default();

        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.is_empty());

        Ok(Config {
            api_key,
            api_base_url: file
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            model: file.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_file_size_mb: file.max_file_size_mb.unwrap_or(DEFAULT_MAX_FILE_SIZE_MB),
        })
    }
}

fn read_config_file(path: &Path) -> Fallible<ConfigFile> {
    let text = read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    toml::from_str(&text)
        .map_err(|e| AppError::Config(format!("cannot parse {}: {e}", path.display())))
}
