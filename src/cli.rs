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

use std::fmt::Display;
use std::fmt::Formatter;
use std::path::Path;
use std::path::PathBuf;
use std::process::exit;
use std::sync::Mutex;

use clap::Parser;
use clap::ValueEnum;
use tokio::spawn;

use crate::config::Config;
use crate::error::AppError;
use crate::error::Fallible;
use crate::error::MSG_UNKNOWN_ERROR;
use crate::error::fail;
use crate::export::ExportFormat;
use crate::export::ExporterRegistry;
use crate::fetch::HttpFetcher;
use crate::generate::GeminiGenerator;
use crate::server::ServerConfig;
use crate::server::start_server;
use crate::server::wait_for_server;
use crate::session::Orchestrator;
use crate::session::Session;
use crate::session::SessionState;
use crate::session::SourceSelection;

#[derive(ValueEnum, Clone, Copy, PartialEq)]
pub enum GenerateFormat {
    /// Print the generated cards as JSON.
    Json,
    /// Render the generated cards as a printable PDF.
    Pdf,
    /// Render the generated cards as a DOCX document.
    Docx,
}

impl Display for GenerateFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateFormat::Json => write!(f, "json"),
            GenerateFormat::Pdf => write!(f, "pdf"),
            GenerateFormat::Docx => write!(f, "docx"),
        }
    }
}

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Build flashcards through a web interface.
    Serve {
        /// The host address to bind to. Default is 127.0.0.1.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// The port to use for the web server. Default is 8000.
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Whether to open the browser automatically. Default is true.
        #[arg(long)]
        open_browser: Option<bool>,
        /// Path to the configuration file. By default, learncard.toml is read if present.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Generate cards from a document without starting the server.
    Generate {
        /// Path to the input document. PDF files are detected by extension;
        /// anything else is read as plain text.
        input: PathBuf,
        /// Which output format to use.
        #[arg(long, default_value_t = GenerateFormat::Json)]
        format: GenerateFormat,
        /// Optional path to the output file. By default, JSON is printed to
        /// stdout. Required for the pdf and docx formats.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Path to the configuration file. By default, learncard.toml is read if present.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Serve {
            host,
            port,
            open_browser,
            config,
        } => {
            let config = Config::load(config.as_deref())?;
            if open_browser.unwrap_or(true) {
                // Start a separate task to open the browser once the server is up.
                let browser_host = host.clone();
                spawn(async move {
                    match wait_for_server(&browser_host, port).await {
                        Ok(_) => {
                            let _ = open::that(format!("http://{browser_host}:{port}/"));
                        }
                        Err(e) => {
                            eprintln!("Failed to connect to server: {e}");
                            exit(-1)
                        }
                    }
                });
            }
            let generator = GeminiGenerator::new(reqwest::Client::new(), &config);
            let fetcher = HttpFetcher::new(reqwest::Client::new());
            let orchestrator = Orchestrator::new(generator, fetcher, config.max_file_size_mb);
            let server_config = ServerConfig { host, port };
            start_server(server_config, orchestrator, ExporterRegistry::with_defaults()).await
        }
        Command::Generate {
            input,
            format,
            output,
            config,
        } => {
            let config = Config::load(config.as_deref())?;
            generate_to_output(&input, format, output, &config).await
        }
    }
}

/// Run the same pipeline the server runs, without the server: one
/// submission through a fresh session, then write out whatever deck it
/// produced.
async fn generate_to_output(
    input: &Path,
    format: GenerateFormat,
    output: Option<PathBuf>,
    config: &Config,
) -> Fallible<()> {
    let bytes = tokio::fs::read(input).await?;
    let is_pdf = input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    let source = if is_pdf {
        SourceSelection::Pdf {
            file_name: input.display().to_string(),
            bytes,
        }
    } else {
        let text = String::from_utf8(bytes)
            .map_err(|_| AppError::Validation("Input file is not valid UTF-8.".to_string()))?;
        SourceSelection::Text(text)
    };

    let generator = GeminiGenerator::new(reqwest::Client::new(), config);
    let fetcher = HttpFetcher::new(reqwest::Client::new());
    let orchestrator = Orchestrator::new(generator, fetcher, config.max_file_size_mb);
    let session = Mutex::new(Session::new());
    orchestrator.submit(&session, source).await;

    let session = session.into_inner().unwrap();
    let cards = match session.state() {
        SessionState::Editing { deck } => deck.cards().to_vec(),
        _ => {
            let message = session.error().unwrap_or(MSG_UNKNOWN_ERROR).to_string();
            return fail(message);
        }
    };
    log::info!("Generated {} cards from {}", cards.len(), input.display());

    match format {
        GenerateFormat::Json => {
            let json = serde_json::to_string_pretty(&cards)?;
            match output {
                Some(path) => tokio::fs::write(path, json).await?,
                None => println!("{json}"),
            }
            Ok(())
        }
        GenerateFormat::Pdf | GenerateFormat::Docx => {
            let Some(path) = output else {
                return fail("The pdf and docx formats require --output.");
            };
            let export_format = match format {
                GenerateFormat::Pdf => ExportFormat::Pdf,
                _ => ExportFormat::Docx,
            };
            let registry = ExporterRegistry::with_defaults();
            let renderer = match registry.get(export_format) {
                Some(renderer) => renderer,
                None => return fail("No renderer available for the requested format."),
            };
            let rendered = renderer.render(&cards)?;
            tokio::fs::write(path, rendered).await?;
            Ok(())
        }
    }
}
