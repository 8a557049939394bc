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

use crate::error::AppError;
use crate::error::Fallible;

/// Turns a URL into plain text.
pub trait ContentFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Fallible<String>> + Send;
}

/// Fetches a URL with a single GET and returns the raw response body.
///
/// The body is not stripped of HTML or boilerplate, so the result is only
/// usable for plain-text resources. Best-effort, like the rest of the URL
/// source path.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        HttpFetcher { client }
    }
}

impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Fallible<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("GET {url}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!("GET {url}: status {status}")));
        }
        response
            .text()
            .await
            .map_err(|e| AppError::Fetch(format!("GET {url}: reading body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use tokio::net::TcpListener;
    use tokio::spawn;

    use super::*;
    use crate::server::wait_for_server;

    async fn start_fixture_server(port: u16) {
        let app = Router::new()
            .route("/page", get(|| async { "plain text body" }))
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }));
        let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await.unwrap();
        spawn(async move { axum::serve(listener, app).await });
    }

    #[tokio::test]
    async fn test_fetch_returns_raw_body() -> Fallible<()> {
        let port = portpicker::pick_unused_port().unwrap();
        start_fixture_server(port).await;
        wait_for_server("127.0.0.1", port).await?;
        let fetcher = HttpFetcher::new(reqwest::Client::new());
        let body = fetcher.fetch(&format!("http://127.0.0.1:{port}/page")).await?;
        assert_eq!(body, "plain text body");
        Ok(())
    }

    #[tokio::test]
    async fn test_non_success_status_is_a_fetch_error() -> Fallible<()> {
        let port = portpicker::pick_unused_port().unwrap();
        start_fixture_server(port).await;
        wait_for_server("127.0.0.1", port).await?;
        let fetcher = HttpFetcher::new(reqwest::Client::new());
        let result = fetcher.fetch(&format!("http://127.0.0.1:{port}/missing")).await;
        match result {
            Err(AppError::Fetch(cause)) => assert!(cause.contains("404")),
            other => panic!("expected fetch error, got {other:?}"),
        }
        Ok(())
    }
}
