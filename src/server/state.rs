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

use std::sync::Arc;
use std::sync::Mutex;

use crate::export::ExporterRegistry;
use crate::fetch::ContentFetcher;
use crate::generate::CardGenerator;
use crate::session::Orchestrator;
use crate::session::Session;

pub struct ServerState<G, F> {
    pub session: Arc<Mutex<Session>>,
    pub orchestrator: Arc<Orchestrator<G, F>>,
    pub exporters: Arc<ExporterRegistry>,
}

// Derived Clone would require G: Clone and F: Clone.
impl<G, F> Clone for ServerState<G, F> {
    fn clone(&self) -> Self {
        ServerState {
            session: self.session.clone(),
            orchestrator: self.orchestrator.clone(),
            exporters: self.exporters.clone(),
        }
    }
}

impl<G: CardGenerator, F: ContentFetcher> ServerState<G, F> {
    pub fn new(orchestrator: Orchestrator<G, F>, exporters: ExporterRegistry) -> Self {
        ServerState {
            session: Arc::new(Mutex::new(Session::new())),
            orchestrator: Arc::new(orchestrator),
            exporters: Arc::new(exporters),
        }
    }
}
