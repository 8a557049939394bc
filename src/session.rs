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

use std::mem::replace;
use std::sync::Mutex;

use crate::card::Card;
use crate::card::Deck;
use crate::error::AppError;
use crate::error::Fallible;
use crate::extract::extract_text;
use crate::fetch::ContentFetcher;
use crate::generate::CardGenerator;

pub const MSG_STAGE_PDF: &str = "Đang trích xuất văn bản từ PDF...";
pub const MSG_STAGE_TEXT: &str = "Đang chuẩn bị văn bản...";
pub const MSG_STAGE_URL: &str = "Đang lấy nội dung từ URL...";
pub const MSG_STAGE_GENERATE: &str = "Đang tạo thẻ ôn tập, vui lòng đợi trong giây lát.";
pub const MSG_YOUTUBE_UNSUPPORTED: &str =
    "Tính năng tạo thẻ ôn tập từ YouTube chưa được hỗ trợ.";
pub const MSG_NO_CONTENT: &str = "Không tìm thấy nội dung để tạo thẻ ôn tập.";
pub const MSG_EMPTY_GENERATION: &str = "Không thể tạo thẻ ôn tập từ tài liệu này.";

pub fn oversize_message(max_mb: u64) -> String {
    format!("Kích thước file quá lớn. Kích thước tối đa là {max_mb}MB.")
}

/// The user's chosen input type and payload.
#[derive(Debug)]
pub enum SourceSelection {
    Pdf { file_name: String, bytes: Vec<u8> },
    Text(String),
    Url(String),
    Youtube(String),
}

/// The active screen mode. Exactly one is active at a time.
pub enum SessionState {
    Input,
    Loading { message: String },
    Editing { deck: Deck },
    Viewing { viewer: Viewer },
}

/// One review session: the current screen plus the error banner.
///
/// This is the entire process-wide mutable state. It lives for the lifetime
/// of the server process and is never persisted.
pub struct Session {
    state: SessionState,
    error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Session {
            state: SessionState::Input,
            error: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the banner. Used for notices outside the Loading sequence,
    /// like exporting before a renderer is available.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Input → Loading. Clears the banner; the stage message is filled in
    /// as the pipeline advances.
    pub fn begin_loading(&mut self) {
        self.error = None;
        self.state = SessionState::Loading {
            message: String::new(),
        };
    }

    pub fn set_loading_message(&mut self, text: impl Into<String>) {
        if let SessionState::Loading { message } = &mut self.state {
            *message = text.into();
        }
    }

    /// Loading → Editing, with the generated deck.
    pub fn finish_with_deck(&mut self, deck: Deck) {
        self.error = None;
        self.state = SessionState::Editing { deck };
    }

    /// Any state → Input, with the failure shown in the banner.
    pub fn fail_to_input(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.state = SessionState::Input;
    }

    /// The deck under edit, if the session is in Editing.
    pub fn deck_mut(&mut self) -> Option<&mut Deck> {
        match &mut self.state {
            SessionState::Editing { deck } => Some(deck),
            _ => None,
        }
    }

    /// Editing → Viewing. Saving an empty deck is allowed; the viewer
    /// renders a "no cards" notice for it.
    pub fn save(&mut self) {
        let state = replace(&mut self.state, SessionState::Input);
        self.state = match state {
            SessionState::Editing { deck } => SessionState::Viewing {
                viewer: Viewer::new(deck),
            },
            other => other,
        };
    }

    pub fn viewer(&self) -> Option<&Viewer> {
        match &self.state {
            SessionState::Viewing { viewer } => Some(viewer),
            _ => None,
        }
    }

    pub fn viewer_mut(&mut self) -> Option<&mut Viewer> {
        match &mut self.state {
            SessionState::Viewing { viewer } => Some(viewer),
            _ => None,
        }
    }

    /// Editing or Viewing → Input. Discards the deck and the banner.
    pub fn start_over(&mut self) {
        self.error = None;
        self.state = SessionState::Input;
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

/// Read-only walk over a saved deck, one card at a time.
pub struct Viewer {
    deck: Deck,
    index: usize,
    flipped: bool,
}

impl Viewer {
    pub fn new(deck: Deck) -> Self {
        Viewer {
            deck,
            index: 0,
            flipped: false,
        }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn current(&self) -> Option<&Card> {
        self.deck.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Advance cyclically; wraps from the last card to the first. Moving
    /// always shows the question face again.
    pub fn next(&mut self) {
        if !self.deck.is_empty() {
            self.index = (self.index + 1) % self.deck.len();
            self.flipped = false;
        }
    }

    /// Retreat cyclically; wraps from the first card to the last.
    pub fn prev(&mut self) {
        if !self.deck.is_empty() {
            self.index = (self.index + self.deck.len() - 1) % self.deck.len();
            self.flipped = false;
        }
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }
}

/// Sequences the Loading pipeline: resolve the source to text, then
/// generate cards, mapping every failure to a single banner sentence.
pub struct Orchestrator<G, F> {
    generator: G,
    fetcher: F,
    max_file_size_mb: u64,
}

impl<G: CardGenerator, F: ContentFetcher> Orchestrator<G, F> {
    pub fn new(generator: G, fetcher: F, max_file_size_mb: u64) -> Self {
        Orchestrator {
            generator,
            fetcher,
            max_file_size_mb,
        }
    }

    pub fn max_file_size_mb(&self) -> u64 {
        self.max_file_size_mb
    }

    /// Run one submission: Input → Loading → Editing, or back to Input
    /// with the banner set. All failures are absorbed here; the cause is
    /// logged, the user sees one sentence.
    pub async fn submit(&self, session: &Mutex<Session>, source: SourceSelection) {
        session.lock().unwrap().begin_loading();
        match self.run_pipeline(session, source).await {
            Ok(deck) => {
                log::info!("generated {} cards", deck.len());
                session.lock().unwrap().finish_with_deck(deck);
            }
            Err(err) => {
                log::warn!("card generation failed: {err}");
                session.lock().unwrap().fail_to_input(err.user_message());
            }
        }
    }

    async fn run_pipeline(
        &self,
        session: &Mutex<Session>,
        source: SourceSelection,
    ) -> Fallible<Deck> {
        let text = match source {
            SourceSelection::Youtube(_) => {
                return Err(AppError::Unsupported(MSG_YOUTUBE_UNSUPPORTED.to_string()));
            }
            SourceSelection::Pdf { file_name, bytes } => {
                session.lock().unwrap().set_loading_message(MSG_STAGE_PDF);
                let max_bytes = self.max_file_size_mb * 1024 * 1024;
                // The size guard runs before any extraction attempt.
                if bytes.len() as u64 > max_bytes {
                    return Err(AppError::Validation(oversize_message(
                        self.max_file_size_mb,
                    )));
                }
                log::debug!("extracting text from {file_name} ({} bytes)", bytes.len());
                extract_text(&bytes)?
            }
            SourceSelection::Text(text) => {
                session.lock().unwrap().set_loading_message(MSG_STAGE_TEXT);
                text
            }
            SourceSelection::Url(url) => {
                session.lock().unwrap().set_loading_message(MSG_STAGE_URL);
                if url.trim().is_empty() {
                    return Err(AppError::Validation(MSG_NO_CONTENT.to_string()));
                }
                self.fetcher.fetch(&url).await?
            }
        };

        if text.trim().is_empty() {
            return Err(AppError::Validation(MSG_NO_CONTENT.to_string()));
        }

        session
            .lock()
            .unwrap()
            .set_loading_message(MSG_STAGE_GENERATE);
        let cards = self.generator.generate(&text).await?;
        if cards.is_empty() {
            return Err(AppError::Validation(MSG_EMPTY_GENERATION.to_string()));
        }
        Ok(Deck::new(cards))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::error::MSG_UNKNOWN_ERROR;

    /// Returns a fixed card set and counts invocations. With a session
    /// handle attached, asserts that generation happens in the Loading
    /// state with the generation stage message shown.
    struct StaticGenerator {
        cards: Vec<(String, String)>,
        calls: Arc<AtomicUsize>,
        session: Option<Arc<Mutex<Session>>>,
    }

    impl StaticGenerator {
        fn returning(cards: &[(&str, &str)]) -> Self {
            StaticGenerator {
                cards: cards
                    .iter()
                    .map(|(q, a)| (q.to_string(), a.to_string()))
                    .collect(),
                calls: Arc::new(AtomicUsize::new(0)),
                session: None,
            }
        }

        fn observing(mut self, session: Arc<Mutex<Session>>) -> Self {
            self.session = Some(session);
            self
        }
    }

    impl CardGenerator for StaticGenerator {
        async fn generate(&self, _text: &str) -> Fallible<Vec<Card>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(session) = &self.session {
                let session = session.lock().unwrap();
                match session.state() {
                    SessionState::Loading { message } => {
                        assert_eq!(message, MSG_STAGE_GENERATE)
                    }
                    _ => panic!("generation ran outside the Loading state"),
                }
            }
            Ok(self
                .cards
                .iter()
                .map(|(q, a)| Card::new(q.clone(), a.clone()))
                .collect())
        }
    }

    struct FailingGenerator;

    impl CardGenerator for FailingGenerator {
        async fn generate(&self, _text: &str) -> Fallible<Vec<Card>> {
            Err(AppError::Generation("upstream exploded".to_string()))
        }
    }

    struct StaticFetcher(&'static str);

    impl ContentFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Fallible<String> {
            Ok(self.0.to_string())
        }
    }

    struct UnreachableFetcher;

    impl ContentFetcher for UnreachableFetcher {
        async fn fetch(&self, _url: &str) -> Fallible<String> {
            panic!("fetcher should not be called")
        }
    }

    fn assert_input_with_error(session: &Mutex<Session>, expected: &str) {
        let session = session.lock().unwrap();
        assert!(matches!(session.state(), SessionState::Input));
        assert_eq!(session.error(), Some(expected));
    }

    #[tokio::test]
    async fn test_round_trip_from_text_to_editing() {
        let session = Arc::new(Mutex::new(Session::new()));
        let generator = StaticGenerator::returning(&[(
            "What is the capital of France?",
            "Paris",
        )])
        .observing(session.clone());
        let orchestrator = Orchestrator::new(generator, UnreachableFetcher, 10);
        orchestrator
            .submit(
                &session,
                SourceSelection::Text("Paris is the capital of France.".to_string()),
            )
            .await;
        let session = session.lock().unwrap();
        assert_eq!(session.error(), None);
        match session.state() {
            SessionState::Editing { deck } => {
                assert_eq!(deck.len(), 1);
                let card = deck.get(0).unwrap();
                assert_eq!(card.question, "What is the capital of France?");
                assert_eq!(card.answer, "Paris");
                assert!(!card.id.as_str().is_empty());
            }
            _ => panic!("expected Editing state"),
        }
    }

    #[tokio::test]
    async fn test_url_source_goes_through_the_fetcher() {
        let session = Mutex::new(Session::new());
        let orchestrator = Orchestrator::new(
            StaticGenerator::returning(&[("q", "a")]),
            StaticFetcher("fetched body"),
            10,
        );
        orchestrator
            .submit(
                &session,
                SourceSelection::Url("http://example.com/notes".to_string()),
            )
            .await;
        assert!(matches!(
            session.lock().unwrap().state(),
            SessionState::Editing { .. }
        ));
    }

    #[tokio::test]
    async fn test_youtube_is_always_rejected() {
        let session = Mutex::new(Session::new());
        let generator = StaticGenerator::returning(&[("q", "a")]);
        let calls = generator.calls.clone();
        let orchestrator = Orchestrator::new(generator, UnreachableFetcher, 10);
        orchestrator
            .submit(
                &session,
                SourceSelection::Youtube("https://youtu.be/anything".to_string()),
            )
            .await;
        assert_input_with_error(&session, MSG_YOUTUBE_UNSUPPORTED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_oversize_pdf_is_rejected_before_extraction() {
        let session = Mutex::new(Session::new());
        let generator = StaticGenerator::returning(&[("q", "a")]);
        let calls = generator.calls.clone();
        let orchestrator = Orchestrator::new(generator, UnreachableFetcher, 10);
        // 11 MB of garbage against a 10 MB limit: rejected by size alone,
        // never parsed.
        orchestrator
            .submit(
                &session,
                SourceSelection::Pdf {
                    file_name: "big.pdf".to_string(),
                    bytes: vec![0u8; 11 * 1024 * 1024],
                },
            )
            .await;
        assert_input_with_error(&session, &oversize_message(10));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_whitespace_only_text_is_rejected() {
        let session = Mutex::new(Session::new());
        let orchestrator = Orchestrator::new(
            StaticGenerator::returning(&[("q", "a")]),
            UnreachableFetcher,
            10,
        );
        orchestrator
            .submit(&session, SourceSelection::Text("   \n\t ".to_string()))
            .await;
        assert_input_with_error(&session, MSG_NO_CONTENT);
    }

    #[tokio::test]
    async fn test_generation_failure_collapses_to_one_sentence() {
        let session = Mutex::new(Session::new());
        let orchestrator = Orchestrator::new(FailingGenerator, UnreachableFetcher, 10);
        orchestrator
            .submit(&session, SourceSelection::Text("some text".to_string()))
            .await;
        assert_input_with_error(
            &session,
            "Đã xảy ra lỗi khi giao tiếp. Vui lòng thử lại sau.",
        );
    }

    #[tokio::test]
    async fn test_empty_generation_result_is_rejected() {
        let session = Mutex::new(Session::new());
        let orchestrator =
            Orchestrator::new(StaticGenerator::returning(&[]), UnreachableFetcher, 10);
        orchestrator
            .submit(&session, SourceSelection::Text("some text".to_string()))
            .await;
        assert_input_with_error(&session, MSG_EMPTY_GENERATION);
    }

    #[tokio::test]
    async fn test_next_submission_clears_the_banner() {
        let session = Mutex::new(Session::new());
        let orchestrator = Orchestrator::new(
            StaticGenerator::returning(&[("q", "a")]),
            UnreachableFetcher,
            10,
        );
        orchestrator
            .submit(&session, SourceSelection::Text(String::new()))
            .await;
        assert_input_with_error(&session, MSG_NO_CONTENT);
        orchestrator
            .submit(&session, SourceSelection::Text("real content".to_string()))
            .await;
        let session = session.lock().unwrap();
        assert_eq!(session.error(), None);
        assert!(matches!(session.state(), SessionState::Editing { .. }));
    }

    #[test]
    fn test_save_moves_editing_to_viewing() {
        let mut session = Session::new();
        session.finish_with_deck(Deck::new(vec![Card::new("q", "a")]));
        session.save();
        assert!(matches!(session.state(), SessionState::Viewing { .. }));
    }

    #[test]
    fn test_saving_an_empty_deck_is_allowed() {
        let mut session = Session::new();
        session.finish_with_deck(Deck::new(vec![Card::new("q", "a")]));
        let id = session.deck_mut().unwrap().get(0).unwrap().id.as_str().to_string();
        session.deck_mut().unwrap().remove(&id);
        session.save();
        let viewer = session.viewer().unwrap();
        assert!(viewer.deck().is_empty());
        assert!(viewer.current().is_none());
        assert_eq!(session.error(), None);
    }

    #[test]
    fn test_start_over_discards_everything() {
        let mut session = Session::new();
        session.finish_with_deck(Deck::new(vec![Card::new("q", "a")]));
        session.set_error("stale notice");
        session.start_over();
        assert!(matches!(session.state(), SessionState::Input));
        assert_eq!(session.error(), None);
    }

    #[test]
    fn test_navigation_wraps_both_directions() {
        let deck = Deck::new(vec![Card::new("a", ""), Card::new("b", ""), Card::new("c", "")]);
        let mut viewer = Viewer::new(deck);
        assert_eq!(viewer.index(), 0);
        viewer.prev();
        assert_eq!(viewer.index(), 2);
        viewer.next();
        assert_eq!(viewer.index(), 0);
        viewer.next();
        viewer.next();
        viewer.next();
        assert_eq!(viewer.index(), 0);
    }

    #[test]
    fn test_flip_is_idempotent_under_double_toggle() {
        let mut viewer = Viewer::new(Deck::new(vec![Card::new("q", "a")]));
        assert!(!viewer.is_flipped());
        viewer.flip();
        assert!(viewer.is_flipped());
        viewer.flip();
        assert!(!viewer.is_flipped());
    }

    #[test]
    fn test_navigation_resets_the_flip_flag() {
        let mut viewer = Viewer::new(Deck::new(vec![Card::new("a", ""), Card::new("b", "")]));
        viewer.flip();
        viewer.next();
        assert!(!viewer.is_flipped());
        viewer.flip();
        viewer.prev();
        assert!(!viewer.is_flipped());
    }

    #[test]
    fn test_navigation_on_an_empty_deck_is_a_no_op() {
        let mut viewer = Viewer::new(Deck::default());
        viewer.next();
        viewer.prev();
        assert_eq!(viewer.index(), 0);
        assert!(viewer.current().is_none());
    }

    #[test]
    fn test_unknown_failures_surface_the_generic_sentence() {
        let err = AppError::Other("something odd".to_string());
        assert_eq!(err.user_message(), MSG_UNKNOWN_ERROR);
    }
}
