//! Generic remote collection loader.
//!
//! One `RemoteCollection<T>` per mounted list: it fetches `T`'s collection,
//! publishes `Loading`, then `Ready` or `Error`, and ignores results that
//! arrive after it was disposed or superseded by a newer load.

use crate::backend::{ApiClient, Collection};
use crate::i18n::Language;
use crate::metrics::SiteMetrics;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Observable state of a remote collection.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Ready(T),
    /// `message` is localized and safe to show; technical detail is logged.
    Error { message: String },
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoadState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            LoadState::Error { message } => Some(message),
            _ => None,
        }
    }
}

pub struct RemoteCollection<T: Collection> {
    client: ApiClient,
    language: Mutex<Language>,
    state: watch::Sender<LoadState<Vec<T>>>,
    /// Bumped by every load; only the latest load may publish its outcome.
    generation: AtomicU64,
    alive: AtomicBool,
}

impl<T: Collection> RemoteCollection<T> {
    pub fn new(client: ApiClient, language: Language) -> Self {
        let (state, _) = watch::channel(LoadState::Loading);
        Self {
            client,
            language: Mutex::new(language),
            state,
            generation: AtomicU64::new(0),
            alive: AtomicBool::new(true),
        }
    }

    pub fn language(&self) -> Language {
        *self.language.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current state snapshot.
    pub fn state(&self) -> LoadState<Vec<T>> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState<Vec<T>>> {
        self.state.subscribe()
    }

    /// Issue one fetch and publish its outcome.
    ///
    /// Returns the outcome of this fetch even when it was not published
    /// because the collection was disposed or a newer load started.
    pub async fn load(&self) -> LoadState<Vec<T>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let language = self.language();
        self.publish(generation, LoadState::Loading);

        let metrics = SiteMetrics::global();
        metrics.record_fetch();

        let outcome = match self.client.fetch_collection::<T>(language).await {
            Ok(items) => LoadState::Ready(items),
            Err(e) => {
                metrics.record_fetch_failure();
                warn!("Failed to load {} ({}): {}", T::NAME, language, e);
                LoadState::Error {
                    message: language.strings().load_failed.to_string(),
                }
            }
        };

        if !self.publish(generation, outcome.clone()) {
            debug!("Discarding stale {} result (generation {})", T::NAME, generation);
        }
        outcome
    }

    /// Re-run the same fetch.
    pub async fn retry(&self) -> LoadState<Vec<T>> {
        self.load().await
    }

    /// Switch language and reload.
    pub async fn set_language(&self, language: Language) -> LoadState<Vec<T>> {
        *self.language.lock().unwrap_or_else(PoisonError::into_inner) = language;
        self.load().await
    }

    /// Stop publishing. In-flight loads complete but their results are dropped.
    pub fn dispose(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn publish(&self, generation: u64, next: LoadState<Vec<T>>) -> bool {
        self.state.send_if_modified(|current| {
            if !self.is_alive() || self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *current = next;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NewsRecord;
    use crate::retry::RetryConfig;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Helper Functions ====================

    fn collection(server: &MockServer, language: Language) -> RemoteCollection<NewsRecord> {
        let client = ApiClient::new(&format!("{}/api", server.uri()), Duration::from_secs(5))
            .unwrap()
            .with_retry_config(RetryConfig::once());
        RemoteCollection::new(client, language)
    }

    fn news_body(title: &str) -> serde_json::Value {
        json!([{"id": 1, "title_fr": title, "title_en": title}])
    }

    // ==================== State Machine Tests ====================

    #[tokio::test]
    async fn test_initial_state_is_loading() {
        let server = MockServer::start().await;
        let news = collection(&server, Language::FRENCH);
        assert!(news.state().is_loading());
    }

    #[tokio::test]
    async fn test_load_reaches_ready() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(news_body("Appel")))
            .mount(&server)
            .await;

        let news = collection(&server, Language::FRENCH);
        let state = news.load().await;

        assert_eq!(state.data().map(Vec::len), Some(1));
        assert_eq!(news.state(), state);
    }

    #[tokio::test]
    async fn test_load_error_carries_localized_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/news"))
            .respond_with(ResponseTemplate::new(500).set_body_string("stack trace"))
            .mount(&server)
            .await;

        let news = collection(&server, Language::ENGLISH);
        let state = news.load().await;

        let message = state.error_message().expect("should be an error");
        assert_eq!(message, Language::ENGLISH.strings().load_failed);
        assert!(!message.contains("stack trace"));
    }

    #[tokio::test]
    async fn test_retry_after_failure_reaches_ready() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/news"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(news_body("Appel")))
            .mount(&server)
            .await;

        let news = collection(&server, Language::FRENCH);
        let mut rx = news.subscribe();

        assert!(news.load().await.error_message().is_some());
        assert!(news.retry().await.data().is_some());
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().data().is_some());
    }

    #[tokio::test]
    async fn test_parse_failure_is_error_state() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
            .mount(&server)
            .await;

        let news = collection(&server, Language::FRENCH);
        assert!(news.load().await.error_message().is_some());
    }

    // ==================== Liveness Tests ====================

    #[tokio::test]
    async fn test_disposed_collection_ignores_late_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/news"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(news_body("Tardif"))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let news = Arc::new(collection(&server, Language::FRENCH));
        let in_flight = tokio::spawn({
            let news = Arc::clone(&news);
            async move { news.load().await }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        news.dispose();

        let outcome = in_flight.await.unwrap();
        assert!(outcome.data().is_some());
        assert!(news.state().is_loading());
    }

    #[tokio::test]
    async fn test_language_change_supersedes_in_flight_load() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/news"))
            .and(query_param("lang", "fr"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(news_body("Ancien"))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/news"))
            .and(query_param("lang", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(news_body("Fresh")))
            .mount(&server)
            .await;

        let news = Arc::new(collection(&server, Language::FRENCH));
        let stale = tokio::spawn({
            let news = Arc::clone(&news);
            async move { news.load().await }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        news.set_language(Language::ENGLISH).await;
        stale.await.unwrap();

        let state = news.state();
        let items = state.data().expect("should be ready");
        assert_eq!(items[0].title_en.as_deref(), Some("Fresh"));
        assert_eq!(news.language(), Language::ENGLISH);
    }
}
