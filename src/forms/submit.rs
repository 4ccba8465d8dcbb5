//! Sends validated forms to the backend, one write at a time.

use super::{EntityForm, FieldErrors};
use crate::backend::{ApiClient, WriteRequest};
use crate::i18n::Language;
use crate::metrics::SiteMetrics;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The backend accepted the write; carries its response body
    Saved(Value),
    /// Validation failed and nothing was sent
    Invalid(FieldErrors),
    /// The write was sent and failed
    Failed { message: String },
    /// Another write is still in flight
    Busy,
}

impl SubmitOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SubmitOutcome::Saved(_))
    }
}

/// Clears the in-flight flag when the write finishes or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct FormSubmitter {
    client: ApiClient,
    in_flight: Arc<AtomicBool>,
}

impl FormSubmitter {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validate, then send exactly one write. `on_success` runs only when
    /// the backend accepts it.
    pub async fn submit<F, S>(
        &self,
        form: &F,
        token: Option<&str>,
        language: Language,
        on_success: S,
    ) -> SubmitOutcome
    where
        F: EntityForm,
        S: FnOnce(&Value) + Send,
    {
        let errors = form.validate(language);
        if errors.has_errors() {
            SiteMetrics::global().record_form_rejected();
            debug!(
                "{} form rejected: {}",
                F::ADMIN_PATH,
                errors.fields().collect::<Vec<_>>().join(", ")
            );
            return SubmitOutcome::Invalid(errors);
        }

        let outcome = self
            .send(&form.request(), token, language.strings().form_submit_failed)
            .await;
        if let SubmitOutcome::Saved(body) = &outcome {
            on_success(body);
        }
        outcome
    }

    pub async fn delete<F: EntityForm>(&self, id: u64, token: Option<&str>, language: Language) -> SubmitOutcome {
        let resource = <F::Record as crate::backend::Collection>::RESOURCE;
        self.send(
            &WriteRequest::delete(resource, id),
            token,
            language.strings().delete_failed,
        )
        .await
    }

    async fn send(&self, request: &WriteRequest, token: Option<&str>, failure: &str) -> SubmitOutcome {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            warn!("Write on {} refused: another write is in flight", request.resource);
            return SubmitOutcome::Busy;
        };

        match self.client.write(request, token).await {
            Ok(body) => SubmitOutcome::Saved(body),
            Err(_) => SubmitOutcome::Failed {
                message: failure.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{ArchiveForm, PartnerForm};
    use crate::retry::RetryConfig;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use wiremock::{
        matchers::{body_partial_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Helper Functions ====================

    fn submitter_for(server: &MockServer) -> FormSubmitter {
        let client = ApiClient::new(&format!("{}/api", server.uri()), Duration::from_secs(5))
            .unwrap()
            .with_retry_config(RetryConfig::new(3, Duration::from_millis(1)));
        FormSubmitter::new(client)
    }

    fn archive_input(participants: &str, title_en: &str) -> HashMap<String, String> {
        [
            ("title_fr", "Colloque 2024"),
            ("title_en", title_en),
            ("year", "2024"),
            ("participants", participants),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    // ==================== Submit Tests ====================

    #[tokio::test]
    async fn test_invalid_form_makes_no_call_then_corrected_form_saves() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/archives"))
            .and(header("authorization", "Bearer tok"))
            .and(body_partial_json(json!({"participants": 300, "title_en": "Conference 2024"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true, "data": {"id": 9}})))
            .expect(1)
            .mount(&server)
            .await;

        let submitter = submitter_for(&server);
        let calls = AtomicUsize::new(0);

        let invalid = ArchiveForm::from_fields(&archive_input("-5", ""), None);
        let outcome = submitter
            .submit(&invalid, Some("tok"), Language::FRENCH, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        match outcome {
            SubmitOutcome::Invalid(errors) => {
                assert!(errors.get("participants").is_some());
                assert!(errors.get("title_en").is_some());
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
        assert!(server.received_requests().await.unwrap().is_empty());

        let corrected = ArchiveForm::from_fields(&archive_input("300", "Conference 2024"), None);
        let outcome = submitter
            .submit(&corrected, Some("tok"), Language::FRENCH, |body| {
                assert_eq!(body["id"], 9);
                calls.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        assert!(outcome.is_saved());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!submitter.is_busy());
    }

    #[tokio::test]
    async fn test_backend_failure_is_one_message_and_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/partners/4"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let submitter = submitter_for(&server);
        let fields: HashMap<String, String> = [("name_fr", "Partenaire"), ("name_en", "Partner")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let form = PartnerForm::from_fields(&fields, None).with_id(4);

        let outcome = submitter
            .submit(&form, None, Language::ENGLISH, |_| panic!("must not run on failure"))
            .await;
        assert_eq!(
            outcome,
            SubmitOutcome::Failed {
                message: Language::ENGLISH.strings().form_submit_failed.to_string()
            }
        );
        assert!(!submitter.is_busy());
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_busy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/archives"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"id": 1}))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let submitter = submitter_for(&server);
        let form = ArchiveForm::from_fields(&archive_input("10", "Conference 2024"), None);

        let (first, second) = tokio::join!(
            submitter.submit(&form, None, Language::FRENCH, |_| {}),
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                submitter.submit(&form, None, Language::FRENCH, |_| {}).await
            }
        );
        assert!(first.is_saved());
        assert_eq!(second, SubmitOutcome::Busy);
    }

    #[tokio::test]
    async fn test_delete_uses_delete_method() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/archives/12"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let submitter = submitter_for(&server);
        let outcome = submitter.delete::<ArchiveForm>(12, Some("tok"), Language::FRENCH).await;
        assert_eq!(outcome, SubmitOutcome::Saved(Value::Null));
    }
}
