use super::entities::{Collection, SessionRecord};
use super::error::ApiError;
use super::write::{Payload, WriteMethod, WriteRequest};
use crate::config::Config;
use crate::i18n::Language;
use crate::metrics::SiteMetrics;
use crate::retry::{with_retry_if, RetryConfig};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Raw bodies longer than this are cut before they reach an error value.
const MAX_ERROR_BODY: usize = 512;

/// Email/password pair posted to the backend's `login` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// The authenticated administrator as described by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginResponse {
    pub token: String,
    pub user: AdminUser,
}

/// HTTP client for the conference REST backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryConfig::backend_fetch(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let retry = RetryConfig {
            max_attempts: config.fetch_max_attempts.max(1),
            ..RetryConfig::backend_fetch()
        };
        Ok(Self::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?
        .with_retry_config(retry))
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // ==================== Reads ====================

    /// Fetch a whole collection in the given language.
    ///
    /// Transport failures and 5xx responses are retried; anything else
    /// fails on the first attempt.
    pub async fn fetch_collection<T: Collection>(&self, language: Language) -> Result<Vec<T>, ApiError> {
        let url = self.url(T::PATH);
        let query = [("lang", language.code())];
        let body = with_retry_if(
            &self.retry,
            &format!("fetch {}", T::NAME),
            || self.get(&url, &query),
            ApiError::is_retryable,
        )
        .await?;

        let items: Vec<T> = decode_list(&url, body)?;
        debug!("Fetched {} {} record(s)", items.len(), T::NAME);
        Ok(items)
    }

    /// Fetch one record of a collection.
    pub async fn fetch_one<T: Collection>(&self, id: u64, language: Language) -> Result<T, ApiError> {
        let url = self.url(&format!("{}/{}", T::RESOURCE, id));
        let query = [("lang", language.code())];
        let body = with_retry_if(
            &self.retry,
            &format!("fetch {} {}", T::NAME, id),
            || self.get(&url, &query),
            ApiError::is_retryable,
        )
        .await?;

        decode(&url, body)
    }

    /// Sessions of a single day, as filtered by the backend.
    pub async fn fetch_daily_programme(
        &self,
        date: NaiveDate,
        language: Language,
    ) -> Result<Vec<SessionRecord>, ApiError> {
        let url = self.url("programme/daily");
        let date = date.format("%Y-%m-%d").to_string();
        let query = [("date", date.as_str()), ("lang", language.code())];
        let body = with_retry_if(
            &self.retry,
            "fetch daily programme",
            || self.get(&url, &query),
            ApiError::is_retryable,
        )
        .await?;

        decode_list(&url, body)
    }

    /// Registration counters. The shape is owned by the backend, so the
    /// object is passed through as-is.
    pub async fn registration_statistics(&self) -> Result<serde_json::Map<String, Value>, ApiError> {
        let url = self.url("registrations/statistics");
        let body = with_retry_if(
            &self.retry,
            "fetch registration statistics",
            || self.get(&url, &[]),
            ApiError::is_retryable,
        )
        .await?;

        match body {
            Value::Object(map) => Ok(map),
            other => Err(ApiError::Parse {
                url,
                detail: format!("expected an object, got {}", json_kind(&other)),
            }),
        }
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        debug!("GET {}", url);
        let request = self.http.get(url).query(query);
        let body = self.execute(url, request).await?;
        unwrap_envelope(url, body)
    }

    // ==================== Writes ====================

    /// Perform one write. Writes are sent exactly once.
    pub async fn write(&self, request: &WriteRequest, token: Option<&str>) -> Result<Value, ApiError> {
        let url = self.url(&request.path());

        let builder = match (&request.method, &request.payload) {
            (WriteMethod::Create, _) => self.http.post(&url),
            // Multipart bodies are not parsed on PUT by the backend, so edits
            // with a file are tunnelled through POST.
            (WriteMethod::Update(_), Payload::Multipart(_)) => self.http.post(&url),
            (WriteMethod::Update(_), _) => self.http.put(&url),
            (WriteMethod::Delete(_), _) => self.http.delete(&url),
        };

        let builder = match &request.payload {
            Payload::Empty => builder,
            Payload::Json(value) => builder.json(value),
            Payload::Multipart(multipart) => {
                let mut form = multipart.to_form();
                if matches!(request.method, WriteMethod::Update(_)) {
                    form = form.text("_method", "PUT");
                }
                builder.multipart(form)
            }
        };

        let builder = match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        debug!("{:?} {}", request.method, url);
        let result = match self.execute(&url, builder).await {
            Ok(body) => unwrap_envelope(&url, body),
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => {
                SiteMetrics::global().record_write();
                info!("Write {:?} on {} accepted", request.method, request.resource);
            }
            Err(e) => {
                SiteMetrics::global().record_write_failure();
                warn!("Write {:?} on {} failed: {}", request.method, request.resource, e);
            }
        }

        result
    }

    /// Exchange credentials for a bearer token.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let url = self.url("login");
        let request = self.http.post(&url).json(credentials);
        let body = self.execute(&url, request).await?;
        let body = unwrap_envelope(&url, body)?;

        let token = ["token", "access_token"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Parse {
                url: url.clone(),
                detail: "login response carries no token".to_string(),
            })?
            .to_string();

        let user = body
            .get("user")
            .cloned()
            .and_then(|user| serde_json::from_value(user).ok())
            .unwrap_or_default();

        Ok(LoginResponse { token, user })
    }

    // ==================== Transport ====================

    async fn execute(&self, url: &str, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate(&text, MAX_ERROR_BODY),
            });
        }

        // 204 and empty delete responses
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Parse {
            url: url.to_string(),
            detail: e.to_string(),
        })
    }
}

// ==================== Body Decoding ====================

/// Strip a `{ success, data, message }` envelope if the body carries one.
fn unwrap_envelope(url: &str, body: Value) -> Result<Value, ApiError> {
    match body {
        Value::Object(mut map) if map.contains_key("success") => {
            let success = map.get("success").and_then(Value::as_bool).unwrap_or(false);
            if !success {
                let message = map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("request was not successful")
                    .to_string();
                debug!("Backend rejected request to {}: {}", url, message);
                return Err(ApiError::Rejected(message));
            }
            Ok(map.remove("data").unwrap_or(Value::Null))
        }
        other => Ok(other),
    }
}

fn decode<T: serde::de::DeserializeOwned>(url: &str, body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::Parse {
        url: url.to_string(),
        detail: e.to_string(),
    })
}

/// Decode a list body: a bare array, `null`, or a paginated `{ data: [...] }`.
fn decode_list<T: serde::de::DeserializeOwned>(url: &str, body: Value) -> Result<Vec<T>, ApiError> {
    match body {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => decode(url, body),
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_array) => {
            decode(url, map.remove("data").unwrap_or(Value::Null))
        }
        other => Err(ApiError::Parse {
            url: url.to_string(),
            detail: format!("expected a list, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::entities::ArchiveRecord;
    use crate::backend::write::MultipartPayload;
    use serde_json::json;
    use wiremock::{
        matchers::{body_string_contains, header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Helper Functions ====================

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&format!("{}/api", server.uri()), Duration::from_secs(5))
            .unwrap()
            .with_retry_config(RetryConfig::new(3, Duration::from_millis(1)))
    }

    // ==================== Envelope Tests ====================

    #[test]
    fn test_unwrap_envelope_returns_data() {
        let body = json!({"success": true, "data": [1, 2]});
        assert_eq!(unwrap_envelope("u", body).unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_unwrap_envelope_passes_bare_values_through() {
        assert_eq!(unwrap_envelope("u", json!([1])).unwrap(), json!([1]));
        assert_eq!(unwrap_envelope("u", json!({"id": 1})).unwrap(), json!({"id": 1}));
    }

    #[test]
    fn test_unwrap_envelope_rejects_unsuccessful() {
        let body = json!({"success": false, "message": "Validation failed"});
        match unwrap_envelope("u", body) {
            Err(ApiError::Rejected(message)) => assert_eq!(message, "Validation failed"),
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_list_accepts_paginated_body() {
        let body = json!({"current_page": 1, "data": [{"id": 1}, {"id": 2}]});
        let items: Vec<ArchiveRecord> = decode_list("u", body).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_decode_list_rejects_scalar() {
        let result: Result<Vec<ArchiveRecord>, _> = decode_list("u", json!("oops"));
        assert!(matches!(result, Err(ApiError::Parse { .. })));
    }

    #[test]
    fn test_truncate_long_body() {
        let long = "x".repeat(600);
        let cut = truncate(&long, MAX_ERROR_BODY);
        assert_eq!(cut.chars().count(), MAX_ERROR_BODY + 1);
        assert_eq!(truncate("short", MAX_ERROR_BODY), "short");
    }

    // ==================== Fetch Tests ====================

    #[tokio::test]
    async fn test_fetch_collection_enveloped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/archives"))
            .and(query_param("lang", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{"id": 1, "title_en": "2023 edition", "year": 2023}]
            })))
            .mount(&server)
            .await;

        let archives: Vec<ArchiveRecord> = client_for(&server)
            .fetch_collection(Language::ENGLISH)
            .await
            .unwrap();

        assert_eq!(archives.len(), 1);
        assert_eq!(archives[0].year, Some(2023));
    }

    #[tokio::test]
    async fn test_fetch_collection_retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/archives"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let result: Result<Vec<ArchiveRecord>, _> =
            client_for(&server).fetch_collection(Language::FRENCH).await;

        assert!(matches!(result, Err(ApiError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_fetch_collection_does_not_retry_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/archives"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .expect(1)
            .mount(&server)
            .await;

        let result: Result<Vec<ArchiveRecord>, _> =
            client_for(&server).fetch_collection(Language::FRENCH).await;

        match result {
            Err(ApiError::Status { status, body, .. }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "not here");
            }
            other => panic!("expected Status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_collection_parse_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/archives"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result: Result<Vec<ArchiveRecord>, _> =
            client_for(&server).fetch_collection(Language::FRENCH).await;

        assert!(matches!(result, Err(ApiError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_fetch_daily_programme_sends_date() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/programme/daily"))
            .and(query_param("date", "2025-10-24"))
            .and(query_param("lang", "fr"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 4, "day": "2025-10-24", "time": "09:00", "title_fr": "Accueil"}
            ])))
            .mount(&server)
            .await;

        let date = NaiveDate::from_ymd_opt(2025, 10, 24).unwrap();
        let sessions = client_for(&server)
            .fetch_daily_programme(date, Language::FRENCH)
            .await
            .unwrap();

        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, 4);
    }

    #[tokio::test]
    async fn test_registration_statistics_requires_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/registrations/statistics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"total": 120, "confirmed": 90}
            })))
            .mount(&server)
            .await;

        let stats = client_for(&server).registration_statistics().await.unwrap();
        assert_eq!(stats.get("total"), Some(&json!(120)));
    }

    // ==================== Write Tests ====================

    #[tokio::test]
    async fn test_write_json_update_uses_put_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/partners/7"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": {"id": 7}})))
            .expect(1)
            .mount(&server)
            .await;

        let request = WriteRequest::update("partners", 7, Payload::Json(json!({"name_fr": "X"})));
        let body = client_for(&server).write(&request, Some("tok")).await.unwrap();
        assert_eq!(body, json!({"id": 7}));
    }

    #[tokio::test]
    async fn test_write_multipart_update_tunnels_through_post() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/archives/3"))
            .and(body_string_contains("_method"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3})))
            .expect(1)
            .mount(&server)
            .await;

        let payload = Payload::Multipart(MultipartPayload::default().text("title_fr", "Édition"));
        let request = WriteRequest::update("archives", 3, payload);
        assert!(client_for(&server).write(&request, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_write_is_never_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/archives"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let request = WriteRequest::create("archives", Payload::Json(json!({})));
        let result = client_for(&server).write(&request, None).await;
        assert!(matches!(result, Err(ApiError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_delete_with_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/programme/9"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let request = WriteRequest::delete("programme", 9);
        let body = client_for(&server).write(&request, Some("tok")).await.unwrap();
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_write_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/archives/1"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .write(&WriteRequest::delete("archives", 1), Some("expired"))
            .await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    // ==================== Login Tests ====================

    #[tokio::test]
    async fn test_login_accepts_access_token_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"access_token": "abc", "user": {"name": "Admin", "email": "a@b.c"}}
            })))
            .mount(&server)
            .await;

        let credentials = Credentials {
            email: "a@b.c".to_string(),
            password: "pw".to_string(),
        };
        let response = client_for(&server).login(&credentials).await.unwrap();
        assert_eq!(response.token, "abc");
        assert_eq!(response.user.name.as_deref(), Some("Admin"));
    }

    #[tokio::test]
    async fn test_login_without_token_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {}})))
            .mount(&server)
            .await;

        let credentials = Credentials {
            email: "a@b.c".to_string(),
            password: "pw".to_string(),
        };
        let result = client_for(&server).login(&credentials).await;
        assert!(matches!(result, Err(ApiError::Parse { .. })));
    }
}
