use crate::i18n::{Language, Localized};
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,

    // Backend
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub fetch_max_attempts: u32,

    // Site
    pub default_language: Language,
    pub conference_title: Localized,
    pub conference_subtitle: Localized,

    // Export
    pub export_render_timeout_ms: u64,

    // Server
    pub port: u16,
}

const DEFAULT_TITLE_FR: &str = "Colloque international";
const DEFAULT_TITLE_EN: &str = "International Conference";
const DEFAULT_SUBTITLE_FR: &str = "Programme officiel";
const DEFAULT_SUBTITLE_EN: &str = "Official programme";

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000/api".to_string());
        reqwest::Url::parse(&api_base_url)
            .with_context(|| format!("API_BASE_URL is not a valid URL: {}", api_base_url))?;

        let default_language = match std::env::var("DEFAULT_LANGUAGE") {
            Ok(code) => Language::from_code(&code).context("DEFAULT_LANGUAGE is not supported")?,
            Err(_) => Language::canonical(),
        };

        Ok(Self {
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),

            // Backend
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            fetch_max_attempts: std::env::var("FETCH_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|attempts: &u32| *attempts >= 1)
                .unwrap_or(3),

            // Site
            default_language,
            conference_title: localized_from_env(
                "CONFERENCE_TITLE_FR",
                "CONFERENCE_TITLE_EN",
                DEFAULT_TITLE_FR,
                DEFAULT_TITLE_EN,
            ),
            conference_subtitle: localized_from_env(
                "CONFERENCE_SUBTITLE_FR",
                "CONFERENCE_SUBTITLE_EN",
                DEFAULT_SUBTITLE_FR,
                DEFAULT_SUBTITLE_EN,
            ),

            // Export
            export_render_timeout_ms: std::env::var("EXPORT_RENDER_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2000),

            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }

    /// Configuration pointing at a given backend, with defaults everywhere else.
    pub fn for_backend(api_base_url: &str) -> Self {
        Self {
            environment: "test".to_string(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            request_timeout_secs: 5,
            fetch_max_attempts: 1,
            default_language: Language::canonical(),
            conference_title: Localized::from_pair(Some(DEFAULT_TITLE_FR), Some(DEFAULT_TITLE_EN)),
            conference_subtitle: Localized::from_pair(
                Some(DEFAULT_SUBTITLE_FR),
                Some(DEFAULT_SUBTITLE_EN),
            ),
            export_render_timeout_ms: 500,
            port: 0,
        }
    }
}

fn localized_from_env(fr_var: &str, en_var: &str, fr_default: &str, en_default: &str) -> Localized {
    let fr = std::env::var(fr_var).unwrap_or_else(|_| fr_default.to_string());
    let en = std::env::var(en_var).unwrap_or_else(|_| en_default.to_string());
    Localized::from_pair(Some(&fr), Some(&en))
}
