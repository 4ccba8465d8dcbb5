//! Export binary - writes the programme PDF to disk without running the site
//!
//! Usage:
//!   cargo run --bin export                          # French programme in the current directory
//!   cargo run --bin export -- --lang en             # English programme
//!   cargo run --bin export -- --out dist/prog.pdf   # Explicit output path
//!
//! Optional environment variables:
//! - API_BASE_URL (defaults to http://localhost:8000/api)
//! - CONFERENCE_TITLE_FR / CONFERENCE_TITLE_EN
//! - EXPORT_RENDER_TIMEOUT_MS (defaults to 2000)

use anyhow::{bail, Context, Result};
use chrono::Local;
use conference_site::backend::{ApiClient, SessionRecord};
use conference_site::config::Config;
use conference_site::export::{export_programme, ExportOptions};
use conference_site::i18n::Language;
use conference_site::schedule::ProgramView;
use std::path::PathBuf;
use tracing::{info, warn};

struct Args {
    language: Option<String>,
    out: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        language: None,
        out: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--lang" => args.language = Some(iter.next().context("--lang needs a value")?),
            "--out" => args.out = Some(iter.next().context("--out needs a value")?.into()),
            other => bail!("Unknown argument: {}", other),
        }
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("conference_site=info".parse()?),
        )
        .init();

    let args = parse_args()?;
    let config = Config::from_env()?;
    let language = match &args.language {
        Some(code) => Language::from_code(code)?,
        None => config.default_language,
    };

    let client = ApiClient::from_config(&config)?;
    let records = client
        .fetch_collection::<SessionRecord>(language)
        .await
        .context("Failed to fetch the programme")?;
    info!("Fetched {} session(s)", records.len());

    let mut view = ProgramView::from_records(&records, language);
    let options = ExportOptions::from_config(&config, language, Local::now().date_naive());
    let exported = match export_programme(&mut view, options).await {
        Ok(exported) => exported,
        Err(e) => bail!("{} ({})", e.user_message(language), e),
    };

    if !exported.skipped_days.is_empty() {
        warn!("Skipped day(s): {:?}", exported.skipped_days);
    }

    let path = args.out.unwrap_or_else(|| PathBuf::from(&exported.filename));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, &exported.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(
        "Wrote {} ({} bytes, {} day(s))",
        path.display(),
        exported.bytes.len(),
        exported.included_days.len()
    );
    Ok(())
}
