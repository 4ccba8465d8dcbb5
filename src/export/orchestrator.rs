use super::capture::ExportSurface;
use super::document::{PdfProgramme, ProgrammeDocument};
use crate::config::Config;
use crate::i18n::Language;
use crate::metrics::SiteMetrics;
use crate::schedule::{Presentation, ProgramView};
use anyhow::anyhow;
use chrono::NaiveDate;
use std::ops::{Deref, DerefMut};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Vertical gap left after each placed day.
pub const DAY_MARGIN: f32 = 8.0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("the programme has no days to export")]
    NoDays,

    #[error("none of the {skipped} day(s) could be rendered")]
    NothingRendered { skipped: usize },

    #[error("failed to write the programme document: {0}")]
    Document(String),
}

impl ExportError {
    pub fn user_message(&self, language: Language) -> &'static str {
        let strings = language.strings();
        match self {
            ExportError::NoDays => strings.export_no_days,
            ExportError::NothingRendered { .. } | ExportError::Document(_) => strings.export_failed,
        }
    }
}

fn document_error(e: anyhow::Error) -> ExportError {
    ExportError::Document(format!("{:#}", e))
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub language: Language,
    pub title: String,
    pub subtitle: String,
    pub generated_on: NaiveDate,
    /// Upper bound of the wait for a selected day to render
    pub render_timeout: Duration,
}

impl ExportOptions {
    pub fn from_config(config: &Config, language: Language, generated_on: NaiveDate) -> Self {
        Self {
            language,
            title: config.conference_title.resolve_or(language, "").to_string(),
            subtitle: config.conference_subtitle.resolve_or(language, "").to_string(),
            generated_on,
            render_timeout: Duration::from_millis(config.export_render_timeout_ms),
        }
    }
}

/// Progress of a running export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportState {
    pub current_day_index: usize,
    pub is_exporting: bool,
    pub page_cursor_y: f32,
}

#[derive(Debug, Clone)]
pub struct ExportedProgramme {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub included_days: Vec<usize>,
    pub skipped_days: Vec<usize>,
}

pub fn export_filename(language: Language) -> String {
    format!("programme-conference-{}.pdf", language.code())
}

// ==================== Scoped Surface Mutations ====================

/// Reselects the originally active day when dropped.
struct ActiveDayGuard<'a, S: ExportSurface> {
    surface: &'a mut S,
    original: usize,
}

impl<'a, S: ExportSurface> ActiveDayGuard<'a, S> {
    fn new(surface: &'a mut S) -> Self {
        let original = surface.active_day();
        Self { surface, original }
    }
}

impl<S: ExportSurface> Deref for ActiveDayGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: ExportSurface> DerefMut for ActiveDayGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: ExportSurface> Drop for ActiveDayGuard<'_, S> {
    fn drop(&mut self) {
        if self.surface.active_day() == self.original {
            return;
        }
        if let Err(e) = self.surface.select_day(self.original) {
            warn!("Could not restore day {} after export: {}", self.original, e);
        }
    }
}

/// Applies a presentation for the guard's lifetime, then restores the previous one.
struct PresentationGuard<'a, S: ExportSurface> {
    surface: &'a mut S,
    saved: Presentation,
}

impl<'a, S: ExportSurface> PresentationGuard<'a, S> {
    fn apply(surface: &'a mut S, presentation: Presentation) -> Self {
        let saved = surface.presentation();
        surface.set_presentation(presentation);
        Self { surface, saved }
    }
}

impl<S: ExportSurface> Deref for PresentationGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: ExportSurface> Drop for PresentationGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.set_presentation(self.saved);
    }
}

// ==================== Exporter ====================

/// Walks the days of a surface in order and lays each one into a document.
pub struct ProgrammeExporter {
    options: ExportOptions,
    state: ExportState,
}

impl ProgrammeExporter {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            state: ExportState::default(),
        }
    }

    pub fn state(&self) -> &ExportState {
        &self.state
    }

    /// Export every day of `surface` into `document`.
    ///
    /// A day that fails to render or capture is logged and left out. The
    /// surface's active day and presentation are restored on every exit,
    /// including when this future is dropped before completion.
    pub async fn run<S, D>(&mut self, surface: &mut S, mut document: D) -> Result<ExportedProgramme, ExportError>
    where
        S: ExportSurface,
        D: ProgrammeDocument,
    {
        let metrics = SiteMetrics::global();
        let language = self.options.language;
        let strings = language.strings();

        let day_count = surface.day_count();
        if day_count == 0 {
            metrics.record_export_failure();
            warn!("Export requested for an empty programme");
            return Err(ExportError::NoDays);
        }

        info!("Exporting {} day(s) of the programme ({})", day_count, language);
        let generated_date = strings.format_date(self.options.generated_on);
        let generated = strings.generated_on.replace("{date}", &generated_date);

        self.state = ExportState {
            current_day_index: 0,
            is_exporting: true,
            page_cursor_y: 0.0,
        };

        let result = self
            .export_days(surface, &mut document, day_count, &generated)
            .await;
        self.state.is_exporting = false;

        let (included_days, skipped_days) = match result {
            Ok(days) => days,
            Err(e) => {
                metrics.record_export_failure();
                warn!("Export aborted: {}", e);
                return Err(e);
            }
        };

        if included_days.is_empty() {
            metrics.record_export_failure();
            warn!("Export produced no pages: all {} day(s) skipped", skipped_days.len());
            return Err(ExportError::NothingRendered {
                skipped: skipped_days.len(),
            });
        }

        let footer = format!("{} · {}", self.options.title, generated_date);
        document.footer(&footer).map_err(document_error)?;
        let pages = document.page_count();
        let bytes = document.finish().map_err(document_error)?;

        metrics.record_export();
        info!(
            "Programme exported: {} day(s), {} skipped, {} page(s), {} bytes",
            included_days.len(),
            skipped_days.len(),
            pages,
            bytes.len()
        );

        Ok(ExportedProgramme {
            filename: export_filename(language),
            bytes,
            included_days,
            skipped_days,
        })
    }

    async fn export_days<S, D>(
        &mut self,
        surface: &mut S,
        document: &mut D,
        day_count: usize,
        generated: &str,
    ) -> Result<(Vec<usize>, Vec<usize>), ExportError>
    where
        S: ExportSurface,
        D: ProgrammeDocument,
    {
        let metrics = SiteMetrics::global();
        let mut surface = ActiveDayGuard::new(surface);

        self.state.page_cursor_y = document
            .title_block(&self.options.title, &self.options.subtitle, generated)
            .map_err(document_error)?;

        let mut included = Vec::new();
        let mut skipped = Vec::new();

        for index in 0..day_count {
            self.state.current_day_index = index;
            match self.export_day(&mut *surface, document, index).await {
                Ok(true) => included.push(index),
                Ok(false) => {
                    metrics.record_export_day_skipped();
                    skipped.push(index);
                }
                Err(e) => {
                    warn!("Skipping day {} of the export: {:#}", index, e);
                    metrics.record_export_day_skipped();
                    skipped.push(index);
                }
            }
        }

        Ok((included, skipped))
    }

    /// Returns `false` when the day rendered to nothing.
    async fn export_day<S, D>(&mut self, surface: &mut S, document: &mut D, index: usize) -> anyhow::Result<bool>
    where
        S: ExportSurface,
        D: ProgrammeDocument,
    {
        let mut rendered = surface.rendered();
        surface.select_day(index)?;

        let timeout = self.options.render_timeout;
        let signalled = tokio::time::timeout(timeout, rendered.wait_for(|day| *day == Some(index)))
            .await
            .map(|outcome| outcome.is_ok());
        match signalled {
            Ok(true) => {}
            Ok(false) => return Err(anyhow!("render signal closed before day {} rendered", index)),
            Err(_) => return Err(anyhow!("day {} did not render within {:?}", index, timeout)),
        }

        let capture = {
            let styled = PresentationGuard::apply(&mut *surface, Presentation::print());
            styled.capture(index)
        }?;

        if capture.is_empty() {
            warn!("Day {} captured as empty, leaving it out", index);
            return Ok(false);
        }

        let running_title = surface.day_title(index);
        let mut remaining = Some(capture);

        while let Some(part) = remaining.take() {
            let cursor = self.state.page_cursor_y;
            let available = document.content_bottom() - cursor;

            if part.height() <= available {
                document.place(&part, cursor)?;
                self.state.page_cursor_y = cursor + part.height() + DAY_MARGIN;
                break;
            }

            let fresh_page = cursor <= document.content_top();
            if !fresh_page {
                debug!("Day {} does not fit, starting a new page", index);
                self.state.page_cursor_y = document.new_page(&running_title)?;
                remaining = Some(part);
                continue;
            }

            let (head, tail) = part.split_to_fit(available);
            document.place(&head, cursor)?;
            self.state.page_cursor_y = cursor + head.height() + DAY_MARGIN;
            if tail.is_some() {
                self.state.page_cursor_y = document.new_page(&running_title)?;
                remaining = tail;
            }
        }

        Ok(true)
    }
}

/// Export a programme view to an A4 PDF.
pub async fn export_programme(
    view: &mut ProgramView,
    options: ExportOptions,
) -> Result<ExportedProgramme, ExportError> {
    let document = PdfProgramme::new(&options.title);
    ProgrammeExporter::new(options).run(view, document).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SessionRecord;
    use crate::export::capture::{CaptureRow, DayCapture, CONTENT_WIDTH};
    use crate::schedule::{ScheduleError, Side};
    use anyhow::{bail, Result};
    use tokio::sync::watch;

    // ==================== Test Doubles ====================

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Day {
        Rows(usize),
        Empty,
        Fails,
        NeverRenders,
    }

    struct FakeSurface {
        days: Vec<Day>,
        active: usize,
        presentation: Presentation,
        rendered: watch::Sender<Option<usize>>,
        selections: Vec<usize>,
    }

    impl FakeSurface {
        fn new(days: Vec<Day>, active: usize) -> Self {
            let (rendered, _) = watch::channel(Some(active));
            Self {
                days,
                active,
                presentation: Presentation::default(),
                rendered,
                selections: Vec::new(),
            }
        }
    }

    impl ExportSurface for FakeSurface {
        fn day_count(&self) -> usize {
            self.days.len()
        }

        fn active_day(&self) -> usize {
            self.active
        }

        fn select_day(&mut self, index: usize) -> Result<(), ScheduleError> {
            if index >= self.days.len() {
                return Err(ScheduleError::DayOutOfRange {
                    index,
                    len: self.days.len(),
                });
            }
            self.active = index;
            self.selections.push(index);
            if self.days[index] != Day::NeverRenders {
                self.rendered.send_replace(Some(index));
            }
            Ok(())
        }

        fn presentation(&self) -> Presentation {
            self.presentation
        }

        fn set_presentation(&mut self, presentation: Presentation) {
            self.presentation = presentation;
        }

        fn rendered(&self) -> watch::Receiver<Option<usize>> {
            self.rendered.subscribe()
        }

        fn day_title(&self, index: usize) -> String {
            format!("Day {}", index + 1)
        }

        fn capture(&self, index: usize) -> Result<DayCapture> {
            let rows = match self.days[index] {
                Day::Rows(n) => n,
                Day::Empty => 0,
                Day::Fails => bail!("capture blew up"),
                Day::NeverRenders => unreachable!("never rendered"),
            };
            Ok(DayCapture {
                day_index: index,
                title: (rows > 0).then(|| self.day_title(index)),
                chrome: Vec::new(),
                rows: (0..rows)
                    .map(|i| CaptureRow {
                        session_id: i as u64,
                        time: "09:00".to_string(),
                        label: "Session".to_string(),
                        title_lines: vec!["Talk".to_string()],
                        detail_lines: Vec::new(),
                        color: (0, 0, 0),
                        side: Side::Right,
                    })
                    .collect(),
                width: if rows > 0 { CONTENT_WIDTH } else { 0.0 },
                emphasis: self.presentation.emphasis,
            })
        }
    }

    #[derive(Default)]
    struct FakeDocument {
        /// (day, rows, y, emphasis)
        placed: Vec<(usize, usize, f32, bool)>,
        pages: usize,
        footer: Option<String>,
        fail_title: bool,
        bottom: Option<f32>,
    }

    impl ProgrammeDocument for &mut FakeDocument {
        fn content_top(&self) -> f32 {
            20.0
        }

        fn content_bottom(&self) -> f32 {
            self.bottom.unwrap_or(280.0)
        }

        fn title_block(&mut self, _title: &str, _subtitle: &str, _generated: &str) -> Result<f32> {
            if self.fail_title {
                bail!("disk full");
            }
            self.pages = 1;
            Ok(60.0)
        }

        fn new_page(&mut self, _running_title: &str) -> Result<f32> {
            self.pages += 1;
            Ok(20.0)
        }

        fn place(&mut self, capture: &DayCapture, y: f32) -> Result<()> {
            self.placed
                .push((capture.day_index, capture.rows.len(), y, capture.emphasis));
            Ok(())
        }

        fn footer(&mut self, text: &str) -> Result<()> {
            self.footer = Some(text.to_string());
            Ok(())
        }

        fn page_count(&self) -> usize {
            self.pages
        }

        fn finish(self) -> Result<Vec<u8>> {
            Ok(b"%PDF-fake".to_vec())
        }
    }

    fn options(render_timeout: Duration) -> ExportOptions {
        ExportOptions {
            language: Language::FRENCH,
            title: "Colloque".to_string(),
            subtitle: "Programme officiel".to_string(),
            generated_on: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            render_timeout,
        }
    }

    fn exporter() -> ProgrammeExporter {
        ProgrammeExporter::new(options(Duration::from_millis(50)))
    }

    // ==================== Skip Tests ====================

    #[tokio::test]
    async fn test_empty_capture_is_skipped() {
        let mut surface = FakeSurface::new(vec![Day::Rows(2), Day::Empty, Day::Rows(1)], 0);
        let mut document = FakeDocument::default();

        let exported = exporter().run(&mut surface, &mut document).await.unwrap();

        assert_eq!(exported.included_days, vec![0, 2]);
        assert_eq!(exported.skipped_days, vec![1]);
        let placed_days: Vec<usize> = document.placed.iter().map(|p| p.0).collect();
        assert_eq!(placed_days, vec![0, 2]);
        assert_eq!(exported.bytes, b"%PDF-fake");
    }

    #[tokio::test]
    async fn test_failing_day_does_not_lose_others() {
        let mut surface = FakeSurface::new(vec![Day::Rows(1), Day::Fails, Day::Rows(1)], 0);
        let mut document = FakeDocument::default();

        let exported = exporter().run(&mut surface, &mut document).await.unwrap();

        assert_eq!(exported.included_days, vec![0, 2]);
        assert_eq!(exported.skipped_days, vec![1]);
    }

    #[tokio::test]
    async fn test_render_timeout_skips_day() {
        let mut surface = FakeSurface::new(vec![Day::NeverRenders, Day::Rows(1)], 1);
        let mut document = FakeDocument::default();

        let exported = exporter().run(&mut surface, &mut document).await.unwrap();

        assert_eq!(exported.included_days, vec![1]);
        assert_eq!(exported.skipped_days, vec![0]);
    }

    #[tokio::test]
    async fn test_days_processed_in_ascending_order() {
        let mut surface = FakeSurface::new(vec![Day::Rows(1); 4], 2);
        let mut document = FakeDocument::default();

        exporter().run(&mut surface, &mut document).await.unwrap();

        // Last selection restores the day shown before the export
        assert_eq!(surface.selections, vec![0, 1, 2, 3, 2]);
        assert_eq!(surface.active_day(), 2);
    }

    // ==================== Failure Tests ====================

    #[tokio::test]
    async fn test_no_days_aborts_before_document() {
        let mut surface = FakeSurface::new(Vec::new(), 0);
        let mut document = FakeDocument::default();

        let err = exporter().run(&mut surface, &mut document).await.unwrap_err();

        assert!(matches!(err, ExportError::NoDays));
        assert_eq!(document.pages, 0);
        assert_eq!(
            err.user_message(Language::ENGLISH),
            Language::ENGLISH.strings().export_no_days
        );
    }

    #[tokio::test]
    async fn test_all_days_skipped_is_nothing_rendered() {
        let mut surface = FakeSurface::new(vec![Day::Empty, Day::Fails], 0);
        let mut document = FakeDocument::default();

        let err = exporter().run(&mut surface, &mut document).await.unwrap_err();

        assert!(matches!(err, ExportError::NothingRendered { skipped: 2 }));
        assert!(document.footer.is_none());
    }

    #[tokio::test]
    async fn test_title_failure_aborts_cleanly() {
        let mut surface = FakeSurface::new(vec![Day::Rows(1)], 0);
        let mut document = FakeDocument {
            fail_title: true,
            ..Default::default()
        };

        let err = exporter().run(&mut surface, &mut document).await.unwrap_err();

        assert!(matches!(err, ExportError::Document(_)));
        assert!(document.placed.is_empty());
        assert!(surface.selections.is_empty());
    }

    // ==================== Cleanup Tests ====================

    #[tokio::test]
    async fn test_active_day_and_presentation_restored() {
        let mut surface = FakeSurface::new(vec![Day::Rows(1), Day::Fails, Day::Rows(2)], 1);
        let mut document = FakeDocument::default();
        let mut exporter = exporter();

        exporter.run(&mut surface, &mut document).await.unwrap();

        assert_eq!(surface.active_day(), 1);
        assert_eq!(surface.presentation(), Presentation::default());
        assert!(document.placed.iter().all(|p| p.3), "captured without print styling");
        assert!(!exporter.state().is_exporting);
        assert_eq!(exporter.state().current_day_index, 2);
    }

    #[tokio::test]
    async fn test_restored_after_nothing_rendered() {
        let mut surface = FakeSurface::new(vec![Day::Empty, Day::Empty], 1);
        let mut document = FakeDocument::default();

        assert!(exporter().run(&mut surface, &mut document).await.is_err());
        assert_eq!(surface.active_day(), 1);
        assert_eq!(surface.presentation(), Presentation::default());
    }

    #[tokio::test]
    async fn test_restored_when_export_is_cancelled() {
        let mut surface = FakeSurface::new(vec![Day::NeverRenders, Day::Rows(1), Day::Rows(1)], 2);
        let mut document = FakeDocument::default();
        let mut exporter = ProgrammeExporter::new(options(Duration::from_secs(30)));

        let cancelled = tokio::time::timeout(
            Duration::from_millis(50),
            exporter.run(&mut surface, &mut document),
        )
        .await;

        assert!(cancelled.is_err());
        assert_eq!(surface.selections, vec![0, 2]);
        assert_eq!(surface.active_day(), 2);
        assert_eq!(surface.presentation(), Presentation::default());
    }

    // ==================== Pagination Tests ====================

    #[tokio::test]
    async fn test_day_that_does_not_fit_starts_new_page() {
        // 3 rows + title = 65.5mm; the second day no longer fits below the first.
        let mut surface = FakeSurface::new(vec![Day::Rows(3), Day::Rows(3)], 0);
        let mut document = FakeDocument {
            bottom: Some(150.0),
            ..Default::default()
        };

        exporter().run(&mut surface, &mut document).await.unwrap();

        assert_eq!(document.pages, 2);
        assert_eq!(document.placed.len(), 2);
        assert_eq!(document.placed[0].2, 60.0);
        assert_eq!(document.placed[1].2, 20.0);
    }

    #[tokio::test]
    async fn test_tall_day_is_split_across_pages() {
        let mut surface = FakeSurface::new(vec![Day::Rows(20)], 0);
        let mut document = FakeDocument {
            bottom: Some(120.0),
            ..Default::default()
        };

        let mut exporter = exporter();
        exporter.run(&mut surface, &mut document).await.unwrap();

        let rows_placed: usize = document.placed.iter().map(|p| p.1).sum();
        assert_eq!(rows_placed, 20);
        assert!(document.pages > 2);
        assert!(document.placed.iter().all(|p| p.0 == 0));
        assert!(exporter.state().page_cursor_y <= 120.0 + DAY_MARGIN);
    }

    // ==================== End-to-End Tests ====================

    fn record(id: u64, day: &str, time: &str) -> SessionRecord {
        SessionRecord {
            id,
            day: Some(day.to_string()),
            time: Some(time.to_string()),
            title_fr: Some(format!("Séance {}", id)),
            event_type: Some("atelier".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_export_programme_view_to_pdf() {
        let mut view = ProgramView::from_records(
            &[
                record(1, "2025-10-24", "09:00"),
                record(2, "2025-10-25", "10:00"),
                record(3, "2025-10-25", "08:00"),
            ],
            Language::FRENCH,
        );
        view.select_day(1).unwrap();

        let exported = export_programme(&mut view, options(Duration::from_millis(200)))
            .await
            .unwrap();

        assert_eq!(exported.filename, "programme-conference-fr.pdf");
        assert!(exported.bytes.starts_with(b"%PDF"));
        assert_eq!(exported.included_days, vec![0, 1]);
        assert_eq!(view.active_day(), 1);
        assert_eq!(view.presentation(), Presentation::default());
    }

    #[test]
    fn test_export_filename_is_language_qualified() {
        assert_eq!(export_filename(Language::ENGLISH), "programme-conference-en.pdf");
    }
}
