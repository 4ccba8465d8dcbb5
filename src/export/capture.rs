//! Day captures: a laid-out, paginatable snapshot of one rendered day.
//!
//! All measurements are millimetres on an A4 portrait page.

use crate::schedule::{Presentation, ProgramView, ScheduleError, Side};
use anyhow::{bail, Result};
use tokio::sync::watch;

pub const CONTENT_WIDTH: f32 = 170.0;
pub const CARD_WIDTH: f32 = 75.0;

pub const TITLE_HEIGHT: f32 = 10.0;
pub const CHROME_LINE: f32 = 6.0;
pub const TIME_LINE: f32 = 5.0;
pub const TITLE_LINE: f32 = 5.5;
pub const BODY_LINE: f32 = 4.5;
pub const ROW_PADDING: f32 = 4.0;

/// Characters per line at the card width for each text size.
const TITLE_CHARS: usize = 38;
const BODY_CHARS: usize = 46;

/// Something the exporter can drive day by day and capture.
pub trait ExportSurface {
    fn day_count(&self) -> usize;
    fn active_day(&self) -> usize;
    fn select_day(&mut self, index: usize) -> Result<(), ScheduleError>;
    fn presentation(&self) -> Presentation;
    fn set_presentation(&mut self, presentation: Presentation);

    /// Publishes the index of each day as soon as it has been rendered.
    fn rendered(&self) -> watch::Receiver<Option<usize>>;

    fn day_title(&self, index: usize) -> String;

    /// Capture the currently rendered day.
    fn capture(&self, index: usize) -> Result<DayCapture>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRow {
    pub session_id: u64,
    pub time: String,
    pub label: String,
    pub title_lines: Vec<String>,
    pub detail_lines: Vec<String>,
    pub color: (u8, u8, u8),
    pub side: Side,
}

impl CaptureRow {
    pub fn height(&self) -> f32 {
        ROW_PADDING * 2.0
            + TIME_LINE
            + self.title_lines.len() as f32 * TITLE_LINE
            + self.detail_lines.len() as f32 * BODY_LINE
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayCapture {
    pub day_index: usize,
    /// Day title; `None` on the continuation of a split day
    pub title: Option<String>,
    /// Page chrome that was visible when the capture was taken
    pub chrome: Vec<String>,
    pub rows: Vec<CaptureRow>,
    pub width: f32,
    pub emphasis: bool,
}

impl DayCapture {
    pub fn height(&self) -> f32 {
        let title = if self.title.is_some() { TITLE_HEIGHT } else { 0.0 };
        title
            + self.chrome.len() as f32 * CHROME_LINE
            + self.rows.iter().map(CaptureRow::height).sum::<f32>()
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height() <= 0.0
    }

    /// Split so the first part fits in `max_height`.
    ///
    /// The first part always takes at least one row so that repeated
    /// splitting terminates even when a single row exceeds a page.
    pub fn split_to_fit(mut self, max_height: f32) -> (DayCapture, Option<DayCapture>) {
        if self.height() <= max_height || self.rows.len() <= 1 {
            return (self, None);
        }

        let fixed = self.height() - self.rows.iter().map(CaptureRow::height).sum::<f32>();
        let mut used = fixed;
        let mut take = 0;
        for row in &self.rows {
            if take > 0 && used + row.height() > max_height {
                break;
            }
            used += row.height();
            take += 1;
        }

        if take >= self.rows.len() {
            return (self, None);
        }

        let rest_rows = self.rows.split_off(take);
        let rest = DayCapture {
            day_index: self.day_index,
            title: None,
            chrome: Vec::new(),
            rows: rest_rows,
            width: self.width,
            emphasis: self.emphasis,
        };
        (self, Some(rest))
    }
}

/// Greedy word wrap; words longer than a line are cut.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// ==================== ProgramView Surface ====================

impl ExportSurface for ProgramView {
    fn day_count(&self) -> usize {
        ProgramView::day_count(self)
    }

    fn active_day(&self) -> usize {
        ProgramView::active_day(self)
    }

    fn select_day(&mut self, index: usize) -> Result<(), ScheduleError> {
        ProgramView::select_day(self, index)
    }

    fn presentation(&self) -> Presentation {
        ProgramView::presentation(self)
    }

    fn set_presentation(&mut self, presentation: Presentation) {
        ProgramView::set_presentation(self, presentation)
    }

    fn rendered(&self) -> watch::Receiver<Option<usize>> {
        ProgramView::rendered(self)
    }

    fn day_title(&self, index: usize) -> String {
        ProgramView::day_title(self, index).unwrap_or_default()
    }

    fn capture(&self, index: usize) -> Result<DayCapture> {
        if index != ProgramView::active_day(self) || ProgramView::day_count(self) == 0 {
            bail!(
                "day {} is not rendered (active day is {})",
                index,
                ProgramView::active_day(self)
            );
        }

        let strings = self.language().strings();
        let presentation = ProgramView::presentation(self);

        let mut chrome = Vec::new();
        if presentation.show_heading {
            chrome.push(strings.programme_heading.to_string());
        }
        if presentation.show_day_tabs {
            let tabs: Vec<String> = self.tabs().into_iter().map(|t| t.label).collect();
            chrome.push(tabs.join("   "));
        }
        if presentation.show_actions {
            chrome.push(strings.export_button.to_string());
        }

        let rows = self
            .cards()
            .iter()
            .map(|card| {
                let mut details = Vec::new();
                if let Some(description) = &card.description {
                    details.extend(wrap_text(description, BODY_CHARS));
                }
                if let Some(speaker) = &card.speaker {
                    details.extend(wrap_text(
                        &format!("{} : {}", strings.speaker_label, speaker),
                        BODY_CHARS,
                    ));
                }
                if let Some(location) = &card.location {
                    details.extend(wrap_text(
                        &format!("{} : {}", strings.location_label, location),
                        BODY_CHARS,
                    ));
                }

                CaptureRow {
                    session_id: card.session_id,
                    time: card.time_range(),
                    label: card.event_label.to_string(),
                    title_lines: wrap_text(&card.title, TITLE_CHARS),
                    detail_lines: details,
                    color: card.style.color,
                    side: card.side,
                }
            })
            .collect();

        Ok(DayCapture {
            day_index: index,
            title: ProgramView::day_title(self, index),
            chrome,
            rows,
            width: CONTENT_WIDTH,
            emphasis: presentation.emphasis,
        })
    }
}
