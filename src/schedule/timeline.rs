//! Timeline renderer state for the programme page.

use super::model::{build_schedule, day_at, DaySchedule, EventType, ScheduleError, Session};
use crate::backend::SessionRecord;
use crate::i18n::Language;
use tokio::sync::watch;
use tracing::debug;

// ==================== Event Styles ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventStyle {
    /// Icon name, used as a CSS class suffix
    pub icon: &'static str,
    /// Character shown inside the marker
    pub glyph: &'static str,
    pub color: (u8, u8, u8),
}

impl EventStyle {
    pub fn css_color(&self) -> String {
        let (r, g, b) = self.color;
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// Marker icon and colour for an event type. `Other` gets the neutral style.
pub fn event_style(event_type: EventType) -> EventStyle {
    let (icon, glyph, color) = match event_type {
        EventType::Keynote => ("microphone", "🎤", (192, 57, 43)),
        EventType::Session => ("presentation", "📋", (41, 128, 185)),
        EventType::Workshop => ("tools", "🛠", (39, 174, 96)),
        EventType::Panel => ("users", "👥", (142, 68, 173)),
        EventType::Break => ("coffee", "☕", (211, 84, 0)),
        EventType::Meal => ("utensils", "🍽", (230, 126, 34)),
        EventType::Networking => ("handshake", "🤝", (22, 160, 133)),
        EventType::Ceremony => ("award", "🏅", (183, 149, 11)),
        EventType::Welcome => ("door", "👋", (52, 152, 219)),
        EventType::Demo => ("monitor", "💻", (44, 62, 80)),
        EventType::Closing => ("flag", "🏁", (120, 40, 31)),
        EventType::Other => ("calendar", "•", (127, 140, 141)),
    };
    EventStyle { icon, glyph, color }
}

// ==================== Cards ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Even positions go right of the rule, odd positions left.
pub fn side_for(position: usize) -> Side {
    if position % 2 == 0 {
        Side::Right
    } else {
        Side::Left
    }
}

/// One session resolved for display in a given language.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineCard {
    pub session_id: u64,
    pub time: String,
    pub end_time: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub speaker: Option<String>,
    pub location: Option<String>,
    pub event_type: EventType,
    pub event_label: &'static str,
    pub style: EventStyle,
    pub side: Side,
}

impl TimelineCard {
    pub fn resolve(session: &Session, position: usize, language: Language) -> Self {
        let event_label = language.strings().event_label(session.event_type.ordinal());
        let optional = |text: &crate::i18n::Localized| text.resolve(language).map(str::to_string);

        Self {
            session_id: session.id,
            time: session.time.to_string(),
            end_time: session.end_time.as_ref().map(ToString::to_string),
            // A session with no title in any language shows its type instead.
            title: session.title.resolve_or(language, event_label).to_string(),
            description: optional(&session.description),
            speaker: optional(&session.speaker),
            location: optional(&session.location),
            event_type: session.event_type,
            event_label,
            style: event_style(session.event_type),
            side: side_for(position),
        }
    }

    pub fn time_range(&self) -> String {
        match &self.end_time {
            Some(end) => format!("{} - {}", self.time, end),
            None => self.time.clone(),
        }
    }
}

// ==================== Program View ====================

/// Which parts of the page chrome are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub show_day_tabs: bool,
    pub show_actions: bool,
    pub show_heading: bool,
    pub emphasis: bool,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            show_day_tabs: true,
            show_actions: true,
            show_heading: true,
            emphasis: false,
        }
    }
}

impl Presentation {
    /// Chrome hidden, emphasis on.
    pub fn print() -> Self {
        Self {
            show_day_tabs: false,
            show_actions: false,
            show_heading: false,
            emphasis: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTab {
    pub index: usize,
    pub label: String,
    pub date: String,
    pub anchor: String,
    pub active: bool,
}

/// The programme as the page shows it: one active day rendered as cards.
pub struct ProgramView {
    schedule: Vec<DaySchedule>,
    language: Language,
    active_day: usize,
    presentation: Presentation,
    cards: Vec<TimelineCard>,
    rendered: watch::Sender<Option<usize>>,
}

impl ProgramView {
    pub fn new(schedule: Vec<DaySchedule>, language: Language) -> Self {
        let (rendered, _) = watch::channel(None);
        let mut view = Self {
            schedule,
            language,
            active_day: 0,
            presentation: Presentation::default(),
            cards: Vec::new(),
            rendered,
        };
        view.render();
        view
    }

    pub fn from_records(records: &[SessionRecord], language: Language) -> Self {
        Self::new(build_schedule(records), language)
    }

    /// Stable per-day anchor id.
    pub fn anchor_id(index: usize) -> String {
        format!("programme-day-{}", index)
    }

    pub fn schedule(&self) -> &[DaySchedule] {
        &self.schedule
    }

    pub fn is_empty(&self) -> bool {
        self.schedule.is_empty()
    }

    pub fn day_count(&self) -> usize {
        self.schedule.len()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        self.render();
    }

    pub fn active_day(&self) -> usize {
        self.active_day
    }

    pub fn active_schedule(&self) -> Option<&DaySchedule> {
        self.schedule.get(self.active_day)
    }

    pub fn select_day(&mut self, index: usize) -> Result<(), ScheduleError> {
        day_at(&self.schedule, index)?;
        self.active_day = index;
        self.render();
        Ok(())
    }

    /// Like `select_day`, falling back to the first day for a bad index.
    pub fn select_day_or_first(&mut self, index: usize) {
        if self.select_day(index).is_err() {
            debug!("Day {} out of range, showing first day", index);
            self.active_day = 0;
            self.render();
        }
    }

    pub fn cards(&self) -> &[TimelineCard] {
        &self.cards
    }

    pub fn presentation(&self) -> Presentation {
        self.presentation
    }

    pub fn set_presentation(&mut self, presentation: Presentation) {
        self.presentation = presentation;
    }

    /// Receives the index of each day whose cards were just rebuilt.
    pub fn rendered(&self) -> watch::Receiver<Option<usize>> {
        self.rendered.subscribe()
    }

    pub fn tabs(&self) -> Vec<DayTab> {
        let strings = self.language.strings();
        self.schedule
            .iter()
            .map(|day| DayTab {
                index: day.index,
                label: strings.day_tab(day.index),
                date: strings.format_date(day.day),
                anchor: Self::anchor_id(day.index),
                active: day.index == self.active_day,
            })
            .collect()
    }

    /// e.g. "Jour 1 · vendredi 24 octobre 2025"
    pub fn day_title(&self, index: usize) -> Option<String> {
        let strings = self.language.strings();
        self.schedule
            .get(index)
            .map(|day| format!("{} · {}", strings.day_tab(index), strings.format_date(day.day)))
    }

    fn render(&mut self) {
        self.cards = match self.schedule.get(self.active_day) {
            Some(day) => day
                .sessions
                .iter()
                .enumerate()
                .map(|(position, session)| TimelineCard::resolve(session, position, self.language))
                .collect(),
            None => Vec::new(),
        };

        let rendered = self.schedule.get(self.active_day).map(|_| self.active_day);
        self.rendered.send_replace(rendered);
    }
}
