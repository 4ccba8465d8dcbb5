//! Day/session schedule model.
//!
//! Flat session records are grouped by calendar day, days are ordered by
//! date and sessions by time of day. Ordering never depends on locale.

use crate::backend::SessionRecord;
use crate::i18n::Localized;
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("day index {index} is out of range (schedule has {len} day(s))")]
    DayOutOfRange { index: usize, len: usize },
}

// ==================== Event Types ====================

/// Kind of programme item. Unknown values map to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Keynote,
    Session,
    Workshop,
    Panel,
    Break,
    Meal,
    Networking,
    Ceremony,
    Welcome,
    Demo,
    Closing,
    Other,
}

impl EventType {
    /// Every variant, in label-table order.
    pub const ALL: [EventType; 12] = [
        EventType::Keynote,
        EventType::Session,
        EventType::Workshop,
        EventType::Panel,
        EventType::Break,
        EventType::Meal,
        EventType::Networking,
        EventType::Ceremony,
        EventType::Welcome,
        EventType::Demo,
        EventType::Closing,
        EventType::Other,
    ];

    /// Case-insensitive; accepts the English wire names and the French
    /// names used by the admin forms.
    pub fn parse(raw: &str) -> EventType {
        Self::parse_known(raw).unwrap_or(EventType::Other)
    }

    /// Like `parse` but `None` for unrecognized input.
    pub fn parse_known(raw: &str) -> Option<EventType> {
        let key = fold(raw);
        let event_type = match key.as_str() {
            "keynote" | "conference" | "pleniere" => EventType::Keynote,
            "session" => EventType::Session,
            "workshop" | "atelier" => EventType::Workshop,
            "panel" | "table-ronde" => EventType::Panel,
            "break" | "pause" | "pause-cafe" | "coffee-break" => EventType::Break,
            "meal" | "repas" | "lunch" | "dejeuner" => EventType::Meal,
            "networking" | "reseautage" => EventType::Networking,
            "ceremony" | "ceremonie" => EventType::Ceremony,
            "welcome" | "accueil" => EventType::Welcome,
            "demo" | "demonstration" => EventType::Demo,
            "closing" | "cloture" => EventType::Closing,
            "other" | "autre" => EventType::Other,
            _ => return None,
        };
        Some(event_type)
    }

    /// Wire name sent back to the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Keynote => "keynote",
            EventType::Session => "session",
            EventType::Workshop => "workshop",
            EventType::Panel => "panel",
            EventType::Break => "break",
            EventType::Meal => "meal",
            EventType::Networking => "networking",
            EventType::Ceremony => "ceremony",
            EventType::Welcome => "welcome",
            EventType::Demo => "demo",
            EventType::Closing => "closing",
            EventType::Other => "other",
        }
    }

    pub fn ordinal(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(Self::ALL.len() - 1)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase, strip French accents, and normalize separators to `-`.
fn fold(raw: &str) -> String {
    raw.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'à' | 'â' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' => 'o',
            'ù' | 'û' => 'u',
            'ç' => 'c',
            ' ' | '_' => '-',
            other => other,
        })
        .collect()
}

// ==================== Session Time ====================

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").expect("time pattern is valid")
    })
}

/// Time of day as entered; malformed values keep their text and sort last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTime {
    raw: String,
    parsed: Option<NaiveTime>,
}

impl SessionTime {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let parsed = time_pattern().captures(raw).and_then(|caps| {
            let hour = caps[1].parse().ok()?;
            let minute = caps[2].parse().ok()?;
            let second = caps.get(3).map_or(Some(0), |s| s.as_str().parse().ok())?;
            NaiveTime::from_hms_opt(hour, minute, second)
        });

        Self {
            raw: raw.to_string(),
            parsed,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.parsed.is_some()
    }

    pub fn time(&self) -> Option<NaiveTime> {
        self.parsed
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Valid times first, in chronological order.
    pub fn sort_key(&self) -> (bool, Option<NaiveTime>) {
        (self.parsed.is_none(), self.parsed)
    }
}

impl fmt::Display for SessionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parsed {
            Some(time) => write!(f, "{}", time.format("%H:%M")),
            None => f.write_str(&self.raw),
        }
    }
}

// ==================== Sessions and Days ====================

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: u64,
    pub time: SessionTime,
    pub end_time: Option<SessionTime>,
    pub title: Localized,
    pub description: Localized,
    pub speaker: Localized,
    pub location: Localized,
    pub event_type: EventType,
}

impl Session {
    pub fn from_record(record: &SessionRecord) -> Self {
        Self {
            id: record.id,
            time: SessionTime::parse(record.time.as_deref().unwrap_or("")),
            end_time: record
                .end_time
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .map(SessionTime::parse),
            title: record.title(),
            description: record.description(),
            speaker: record.speaker(),
            location: record.location(),
            event_type: EventType::parse(record.event_type.as_deref().unwrap_or("")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaySchedule {
    /// Zero-based position after date ordering
    pub index: usize,
    pub day: NaiveDate,
    pub sessions: Vec<Session>,
}

/// Parse the date part of a wire `day`, which may carry a time suffix.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let (date_part, rest) = match raw.get(..10) {
        Some(date_part) => (date_part, &raw[10..]),
        None => (raw, ""),
    };
    if !(rest.is_empty() || rest.starts_with('T') || rest.starts_with(' ')) {
        return None;
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Group sessions by day, order days by date and sessions by time.
///
/// Records whose day cannot be parsed are dropped and logged.
pub fn build_schedule(records: &[SessionRecord]) -> Vec<DaySchedule> {
    let mut days: BTreeMap<NaiveDate, Vec<Session>> = BTreeMap::new();

    for record in records {
        let raw_day = record.day.as_deref().unwrap_or("");
        let Some(day) = parse_day(raw_day) else {
            warn!("Dropping session {}: unparseable day {:?}", record.id, raw_day);
            continue;
        };
        days.entry(day).or_default().push(Session::from_record(record));
    }

    days.into_iter()
        .enumerate()
        .map(|(index, (day, mut sessions))| {
            // Stable: equal times keep their input order.
            sessions.sort_by_key(|s| s.time.sort_key());
            DaySchedule { index, day, sessions }
        })
        .collect()
}

/// Look up a day by index.
pub fn day_at(schedule: &[DaySchedule], index: usize) -> Result<&DaySchedule, ScheduleError> {
    schedule.get(index).ok_or(ScheduleError::DayOutOfRange {
        index,
        len: schedule.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;
    use proptest::prelude::*;

    fn record(id: u64, day: &str, time: &str) -> SessionRecord {
        SessionRecord {
            id,
            day: Some(day.to_string()),
            time: Some(time.to_string()),
            title_fr: Some(format!("Session {}", id)),
            ..Default::default()
        }
    }

    fn times(day: &DaySchedule) -> Vec<String> {
        day.sessions.iter().map(|s| s.time.to_string()).collect()
    }

    // ==================== build_schedule Tests ====================

    #[test]
    fn test_build_schedule_orders_days_and_times() {
        let records = vec![
            record(1, "2025-10-25", "14:00"),
            record(2, "2025-10-25", "09:30"),
            record(3, "2025-10-24", "11:00"),
        ];

        let schedule = build_schedule(&records);

        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule[0].index, 0);
        assert_eq!(schedule[0].day, NaiveDate::from_ymd_opt(2025, 10, 24).unwrap());
        assert_eq!(times(&schedule[0]), vec!["11:00"]);
        assert_eq!(schedule[1].index, 1);
        assert_eq!(times(&schedule[1]), vec!["09:30", "14:00"]);
    }

    #[test]
    fn test_build_schedule_empty() {
        assert!(build_schedule(&[]).is_empty());
    }

    #[test]
    fn test_malformed_time_sorts_last_without_panicking() {
        let records = vec![
            record(1, "2025-10-24", "bientôt"),
            record(2, "2025-10-24", "16:00"),
            record(3, "2025-10-24", ""),
            record(4, "2025-10-24", "8:15"),
        ];

        let schedule = build_schedule(&records);
        let ids: Vec<u64> = schedule[0].sessions.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![4, 2, 1, 3]);
        assert_eq!(schedule[0].sessions[2].time.to_string(), "bientôt");
    }

    #[test]
    fn test_equal_times_keep_input_order() {
        let records = vec![
            record(9, "2025-10-24", "10:00"),
            record(3, "2025-10-24", "10:00:00"),
            record(5, "2025-10-24", "10:00"),
        ];

        let ids: Vec<u64> = build_schedule(&records)[0].sessions.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![9, 3, 5]);
    }

    #[test]
    fn test_unparseable_day_is_dropped() {
        let records = vec![
            record(1, "not a date", "09:00"),
            record(2, "2025-10-24", "09:00"),
            SessionRecord {
                id: 3,
                ..Default::default()
            },
        ];

        let schedule = build_schedule(&records);
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].sessions.len(), 1);
        assert_eq!(schedule[0].sessions[0].id, 2);
    }

    #[test]
    fn test_day_with_timestamp_suffix() {
        let schedule = build_schedule(&[record(1, "2025-10-24T00:00:00.000000Z", "09:00")]);
        assert_eq!(schedule[0].day, NaiveDate::from_ymd_opt(2025, 10, 24).unwrap());
    }

    #[test]
    fn test_day_with_trailing_garbage_is_dropped() {
        assert_eq!(parse_day("2025-10-24garbage"), None);
        assert_eq!(
            parse_day("2025-10-24 09:00:00"),
            NaiveDate::from_ymd_opt(2025, 10, 24)
        );

        let schedule = build_schedule(&[
            record(1, "2025-10-24garbage", "09:00"),
            record(2, "2025-10-25", "09:00"),
        ]);
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].day, NaiveDate::from_ymd_opt(2025, 10, 25).unwrap());
    }

    #[test]
    fn test_day_at_out_of_range() {
        let schedule = build_schedule(&[record(1, "2025-10-24", "09:00")]);
        assert!(day_at(&schedule, 0).is_ok());
        assert_eq!(
            day_at(&schedule, 3).unwrap_err(),
            ScheduleError::DayOutOfRange { index: 3, len: 1 }
        );
    }

    #[test]
    fn test_session_resolves_bilingual_fallback() {
        let mut raw = record(1, "2025-10-24", "09:00");
        raw.title_fr = Some("".to_string());
        raw.title_en = Some("Opening".to_string());

        let session = Session::from_record(&raw);
        assert_eq!(session.title.resolve(Language::FRENCH), Some("Opening"));
    }

    // ==================== SessionTime Tests ====================

    #[test]
    fn test_session_time_formats() {
        assert_eq!(SessionTime::parse("9:05").to_string(), "09:05");
        assert_eq!(SessionTime::parse("09:05:30").to_string(), "09:05");
        assert!(SessionTime::parse("23:59").is_valid());
        assert!(!SessionTime::parse("24:00").is_valid());
        assert!(!SessionTime::parse("9h30").is_valid());
        assert!(!SessionTime::parse("09:5").is_valid());
    }

    // ==================== EventType Tests ====================

    #[test]
    fn test_event_type_parse_english_and_french() {
        assert_eq!(EventType::parse("Keynote"), EventType::Keynote);
        assert_eq!(EventType::parse("pause"), EventType::Break);
        assert_eq!(EventType::parse("Table ronde"), EventType::Panel);
        assert_eq!(EventType::parse("table_ronde"), EventType::Panel);
        assert_eq!(EventType::parse("Cérémonie"), EventType::Ceremony);
        assert_eq!(EventType::parse("clôture"), EventType::Closing);
        assert_eq!(EventType::parse("conference"), EventType::Keynote);
    }

    #[test]
    fn test_event_type_unknown_is_other() {
        assert_eq!(EventType::parse("mystery"), EventType::Other);
        assert_eq!(EventType::parse(""), EventType::Other);
        assert_eq!(EventType::parse_known("mystery"), None);
    }

    #[test]
    fn test_event_type_wire_names_round_trip() {
        for event_type in EventType::ALL {
            assert_eq!(EventType::parse(event_type.as_str()), event_type);
        }
    }

    #[test]
    fn test_event_type_ordinal_matches_labels() {
        let strings = Language::FRENCH.strings();
        assert_eq!(strings.event_label(EventType::Workshop.ordinal()), "Atelier");
        assert_eq!(EventType::Other.ordinal(), 11);
    }

    // ==================== Ordering Properties ====================

    fn time_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            4 => (0u32..24, 0u32..60).prop_map(|(h, m)| format!("{:02}:{:02}", h, m)),
            1 => "[a-z]{0,4}",
        ]
    }

    fn record_strategy() -> impl Strategy<Value = Vec<SessionRecord>> {
        proptest::collection::vec((1u32..=5, time_strategy()), 0..40).prop_map(|items| {
            items
                .into_iter()
                .enumerate()
                .map(|(i, (day, time))| record(i as u64, &format!("2025-10-{:02}", 20 + day), &time))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn schedule_is_ordered_regardless_of_input_order(records in record_strategy()) {
            let schedule = build_schedule(&records);

            prop_assert_eq!(
                schedule.iter().map(|d| d.sessions.len()).sum::<usize>(),
                records.len()
            );

            for (i, pair) in schedule.windows(2).enumerate() {
                prop_assert!(pair[0].day < pair[1].day);
                prop_assert_eq!(pair[0].index, i);
            }

            for day in &schedule {
                for pair in day.sessions.windows(2) {
                    prop_assert!(pair[0].time.sort_key() <= pair[1].time.sort_key());
                    if pair[0].time.sort_key() == pair[1].time.sort_key() {
                        prop_assert!(pair[0].id < pair[1].id);
                    }
                }
            }
        }
    }
}
