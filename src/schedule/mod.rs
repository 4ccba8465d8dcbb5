pub mod model;
pub mod timeline;

pub use model::{
    build_schedule, day_at, parse_day, DaySchedule, EventType, ScheduleError, Session, SessionTime,
};
pub use timeline::{
    event_style, side_for, DayTab, EventStyle, Presentation, ProgramView, Side, TimelineCard,
};
