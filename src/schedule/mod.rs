pub mod builder;
pub mod cursor;
pub mod slot_utils;
pub mod types;

pub use builder::build_schedule;
pub use cursor::{cursor_position, CursorPosition};
pub use types::{
    Candidate, ConfigError, DayConfig, DaySchedule, RoomSchedule, ScheduleConfig, ScheduleOutcome,
    ScheduleWarning, TimeSlot,
};
