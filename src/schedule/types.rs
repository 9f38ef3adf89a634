use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A ranked interview candidate from the roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub rank: u32,
}

/// A single (room, time) cell that may hold one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub time: String,
    pub candidate_id: Option<String>,
}

/// One room's ordered slots for a day, one per assignable time label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSchedule {
    pub room_name: String,
    pub slots: Vec<TimeSlot>,
}

/// Schedule for a single day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day_name: String,
    pub date: NaiveDate,
    pub all_times: Vec<String>,   // includes break labels, in display order
    pub break_times: Vec<String>, // not assignable
    pub rooms: Vec<RoomSchedule>,
}

impl DaySchedule {
    /// IDs of every candidate assigned to this day, in room-slot order
    pub fn scheduled_candidate_ids(&self) -> Vec<&str> {
        self.rooms
            .iter()
            .flat_map(|room| &room.slots)
            .filter_map(|slot| slot.candidate_id.as_deref())
            .collect()
    }
}

/// Room and time-label configuration for one interview day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayConfig {
    pub day_name: String,
    pub room_names: Vec<String>,
    pub all_times: Vec<String>,
    pub break_times: Vec<String>,
}

impl DayConfig {
    /// Assignable time labels: all labels minus the break labels, order kept
    pub fn interview_times(&self) -> Vec<String> {
        self.all_times
            .iter()
            .filter(|t| !self.break_times.contains(t))
            .cloned()
            .collect()
    }
}

/// Full interview program configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub year: i32,
    pub days: Vec<DayConfig>,
}

impl ScheduleConfig {
    /// The standard two-day program: four rooms, 20-minute labels, lunch breaks
    pub fn standard() -> Self {
        let rooms = vec![
            "Room 1".to_string(),
            "Room 2".to_string(),
            "Room 3".to_string(),
            "Room 4".to_string(),
        ];
        ScheduleConfig {
            year: 2024,
            days: vec![
                DayConfig {
                    day_name: "Day 1 (29/Sep)".to_string(),
                    room_names: rooms.clone(),
                    all_times: [
                        "9:00", "9:20", "9:40", "10:00", "10:20", "11:00", "11:20", "11:40",
                        "12:00", "12:20", "12:40", "13:00", "13:20", "13:40", "14:00", "14:20",
                        "14:40", "15:00", "15:20", "15:40", "16:00", "16:20", "17:00",
                    ]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                    break_times: vec!["13:00".to_string()],
                },
                DayConfig {
                    day_name: "Day 2 (30/Sep)".to_string(),
                    room_names: rooms,
                    all_times: [
                        "8:00", "8:20", "8:40", "9:00", "9:20", "9:40", "10:00", "10:20",
                        "10:40", "11:00", "11:20", "11:40", "12:00", "12:20", "12:40", "13:00",
                        "13:20", "13:40", "14:00", "14:20", "14:40", "15:00", "15:20", "15:40",
                        "16:00", "16:20", "16:40", "17:00",
                    ]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                    break_times: vec!["9:20".to_string(), "13:00".to_string()],
                },
            ],
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Configuration problems detected while building the slot grid
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("day label '{0}' has no (DD/Mon) date part")]
    MalformedDayLabel(String),
    #[error("unknown month token '{0}'")]
    UnknownMonth(String),
    #[error("invalid calendar date {day}/{month}/{year}")]
    InvalidDate { day: u32, month: u32, year: i32 },
    #[error("malformed time label '{0}'")]
    MalformedTimeLabel(String),
    #[error("no rooms configured")]
    NoRooms,
    #[error("no assignable time labels configured")]
    NoInterviewTimes,
}

/// Non-fatal conditions surfaced by a build pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleWarning {
    /// A day was dropped from the grid because of a configuration error
    SkippedDay { day_name: String, cause: ConfigError },
    /// More candidates than slots; the listed IDs stayed unassigned
    Overflow { unassigned: Vec<String> },
}

impl std::fmt::Display for ScheduleWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleWarning::SkippedDay { day_name, cause } => {
                write!(f, "skipped day '{}': {}", day_name, cause)
            }
            ScheduleWarning::Overflow { unassigned } => {
                write!(
                    f,
                    "{} candidate(s) did not fit the schedule: {}",
                    unassigned.len(),
                    unassigned.join(", ")
                )
            }
        }
    }
}

/// Result of a build pass: the grid plus any warnings
#[derive(Debug, Clone, Default)]
pub struct ScheduleOutcome {
    pub days: Vec<DaySchedule>,
    pub warnings: Vec<ScheduleWarning>,
}
