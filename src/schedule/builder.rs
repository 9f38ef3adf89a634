use log::warn;

use super::slot_utils::parse_day_date;
use super::types::{
    Candidate, ConfigError, DayConfig, DaySchedule, RoomSchedule, ScheduleConfig, ScheduleOutcome,
    ScheduleWarning, TimeSlot,
};

/// Builds the full multi-day slot grid from a ranked roster.
///
/// Assignment is round-robin, time-major: fill one time label across all
/// rooms before advancing to the next label. This spreads top-ranked
/// candidates across rooms instead of clustering them in one room's early
/// slots. A single roster cursor runs through every day in order, so a
/// candidate left over from one day lands on the next.
pub fn build_schedule(candidates: &[Candidate], config: &ScheduleConfig) -> ScheduleOutcome {
    // Roster input is rank-ordered by contract; sort anyway so a shuffled
    // upload cannot scramble the grid
    let mut ranked: Vec<&Candidate> = candidates.iter().collect();
    ranked.sort_by_key(|c| c.rank);
    let mut roster_cursor = ranked.into_iter();

    let mut days = Vec::new();
    let mut warnings = Vec::new();

    for day_config in &config.days {
        match build_day(day_config, config.year, &mut roster_cursor) {
            Ok(day) => days.push(day),
            Err(cause) => {
                let warning = ScheduleWarning::SkippedDay {
                    day_name: day_config.day_name.clone(),
                    cause,
                };
                warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }

    // Whatever the cursor still holds did not fit anywhere
    let unassigned: Vec<String> = roster_cursor.map(|c| c.id.clone()).collect();
    if !unassigned.is_empty() {
        let warning = ScheduleWarning::Overflow { unassigned };
        warn!("{}", warning);
        warnings.push(warning);
    }

    ScheduleOutcome { days, warnings }
}

fn build_day<'a>(
    day_config: &DayConfig,
    year: i32,
    roster_cursor: &mut impl Iterator<Item = &'a Candidate>,
) -> Result<DaySchedule, ConfigError> {
    let date = parse_day_date(&day_config.day_name, year)?;

    if day_config.room_names.is_empty() {
        return Err(ConfigError::NoRooms);
    }
    let interview_times = day_config.interview_times();
    if interview_times.is_empty() {
        return Err(ConfigError::NoInterviewTimes);
    }

    // Start every room with an empty slot per assignable label
    let mut rooms: Vec<RoomSchedule> = day_config
        .room_names
        .iter()
        .map(|name| RoomSchedule {
            room_name: name.clone(),
            slots: interview_times
                .iter()
                .map(|time| TimeSlot {
                    time: time.clone(),
                    candidate_id: None,
                })
                .collect(),
        })
        .collect();

    // Time-major fill: one label across all rooms, then the next label
    'fill: for (slot_index, _) in interview_times.iter().enumerate() {
        for room in rooms.iter_mut() {
            match roster_cursor.next() {
                Some(candidate) => room.slots[slot_index].candidate_id = Some(candidate.id.clone()),
                None => break 'fill,
            }
        }
    }

    Ok(DaySchedule {
        day_name: day_config.day_name.clone(),
        date,
        all_times: day_config.all_times.clone(),
        break_times: day_config.break_times.clone(),
        rooms,
    })
}
