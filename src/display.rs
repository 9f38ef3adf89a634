use std::collections::HashMap;
use std::fs::File;
use std::io::Write;

use crate::schedule::{Candidate, DaySchedule, ScheduleWarning};
use crate::status::{InterviewStatus, StatusStore};

/// Formats a candidate as "Last, First (id)"
pub fn format_candidate_name(candidate: &Candidate) -> String {
    format!(
        "{}, {} ({})",
        candidate.last_name, candidate.first_name, candidate.id
    )
}

fn status_marker(status: InterviewStatus) -> &'static str {
    match status {
        InterviewStatus::Completed => "[done]",
        InterviewStatus::NoShow => "[no-show]",
        InterviewStatus::Pending => "",
    }
}

/// Prints a day schedule in a readable format, with per-day progress
pub fn print_day_schedule(day: &DaySchedule, roster: &[Candidate], statuses: &StatusStore) {
    let roster_map: HashMap<&str, &Candidate> =
        roster.iter().map(|c| (c.id.as_str(), c)).collect();

    println!("\n=== {} ===", day.day_name);

    let scheduled_ids = day.scheduled_candidate_ids();
    let counts = statuses.count_for(scheduled_ids.iter().copied());
    println!(
        "Scheduled: {} (completed: {}, no-shows: {}, pending: {})",
        scheduled_ids.len(),
        counts.completed,
        counts.no_shows,
        counts.pending
    );

    for time in &day.all_times {
        if day.break_times.contains(time) {
            println!("  {:>5}  -- break --", time);
            continue;
        }
        print!("  {:>5} ", time);
        for room in &day.rooms {
            let cell = room
                .slots
                .iter()
                .find(|slot| &slot.time == time)
                .and_then(|slot| slot.candidate_id.as_deref())
                .and_then(|id| roster_map.get(id))
                .map(|candidate| {
                    let marker = status_marker(statuses.get_status(&candidate.id));
                    if marker.is_empty() {
                        format_candidate_name(candidate)
                    } else {
                        format!("{} {}", format_candidate_name(candidate), marker)
                    }
                })
                .unwrap_or_else(|| "[AVAILABLE]".to_string());
            print!("| {:<40} ", cell);
        }
        println!();
    }
}

/// Prints build warnings, if any
pub fn print_warnings(warnings: &[ScheduleWarning]) {
    if warnings.is_empty() {
        return;
    }
    println!("\n⚠️  Schedule warnings ({}):", warnings.len());
    for warning in warnings {
        println!("  - {}", warning);
    }
}

/// Writes a day schedule to a text file, one line per (time, room) cell
pub fn write_schedule_to_file(
    day: &DaySchedule,
    roster: &[Candidate],
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let roster_map: HashMap<&str, &Candidate> =
        roster.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut file = File::create(filename)?;
    writeln!(file, "** {} **", day.day_name)?;

    for time in &day.all_times {
        if day.break_times.contains(time) {
            writeln!(file, "{} [BREAK]", time)?;
            continue;
        }
        for room in &day.rooms {
            let name = room
                .slots
                .iter()
                .find(|slot| &slot.time == time)
                .and_then(|slot| slot.candidate_id.as_deref())
                .and_then(|id| roster_map.get(id))
                .map(|candidate| format_candidate_name(candidate))
                .unwrap_or_else(|| "[AVAILABLE]".to_string());
            writeln!(file, "{} {} {}", time, room.room_name, name)?;
        }
    }

    Ok(())
}
