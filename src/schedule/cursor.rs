use chrono::{DateTime, FixedOffset, Timelike};

use super::slot_utils::parse_time_to_minutes;

/// Implicit duration of the interval after a day's last time label
pub const LAST_BRACKET_MINUTES: u32 = 20;

/// Fractional position of "now" inside a day's time axis
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct CursorPosition {
    /// Index into the day's label list of the bracket's lower bound
    pub bracket_index: usize,
    /// Offset within the bracket, in [0, 1)
    pub progress: f64,
}

/// Minutes since midnight for an instant, as the cursor sees it.
///
/// Callers previewing a day other than today pass a live reading here
/// unchanged; only the hour and minute matter, the calendar date half of the
/// "simulated now" comes from the displayed day.
pub fn now_minutes(now: DateTime<FixedOffset>) -> u32 {
    now.hour() * 60 + now.minute()
}

/// Locates the bracketing pair of adjacent labels holding `now_minutes` and
/// the fractional progress through it.
///
/// Returns `None` when there are fewer than two parsable labels, when now
/// precedes the first label, or when now is at or past the end of the last
/// bracket.
pub fn cursor_position(all_times: &[String], now_minutes: u32) -> Option<CursorPosition> {
    // Pair each parsable label with its position in the display list
    let labels: Vec<(usize, u32)> = all_times
        .iter()
        .enumerate()
        .filter_map(|(index, label)| parse_time_to_minutes(label).map(|m| (index, m)))
        .collect();
    if labels.len() < 2 {
        return None;
    }

    for (i, &(index, minutes)) in labels.iter().enumerate() {
        let next_minutes = labels
            .get(i + 1)
            .map(|&(_, m)| m)
            .unwrap_or(minutes + LAST_BRACKET_MINUTES);

        if now_minutes >= minutes && now_minutes < next_minutes {
            let duration = next_minutes - minutes;
            let progress = if duration > 0 {
                f64::from(now_minutes - minutes) / f64::from(duration)
            } else {
                0.0
            };
            return Some(CursorPosition {
                bracket_index: index,
                progress: progress.clamp(0.0, 1.0 - f64::EPSILON),
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(times: &[&str]) -> Vec<String> {
        times.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cursor_midpoint_of_bracket() {
        let times = labels(&["9:00", "9:20", "9:40"]);
        let pos = cursor_position(&times, 550).unwrap(); // 09:10
        assert_eq!(pos.bracket_index, 0);
        assert!((pos.progress - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_cursor_outside_the_axis() {
        let times = labels(&["9:00", "9:20", "9:40"]);
        assert_eq!(cursor_position(&times, 539), None); // 08:59
        assert_eq!(cursor_position(&times, 581), None); // 09:41
    }

    #[test]
    fn test_cursor_last_bracket_uses_fallback_duration() {
        let times = labels(&["9:00", "9:20"]);
        // 09:30 sits halfway through the implicit 20-minute tail bracket
        let pos = cursor_position(&times, 570).unwrap();
        assert_eq!(pos.bracket_index, 1);
        assert!((pos.progress - 0.5).abs() < 1e-9);
        // The tail bracket is half-open: 09:40 is already outside
        assert_eq!(cursor_position(&times, 580), None);
    }

    #[test]
    fn test_cursor_needs_two_labels() {
        assert_eq!(cursor_position(&labels(&["9:00"]), 540), None);
        assert_eq!(cursor_position(&labels(&[]), 540), None);
    }

    #[test]
    fn test_cursor_skips_unparsable_labels() {
        let times = labels(&["9:00", "Lunch", "9:40"]);
        let pos = cursor_position(&times, 560).unwrap(); // 09:20
        assert_eq!(pos.bracket_index, 0);
        assert!((pos.progress - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_cursor_progress_is_below_one() {
        let times = labels(&["9:00", "9:20"]);
        let pos = cursor_position(&times, 559).unwrap(); // 09:19
        assert!(pos.progress < 1.0);
    }
}
