use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone};

use super::types::ConfigError;

/// Interviews run in one fixed timezone regardless of the viewer's clock
pub const PROGRAM_UTC_OFFSET_HOURS: i32 = 3;

/// The fixed program offset (+03:00)
pub fn program_offset() -> FixedOffset {
    FixedOffset::east_opt(PROGRAM_UTC_OFFSET_HOURS * 3600).expect("offset within +/-24h")
}

/// Current instant expressed in the program timezone
pub fn now_in_program_tz() -> DateTime<FixedOffset> {
    chrono::Utc::now().with_timezone(&program_offset())
}

/// Parses a time label (H:MM or HH:MM) to minutes since midnight
pub fn parse_time_to_minutes(time_str: &str) -> Option<u32> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hours: u32 = parts[0].parse().ok()?;
    let minutes: u32 = parts[1].parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Formats minutes since midnight as HH:MM
pub fn minutes_to_time_string(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    format!("{:02}:{:02}", hours % 24, mins)
}

fn month_number(token: &str) -> Option<u32> {
    let month = match token {
        "Jan" => 1,
        "Feb" => 2,
        "Mar" => 3,
        "Apr" => 4,
        "May" => 5,
        "Jun" => 6,
        "Jul" => 7,
        "Aug" => 8,
        "Sep" => 9,
        "Oct" => 10,
        "Nov" => 11,
        "Dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Extracts the calendar date from a day label of the form "Day 1 (29/Sep)"
pub fn parse_day_date(day_name: &str, year: i32) -> Result<NaiveDate, ConfigError> {
    let malformed = || ConfigError::MalformedDayLabel(day_name.to_string());

    let open = day_name.find('(').ok_or_else(malformed)?;
    let close = day_name[open..].find(')').ok_or_else(malformed)? + open;
    let inner = &day_name[open + 1..close];

    let (day_str, month_str) = inner.split_once('/').ok_or_else(malformed)?;
    let day: u32 = day_str.trim().parse().map_err(|_| malformed())?;
    let month_token = month_str.trim();
    let month =
        month_number(month_token).ok_or_else(|| ConfigError::UnknownMonth(month_token.to_string()))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(ConfigError::InvalidDate { day, month, year })
}

/// Resolves a day's date plus a time label into an absolute instant at the
/// fixed program offset
pub fn slot_timestamp(date: NaiveDate, time_label: &str) -> Result<DateTime<FixedOffset>, ConfigError> {
    let minutes = parse_time_to_minutes(time_label)
        .ok_or_else(|| ConfigError::MalformedTimeLabel(time_label.to_string()))?;

    program_offset()
        .with_ymd_and_hms(
            date.year(),
            date.month(),
            date.day(),
            minutes / 60,
            minutes % 60,
            0,
        )
        .single()
        .ok_or_else(|| ConfigError::MalformedTimeLabel(time_label.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_to_minutes() {
        assert_eq!(parse_time_to_minutes("9:00"), Some(540));
        assert_eq!(parse_time_to_minutes("09:20"), Some(560));
        assert_eq!(parse_time_to_minutes("17:00"), Some(1020));
        assert_eq!(parse_time_to_minutes("24:00"), None);
        assert_eq!(parse_time_to_minutes("9:60"), None);
        assert_eq!(parse_time_to_minutes("morning"), None);
    }

    #[test]
    fn test_minutes_to_time_string() {
        assert_eq!(minutes_to_time_string(540), "09:00");
        assert_eq!(minutes_to_time_string(1020), "17:00");
        assert_eq!(minutes_to_time_string(0), "00:00");
    }

    #[test]
    fn test_parse_day_date() {
        let date = parse_day_date("Day 1 (29/Sep)", 2024).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 9, 29).unwrap());

        let date = parse_day_date("Day 2 (30/Sep)", 2024).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 9, 30).unwrap());
    }

    #[test]
    fn test_parse_day_date_errors() {
        assert!(matches!(
            parse_day_date("Day 1", 2024),
            Err(ConfigError::MalformedDayLabel(_))
        ));
        assert!(matches!(
            parse_day_date("Day 1 (29/Wut)", 2024),
            Err(ConfigError::UnknownMonth(_))
        ));
        assert!(matches!(
            parse_day_date("Day 1 (31/Sep)", 2024),
            Err(ConfigError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_slot_timestamp_at_fixed_offset() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 29).unwrap();
        let ts = slot_timestamp(date, "9:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-09-29T09:00:00+03:00");
    }

    #[test]
    fn test_slot_timestamp_rejects_bad_label() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 29).unwrap();
        assert!(matches!(
            slot_timestamp(date, "whenever"),
            Err(ConfigError::MalformedTimeLabel(_))
        ));
    }
}
