use std::collections::HashMap;
use std::path::Path;

use csv::Reader;
use log::warn;

use crate::schedule::{Candidate, ScheduleConfig};

/// Loads the ranked candidate roster from a CSV file.
///
/// Columns are located by header content rather than fixed position, so the
/// export tool can reorder them. Rows missing an id, a name, or a parsable
/// rank are skipped. Duplicate ids keep the last submission. The result is
/// sorted by rank ascending.
pub fn load_roster<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Candidate>, Box<dyn std::error::Error>> {
    let mut reader = Reader::from_path(csv_path)?;

    let headers = reader.headers()?;
    let id_col = headers
        .iter()
        .position(|h| h.to_lowercase().contains("id"))
        .unwrap_or(0);
    let first_name_col = headers
        .iter()
        .position(|h| h.to_lowercase().contains("first"))
        .unwrap_or(1);
    let last_name_col = headers
        .iter()
        .position(|h| h.to_lowercase().contains("last"))
        .unwrap_or(2);
    let rank_col = headers
        .iter()
        .position(|h| h.to_lowercase().contains("rank"))
        .unwrap_or(3);

    // Track entries by id so a re-submitted row replaces the earlier one
    let mut entries_map: HashMap<String, Candidate> = HashMap::new();

    for result in reader.records() {
        let record = result?;

        let id = record.get(id_col).unwrap_or("").trim().to_string();
        let first_name = record.get(first_name_col).unwrap_or("").trim().to_string();
        let last_name = record.get(last_name_col).unwrap_or("").trim().to_string();
        let rank_raw = record.get(rank_col).unwrap_or("").trim();

        if id.is_empty() || first_name.is_empty() {
            continue;
        }
        let rank: u32 = match rank_raw.parse() {
            Ok(rank) if rank >= 1 => rank,
            _ => {
                warn!("roster row for '{}' has unusable rank '{}'; skipped", id, rank_raw);
                continue;
            }
        };

        entries_map.insert(
            id.clone(),
            Candidate {
                id,
                first_name,
                last_name,
                rank,
            },
        );
    }

    let mut candidates: Vec<Candidate> = entries_map.into_values().collect();
    candidates.sort_by_key(|c| c.rank);
    Ok(candidates)
}

/// Loads a schedule configuration from a JSON file
pub fn load_schedule_config<P: AsRef<Path>>(
    path: P,
) -> Result<ScheduleConfig, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    let config = serde_json::from_str(&raw)?;
    Ok(config)
}
