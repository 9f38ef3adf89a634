mod display;
mod notify;
mod parser;
mod schedule;
mod status;
mod web;

use parser::{load_roster, load_schedule_config};
use schedule::{build_schedule, ScheduleConfig};
use status::{StatusStore, STATUS_STORE_FILE};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    // Schedule configuration: a JSON file next to the binary overrides the
    // built-in two-day program
    let config = if std::path::Path::new("schedule_config.json").exists() {
        load_schedule_config("schedule_config.json")?
    } else {
        ScheduleConfig::standard()
    };

    let roster_path = args
        .iter()
        .position(|a| a == "--roster")
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
        .unwrap_or("roster.csv");
    let roster = if std::path::Path::new(roster_path).exists() {
        load_roster(roster_path)?
    } else {
        println!("No roster file at {}; starting empty", roster_path);
        Vec::new()
    };
    println!("Loaded {} roster candidates", roster.len());

    let outcome = build_schedule(&roster, &config);

    // Check if we should run in web mode
    if args.len() > 1 && args[1] == "web" {
        let port = args
            .get(2)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);
        let password =
            std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

        println!("Starting web server on port {}...", port);
        println!("Access the API at http://localhost:{}", port);

        web::start_server(port, password, roster, config, outcome).await?;
        return Ok(());
    }

    // CLI mode: print every day with statuses, then export text files
    let statuses = StatusStore::load(STATUS_STORE_FILE)?;
    for day in &outcome.days {
        display::print_day_schedule(day, &roster, &statuses);
    }
    display::print_warnings(&outcome.warnings);

    println!("\n=== Writing Schedules to Files ===");
    for (index, day) in outcome.days.iter().enumerate() {
        let filename = format!("schedule_day{}.txt", index + 1);
        display::write_schedule_to_file(day, &roster, &filename)?;
        println!("  - {}", filename);
    }

    Ok(())
}
