use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use log::warn;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::notify::{ActiveView, AlertPermission, LogAlertSink, NotificationScheduler};
use crate::parser::load_roster;
use crate::schedule::cursor::{cursor_position, now_minutes};
use crate::schedule::slot_utils::{minutes_to_time_string, now_in_program_tz};
use crate::schedule::{build_schedule, Candidate, ScheduleConfig, ScheduleOutcome};
use crate::status::{InterviewStatus, StatusStore, STATUS_STORE_FILE};

/// Shared application state behind the JSON surface
pub struct AppState {
    pub roster: Mutex<Vec<Candidate>>,
    pub schedule: Mutex<ScheduleOutcome>,
    pub config: Mutex<ScheduleConfig>,
    pub statuses: Mutex<StatusStore>,
    pub notifier: NotificationScheduler,
    pub admin_password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Deserialize)]
pub struct StatusChangeRequest {
    candidate_id: String,
    status: InterviewStatus,
}

#[derive(Deserialize)]
pub struct ViewChangeRequest {
    view: ActiveView,
}

#[derive(Deserialize)]
pub struct PermissionChangeRequest {
    permission: AlertPermission,
}

// Admin login endpoint
async fn admin_login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.password == state.admin_password {
        Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
    } else {
        Ok(HttpResponse::Unauthorized()
            .json(serde_json::json!({"success": false, "error": "Invalid password"})))
    }
}

// Admin roster upload: rebuilds the grid and re-arms the notifier
async fn admin_upload(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let password = req
        .headers()
        .get("X-Admin-Password")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if password != state.admin_password {
        return Ok(HttpResponse::Unauthorized()
            .json(serde_json::json!({"success": false, "error": "Unauthorized"})));
    }

    let csv_path = "uploaded_roster.csv";
    std::fs::write(csv_path, &body)
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Failed to save file: {}", e)))?;

    match load_roster(csv_path) {
        Ok(candidates) => {
            let outcome = {
                let config = state.config.lock().unwrap();
                build_schedule(&candidates, &config)
            };
            let warnings: Vec<String> = outcome.warnings.iter().map(|w| w.to_string()).collect();

            state
                .notifier
                .set_schedule(candidates.clone(), outcome.days.clone());
            *state.roster.lock().unwrap() = candidates;
            *state.schedule.lock().unwrap() = outcome;

            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": "Schedule generated successfully",
                "warnings": warnings,
            })))
        }
        Err(e) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": format!("Failed to process CSV: {}", e)
        }))),
    }
}

// Roster endpoint
async fn get_roster(state: web::Data<AppState>) -> Result<HttpResponse> {
    let roster = state.roster.lock().unwrap();
    Ok(HttpResponse::Ok().json(&*roster))
}

// Current build warnings
async fn get_warnings(state: web::Data<AppState>) -> Result<HttpResponse> {
    let schedule = state.schedule.lock().unwrap();
    let warnings: Vec<String> = schedule.warnings.iter().map(|w| w.to_string()).collect();
    Ok(HttpResponse::Ok().json(warnings))
}

// Day schedule endpoint: the grid with per-slot candidate and status
async fn get_schedule(day: web::Path<usize>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let schedule = state.schedule.lock().unwrap();
    let Some(day_schedule) = schedule.days.get(*day) else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "No such day"})));
    };

    let roster = state.roster.lock().unwrap();
    let statuses = state.statuses.lock().unwrap();
    let roster_map: HashMap<&str, &Candidate> =
        roster.iter().map(|c| (c.id.as_str(), c)).collect();

    let rooms: Vec<serde_json::Value> = day_schedule
        .rooms
        .iter()
        .map(|room| {
            let slots: Vec<serde_json::Value> = room
                .slots
                .iter()
                .map(|slot| {
                    // A dangling candidate reference renders as an open slot
                    let candidate = slot
                        .candidate_id
                        .as_deref()
                        .and_then(|id| roster_map.get(id));
                    match candidate {
                        Some(c) => serde_json::json!({
                            "time": slot.time,
                            "candidate": c,
                            "status": statuses.get_status(&c.id),
                            "is_empty": false,
                        }),
                        None => serde_json::json!({
                            "time": slot.time,
                            "candidate": null,
                            "status": InterviewStatus::Pending,
                            "is_empty": true,
                        }),
                    }
                })
                .collect();
            serde_json::json!({"room_name": room.room_name, "slots": slots})
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "day_name": day_schedule.day_name,
        "date": day_schedule.date,
        "all_times": day_schedule.all_times,
        "break_times": day_schedule.break_times,
        "rooms": rooms,
    })))
}

// Per-day completion progress
async fn get_progress(day: web::Path<usize>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let schedule = state.schedule.lock().unwrap();
    let Some(day_schedule) = schedule.days.get(*day) else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "No such day"})));
    };

    let statuses = state.statuses.lock().unwrap();
    let scheduled_ids = day_schedule.scheduled_candidate_ids();
    let total = scheduled_ids.len() as u32;
    let counts = statuses.count_for(scheduled_ids.iter().copied());
    let progress = if total > 0 {
        f64::from(counts.completed) / f64::from(total) * 100.0
    } else {
        0.0
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "total": total,
        "completed": counts.completed,
        "no_shows": counts.no_shows,
        "remaining": counts.pending,
        "progress": progress,
    })))
}

// Status read endpoint
async fn get_status(id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let statuses = state.statuses.lock().unwrap();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "candidate_id": id.as_str(),
        "status": statuses.get_status(id.as_str()),
    })))
}

// Status change endpoint: the one mutation the control surface dispatches
async fn set_status(
    req: web::Json<StatusChangeRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut statuses = state.statuses.lock().unwrap();
    match statuses.set_status(&req.candidate_id, req.status) {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({"success": true}))),
        Err(e) => {
            warn!("status change for {} not persisted: {}", req.candidate_id, e);
            Ok(HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "error": e.to_string()})))
        }
    }
}

// Visible alerts
async fn get_alerts(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.notifier.alerts()))
}

// Dismiss one alert by id
async fn dismiss_alert(id: web::Path<u64>, state: web::Data<AppState>) -> Result<HttpResponse> {
    if state.notifier.dismiss(*id) {
        Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
    } else {
        Ok(HttpResponse::NotFound().json(serde_json::json!({"success": false, "error": "No such alert"})))
    }
}

// Active-view signal from the UI
async fn set_view(
    req: web::Json<ViewChangeRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    state.notifier.set_active_view(req.view);
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

// Notification-permission signal from the UI
async fn set_permission(
    req: web::Json<PermissionChangeRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    state.notifier.set_permission(req.permission);
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

// Timeline cursor for one day, pinned to the live wall clock
async fn get_cursor(day: web::Path<usize>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let schedule = state.schedule.lock().unwrap();
    let Some(day_schedule) = schedule.days.get(*day) else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "No such day"})));
    };

    let minutes = now_minutes(now_in_program_tz());
    let position = cursor_position(&day_schedule.all_times, minutes);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "now": minutes_to_time_string(minutes),
        "now_minutes": minutes,
        "cursor": position,
    })))
}

pub async fn start_server(
    port: u16,
    admin_password: String,
    roster: Vec<Candidate>,
    config: ScheduleConfig,
    outcome: ScheduleOutcome,
) -> std::io::Result<()> {
    let statuses = StatusStore::load(STATUS_STORE_FILE).map_err(std::io::Error::other)?;

    let notifier = NotificationScheduler::new(Arc::new(LogAlertSink));
    notifier.set_schedule(roster.clone(), outcome.days.clone());

    let app_state = web::Data::new(AppState {
        roster: Mutex::new(roster),
        schedule: Mutex::new(outcome),
        config: Mutex::new(config),
        statuses: Mutex::new(statuses),
        notifier,
        admin_password,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .route("/api/login", web::post().to(admin_login))
            .route("/api/upload", web::post().to(admin_upload))
            .route("/api/roster", web::get().to(get_roster))
            .route("/api/warnings", web::get().to(get_warnings))
            .route("/api/schedule/{day}", web::get().to(get_schedule))
            .route("/api/schedule/{day}/progress", web::get().to(get_progress))
            .route("/api/schedule/{day}/cursor", web::get().to(get_cursor))
            .route("/api/status/{id}", web::get().to(get_status))
            .route("/api/status", web::post().to(set_status))
            .route("/api/alerts", web::get().to(get_alerts))
            .route("/api/alerts/{id}/dismiss", web::post().to(dismiss_alert))
            .route("/api/view", web::post().to(set_view))
            .route("/api/permission", web::post().to(set_permission))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
