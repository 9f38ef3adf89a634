use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, FixedOffset};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::schedule::slot_utils::{now_in_program_tz, slot_timestamp};
use crate::schedule::{Candidate, DaySchedule};

/// Operators are alerted this many minutes before an interview starts
pub const ALERT_LEAD_MINUTES: i64 = 5;

const ALERT_TITLE: &str = "Upcoming Interview";

/// Which screen the operator currently has open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveView {
    Dashboard,
    Candidates,
    Schedule,
}

/// The collaborator-owned system-notification permission signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPermission {
    Default,
    Granted,
    Denied,
}

/// A visible alert, dismissable by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub id: u64,
    pub title: String,
    pub message: String,
    pub candidate_id: String,
}

/// System-level alert side effect, invoked only when permission is granted
pub trait AlertSink: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// Default sink: log the alert and nothing else
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn notify(&self, title: &str, body: &str) {
        info!("system alert: {} - {}", title, body);
    }
}

/// One future alert computed during a build pass; consumed when its timer fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAlert {
    pub trigger_at: DateTime<FixedOffset>,
    pub candidate_id: String,
    pub first_name: String,
    pub last_name: String,
    pub room_name: String,
    pub time: String,
}

/// Flattens the slot grid into the alerts still ahead of `now`.
///
/// Each assigned (room, label) pair resolves to an absolute instant at the
/// fixed program offset, minus the lead time. Triggers not strictly in the
/// future are discarded. Slots referencing a candidate id missing from the
/// roster are a soft inconsistency and produce no alert.
pub fn upcoming_alerts(
    days: &[DaySchedule],
    roster: &[Candidate],
    now: DateTime<FixedOffset>,
) -> Vec<PendingAlert> {
    let roster_map: HashMap<&str, &Candidate> =
        roster.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut alerts = Vec::new();
    for day in days {
        for room in &day.rooms {
            for slot in &room.slots {
                let Some(candidate_id) = slot.candidate_id.as_deref() else {
                    continue;
                };
                let Some(candidate) = roster_map.get(candidate_id) else {
                    continue;
                };
                let interview_at = match slot_timestamp(day.date, &slot.time) {
                    Ok(ts) => ts,
                    Err(err) => {
                        warn!("slot on {} not alertable: {}", day.day_name, err);
                        continue;
                    }
                };
                let trigger_at = interview_at - Duration::minutes(ALERT_LEAD_MINUTES);
                if trigger_at <= now {
                    continue;
                }
                alerts.push(PendingAlert {
                    trigger_at,
                    candidate_id: candidate.id.clone(),
                    first_name: candidate.first_name.clone(),
                    last_name: candidate.last_name.clone(),
                    room_name: room.room_name.clone(),
                    time: slot.time.clone(),
                });
            }
        }
    }
    alerts
}

struct SchedulerInner {
    generation: u64,
    timers: Vec<JoinHandle<()>>,
    alerts: Vec<Alert>,
    next_alert_id: u64,
    active_view: ActiveView,
    permission: AlertPermission,
    roster: Vec<Candidate>,
    days: Vec<DaySchedule>,
}

/// Timer-driven alert engine.
///
/// The scheduler is always in one "generation": a complete build/arm cycle
/// over its current inputs. Any input change (roster, active view,
/// permission) bumps the generation, aborts every armed timer from the old
/// generation, and re-arms from scratch. Incremental patching is never
/// attempted; cancel-all-then-rearm keeps the invalidation invariant simple.
pub struct NotificationScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
    sink: Arc<dyn AlertSink>,
}

impl NotificationScheduler {
    pub fn new(sink: Arc<dyn AlertSink>) -> Self {
        NotificationScheduler {
            inner: Arc::new(Mutex::new(SchedulerInner {
                generation: 0,
                timers: Vec::new(),
                alerts: Vec::new(),
                next_alert_id: 1,
                active_view: ActiveView::Dashboard,
                permission: AlertPermission::Default,
                roster: Vec::new(),
                days: Vec::new(),
            })),
            sink,
        }
    }

    /// Replaces the roster/grid snapshot and re-arms
    pub fn set_schedule(&self, roster: Vec<Candidate>, days: Vec<DaySchedule>) {
        let mut inner = self.inner.lock().unwrap();
        inner.roster = roster;
        inner.days = days;
        self.rearm(&mut inner, now_in_program_tz());
    }

    /// Updates the active-view signal and re-arms
    pub fn set_active_view(&self, view: ActiveView) {
        let mut inner = self.inner.lock().unwrap();
        inner.active_view = view;
        self.rearm(&mut inner, now_in_program_tz());
    }

    /// Updates the permission signal and re-arms
    pub fn set_permission(&self, permission: AlertPermission) {
        let mut inner = self.inner.lock().unwrap();
        inner.permission = permission;
        self.rearm(&mut inner, now_in_program_tz());
    }

    /// The currently visible alerts, oldest first
    pub fn alerts(&self) -> Vec<Alert> {
        self.inner.lock().unwrap().alerts.clone()
    }

    /// Removes a visible alert; returns whether it existed. Never touches
    /// interview statuses.
    pub fn dismiss(&self, alert_id: u64) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.alerts.len();
        inner.alerts.retain(|a| a.id != alert_id);
        inner.alerts.len() != before
    }

    /// Cancels the previous generation and arms one timer per upcoming alert
    fn rearm(&self, inner: &mut SchedulerInner, now: DateTime<FixedOffset>) {
        inner.generation += 1;
        let generation = inner.generation;
        for handle in inner.timers.drain(..) {
            handle.abort();
        }

        let pending = upcoming_alerts(&inner.days, &inner.roster, now);
        info!(
            "armed generation {} with {} alert timer(s)",
            generation,
            pending.len()
        );

        for alert in pending {
            // trigger_at is strictly after now, so the delay is positive
            let delay = (alert.trigger_at - now)
                .to_std()
                .unwrap_or(std::time::Duration::ZERO);
            let shared = Arc::clone(&self.inner);
            let sink = Arc::clone(&self.sink);
            let handle = tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                fire(&shared, &sink, generation, alert);
            });
            inner.timers.push(handle);
        }
    }
}

/// Fire path for one timer. Runs synchronously under the scheduler lock.
fn fire(
    shared: &Arc<Mutex<SchedulerInner>>,
    sink: &Arc<dyn AlertSink>,
    generation: u64,
    pending: PendingAlert,
) {
    let mut inner = shared.lock().unwrap();

    // Cancellation must make this unreachable; reaching it is a scheduler
    // defect, fatal to that generation
    if inner.generation != generation {
        error!(
            "timer from generation {} fired after invalidation (current {}); dropping",
            generation, inner.generation
        );
        return;
    }

    // Alerts are only relevant on the dashboard and schedule screens;
    // elsewhere the event is dropped, not queued
    if !matches!(inner.active_view, ActiveView::Dashboard | ActiveView::Schedule) {
        return;
    }

    let alert = Alert {
        id: inner.next_alert_id,
        title: ALERT_TITLE.to_string(),
        message: format!(
            "Interview with {} {} in {} at {}.",
            pending.first_name, pending.last_name, pending.room_name, pending.time
        ),
        candidate_id: pending.candidate_id,
    };
    inner.next_alert_id += 1;
    inner.alerts.push(alert.clone());

    if inner.permission == AlertPermission::Granted {
        sink.notify(&alert.title, &alert.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{build_schedule, DayConfig, ScheduleConfig};
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink(AtomicUsize);

    impl AlertSink for CountingSink {
        fn notify(&self, _title: &str, _body: &str) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn roster(count: u32) -> Vec<Candidate> {
        (1..=count)
            .map(|rank| Candidate {
                id: format!("C{:03}", rank),
                first_name: format!("First{}", rank),
                last_name: format!("Last{}", rank),
                rank,
            })
            .collect()
    }

    fn grid(candidates: &[Candidate], times: &[&str]) -> Vec<DaySchedule> {
        let config = ScheduleConfig {
            year: 2024,
            days: vec![DayConfig {
                day_name: "Day 1 (29/Sep)".to_string(),
                room_names: vec!["Room 1".to_string(), "Room 2".to_string()],
                all_times: times.iter().map(|s| s.to_string()).collect(),
                break_times: vec![],
            }],
        };
        build_schedule(candidates, &config).days
    }

    fn program_time(h: u32, m: u32) -> DateTime<FixedOffset> {
        crate::schedule::slot_utils::program_offset()
            .with_ymd_and_hms(2024, 9, 29, h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_lead_time_is_five_minutes() {
        let candidates = roster(1);
        let days = grid(&candidates, &["9:00"]);
        let alerts = upcoming_alerts(&days, &candidates, program_time(8, 0));

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].trigger_at, program_time(8, 55));
    }

    #[test]
    fn test_past_triggers_are_discarded() {
        let candidates = roster(1);
        let days = grid(&candidates, &["9:00"]);

        // At exactly the trigger instant the alert is no longer "future"
        assert!(upcoming_alerts(&days, &candidates, program_time(8, 55)).is_empty());
        assert!(upcoming_alerts(&days, &candidates, program_time(10, 0)).is_empty());
        // One minute earlier it still arms
        assert_eq!(upcoming_alerts(&days, &candidates, program_time(8, 54)).len(), 1);
    }

    #[test]
    fn test_unknown_candidate_reference_is_skipped() {
        let candidates = roster(2);
        let mut days = grid(&candidates, &["9:00"]);
        days[0].rooms[1].slots[0].candidate_id = Some("GHOST".to_string());

        let alerts = upcoming_alerts(&days, &candidates, program_time(8, 0));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].candidate_id, "C001");
    }

    fn seed(
        scheduler: &NotificationScheduler,
        candidates: &[Candidate],
        days: &[DaySchedule],
        view: ActiveView,
        permission: AlertPermission,
        now: DateTime<FixedOffset>,
    ) {
        let mut inner = scheduler.inner.lock().unwrap();
        inner.roster = candidates.to_vec();
        inner.days = days.to_vec();
        inner.active_view = view;
        inner.permission = permission;
        scheduler.rearm(&mut inner, now);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_surviving_slot_fires_exactly_once() {
        let sink = Arc::new(CountingSink(AtomicUsize::new(0)));
        let scheduler = NotificationScheduler::new(sink.clone());

        let candidates = roster(4);
        let days = grid(&candidates, &["9:00", "9:20"]);
        seed(
            &scheduler,
            &candidates,
            &days,
            ActiveView::Schedule,
            AlertPermission::Granted,
            program_time(8, 0),
        );

        // Past both trigger points (08:55 and 09:15)
        tokio::time::advance(std::time::Duration::from_secs(2 * 3600)).await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert_eq!(scheduler.alerts().len(), 4);
        assert_eq!(sink.0.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rebuild_cancels_stale_timers() {
        let sink = Arc::new(CountingSink(AtomicUsize::new(0)));
        let scheduler = NotificationScheduler::new(sink.clone());

        let now = program_time(8, 0);
        let old_roster = roster(4);
        let old_days = grid(&old_roster, &["9:00", "9:20"]);
        seed(
            &scheduler,
            &old_roster,
            &old_days,
            ActiveView::Schedule,
            AlertPermission::Granted,
            now,
        );

        // Roster change before anything fired: only two candidates survive
        let new_roster = roster(2);
        let new_days = grid(&new_roster, &["9:00"]);
        seed(
            &scheduler,
            &new_roster,
            &new_days,
            ActiveView::Schedule,
            AlertPermission::Granted,
            now,
        );

        // Past every trigger point of both generations
        tokio::time::advance(std::time::Duration::from_secs(2 * 3600)).await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        // Exactly one fire per surviving slot, zero from the old generation
        let alerts = scheduler.alerts();
        assert_eq!(alerts.len(), 2);
        assert_eq!(sink.0.load(Ordering::SeqCst), 2);
        let mut ids: Vec<String> = alerts.iter().map(|a| a.candidate_id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["C001".to_string(), "C002".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_irrelevant_view_drops_the_event_silently() {
        let sink = Arc::new(CountingSink(AtomicUsize::new(0)));
        let scheduler = NotificationScheduler::new(sink.clone());

        let candidates = roster(1);
        let days = grid(&candidates, &["9:00"]);
        seed(
            &scheduler,
            &candidates,
            &days,
            ActiveView::Candidates,
            AlertPermission::Granted,
            program_time(8, 0),
        );

        tokio::time::advance(std::time::Duration::from_secs(2 * 3600)).await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        // Dropped, not queued for later
        assert!(scheduler.alerts().is_empty());
        assert_eq!(sink.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_permission_suppresses_the_system_alert_only() {
        let sink = Arc::new(CountingSink(AtomicUsize::new(0)));
        let scheduler = NotificationScheduler::new(sink.clone());

        let candidates = roster(1);
        let days = grid(&candidates, &["9:00"]);
        seed(
            &scheduler,
            &candidates,
            &days,
            ActiveView::Dashboard,
            AlertPermission::Denied,
            program_time(8, 0),
        );

        tokio::time::advance(std::time::Duration::from_secs(2 * 3600)).await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let alerts = scheduler.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, "Upcoming Interview");
        assert_eq!(
            alerts[0].message,
            "Interview with First1 Last1 in Room 1 at 9:00."
        );
        assert_eq!(sink.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_removes_only_the_given_alert() {
        let sink = Arc::new(CountingSink(AtomicUsize::new(0)));
        let scheduler = NotificationScheduler::new(sink.clone());

        let candidates = roster(2);
        let days = grid(&candidates, &["9:00"]);
        seed(
            &scheduler,
            &candidates,
            &days,
            ActiveView::Schedule,
            AlertPermission::Default,
            program_time(8, 0),
        );

        tokio::time::advance(std::time::Duration::from_secs(2 * 3600)).await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let alerts = scheduler.alerts();
        assert_eq!(alerts.len(), 2);
        assert!(scheduler.dismiss(alerts[0].id));
        assert_eq!(scheduler.alerts().len(), 1);
        assert!(!scheduler.dismiss(9999));
    }
}
