use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, RwLock};

use crate::monitor::checker::CheckOutcome;

pub type SharedMonitorState = Arc<RwLock<MonitorState>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    Unknown,
    Up,
    Down,
}

/// The state change produced by applying one check outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    /// First failed check after the site was up (or never seen).
    OutageStarted,
    /// The outage reached the critical threshold. Reported once per outage.
    Escalated,
    /// A further failure inside an already-known outage.
    StillDown,
    /// First successful check after at least one failure.
    Recovered { downtime_seconds: i64 },
}

/// Availability bookkeeping for the monitored site.
///
/// All counters mirror what the bot reports through /status and /stats.
#[derive(Debug, Clone)]
pub struct MonitorState {
    pub status: SiteStatus,
    pub consecutive_errors: u32,
    /// Whether the current outage already produced a critical escalation.
    pub escalated: bool,
    pub total_checks: u64,
    pub successful_checks: u64,
    pub failed_checks: u64,
    pub started_at: DateTime<Utc>,
    pub last_check: Option<DateTime<Utc>>,
    pub last_up_time: Option<DateTime<Utc>>,
    pub last_down_time: Option<DateTime<Utc>>,
    pub last_details: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub status: SiteStatus,
    pub consecutive_errors: u32,
    pub total_checks: u64,
    pub successful_checks: u64,
    pub failed_checks: u64,
    pub uptime_percentage: f64,
    pub running_seconds: i64,
    pub started_at: DateTime<Utc>,
    pub last_check: Option<DateTime<Utc>>,
    pub last_up_time: Option<DateTime<Utc>>,
    pub last_down_time: Option<DateTime<Utc>>,
    pub last_details: Option<String>,
}

impl MonitorState {
    pub fn new() -> Self {
        Self {
            status: SiteStatus::Unknown,
            consecutive_errors: 0,
            escalated: false,
            total_checks: 0,
            successful_checks: 0,
            failed_checks: 0,
            started_at: Utc::now(),
            last_check: None,
            last_up_time: None,
            last_down_time: None,
            last_details: None,
        }
    }

    pub fn new_shared() -> SharedMonitorState {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Folds a check outcome into the state and reports the resulting
    /// transition. `threshold` is the consecutive error count at which an
    /// outage is considered critical.
    pub fn apply(&mut self, outcome: &CheckOutcome, threshold: u32) -> Transition {
        self.total_checks += 1;
        self.last_check = Some(outcome.timestamp);
        self.last_details = Some(outcome.details.clone());

        if outcome.successful {
            self.successful_checks += 1;
            let was_down = self.status == SiteStatus::Down;
            self.status = SiteStatus::Up;
            self.consecutive_errors = 0;
            self.last_up_time = Some(outcome.timestamp);

            if was_down {
                let downtime_seconds = self
                    .last_down_time
                    .map(|down| (outcome.timestamp - down).num_seconds())
                    .unwrap_or(0);
                return Transition::Recovered { downtime_seconds };
            }
            return Transition::None;
        }

        self.failed_checks += 1;
        self.consecutive_errors += 1;

        if self.status != SiteStatus::Down {
            self.status = SiteStatus::Down;
            // Marks the start of this outage; overwritten by the next one.
            self.last_down_time = Some(outcome.timestamp);
            self.escalated = false;
            return Transition::OutageStarted;
        }

        // >= rather than ==: with a threshold of 1 the count is already past
        // it on the first repeat failure.
        if !self.escalated && self.consecutive_errors >= threshold {
            self.escalated = true;
            Transition::Escalated
        } else {
            Transition::StillDown
        }
    }

    pub fn uptime_percentage(&self) -> f64 {
        if self.total_checks == 0 {
            100.0
        } else {
            (self.successful_checks as f64 / self.total_checks as f64) * 100.0
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            status: self.status,
            consecutive_errors: self.consecutive_errors,
            total_checks: self.total_checks,
            successful_checks: self.successful_checks,
            failed_checks: self.failed_checks,
            uptime_percentage: self.uptime_percentage(),
            running_seconds: (Utc::now() - self.started_at).num_seconds(),
            started_at: self.started_at,
            last_check: self.last_check,
            last_up_time: self.last_up_time,
            last_down_time: self.last_down_time,
            last_details: self.last_details.clone(),
        }
    }
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn outcome(successful: bool, at: DateTime<Utc>) -> CheckOutcome {
        CheckOutcome {
            successful,
            status_code: if successful { Some(200) } else { None },
            response_time_ms: if successful { Some(42) } else { None },
            details: if successful {
                "HTTP 200".to_string()
            } else {
                "connection error".to_string()
            },
            timestamp: at,
        }
    }

    #[test]
    fn test_outage_and_recovery_transitions() {
        let mut state = MonitorState::new();
        let t0 = Utc::now();

        assert_eq!(state.apply(&outcome(true, t0), 3), Transition::None);
        assert_eq!(state.status, SiteStatus::Up);

        let t1 = t0 + Duration::seconds(10);
        assert_eq!(state.apply(&outcome(false, t1), 3), Transition::OutageStarted);
        assert_eq!(state.last_down_time, Some(t1));

        let t2 = t1 + Duration::seconds(10);
        assert_eq!(state.apply(&outcome(false, t2), 3), Transition::StillDown);

        let t3 = t2 + Duration::seconds(10);
        assert_eq!(state.apply(&outcome(false, t3), 3), Transition::Escalated);
        assert_eq!(state.consecutive_errors, 3);
        // Outage start is not moved by later failures.
        assert_eq!(state.last_down_time, Some(t1));

        let t4 = t3 + Duration::seconds(10);
        assert_eq!(
            state.apply(&outcome(true, t4), 3),
            Transition::Recovered { downtime_seconds: 30 }
        );
        assert_eq!(state.status, SiteStatus::Up);
        assert_eq!(state.consecutive_errors, 0);
    }

    #[test]
    fn test_threshold_one_escalates_exactly_once() {
        let mut state = MonitorState::new();
        let t0 = Utc::now();

        let transitions: Vec<Transition> = (0..5)
            .map(|i| state.apply(&outcome(false, t0 + Duration::seconds(10 * i)), 1))
            .collect();

        assert_eq!(transitions[0], Transition::OutageStarted);
        assert_eq!(transitions[1], Transition::Escalated);
        let escalations = transitions
            .iter()
            .filter(|t| **t == Transition::Escalated)
            .count();
        assert_eq!(escalations, 1);
    }

    #[test]
    fn test_escalation_rearms_after_recovery() {
        let mut state = MonitorState::new();
        let t0 = Utc::now();
        let mut at = t0;
        let mut step = |state: &mut MonitorState, ok| {
            at += Duration::seconds(10);
            state.apply(&outcome(ok, at), 2)
        };

        assert_eq!(step(&mut state, false), Transition::OutageStarted);
        assert_eq!(step(&mut state, false), Transition::Escalated);
        assert_eq!(step(&mut state, false), Transition::StillDown);
        assert!(matches!(step(&mut state, true), Transition::Recovered { .. }));

        // A fresh outage escalates again.
        assert_eq!(step(&mut state, false), Transition::OutageStarted);
        assert_eq!(step(&mut state, false), Transition::Escalated);
    }

    #[test]
    fn test_first_check_failure_starts_outage() {
        let mut state = MonitorState::new();
        assert_eq!(
            state.apply(&outcome(false, Utc::now()), 3),
            Transition::OutageStarted
        );
        assert_eq!(state.status, SiteStatus::Down);
    }

    #[test]
    fn test_uptime_percentage() {
        let mut state = MonitorState::new();
        assert_eq!(state.uptime_percentage(), 100.0);

        let now = Utc::now();
        state.apply(&outcome(true, now), 3);
        state.apply(&outcome(true, now), 3);
        state.apply(&outcome(false, now), 3);
        state.apply(&outcome(true, now), 3);

        let pct = state.uptime_percentage();
        assert!((pct - 75.0).abs() < f64::EPSILON);
    }
}
