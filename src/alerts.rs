//! The outbreak detection rules run by every clinic at the end of its daily step.
//!
//! Rules are evaluated in a fixed order against the clinic's fever+cough count for the day and
//! its 7-day window:
//!
//! 1. *Sustained load*: a full window whose sum exceeds 50 raises the clinic to
//!    [`ClinicStatus::Alert`] and emits a [`AlertType::HighCases`] record.
//! 2. *Single-day spike*: more than 10 fever+cough cases today raises the clinic to
//!    [`ClinicStatus::Alert`] and emits a [`AlertType::GeographicCluster`] record.
//! 3. *Rapid growth*: with a full window, a count at least twice the window average raises the
//!    clinic to [`ClinicStatus::Warning`] and emits a [`AlertType::RapidIncrease`] record.
//!
//! A rule can only raise the status, never lower it, so the final status is the highest level
//! any rule reached. Every rule that fires emits its record, in rule order.

use log::trace;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::clinic::CaseHistory;

/// Number of days in the sliding fever+cough window.
pub const WINDOW_DAYS: usize = 7;
/// A full window summing to more than this triggers the sustained-load rule.
pub const SUSTAINED_LOAD_THRESHOLD: u32 = 50;
/// More than this many fever+cough cases in one day triggers the spike rule.
pub const SPIKE_THRESHOLD: u32 = 10;
/// Today's count relative to the window average that triggers the rapid-growth rule.
pub const GROWTH_FACTOR: f64 = 2.0;

/// A clinic's alert status. The discriminant is the alert level reported to clients.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClinicStatus {
    #[default]
    Normal = 0,
    Warning = 1,
    Alert = 2,
}

impl ClinicStatus {
    #[must_use]
    pub fn alert_level(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertType {
    HighCases,
    GeographicCluster,
    RapidIncrease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

/// One alert raised by one clinic on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: Severity,
    /// Name of the reporting clinic
    pub clinic: String,
    pub cases: u32,
    /// Window average, rounded to one decimal. Only set by the rapid-growth rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    pub message: String,
}

/// The result of evaluating every rule for one clinic on one day.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleOutcome {
    pub status: ClinicStatus,
    pub alerts: Vec<Alert>,
}

impl RuleOutcome {
    fn raise(&mut self, status: ClinicStatus) {
        self.status = self.status.max(status);
    }

    fn emit(&mut self, alert: Alert) {
        trace!("{}: {}", alert.clinic, alert.message);
        self.alerts.push(alert);
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Evaluates all detection rules for `clinic` given today's fever+cough count and the window
/// (which already includes today's count). Starts from [`ClinicStatus::Normal`]; nothing carries
/// over from previous days except what is in `history`.
#[must_use]
pub fn evaluate_rules(clinic: &str, fever_cough_today: u32, history: &CaseHistory) -> RuleOutcome {
    let mut outcome = RuleOutcome::default();
    let window_total = history.is_full().then(|| history.sum());

    // Rule 1: sustained load over the full window
    if let Some(total) = window_total {
        if total > SUSTAINED_LOAD_THRESHOLD {
            outcome.emit(Alert {
                alert_type: AlertType::HighCases,
                severity: Severity::High,
                clinic: clinic.to_string(),
                cases: total,
                avg: None,
                message: format!(
                    "7-day fever+cough cases exceed {SUSTAINED_LOAD_THRESHOLD} ({total} cases)"
                ),
            });
            outcome.raise(ClinicStatus::Alert);
        }
    }

    // Rule 2: single-day spike
    if fever_cough_today > SPIKE_THRESHOLD {
        outcome.emit(Alert {
            alert_type: AlertType::GeographicCluster,
            severity: Severity::Medium,
            clinic: clinic.to_string(),
            cases: fever_cough_today,
            avg: None,
            message: format!("Single clinic spike: {fever_cough_today} fever+cough cases today"),
        });
        outcome.raise(ClinicStatus::Alert);
    }

    // Rule 3: rapid growth against the window average
    if let Some(total) = window_total {
        #[allow(clippy::cast_precision_loss)]
        let average = f64::from(total) / WINDOW_DAYS as f64;
        if f64::from(fever_cough_today) >= average * GROWTH_FACTOR {
            let avg = round_to_tenth(average);
            outcome.emit(Alert {
                alert_type: AlertType::RapidIncrease,
                severity: Severity::High,
                clinic: clinic.to_string(),
                cases: fever_cough_today,
                avg: Some(avg),
                message: format!("Cases doubled: {fever_cough_today} vs avg {avg:.1}"),
            });
            outcome.raise(ClinicStatus::Warning);
        }
    }

    outcome
}
