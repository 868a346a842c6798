//! Clinics are the agents of the simulation. Each clinic sits at a fixed grid cell, generates a
//! day's case counts when stepped, keeps a 7-day window of its fever+cough counts, and evaluates
//! the detection rules in [`crate::alerts`] against that window.
//!
//! Clinics hold no reference to the model that owns them. Whatever they need to know about the
//! network, currently just the epicenter of an active outbreak, is passed into [`ClinicAgent::step`].

use std::collections::VecDeque;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::alerts::{evaluate_rules, Alert, ClinicStatus, WINDOW_DAYS};
use crate::define_rng;
use crate::random::RandomStreams;

define_rng!(pub CaseRng);

pub type ClinicId = usize;

/// The pool clinic names are drawn from, in creation order. Its length caps the network size.
pub const CLINIC_NAMES: [&str; 12] = [
    "City General Hospital",
    "Riverside Clinic",
    "Downtown Health Center",
    "Northside Medical",
    "Eastwood Clinic",
    "Westfield Hospital",
    "Central Care Center",
    "Southside Clinic",
    "Highland Medical",
    "Parkview Health",
    "Lakeside Hospital",
    "Metro Health Center",
];

/// Daily cases when no outbreak is active.
const BASELINE_CASES: RangeInclusive<u32> = 5..=15;
/// Daily cases during an outbreak within distance 2 of the epicenter.
const NEAR_EPICENTER_CASES: RangeInclusive<u32> = 20..=40;
/// Daily cases during an outbreak within distance 4 of the epicenter.
const MID_EPICENTER_CASES: RangeInclusive<u32> = 15..=30;
/// Daily cases during an outbreak anywhere else.
const FAR_EPICENTER_CASES: RangeInclusive<u32> = 10..=20;

const NEAR_DISTANCE: f64 = 2.0;
const MID_DISTANCE: f64 = 4.0;

/// Share of daily cases presenting with fever and cough.
const FEVER_COUGH_SHARE: RangeInclusive<f64> = 0.6..=0.8;
/// Share of daily cases that are severe.
const SEVERE_SHARE: RangeInclusive<f64> = 0.05..=0.15;

/// A grid cell, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position(pub u32, pub u32);

impl Position {
    /// Straight-line distance between two cells.
    #[must_use]
    pub fn distance_to(self, other: Position) -> f64 {
        let dx = f64::from(self.0) - f64::from(other.0);
        let dy = f64::from(self.1) - f64::from(other.1);
        dx.hypot(dy)
    }
}

/// The most recent [`WINDOW_DAYS`] fever+cough counts, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseHistory(VecDeque<u32>);

impl CaseHistory {
    /// Appends today's count, evicting the oldest entry once the window is full.
    pub fn push(&mut self, count: u32) {
        self.0.push_back(count);
        while self.0.len() > WINDOW_DAYS {
            self.0.pop_front();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.0.len() == WINDOW_DAYS
    }

    #[must_use]
    pub fn sum(&self) -> u32 {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &u32> {
        self.0.iter()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn share_of(cases: u32, share: f64) -> u32 {
    (f64::from(cases) * share).floor() as u32
}

#[derive(Debug, Clone)]
pub struct ClinicAgent {
    id: ClinicId,
    name: String,
    position: Position,
    daily_cases: u32,
    total_cases: u64,
    fever_cough_cases: u32,
    severe_cases: u32,
    case_history: CaseHistory,
    status: ClinicStatus,
}

impl ClinicAgent {
    #[must_use]
    pub fn new(id: ClinicId, name: impl Into<String>, position: Position) -> Self {
        ClinicAgent {
            id,
            name: name.into(),
            position,
            daily_cases: 0,
            total_cases: 0,
            fever_cough_cases: 0,
            severe_cases: 0,
            case_history: CaseHistory::default(),
            status: ClinicStatus::Normal,
        }
    }

    #[must_use]
    pub fn id(&self) -> ClinicId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn daily_cases(&self) -> u32 {
        self.daily_cases
    }

    #[must_use]
    pub fn total_cases(&self) -> u64 {
        self.total_cases
    }

    #[must_use]
    pub fn fever_cough_cases(&self) -> u32 {
        self.fever_cough_cases
    }

    #[must_use]
    pub fn severe_cases(&self) -> u32 {
        self.severe_cases
    }

    #[must_use]
    pub fn case_history(&self) -> &CaseHistory {
        &self.case_history
    }

    #[must_use]
    pub fn status(&self) -> ClinicStatus {
        self.status
    }

    #[must_use]
    pub fn alert_level(&self) -> u8 {
        self.status.alert_level()
    }

    /// Generates today's case counts. `epicenter` is the position of the outbreak epicenter if
    /// an outbreak is active; clinics closer to it see more cases.
    pub fn generate_cases(&mut self, epicenter: Option<Position>, rng: &mut RandomStreams) {
        let range = match epicenter {
            None => BASELINE_CASES,
            Some(epicenter) => {
                let distance = self.position.distance_to(epicenter);
                if distance <= NEAR_DISTANCE {
                    NEAR_EPICENTER_CASES
                } else if distance <= MID_DISTANCE {
                    MID_EPICENTER_CASES
                } else {
                    FAR_EPICENTER_CASES
                }
            }
        };
        self.daily_cases = rng.sample_range(CaseRng, range);

        let fever_cough_share = rng.sample_range(CaseRng, FEVER_COUGH_SHARE);
        self.fever_cough_cases = share_of(self.daily_cases, fever_cough_share);
        let severe_share = rng.sample_range(CaseRng, SEVERE_SHARE);
        self.severe_cases = share_of(self.daily_cases, severe_share);

        self.total_cases += u64::from(self.daily_cases);
        self.case_history.push(self.fever_cough_cases);
    }

    /// Re-evaluates this clinic's status from scratch against the detection rules and returns
    /// the alerts raised today, in rule order.
    pub fn check_alerts(&mut self) -> Vec<Alert> {
        let outcome = evaluate_rules(&self.name, self.fever_cough_cases, &self.case_history);
        self.status = outcome.status;
        outcome.alerts
    }

    /// The clinic's daily step: generate cases, then check alerts.
    pub fn step(&mut self, epicenter: Option<Position>, rng: &mut RandomStreams) -> Vec<Alert> {
        self.generate_cases(epicenter, rng);
        self.check_alerts()
    }
}
