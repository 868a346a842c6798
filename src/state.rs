//! The point-in-time snapshot of a model handed to clients. Every field is an owned copy, so a
//! snapshot never aliases the model's internal containers and stays valid after further steps.

use serde::{Deserialize, Serialize};

use crate::alerts::{Alert, ClinicStatus};
use crate::clinic::{ClinicAgent, ClinicId, Position};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicState {
    pub id: ClinicId,
    pub name: String,
    pub position: Position,
    pub daily_cases: u32,
    pub total_cases: u64,
    pub fever_cough_cases: u32,
    pub severe_cases: u32,
    pub status: ClinicStatus,
    pub alert_level: u8,
}

impl From<&ClinicAgent> for ClinicState {
    fn from(clinic: &ClinicAgent) -> Self {
        ClinicState {
            id: clinic.id(),
            name: clinic.name().to_string(),
            position: clinic.position(),
            daily_cases: clinic.daily_cases(),
            total_cases: clinic.total_cases(),
            fever_cough_cases: clinic.fever_cough_cases(),
            severe_cases: clinic.severe_cases(),
            status: clinic.status(),
            alert_level: clinic.alert_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    pub day: u32,
    pub total_cases: u64,
    pub daily_cases: u64,
    pub active_alerts: Vec<Alert>,
    pub outbreak_active: bool,
    pub outbreak_epicenter: Option<ClinicId>,
    pub clinics: Vec<ClinicState>,
    pub daily_cases_history: Vec<u64>,
    pub alerts_history: Vec<usize>,
}
