//! Per-day data collection. After every step the model records one model-level row and one row
//! per clinic. The rows live in memory for the life of the model and can be exported as CSV.

use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::Path;

use csv::Writer;
use log::info;
use serde::{Deserialize, Serialize};

use crate::alerts::ClinicStatus;
use crate::clinic::{ClinicAgent, ClinicId};
use crate::error::SentinelError;

pub const MODEL_REPORT_FILE: &str = "model_report.csv";
pub const CLINIC_REPORT_FILE: &str = "clinic_report.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReportRow {
    pub day: u32,
    pub total_cases: u64,
    pub daily_cases: u64,
    pub active_alerts: usize,
    pub outbreak_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicReportRow {
    pub day: u32,
    pub clinic_id: ClinicId,
    pub clinic_name: String,
    pub daily_cases: u32,
    pub status: ClinicStatus,
}

#[derive(Debug, Clone, Default)]
pub struct DataCollector {
    model_rows: Vec<ModelReportRow>,
    clinic_rows: Vec<ClinicReportRow>,
}

// Checks that the path is a CSV file path, creating parent directories if they do not exist.
// Returns the created file.
fn generate_validate_filepath(path: &Path) -> Result<File, SentinelError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            Ok(file)
        }
        _ => Err(SentinelError::ReportError(format!(
            "report output files must be CSVs: {}",
            path.display()
        ))),
    }
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), SentinelError> {
    let file = generate_validate_filepath(path)?;
    let mut writer = Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

impl DataCollector {
    pub(crate) fn collect(&mut self, model_row: ModelReportRow, clinics: &[ClinicAgent]) {
        let day = model_row.day;
        self.model_rows.push(model_row);
        self.clinic_rows
            .extend(clinics.iter().map(|clinic| ClinicReportRow {
                day,
                clinic_id: clinic.id(),
                clinic_name: clinic.name().to_string(),
                daily_cases: clinic.daily_cases(),
                status: clinic.status(),
            }));
    }

    #[must_use]
    pub fn model_rows(&self) -> &[ModelReportRow] {
        &self.model_rows
    }

    #[must_use]
    pub fn clinic_rows(&self) -> &[ClinicReportRow] {
        &self.clinic_rows
    }

    /// Writes `model_report.csv` and `clinic_report.csv` into `dir`, creating it if needed.
    ///
    /// # Errors
    /// Returns an error if a file cannot be created or written.
    pub fn write_csv(&self, dir: &Path) -> Result<(), SentinelError> {
        write_rows(&dir.join(MODEL_REPORT_FILE), &self.model_rows)?;
        write_rows(&dir.join(CLINIC_REPORT_FILE), &self.clinic_rows)?;
        info!(
            "wrote {} model rows and {} clinic rows to {}",
            self.model_rows.len(),
            self.clinic_rows.len(),
            dir.display()
        );
        Ok(())
    }
}
