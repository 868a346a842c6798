//! The outbreak model owns the clinic network and advances it one simulated day at a time.
//!
//! Each [`OutbreakModel::step`] runs in a fixed order:
//!
//! 1. Advance the day counter and clear the day's alerts and case total.
//! 2. With no active outbreak, attempt a trigger with probability 0.10. The attempt itself only
//!    succeeds with the configured outbreak probability, so both gates must pass.
//! 3. With an active outbreak (including one started in step 2), end it with probability 0.15.
//! 4. Step every clinic in creation order, collecting their alerts.
//! 5. Aggregate the day's cases into the network totals and append to the histories.
//!
//! The model is single threaded and holds no locks. Callers that share a model between threads
//! do so through [`crate::handle::SimulationHandle`].

use log::{debug, info};

use crate::alerts::Alert;
use crate::clinic::{ClinicAgent, ClinicId, Position, CLINIC_NAMES};
use crate::config::ModelConfig;
use crate::define_rng;
use crate::error::SentinelError;
use crate::hashing::HashSet;
use crate::random::RandomStreams;
use crate::report::{DataCollector, ModelReportRow};
use crate::state::{ClinicState, ModelState};

define_rng!(pub OutbreakRng);
define_rng!(pub PlacementRng);

/// Daily chance that the model attempts to trigger an outbreak while none is active.
pub const DAILY_TRIGGER_ATTEMPT_CHANCE: f64 = 0.10;
/// Daily chance that an active outbreak ends.
pub const DAILY_END_CHANCE: f64 = 0.15;

pub struct OutbreakModel {
    config: ModelConfig,
    clinics: Vec<ClinicAgent>,
    current_day: u32,
    total_cases: u64,
    daily_cases: u64,
    /// Set if and only if an outbreak is active.
    outbreak_epicenter: Option<ClinicId>,
    active_alerts: Vec<Alert>,
    daily_cases_history: Vec<u64>,
    alerts_history: Vec<usize>,
    rng: RandomStreams,
    collector: DataCollector,
}

impl OutbreakModel {
    /// Builds a model at day 0 with its clinics placed on the grid.
    ///
    /// # Errors
    /// Returns `SentinelError::InvalidConfig` if the configuration does not validate.
    pub fn new(config: ModelConfig) -> Result<OutbreakModel, SentinelError> {
        let config = config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        info!(
            "creating outbreak model: {} clinics, {}% outbreak probability, {}x{} grid, seed {}",
            config.num_clinics,
            config.outbreak_probability,
            config.grid_width,
            config.grid_height,
            seed
        );

        let mut model = OutbreakModel {
            config,
            clinics: Vec::new(),
            current_day: 0,
            total_cases: 0,
            daily_cases: 0,
            outbreak_epicenter: None,
            active_alerts: Vec::new(),
            daily_cases_history: Vec::new(),
            alerts_history: Vec::new(),
            rng: RandomStreams::new(seed),
            collector: DataCollector::default(),
        };
        model.create_clinics(model.config.num_clinics);
        Ok(model)
    }

    /// Creates up to `count` clinics, named from the pool in order and placed on distinct,
    /// randomly chosen grid cells.
    fn create_clinics(&mut self, count: usize) {
        let cells = u64::from(self.config.grid_width) * u64::from(self.config.grid_height);
        let count = count
            .min(CLINIC_NAMES.len())
            .min(usize::try_from(cells).unwrap_or(usize::MAX));
        let mut placed: HashSet<Position> = HashSet::default();

        for (id, name) in CLINIC_NAMES.iter().take(count).enumerate() {
            let position = loop {
                let x = self.rng.sample_range(PlacementRng, 0..self.config.grid_width);
                let y = self.rng.sample_range(PlacementRng, 0..self.config.grid_height);
                let candidate = Position(x, y);
                if placed.insert(candidate) {
                    break candidate;
                }
            };
            debug!("placing clinic {id} ({name}) at ({}, {})", position.0, position.1);
            self.clinics.push(ClinicAgent::new(id, *name, position));
        }
    }

    /// Attempts to start an outbreak. Succeeds with the configured outbreak probability, choosing
    /// an epicenter uniformly among all clinics. Returns `false` without changing anything if an
    /// outbreak is already active or there are no clinics.
    pub fn trigger_outbreak(&mut self) -> bool {
        if self.outbreak_active() {
            return false;
        }
        if self.clinics.is_empty() {
            debug!("no clinics to host an outbreak");
            return false;
        }
        if self.rng.sample_unit(OutbreakRng) >= self.config.outbreak_chance() {
            return false;
        }

        let index = self.rng.sample_range(OutbreakRng, 0..self.clinics.len());
        let epicenter = &self.clinics[index];
        info!(
            "outbreak started on day {} with epicenter {} ({})",
            self.current_day,
            epicenter.id(),
            epicenter.name()
        );
        self.outbreak_epicenter = Some(epicenter.id());
        true
    }

    fn end_outbreak(&mut self) {
        if let Some(epicenter) = self.outbreak_epicenter.take() {
            info!(
                "outbreak centered on clinic {epicenter} ended on day {}",
                self.current_day
            );
        }
    }

    fn epicenter_position(&self) -> Option<Position> {
        self.outbreak_epicenter
            .and_then(|id| self.clinics.get(id))
            .map(ClinicAgent::position)
    }

    /// Advances the simulation by one day.
    pub fn step(&mut self) {
        self.current_day += 1;
        self.active_alerts.clear();
        self.daily_cases = 0;

        if !self.outbreak_active()
            && self.rng.sample_unit(OutbreakRng) < DAILY_TRIGGER_ATTEMPT_CHANCE
        {
            self.trigger_outbreak();
        }

        if self.outbreak_active() && self.rng.sample_unit(OutbreakRng) < DAILY_END_CHANCE {
            self.end_outbreak();
        }

        let epicenter = self.epicenter_position();
        for clinic in &mut self.clinics {
            let alerts = clinic.step(epicenter, &mut self.rng);
            self.active_alerts.extend(alerts);
        }

        self.daily_cases = self
            .clinics
            .iter()
            .map(|clinic| u64::from(clinic.daily_cases()))
            .sum();
        self.total_cases += self.daily_cases;

        self.daily_cases_history.push(self.daily_cases);
        self.alerts_history.push(self.active_alerts.len());

        self.collector.collect(
            ModelReportRow {
                day: self.current_day,
                total_cases: self.total_cases,
                daily_cases: self.daily_cases,
                active_alerts: self.active_alerts.len(),
                outbreak_active: self.outbreak_active(),
            },
            &self.clinics,
        );
        debug!(
            "day {}: {} cases ({} total), {} alerts, outbreak active: {}",
            self.current_day,
            self.daily_cases,
            self.total_cases,
            self.active_alerts.len(),
            self.outbreak_active()
        );
    }

    /// Returns an owned snapshot of the model.
    #[must_use]
    pub fn get_state(&self) -> ModelState {
        ModelState {
            day: self.current_day,
            total_cases: self.total_cases,
            daily_cases: self.daily_cases,
            active_alerts: self.active_alerts.clone(),
            outbreak_active: self.outbreak_active(),
            outbreak_epicenter: self.outbreak_epicenter,
            clinics: self.clinics.iter().map(ClinicState::from).collect(),
            daily_cases_history: self.daily_cases_history.clone(),
            alerts_history: self.alerts_history.clone(),
        }
    }

    #[must_use]
    pub fn outbreak_active(&self) -> bool {
        self.outbreak_epicenter.is_some()
    }

    #[must_use]
    pub fn outbreak_epicenter(&self) -> Option<&ClinicAgent> {
        self.outbreak_epicenter.and_then(|id| self.clinics.get(id))
    }

    #[must_use]
    pub fn current_day(&self) -> u32 {
        self.current_day
    }

    #[must_use]
    pub fn total_cases(&self) -> u64 {
        self.total_cases
    }

    #[must_use]
    pub fn daily_cases(&self) -> u64 {
        self.daily_cases
    }

    #[must_use]
    pub fn clinics(&self) -> &[ClinicAgent] {
        &self.clinics
    }

    #[must_use]
    pub fn active_alerts(&self) -> &[Alert] {
        &self.active_alerts
    }

    #[must_use]
    pub fn daily_cases_history(&self) -> &[u64] {
        &self.daily_cases_history
    }

    #[must_use]
    pub fn alerts_history(&self) -> &[usize] {
        &self.alerts_history
    }

    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// The base seed of this model's random streams.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.rng.base_seed()
    }

    #[must_use]
    pub fn collector(&self) -> &DataCollector {
        &self.collector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with(num_clinics: usize, outbreak_probability: u32, seed: u64) -> OutbreakModel {
        OutbreakModel::new(ModelConfig {
            num_clinics,
            outbreak_probability,
            seed: Some(seed),
            ..ModelConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn clinics_have_sequential_ids_and_distinct_cells() {
        for seed in 0..20 {
            let model = model_with(12, 30, seed);
            assert_eq!(model.clinics().len(), 12);
            let mut cells = HashSet::default();
            for (index, clinic) in model.clinics().iter().enumerate() {
                assert_eq!(clinic.id(), index);
                assert_eq!(clinic.name(), CLINIC_NAMES[index]);
                assert!(clinic.position().0 < 10 && clinic.position().1 < 10);
                assert!(cells.insert(clinic.position()));
            }
        }
    }

    #[test]
    fn small_grid_fills_every_cell() {
        let model = OutbreakModel::new(ModelConfig {
            num_clinics: 4,
            grid_width: 2,
            grid_height: 2,
            seed: Some(1),
            ..ModelConfig::default()
        })
        .unwrap();
        let cells: HashSet<Position> = model.clinics().iter().map(ClinicAgent::position).collect();
        assert_eq!(cells.len(), 4);
    }

    #[test]
    fn clinic_count_is_capped_by_name_pool() {
        let model = model_with(50, 30, 0);
        assert_eq!(model.clinics().len(), CLINIC_NAMES.len());
    }

    #[test]
    fn new_model_starts_at_day_zero() {
        let model = model_with(12, 30, 0);
        let state = model.get_state();
        assert_eq!(state.day, 0);
        assert_eq!(state.total_cases, 0);
        assert!(!state.outbreak_active);
        assert_eq!(state.outbreak_epicenter, None);
        assert!(state.daily_cases_history.is_empty());
        assert!(state.alerts_history.is_empty());
    }

    #[test]
    fn empty_network_steps_quietly() {
        let mut model = model_with(0, 100, 0);
        assert!(model.clinics().is_empty());
        for _ in 0..50 {
            model.step();
            assert_eq!(model.daily_cases(), 0);
            assert!(model.active_alerts().is_empty());
            assert!(!model.outbreak_active());
        }
        assert!(!model.trigger_outbreak());
        assert_eq!(model.daily_cases_history(), vec![0; 50].as_slice());
    }

    #[test]
    fn certain_trigger_starts_outbreak() {
        let mut model = model_with(12, 100, 3);
        assert!(model.trigger_outbreak());
        assert!(model.outbreak_active());
        let epicenter = model.outbreak_epicenter().unwrap().id();
        assert!(epicenter < 12);

        // A second trigger while active is a no-op.
        for _ in 0..10 {
            assert!(!model.trigger_outbreak());
            assert_eq!(model.outbreak_epicenter().unwrap().id(), epicenter);
        }
    }

    #[test]
    fn impossible_trigger_never_starts_outbreak() {
        let mut model = model_with(12, 0, 3);
        for _ in 0..100 {
            assert!(!model.trigger_outbreak());
        }
        for _ in 0..200 {
            model.step();
            assert!(!model.outbreak_active());
        }
    }

    #[test]
    fn step_aggregates_and_records_history() {
        let mut model = model_with(12, 30, 17);
        let mut running_total = 0;
        for day in 1..=40 {
            model.step();
            let clinic_sum: u64 = model
                .clinics()
                .iter()
                .map(|clinic| u64::from(clinic.daily_cases()))
                .sum();
            running_total += clinic_sum;

            assert_eq!(model.current_day(), day);
            assert_eq!(model.daily_cases(), clinic_sum);
            assert_eq!(model.total_cases(), running_total);
            assert_eq!(model.daily_cases_history().len(), day as usize);
            assert_eq!(*model.daily_cases_history().last().unwrap(), clinic_sum);
            assert_eq!(
                *model.alerts_history().last().unwrap(),
                model.active_alerts().len()
            );
            assert_eq!(model.outbreak_active(), model.outbreak_epicenter().is_some());
        }
        assert_eq!(model.collector().model_rows().len(), 40);
        assert_eq!(model.collector().clinic_rows().len(), 40 * 12);
    }

    #[test]
    fn outbreaks_start_and_end_over_time() {
        let mut model = model_with(12, 100, 99);
        let mut saw_active = false;
        let mut saw_end = false;
        let mut was_active = false;
        for _ in 0..500 {
            model.step();
            saw_active |= model.outbreak_active();
            saw_end |= was_active && !model.outbreak_active();
            was_active = model.outbreak_active();
        }
        assert!(saw_active);
        assert!(saw_end);
    }

    #[test]
    fn active_alerts_are_only_todays() {
        let mut model = model_with(12, 100, 8);
        model.trigger_outbreak();
        model.step();
        let first = model.active_alerts().len();
        model.step();
        assert_eq!(model.alerts_history().len(), 2);
        assert_eq!(model.alerts_history()[0], first);
        assert_eq!(model.alerts_history()[1], model.active_alerts().len());
    }

    #[test]
    fn state_reads_are_idempotent() {
        let mut model = model_with(12, 30, 4);
        for _ in 0..10 {
            model.step();
        }
        assert_eq!(model.get_state(), model.get_state());
    }

    #[test]
    fn same_seed_same_run() {
        let mut a = model_with(12, 60, 2024);
        let mut b = model_with(12, 60, 2024);
        for _ in 0..60 {
            a.step();
            b.step();
            assert_eq!(a.get_state(), b.get_state());
        }
        assert_eq!(a.seed(), 2024);
    }
}
