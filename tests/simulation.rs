use sentinel::alerts::{evaluate_rules, WINDOW_DAYS};
use sentinel::clinic::{CaseHistory, CLINIC_NAMES};
use sentinel::hashing::HashSet;
use sentinel::prelude::*;

fn seeded(num_clinics: usize, outbreak_probability: u32, seed: u64) -> OutbreakModel {
    OutbreakModel::new(ModelConfig {
        num_clinics,
        outbreak_probability,
        seed: Some(seed),
        ..ModelConfig::default()
    })
    .unwrap()
}

#[test]
fn clinic_counts_stay_consistent_over_a_long_run() {
    let mut model = seeded(12, 80, 31);
    let mut totals = vec![0u64; 12];
    let mut fever_cough: Vec<Vec<u32>> = vec![Vec::new(); 12];

    for _ in 0..365 {
        model.step();
        for clinic in model.clinics() {
            let id = clinic.id();
            assert!(clinic.fever_cough_cases() <= clinic.daily_cases());
            assert!(clinic.severe_cases() <= clinic.daily_cases());

            assert!(clinic.total_cases() >= totals[id]);
            totals[id] += u64::from(clinic.daily_cases());
            assert_eq!(clinic.total_cases(), totals[id]);

            fever_cough[id].push(clinic.fever_cough_cases());
            let window: Vec<u32> = clinic.case_history().iter().copied().collect();
            assert!(window.len() <= WINDOW_DAYS);
            let recent = &fever_cough[id][fever_cough[id].len().saturating_sub(WINDOW_DAYS)..];
            assert_eq!(window, recent);
        }
        assert_eq!(model.outbreak_active(), model.outbreak_epicenter().is_some());
        let state = model.get_state();
        assert_eq!(state.outbreak_active, state.outbreak_epicenter.is_some());
    }
}

#[test]
fn positions_are_distinct_for_every_network_size() {
    for num_clinics in 0..=CLINIC_NAMES.len() {
        for seed in 0..10 {
            let model = seeded(num_clinics, 30, seed);
            assert_eq!(model.clinics().len(), num_clinics);
            let cells: HashSet<Position> =
                model.clinics().iter().map(ClinicAgent::position).collect();
            assert_eq!(cells.len(), num_clinics);
        }
    }
}

#[test]
fn snapshot_matches_model_and_does_not_alias() {
    let mut model = seeded(12, 50, 77);
    for _ in 0..20 {
        model.step();
    }
    let before = model.get_state();
    assert_eq!(before, model.get_state());
    assert_eq!(before.day, 20);
    assert_eq!(before.daily_cases_history.len(), 20);
    assert_eq!(before.alerts_history.len(), 20);
    assert_eq!(before.active_alerts.len(), *before.alerts_history.last().unwrap());
    assert_eq!(
        before.daily_cases,
        before.clinics.iter().map(|c| u64::from(c.daily_cases)).sum::<u64>()
    );
    for clinic in &before.clinics {
        assert_eq!(clinic.alert_level, clinic.status.alert_level());
    }

    model.step();
    assert_eq!(before.day, 20);
    assert_eq!(before.daily_cases_history.len(), 20);
    assert_eq!(model.get_state().day, 21);
}

#[test]
fn snapshot_json_shape() {
    let mut model = seeded(3, 30, 5);
    model.step();
    let json = serde_json::to_value(model.get_state()).unwrap();
    for key in [
        "day",
        "total_cases",
        "daily_cases",
        "active_alerts",
        "outbreak_active",
        "outbreak_epicenter",
        "clinics",
        "daily_cases_history",
        "alerts_history",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    let clinic = &json["clinics"][0];
    assert_eq!(clinic["id"], 0);
    assert_eq!(clinic["name"], "City General Hospital");
    assert_eq!(clinic["position"].as_array().unwrap().len(), 2);
    for key in [
        "daily_cases",
        "total_cases",
        "fever_cough_cases",
        "severe_cases",
        "status",
        "alert_level",
    ] {
        assert!(clinic.get(key).is_some(), "missing clinic {key}");
    }
}

#[test]
fn rule_examples() {
    let mut history = CaseHistory::default();
    for count in [8, 8, 8, 8, 8, 8, 12] {
        history.push(count);
    }
    let outcome = evaluate_rules("Westfield Hospital", 12, &history);
    let kinds: Vec<AlertType> = outcome.alerts.iter().map(|a| a.alert_type).collect();
    assert_eq!(kinds, vec![AlertType::HighCases, AlertType::GeographicCluster]);
    assert_eq!(outcome.status, ClinicStatus::Alert);

    let mut history = CaseHistory::default();
    for _ in 0..7 {
        history.push(5);
    }
    let outcome = evaluate_rules("Westfield Hospital", 11, &history);
    let kinds: Vec<AlertType> = outcome.alerts.iter().map(|a| a.alert_type).collect();
    assert_eq!(
        kinds,
        vec![AlertType::GeographicCluster, AlertType::RapidIncrease]
    );
    assert_eq!(outcome.status.alert_level(), 2);
}

#[test]
fn trigger_while_active_changes_nothing() {
    let mut model = seeded(12, 100, 6);
    assert!(model.trigger_outbreak());
    let epicenter = model.get_state().outbreak_epicenter;
    assert!(epicenter.is_some());
    for _ in 0..20 {
        assert!(!model.trigger_outbreak());
        assert_eq!(model.get_state().outbreak_epicenter, epicenter);
    }
}

#[test]
fn empty_model_step() {
    let mut model = seeded(0, 30, 0);
    model.step();
    let state = model.get_state();
    assert!(state.clinics.is_empty());
    assert_eq!(state.daily_cases, 0);
    assert!(state.active_alerts.is_empty());
    assert_eq!(state.alerts_history, vec![0]);
}

#[test]
fn handle_serializes_access() {
    let handle = SimulationHandle::new();
    assert!(matches!(handle.state(), Err(SentinelError::NotInitialized)));
    handle
        .initialize(ModelConfig {
            seed: Some(1),
            ..ModelConfig::default()
        })
        .unwrap();
    let stepped = handle.step().unwrap();
    assert_eq!(handle.state().unwrap(), stepped);
}
