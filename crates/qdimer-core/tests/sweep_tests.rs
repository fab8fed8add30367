//! Full sweeps writing the results log.

mod common;

use common::RecordingBackend;
use qdimer_adapter_sim::SimulatorBackend;
use qdimer_core::{BitOrder, CsvLog, Experiment, RunConfig, StateVariant};

fn sweep_config(path: &std::path::Path, delta: u64, start: u64, end: u64) -> RunConfig {
    let mut config = RunConfig::default();
    config.output.filename = path.to_path_buf();
    config.sweep.delta = Some(delta);
    config.sweep.start = start;
    config.sweep.end = end;
    config
}

#[tokio::test]
async fn test_row_count_is_epochs_times_states() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.csv");
    let config = sweep_config(&path, 100, 1, 3);

    let experiment = Experiment::from_config(&config).unwrap();
    let mut log = CsvLog::open(&path, config.bit_order).unwrap();
    let backend = RecordingBackend::new();

    let mut seen = 0;
    let records = experiment
        .run(&backend, &mut log, |_| seen += 1)
        .await
        .unwrap();

    assert_eq!(records.len(), 3 * StateVariant::ALL.len());
    assert_eq!(seen, records.len());
    assert_eq!(experiment.total_runs(), records.len());

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.len(), 1 + 12);
    assert_eq!(lines[0], "backend, noise, decoherence, shots, state, 00, 10, 01, 11");
    assert_eq!(lines.iter().filter(|l| l.starts_with("backend,")).count(), 1);
    assert!(lines[1].starts_with("recording, false, false, 100, Bell, "));
    assert!(lines[12].starts_with("recording, false, false, 300, P, "));

    for (i, record) in records.iter().enumerate() {
        let shots = 100 * (i as u64 / 4 + 1);
        assert_eq!(record.shots, shots);
        assert_eq!(record.histogram.total(), shots);
    }
}

#[tokio::test]
async fn test_second_run_appends_without_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.csv");
    let mut config = sweep_config(&path, 10, 1, 1);
    config.bit_order = BitOrder::Ascending;

    let experiment = Experiment::from_config(&config).unwrap();
    let backend = SimulatorBackend::with_seed(3);
    for _ in 0..2 {
        let mut log = CsvLog::open(&path, config.bit_order).unwrap();
        experiment.run(&backend, &mut log, |_| {}).await.unwrap();
    }

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 1 + 8);
    assert!(contents.starts_with("backend, noise, decoherence, shots, state, 00, 01, 10, 11\n"));
}

#[tokio::test]
async fn test_bell_setup_only_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bell.csv");
    let mut config = sweep_config(&path, 1000, 1, 1);
    config.setup_only = true;
    config.seed = Some(2024);

    let experiment = Experiment::from_config(&config).unwrap();
    let mut log = CsvLog::open(&path, config.bit_order).unwrap();
    let backend = SimulatorBackend::with_seed(2024);
    let records = experiment.run(&backend, &mut log, |_| {}).await.unwrap();

    let bell = records.iter().find(|r| r.state == StateVariant::Bell).unwrap();
    assert_eq!(bell.shots, 1000);
    let correlated = (bell.histogram.get("00") + bell.histogram.get("11")) as f64 / 1000.0;
    assert!((correlated - 1.0).abs() <= 0.05, "correlated fraction {correlated}");
    assert!((bell.histogram.entanglement() - 1.0).abs() <= 0.05);
}

#[tokio::test]
async fn test_p_state_bit_convention() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("p.csv");
    let mut config = sweep_config(&path, 20_000, 1, 1);
    config.setup_only = true;

    let experiment = Experiment::from_config(&config).unwrap();
    let mut log = CsvLog::open(&path, config.bit_order).unwrap();
    let backend = SimulatorBackend::with_seed(11);
    let records = experiment.run(&backend, &mut log, |_| {}).await.unwrap();

    // P puts most weight on qubit 0 set, qubit 1 clear: "01" with clbit 0 rightmost.
    let p = records.iter().find(|r| r.state == StateVariant::P).unwrap();
    let p01 = p.histogram.get("01") as f64 / 20_000.0;
    let p10 = p.histogram.get("10") as f64 / 20_000.0;
    assert!((p01 - 0.6933).abs() < 0.02, "p01 = {p01}");
    assert!((p10 - 0.0280).abs() < 0.02, "p10 = {p10}");

    let c = records.iter().find(|r| r.state == StateVariant::C).unwrap();
    assert_eq!(c.histogram.get("00") + c.histogram.get("10"), 0);
}

#[tokio::test]
async fn test_full_evolution_on_simulator() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("evolved.csv");
    let config = sweep_config(&path, 20_000, 1, 1);

    let experiment = Experiment::from_config(&config).unwrap();
    let mut log = CsvLog::open(&path, config.bit_order).unwrap();
    let backend = SimulatorBackend::with_seed(5);
    let records = experiment.run(&backend, &mut log, |_| {}).await.unwrap();

    let entanglement = |state: StateVariant| {
        records
            .iter()
            .find(|r| r.state == state)
            .map(|r| r.histogram.entanglement())
            .unwrap()
    };
    // The evolution carries the Bell pair into the odd-parity sector.
    let bell = records.iter().find(|r| r.state == StateVariant::Bell).unwrap();
    assert!(bell.histogram.get("01") + bell.histogram.get("10") > 19_000);
    assert!(entanglement(StateVariant::Bell) > 0.95);
    assert!(entanglement(StateVariant::Flat) < 0.05);
    assert!(entanglement(StateVariant::C) < 0.05);
}
