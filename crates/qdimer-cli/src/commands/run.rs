//! Sweep execution.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use qdimer_core::{CsvLog, Experiment, RunConfig};
use qdimer_ir::qasm;

use super::common::{BackendSet, print_record};

/// Run every state for every epoch on `backend_name` and log the results.
pub async fn execute(
    backends: &BackendSet,
    backend_name: &str,
    config: &RunConfig,
    emit_qasm: Option<&Path>,
) -> Result<()> {
    let backend = backends.resolve(backend_name).await?;
    println!(
        "{} backend: {}",
        style("→").cyan().bold(),
        style(backend.name()).yellow()
    );

    let experiment = Experiment::from_config(config)?;
    println!(
        "  {} states × {} epochs, {} parameters{}",
        experiment.circuits().len(),
        experiment.shot_plan().len(),
        parameter_label(config),
        if config.setup_only { ", setup only" } else { "" }
    );

    if let Some(dir) = emit_qasm {
        write_qasm(&experiment, dir)?;
    }

    let mut log = CsvLog::open(&config.output.filename, config.bit_order).with_context(|| {
        format!(
            "Failed to open results file: {}",
            config.output.filename.display()
        )
    })?;

    let spinner = ProgressBar::new(experiment.total_runs() as u64);
    spinner.set_style(
        ProgressStyle::default_spinner().template("{spinner:.cyan} [{pos}/{len}] {msg}")?,
    );
    spinner.set_message(format!("Running on {}...", backend.name()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = experiment
        .run(backend.as_ref(), &mut log, |record| {
            spinner.suspend(|| print_record(record));
            spinner.inc(1);
        })
        .await;
    spinner.finish_and_clear();
    let records = result?;

    println!(
        "\n{} {} rows appended to {}",
        style("✓").green().bold(),
        records.len(),
        style(log.path().display()).cyan()
    );
    Ok(())
}

fn parameter_label(config: &RunConfig) -> &'static str {
    match (config.noise, config.decoherence) {
        (false, false) => "baseline",
        (true, false) => "noise",
        (false, true) => "decoherence",
        (true, true) => "noise+decoherence",
    }
}

fn write_qasm(experiment: &Experiment, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    for (_, circuit) in experiment.circuits() {
        let path = dir.join(format!("{}.qasm", circuit.name()));
        fs::write(&path, qasm::emit(circuit))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  Wrote {}", style(path.display()).cyan());
    }
    Ok(())
}
