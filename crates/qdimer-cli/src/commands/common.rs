//! Shared helpers for CLI commands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use tracing::{info, warn};

use qdimer_adapter_ibm::{DEFAULT_ENDPOINT, IbmBackend, IbmClient};
use qdimer_adapter_sim::SimulatorBackend;
use qdimer_core::{OutcomeHistogram, RunConfig, RunRecord};
use qdimer_hal::{
    Backend, BackendConfig, BackendFactory, BackendRegistry, ChainTokenProvider, LEAST_BUSY,
    TokenProvider,
};

use crate::cli::Cli;

/// Name of the local simulator in the registry.
pub const SIMULATOR: &str = "simulator";

/// Config file picked up when `--config` is not given.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("qdimer").join("config.yaml"))
        .filter(|path| path.is_file())
}

/// Defaults, config file, environment, then flags; validated.
pub fn load_config(cli: &Cli) -> Result<RunConfig> {
    let path = cli.config.clone().or_else(default_config_path);
    let mut config = RunConfig::load(path.as_deref()).with_context(|| match &path {
        Some(p) => format!("Failed to load config from {}", p.display()),
        None => "Failed to read configuration from the environment".to_string(),
    })?;
    cli.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Backends this invocation may use.
pub struct BackendSet {
    registry: BackendRegistry,
    has_remote: bool,
}

impl BackendSet {
    /// Register the simulator and, when `remote` is set, every device the
    /// credential can see.
    pub async fn discover(config: &RunConfig, remote: bool) -> Result<Self> {
        let mut registry = BackendRegistry::new();
        let seed = config.seed;
        registry.register_factory(SIMULATOR, move |backend_config: BackendConfig| {
            let backend_config = match seed {
                Some(seed) => backend_config.with_extra("seed", serde_json::json!(seed)),
                None => backend_config,
            };
            Ok(Box::new(SimulatorBackend::from_config(backend_config)?) as Box<dyn Backend>)
        });

        let mut has_remote = false;
        if remote {
            let token = ChainTokenProvider::ibm(&config.token_file)
                .get_token()
                .await
                .context("No IBM Quantum credential found")?;
            let client = Arc::new(IbmClient::new(DEFAULT_ENDPOINT, &token)?);
            let devices = IbmBackend::list_devices(&client)
                .await
                .context("Failed to list IBM Quantum devices")?;
            info!(count = devices.len(), "registered remote devices");

            for device in devices {
                if device.name == SIMULATOR {
                    warn!("Skipping remote device shadowing the local simulator");
                    continue;
                }
                let client = Arc::clone(&client);
                registry.register_factory(device.name.clone(), move |_| {
                    Ok(Box::new(IbmBackend::from_info(Arc::clone(&client), &device))
                        as Box<dyn Backend>)
                });
                has_remote = true;
            }
        }

        Ok(Self {
            registry,
            has_remote,
        })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.registry.available_backends()
    }

    /// Build a backend by name.
    ///
    /// [`LEAST_BUSY`] picks the operational device with the shortest queue,
    /// preferring remote devices when any are registered.
    pub async fn resolve(&self, name: &str) -> Result<Box<dyn Backend>> {
        if name == LEAST_BUSY {
            let has_remote = self.has_remote;
            let backend = self
                .registry
                .least_busy(|candidate| !has_remote || candidate != SIMULATOR)
                .await?;
            return Ok(backend);
        }
        if !self.registry.has_backend(name) {
            anyhow::bail!(
                "Unknown backend: '{name}'. Available: {}",
                self.names().join(", ")
            );
        }
        Ok(self.registry.create(name, BackendConfig::new(name))?)
    }
}

/// Print one record with its entanglement next to the state's target.
pub fn print_record(record: &RunRecord) {
    let entanglement = record.histogram.entanglement();
    println!(
        "  {} {:<4} {:>7} shots  entanglement: {}  target: {}",
        style("✓").green().bold(),
        style(record.state).cyan(),
        record.shots,
        style(format!("{entanglement:.6}")).yellow(),
        record.state.target_entanglement()
    );
    print_histogram(&record.histogram);
}

fn print_histogram(histogram: &OutcomeHistogram) {
    let total = histogram.total().max(1) as f64;
    for label in ["00", "01", "10", "11"] {
        let count = histogram.get(label);
        let prob = count as f64 / total * 100.0;
        let bar: String = "█".repeat((prob / 4.0).round() as usize);
        println!(
            "      {}: {:>7} ({:>6.2}%) {}",
            style(label).cyan(),
            count,
            prob,
            style(bar).green()
        );
    }
}
