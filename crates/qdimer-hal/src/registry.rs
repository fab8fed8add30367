//! Backend registry for managing available backends.
//!
//! The [`BackendRegistry`] is the single place the runner looks up a
//! backend by name. The local simulator is always registered; remote
//! devices are added once credentials have been resolved.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::backend::{Backend, BackendConfig};
use crate::error::{HalError, HalResult};

/// Name that resolves to the remote device with the shortest queue.
pub const LEAST_BUSY: &str = "least_busy";

/// Factory function type for registered backends.
type BuiltinFactory = Box<dyn Fn(BackendConfig) -> HalResult<Box<dyn Backend>> + Send + Sync>;

/// Central registry for backends.
pub struct BackendRegistry {
    builtins: FxHashMap<String, BuiltinFactory>,
}

impl BackendRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            builtins: FxHashMap::default(),
        }
    }

    /// Register a backend factory with a custom constructor.
    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(BackendConfig) -> HalResult<Box<dyn Backend>> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!("Registering factory backend: {}", name);
        self.builtins.insert(name, Box::new(factory));
    }

    /// Create a backend by name.
    pub fn create(&self, name: &str, config: BackendConfig) -> HalResult<Box<dyn Backend>> {
        match self.builtins.get(name) {
            Some(factory) => factory(config),
            None => Err(HalError::BackendUnavailable(format!(
                "No backend registered with name '{name}'"
            ))),
        }
    }

    /// List all registered backend names, sorted.
    pub fn available_backends(&self) -> Vec<String> {
        let mut names: Vec<_> = self.builtins.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a backend is registered by name.
    pub fn has_backend(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    /// Create the available backend with the fewest queued jobs.
    ///
    /// Only names accepted by `filter` are considered. Backends that fail to
    /// build or report themselves offline are skipped; ties go to the
    /// alphabetically first name.
    pub async fn least_busy(&self, filter: impl Fn(&str) -> bool) -> HalResult<Box<dyn Backend>> {
        let mut best: Option<(u32, Box<dyn Backend>)> = None;

        for name in self.available_backends() {
            if !filter(&name) {
                continue;
            }
            let backend = match self.create(&name, BackendConfig::new(&name)) {
                Ok(backend) => backend,
                Err(e) => {
                    warn!("Skipping backend '{}': {}", name, e);
                    continue;
                }
            };
            let availability = match backend.availability().await {
                Ok(a) => a,
                Err(e) => {
                    warn!("Skipping backend '{}': {}", name, e);
                    continue;
                }
            };
            if !availability.is_available {
                debug!("Backend '{}' is offline", name);
                continue;
            }
            let depth = availability.queue_depth.unwrap_or(u32::MAX);
            debug!("Backend '{}' has {} pending jobs", name, depth);
            if best.as_ref().is_none_or(|(d, _)| depth < *d) {
                best = Some((depth, backend));
            }
        }

        best.map(|(_, backend)| backend).ok_or_else(|| {
            HalError::BackendUnavailable("no operational backend accepts jobs".into())
        })
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
