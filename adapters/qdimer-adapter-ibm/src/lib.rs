//! IBM Quantum adapter for qdimer.
//!
//! Submits circuits as OpenQASM 3 to the Runtime Sampler and converts the
//! returned samples into [`qdimer_hal::Counts`]. Each [`IbmBackend`] is
//! bound to one device; [`IbmBackend::list_devices`] discovers what a
//! token can reach, including each device's queue depth.

mod api;
mod backend;
mod error;

pub use api::{BackendInfo, BackendStatus, DEFAULT_ENDPOINT, IbmClient};
pub use backend::IbmBackend;
pub use error::{IbmError, IbmResult};
