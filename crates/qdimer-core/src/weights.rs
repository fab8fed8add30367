//! Gate angles from physical parameters.
//!
//! Each time slice of a [`PhysicalParameterSet`] becomes one row of five
//! angles:
//!
//! | Column | Angle |
//! |--------|-------|
//! | 0 | `time_scale * coupling` |
//! | 1 | `asin(tunneling_a / norm_a)` |
//! | 2 | `asin(tunneling_b / norm_b)` |
//! | 3 | `time_scale * norm_a` |
//! | 4 | `time_scale * norm_b` |
//!
//! where `norm_x = sqrt(tunneling_x² + bias_x²)` and
//! `time_scale = time_chunks * time_interval * π`.

use std::f64::consts::PI;
use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::params::{PhysicalParameterSet, TIME_CHUNKS};

/// Default slice length in units where the total evolution is `0.79 π`.
pub const DEFAULT_TIME_INTERVAL: f64 = 1.580 / (8.0 * PI);

/// Discretization of the evolution into time slices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Number of slices; every parameter sequence must have this length.
    #[serde(default = "default_time_chunks")]
    pub time_chunks: usize,
    /// Length of one slice.
    #[serde(default = "default_time_interval")]
    pub time_interval: f64,
}

fn default_time_chunks() -> usize {
    TIME_CHUNKS
}

fn default_time_interval() -> f64 {
    DEFAULT_TIME_INTERVAL
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            time_chunks: default_time_chunks(),
            time_interval: default_time_interval(),
        }
    }
}

impl EvolutionConfig {
    /// `time_chunks * time_interval * π`.
    pub fn time_scale(&self) -> f64 {
        self.time_chunks as f64 * self.time_interval * PI
    }
}

/// Which bias enters the site-A norm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormVariant {
    /// `norm_a = sqrt(tunneling_a² + bias_a²)`.
    #[default]
    OwnBias,
    /// `norm_a = sqrt(tunneling_a² + bias_b²)`.
    CrossBias,
}

impl fmt::Display for NormVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormVariant::OwnBias => write!(f, "own-bias"),
            NormVariant::CrossBias => write!(f, "cross-bias"),
        }
    }
}

/// One row of gate angles.
pub type WeightRow = [f64; 5];

/// `time_chunks` rows of five gate angles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightMatrix {
    rows: Vec<WeightRow>,
}

impl WeightMatrix {
    /// Number of time slices.
    pub fn time_chunks(&self) -> usize {
        self.rows.len()
    }

    /// Rows in slice order.
    pub fn rows(&self) -> &[WeightRow] {
        &self.rows
    }

    /// Iterate over rows in slice order.
    pub fn iter(&self) -> impl Iterator<Item = &WeightRow> {
        self.rows.iter()
    }
}

impl Index<usize> for WeightMatrix {
    type Output = WeightRow;

    fn index(&self, index: usize) -> &Self::Output {
        &self.rows[index]
    }
}

/// Derive the weight matrix for a parameter set.
///
/// Fails if the sequences do not all have `time_chunks` entries, if the
/// slice length is not a finite positive number, or if a site norm is zero
/// or not finite.
pub fn derive_weights(
    params: &PhysicalParameterSet,
    config: &EvolutionConfig,
    variant: NormVariant,
) -> CoreResult<WeightMatrix> {
    validate(params, config)?;

    if variant == NormVariant::CrossBias && !params.has_symmetric_bias() {
        warn!(
            "cross-bias norm differs from own-bias norm for this parameter set; \
             site-A angles use bias_b"
        );
    }

    let time_scale = config.time_scale();
    let mut rows = Vec::with_capacity(config.time_chunks);

    for i in 0..config.time_chunks {
        let bias_for_a = match variant {
            NormVariant::OwnBias => params.bias_a[i],
            NormVariant::CrossBias => params.bias_b[i],
        };
        let norm_a = site_norm(params.tunneling_a[i], bias_for_a, i, 'a')?;
        let norm_b = site_norm(params.tunneling_b[i], params.bias_b[i], i, 'b')?;

        rows.push([
            time_scale * params.coupling[i],
            unit_asin(params.tunneling_a[i] / norm_a),
            unit_asin(params.tunneling_b[i] / norm_b),
            time_scale * norm_a,
            time_scale * norm_b,
        ]);
    }

    debug!(time_chunks = rows.len(), time_scale, %variant, "derived weights");
    Ok(WeightMatrix { rows })
}

/// `asin` of a ratio that may overshoot ±1 by rounding.
fn unit_asin(ratio: f64) -> f64 {
    ratio.clamp(-1.0, 1.0).asin()
}

fn site_norm(tunneling: f64, bias: f64, slice: usize, site: char) -> CoreResult<f64> {
    let norm = tunneling.hypot(bias);
    if norm == 0.0 || !norm.is_finite() {
        return Err(CoreError::InvalidParameters(format!(
            "norm of site {site} in slice {slice} is {norm}"
        )));
    }
    Ok(norm)
}

fn validate(params: &PhysicalParameterSet, config: &EvolutionConfig) -> CoreResult<()> {
    if config.time_chunks == 0 {
        return Err(CoreError::InvalidParameters(
            "time_chunks must be greater than 0".into(),
        ));
    }
    if !config.time_interval.is_finite() || config.time_interval <= 0.0 {
        return Err(CoreError::InvalidParameters(format!(
            "time_interval must be finite and positive, got {}",
            config.time_interval
        )));
    }

    let sequences = [
        ("tunneling_a", &params.tunneling_a),
        ("tunneling_b", &params.tunneling_b),
        ("bias_a", &params.bias_a),
        ("bias_b", &params.bias_b),
        ("coupling", &params.coupling),
    ];
    for (name, values) in sequences {
        if values.len() != config.time_chunks {
            return Err(CoreError::InvalidParameters(format!(
                "{name} has {} entries, expected {}",
                values.len(),
                config.time_chunks
            )));
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite()) {
            return Err(CoreError::InvalidParameters(format!(
                "{name} contains non-finite value {v}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOLDEN: [(f64, f64, f64); 4] = [
        (0.030178, 1.5334878409455313, 1.967363050241855),
        (0.10079610000000001, 1.5240168926727151, 1.955809573946014),
        (0.0923668, 1.532410636223711, 1.9647553176769876),
        (0.0301622, 1.5374238163703504, 1.9720690688536904),
    ];

    fn baseline_weights() -> WeightMatrix {
        derive_weights(
            &PhysicalParameterSet::baseline(),
            &EvolutionConfig::default(),
            NormVariant::OwnBias,
        )
        .unwrap()
    }

    #[test]
    fn test_time_scale() {
        assert!((EvolutionConfig::default().time_scale() - 0.79).abs() < 1e-12);
    }

    #[test]
    fn test_baseline_golden_values() {
        let weights = baseline_weights();
        assert_eq!(weights.time_chunks(), 4);
        for (i, &(coupling, angle, norm)) in GOLDEN.iter().enumerate() {
            let row = weights[i];
            assert!((row[0] - coupling).abs() < 1e-9, "slice {i} col 0: {}", row[0]);
            assert!((row[1] - angle).abs() < 1e-9, "slice {i} col 1: {}", row[1]);
            assert!((row[2] - angle).abs() < 1e-9, "slice {i} col 2: {}", row[2]);
            assert!((row[3] - norm).abs() < 1e-9, "slice {i} col 3: {}", row[3]);
            assert!((row[4] - norm).abs() < 1e-9, "slice {i} col 4: {}", row[4]);
        }
    }

    #[test]
    fn test_cross_bias_identical_for_symmetric_sites() {
        let params = PhysicalParameterSet::baseline();
        let config = EvolutionConfig::default();
        let own = derive_weights(&params, &config, NormVariant::OwnBias).unwrap();
        let cross = derive_weights(&params, &config, NormVariant::CrossBias).unwrap();
        assert_eq!(own, cross);
    }

    #[test]
    fn test_cross_bias_differs_for_noise() {
        let params = PhysicalParameterSet::noise();
        let config = EvolutionConfig::default();
        let own = derive_weights(&params, &config, NormVariant::OwnBias).unwrap();
        let cross = derive_weights(&params, &config, NormVariant::CrossBias).unwrap();
        assert_ne!(own[0][3], cross[0][3]);
        assert_eq!(own[0][4], cross[0][4]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut params = PhysicalParameterSet::baseline();
        params.coupling.pop();
        let err = derive_weights(&params, &EvolutionConfig::default(), NormVariant::OwnBias)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidParameters(msg) if msg.contains("coupling")));
    }

    #[test]
    fn test_zero_norm_rejected() {
        let mut params = PhysicalParameterSet::baseline();
        params.tunneling_b[2] = 0.0;
        params.bias_b[2] = 0.0;
        let err = derive_weights(&params, &EvolutionConfig::default(), NormVariant::OwnBias)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidParameters(_)));
    }

    #[test]
    fn test_bad_evolution_config_rejected() {
        let params = PhysicalParameterSet::baseline();
        for config in [
            EvolutionConfig {
                time_chunks: 0,
                ..EvolutionConfig::default()
            },
            EvolutionConfig {
                time_interval: -1.0,
                ..EvolutionConfig::default()
            },
            EvolutionConfig {
                time_interval: f64::NAN,
                ..EvolutionConfig::default()
            },
        ] {
            assert!(derive_weights(&params, &config, NormVariant::OwnBias).is_err());
        }
    }

    #[test]
    fn test_norm_variant_serde_names() {
        let json = serde_yaml_ng::to_string(&NormVariant::CrossBias).unwrap();
        assert_eq!(json.trim(), "cross-bias");
        assert_eq!(NormVariant::OwnBias.to_string(), "own-bias");
    }
}
