//! Two-bit outcome histograms.

use std::fmt;
use std::ops::{Add, AddAssign};

use qdimer_hal::Counts;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// The four two-bit outcomes, most significant bit first.
pub const OUTCOMES: [&str; 4] = ["00", "01", "10", "11"];

/// Column order of the outcome buckets in the results file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BitOrder {
    /// `00, 01, 10, 11`.
    Ascending,
    /// `00, 10, 01, 11`.
    #[default]
    Swapped,
}

impl BitOrder {
    /// Outcome labels in column order.
    pub fn labels(&self) -> [&'static str; 4] {
        match self {
            BitOrder::Ascending => ["00", "01", "10", "11"],
            BitOrder::Swapped => ["00", "10", "01", "11"],
        }
    }
}

impl fmt::Display for BitOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitOrder::Ascending => write!(f, "ascending"),
            BitOrder::Swapped => write!(f, "swapped"),
        }
    }
}

/// Counts of the four two-bit outcomes. Outcomes never observed count zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeHistogram {
    buckets: [u64; 4],
}

impl OutcomeHistogram {
    /// Empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Histogram from counts of `00`, `01`, `10`, `11` in that order.
    pub fn from_buckets(buckets: [u64; 4]) -> Self {
        Self { buckets }
    }

    /// Fold backend counts into a histogram.
    ///
    /// Any outcome with a non-zero count that is not a two-bit string is an
    /// error.
    pub fn from_counts(counts: &Counts) -> CoreResult<Self> {
        let mut histogram = Self::new();
        for (outcome, &count) in counts.iter() {
            if count == 0 {
                continue;
            }
            let index = bucket_index(outcome).ok_or_else(|| CoreError::UnexpectedOutcome {
                outcome: outcome.clone(),
            })?;
            histogram.buckets[index] += count;
        }
        Ok(histogram)
    }

    /// Count for one outcome label, zero for unknown labels.
    pub fn get(&self, outcome: &str) -> u64 {
        bucket_index(outcome).map_or(0, |i| self.buckets[i])
    }

    /// Counts in the given column order.
    pub fn ordered(&self, order: BitOrder) -> [u64; 4] {
        order.labels().map(|label| self.get(label))
    }

    /// Total number of shots.
    pub fn total(&self) -> u64 {
        self.buckets.iter().sum()
    }

    /// Add another histogram bucket by bucket.
    pub fn merge(&mut self, other: &OutcomeHistogram) {
        for (mine, theirs) in self.buckets.iter_mut().zip(other.buckets) {
            *mine += theirs;
        }
    }

    /// `|n00 + n11 - n01 - n10| / total`, zero for an empty histogram.
    pub fn entanglement(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let [n00, n01, n10, n11] = self.buckets.map(|n| n as f64);
        ((n00 + n11) - (n01 + n10)).abs() / total as f64
    }
}

impl Add for OutcomeHistogram {
    type Output = OutcomeHistogram;

    fn add(mut self, rhs: OutcomeHistogram) -> Self::Output {
        self.merge(&rhs);
        self
    }
}

impl AddAssign for OutcomeHistogram {
    fn add_assign(&mut self, rhs: OutcomeHistogram) {
        self.merge(&rhs);
    }
}

fn bucket_index(outcome: &str) -> Option<usize> {
    let trimmed: String = outcome.chars().filter(|c| !c.is_whitespace()).collect();
    OUTCOMES.iter().position(|&label| label == trimmed)
}
