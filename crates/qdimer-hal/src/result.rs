//! Measurement results.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Measurement counts keyed by bitstring.
///
/// Bitstrings are written most significant bit first: the rightmost
/// character is classical bit 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    counts: FxHashMap<String, u64>,
}

impl Counts {
    /// Create empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build counts from `(bitstring, count)` pairs. Repeated keys accumulate.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, u64)>) -> Self {
        let mut counts = Self::new();
        for (bitstring, count) in pairs {
            counts.insert(bitstring, count);
        }
        counts
    }

    /// Add `count` observations of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Number of observations of `bitstring`, zero if it never occurred.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Iterate over `(bitstring, count)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.counts.iter()
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Outcomes ordered by descending count, ties broken by bitstring.
    pub fn sorted(&self) -> Vec<(&String, &u64)> {
        let mut entries: Vec<_> = self.counts.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// The most frequent outcome.
    pub fn most_frequent(&self) -> Option<(&String, &u64)> {
        self.sorted().into_iter().next()
    }

    /// Merge another set of counts into this one.
    pub fn merge(&mut self, other: &Counts) {
        for (bitstring, count) in other.iter() {
            self.insert(bitstring.clone(), *count);
        }
    }
}

/// Result of executing a circuit on a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measurement counts.
    pub counts: Counts,
    /// Number of shots executed.
    pub shots: u32,
    /// Execution time in milliseconds, when the backend reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    /// Backend-specific metadata.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ExecutionResult {
    /// Create a new execution result.
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            shots,
            execution_time_ms: None,
            metadata: serde_json::Map::new(),
        }
    }

    /// Attach the execution time.
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Empirical probability of `bitstring`.
    pub fn probability(&self, bitstring: &str) -> f64 {
        let total = self.counts.total_shots();
        if total == 0 {
            return 0.0;
        }
        self.counts.get(bitstring) as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate() {
        let mut counts = Counts::new();
        counts.insert("00", 10);
        counts.insert("00", 5);
        counts.insert("11", 3);
        assert_eq!(counts.get("00"), 15);
        assert_eq!(counts.get("01"), 0);
        assert_eq!(counts.total_shots(), 18);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_sorted_and_most_frequent() {
        let counts = Counts::from_pairs([("00", 485), ("11", 515), ("01", 0)]);
        let sorted = counts.sorted();
        assert_eq!(sorted[0].0, "11");
        assert_eq!(sorted[1].0, "00");
        assert_eq!(counts.most_frequent().map(|(k, _)| k.as_str()), Some("11"));
    }

    #[test]
    fn test_merge() {
        let mut a = Counts::from_pairs([("00", 1), ("11", 2)]);
        let b = Counts::from_pairs([("11", 3), ("10", 4)]);
        a.merge(&b);
        assert_eq!(a.get("11"), 5);
        assert_eq!(a.get("10"), 4);
        assert_eq!(a.total_shots(), 10);
    }

    #[test]
    fn test_probability() {
        let result = ExecutionResult::new(Counts::from_pairs([("00", 250), ("11", 750)]), 1000)
            .with_execution_time(12);
        assert!((result.probability("11") - 0.75).abs() < 1e-12);
        assert_eq!(result.probability("01"), 0.0);
        assert_eq!(result.execution_time_ms, Some(12));
    }

    #[test]
    fn test_empty_probability() {
        let result = ExecutionResult::new(Counts::new(), 0);
        assert_eq!(result.probability("00"), 0.0);
    }
}
