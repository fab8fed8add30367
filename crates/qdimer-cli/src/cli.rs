//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use qdimer_core::{BitOrder, NormVariant, RunConfig};

/// qdimer - tunneling-dimer circuits on simulators and quantum devices
#[derive(Debug, Parser)]
#[command(name = "qdimer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Allow remote hardware backends (reads the credential file)
    #[arg(long)]
    pub no_test: bool,

    /// Shots per state when no sweep is given [default: 1024]
    #[arg(long)]
    pub count: Option<u64>,

    /// Sweep: epoch e runs e * delta shots
    #[arg(long)]
    pub delta: Option<u64>,

    /// First sweep epoch [default: 1]
    #[arg(long)]
    pub start: Option<u64>,

    /// Last sweep epoch, inclusive [default: 1]
    #[arg(long)]
    pub end: Option<u64>,

    /// CSV output path [default: results.csv]
    #[arg(long)]
    pub filename: Option<PathBuf>,

    /// Backend to run on; `least_busy` picks the shortest queue
    #[arg(long)]
    pub backend: Option<String>,

    /// Print available backends and exit
    #[arg(long)]
    pub list_backends: bool,

    /// Credential file [default: APItoken.txt]
    #[arg(long)]
    pub token_file: Option<PathBuf>,

    /// Build circuits without the time-evolution gates
    #[arg(long)]
    pub setup_only: bool,

    /// Use the noise parameter set
    #[arg(long)]
    pub noise: bool,

    /// Use the decoherence parameter set
    #[arg(long)]
    pub decoherence: bool,

    /// Bias used in the site-A norm
    #[arg(long, value_enum)]
    pub norm_variant: Option<NormArg>,

    /// Column order of the outcome buckets in the CSV
    #[arg(long, value_enum)]
    pub bit_order: Option<BitOrderArg>,

    /// Seed for the local simulator
    #[arg(long)]
    pub seed: Option<u64>,

    /// YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write each generated circuit as OpenQASM 3 into this directory
    #[arg(long)]
    pub emit_qasm: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NormArg {
    OwnBias,
    CrossBias,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BitOrderArg {
    Ascending,
    Swapped,
}

impl From<NormArg> for NormVariant {
    fn from(arg: NormArg) -> Self {
        match arg {
            NormArg::OwnBias => NormVariant::OwnBias,
            NormArg::CrossBias => NormVariant::CrossBias,
        }
    }
}

impl From<BitOrderArg> for BitOrder {
    fn from(arg: BitOrderArg) -> Self {
        match arg {
            BitOrderArg::Ascending => BitOrder::Ascending,
            BitOrderArg::Swapped => BitOrder::Swapped,
        }
    }
}

impl Cli {
    /// Neither a backend nor a listing was asked for.
    pub fn has_action(&self) -> bool {
        self.list_backends || self.backend.is_some()
    }

    /// Log filter for the `-v` count.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Overlay the flags that were given on `config`.
    pub fn apply(&self, config: &mut RunConfig) {
        if let Some(count) = self.count {
            config.sweep.count = count;
        }
        if let Some(delta) = self.delta {
            config.sweep.delta = Some(delta);
        }
        if let Some(start) = self.start {
            config.sweep.start = start;
        }
        if let Some(end) = self.end {
            config.sweep.end = end;
        }
        if let Some(filename) = &self.filename {
            config.output.filename.clone_from(filename);
        }
        if let Some(token_file) = &self.token_file {
            config.token_file.clone_from(token_file);
        }
        if let Some(variant) = self.norm_variant {
            config.norm_variant = variant.into();
        }
        if let Some(order) = self.bit_order {
            config.bit_order = order.into();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.setup_only |= self.setup_only;
        config.noise |= self.noise;
        config.decoherence |= self.decoherence;
    }
}
