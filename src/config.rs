// Command line surface and the knobs of a training run.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::preprocess::{AgeBucket, StanceBucket, StrikingBucket, TakedownBucket};
use crate::query::{parse_selection, FilterCriteria};

/// Reproducibility and size controls for one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Share of rows held out for scoring, strictly between 0 and 1.
    pub test_fraction: f64,
    /// Seeds both the split and the bootstrap samples.
    pub seed: u64,
    pub n_trees: usize,
    /// `None` grows every tree until its leaves are pure.
    pub max_depth: Option<usize>,
    /// Columns drawn per tree; `None` uses `round(sqrt(p))`.
    pub max_features: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            n_trees: 100,
            max_depth: None,
            max_features: None,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "fighter-search")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Group, filter and search UFC fighters, and train a striking-accuracy classifier", long_about = None)]
pub struct Cli {
    /// Fighter statistics csv
    #[arg(short, long, global = true, default_value = "ufc-fighters-statistics.csv")]
    pub data: PathBuf,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show fighters matching every selected group
    Filter(FilterArgs),
    /// Find fighters whose name or nickname contains the query
    Search {
        query: String,
    },
    /// Train the classifier and report held-out accuracy
    Train(TrainArgs),
}

// `std::option::Option` keeps clap from treating these as optional flags; "All" parses to `None`.
#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Striking accuracy group, e.g. "Medium" or "Medium Striking Accuracy"
    #[arg(long, default_value = "All", value_parser = parse_selection::<StrikingBucket>)]
    pub striking: std::option::Option<StrikingBucket>,

    /// Takedown accuracy group
    #[arg(long, default_value = "All", value_parser = parse_selection::<TakedownBucket>)]
    pub takedown: std::option::Option<TakedownBucket>,

    /// Orthodox, Southpaw, Switch or Other
    #[arg(long, default_value = "All", value_parser = parse_selection::<StanceBucket>)]
    pub stance: std::option::Option<StanceBucket>,

    /// Young or Old
    #[arg(long, default_value = "All", value_parser = parse_selection::<AgeBucket>)]
    pub age: std::option::Option<AgeBucket>,
}

impl FilterArgs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            striking: self.striking,
            takedown: self.takedown,
            stance: self.stance,
            age: self.age,
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[arg(long, default_value = "0.2")]
    pub test_fraction: f64,

    /// Random seed for the split and the bootstrap samples
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Number of trees in the forest
    #[arg(long, default_value = "100")]
    pub trees: usize,

    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Columns sampled per tree [default: round(sqrt(features))]
    #[arg(long)]
    pub max_features: Option<usize>,

    /// Write a feature importance chart to this PNG file
    #[arg(long)]
    pub plot: Option<PathBuf>,
}

impl TrainArgs {
    pub fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            test_fraction: self.test_fraction,
            seed: self.seed,
            n_trees: self.trees,
            max_depth: self.max_depth,
            max_features: self.max_features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_defaults_to_no_constraint() {
        let cli = Cli::try_parse_from(["fighter-search", "filter"]).unwrap();
        match cli.command {
            Command::Filter(args) => assert_eq!(args.criteria(), FilterCriteria::default()),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn filter_accepts_short_and_long_labels() {
        let cli = Cli::try_parse_from([
            "fighter-search",
            "filter",
            "--striking",
            "Medium",
            "--age",
            "Old Fighter",
        ])
        .unwrap();
        let Command::Filter(args) = cli.command else { panic!("expected filter") };
        let c = args.criteria();
        assert_eq!(c.striking, Some(StrikingBucket::Medium));
        assert_eq!(c.age, Some(AgeBucket::Old));
        assert_eq!(c.stance, None);
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert!(Cli::try_parse_from(["fighter-search", "filter", "--stance", "Crouch"]).is_err());
    }

    #[test]
    fn train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["fighter-search", "--data", "x.csv", "train"]).unwrap();
        assert_eq!(cli.data, PathBuf::from("x.csv"));
        let Command::Train(args) = cli.command else { panic!("expected train") };
        assert_eq!(args.training_config(), TrainingConfig::default());
        assert!(args.plot.is_none());
    }
}
