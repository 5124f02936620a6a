/// Train a bagged decision-tree classifier on the encoded fighters and score it on a held-out split.
use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::TrainingConfig;
use crate::encode::{encode, FEATURE_NAMES};
use crate::error::TrainingError;
use crate::preprocess::EnrichedTable;

/// Row indices of one train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffles `0..n` with `seed` and holds out the first `ceil(test_fraction * n)` indices.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<Split, TrainingError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(TrainingError::InvalidFraction(test_fraction));
    }
    let n_test = (test_fraction * n as f64).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(TrainingError::EmptySplit { train: n_train, test: n_test });
    }

    let mut idx: Vec<usize> = (0..n).collect();
    idx.shuffle(&mut StdRng::seed_from_u64(seed));
    let train = idx.split_off(n_test);
    Ok(Split { train, test: idx })
}

struct Member {
    tree: DecisionTree<f64, usize>,
    columns: Vec<usize>,
}

/// Columns drawn per tree when none are configured: `round(sqrt(p))`, at least one.
pub fn default_max_features(p: usize) -> usize {
    ((p as f64).sqrt().round() as usize).max(1)
}

/// Majority vote over CART trees, each fit on a bootstrap sample and a random column subset.
///
/// The column subset is drawn once per tree rather than at every split.
pub struct RandomForest {
    members: Vec<Member>,
    n_features: usize,
}

impl RandomForest {
    pub fn fit(
        x: &Array2<f64>,
        y: &Array1<usize>,
        config: &TrainingConfig,
    ) -> Result<Self, TrainingError> {
        if config.n_trees == 0 {
            return Err(TrainingError::NoTrees);
        }
        let (n, p) = x.dim();
        if n == 0 || p == 0 {
            return Err(TrainingError::EmptyDataset);
        }
        let k = config.max_features.unwrap_or_else(|| default_max_features(p)).clamp(1, p);
        let mut rng = StdRng::seed_from_u64(config.seed);

        let mut members = Vec::with_capacity(config.n_trees);
        for t in 0..config.n_trees {
            let rows: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
            let mut columns = if k < p {
                index::sample(&mut rng, p, k).into_vec()
            } else {
                (0..p).collect()
            };
            columns.sort_unstable();

            let sample = Dataset::new(
                x.select(Axis(0), &rows).select(Axis(1), &columns),
                y.select(Axis(0), &rows),
            );
            let params = DecisionTree::<f64, usize>::params()
                .split_quality(SplitQuality::Gini)
                .max_depth(config.max_depth);
            let fitted: Result<DecisionTree<f64, usize>, linfa::Error> = params.fit(&sample);
            let tree = fitted?;
            debug!("tree {} fit on columns {:?}", t, columns);
            members.push(Member { tree, columns });
        }

        Ok(Self { members, n_features: p })
    }

    pub fn predict(&self, x: &Array2<f64>) -> Array1<usize> {
        let n = x.nrows();
        let mut votes: Vec<Vec<usize>> = vec![Vec::new(); n];
        for m in &self.members {
            let pred: Array1<usize> = m.tree.predict(&x.select(Axis(1), &m.columns));
            for (row, &class) in votes.iter_mut().zip(pred.iter()) {
                if row.len() <= class {
                    row.resize(class + 1, 0);
                }
                row[class] += 1;
            }
        }

        // ties go to the smaller class code
        votes
            .iter()
            .map(|counts| {
                counts
                    .iter()
                    .enumerate()
                    .fold((0, 0), |best, (class, &c)| if c > best.1 { (class, c) } else { best })
                    .0
            })
            .collect()
    }

    /// Mean impurity decrease per original column across all trees.
    pub fn feature_importance(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.n_features];
        for m in &self.members {
            for (&col, imp) in m.columns.iter().zip(m.tree.feature_importance()) {
                // a tree that never split reports NaN
                if imp.is_finite() {
                    total[col] += imp;
                }
            }
        }
        let count = self.members.len().max(1) as f64;
        total.iter().map(|v| v / count).collect()
    }
}

/// Outcome of one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    /// Fraction of held-out rows predicted exactly, in [0, 1].
    pub accuracy: f64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub feature_importances: Vec<f64>,
}

impl TrainingReport {
    /// Pairs importances with `names`, largest magnitude first.
    pub fn named_importances(&self, names: &[&str]) -> Vec<(String, f64)> {
        let mut out: Vec<(String, f64)> = self
            .feature_importances
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let name = names.get(i).map_or_else(|| format!("feature_{}", i), |n| n.to_string());
                (name, v)
            })
            .collect();
        out.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        out
    }
}

pub fn accuracy(truth: &Array1<usize>, predicted: &Array1<usize>) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let hits = truth.iter().zip(predicted.iter()).filter(|(a, b)| a == b).count();
    hits as f64 / truth.len() as f64
}

/// Splits, fits the forest on the training part and scores the held-out part.
pub fn train_and_evaluate(
    features: &Array2<f64>,
    targets: &Array1<usize>,
    config: &TrainingConfig,
) -> Result<TrainingReport, TrainingError> {
    if config.n_trees == 0 {
        return Err(TrainingError::NoTrees);
    }
    let n = features.nrows();
    if n == 0 {
        return Err(TrainingError::EmptyDataset);
    }
    if targets.len() != n {
        return Err(TrainingError::LengthMismatch { features: n, targets: targets.len() });
    }
    let mut classes = targets.to_vec();
    classes.sort_unstable();
    classes.dedup();
    if classes.len() < 2 {
        return Err(TrainingError::SingleClass(classes.len()));
    }

    let split = train_test_split(n, config.test_fraction, config.seed)?;
    let x_train = features.select(Axis(0), &split.train);
    let y_train = targets.select(Axis(0), &split.train);
    let x_test = features.select(Axis(0), &split.test);
    let y_test = targets.select(Axis(0), &split.test);

    let forest = RandomForest::fit(&x_train, &y_train, config)?;
    let predicted = forest.predict(&x_test);
    let accuracy = accuracy(&y_test, &predicted);

    Ok(TrainingReport {
        accuracy,
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        feature_importances: forest.feature_importance(),
    })
}

/// Encodes the table and trains on it; the table itself is left untouched.
pub fn train_model(
    table: &EnrichedTable,
    config: &TrainingConfig,
) -> Result<TrainingReport, TrainingError> {
    let encoding = encode(table);
    info!(
        "training {} trees on {} rows ({} stance codes, {} age codes, {} classes)",
        config.n_trees,
        encoding.features.nrows(),
        encoding.stance_codes.len(),
        encoding.age_codes.len(),
        encoding.target_codes.len()
    );
    let report = train_and_evaluate(&encoding.features, &encoding.targets, config)?;
    debug!("importances: {:?}", report.named_importances(&FEATURE_NAMES));
    Ok(report)
}
