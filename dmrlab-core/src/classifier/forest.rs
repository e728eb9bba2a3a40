//! Random forest — bagged Gini trees with class-balanced weights.

use super::tree::{DecisionTree, TreeParams};
use super::{validate_training_set, Classifier, ClassifierError, ClassifierFactory};
use crate::rng::RngHierarchy;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Fixed hyperparameters of a forest. Also serves as the factory handing the
/// walk-forward trainer a fresh, unfitted forest per retrain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
    /// Weight each class by `n / (2 * count)` so the minority class counts
    /// as much as the majority.
    pub balanced: bool,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 5,
            min_samples_leaf: 15,
            seed: 42,
            balanced: true,
        }
    }
}

impl ClassifierFactory for ForestParams {
    fn create(&self) -> Box<dyn Classifier> {
        Box::new(RandomForest::new(*self))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    trees: Vec<DecisionTree>,
    n_features: usize,
    importances: Vec<f64>,
}

impl RandomForest {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            n_features: 0,
            importances: Vec::new(),
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[bool]) -> Result<(), ClassifierError> {
        let n_features = validate_training_set(x, y)?;
        let n = x.len();

        let class_weight = if self.params.balanced {
            let positives = y.iter().filter(|&&l| l).count() as f64;
            let negatives = n as f64 - positives;
            [n as f64 / (2.0 * negatives), n as f64 / (2.0 * positives)]
        } else {
            [1.0, 1.0]
        };
        let tree_params = TreeParams {
            max_depth: self.params.max_depth,
            min_samples_leaf: self.params.min_samples_leaf,
            max_features: ((n_features as f64).sqrt() as usize).max(1),
        };
        let seeds = RngHierarchy::new(self.params.seed);

        // Build trees in parallel; each tree owns its seeded stream
        let trees: Vec<DecisionTree> = (0..self.params.n_estimators)
            .into_par_iter()
            .map(|i| {
                let mut rng = seeds.rng_for("tree", i as u64);
                let samples: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(x, y, samples, class_weight, tree_params, &mut rng)
            })
            .collect();

        let mut importances = vec![0.0; n_features];
        for tree in &trees {
            for (acc, imp) in importances.iter_mut().zip(tree.feature_importances()) {
                *acc += imp;
            }
        }
        let sum: f64 = importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut importances {
                *imp /= sum;
            }
        }

        self.trees = trees;
        self.n_features = n_features;
        self.importances = importances;
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ClassifierError> {
        if !self.is_fitted() {
            return Err(ClassifierError::NotFitted);
        }
        x.iter()
            .enumerate()
            .map(|(row, values)| {
                if values.len() != self.n_features {
                    return Err(ClassifierError::FeatureCount {
                        row,
                        expected: self.n_features,
                        got: values.len(),
                    });
                }
                let sum: f64 = self.trees.iter().map(|t| t.predict_one(values)).sum();
                Ok(sum / self.trees.len() as f64)
            })
            .collect()
    }

    fn feature_importances(&self) -> Vec<f64> {
        self.importances.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two informative-ish features and one noise column; label is set when
    /// feature 0 is high.
    fn toy_set(n: usize) -> (Vec<Vec<f64>>, Vec<bool>) {
        let x: Vec<Vec<f64>> = (0..n)
            .map(|i| {
                let f0 = (i % 17) as f64;
                let f1 = ((i * 7) % 11) as f64;
                let noise = ((i * 13) % 5) as f64;
                vec![f0, f1, noise]
            })
            .collect();
        let y = x.iter().map(|r| r[0] >= 12.0).collect();
        (x, y)
    }

    fn small_params() -> ForestParams {
        ForestParams {
            n_estimators: 30,
            max_depth: 4,
            min_samples_leaf: 2,
            seed: 42,
            balanced: true,
        }
    }

    #[test]
    fn learns_threshold_on_informative_feature() {
        let (x, y) = toy_set(200);
        let mut forest = RandomForest::new(small_params());
        forest.fit(&x, &y).unwrap();

        let probs = forest
            .predict_proba(&[vec![16.0, 3.0, 1.0], vec![1.0, 3.0, 1.0]])
            .unwrap();
        assert!(probs[0] > 0.6, "high f0 should be risky, got {}", probs[0]);
        assert!(probs[1] < 0.4, "low f0 should be safe, got {}", probs[1]);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn importances_sum_to_one_and_favor_signal() {
        let (x, y) = toy_set(200);
        let mut forest = RandomForest::new(small_params());
        forest.fit(&x, &y).unwrap();
        let imp = forest.feature_importances();
        assert!((imp.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(imp[0] > imp[2]);
    }

    #[test]
    fn same_seed_same_model() {
        let (x, y) = toy_set(150);
        let mut a = RandomForest::new(small_params());
        let mut b = RandomForest::new(small_params());
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        let probe: Vec<Vec<f64>> = x.iter().take(30).cloned().collect();
        assert_eq!(a.predict_proba(&probe).unwrap(), b.predict_proba(&probe).unwrap());
    }

    #[test]
    fn unfitted_forest_refuses_to_predict() {
        let forest = RandomForest::new(small_params());
        assert_eq!(
            forest.predict_proba(&[vec![1.0]]),
            Err(ClassifierError::NotFitted)
        );
    }

    #[test]
    fn single_class_is_rejected() {
        let x = vec![vec![1.0], vec![2.0]];
        let mut forest = RandomForest::new(small_params());
        assert_eq!(forest.fit(&x, &[false, false]), Err(ClassifierError::SingleClass));
    }

    #[test]
    fn factory_creates_unfitted_instances() {
        let factory = small_params();
        let model = factory.create();
        assert_eq!(model.name(), "random_forest");
        assert!(model.feature_importances().is_empty());
    }
}
