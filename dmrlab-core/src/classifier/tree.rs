//! Weighted Gini decision tree for binary labels.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Candidate features examined per split before accepting the best one.
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        probability: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Class weight totals for a set of samples.
#[derive(Debug, Clone, Copy, Default)]
struct Weights {
    neg: f64,
    pos: f64,
}

impl Weights {
    fn total(&self) -> f64 {
        self.neg + self.pos
    }

    fn gini(&self) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        let p = self.pos / total;
        let q = self.neg / total;
        1.0 - p * p - q * q
    }

    fn add(&mut self, label: bool, w: f64) {
        if label {
            self.pos += w;
        } else {
            self.neg += w;
        }
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    decrease: f64,
}

struct Builder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [bool],
    class_weight: [f64; 2],
    params: TreeParams,
    nodes: Vec<Node>,
    importances: Vec<f64>,
}

impl Builder<'_> {
    fn weight(&self, i: usize) -> f64 {
        self.class_weight[usize::from(self.y[i])]
    }

    fn weights(&self, samples: &[usize]) -> Weights {
        let mut w = Weights::default();
        for &i in samples {
            w.add(self.y[i], self.weight(i));
        }
        w
    }

    fn build(&mut self, samples: Vec<usize>, depth: usize, rng: &mut StdRng) -> usize {
        let weights = self.weights(&samples);
        let node_index = self.nodes.len();
        self.nodes.push(Node::Leaf {
            probability: if weights.total() > 0.0 {
                weights.pos / weights.total()
            } else {
                0.0
            },
        });

        let impurity = weights.gini();
        if depth >= self.params.max_depth
            || samples.len() < 2 * self.params.min_samples_leaf.max(1)
            || impurity <= 1e-12
        {
            return node_index;
        }

        let Some(split) = self.best_split(&samples, &weights, rng) else {
            return node_index;
        };

        self.importances[split.feature] += split.decrease;
        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| self.x[i][split.feature] <= split.threshold);

        let left = self.build(left_samples, depth + 1, rng);
        let right = self.build(right_samples, depth + 1, rng);
        self.nodes[node_index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_index
    }

    /// Best weighted impurity decrease over a random feature order.
    ///
    /// At least `max_features` features are examined; if none of them yields a
    /// valid split, the search continues through the remaining ones.
    fn best_split(
        &self,
        samples: &[usize],
        parent: &Weights,
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let n_features = self.importances.len();
        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(rng);

        let min_leaf = self.params.min_samples_leaf.max(1);
        let parent_cost = parent.total() * parent.gini();
        let mut best: Option<SplitCandidate> = None;

        for (visited, &feature) in features.iter().enumerate() {
            if visited >= self.params.max_features && best.is_some() {
                break;
            }

            let mut order: Vec<(f64, usize)> =
                samples.iter().map(|&i| (self.x[i][feature], i)).collect();
            order.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left = Weights::default();
            for k in 0..order.len() - 1 {
                let (value, i) = order[k];
                left.add(self.y[i], self.weight(i));

                let next = order[k + 1].0;
                let n_left = k + 1;
                if next <= value || n_left < min_leaf || order.len() - n_left < min_leaf {
                    continue;
                }

                let right = Weights {
                    neg: parent.neg - left.neg,
                    pos: parent.pos - left.pos,
                };
                let decrease =
                    parent_cost - left.total() * left.gini() - right.total() * right.gini();
                if decrease > 1e-12 && best.as_ref().map_or(true, |b| decrease > b.decrease) {
                    let mut threshold = (value + next) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        decrease,
                    });
                }
            }
        }
        best
    }
}

/// A fitted binary decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    importances: Vec<f64>,
}

impl DecisionTree {
    /// Grow a tree over `samples` (indices into `x`/`y`, repeats allowed).
    ///
    /// `class_weight[0]` and `class_weight[1]` scale the negative and positive
    /// samples in every impurity and leaf computation.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[bool],
        samples: Vec<usize>,
        class_weight: [f64; 2],
        params: TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let n_features = x.first().map_or(0, Vec::len);
        let mut builder = Builder {
            x,
            y,
            class_weight,
            params,
            nodes: Vec::new(),
            importances: vec![0.0; n_features],
        };
        builder.build(samples, 0, rng);

        let mut importances = builder.importances;
        let sum: f64 = importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut importances {
                *imp /= sum;
            }
        }
        Self {
            nodes: builder.nodes,
            importances,
        }
    }

    /// Weighted class-1 fraction of the leaf `row` falls into.
    pub fn predict_one(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { probability }) => return *probability,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = row.get(*feature).copied().unwrap_or(f64::NAN);
                    index = if value <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match &nodes[index] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }
}
