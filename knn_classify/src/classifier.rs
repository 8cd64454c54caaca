/*
* Licensed to Elasticsearch B.V. under one or more contributor
* license agreements. See the NOTICE file distributed with
* this work for additional information regarding copyright
* ownership. Elasticsearch B.V. licenses this file to you under
* the Apache License, Version 2.0 (the "License"); you may
* not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
*  http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing,
* software distributed under the License is distributed on an
* "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
* KIND, either express or implied.  See the License for the
* specific language governing permissions and limitations
* under the License.
*/

//! The k nearest neighbour classifier.
//!
//! Training rows go into a kd-tree whose payload is the index of the row's class. A query collects its `k`
//! nearest rows and every neighbour votes for its class, either once or with the inverse of its distance. All rows
//! tied with the `k`-th distance vote too. A tie in the vote goes to the class with more training rows, and after
//! that to the class of the nearest neighbour.

use crate::rows::{complete, LabeledRows};
use crate::settings::ClassifierSettings;
use kdtree::query_interface::BulkInterface;
use kdtree::{KdError, KdResult, KdTree, KdTreeBuilder, Neighbour};
use log::{debug, info, warn};

/// The outcome of classifying one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// The winning class, `None` if the query could not be classified
    pub class: Option<String>,
    /// Share of the vote for every training class, in the order the classes were first seen. Empty when
    /// probabilities are switched off or there is no winner.
    pub probabilities: Vec<(String, f64)>,
}

impl Classification {
    /// The result for a query with missing values
    pub fn missing() -> Classification {
        Classification {
            class: None,
            probabilities: Vec::new(),
        }
    }

    /// The probability reported for `class`, if any
    pub fn probability(&self, class: &str) -> Option<f64> {
        self.probabilities
            .iter()
            .find(|(c, _)| c == class)
            .map(|(_, p)| *p)
    }
}

/// A trained classifier.
#[derive(Debug)]
pub struct KnnClassifier {
    tree: KdTree<usize>,
    classes: Vec<String>,
    class_counts: Vec<usize>,
    settings: ClassifierSettings,
}

impl KnnClassifier {
    /// Builds the tree over the training rows.
    pub fn train(rows: &LabeledRows, settings: ClassifierSettings) -> KdResult<KnnClassifier> {
        if settings.k == 0 {
            return Err(KdError::invalid_argument("k must be at least 1"));
        }
        let mut classes: Vec<String> = Vec::new();
        let mut class_counts: Vec<usize> = Vec::new();
        let mut builder = KdTreeBuilder::new(rows.dim());
        builder.set_bucket_size(settings.bucket_size);
        for (features, label) in rows.iter() {
            let class_index = match classes.iter().position(|c| c == label) {
                Some(i) => i,
                None => {
                    classes.push(label.to_string());
                    class_counts.push(0);
                    classes.len() - 1
                }
            };
            class_counts[class_index] += 1;
            builder.add_pattern(features, class_index)?;
        }
        let tree = builder.build()?;
        if tree.len() < settings.k {
            warn!(
                "Only {} training rows for k = {}, every query will use all of them",
                tree.len(),
                settings.k
            );
        }
        info!(
            "Trained on {} rows with {} classes: {:?}",
            tree.len(),
            classes.len(),
            classes.iter().zip(class_counts.iter()).collect::<Vec<_>>()
        );
        Ok(KnnClassifier {
            tree,
            classes,
            class_counts,
            settings,
        })
    }

    /// The settings this classifier was trained with
    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    /// Number of features a query needs
    pub fn dim(&self) -> usize {
        self.tree.dim()
    }

    /// The classes, in the order they were first seen in training
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of training rows of each class, aligned with [`KnnClassifier::classes`]
    pub fn class_counts(&self) -> &[usize] {
        &self.class_counts
    }

    /// The underlying tree
    pub fn tree(&self) -> &KdTree<usize> {
        &self.tree
    }

    /// Classifies a query that may have missing values. Those get [`Classification::missing`].
    pub fn classify(&self, query: &[Option<f64>]) -> KdResult<Classification> {
        KdError::check_dim(self.dim(), query.len())?;
        match complete(query) {
            Some(query) => self.classify_dense(&query),
            None => Ok(Classification::missing()),
        }
    }

    /// Classifies a query with all features present.
    pub fn classify_dense(&self, query: &[f64]) -> KdResult<Classification> {
        let neighbours = self.tree.knn(query, self.effective_k())?;
        Ok(self.vote(&neighbours))
    }

    /// Classifies many queries in parallel. The results line up with the queries.
    pub fn classify_all(&self, queries: &[Vec<Option<f64>>]) -> KdResult<Vec<Classification>> {
        let mut dense = Vec::with_capacity(queries.len());
        let mut positions = Vec::with_capacity(queries.len());
        for (i, query) in queries.iter().enumerate() {
            KdError::check_dim(self.dim(), query.len())?;
            if let Some(query) = complete(query) {
                dense.push(query);
                positions.push(i);
            }
        }
        debug!(
            "{} of {} queries have missing values",
            queries.len() - dense.len(),
            queries.len()
        );

        let mut results = vec![Classification::missing(); queries.len()];
        let bulk = BulkInterface::new(&self.tree);
        for (position, neighbours) in positions
            .into_iter()
            .zip(bulk.knn(&dense, self.effective_k()))
        {
            results[position] = self.vote(&neighbours?);
        }
        Ok(results)
    }

    fn effective_k(&self) -> usize {
        self.settings.k.min(self.tree.len())
    }

    fn vote(&self, neighbours: &[Neighbour<usize>]) -> Classification {
        if neighbours.is_empty() {
            return Classification::missing();
        }
        let mut weights = vec![0.0; self.classes.len()];
        // Classes in the order their nearest neighbour was found
        let mut order: Vec<usize> = Vec::new();
        // An exact match outweighs everything else, so only the exact matches vote.
        let exact = self.settings.weight_by_distance && neighbours.iter().any(|n| n.distance == 0.0);
        for neighbour in neighbours {
            let class_index = match neighbour.payload {
                Some(c) => *c,
                None => continue,
            };
            let weight = if !self.settings.weight_by_distance {
                1.0
            } else if exact {
                if neighbour.distance == 0.0 {
                    1.0
                } else {
                    0.0
                }
            } else {
                1.0 / neighbour.distance
            };
            if !order.contains(&class_index) {
                order.push(class_index);
            }
            weights[class_index] += weight;
        }

        let mut winner: Option<usize> = None;
        for &i in &order {
            let weight = weights[i];
            if weight <= 0.0 {
                continue;
            }
            winner = match winner {
                None => Some(i),
                Some(w) if weight > weights[w] => Some(i),
                Some(w) if weight == weights[w] && self.class_counts[i] > self.class_counts[w] => {
                    Some(i)
                }
                keep => keep,
            };
        }
        let winner = match winner {
            Some(w) => w,
            None => return Classification::missing(),
        };

        let probabilities = if self.settings.output_class_probabilities {
            let total: f64 = weights.iter().sum();
            self.classes
                .iter()
                .zip(weights.iter())
                .map(|(c, w)| (c.clone(), w / total))
                .collect()
        } else {
            Vec::new()
        };
        Classification {
            class: Some(self.classes[winner].clone()),
            probabilities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn training_rows() -> LabeledRows {
        let mut rows = LabeledRows::new(2);
        for (x, y, label) in &[
            (0.0, 0.0, "a"),
            (0.0, 1.0, "a"),
            (1.0, 0.0, "a"),
            (10.0, 10.0, "b"),
            (10.0, 11.0, "b"),
            (11.0, 10.0, "b"),
        ] {
            rows.push(&[Some(*x), Some(*y)], label).unwrap();
        }
        rows
    }

    #[test]
    fn majority_vote() {
        let classifier = KnnClassifier::train(&training_rows(), ClassifierSettings::default()).unwrap();
        assert_eq!(classifier.classes(), &["a".to_string(), "b".to_string()]);
        assert_eq!(classifier.class_counts(), &[3, 3]);

        let near_a = classifier.classify(&[Some(0.2), Some(0.2)]).unwrap();
        assert_eq!(near_a.class.as_deref(), Some("a"));
        assert_approx_eq!(near_a.probability("a").unwrap(), 1.0);
        assert_approx_eq!(near_a.probability("b").unwrap(), 0.0);

        let near_b = classifier.classify_dense(&[9.0, 9.0]).unwrap();
        assert_eq!(near_b.class.as_deref(), Some("b"));
    }

    #[test]
    fn mixed_neighbourhood() {
        let mut rows = training_rows();
        rows.push(&[Some(0.5), Some(0.5)], "b").unwrap();
        let classifier = KnnClassifier::train(&rows, ClassifierSettings::default()).unwrap();
        // Nearest three are (0.5,0.5) b, then (0,0) and (1,0) of a at equal distance
        let result = classifier.classify(&[Some(0.5), Some(0.4)]).unwrap();
        assert_eq!(result.class.as_deref(), Some("a"));
        let b = result.probability("b").unwrap();
        let a = result.probability("a").unwrap();
        assert!(b > 0.0 && a > b);
        assert_approx_eq!(a + b, 1.0);
    }

    #[test]
    fn distance_weighting() {
        let mut rows = LabeledRows::new(1);
        rows.push(&[Some(0.0)], "near").unwrap();
        rows.push(&[Some(3.0)], "far").unwrap();
        rows.push(&[Some(3.5)], "far").unwrap();
        let query = [Some(1.0)];

        let counted = KnnClassifier::train(&rows, ClassifierSettings::default()).unwrap();
        assert_eq!(counted.classify(&query).unwrap().class.as_deref(), Some("far"));

        let settings = ClassifierSettings {
            weight_by_distance: true,
            ..Default::default()
        };
        let weighted = KnnClassifier::train(&rows, settings).unwrap();
        let result = weighted.classify(&query).unwrap();
        assert_eq!(result.class.as_deref(), Some("near"));
        // 1/1 against 1/2 + 1/2.5
        assert_approx_eq!(result.probability("near").unwrap(), 1.0 / 1.9);
    }

    #[test]
    fn exact_match_wins_with_weighting() {
        let mut rows = LabeledRows::new(1);
        rows.push(&[Some(0.0)], "x").unwrap();
        rows.push(&[Some(0.1)], "y").unwrap();
        rows.push(&[Some(0.2)], "y").unwrap();
        let settings = ClassifierSettings {
            weight_by_distance: true,
            ..Default::default()
        };
        let classifier = KnnClassifier::train(&rows, settings).unwrap();
        let result = classifier.classify(&[Some(0.0)]).unwrap();
        assert_eq!(result.class.as_deref(), Some("x"));
        assert_approx_eq!(result.probability("x").unwrap(), 1.0);
    }

    #[test]
    fn ties_go_to_the_larger_class() {
        let mut rows = LabeledRows::new(1);
        rows.push(&[Some(-1.0)], "small").unwrap();
        rows.push(&[Some(1.0)], "large").unwrap();
        rows.push(&[Some(50.0)], "large").unwrap();
        let settings = ClassifierSettings {
            k: 2,
            ..Default::default()
        };
        let classifier = KnnClassifier::train(&rows, settings).unwrap();
        let result = classifier.classify(&[Some(0.0)]).unwrap();
        assert_eq!(result.class.as_deref(), Some("large"));
        assert_approx_eq!(result.probability("small").unwrap(), 0.5);
    }

    #[test]
    fn equal_classes_go_to_the_nearest() {
        let mut rows = LabeledRows::new(1);
        rows.push(&[Some(10.0)], "a").unwrap();
        rows.push(&[Some(0.0)], "b").unwrap();
        let settings = ClassifierSettings {
            k: 2,
            ..Default::default()
        };
        let classifier = KnnClassifier::train(&rows, settings).unwrap();
        let result = classifier.classify(&[Some(1.0)]).unwrap();
        assert_eq!(result.class.as_deref(), Some("b"));
        assert_approx_eq!(result.probability("a").unwrap(), 0.5);

        let result = classifier.classify(&[Some(9.0)]).unwrap();
        assert_eq!(result.class.as_deref(), Some("a"));
    }

    #[test]
    fn k_larger_than_training_set() {
        let mut rows = LabeledRows::new(1);
        rows.push(&[Some(0.0)], "only").unwrap();
        let settings = ClassifierSettings {
            k: 10,
            ..Default::default()
        };
        let classifier = KnnClassifier::train(&rows, settings).unwrap();
        let result = classifier.classify(&[Some(100.0)]).unwrap();
        assert_eq!(result.class.as_deref(), Some("only"));
    }

    #[test]
    fn empty_training_set() {
        let rows = LabeledRows::new(2);
        let classifier = KnnClassifier::train(&rows, ClassifierSettings::default()).unwrap();
        assert_eq!(
            classifier.classify(&[Some(0.0), Some(0.0)]).unwrap(),
            Classification::missing()
        );
    }

    #[test]
    fn missing_values_and_bad_dimension() {
        let classifier = KnnClassifier::train(&training_rows(), ClassifierSettings::default()).unwrap();
        assert_eq!(
            classifier.classify(&[None, Some(0.0)]).unwrap(),
            Classification::missing()
        );
        assert!(classifier.classify(&[Some(0.0)]).is_err());
    }

    #[test]
    fn zero_k_is_rejected() {
        let settings = ClassifierSettings {
            k: 0,
            ..Default::default()
        };
        assert!(KnnClassifier::train(&training_rows(), settings).is_err());
    }

    #[test]
    fn probabilities_can_be_switched_off() {
        let settings = ClassifierSettings {
            output_class_probabilities: false,
            ..Default::default()
        };
        let classifier = KnnClassifier::train(&training_rows(), settings).unwrap();
        let result = classifier.classify(&[Some(0.0), Some(0.0)]).unwrap();
        assert_eq!(result.class.as_deref(), Some("a"));
        assert!(result.probabilities.is_empty());
    }

    #[test]
    fn bulk_matches_single() {
        let classifier = KnnClassifier::train(&training_rows(), ClassifierSettings::default()).unwrap();
        let queries = vec![
            vec![Some(0.0), Some(0.3)],
            vec![None, Some(1.0)],
            vec![Some(12.0), Some(12.0)],
            vec![Some(4.0), Some(4.0)],
        ];
        let bulk = classifier.classify_all(&queries).unwrap();
        assert_eq!(bulk.len(), queries.len());
        for (query, result) in queries.iter().zip(bulk.iter()) {
            assert_eq!(&classifier.classify(query).unwrap(), result);
        }
        assert_eq!(bulk[1], Classification::missing());
    }
}
