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

#![warn(missing_docs)]

//! # knn_classify
//! A k nearest neighbour classifier on top of [`kdtree`]. Training rows are read from CSV, rows with missing
//! values are skipped, and each query is assigned the class with the largest vote among its nearest rows.
//!
//! ```rust
//! use knn_classify::{ClassifierSettings, KnnClassifier, LabeledRows};
//!
//! let mut rows = LabeledRows::new(1);
//! rows.push(&[Some(0.0)], "low").unwrap();
//! rows.push(&[Some(0.5)], "low").unwrap();
//! rows.push(&[Some(9.0)], "high").unwrap();
//! let classifier = KnnClassifier::train(&rows, ClassifierSettings::default()).unwrap();
//! let result = classifier.classify(&[Some(1.0)]).unwrap();
//! assert_eq!(result.class.as_deref(), Some("low"));
//! ```

#[cfg(test)]
#[macro_use]
extern crate assert_approx_eq;

pub mod classifier;
pub mod rows;
pub mod settings;

pub use classifier::{Classification, KnnClassifier};
pub use rows::{feature_rows_from_csv, LabeledRows};
pub use settings::ClassifierSettings;
