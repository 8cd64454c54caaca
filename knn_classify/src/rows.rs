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

//! Labelled training rows and the CSV loaders that produce them.
//!
//! A cell is missing when it is empty or does not parse as a finite number. Rows with a missing feature cannot be placed
//! in the tree, so they are skipped and counted.

use csv::{Reader, StringRecord};
use flate2::read::GzDecoder;
use kdtree::errors::ParsingError;
use kdtree::{KdError, KdResult};
use log::warn;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Numeric feature vectors with a class label each.
#[derive(Debug, Clone, Default)]
pub struct LabeledRows {
    dim: usize,
    features: Vec<Vec<f64>>,
    labels: Vec<String>,
    skipped: usize,
}

impl LabeledRows {
    /// An empty set of rows with `dim` features each
    pub fn new(dim: usize) -> LabeledRows {
        LabeledRows {
            dim,
            ..Default::default()
        }
    }

    /// Adds a row. A row with a missing feature is skipped, in which case this returns `Ok(false)`.
    pub fn push(&mut self, features: &[Option<f64>], label: &str) -> KdResult<bool> {
        KdError::check_dim(self.dim, features.len())?;
        match complete(features) {
            Some(features) => {
                self.features.push(features);
                self.labels.push(label.to_string());
                Ok(true)
            }
            None => {
                self.skipped += 1;
                Ok(false)
            }
        }
    }

    /// Number of features per row
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of usable rows
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// True if no usable row was read
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of rows dropped because of missing values
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Iterates over the usable rows and their labels
    pub fn iter(&self) -> impl Iterator<Item = (&[f64], &str)> {
        self.features
            .iter()
            .map(|f| f.as_slice())
            .zip(self.labels.iter().map(|l| l.as_str()))
    }

    /// Reads rows from a CSV file with a header. `.gz` files are decompressed on the fly.
    pub fn from_csv<P: AsRef<Path>>(
        path: P,
        feature_columns: &[&str],
        class_column: &str,
    ) -> KdResult<LabeledRows> {
        let mut rdr = open_csv(&path)?;
        let file_name = path.as_ref().to_string_lossy().to_string();
        let headers = rdr.headers().map_err(io::Error::from)?.clone();
        let feature_indexes = column_indexes(&headers, feature_columns, &file_name)?;
        let class_index = column_indexes(&headers, &[class_column], &file_name)?[0];

        let mut rows = LabeledRows::new(feature_columns.len());
        let mut unlabeled = 0;
        for result in rdr.records() {
            let record = result.map_err(io::Error::from)?;
            let label = match record.get(class_index) {
                Some(label) if !label.is_empty() => label,
                _ => {
                    unlabeled += 1;
                    continue;
                }
            };
            rows.push(&parse_cells(&record, &feature_indexes), label)?;
        }
        if rows.skipped > 0 {
            warn!(
                "{} contains missing values, {} affected rows are ignored",
                file_name, rows.skipped
            );
        }
        if unlabeled > 0 {
            warn!("{} has {} rows without a class, they are ignored", file_name, unlabeled);
            rows.skipped += unlabeled;
        }
        Ok(rows)
    }
}

/// Reads the named feature columns of every row of a CSV file. Missing cells come back as `None`.
pub fn feature_rows_from_csv<P: AsRef<Path>>(
    path: P,
    feature_columns: &[&str],
) -> KdResult<Vec<Vec<Option<f64>>>> {
    let mut rdr = open_csv(&path)?;
    let file_name = path.as_ref().to_string_lossy().to_string();
    let headers = rdr.headers().map_err(io::Error::from)?.clone();
    let feature_indexes = column_indexes(&headers, feature_columns, &file_name)?;
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(io::Error::from)?;
        rows.push(parse_cells(&record, &feature_indexes));
    }
    Ok(rows)
}

/// All features, or `None` if one is missing.
pub(crate) fn complete(features: &[Option<f64>]) -> Option<Vec<f64>> {
    features.iter().cloned().collect()
}

fn open_csv<P: AsRef<Path>>(path: P) -> KdResult<Reader<Box<dyn Read>>> {
    let file = File::open(&path)?;
    let read: Box<dyn Read> = if path.as_ref().extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Reader::from_reader(read))
}

fn column_indexes(
    headers: &StringRecord,
    columns: &[&str],
    file_name: &str,
) -> KdResult<Vec<usize>> {
    columns
        .iter()
        .map(|c| {
            headers.iter().position(|h| h.trim() == *c).ok_or_else(|| {
                KdError::from(ParsingError::CSVReadError {
                    file_name: file_name.to_string(),
                    line_number: 1,
                    key: c.to_string(),
                })
            })
        })
        .collect()
}

fn parse_cells(record: &StringRecord, indexes: &[usize]) -> Vec<Option<f64>> {
    indexes
        .iter()
        .map(|i| {
            record
                .get(*i)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
        })
        .collect()
}
