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

//! Classifier parameters.

use kdtree::utils::{read_yaml, yaml_bool, yaml_usize};
use kdtree::{KdResult, DEFAULT_BUCKET_SIZE};
use std::path::Path;

/// How the classifier votes and how its tree is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierSettings {
    /// Number of neighbours that vote. Capped at the number of training rows.
    pub k: usize,
    /// Weight each vote by the inverse distance instead of counting it once.
    pub weight_by_distance: bool,
    /// Report the share of the vote every known class got.
    pub output_class_probabilities: bool,
    /// Bucket size of the underlying kd-tree.
    pub bucket_size: usize,
}

impl Default for ClassifierSettings {
    fn default() -> ClassifierSettings {
        ClassifierSettings {
            k: 3,
            weight_by_distance: false,
            output_class_probabilities: true,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

impl ClassifierSettings {
    /// Reads the settings from yaml, every field is optional.
    ///
    /// ```yaml
    /// ---
    /// k: 5
    /// weight_by_distance: true
    /// output_class_probabilities: false
    /// bucket_size: 8
    /// ```
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> KdResult<ClassifierSettings> {
        let params = read_yaml(&path)?;
        let file_name = path.as_ref().to_string_lossy();
        let defaults = ClassifierSettings::default();
        Ok(ClassifierSettings {
            k: yaml_usize(&params, "k", &file_name, Some(defaults.k))?,
            weight_by_distance: yaml_bool(
                &params,
                "weight_by_distance",
                &file_name,
                defaults.weight_by_distance,
            )?,
            output_class_probabilities: yaml_bool(
                &params,
                "output_class_probabilities",
                &file_name,
                defaults.output_class_probabilities,
            )?,
            bucket_size: yaml_usize(&params, "bucket_size", &file_name, Some(defaults.bucket_size))?,
        })
    }
}
