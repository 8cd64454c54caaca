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

//! Utility functions for reading configuration from yaml.

use crate::errors::{KdResult, ParsingError};
use std::fs::read_to_string;
use std::path::Path;
use yaml_rust::{Yaml, YamlLoader};

/// Reads the first document of a yaml file.
pub fn read_yaml<P: AsRef<Path>>(path: P) -> KdResult<Yaml> {
    let config = read_to_string(&path)?;
    let file_name = path.as_ref().to_string_lossy().to_string();
    let mut docs =
        YamlLoader::load_from_str(&config).map_err(|e| ParsingError::MalformedYamlError {
            file_name: file_name.clone(),
            field: e.to_string(),
        })?;
    if docs.is_empty() {
        return Err(ParsingError::MissingYamlError {
            file_name,
            field: "document".to_string(),
        }
        .into());
    }
    Ok(docs.swap_remove(0))
}

/// Reads a non-negative integer field. Missing fields fall back to `default`, or are an error if there is none.
pub fn yaml_usize(
    params: &Yaml,
    field: &str,
    file_name: &str,
    default: Option<usize>,
) -> KdResult<usize> {
    match &params[field] {
        Yaml::BadValue | Yaml::Null => default.ok_or_else(|| {
            ParsingError::MissingYamlError {
                file_name: file_name.to_string(),
                field: field.to_string(),
            }
            .into()
        }),
        Yaml::Integer(i) if *i >= 0 => Ok(*i as usize),
        _ => Err(ParsingError::MalformedYamlError {
            file_name: file_name.to_string(),
            field: field.to_string(),
        }
        .into()),
    }
}

/// Reads a boolean field, missing fields fall back to `default`.
pub fn yaml_bool(params: &Yaml, field: &str, file_name: &str, default: bool) -> KdResult<bool> {
    match &params[field] {
        Yaml::BadValue | Yaml::Null => Ok(default),
        Yaml::Boolean(b) => Ok(*b),
        _ => Err(ParsingError::MalformedYamlError {
            file_name: file_name.to_string(),
            field: field.to_string(),
        }
        .into()),
    }
}
