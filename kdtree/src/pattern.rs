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

//! The stored patterns. A pattern is a fixed length vector of `f64` and an optional payload.
//! Once a pattern goes into the builder it is owned by the tree's pattern arena and is never mutated.

/// An immutable coordinate vector plus an optional payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternRecord<T> {
    coordinates: Vec<f64>,
    payload: Option<T>,
}

impl<T> PatternRecord<T> {
    /// Wraps the coordinates and payload. The dimension is checked by the builder, not here.
    pub fn new(coordinates: Vec<f64>, payload: Option<T>) -> PatternRecord<T> {
        PatternRecord {
            coordinates,
            payload,
        }
    }

    /// The coordinates of the pattern
    #[inline]
    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    /// The payload, if one was given
    #[inline]
    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    /// The coordinate along a single axis
    #[inline]
    pub fn coordinate(&self, axis: usize) -> f64 {
        self.coordinates[axis]
    }

    /// Dimensionality of the pattern
    #[inline]
    pub fn dim(&self) -> usize {
        self.coordinates.len()
    }

    /// Splits the record back into its parts.
    pub fn into_parts(self) -> (Vec<f64>, Option<T>) {
        (self.coordinates, self.payload)
    }
}

/// Leaf level unit of storage. Every pattern in a tree is wrapped in exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalNode<T> {
    pattern: PatternRecord<T>,
}

impl<T> TerminalNode<T> {
    pub(crate) fn new(pattern: PatternRecord<T>) -> TerminalNode<T> {
        TerminalNode { pattern }
    }

    /// The wrapped pattern
    #[inline]
    pub fn pattern(&self) -> &PatternRecord<T> {
        &self.pattern
    }

    /// The payload of the wrapped pattern
    #[inline]
    pub fn payload(&self) -> Option<&T> {
        self.pattern.payload()
    }

    /// Squared euclidean distance to the query. The query has to have the same dimension.
    #[inline]
    pub fn sq_distance(&self, query: &[f64]) -> f64 {
        sq_l2(self.pattern.coordinates(), query)
    }
}

/// Squared L2 distance between two slices of equal length.
#[inline]
pub fn sq_l2(x: &[f64], y: &[f64]) -> f64 {
    x.iter()
        .zip(y)
        .map(|(a, b)| {
            let d = a - b;
            d * d
        })
        .sum()
}
