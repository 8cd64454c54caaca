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

//! The unbounded candidate set for radius queries.

use super::query_items::QuerySingleton;
use super::CandidateHeap;
use std::collections::BinaryHeap;

/// Whether a pattern at exactly the maximum distance belongs to the result.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RadiusBound {
    /// Only patterns strictly closer than the maximum distance are returned.
    Exclusive,
    /// Patterns at the maximum distance are returned as well.
    Inclusive,
}

impl Default for RadiusBound {
    fn default() -> RadiusBound {
        RadiusBound::Exclusive
    }
}

/// Keeps every pattern inside the radius. The heap is seeded with a border at the squared radius, which fixes the
/// pruning distance for the whole query. The border carries no pattern and never shows up in the output.
#[derive(Debug)]
pub struct RadiusQueryHeap {
    dist_heap: BinaryHeap<QuerySingleton>,
    border: f64,
    bound: RadiusBound,
}

impl CandidateHeap for RadiusQueryHeap {
    fn max_dist(&self) -> f64 {
        self.border
    }

    fn push_candidate(&mut self, index: usize, dist: f64) {
        let inside = match self.bound {
            RadiusBound::Exclusive => dist < self.border,
            RadiusBound::Inclusive => dist <= self.border,
        };
        if inside {
            self.dist_heap.push(QuerySingleton::new(index, dist));
        }
    }

    fn unpack(self) -> Vec<QuerySingleton> {
        self.dist_heap.into_sorted_vec()
    }
}

impl RadiusQueryHeap {
    /// Creates a heap for all patterns within `max_distance` (not squared) of the query.
    /// A negative or NaN radius produces a heap that accepts nothing.
    pub fn new(max_distance: f64, bound: RadiusBound) -> RadiusQueryHeap {
        let border = if max_distance >= 0.0 {
            max_distance * max_distance
        } else {
            f64::NEG_INFINITY
        };
        RadiusQueryHeap {
            dist_heap: BinaryHeap::new(),
            border,
            bound,
        }
    }

    /// The number of candidates currently held
    pub fn len(&self) -> usize {
        self.dist_heap.len()
    }

    /// True if nothing has been kept yet
    pub fn is_empty(&self) -> bool {
        self.dist_heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_border() {
        let mut heap = RadiusQueryHeap::new(3.0, RadiusBound::Exclusive);
        assert_eq!(heap.max_dist(), 9.0);
        for (i, d) in [(0, 1.0), (1, 4.0), (2, 9.0), (3, 16.0)].iter() {
            heap.push_candidate(*i, *d);
        }
        let kept: Vec<usize> = heap.unpack().iter().map(|s| s.index()).collect();
        assert_eq!(kept, vec![0, 1]);
    }

    #[test]
    fn inclusive_border() {
        let mut heap = RadiusQueryHeap::new(3.0, RadiusBound::Inclusive);
        for (i, d) in [(3, 16.0), (2, 9.0), (0, 1.0)].iter() {
            heap.push_candidate(*i, *d);
        }
        let kept: Vec<usize> = heap.unpack().iter().map(|s| s.index()).collect();
        assert_eq!(kept, vec![0, 2]);
    }

    #[test]
    fn negative_radius_is_empty() {
        let mut heap = RadiusQueryHeap::new(-1.0, RadiusBound::Inclusive);
        heap.push_candidate(0, 0.0);
        assert!(heap.is_empty());
        let mut heap = RadiusQueryHeap::new(f64::NAN, RadiusBound::Exclusive);
        heap.push_candidate(0, 0.0);
        assert!(heap.is_empty());
    }
}
