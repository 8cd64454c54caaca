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

//! The bounded candidate set for k nearest neighbour queries.

use super::query_items::QuerySingleton;
use super::CandidateHeap;
use std::collections::BinaryHeap;

/// A max-heap on squared distance holding the current best `k` candidates. The top of the heap is the worst kept
/// candidate, its distance is the pruning bound of the search.
///
/// Ties at the boundary are never dropped. A candidate that is exactly as far as the worst kept one is pushed
/// without evicting anything, and an eviction removes the whole group of equally far candidates only if at least
/// `k` candidates remain. So the heap holds every pattern whose distance is at most the `k`-th smallest distance
/// seen so far, which may be more than `k`.
#[derive(Debug)]
pub struct KnnQueryHeap {
    dist_heap: BinaryHeap<QuerySingleton>,
    k: usize,
}

impl CandidateHeap for KnnQueryHeap {
    /// The current maximum distance to the query point. If the heap isn't full it returns infinity.
    fn max_dist(&self) -> f64 {
        if self.dist_heap.len() < self.k {
            f64::INFINITY
        } else {
            self.dist_heap
                .peek()
                .map(|x| x.dist)
                .unwrap_or(f64::INFINITY)
        }
    }

    fn push_candidate(&mut self, index: usize, dist: f64) {
        if self.dist_heap.len() < self.k {
            self.dist_heap.push(QuerySingleton::new(index, dist));
            return;
        }
        let max_dist = self.max_dist();
        if dist < max_dist {
            self.dist_heap.push(QuerySingleton::new(index, dist));
            self.evict();
        } else if dist == max_dist {
            self.dist_heap.push(QuerySingleton::new(index, dist));
        }
    }

    fn unpack(self) -> Vec<QuerySingleton> {
        self.dist_heap.into_sorted_vec()
    }
}

impl KnnQueryHeap {
    /// Creates a new KNN heap for `k` neighbours.
    pub fn new(k: usize) -> KnnQueryHeap {
        KnnQueryHeap {
            dist_heap: BinaryHeap::with_capacity(k + 1),
            k,
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

    /// The `k` this heap was created for
    pub fn k(&self) -> usize {
        self.k
    }

    // Drops the farthest group of equally distant candidates as long as that leaves at least k behind.
    fn evict(&mut self) {
        let mut group = Vec::new();
        while self.dist_heap.len() > self.k {
            let worst = match self.dist_heap.peek() {
                Some(s) => s.dist,
                None => return,
            };
            group.clear();
            while let Some(top) = self.dist_heap.peek() {
                if top.dist == worst {
                    group.extend(self.dist_heap.pop());
                } else {
                    break;
                }
            }
            if self.dist_heap.len() < self.k {
                self.dist_heap.extend(group.drain(..));
                return;
            }
        }
    }
}
