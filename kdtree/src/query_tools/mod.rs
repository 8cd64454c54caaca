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

//! Tools and data structures for assisting kd-tree queries.
//!
//! The recursive search only ever asks two things of its candidate set, the current pruning distance and
//! whether a pattern should go in. Both query types implement that through [`CandidateHeap`].

pub(crate) mod query_items;
pub use query_items::QuerySingleton;

pub(crate) mod knn_query_heap;
pub use knn_query_heap::KnnQueryHeap;

pub(crate) mod radius_query_heap;
pub use radius_query_heap::{RadiusBound, RadiusQueryHeap};

/// The candidate set of a branch and bound query. All distances are squared euclidean distances.
pub trait CandidateHeap {
    /// The squared distance a pattern has to beat (or tie) to be kept. This is what the bound tests prune against.
    fn max_dist(&self) -> f64;

    /// Offer a pattern to the heap. The heap decides whether it is kept and what it evicts.
    fn push_candidate(&mut self, index: usize, dist: f64);

    /// Unpacks the heap into candidates sorted by increasing distance. This consumes the heap.
    fn unpack(self) -> Vec<QuerySingleton>;
}
