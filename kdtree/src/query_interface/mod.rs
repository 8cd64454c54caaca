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

//! Interfaces that simplify bulk queries. The tree is read only once built, so queries are farmed out to the
//! rayon thread pool against a single shared tree.

use crate::errors::KdResult;
use crate::tree::{KdTree, Neighbour};
use rayon::prelude::*;

/// Runs many queries against one tree in parallel. Results come back in the order of the queries.
#[derive(Debug)]
pub struct BulkInterface<'a, T> {
    tree: &'a KdTree<T>,
    chunk_size: usize,
}

impl<'a, T: Sync> BulkInterface<'a, T> {
    /// Wraps the tree. Queries are handed to the pool in chunks of 100.
    pub fn new(tree: &'a KdTree<T>) -> Self {
        BulkInterface {
            tree,
            chunk_size: 100,
        }
    }

    /// Number of queries each rayon task works through. Anything below 1 is treated as 1.
    pub fn set_chunk_size(&mut self, x: usize) -> &mut Self {
        self.chunk_size = x.max(1);
        self
    }

    /// Bulk knn
    pub fn knn<Q: AsRef<[f64]> + Sync>(
        &self,
        queries: &[Q],
        k: usize,
    ) -> Vec<KdResult<Vec<Neighbour<'a, T>>>> {
        let tree = self.tree;
        let chunked_results: Vec<Vec<KdResult<Vec<Neighbour<'a, T>>>>> = queries
            .par_chunks(self.chunk_size)
            .map(|chunk| chunk.iter().map(|q| tree.knn(q.as_ref(), k)).collect())
            .collect();
        chunked_results.into_iter().flatten().collect()
    }

    /// Bulk radius query, exclusive of the border
    pub fn within_radius<Q: AsRef<[f64]> + Sync>(
        &self,
        queries: &[Q],
        max_distance: f64,
    ) -> Vec<KdResult<Vec<Neighbour<'a, T>>>> {
        let tree = self.tree;
        let chunked_results: Vec<Vec<KdResult<Vec<Neighbour<'a, T>>>>> = queries
            .par_chunks(self.chunk_size)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|q| tree.within_radius(q.as_ref(), max_distance))
                    .collect()
            })
            .collect();
        chunked_results.into_iter().flatten().collect()
    }
}
