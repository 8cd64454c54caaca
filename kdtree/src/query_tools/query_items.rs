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

use std::cmp::Ordering;

/// A candidate pattern held by one of the query heaps. The distance is the squared distance to the query.
#[derive(Clone, Copy, Debug)]
pub struct QuerySingleton {
    pub(crate) dist: f64,
    pub(crate) index: usize,
}

impl QuerySingleton {
    pub(crate) fn new(index: usize, dist: f64) -> QuerySingleton {
        QuerySingleton { dist, index }
    }

    /// Squared distance to the query
    pub fn sq_dist(&self) -> f64 {
        self.dist
    }

    /// Index of the pattern in the tree's arena
    pub fn index(&self) -> usize {
        self.index
    }
}

impl PartialEq for QuerySingleton {
    fn eq(&self, other: &QuerySingleton) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QuerySingleton {}

impl Ord for QuerySingleton {
    fn cmp(&self, other: &QuerySingleton) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Less)
    }
}

impl PartialOrd for QuerySingleton {
    // Farthest on top of the max-heap, the pattern index keeps ties deterministic.
    fn partial_cmp(&self, other: &QuerySingleton) -> Option<Ordering> {
        match self.dist.partial_cmp(&other.dist)? {
            Ordering::Equal => Some(self.index.cmp(&other.index)),
            o => Some(o),
        }
    }
}
