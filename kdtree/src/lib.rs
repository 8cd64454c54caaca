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
#![doc(test(attr(allow(unused_variables), deny(warnings))))]

//! # kdtree
//! An optimized k-d tree in the style of Friedman, Bentley and Finkel. The tree is built once from a set of
//! fixed dimensional `f64` patterns, each with an optional payload, and then answers k nearest neighbour and
//! fixed radius queries with branch and bound pruning.
//!
//! ## Parameter Guide
//! The only structural parameter is the bucket size, the largest number of patterns a leaf may hold. Larger
//! buckets give a shallower tree and cheaper builds at the cost of more distance computations per leaf. The
//! default of 4 is a good start for low dimensional data. Splits are always on the axis with the largest spread,
//! at the median, so the tree is balanced regardless of the order patterns were added in.
//!
//! ```rust
//! use kdtree::KdTreeBuilder;
//!
//! let mut builder = KdTreeBuilder::new(2);
//! builder.add_pattern(vec![0.0, 0.0], "a").unwrap();
//! builder.add_pattern(vec![10.0, 10.0], "b").unwrap();
//! builder.add_pattern(vec![1.0, 1.0], "c").unwrap();
//! let tree = builder.build().unwrap();
//!
//! let nearest = tree.knn(&[0.0, 0.0], 2).unwrap();
//! assert_eq!(nearest[0].payload, Some(&"a"));
//! assert_eq!(nearest[1].payload, Some(&"c"));
//! ```
//!
//! A k nearest neighbour query returns more than `k` results when several patterns tie for the `k`-th
//! distance. Radius queries exclude patterns at exactly the maximum distance unless asked otherwise.

#[cfg(test)]
#[macro_use]
extern crate assert_approx_eq;

pub mod errors;
pub use errors::{KdError, KdResult};

pub mod bounds;
pub mod node;
pub mod pattern;
pub mod query_interface;
pub mod query_tools;
pub mod utils;

mod builders;
mod tree;

pub use builders::{
    BuildProgress, CancelFlag, FnProgress, KdTreeBuilder, NoProgress, DEFAULT_BUCKET_SIZE,
};
pub use pattern::{PatternRecord, TerminalNode};
pub use query_tools::RadiusBound;
pub use tree::{KdTree, Neighbour};
