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

//! # The kd-tree
//!
//! A [`KdTree`] is built once by a [`crate::KdTreeBuilder`] and never changes afterwards. It owns every pattern
//! in an arena of terminal nodes, ordered so that each leaf bucket is a contiguous run of the arena, and a strict
//! ownership tree of split nodes on top.
//!
//! Both queries are the Friedman, Bentley and Finkel branch and bound search. The query walks down to the bucket
//! on its side of every split, then backs out, visiting the far side of a split only when the far region could
//! still hold something closer than the current worst candidate. All comparisons are on squared distances, the
//! square root is taken once per returned neighbour.
//!
//! Queries take `&self` and keep all of their state on the stack, so a tree can be shared between threads.

use crate::errors::{KdError, KdResult};
use crate::node::{KdNode, SearchContext};
use crate::pattern::{PatternRecord, TerminalNode};
use crate::query_tools::{CandidateHeap, KnnQueryHeap, RadiusBound, RadiusQueryHeap};
use log::trace;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One result of a query. The payload is borrowed from the tree.
#[derive(Debug, PartialEq)]
pub struct Neighbour<'a, T> {
    /// Euclidean distance to the query
    pub distance: f64,
    /// Position of the pattern in the tree, see [`KdTree::pattern`]
    pub index: usize,
    /// The payload the pattern was added with
    pub payload: Option<&'a T>,
}

impl<'a, T> Clone for Neighbour<'a, T> {
    fn clone(&self) -> Self {
        Neighbour {
            distance: self.distance,
            index: self.index,
            payload: self.payload,
        }
    }
}

/// The immutable kd-tree.
#[derive(Debug)]
pub struct KdTree<T> {
    dim: usize,
    root: Option<KdNode>,
    nodes: Vec<TerminalNode<T>>,
    tested: AtomicUsize,
}

impl<T> KdTree<T> {
    pub(crate) fn new(dim: usize, root: Option<KdNode>, nodes: Vec<TerminalNode<T>>) -> KdTree<T> {
        KdTree {
            dim,
            root,
            nodes,
            tested: AtomicUsize::new(0),
        }
    }

    /// Number of patterns in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the tree has no patterns
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dimensionality of the patterns
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The root node, `None` for an empty tree
    pub fn root(&self) -> Option<&KdNode> {
        self.root.as_ref()
    }

    /// The pattern at a position in the tree's arena. Neighbours carry this position in [`Neighbour::index`].
    ///
    /// Panics if the index is out of range.
    pub fn pattern(&self, index: usize) -> &PatternRecord<T> {
        self.nodes[index].pattern()
    }

    /// Iterates over every pattern in arena order
    pub fn patterns(&self) -> impl Iterator<Item = &PatternRecord<T>> {
        self.nodes.iter().map(|n| n.pattern())
    }

    /// Number of levels of the tree, 0 when empty
    pub fn depth(&self) -> usize {
        self.root.as_ref().map(|r| r.depth()).unwrap_or(0)
    }

    /// Number of leaf buckets
    pub fn bucket_count(&self) -> usize {
        self.root.as_ref().map(|r| r.bucket_count()).unwrap_or(0)
    }

    /// How many patterns had their distance computed by the most recently finished query. Lower means better
    /// pruning. Concurrent queries overwrite each other's count.
    pub fn tested_patterns_count(&self) -> usize {
        self.tested.load(Ordering::Relaxed)
    }

    /// # K Nearest Neighbours
    ///
    /// Returns the `k` patterns closest to the query, sorted by increasing distance. If several patterns tie
    /// with the `k`-th distance all of them are returned, so the result can be longer than `k`.
    ///
    /// Fails with `DimensionMismatch` if the query has the wrong length and with `InvalidArgument` if `k`
    /// exceeds the number of patterns in the tree.
    pub fn knn(&self, query: &[f64], k: usize) -> KdResult<Vec<Neighbour<T>>> {
        KdError::check_dim(self.dim, query.len())?;
        if k > self.len() {
            return Err(KdError::invalid_argument(format!(
                "asked for {} neighbours but the tree only holds {} patterns",
                k,
                self.len()
            )));
        }
        if k == 0 {
            self.tested.store(0, Ordering::Relaxed);
            return Ok(Vec::new());
        }
        Ok(self.search(query, KnnQueryHeap::new(k)))
    }

    /// Every pattern strictly closer than `max_distance` to the query, sorted by increasing distance.
    pub fn within_radius(&self, query: &[f64], max_distance: f64) -> KdResult<Vec<Neighbour<T>>> {
        self.within_radius_bounded(query, max_distance, RadiusBound::Exclusive)
    }

    /// Radius query with a choice of whether patterns at exactly `max_distance` are included.
    pub fn within_radius_bounded(
        &self,
        query: &[f64],
        max_distance: f64,
        bound: RadiusBound,
    ) -> KdResult<Vec<Neighbour<T>>> {
        KdError::check_dim(self.dim, query.len())?;
        Ok(self.search(query, RadiusQueryHeap::new(max_distance, bound)))
    }

    fn search<H: CandidateHeap>(&self, query: &[f64], heap: H) -> Vec<Neighbour<T>> {
        let mut ctx = SearchContext::new(query, &self.nodes, heap);
        if let Some(root) = &self.root {
            root.search(&mut ctx, true);
        }
        trace!(
            "Query tested {} of {} patterns",
            ctx.tested,
            self.nodes.len()
        );
        self.tested.store(ctx.tested, Ordering::Relaxed);
        ctx.heap
            .unpack()
            .iter()
            .map(|s| Neighbour {
                distance: s.sq_dist().sqrt(),
                index: s.index(),
                payload: self.nodes[s.index()].payload(),
            })
            .collect()
    }
}
