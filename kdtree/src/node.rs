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

//! The two kinds of node in a kd-tree and the branch and bound recursion over them.
//!
//! Internal nodes hold no patterns, only the split axis, the split value and up to two subtrees. Leaves are
//! buckets, a contiguous run of the tree's pattern arena. The whole tree is a plain ownership tree of boxes.

use crate::bounds::SearchBounds;
use crate::pattern::TerminalNode;
use crate::query_tools::CandidateHeap;
use std::ops::Range;

/// A node of the tree, either a split or a bucket of patterns.
#[derive(Debug, Clone, PartialEq)]
pub enum KdNode {
    /// Internal split node
    Nonterminal(NonterminalNode),
    /// Leaf bucket
    Terminal(TerminalBucket),
}

/// Internal node, splits its region along one axis at the median of the patterns it covers.
///
/// Patterns whose coordinate along `split_attribute` is at most `split_value` went left, the rest went right.
/// Patterns equal to the split value may end up on both sides, so the left region is closed above and the right
/// region closed below. Either subtree may be absent, which just means there are no patterns there.
#[derive(Debug, Clone, PartialEq)]
pub struct NonterminalNode {
    pub(crate) split_attribute: usize,
    pub(crate) split_value: f64,
    pub(crate) left: Option<Box<KdNode>>,
    pub(crate) right: Option<Box<KdNode>>,
}

/// Leaf node. The bucket is a range into the tree's arena of terminal nodes, the order inside it means nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalBucket {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl NonterminalNode {
    pub(crate) fn new(
        split_attribute: usize,
        split_value: f64,
        left: Option<KdNode>,
        right: Option<KdNode>,
    ) -> NonterminalNode {
        NonterminalNode {
            split_attribute,
            split_value,
            left: left.map(Box::new),
            right: right.map(Box::new),
        }
    }

    /// The axis this node splits on
    pub fn split_attribute(&self) -> usize {
        self.split_attribute
    }

    /// The median the patterns were split at
    pub fn split_value(&self) -> f64 {
        self.split_value
    }

    /// The subtree of patterns at most the split value
    pub fn left(&self) -> Option<&KdNode> {
        self.left.as_deref()
    }

    /// The subtree of patterns at least the split value
    pub fn right(&self) -> Option<&KdNode> {
        self.right.as_deref()
    }
}

impl TerminalBucket {
    pub(crate) fn new(range: Range<usize>) -> TerminalBucket {
        TerminalBucket {
            start: range.start,
            end: range.end,
        }
    }

    /// Positions of the bucket's patterns in the tree's arena
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Number of patterns in the bucket
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Buckets are never built empty, but this keeps clippy happy.
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Everything one query carries through the recursion. Nothing in here is shared with other queries.
pub(crate) struct SearchContext<'a, T, H: CandidateHeap> {
    pub(crate) query: &'a [f64],
    pub(crate) nodes: &'a [TerminalNode<T>],
    pub(crate) bounds: SearchBounds,
    pub(crate) heap: H,
    pub(crate) tested: usize,
}

impl<'a, T, H: CandidateHeap> SearchContext<'a, T, H> {
    pub(crate) fn new(query: &'a [f64], nodes: &'a [TerminalNode<T>], heap: H) -> Self {
        SearchContext {
            query,
            nodes,
            bounds: SearchBounds::unbounded(query.len()),
            heap,
            tested: 0,
        }
    }

    // The "done" answer is only trusted for regions that hold the query. For a far region the ball being clear
    // of every face can also mean the ball misses the region entirely, which says nothing about the rest of the tree.
    #[inline]
    fn finished(&self, holds_query: bool) -> bool {
        holds_query && self.bounds.ball_within(self.query, self.heap.max_dist())
    }
}

impl KdNode {
    /// Number of patterns under this node
    pub fn len(&self) -> usize {
        match self {
            KdNode::Terminal(bucket) => bucket.len(),
            KdNode::Nonterminal(node) => {
                node.left().map(|n| n.len()).unwrap_or(0)
                    + node.right().map(|n| n.len()).unwrap_or(0)
            }
        }
    }

    /// True if there are no patterns under this node
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of levels, a lone bucket has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            KdNode::Terminal(_) => 1,
            KdNode::Nonterminal(node) => {
                1 + node
                    .left()
                    .map(|n| n.depth())
                    .unwrap_or(0)
                    .max(node.right().map(|n| n.depth()).unwrap_or(0))
            }
        }
    }

    /// Number of leaf buckets under this node
    pub fn bucket_count(&self) -> usize {
        match self {
            KdNode::Terminal(_) => 1,
            KdNode::Nonterminal(node) => {
                node.left().map(|n| n.bucket_count()).unwrap_or(0)
                    + node.right().map(|n| n.bucket_count()).unwrap_or(0)
            }
        }
    }

    /// Recursive branch and bound search. Returns true once no unexplored part of the tree can improve the
    /// candidates, at which point every caller up the stack stops as well.
    pub(crate) fn search<T, H: CandidateHeap>(
        &self,
        ctx: &mut SearchContext<T, H>,
        holds_query: bool,
    ) -> bool {
        match self {
            KdNode::Terminal(bucket) => {
                let nodes = ctx.nodes;
                for (i, node) in nodes[bucket.range()].iter().enumerate() {
                    let dist = node.sq_distance(ctx.query);
                    ctx.tested += 1;
                    ctx.heap.push_candidate(bucket.start + i, dist);
                }
                ctx.finished(holds_query)
            }
            KdNode::Nonterminal(node) => {
                let axis = node.split_attribute;
                let query_goes_left = ctx.query[axis] <= node.split_value;
                let (near, far) = if query_goes_left {
                    (node.left(), node.right())
                } else {
                    (node.right(), node.left())
                };

                if let Some(near) = near {
                    let old = if query_goes_left {
                        ctx.bounds.swap_upper(axis, node.split_value)
                    } else {
                        ctx.bounds.swap_lower(axis, node.split_value)
                    };
                    let done = near.search(ctx, holds_query);
                    if query_goes_left {
                        ctx.bounds.swap_upper(axis, old);
                    } else {
                        ctx.bounds.swap_lower(axis, old);
                    }
                    if done {
                        return true;
                    }
                }

                if let Some(far) = far {
                    let old = if query_goes_left {
                        ctx.bounds.swap_lower(axis, node.split_value)
                    } else {
                        ctx.bounds.swap_upper(axis, node.split_value)
                    };
                    let done = ctx.bounds.overlaps_ball(ctx.query, ctx.heap.max_dist())
                        && far.search(ctx, false);
                    if query_goes_left {
                        ctx.bounds.swap_lower(axis, old);
                    } else {
                        ctx.bounds.swap_upper(axis, old);
                    }
                    if done {
                        return true;
                    }
                }

                ctx.finished(holds_query)
            }
        }
    }
}
