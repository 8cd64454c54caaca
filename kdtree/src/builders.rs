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

//! Construction of a kd-tree.
//!
//! Patterns are pushed into a [`KdTreeBuilder`] and then partitioned in one pass. Each recursion step picks the
//! axis with the largest spread (population variance), sorts its slice of the pattern buffer along that axis
//! and splits it at the median. The recursion works on subslices of a single owned buffer, so when it is done the
//! buffer is already in leaf order and every bucket is a contiguous range of it.

use crate::errors::{KdError, KdResult};
use crate::node::{KdNode, NonterminalNode, TerminalBucket};
use crate::pattern::{PatternRecord, TerminalNode};
use crate::tree::KdTree;
use crate::utils::{read_yaml, yaml_usize};
use log::{debug, info};
use pbr::ProgressBar;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Default number of patterns a leaf may hold.
pub const DEFAULT_BUCKET_SIZE: usize = 4;

/// Receives progress reports during a build and can ask for the build to stop.
///
/// The builder calls `set_progress` after every finished pair of subtrees with the fraction of patterns placed
/// in a bucket so far, and `is_cancelled` before every subtree it starts.
pub trait BuildProgress {
    /// Fraction of the patterns that have been placed, in `[0, 1]`.
    fn set_progress(&mut self, fraction: f64);
    /// Return true to abort the build with [`KdError::BuildCancelled`].
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Ignores progress and never cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl BuildProgress for NoProgress {
    fn set_progress(&mut self, _fraction: f64) {}
}

/// Drives a terminal progress bar. The bar's total should be the number of patterns.
impl<W: Write> BuildProgress for ProgressBar<W> {
    fn set_progress(&mut self, fraction: f64) {
        let placed = (fraction * self.total as f64).round() as u64;
        self.set(placed);
    }
}

/// Wraps a closure that sees every progress report. It returns false to cancel the build.
pub struct FnProgress<F> {
    callback: F,
    cancelled: bool,
}

impl<F: FnMut(f64) -> bool> FnProgress<F> {
    /// Wraps the closure
    pub fn new(callback: F) -> FnProgress<F> {
        FnProgress {
            callback,
            cancelled: false,
        }
    }
}

impl<F: FnMut(f64) -> bool> BuildProgress for FnProgress<F> {
    fn set_progress(&mut self, fraction: f64) {
        if !(self.callback)(fraction) {
            self.cancelled = true;
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// A cancellation flag that can be flipped from another thread while a build is running.
#[derive(Debug, Default, Clone)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
}

impl CancelFlag {
    /// A fresh, unset flag
    pub fn new() -> CancelFlag {
        CancelFlag::default()
    }

    /// Asks any build watching this flag to stop.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

impl BuildProgress for CancelFlag {
    fn set_progress(&mut self, _fraction: f64) {}

    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// A construction object for a kd-tree.
///
/// The builder owns the patterns until [`KdTreeBuilder::build`] succeeds, which moves them into the tree and
/// leaves the builder empty, ready for a new set. If the build is cancelled the patterns are handed back to the
/// builder, possibly reordered. Building again keeps the same patterns and answers queries the same way,
/// although patterns with tied coordinates may sit at different indexes.
#[derive(Debug)]
pub struct KdTreeBuilder<T> {
    pub(crate) dim: usize,
    pub(crate) bucket_size: usize,
    pub(crate) verbosity: u32,
    patterns: Vec<PatternRecord<T>>,
}

impl<T> KdTreeBuilder<T> {
    /// Creates a new builder for patterns of dimension `dim` with a bucket size of 4.
    pub fn new(dim: usize) -> KdTreeBuilder<T> {
        KdTreeBuilder {
            dim,
            bucket_size: DEFAULT_BUCKET_SIZE,
            verbosity: 0,
            patterns: Vec::new(),
        }
    }

    /// Creates a builder from a yaml file.
    ///
    /// ```yaml
    /// ---
    /// data_dim: 5
    /// bucket_size: 4
    /// verbosity: 0
    /// ```
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> KdResult<Self> {
        let params = read_yaml(&path)?;
        let file_name = path.as_ref().to_string_lossy();
        let dim = yaml_usize(&params, "data_dim", &file_name, None)?;
        let mut builder = KdTreeBuilder::new(dim);
        builder.set_bucket_size(yaml_usize(
            &params,
            "bucket_size",
            &file_name,
            Some(DEFAULT_BUCKET_SIZE),
        )?);
        builder.set_verbosity(yaml_usize(&params, "verbosity", &file_name, Some(0))? as u32);
        Ok(builder)
    }

    /// Maximum number of patterns in a leaf. A bucket size of 0 is treated as 1.
    pub fn set_bucket_size(&mut self, x: usize) -> &mut Self {
        self.bucket_size = x.max(1);
        self
    }

    /// 0 is silent, 1 logs the build time, 2 and up also draws a progress bar.
    pub fn set_verbosity(&mut self, x: u32) -> &mut Self {
        self.verbosity = x;
        self
    }

    /// Dimensionality of the patterns
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The bucket size the next build will use
    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    /// Number of patterns waiting to be built
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True if no pattern has been added since the last build
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Adds a pattern with a payload.
    pub fn add_pattern<V: Into<Vec<f64>>>(&mut self, coordinates: V, payload: T) -> KdResult<()> {
        self.push(coordinates.into(), Some(payload))
    }

    /// Adds a pattern without a payload.
    pub fn add_point<V: Into<Vec<f64>>>(&mut self, coordinates: V) -> KdResult<()> {
        self.push(coordinates.into(), None)
    }

    fn push(&mut self, coordinates: Vec<f64>, payload: Option<T>) -> KdResult<()> {
        KdError::check_dim(self.dim, coordinates.len())?;
        self.patterns.push(PatternRecord::new(coordinates, payload));
        Ok(())
    }

    /// Builds the tree, with a progress bar on stderr if the verbosity is above 1.
    pub fn build(&mut self) -> KdResult<KdTree<T>> {
        if self.verbosity > 1 {
            let mut pb = ProgressBar::on(std::io::stderr(), self.patterns.len() as u64);
            pb.format("╢▌▌░╟");
            let tree = self.build_with_progress(&mut pb);
            pb.finish();
            tree
        } else {
            self.build_with_progress(&mut NoProgress)
        }
    }

    /// Builds the tree, reporting to and checking for cancellation on `progress`.
    pub fn build_with_progress<P: BuildProgress>(
        &mut self,
        progress: &mut P,
    ) -> KdResult<KdTree<T>> {
        let mut patterns = std::mem::take(&mut self.patterns);
        let now = Instant::now();
        let mut splitter = Splitter {
            dim: self.dim,
            bucket_size: self.bucket_size,
            total: patterns.len(),
            placed: 0,
            progress,
        };
        let root = match splitter.split(&mut patterns, 0) {
            Ok(root) => root,
            Err(e) => {
                info!("Build of {} patterns aborted: {}", patterns.len(), e);
                self.patterns = patterns;
                return Err(e);
            }
        };
        splitter.progress.set_progress(1.0);

        let tree = KdTree::new(
            self.dim,
            root,
            patterns.into_iter().map(TerminalNode::new).collect(),
        );
        if self.verbosity > 0 {
            info!(
                "Built a kd-tree over {} patterns of dimension {} in {:?}, depth {}, {} buckets",
                tree.len(),
                self.dim,
                now.elapsed(),
                tree.depth(),
                tree.bucket_count()
            );
        }
        Ok(tree)
    }
}

/// The recursive partitioning step and its progress bookkeeping.
struct Splitter<'a, P: BuildProgress> {
    dim: usize,
    bucket_size: usize,
    total: usize,
    placed: usize,
    progress: &'a mut P,
}

impl<'a, P: BuildProgress> Splitter<'a, P> {
    /// `offset` is the position of `patterns[0]` in the whole buffer.
    fn split<T>(
        &mut self,
        patterns: &mut [PatternRecord<T>],
        offset: usize,
    ) -> KdResult<Option<KdNode>> {
        if self.progress.is_cancelled() {
            return Err(KdError::BuildCancelled);
        }
        let n = patterns.len();
        if n == 0 {
            return Ok(None);
        }
        if n <= self.bucket_size {
            self.placed += n;
            return Ok(Some(KdNode::Terminal(TerminalBucket::new(offset..offset + n))));
        }

        let axis = max_spread_axis(patterns, self.dim);
        patterns.sort_by(|a, b| a.coordinate(axis).total_cmp(&b.coordinate(axis)));
        let mid = n / 2;
        let median = patterns[mid - 1].coordinate(axis);
        debug!(
            "Splitting {} patterns at offset {} on axis {} at {}",
            n, offset, axis, median
        );

        let (left_patterns, right_patterns) = patterns.split_at_mut(mid);
        let left = self.split(left_patterns, offset)?;
        let right = self.split(right_patterns, offset + mid)?;

        self.progress
            .set_progress(self.placed as f64 / self.total as f64);
        Ok(Some(KdNode::Nonterminal(NonterminalNode::new(
            axis, median, left, right,
        ))))
    }
}

/// Population variance of one coordinate over the patterns, `sum(x^2)/n - (sum(x)/n)^2`.
pub(crate) fn spread<T>(patterns: &[PatternRecord<T>], axis: usize) -> f64 {
    let n = patterns.len() as f64;
    let (sum, sum_sq) = patterns.iter().fold((0.0, 0.0), |(s, sq), p| {
        let x = p.coordinate(axis);
        (s + x, sq + x * x)
    });
    let mean = sum / n;
    sum_sq / n - mean * mean
}

/// The axis with the largest spread. Only a strictly larger spread replaces the current best, so ties go
/// to the lowest axis.
pub(crate) fn max_spread_axis<T>(patterns: &[PatternRecord<T>], dim: usize) -> usize {
    let mut best_axis = 0;
    let mut best_spread = f64::NEG_INFINITY;
    for axis in 0..dim {
        let s = spread(patterns, axis);
        if s > best_spread {
            best_spread = s;
            best_axis = axis;
        }
    }
    best_axis
}
