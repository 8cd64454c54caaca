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

//! Hyper-rectangle bookkeeping for the branch and bound search.
//!
//! Every recursion node is associated with a region `[lower, upper]` of the space. The region starts as
//! all of `R^k` and each split tightens one side of it on the way down. The two predicates below decide
//! whether a region can still hold a better candidate and whether the search is finished.

/// Per dimension lower and upper bounds of the region the search is currently in.
/// The bounds are mutated in place while descending and restored on the way back up.
#[derive(Debug, Clone)]
pub struct SearchBounds {
    pub(crate) lower: Vec<f64>,
    pub(crate) upper: Vec<f64>,
}

impl SearchBounds {
    /// The unbounded region `(-inf, inf)^dim`
    pub fn unbounded(dim: usize) -> SearchBounds {
        SearchBounds {
            lower: vec![f64::NEG_INFINITY; dim],
            upper: vec![f64::INFINITY; dim],
        }
    }

    /// Lower bounds of the region
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Upper bounds of the region
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Replaces the upper bound on one axis and hands back the old one so it can be restored.
    #[inline]
    pub(crate) fn swap_upper(&mut self, axis: usize, value: f64) -> f64 {
        std::mem::replace(&mut self.upper[axis], value)
    }

    /// Replaces the lower bound on one axis and hands back the old one so it can be restored.
    #[inline]
    pub(crate) fn swap_lower(&mut self, axis: usize, value: f64) -> f64 {
        std::mem::replace(&mut self.lower[axis], value)
    }

    /// See [`ball_within_bounds`]
    #[inline]
    pub fn ball_within(&self, query: &[f64], worst_dist: f64) -> bool {
        ball_within_bounds(query, worst_dist, &self.lower, &self.upper)
    }

    /// See [`bounds_overlap_ball`]
    #[inline]
    pub fn overlaps_ball(&self, query: &[f64], worst_dist: f64) -> bool {
        bounds_overlap_ball(query, worst_dist, &self.lower, &self.upper)
    }

    /// True if the query lies inside the region (boundaries included).
    pub fn contains(&self, query: &[f64]) -> bool {
        query
            .iter()
            .zip(self.lower.iter().zip(&self.upper))
            .all(|(q, (l, u))| l <= q && q <= u)
    }
}

/// True iff the ball of squared radius `worst_dist` around the query does not reach any face of the region,
/// that is `(q_i - lower_i)^2 > worst_dist` and `(q_i - upper_i)^2 > worst_dist` on every axis.
///
/// For a region that contains the query this means no point outside the region can beat the current
/// candidates, so the whole search can stop.
pub fn ball_within_bounds(query: &[f64], worst_dist: f64, lower: &[f64], upper: &[f64]) -> bool {
    for ((q, l), u) in query.iter().zip(lower).zip(upper) {
        let to_lower = q - l;
        if !(to_lower * to_lower > worst_dist) {
            return false;
        }
        let to_upper = q - u;
        if !(to_upper * to_upper > worst_dist) {
            return false;
        }
    }
    true
}

/// True iff the region could hold a point at squared distance at most `worst_dist` from the query.
///
/// Accumulates the squared gap between the query and the region on every axis where the query falls
/// outside `[lower_i, upper_i]`, bailing out as soon as the running sum exceeds `worst_dist`.
pub fn bounds_overlap_ball(query: &[f64], worst_dist: f64, lower: &[f64], upper: &[f64]) -> bool {
    let mut sum = 0.0;
    for ((q, l), u) in query.iter().zip(lower).zip(upper) {
        if q < l {
            let gap = q - l;
            sum += gap * gap;
            if sum > worst_dist {
                return false;
            }
        } else if q > u {
            let gap = q - u;
            sum += gap * gap;
            if sum > worst_dist {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_region_contains_every_ball() {
        let bounds = SearchBounds::unbounded(3);
        assert!(bounds.ball_within(&[0.0, 1.0, -4.0], 1.0e12));
        assert!(bounds.overlaps_ball(&[0.0, 1.0, -4.0], 0.0));
        assert!(bounds.contains(&[0.0, 1.0, -4.0]));
    }

    #[test]
    fn ball_within_needs_every_face_farther_than_radius() {
        let lower = [0.0, 0.0];
        let upper = [10.0, 10.0];
        // 2 away from the closest face, so 4 is the squared clearance
        assert!(ball_within_bounds(&[2.0, 5.0], 3.9, &lower, &upper));
        assert!(!ball_within_bounds(&[2.0, 5.0], 4.0, &lower, &upper));
        assert!(!ball_within_bounds(&[9.5, 5.0], 1.0, &lower, &upper));
    }

    #[test]
    fn overlap_sums_the_axis_violations() {
        let lower = [0.0, 0.0];
        let upper = [1.0, 1.0];
        // inside the box, always overlaps
        assert!(bounds_overlap_ball(&[0.5, 0.5], 0.0, &lower, &upper));
        // 3 to the right and 4 above, squared gap 25
        assert!(bounds_overlap_ball(&[4.0, 5.0], 25.0, &lower, &upper));
        assert!(!bounds_overlap_ball(&[4.0, 5.0], 24.9, &lower, &upper));
        // below and to the left
        assert!(bounds_overlap_ball(&[-1.0, -1.0], 2.0, &lower, &upper));
        assert!(!bounds_overlap_ball(&[-1.0, -1.0], 1.5, &lower, &upper));
    }

    #[test]
    fn swaps_restore() {
        let mut bounds = SearchBounds::unbounded(2);
        let old = bounds.swap_upper(1, 3.0);
        assert_eq!(bounds.upper(), &[f64::INFINITY, 3.0]);
        assert!(!bounds.contains(&[0.0, 4.0]));
        bounds.swap_upper(1, old);
        let old = bounds.swap_lower(0, -1.0);
        assert_eq!(bounds.lower(), &[-1.0, f64::NEG_INFINITY]);
        bounds.swap_lower(0, old);
        assert!(bounds.contains(&[-100.0, 100.0]));
    }
}
