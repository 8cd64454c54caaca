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

//! Checks the tree against a linear scan on random data.

extern crate kdtree;
#[macro_use]
extern crate assert_approx_eq;

use kdtree::{KdTree, KdTreeBuilder, Neighbour};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn random_points(count: usize, dim: usize, rng: &mut SmallRng) -> Vec<Vec<f64>> {
    (0..count)
        .map(|_| (0..dim).map(|_| rng.gen_range(-10.0..10.0)).collect())
        .collect()
}

fn build(points: &[Vec<f64>], bucket_size: usize) -> KdTree<usize> {
    let dim = points[0].len();
    let mut builder = KdTreeBuilder::new(dim);
    builder.set_bucket_size(bucket_size);
    for (i, p) in points.iter().enumerate() {
        builder.add_pattern(p.clone(), i).unwrap();
    }
    builder.build().unwrap()
}

fn brute_force(points: &[Vec<f64>], query: &[f64]) -> Vec<(f64, usize)> {
    let mut dists: Vec<(f64, usize)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let d: f64 = p.iter().zip(query).map(|(a, b)| (a - b) * (a - b)).sum();
            (d.sqrt(), i)
        })
        .collect();
    dists.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    dists
}

fn payload_ids(found: &[Neighbour<usize>]) -> Vec<usize> {
    let mut ids: Vec<usize> = found.iter().map(|n| *n.payload.unwrap()).collect();
    ids.sort();
    ids
}

fn check_knn(points: &[Vec<f64>], tree: &KdTree<usize>, query: &[f64], k: usize) {
    let truth = brute_force(points, query);
    let found = tree.knn(query, k).unwrap();
    assert!(found.len() >= k, "asked for {} got {}", k, found.len());
    for pair in found.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
    let worst = found.last().unwrap().distance;
    assert_approx_eq!(worst, truth[k - 1].0, 1e-9);
    let ids = payload_ids(&found);
    for (d, i) in truth.iter() {
        if *d < worst {
            assert!(ids.binary_search(i).is_ok(), "missed pattern {} at {}", i, d);
        }
    }
    for n in found.iter() {
        assert_approx_eq!(n.distance, truth.iter().find(|t| t.1 == *n.payload.unwrap()).unwrap().0, 1e-9);
    }
}

#[test]
fn knn_matches_linear_scan() {
    let mut rng = SmallRng::seed_from_u64(42);
    for dim in [1, 2, 5, 20].iter() {
        for bucket_size in [1, 4, 16].iter() {
            let points = random_points(300, *dim, &mut rng);
            let tree = build(&points, *bucket_size);
            assert_eq!(tree.len(), 300);
            for _ in 0..20 {
                let query: Vec<f64> = (0..*dim).map(|_| rng.gen_range(-12.0..12.0)).collect();
                for k in [1, 3, 10].iter() {
                    check_knn(&points, &tree, &query, *k);
                }
            }
        }
    }
}

#[test]
fn nearest_is_argmin() {
    let mut rng = SmallRng::seed_from_u64(7);
    for dim in [1, 2, 5, 20].iter() {
        let points = random_points(200, *dim, &mut rng);
        let tree = build(&points, 4);
        for _ in 0..50 {
            let query: Vec<f64> = (0..*dim).map(|_| rng.gen_range(-10.0..10.0)).collect();
            let truth = brute_force(&points, &query);
            let found = tree.knn(&query, 1).unwrap();
            assert_eq!(found.len(), 1);
            assert_eq!(*found[0].payload.unwrap(), truth[0].1);
            assert!(found[0].distance >= 0.0);
        }
    }
}

#[test]
fn radius_matches_linear_scan() {
    let mut rng = SmallRng::seed_from_u64(3);
    for dim in [1, 2, 5, 20].iter() {
        let points = random_points(250, *dim, &mut rng);
        let tree = build(&points, 4);
        for _ in 0..20 {
            let query: Vec<f64> = (0..*dim).map(|_| rng.gen_range(-10.0..10.0)).collect();
            let radius = rng.gen_range(0.5..(4.0 * (*dim as f64).sqrt()));
            let found = tree.within_radius(&query, radius).unwrap();
            for n in found.iter() {
                assert!(n.distance < radius);
            }
            let ids = payload_ids(&found);
            let truth: Vec<usize> = {
                let mut t: Vec<usize> = brute_force(&points, &query)
                    .iter()
                    .filter(|(d, _)| *d < radius)
                    .map(|(_, i)| *i)
                    .collect();
                t.sort();
                t
            };
            assert_eq!(ids, truth);
        }
    }
}

#[test]
fn k_equal_to_size_returns_everything() {
    let mut rng = SmallRng::seed_from_u64(11);
    let points = random_points(40, 3, &mut rng);
    let tree = build(&points, 4);
    let found = tree.knn(&[0.0, 0.0, 0.0], 40).unwrap();
    assert_eq!(found.len(), 40);
    let truth = brute_force(&points, &[0.0, 0.0, 0.0]);
    for (n, (d, _)) in found.iter().zip(truth.iter()) {
        assert_approx_eq!(n.distance, *d, 1e-9);
    }
}

#[test]
fn repeated_queries_are_identical() {
    let mut rng = SmallRng::seed_from_u64(5);
    let points = random_points(100, 4, &mut rng);
    let tree = build(&points, 4);
    let query = [0.5, -0.5, 1.0, 2.0];
    let first = tree.knn(&query, 7).unwrap();
    let second = tree.knn(&query, 7).unwrap();
    assert_eq!(first, second);
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.distance.to_bits(), b.distance.to_bits());
        assert!(std::ptr::eq(a.payload.unwrap(), b.payload.unwrap()));
    }
}

#[test]
fn duplicates_everywhere() {
    let mut builder = KdTreeBuilder::new(2);
    builder.set_bucket_size(1);
    for i in 0..30 {
        builder.add_pattern(vec![1.0, 1.0], i).unwrap();
    }
    builder.add_pattern(vec![3.0, 1.0], 30).unwrap();
    let tree = builder.build().unwrap();
    let found = tree.knn(&[1.0, 1.0], 2).unwrap();
    assert_eq!(found.len(), 30);
    assert!(found.iter().all(|n| n.distance == 0.0));
    let found = tree.knn(&[4.0, 1.0], 1).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(*found[0].payload.unwrap(), 30);
}

#[test]
fn pruning_beats_linear_scan() {
    let mut rng = SmallRng::seed_from_u64(9);
    let points = random_points(5000, 2, &mut rng);
    let tree = build(&points, 4);
    tree.knn(&[0.0, 0.0], 5).unwrap();
    assert!(tree.tested_patterns_count() < 500);
}
