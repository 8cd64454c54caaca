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

use kdtree::{KdTree, KdTreeBuilder};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn build_tree(count: usize, dim: usize) -> KdTree<usize> {
    let mut rng = SmallRng::seed_from_u64(0);
    let mut builder = KdTreeBuilder::new(dim);
    for i in 0..count {
        let p: Vec<f64> = (0..dim).map(|_| rng.gen::<f64>()).collect();
        builder.add_pattern(p, i).unwrap();
    }
    builder.build().unwrap()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("Build 10000 x 5", |b| b.iter(|| build_tree(black_box(10_000), 5)));

    let tree = build_tree(100_000, 5);
    let query = [0.5; 5];
    c.bench_function("KNN 10 of 100000 x 5", |b| {
        b.iter(|| tree.knn(black_box(&query), 10))
    });
    c.bench_function("Radius 0.1 of 100000 x 5", |b| {
        b.iter(|| tree.within_radius(black_box(&query), 0.1))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
