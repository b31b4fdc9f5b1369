// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

use std::fmt::Write as _;
use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use manifest_parser::parse;

/// A manifest with globals and `count` applications.
fn sample_manifest(count: usize) -> String {
    let mut input = String::from("memory: 512M\nenv:\n  NODE_ENV: production\napplications:\n");
    for index in 0..count {
        let _ = write!(
            input,
            "- name: app-{index}\n  host: \"app-{index}-host\"\n  instances: 2\n  env:\n    INDEX: \"{index}\"\n  services:\n  - db-{index}\n"
        );
    }
    input
}

pub fn benchmark_parse(c: &mut Criterion) {
    let input = sample_manifest(200);
    c.bench_function("parse_200_applications", |b| {
        b.iter(|| parse(black_box(&input)))
    });
}

pub fn benchmark_serialize(c: &mut Criterion) {
    let Ok(manifest) = parse(&sample_manifest(200)) else {
        return;
    };
    c.bench_function("serialize_200_applications", |b| {
        b.iter(|| black_box(&manifest).to_string())
    });
}

criterion_group!(benches, benchmark_parse, benchmark_serialize);
criterion_main!(benches);
