// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the tag file codec and the file-backed tag store.

use std::collections::BTreeSet;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use scanwerk_storage::{FileTagStore, TagStorage, decode_tags, encode_tags};

fn sample_tags(count: usize) -> BTreeSet<String> {
    (0..count).map(|i| format!("tag-{i:05}")).collect()
}

/// Encode and decode tag sets from a handful of labels up to a large archive.
fn bench_codec(c: &mut Criterion) {
    for count in [10usize, 1_000, 10_000] {
        let tags = sample_tags(count);
        let encoded = encode_tags(&tags).expect("encode failed");

        c.bench_function(&format!("encode_tags ({count})"), |b| {
            b.iter(|| black_box(encode_tags(black_box(&tags)).expect("encode failed")));
        });

        c.bench_function(&format!("decode_tags ({count})"), |b| {
            b.iter(|| black_box(decode_tags(black_box(&encoded)).expect("decode failed")));
        });
    }
}

/// Full read-modify-rewrite cycle against a store holding 1,000 tags.
fn bench_add_remove(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let store = FileTagStore::new(dir.path().join("tags.bin"));
    for tag in sample_tags(1_000) {
        store.add_tag(&tag).expect("seed failed");
    }

    c.bench_function("add_remove_tag (1000 stored)", |b| {
        b.iter(|| {
            store.add_tag(black_box("bench-tag")).expect("add failed");
            store.remove_tag(black_box("bench-tag")).expect("remove failed");
        });
    });
}

criterion_group!(benches, bench_codec, bench_add_remove);
criterion_main!(benches);
