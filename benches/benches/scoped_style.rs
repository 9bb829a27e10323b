// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use understory_scoped_style::{
    ClassNameMap, ComponentKey, InstanceStyles, RuleTree, RuleTreeBuilder, StyleRuntime,
    StyleSet, StylesheetCache, merge_class_names, partition,
};
use understory_scoped_style_ref::{RefEngine, StyleMedium};

#[derive(Clone, Default)]
struct Theme {
    accent: u32,
}

struct Widget;

/// Builds `rules` top-level rules, each with `decls` declarations. Every
/// `dynamic_every`-th declaration is a resolver.
fn build_tree(rules: usize, decls: usize, dynamic_every: usize) -> RuleTree<Theme> {
    let mut tree = RuleTree::new();
    for r in 0..rules {
        let mut rule = RuleTreeBuilder::new();
        for d in 0..decls {
            let name = format!("prop{d}");
            rule = if dynamic_every != 0 && d % dynamic_every == 0 {
                rule.resolver(name, move |t: &Theme| format!("#{:06x}", t.accent + d as u32))
            } else {
                rule.literal(name, "1px")
            };
        }
        tree.insert(format!("rule{r}"), rule.build());
    }
    tree
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_scoped_style/classify");

    for &(rules, decls) in &[(4_usize, 8_usize), (32, 16), (128, 32)] {
        let tree = build_tree(rules, decls, 4);
        group.bench_function(format!("partition(rules={rules},decls={decls})"), |b| {
            b.iter(|| black_box(partition(black_box(&tree))));
        });
    }

    group.finish();
}

fn bench_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_scoped_style/cache");
    let set = StyleSet::new(build_tree(16, 8, 4));

    group.bench_function("get_or_create_hit", |b| {
        let medium = StyleMedium::new();
        let mut engine = RefEngine::new(&medium);
        let mut cache = StylesheetCache::new();
        let _ = cache
            .get_or_create(ComponentKey::of::<Widget>(), &set, &mut engine)
            .expect("valid rules compile");
        b.iter(|| {
            let hit = cache
                .get_or_create(ComponentKey::of::<Widget>(), &set, &mut engine)
                .expect("valid rules compile");
            black_box(hit);
        });
    });

    group.bench_function("get_or_create_miss", |b| {
        b.iter_batched(
            || (StylesheetCache::new(), RefEngine::new(&StyleMedium::new())),
            |(mut cache, mut engine)| {
                let miss = cache
                    .get_or_create(ComponentKey::of::<Widget>(), &set, &mut engine)
                    .expect("valid rules compile");
                black_box(miss);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_scoped_style/merge");

    for &n in &[1_usize, 4, 16] {
        let statics: ClassNameMap = (0..n)
            .map(|i| (format!("rule{i}"), format!("rule{i}-1")))
            .collect();
        let dynamics: ClassNameMap = (0..n)
            .step_by(2)
            .map(|i| (format!("rule{i}"), format!("rule{i}-2")))
            .collect();
        group.bench_function(format!("merge_class_names(n={n})"), |b| {
            b.iter(|| black_box(merge_class_names(Some(&statics), Some(&dynamics))));
        });
    }

    group.finish();
}

fn bench_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_scoped_style/lifecycle");
    let set = StyleSet::new(build_tree(8, 8, 2));

    // A warm runtime: the static half is cached, so each cycle compiles only
    // the dynamic half.
    group.bench_function("mount_update_unmount", |b| {
        let medium = StyleMedium::new();
        let mut rt = StyleRuntime::new(RefEngine::new(&medium));
        let mut accent = 0_u32;
        b.iter(|| {
            let mut styles = InstanceStyles::new();
            styles
                .initialize(&mut rt, ComponentKey::of::<Widget>(), &set)
                .expect("valid rules compile");
            styles.attach(&mut rt).expect("initialized");
            accent = accent.wrapping_add(1);
            styles
                .update_config(Theme { accent })
                .expect("attached");
            black_box(styles.primary_class_name().map(str::len));
            styles.destroy(&mut rt);
        });
    });

    group.bench_function("update_config_attached", |b| {
        let medium = StyleMedium::new();
        let mut rt = StyleRuntime::new(RefEngine::new(&medium));
        let mut styles = InstanceStyles::new();
        styles
            .initialize(&mut rt, ComponentKey::of::<Widget>(), &set)
            .expect("valid rules compile");
        styles.attach(&mut rt).expect("initialized");
        let mut accent = 0_u32;
        b.iter(|| {
            accent = accent.wrapping_add(1);
            styles
                .update_config(Theme { accent })
                .expect("attached");
        });
        black_box(medium.len());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_classify,
    bench_cache,
    bench_merge,
    bench_lifecycle
);
criterion_main!(benches);
