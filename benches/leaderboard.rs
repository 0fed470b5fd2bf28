//! 排行榜与分类树性能基准测试

use std::collections::HashMap;

use affiliates::services::compute_standings;
use affiliates::storage::backend::build_category_tree;
use affiliates::storage::{Category, UserClickTotal};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

/// 模拟两个汇总查询的结果：约 1/10 的用户 SUM 为 NULL
fn totals(users: i64, salt: i64) -> Vec<UserClickTotal> {
    (1..=users)
        .map(|user_id| UserClickTotal {
            user_id,
            clicks: if user_id % 10 == salt {
                None
            } else {
                Some((user_id * 7919 + salt) % 5000)
            },
        })
        .collect()
}

fn bench_compute_standings(c: &mut Criterion) {
    let mut group = c.benchmark_group("leaderboard/compute_standings");

    for size in [1_000i64, 10_000, 100_000] {
        let links = totals(size, 3);
        let points = totals(size, 7);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| compute_standings(&links, &points));
        });
    }

    group.finish();
}

/// 全部用户同分时只按 user_id 排序
fn bench_all_tied(c: &mut Criterion) {
    let links: Vec<UserClickTotal> = (1..=10_000)
        .rev()
        .map(|user_id| UserClickTotal {
            user_id,
            clicks: Some(1),
        })
        .collect();

    c.bench_function("leaderboard/all_tied_10000", |b| {
        b.iter(|| compute_standings(&links, &[]));
    });
}

fn bench_category_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("categories/build_tree");

    for size in [50i64, 500, 5_000] {
        // 每个节点挂在 id/4 下，形成较深的树
        let categories: Vec<Category> = (1..=size)
            .map(|id| Category {
                id,
                name: format!("category_{}", id),
                parent_id: (id > 4).then_some(id / 4),
            })
            .collect();
        let direct: HashMap<i64, i64> = (1..=size).map(|id| (id, id % 13)).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| build_category_tree(categories.clone(), &direct));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compute_standings,
    bench_all_tied,
    bench_category_tree,
);
criterion_main!(benches);
