//! ClickManager 性能基准测试

use std::sync::Arc;

use affiliates::analytics::{ClickManager, ClickSink};
use criterion::{Criterion, criterion_group, criterion_main};
use tokio::time::Duration;

/// 空 sink，只用于测试 increment 性能
struct NoopSink;

#[async_trait::async_trait]
impl ClickSink for NoopSink {
    async fn flush_clicks(&self, _updates: Vec<(i64, usize)>) -> anyhow::Result<()> {
        Ok(())
    }
}

fn create_manager() -> ClickManager {
    ClickManager::new(
        Arc::new(NoopSink) as Arc<dyn ClickSink>,
        Duration::from_secs(3600), // 长间隔，避免自动刷盘
        usize::MAX,                // 高阈值，避免阈值刷盘
    )
}

fn bench_increment_same_link(c: &mut Criterion) {
    let manager = create_manager();

    c.bench_function("increment/same_link", |b| {
        b.iter(|| manager.increment(42));
    });
}

fn bench_increment_many_links(c: &mut Criterion) {
    let manager = create_manager();
    let mut link_id = 0i64;

    c.bench_function("increment/many_links", |b| {
        b.iter(|| {
            manager.increment(link_id % 1000);
            link_id += 1;
        });
    });
}

fn bench_flush(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let manager = Arc::new(create_manager());

    c.bench_function("flush/1000_links", |b| {
        b.to_async(&rt).iter(|| {
            let m = Arc::clone(&manager);
            async move {
                for link_id in 0..1000 {
                    m.increment(link_id);
                }
                m.flush().await;
            }
        });
    });
}

criterion_group!(
    benches,
    bench_increment_same_link,
    bench_increment_many_links,
    bench_flush,
);
criterion_main!(benches);
