//! 点击缓冲管理器
//!
//! - 按链接 id 在 DashMap 中累加点击
//! - 定时刷盘，缓冲总数达到阈值时提前刷盘
//! - 刷盘失败时把数据放回缓冲区

use dashmap::DashMap;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};
use tracing::{debug, trace, warn};

use crate::analytics::ClickSink;

struct ClickBuffer {
    data: DashMap<i64, usize>,
    /// 缓冲区中的总点击数（用于阈值判断）
    total_clicks: AtomicUsize,
    /// 刷盘锁，保证同一时刻只有一个刷盘任务
    flush_lock: Mutex<()>,
    /// 阈值触发的刷盘任务是否已在排队
    flush_pending: AtomicBool,
}

impl ClickBuffer {
    fn new() -> Self {
        Self {
            data: DashMap::new(),
            total_clicks: AtomicUsize::new(0),
            flush_lock: Mutex::new(()),
            flush_pending: AtomicBool::new(false),
        }
    }

    fn increment(&self, link_id: i64) -> usize {
        *self.data.entry(link_id).or_insert(0) += 1;
        self.total_clicks.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// 取出当前所有计数；只删除快照中的 key，窗口期内新增的点击留在缓冲区
    fn drain(&self) -> Vec<(i64, usize)> {
        let keys: Vec<i64> = self.data.iter().map(|r| *r.key()).collect();

        let mut updates = Vec::with_capacity(keys.len());
        let mut removed = 0;
        for key in keys {
            if let Some((k, v)) = self.data.remove(&key) {
                removed += v;
                updates.push((k, v));
            }
        }

        if removed > 0 {
            self.total_clicks
                .fetch_update(Ordering::Release, Ordering::Relaxed, |current| {
                    Some(current.saturating_sub(removed))
                })
                .ok();
        }
        updates
    }

    fn restore(&self, updates: Vec<(i64, usize)>) {
        let mut restored = 0;
        for (k, v) in updates {
            *self.data.entry(k).or_insert(0) += v;
            restored += v;
        }
        self.total_clicks.fetch_add(restored, Ordering::Relaxed);
    }

    fn total(&self) -> usize {
        self.total_clicks.load(Ordering::Relaxed)
    }
}

/// 点击管理器
#[derive(Clone)]
pub struct ClickManager {
    buffer: Arc<ClickBuffer>,
    sink: Arc<dyn ClickSink>,
    flush_interval: Duration,
    max_clicks_before_flush: usize,
}

impl ClickManager {
    pub fn new(
        sink: Arc<dyn ClickSink>,
        flush_interval: Duration,
        max_clicks_before_flush: usize,
    ) -> Self {
        Self {
            buffer: Arc::new(ClickBuffer::new()),
            sink,
            flush_interval,
            max_clicks_before_flush,
        }
    }

    /// 记录一次点击；达到阈值时在后台触发刷盘
    pub fn increment(&self, link_id: i64) {
        let current = self.buffer.increment(link_id);
        trace!("ClickManager: link {} clicked, buffered {}", link_id, current);

        if current >= self.max_clicks_before_flush
            && self
                .buffer
                .flush_pending
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
                .is_ok()
        {
            let buffer = Arc::clone(&self.buffer);
            let sink = Arc::clone(&self.sink);
            tokio::spawn(async move {
                if let Ok(_guard) = buffer.flush_lock.try_lock() {
                    Self::flush_buffer(&buffer, &sink).await;
                }
                buffer.flush_pending.store(false, Ordering::Release);
            });
        }
    }

    /// 定时刷盘循环
    pub async fn start_background_task(&self) {
        loop {
            sleep(self.flush_interval).await;
            if let Ok(_guard) = self.buffer.flush_lock.try_lock() {
                debug!("ClickManager: scheduled flush");
                Self::flush_buffer(&self.buffer, &self.sink).await;
            } else {
                trace!("ClickManager: flush already in progress, skipping");
            }
        }
    }

    /// 立即刷盘并等待完成
    pub async fn flush(&self) {
        let _guard = self.buffer.flush_lock.lock().await;
        Self::flush_buffer(&self.buffer, &self.sink).await;
    }

    async fn flush_buffer(buffer: &ClickBuffer, sink: &Arc<dyn ClickSink>) {
        let updates = buffer.drain();
        if updates.is_empty() {
            return;
        }

        let count = updates.len();
        match sink.flush_clicks(updates.clone()).await {
            Ok(()) => debug!("ClickManager: flushed clicks for {} links", count),
            Err(e) => {
                buffer.restore(updates);
                warn!(
                    "ClickManager: flush failed: {}, {} entries restored to buffer",
                    e, count
                );
            }
        }
    }

    /// 当前缓冲的点击总数
    pub fn buffer_size(&self) -> usize {
        self.buffer.total()
    }
}
