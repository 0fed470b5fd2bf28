/// 点击计数 Sink：接收 (link_id, 点击数) 批量写入
#[async_trait::async_trait]
pub trait ClickSink: Send + Sync {
    async fn flush_clicks(&self, updates: Vec<(i64, usize)>) -> anyhow::Result<()>;
}
