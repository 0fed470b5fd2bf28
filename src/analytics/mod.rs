//! 推广链接点击统计
//!
//! 点击先进入内存缓冲区，再由后台任务批量写入存储。

pub mod global;
pub mod manager;
pub mod sink;

pub use manager::ClickManager;
pub use sink::ClickSink;

/// 记录一次推广链接点击
///
/// 服务进程内有全局 ClickManager 时走缓冲；否则（命令行、测试）直接写入存储。
pub async fn record_referral_click(
    storage: &crate::storage::SeaOrmStorage,
    link_id: i64,
) -> crate::errors::Result<()> {
    match global::get_click_manager() {
        Some(manager) => {
            manager.increment(link_id);
            Ok(())
        }
        None => {
            storage
                .record_link_clicks(&[(link_id, 1)], chrono::Utc::now().date_naive())
                .await
        }
    }
}
