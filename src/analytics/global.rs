use std::sync::{Arc, OnceLock};
use tracing::trace;

use super::manager::ClickManager;

static GLOBAL_CLICK_MANAGER: OnceLock<Arc<ClickManager>> = OnceLock::new();

/// 初始化全局点击管理器（只允许初始化一次）
pub fn set_global_click_manager(manager: Arc<ClickManager>) {
    if GLOBAL_CLICK_MANAGER.set(manager).is_err() {
        tracing::warn!("Global click manager already set, ignoring");
    }
}

pub fn get_click_manager() -> Option<&'static Arc<ClickManager>> {
    let manager = GLOBAL_CLICK_MANAGER.get();
    if manager.is_none() {
        trace!("Global click manager not initialized, writing clicks directly");
    }
    manager
}
