//! 补偿开关
//!
//! 运行中暂停/恢复重力补偿。关闭期间循环照常计时但不发送任何命令，
//! 执行器切换到何种模式由宿主进程决定。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 重力补偿开关（可克隆，所有副本共享同一状态）
#[derive(Debug, Clone)]
pub struct CompensationSwitch {
    enabled: Arc<AtomicBool>,
}

impl CompensationSwitch {
    /// 创建开关
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    /// 打开补偿
    pub fn enable(&self) {
        self.set(true);
    }

    /// 关闭补偿
    pub fn disable(&self) {
        self.set(false);
    }

    /// 设置开关，返回之前的状态
    pub fn set(&self, enabled: bool) -> bool {
        let previous = self.enabled.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            tracing::info!(
                "Gravity compensation {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        previous
    }

    /// 是否打开
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

impl Default for CompensationSwitch {
    fn default() -> Self {
        Self::new(true)
    }
}
