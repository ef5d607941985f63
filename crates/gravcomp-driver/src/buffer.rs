//! 关节状态缓冲区
//!
//! 传感器任务是唯一写者，控制循环是唯一读者。
//! 样本整体替换（`ArcSwap` 原子交换指针），读者只会看到某次完整写入的结果，
//! 不会看到写了一半的样本；读写双方都只持有一次指针交换的时间，
//! 力矩计算在读者拿到的私有快照上进行。

use arc_swap::ArcSwapOption;
use gravcomp_model::JointState;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 最新关节状态缓冲区
#[derive(Debug, Default)]
pub struct JointStateBuffer {
    latest: ArcSwapOption<JointState>,
    writes: AtomicU64,
}

impl JointStateBuffer {
    /// 创建空缓冲区
    pub fn new() -> Self {
        Self::default()
    }

    /// 原子替换最新样本（不做任何校验或变换）
    pub fn write(&self, sample: JointState) {
        self.latest.store(Some(Arc::new(sample)));
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    /// 读取最新样本及其年龄
    ///
    /// 尚未写入过样本时返回 `None`。
    pub fn read_latest(&self) -> Option<(Arc<JointState>, Duration)> {
        self.read_latest_at(Instant::now())
    }

    /// 以 `now` 为基准读取最新样本及其年龄
    ///
    /// 样本时间戳晚于 `now` 时年龄为 0。
    pub fn read_latest_at(&self, now: Instant) -> Option<(Arc<JointState>, Duration)> {
        let sample = self.latest.load_full()?;
        let age = now.saturating_duration_since(sample.timestamp);
        Some((sample, age))
    }

    /// 累计写入次数
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// 清空缓冲区（之后的读取视为无输入）
    pub fn clear(&self) {
        self.latest.store(None);
    }
}
