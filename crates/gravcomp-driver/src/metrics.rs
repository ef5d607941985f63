//! 控制循环指标
//!
//! 原子计数器，循环线程更新，任意线程读取快照，不引入锁竞争。

use std::sync::atomic::{AtomicU64, Ordering};

/// 控制循环实时指标
///
/// # 使用示例
///
/// ```rust
/// use gravcomp_driver::LoopMetrics;
/// use std::sync::atomic::Ordering;
///
/// let metrics = LoopMetrics::new();
/// metrics.ticks_total.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(metrics.snapshot().ticks_total, 1);
/// ```
#[derive(Debug, Default)]
pub struct LoopMetrics {
    /// 已执行的周期数
    pub ticks_total: AtomicU64,

    /// 成功交给执行器的命令数（含失效保护命令）
    pub commands_sent: AtomicU64,

    /// 输入过期或尚无输入的周期数（发送零力矩）
    pub stale_ticks: AtomicU64,

    /// 数值错误周期数（发送零力矩）
    pub numeric_faults: AtomicU64,

    /// 执行器拒收次数（队列满或已断开）
    pub sink_errors: AtomicU64,

    /// 补偿关闭期间的周期数
    pub disabled_ticks: AtomicU64,

    /// 周期超时（Overrun）次数
    ///
    /// 如果这个值持续增长，说明单周期耗时超过了控制周期。
    pub overruns: AtomicU64,
}

impl LoopMetrics {
    /// 创建新的指标实例（所有计数器初始化为 0）
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取指标快照
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        LoopMetricsSnapshot {
            ticks_total: self.ticks_total.load(Ordering::Relaxed),
            commands_sent: self.commands_sent.load(Ordering::Relaxed),
            stale_ticks: self.stale_ticks.load(Ordering::Relaxed),
            numeric_faults: self.numeric_faults.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
            disabled_ticks: self.disabled_ticks.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器
    pub fn reset(&self) {
        self.ticks_total.store(0, Ordering::Relaxed);
        self.commands_sent.store(0, Ordering::Relaxed);
        self.stale_ticks.store(0, Ordering::Relaxed);
        self.numeric_faults.store(0, Ordering::Relaxed);
        self.sink_errors.store(0, Ordering::Relaxed);
        self.disabled_ticks.store(0, Ordering::Relaxed);
        self.overruns.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// 指标快照（不可变）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopMetricsSnapshot {
    pub ticks_total: u64,
    pub commands_sent: u64,
    pub stale_ticks: u64,
    pub numeric_faults: u64,
    pub sink_errors: u64,
    pub disabled_ticks: u64,
    pub overruns: u64,
}

impl LoopMetricsSnapshot {
    /// 降级周期（过期 + 数值错误）占比（百分比）
    ///
    /// `ticks_total` 为 0 时返回 0.0。
    pub fn degraded_rate(&self) -> f64 {
        if self.ticks_total == 0 {
            return 0.0;
        }
        ((self.stale_ticks + self.numeric_faults) as f64 / self.ticks_total as f64) * 100.0
    }

    /// 是否健康（无降级、无丢弃）
    pub fn is_healthy(&self) -> bool {
        self.stale_ticks == 0 && self.numeric_faults == 0 && self.sink_errors == 0
    }
}

impl std::fmt::Display for LoopMetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ticks={} sent={} stale={} faults={} sink_errors={} disabled={} overruns={}",
            self.ticks_total,
            self.commands_sent,
            self.stale_ticks,
            self.numeric_faults,
            self.sink_errors,
            self.disabled_ticks,
            self.overruns
        )
    }
}
