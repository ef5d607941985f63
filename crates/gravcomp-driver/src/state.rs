//! 控制循环状态定义
//!
//! 状态机：`Uninitialized → Running → Stopped`，只能单向流转。
//! 循环线程每个周期开始前读取状态；发送命令时"检查状态 + 发送"整体持有
//! 发送闸门的读锁，[`AtomicLoopState::stop`] 持有写锁切换状态，
//! 因此 `stop()` 一旦切换成功，在途周期不会再发出命令。

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU8, Ordering};

/// 控制循环状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum LoopState {
    /// 尚未通过初始化检查，循环未启动
    #[default]
    Uninitialized = 0,

    /// 循环运行中，按固定周期触发
    Running = 1,

    /// 已停止（终态）
    Stopped = 2,
}

impl LoopState {
    /// 从 u8 转换
    ///
    /// 无效值视为 `Stopped`，宁可停止也不误发命令。
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Uninitialized,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }

    /// 转换为 u8
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// 是否运行中
    pub fn is_running(self) -> bool {
        self == Self::Running
    }

    /// 是否已停止
    pub fn is_stopped(self) -> bool {
        self == Self::Stopped
    }
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Uninitialized => "Uninitialized",
            Self::Running => "Running",
            Self::Stopped => "Stopped",
        };
        f.write_str(name)
    }
}

/// 控制循环状态（原子版本，用于线程间共享）
///
/// # 示例
///
/// ```rust
/// use gravcomp_driver::{AtomicLoopState, LoopState};
/// use std::sync::atomic::Ordering;
///
/// let state = AtomicLoopState::new(LoopState::Uninitialized);
/// assert!(state.transition(LoopState::Uninitialized, LoopState::Running));
/// assert_eq!(state.get(Ordering::Acquire), LoopState::Running);
/// ```
#[derive(Debug)]
pub struct AtomicLoopState {
    inner: AtomicU8,
    /// 发送闸门：发送方持读锁，停止方持写锁
    emit_gate: RwLock<()>,
}

impl AtomicLoopState {
    /// 创建新的原子状态
    pub fn new(state: LoopState) -> Self {
        Self {
            inner: AtomicU8::new(state.as_u8()),
            emit_gate: RwLock::new(()),
        }
    }

    /// 获取当前状态
    pub fn get(&self, ordering: Ordering) -> LoopState {
        LoopState::from_u8(self.inner.load(ordering))
    }

    /// 设置状态
    pub fn set(&self, state: LoopState, ordering: Ordering) {
        self.inner.store(state.as_u8(), ordering);
    }

    /// 设置状态并返回之前的状态
    pub fn swap(&self, state: LoopState, ordering: Ordering) -> LoopState {
        LoopState::from_u8(self.inner.swap(state.as_u8(), ordering))
    }

    /// 状态流转（Compare-and-Swap）
    ///
    /// 当前状态等于 `from` 时切换到 `to` 并返回 true，否则返回 false。
    pub fn transition(&self, from: LoopState, to: LoopState) -> bool {
        self.inner
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl AtomicLoopState {
    /// 切换到 `Stopped` 并返回之前的状态
    ///
    /// 等待正在进行的 [`emit_unless_stopped`](Self::emit_unless_stopped) 结束；
    /// 返回后任何发送都会被拒绝。
    pub fn stop(&self) -> LoopState {
        let _gate = self.emit_gate.write();
        self.swap(LoopState::Stopped, Ordering::AcqRel)
    }

    /// 未停止时执行 `emit`，已停止时返回 `None`
    ///
    /// 状态检查与 `emit` 在同一把读锁内完成，`emit` 必须是非阻塞的。
    pub fn emit_unless_stopped<R>(&self, emit: impl FnOnce() -> R) -> Option<R> {
        let _gate = self.emit_gate.read();
        if self.get(Ordering::Acquire) == LoopState::Stopped {
            return None;
        }
        Some(emit())
    }
}

impl Default for AtomicLoopState {
    fn default() -> Self {
        Self::new(LoopState::Uninitialized)
    }
}
