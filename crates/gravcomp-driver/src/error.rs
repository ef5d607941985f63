//! 驱动层错误类型定义

use crate::state::LoopState;
use thiserror::Error;

/// 调度器错误
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// 循环配置无效
    #[error("Invalid loop configuration: {0}")]
    ConfigError(String),

    /// 非法状态流转（例如重复启动、停止后再启动）
    #[error("Cannot start control loop in state {from}")]
    InvalidTransition { from: LoopState },

    /// 循环线程创建失败
    #[error("Failed to spawn control loop thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// 执行器命令发送错误（运行期可恢复）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// 命令队列已满，本周期命令被丢弃
    #[error("Actuator command queue full")]
    Full,

    /// 执行器端已断开
    #[error("Actuator command channel disconnected")]
    Disconnected,

    /// 执行器拒收
    #[error("Actuator rejected command: {0}")]
    Rejected(String),
}

/// 传感器数据源错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// 数据源已关闭，不会再有新样本
    #[error("Joint state source closed")]
    Closed,
}
