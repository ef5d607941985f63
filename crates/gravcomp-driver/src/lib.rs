//! 重力补偿实时驱动层
//!
//! 本 crate 把 [`gravcomp_model`] 的求解器接入实时控制回路，包括：
//! - 关节状态缓冲（ArcSwap 无锁整体替换）
//! - 传感器任务（缓冲区的唯一写者）
//! - 初始化检查（模型与执行器关节一致性）
//! - 固定周期控制循环（过期/数值错误时发送零力矩）
//! - 运行期补偿开关与原子指标
//!
//! # 使用示例
//!
//! ```rust,no_run
//! use gravcomp_driver::{
//!     ChannelSink, ControlLoopScheduler, InitializationGuard, JointStateBuffer, LoopConfig,
//! };
//! use gravcomp_model::KinematicDynamicModel;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (sink, commands) = ChannelSink::bounded(["joint1"], 16);
//! let setup = InitializationGuard::validate(KinematicDynamicModel::from_preset("pendulum"), sink)?;
//!
//! let buffer = Arc::new(JointStateBuffer::new());
//! let mut scheduler = ControlLoopScheduler::new(LoopConfig::default())?;
//! scheduler.start(setup, buffer.clone())?;
//!
//! // 传感器线程调用 buffer.write(...)，执行器线程从 commands 取命令
//! # drop(commands);
//! scheduler.stop();
//! # Ok(())
//! # }
//! ```

mod buffer;
mod config;
mod cycle;
mod error;
mod guard;
pub mod metrics;
mod scheduler;
mod sink;
mod source;
pub mod state;
mod switch;

pub use buffer::JointStateBuffer;
pub use config::LoopConfig;
pub use cycle::{ControlCycle, TickOutcome};
pub use error::{SchedulerError, SinkError, SourceError};
pub use guard::{InitializationGuard, ValidatedSetup};
pub use metrics::{LoopMetrics, LoopMetricsSnapshot};
pub use scheduler::ControlLoopScheduler;
pub use sink::{ChannelSink, CommandSink};
pub use source::{ChannelSource, JointStateSource, SensorTask, spawn_sensor_task};
pub use state::{AtomicLoopState, LoopState};
pub use switch::CompensationSwitch;
