//! 单个控制周期
//!
//! [`ControlCycle::tick`] 是调度器每个周期执行的全部工作，不含计时，
//! 因此可以在测试中用任意 `now` 直接驱动。
//!
//! # 周期流程
//!
//! 1. 补偿关闭 → 不发送（[`TickOutcome::Disabled`]）
//! 2. 读取最新样本及其年龄
//! 3. 无样本或已过期 → 发送零力矩（失效保护）
//! 4. 求解；数值错误 → 发送零力矩（失效保护）
//! 5. 发送补偿力矩
//!
//! 发送前再检查一次循环状态：`stop()` 之后在途的周期不会发出命令。

use crate::buffer::JointStateBuffer;
use crate::error::SinkError;
use crate::metrics::LoopMetrics;
use crate::sink::CommandSink;
use crate::state::AtomicLoopState;
use crate::switch::CompensationSwitch;
use gravcomp_model::{GravityTorqueSolver, SolverError, TorqueCommand};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// 单周期结果
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// 已发送补偿力矩
    Commanded,

    /// 尚未收到任何样本，已发送零力矩
    NoInput,

    /// 样本过期，已发送零力矩
    StaleInput { age: Duration },

    /// 求解失败，已发送零力矩
    NumericFault(SolverError),

    /// 执行器拒收（命令被丢弃）
    SinkFailed(SinkError),

    /// 补偿关闭，未发送
    Disabled,

    /// 循环已停止，在途命令被丢弃
    Suppressed,
}

impl TickOutcome {
    /// 本周期是否执行了失效保护（零力矩）
    pub fn is_fail_safe(&self) -> bool {
        matches!(
            self,
            Self::NoInput | Self::StaleInput { .. } | Self::NumericFault(_)
        )
    }
}

/// 输入健康状态（用于日志限频：只在状态变化时打印 warn/error）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Health {
    Nominal,
    Stale,
    Fault,
}

/// 控制周期
pub struct ControlCycle<S: CommandSink> {
    solver: GravityTorqueSolver,
    buffer: Arc<JointStateBuffer>,
    sink: S,
    staleness: Duration,
    state: Arc<AtomicLoopState>,
    switch: CompensationSwitch,
    metrics: Arc<LoopMetrics>,
    health: Health,
}

impl<S: CommandSink> ControlCycle<S> {
    /// 创建控制周期
    pub fn new(
        solver: GravityTorqueSolver,
        buffer: Arc<JointStateBuffer>,
        sink: S,
        staleness: Duration,
    ) -> Self {
        Self {
            solver,
            buffer,
            sink,
            staleness,
            state: Arc::new(AtomicLoopState::default()),
            switch: CompensationSwitch::default(),
            metrics: Arc::new(LoopMetrics::new()),
            health: Health::Nominal,
        }
    }

    /// 共享循环状态（调度器使用）
    pub fn with_state(mut self, state: Arc<AtomicLoopState>) -> Self {
        self.state = state;
        self
    }

    /// 共享补偿开关
    pub fn with_switch(mut self, switch: CompensationSwitch) -> Self {
        self.switch = switch;
        self
    }

    /// 共享指标
    pub fn with_metrics(mut self, metrics: Arc<LoopMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// 命令出口
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// 指标
    pub fn metrics(&self) -> &Arc<LoopMetrics> {
        &self.metrics
    }

    /// 执行一个周期
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        LoopMetrics::incr(&self.metrics.ticks_total);

        if !self.switch.is_enabled() {
            LoopMetrics::incr(&self.metrics.disabled_ticks);
            return TickOutcome::Disabled;
        }

        let (command, outcome) = match self.buffer.read_latest_at(now) {
            None => {
                self.mark_stale(|| warn!("No joint state received yet, commanding zero torque"));
                (self.fail_safe(now), TickOutcome::NoInput)
            },
            Some((_, age)) if age > self.staleness => {
                let threshold = self.staleness;
                self.mark_stale(|| {
                    warn!(
                        "Joint state is stale ({:?} > {:?}), commanding zero torque",
                        age, threshold
                    )
                });
                (self.fail_safe(now), TickOutcome::StaleInput { age })
            },
            Some((sample, _)) => match self.solver.solve(&sample) {
                Ok(command) => {
                    if self.health != Health::Nominal {
                        info!("Joint state input recovered, resuming gravity compensation");
                        self.health = Health::Nominal;
                    }
                    (command, TickOutcome::Commanded)
                },
                Err(e) => {
                    LoopMetrics::incr(&self.metrics.numeric_faults);
                    if self.health != Health::Fault {
                        error!("Gravity torque solver fault: {}, commanding zero torque", e);
                        self.health = Health::Fault;
                    } else {
                        debug!("Gravity torque solver fault persists: {}", e);
                    }
                    (self.fail_safe(now), TickOutcome::NumericFault(e))
                },
            },
        };

        self.emit(command, outcome)
    }

    fn mark_stale(&mut self, log: impl FnOnce()) {
        LoopMetrics::incr(&self.metrics.stale_ticks);
        if self.health != Health::Stale {
            log();
            self.health = Health::Stale;
        } else {
            debug!("Joint state input still stale");
        }
    }

    fn fail_safe(&self, now: Instant) -> TorqueCommand {
        TorqueCommand::zero(self.solver.dof(), now)
    }

    fn emit(&mut self, command: TorqueCommand, outcome: TickOutcome) -> TickOutcome {
        let sink = &mut self.sink;
        let Some(sent) = self.state.emit_unless_stopped(|| sink.send(command)) else {
            debug!("Control loop stopped, dropping in-flight command");
            return TickOutcome::Suppressed;
        };

        match sent {
            Ok(()) => {
                LoopMetrics::incr(&self.metrics.commands_sent);
                outcome
            },
            Err(e) => {
                LoopMetrics::incr(&self.metrics.sink_errors);
                warn!("Failed to send torque command: {}", e);
                TickOutcome::SinkFailed(e)
            },
        }
    }
}
