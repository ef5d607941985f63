//! 控制循环调度器
//!
//! 在独立线程中以固定周期执行 [`ControlCycle::tick`]。
//!
//! # 定时
//!
//! 使用绝对时间锚点（`next_tick += period`）避免累积漂移；
//! 单个周期超时（overrun）时打印警告并把锚点重置到当前时间，
//! 不会为了"追赶"而连续触发多个周期。
//!
//! # 生命周期
//!
//! ```text
//! Uninitialized --start(ValidatedSetup)--> Running --stop()/max_iterations--> Stopped
//! ```
//!
//! `start()` 需要 [`ValidatedSetup`]，因此未通过初始化检查时循环不可能启动，
//! 且命令只会发往通过检查的出口。
//! `stop()` 与周期内的发送互斥：`stop()` 返回后不会再有命令发出。

use crate::buffer::JointStateBuffer;
use crate::config::LoopConfig;
use crate::cycle::ControlCycle;
use crate::error::SchedulerError;
use crate::guard::ValidatedSetup;
use crate::metrics::{LoopMetrics, LoopMetricsSnapshot};
use crate::sink::CommandSink;
use crate::state::{AtomicLoopState, LoopState};
use crate::switch::CompensationSwitch;
use gravcomp_model::GravityTorqueSolver;
use spin_sleep::SpinSleeper;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::{Builder, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 控制循环调度器
///
/// Drop 时自动停止循环并等待线程退出。
pub struct ControlLoopScheduler {
    config: LoopConfig,
    state: Arc<AtomicLoopState>,
    metrics: Arc<LoopMetrics>,
    switch: CompensationSwitch,
    handle: Option<JoinHandle<()>>,
}

impl ControlLoopScheduler {
    /// 创建调度器（状态为 `Uninitialized`）
    ///
    /// # 错误
    ///
    /// 配置无效时返回 [`SchedulerError::ConfigError`]。
    pub fn new(config: LoopConfig) -> Result<Self, SchedulerError> {
        config.validate()?;
        Ok(Self {
            config,
            state: Arc::new(AtomicLoopState::default()),
            metrics: Arc::new(LoopMetrics::new()),
            switch: CompensationSwitch::default(),
            handle: None,
        })
    }

    /// 当前状态
    pub fn state(&self) -> LoopState {
        self.state.get(Ordering::Acquire)
    }

    /// 循环是否运行中
    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// 配置
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// 指标
    pub fn metrics(&self) -> &Arc<LoopMetrics> {
        &self.metrics
    }

    /// 指标快照
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// 补偿开关（克隆后可在其他线程中使用）
    pub fn switch(&self) -> &CompensationSwitch {
        &self.switch
    }

    /// 启动控制循环
    ///
    /// 只能从 `Uninitialized` 启动一次。命令发往 `setup` 中已检查过的出口。
    ///
    /// # 错误
    ///
    /// - [`SchedulerError::InvalidTransition`]：已启动或已停止
    /// - [`SchedulerError::Spawn`]：线程创建失败（状态置为 `Stopped`）
    pub fn start<S>(
        &mut self,
        setup: ValidatedSetup<S>,
        buffer: Arc<JointStateBuffer>,
    ) -> Result<(), SchedulerError>
    where
        S: CommandSink + 'static,
    {
        if !self.state.transition(LoopState::Uninitialized, LoopState::Running) {
            return Err(SchedulerError::InvalidTransition {
                from: self.state(),
            });
        }

        let (model, sink) = setup.into_parts();
        let dof = model.dof();
        let cycle = ControlCycle::new(
            GravityTorqueSolver::new(model),
            buffer,
            sink,
            self.config.staleness_threshold(),
        )
        .with_state(self.state.clone())
        .with_switch(self.switch.clone())
        .with_metrics(self.metrics.clone());

        let config = self.config.clone();
        let state = self.state.clone();
        let metrics = self.metrics.clone();

        let spawned = Builder::new()
            .name("gravcomp-loop".to_string())
            .spawn(move || run_loop(cycle, &config, &state, &metrics));

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                info!(
                    "Control loop started: {:.1} Hz, staleness {:?}, {} joints",
                    self.config.frequency_hz,
                    self.config.staleness_threshold(),
                    dof
                );
                Ok(())
            },
            Err(e) => {
                self.state.set(LoopState::Stopped, Ordering::Release);
                Err(SchedulerError::Spawn(e))
            },
        }
    }

    /// 停止控制循环并等待线程退出
    ///
    /// 返回后不会再有命令发出。可重复调用；未启动时直接进入 `Stopped`。
    pub fn stop(&mut self) {
        let previous = self.state.stop();
        self.join();
        if previous != LoopState::Stopped {
            info!("Control loop stopped: {}", self.metrics.snapshot());
        }
    }

    /// 等待循环自行结束（`max_iterations` 用尽或其他线程调用了 `stop()`）
    pub fn wait(&mut self) {
        self.join();
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("Control loop thread panicked");
            self.state.set(LoopState::Stopped, Ordering::Release);
        }
    }
}

impl Drop for ControlLoopScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 循环线程主体
fn run_loop<S: CommandSink>(
    mut cycle: ControlCycle<S>,
    config: &LoopConfig,
    state: &AtomicLoopState,
    metrics: &LoopMetrics,
) {
    let period = config.period();
    let sleeper = config.spin_sleep.then(SpinSleeper::default);
    let mut next_tick = Instant::now();
    let mut iteration: u64 = 0;

    debug!("Control loop thread running, period {:?}", period);

    while state.get(Ordering::Acquire) == LoopState::Running {
        if let Some(max_iter) = config.max_iterations
            && iteration >= max_iter
        {
            info!("Control loop reached max_iterations ({})", max_iter);
            break;
        }

        next_tick = match next_tick.checked_add(period) {
            Some(t) => t,
            None => {
                warn!("Control loop period {:?} overflows the clock, stopping", period);
                break;
            },
        };
        cycle.tick(Instant::now());
        iteration += 1;

        let now = Instant::now();
        if next_tick > now {
            sleep(sleeper.as_ref(), next_tick - now);
        } else {
            LoopMetrics::incr(&metrics.overruns);
            warn!(
                "Control loop overrun: tick took {:?}, budget {:?}",
                now.duration_since(next_tick - period),
                period
            );
            // 重置锚点，不追赶
            next_tick = now;
        }
    }

    state.set(LoopState::Stopped, Ordering::Release);
    debug!("Control loop thread exited after {} ticks", iteration);
}

fn sleep(sleeper: Option<&SpinSleeper>, duration: Duration) {
    match sleeper {
        Some(sleeper) => sleeper.sleep(duration),
        None => std::thread::sleep(duration),
    }
}
