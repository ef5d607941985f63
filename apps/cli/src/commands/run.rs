//! 运行控制回路
//!
//! 模拟传感器 → 传感器任务 → 关节状态缓冲 → 控制循环 → 命令队列 → 打印线程。
//! Ctrl-C 或到达 `--duration` 时按顺序停止：先停控制循环（之后不再有命令），
//! 再停传感器任务，最后等待打印线程排空队列。

use crate::config::{ModelArgs, parse_list};
use crate::sim::{Motion, SimulatedSensor};
use anyhow::{Context, Result};
use clap::Args;
use crossbeam_channel::Receiver;
use gravcomp_driver::{
    ChannelSink, ControlLoopScheduler, InitializationGuard, JointStateBuffer, spawn_sensor_task,
};
use gravcomp_model::{KinematicDynamicModel, TorqueCommand};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

/// 打印间隔（约 10Hz）
const PRINT_INTERVAL: Duration = Duration::from_millis(100);

/// 主线程检查停止条件的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// 运行参数
#[derive(Args, Debug)]
pub struct RunCommand {
    #[command(flatten)]
    pub model: ModelArgs,

    /// 控制频率（Hz，覆盖配置文件）
    #[arg(long)]
    pub rate: Option<f64>,

    /// 过期阈值（毫秒，覆盖配置文件）
    #[arg(long)]
    pub stale_ms: Option<u64>,

    /// 运行时长（秒），缺省一直运行到 Ctrl-C
    #[arg(long)]
    pub duration: Option<f64>,

    /// 模拟运动
    #[arg(long, value_enum, default_value_t = Motion::Hold)]
    pub motion: Motion,

    /// 初始关节位置，逗号分隔（缺省全零）
    #[arg(long, allow_hyphen_values = true)]
    pub home: Option<String>,

    /// 模拟传感器频率（Hz）
    #[arg(long, default_value_t = 200.0)]
    pub sensor_rate: f64,

    /// 模拟传感器在产生该数量样本后停止更新（演示过期保护）
    #[arg(long)]
    pub sensor_samples: Option<u64>,
}

impl RunCommand {
    pub fn execute(self) -> Result<()> {
        let mut config = self.model.load()?;
        if let Some(rate) = self.rate {
            config.control.frequency_hz = rate;
        }
        if let Some(stale_ms) = self.stale_ms {
            config.control.staleness_ms = stale_ms;
        }
        let sensor = SimulatedSensor::new(Vec::new(), self.motion, self.sensor_rate)
            .context("Invalid --sensor-rate")?;
        let deadline = self.duration.map(deadline_after).transpose()?;

        // 初始化检查：失败时直接退出，控制循环不会启动
        let (sink, commands) =
            ChannelSink::bounded(config.actuator_joints(), config.queue_capacity());
        let setup = InitializationGuard::validate(KinematicDynamicModel::new(&config.model), sink)
            .context("Initialization check failed")?;
        let mut scheduler =
            ControlLoopScheduler::new(config.control.clone()).context("Invalid [control] section")?;

        let dof = setup.model().dof();
        let home = match &self.home {
            Some(list) => {
                let home = parse_list(list)?;
                if home.len() != dof {
                    anyhow::bail!("--home has {} values, model has {} joints", home.len(), dof);
                }
                home
            },
            None => vec![0.0; dof],
        };
        let names: Vec<String> = setup
            .model()
            .joint_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        // Ctrl-C
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        ctrlc::set_handler(move || {
            running_clone.store(false, Ordering::SeqCst);
        })
        .context("Failed to install Ctrl-C handler")?;

        let buffer = Arc::new(JointStateBuffer::new());
        let sensor = sensor.with_home(home).with_limit(self.sensor_samples);
        let mut sensor_task =
            spawn_sensor_task(sensor, buffer.clone()).context("Failed to spawn sensor task")?;

        let printer = thread::Builder::new()
            .name("gravcomp-printer".to_string())
            .spawn(move || print_commands(&commands, &names))
            .context("Failed to spawn printer thread")?;

        scheduler.start(setup, buffer)?;
        println!("▶ 控制回路已启动，按 Ctrl-C 停止");

        while running.load(Ordering::SeqCst)
            && scheduler.is_running()
            && deadline.is_none_or(|d| Instant::now() < d)
        {
            thread::sleep(POLL_INTERVAL);
        }

        info!("Shutting down");
        scheduler.stop();
        sensor_task.stop();
        let printed = printer.join().unwrap_or(0);

        let snapshot = scheduler.snapshot();
        println!("■ 控制回路已停止");
        println!("  {}", snapshot);
        println!("  打印命令数: {}", printed);
        if !snapshot.is_healthy() {
            println!("  ⚠️ 存在降级周期（过期或数值错误）");
        }
        Ok(())
    }
}

/// `secs` 秒之后的时刻
fn deadline_after(secs: f64) -> Result<Instant> {
    let Ok(run_for) = Duration::try_from_secs_f64(secs) else {
        anyhow::bail!("Invalid --duration: {} (must be >= 0 and fit in a Duration)", secs);
    };
    Instant::now()
        .checked_add(run_for)
        .with_context(|| format!("Invalid --duration: {} (too large)", secs))
}

/// 以约 10Hz 打印最新命令，直到控制循环释放命令出口
fn print_commands(commands: &Receiver<TorqueCommand>, names: &[String]) -> u64 {
    let mut last_print: Option<Instant> = None;
    let mut printed = 0;

    for command in commands.iter() {
        if last_print.is_some_and(|t| t.elapsed() < PRINT_INTERVAL) {
            continue;
        }
        last_print = Some(Instant::now());
        printed += 1;

        let efforts = names
            .iter()
            .zip(&command.efforts)
            .map(|(name, tau)| format!("{}={:+.3}", name, tau))
            .collect::<Vec<_>>()
            .join(" ");
        let tag = if command.is_zero() { " [zero]" } else { "" };
        println!("τ {}{}", efforts, tag);
    }
    printed
}
