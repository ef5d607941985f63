//! 控制循环端到端测试
//!
//! 真实线程 + 真实定时，断言只依赖"至少"/"全部"语义，不依赖精确周期数。

use approx::assert_relative_eq;
use gravcomp_driver::{
    ChannelSink, CommandSink, ControlLoopScheduler, InitializationGuard, JointStateBuffer, LoopConfig, LoopState,
    SchedulerError,
};
use gravcomp_model::{JointState, KinematicDynamicModel, TorqueCommand};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn fast_config() -> LoopConfig {
    LoopConfig {
        frequency_hz: 500.0,
        staleness_ms: 50,
        spin_sleep: false,
        max_iterations: None,
    }
}

fn drain(rx: &crossbeam_channel::Receiver<TorqueCommand>) -> Vec<TorqueCommand> {
    rx.try_iter().collect()
}

/// 持续写入新样本时，发出的命令与模型直接计算的结果一致
#[test]
fn test_fresh_samples_are_compensated() {
    let model = KinematicDynamicModel::from_preset("two_link").unwrap();
    let q = [0.4, -0.7];
    let expected = model.compute_gravity_torque(&q).unwrap();

    let (sink, rx) = ChannelSink::bounded(["shoulder", "elbow"], 1024);
    let setup = InitializationGuard::validate(Ok(model), sink).unwrap();
    let buffer = Arc::new(JointStateBuffer::new());
    buffer.write(JointState::from_positions(q, Instant::now()));

    let mut scheduler = ControlLoopScheduler::new(LoopConfig {
        staleness_ms: 1_000,
        ..fast_config()
    })
    .unwrap();
    scheduler.start(setup, buffer.clone()).unwrap();
    assert_eq!(scheduler.state(), LoopState::Running);

    let writer_buffer = buffer.clone();
    let writer = thread::spawn(move || {
        for _ in 0..50 {
            writer_buffer.write(JointState::from_positions(q, Instant::now()));
            thread::sleep(Duration::from_millis(2));
        }
    });
    writer.join().unwrap();
    scheduler.stop();

    let commands = drain(&rx);
    assert!(!commands.is_empty());
    for command in &commands {
        assert_eq!(command.len(), 2);
        assert_relative_eq!(command.efforts[0], expected[0], epsilon = 1e-12);
        assert_relative_eq!(command.efforts[1], expected[1], epsilon = 1e-12);
    }
    assert!(scheduler.snapshot().commands_sent >= commands.len() as u64);
}

/// stop() 返回后不再有任何命令
#[test]
fn test_no_command_after_stop() {
    let (sink, rx) = ChannelSink::bounded(["joint1"], 4096);
    let setup =
        InitializationGuard::validate(KinematicDynamicModel::from_preset("pendulum"), sink)
            .unwrap();
    let buffer = Arc::new(JointStateBuffer::new());

    let mut scheduler = ControlLoopScheduler::new(fast_config()).unwrap();
    scheduler.start(setup, buffer).unwrap();
    thread::sleep(Duration::from_millis(30));
    scheduler.stop();
    assert_eq!(scheduler.state(), LoopState::Stopped);

    let before = drain(&rx).len();
    assert!(before > 0);

    thread::sleep(Duration::from_millis(30));
    assert_eq!(rx.try_iter().count(), 0);
}

/// 输入停止更新后，命令全部为零
#[test]
fn test_stale_input_commands_zero() {
    let (sink, rx) = ChannelSink::bounded(["joint1"], 4096);
    let setup =
        InitializationGuard::validate(KinematicDynamicModel::from_preset("pendulum"), sink)
            .unwrap();
    let buffer = Arc::new(JointStateBuffer::new());
    // 样本已经比阈值旧
    let old = Instant::now()
        .checked_sub(Duration::from_millis(500))
        .unwrap_or_else(Instant::now);
    buffer.write(JointState::from_positions([1.2], old));

    let mut scheduler = ControlLoopScheduler::new(LoopConfig {
        staleness_ms: 10,
        ..fast_config()
    })
    .unwrap();
    scheduler.start(setup, buffer).unwrap();
    thread::sleep(Duration::from_millis(30));
    scheduler.stop();

    let commands = drain(&rx);
    assert!(!commands.is_empty());
    assert!(commands.iter().all(TorqueCommand::is_zero));
    assert!(scheduler.snapshot().stale_ticks > 0);
}

/// 初始化检查失败时无法获得 ValidatedSetup，出口被丢弃，循环保持未启动
#[test]
fn test_guard_failure_keeps_loop_uninitialized() {
    let (sink, rx) = ChannelSink::bounded(["elbow", "shoulder"], 16);
    let result = InitializationGuard::validate(KinematicDynamicModel::from_preset("two_link"), sink);
    assert!(result.is_err());

    // start() 只接受 ValidatedSetup，失败的检查没有留下任何可启动的东西
    let scheduler = ControlLoopScheduler::new(fast_config()).unwrap();
    assert_eq!(scheduler.state(), LoopState::Uninitialized);
    assert!(matches!(
        rx.try_recv(),
        Err(crossbeam_channel::TryRecvError::Disconnected)
    ));
}

/// 命令只发往通过检查的出口，分量数与模型一致
#[test]
fn test_commands_reach_only_validated_sink() {
    let (validated, rx) = ChannelSink::bounded(["joint1"], 4096);
    let (other, other_rx) = ChannelSink::bounded(["shoulder", "elbow"], 4096);
    let setup =
        InitializationGuard::validate(KinematicDynamicModel::from_preset("pendulum"), validated)
            .unwrap();
    assert_eq!(setup.sink().joint_names(), ["joint1".to_string()]);
    let buffer = Arc::new(JointStateBuffer::new());
    buffer.write(JointState::from_positions([0.3], Instant::now()));

    let mut scheduler = ControlLoopScheduler::new(LoopConfig {
        max_iterations: Some(5),
        staleness_ms: 1_000,
        ..fast_config()
    })
    .unwrap();
    scheduler.start(setup, buffer).unwrap();
    scheduler.wait();

    let commands = drain(&rx);
    assert_eq!(commands.len(), 5);
    assert!(commands.iter().all(|c| c.len() == 1));
    assert_eq!(other_rx.try_iter().count(), 0);
    drop(other);
}

/// max_iterations 用尽后循环自行停止
#[test]
fn test_max_iterations() {
    let (sink, rx) = ChannelSink::bounded(["joint1"], 64);
    let setup =
        InitializationGuard::validate(KinematicDynamicModel::from_preset("pendulum"), sink)
            .unwrap();
    let buffer = Arc::new(JointStateBuffer::new());

    let mut scheduler = ControlLoopScheduler::new(LoopConfig {
        max_iterations: Some(10),
        ..fast_config()
    })
    .unwrap();
    scheduler.start(setup, buffer).unwrap();
    scheduler.wait();

    assert_eq!(scheduler.state(), LoopState::Stopped);
    assert_eq!(scheduler.snapshot().ticks_total, 10);
    assert_eq!(rx.try_iter().count(), 10);
}

/// 重复启动被拒绝
#[test]
fn test_double_start_rejected() {
    let (sink, _rx) = ChannelSink::bounded(["joint1"], 64);
    let first =
        InitializationGuard::validate(KinematicDynamicModel::from_preset("pendulum"), sink.clone())
            .unwrap();
    let second =
        InitializationGuard::validate(KinematicDynamicModel::from_preset("pendulum"), sink)
            .unwrap();
    let buffer = Arc::new(JointStateBuffer::new());

    let mut scheduler = ControlLoopScheduler::new(fast_config()).unwrap();
    scheduler.start(first, buffer.clone()).unwrap();

    let err = scheduler.start(second, buffer).unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::InvalidTransition {
            from: LoopState::Running
        }
    ));
    scheduler.stop();
}

/// 补偿关闭期间不发送命令
#[test]
fn test_disabled_switch_sends_nothing() {
    let (sink, rx) = ChannelSink::bounded(["joint1"], 4096);
    let setup =
        InitializationGuard::validate(KinematicDynamicModel::from_preset("pendulum"), sink)
            .unwrap();
    let buffer = Arc::new(JointStateBuffer::new());

    let mut scheduler = ControlLoopScheduler::new(fast_config()).unwrap();
    scheduler.switch().disable();
    scheduler.start(setup, buffer).unwrap();
    thread::sleep(Duration::from_millis(20));
    scheduler.stop();

    assert_eq!(rx.try_iter().count(), 0);
    let snapshot = scheduler.snapshot();
    assert!(snapshot.disabled_ticks > 0);
    assert_eq!(snapshot.commands_sent, 0);
}
