//! 传感器输入
//!
//! 传感器任务是 [`JointStateBuffer`] 的唯一写者：从 [`JointStateSource`] 取样本，
//! 整体写入缓冲区。停止时不需要等待控制循环，控制循环也从不等待它。

use crate::buffer::JointStateBuffer;
use crate::error::SourceError;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use gravcomp_model::JointState;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{Builder, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 传感器任务等待样本的超时（用于检查停止标志）
const POLL_TIMEOUT: Duration = Duration::from_millis(20);

/// 关节状态数据源
pub trait JointStateSource: Send {
    /// 等待下一个样本，最多阻塞 `timeout`
    ///
    /// - `Ok(Some(sample))`：收到样本
    /// - `Ok(None)`：超时，无新样本
    /// - `Err(SourceError::Closed)`：数据源关闭
    fn next_sample(&mut self, timeout: Duration) -> Result<Option<JointState>, SourceError>;
}

/// 基于通道的数据源
///
/// 传输层（CAN、网络、仿真）把解析好的样本送入配对的 `Sender`。
#[derive(Debug)]
pub struct ChannelSource {
    rx: Receiver<JointState>,
}

impl ChannelSource {
    /// 包装一个接收端
    pub fn new(rx: Receiver<JointState>) -> Self {
        Self { rx }
    }
}

impl JointStateSource for ChannelSource {
    fn next_sample(&mut self, timeout: Duration) -> Result<Option<JointState>, SourceError> {
        match self.rx.recv_timeout(timeout) {
            Ok(sample) => Ok(Some(sample)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(SourceError::Closed),
        }
    }
}

/// 传感器任务句柄
///
/// Drop 时自动停止并 join。
#[derive(Debug)]
pub struct SensorTask {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SensorTask {
    /// 任务是否仍在运行
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// 停止任务并等待线程退出
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("Sensor task panicked");
        }
    }
}

impl Drop for SensorTask {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 启动传感器任务
///
/// 在独立线程中循环读取 `source` 并写入 `buffer`，直到 `stop()` 或数据源关闭。
pub fn spawn_sensor_task<S>(
    mut source: S,
    buffer: Arc<JointStateBuffer>,
) -> Result<SensorTask, std::io::Error>
where
    S: JointStateSource + 'static,
{
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();

    let handle = Builder::new()
        .name("gravcomp-sensor".to_string())
        .spawn(move || {
            info!("Sensor task started");
            while running_clone.load(Ordering::Acquire) {
                match source.next_sample(POLL_TIMEOUT) {
                    Ok(Some(sample)) => buffer.write(sample),
                    Ok(None) => debug!("Sensor task: no sample within {:?}", POLL_TIMEOUT),
                    Err(SourceError::Closed) => {
                        warn!("Sensor task: joint state source closed");
                        break;
                    },
                }
            }
            running_clone.store(false, Ordering::Release);
            info!("Sensor task stopped");
        })?;

    Ok(SensorTask {
        running,
        handle: Some(handle),
    })
}
