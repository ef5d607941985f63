//! 执行器命令出口
//!
//! [`CommandSink`] 是控制循环与执行器传输层之间的窄接口。
//! 实现必须是非阻塞的：控制周期内不允许等待 IO。

use crate::error::SinkError;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use gravcomp_model::TorqueCommand;

/// 执行器命令出口
pub trait CommandSink: Send {
    /// 执行器期望的关节名称（顺序即命令分量顺序）
    fn joint_names(&self) -> &[String];

    /// 发送一条力矩命令（不得阻塞）
    fn send(&mut self, command: TorqueCommand) -> Result<(), SinkError>;
}

impl<S: CommandSink + ?Sized> CommandSink for Box<S> {
    fn joint_names(&self) -> &[String] {
        (**self).joint_names()
    }

    fn send(&mut self, command: TorqueCommand) -> Result<(), SinkError> {
        (**self).send(command)
    }
}

/// 基于有界通道的命令出口
///
/// 队列满时丢弃本周期命令并返回 [`SinkError::Full`]，不阻塞控制循环。
/// 执行器传输线程从配对的 `Receiver` 中取命令。
#[derive(Debug, Clone)]
pub struct ChannelSink {
    joint_names: Vec<String>,
    tx: Sender<TorqueCommand>,
}

impl ChannelSink {
    /// 创建命令出口及其接收端
    pub fn bounded(
        joint_names: impl IntoIterator<Item = impl Into<String>>,
        capacity: usize,
    ) -> (Self, Receiver<TorqueCommand>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        let sink = Self {
            joint_names: joint_names.into_iter().map(Into::into).collect(),
            tx,
        };
        (sink, rx)
    }
}

impl CommandSink for ChannelSink {
    fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    fn send(&mut self, command: TorqueCommand) -> Result<(), SinkError> {
        self.tx.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => SinkError::Full,
            TrySendError::Disconnected(_) => SinkError::Disconnected,
        })
    }
}
