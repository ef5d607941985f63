//! 关节空间数据类型
//!
//! 传感器样本（[`JointState`]）和力矩命令（[`TorqueCommand`]）在控制循环中
//! 每周期都会创建，因此关节向量使用 `SmallVec` 内联存储，8 轴以内不分配堆内存。

use smallvec::SmallVec;
use std::time::Instant;

/// 内联存储的最大关节数（超出后退化为堆分配，行为不变）
pub const INLINE_JOINTS: usize = 8;

/// 关节空间向量（每个关节一个标量，按运动链顺序排列）
pub type JointVec = SmallVec<[f64; INLINE_JOINTS]>;

/// 关节状态样本
///
/// 一次传感器读数：每个关节的位置/速度，以及整组样本共用的一个时间戳。
///
/// **注意**：缓冲区对样本不做任何校验，长度与运动链是否一致由求解器检查。
#[derive(Debug, Clone, PartialEq)]
pub struct JointState {
    /// 采样时间（单调时钟）
    pub timestamp: Instant,
    /// 关节位置（rad 或 m）
    pub positions: JointVec,
    /// 关节速度（rad/s 或 m/s）
    pub velocities: JointVec,
}

impl JointState {
    /// 创建样本，速度全部置零
    pub fn from_positions(positions: impl IntoIterator<Item = f64>, timestamp: Instant) -> Self {
        let positions: JointVec = positions.into_iter().collect();
        let velocities = SmallVec::from_elem(0.0, positions.len());
        Self {
            timestamp,
            positions,
            velocities,
        }
    }

    /// 创建带速度的样本
    pub fn new(
        positions: impl IntoIterator<Item = f64>,
        velocities: impl IntoIterator<Item = f64>,
        timestamp: Instant,
    ) -> Self {
        Self {
            timestamp,
            positions: positions.into_iter().collect(),
            velocities: velocities.into_iter().collect(),
        }
    }

    /// 关节数
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// 是否为空样本
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// 力矩命令
///
/// 与 [`JointState`] 同长度、同顺序。每个控制周期新建一次，交给执行器后即丢弃。
#[derive(Debug, Clone, PartialEq)]
pub struct TorqueCommand {
    /// 计算所用传感器样本的时间戳（失效保护命令为生成时刻）
    pub source_timestamp: Instant,
    /// 关节力矩（N·m，移动关节为 N）
    pub efforts: JointVec,
}

impl TorqueCommand {
    /// 创建力矩命令
    pub fn new(efforts: JointVec, source_timestamp: Instant) -> Self {
        Self {
            source_timestamp,
            efforts,
        }
    }

    /// 失效保护命令（全零力矩）
    pub fn zero(dof: usize, timestamp: Instant) -> Self {
        Self {
            source_timestamp: timestamp,
            efforts: SmallVec::from_elem(0.0, dof),
        }
    }

    /// 是否全部为零
    pub fn is_zero(&self) -> bool {
        self.efforts.iter().all(|&t| t == 0.0)
    }

    /// 关节数
    pub fn len(&self) -> usize {
        self.efforts.len()
    }

    /// 是否为空命令
    pub fn is_empty(&self) -> bool {
        self.efforts.is_empty()
    }
}
