//! 运动学/动力学模型
//!
//! [`KinematicDynamicModel`] 在启动时由结构描述构建一次，之后只读。
//! 核心接口 [`compute_gravity_torque`](KinematicDynamicModel::compute_gravity_torque)
//! 计算静止位姿下抵消重力所需的关节力矩。
//!
//! # 算法
//!
//! 零速度、零加速度，重力是唯一外力。力矩等于总重力势能对关节变量的梯度：
//!
//! ```text
//! V   = -Σ m_k · g·c_k
//! τ_i = ∂V/∂q_i
//!     = z_i · ((S_i - M_i·p_i) × (-g))    旋转关节
//!     = z_i · (-M_i · g)                  移动关节
//! ```
//!
//! 其中 `M_i = Σ_{k≥i} m_k`、`S_i = Σ_{k≥i} m_k·c_k` 是下游连杆的总质量与质量矩，
//! `z_i`、`p_i` 为世界坐标系下的关节轴和关节原点。
//! 一次正向遍历求坐标系，一次反向遍历累加，O(N)，全程无除法。
//!
//! 纯旋转关节链只用到三角函数，任意有限输入都得到有限输出。
//! 移动关节的位移直接进入质量矩 `S_i`，极端位移（如 `1e308`）会溢出为
//! Inf/NaN；这类输出由 [`GravityTorqueSolver`](crate::GravityTorqueSolver)
//! 检出并报告为 [`SolverError::NonFinite`](crate::SolverError::NonFinite)。

use crate::chain::KinematicChain;
use crate::description::{JointKind, ModelDescription};
use crate::error::{ConfigurationError, ModelError};
use crate::presets;
use crate::types::{INLINE_JOINTS, JointVec};
use nalgebra::{Isometry3, Point3, Vector3};
use smallvec::SmallVec;
use std::path::Path;
use tracing::debug;

/// 正向遍历得到的世界坐标系量
struct ChainPose {
    axes: SmallVec<[Vector3<f64>; INLINE_JOINTS]>,
    pivots: SmallVec<[Vector3<f64>; INLINE_JOINTS]>,
    coms: SmallVec<[Vector3<f64>; INLINE_JOINTS]>,
}

/// 机械臂运动学/动力学模型
///
/// 构建后不可变，可通过 `Arc` 在线程间共享。
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicDynamicModel {
    chain: KinematicChain,
    gravity: Vector3<f64>,
}

impl KinematicDynamicModel {
    /// 由结构描述构建
    ///
    /// # 错误
    ///
    /// - 描述为空、并列数组长度不一致
    /// - 质量为负、惯性张量非对称或非半正定、关节轴为零
    /// - 任意参数或重力向量非有限值
    pub fn new(desc: &ModelDescription) -> Result<Self, ConfigurationError> {
        let g = desc.gravity_or_default();
        if !g.iter().all(|x| x.is_finite()) {
            return Err(ConfigurationError::InvalidGravity(g));
        }

        let chain = KinematicChain::from_description(desc)?;
        let model = Self {
            chain,
            gravity: Vector3::from(g),
        };

        debug!(
            "Model built: {} joints, total mass {:.3} kg, gravity {:?}",
            model.dof(),
            model.total_mass(),
            g
        );
        Ok(model)
    }

    /// 从 TOML 文件构建
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        Self::new(&ModelDescription::from_file(path)?)
    }

    /// 从预置模型构建（见 [`presets::PRESET_NAMES`]）
    pub fn from_preset(name: &str) -> Result<Self, ConfigurationError> {
        Self::new(&presets::preset(name)?)
    }

    /// 关节数
    pub fn dof(&self) -> usize {
        self.chain.dof()
    }

    /// 关节名称（按链顺序）
    pub fn joint_names(&self) -> Vec<&str> {
        self.chain.joint_names().collect()
    }

    /// 基座坐标系下的重力向量
    pub fn gravity(&self) -> &Vector3<f64> {
        &self.gravity
    }

    /// 运动链
    pub fn chain(&self) -> &KinematicChain {
        &self.chain
    }

    /// 所有连杆质量之和
    pub fn total_mass(&self) -> f64 {
        self.chain.links().iter().map(|l| l.mass).sum()
    }

    /// 计算重力补偿力矩
    ///
    /// 纯函数，无副作用；相同输入得到逐位相同的输出。
    ///
    /// # 错误
    ///
    /// `positions` 长度与关节数不一致时返回 [`ModelError::DimensionMismatch`]。
    pub fn compute_gravity_torque(&self, positions: &[f64]) -> Result<JointVec, ModelError> {
        self.check_dimension(positions.len())?;
        let pose = self.forward_pass(positions);
        let links = self.chain.links();
        let neg_g = -self.gravity;

        let mut torques = JointVec::from_elem(0.0, links.len());
        let mut downstream_mass = 0.0;
        let mut downstream_moment = Vector3::zeros();

        for i in (0..links.len()).rev() {
            let link = &links[i];
            downstream_mass += link.mass;
            downstream_moment += pose.coms[i] * link.mass;

            torques[i] = match link.kind {
                JointKind::Revolute => {
                    let lever = downstream_moment - pose.pivots[i] * downstream_mass;
                    pose.axes[i].dot(&lever.cross(&neg_g))
                },
                JointKind::Prismatic => pose.axes[i].dot(&(neg_g * downstream_mass)),
            };
        }

        Ok(torques)
    }

    /// 总重力势能（J），以基座原点为零势面
    pub fn potential_energy(&self, positions: &[f64]) -> Result<f64, ModelError> {
        self.check_dimension(positions.len())?;
        let pose = self.forward_pass(positions);
        Ok(self
            .chain
            .links()
            .iter()
            .zip(&pose.coms)
            .map(|(link, com)| -link.mass * self.gravity.dot(com))
            .sum())
    }

    /// 每个连杆坐标系在基座坐标系下的位姿
    pub fn link_frames(&self, positions: &[f64]) -> Result<Vec<Isometry3<f64>>, ModelError> {
        self.check_dimension(positions.len())?;
        let mut frame = Isometry3::identity();
        Ok(self
            .chain
            .links()
            .iter()
            .zip(positions)
            .map(|(link, &q)| {
                frame *= link.local_transform(q);
                frame
            })
            .collect())
    }

    pub(crate) fn check_dimension(&self, actual: usize) -> Result<(), ModelError> {
        let expected = self.dof();
        if actual != expected {
            return Err(ModelError::DimensionMismatch { expected, actual });
        }
        Ok(())
    }

    /// 基座到末端：世界坐标系下的关节轴、关节原点和连杆质心
    fn forward_pass(&self, positions: &[f64]) -> ChainPose {
        let n = self.dof();
        let mut pose = ChainPose {
            axes: SmallVec::with_capacity(n),
            pivots: SmallVec::with_capacity(n),
            coms: SmallVec::with_capacity(n),
        };

        let mut frame = Isometry3::identity();
        for (link, &q) in self.chain.links().iter().zip(positions) {
            frame *= link.local_transform(q);
            // 关节轴在自身运动下不变，直接用运动后的姿态变换
            pose.axes.push(frame.rotation * link.axis.into_inner());
            pose.pivots.push(frame.translation.vector);
            pose.coms
                .push(frame.transform_point(&Point3::from(link.center_of_mass)).coords);
        }
        pose
    }
}
