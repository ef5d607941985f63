//! 初始化检查
//!
//! 控制循环只能用 [`ValidatedSetup`] 启动，而 `ValidatedSetup` 只能由
//! [`InitializationGuard::validate`] 产生：模型构建成功，且关节数与顺序
//! 与执行器接口完全一致。检查失败时宿主进程应打印一条致命诊断并以非零状态退出。
//!
//! `ValidatedSetup` 拥有被检查的命令出口，循环启动时直接使用它，
//! 不存在"检查一个出口、启动另一个出口"的情况。

use crate::sink::CommandSink;
use gravcomp_model::{ConfigurationError, GravityTorqueSolver, KinematicDynamicModel};
use std::sync::Arc;
use tracing::info;

/// 通过初始化检查的模型与命令出口
///
/// 无公开构造函数，持有它即证明检查已通过。
#[derive(Debug)]
pub struct ValidatedSetup<S> {
    model: Arc<KinematicDynamicModel>,
    sink: S,
}

impl<S: CommandSink> ValidatedSetup<S> {
    /// 模型
    pub fn model(&self) -> &Arc<KinematicDynamicModel> {
        &self.model
    }

    /// 已检查的命令出口
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// 基于该模型的求解器
    pub fn solver(&self) -> GravityTorqueSolver {
        GravityTorqueSolver::new(self.model.clone())
    }

    pub(crate) fn into_parts(self) -> (Arc<KinematicDynamicModel>, S) {
        (self.model, self.sink)
    }
}

/// 初始化检查
pub struct InitializationGuard;

impl InitializationGuard {
    /// 校验模型与执行器接口，通过后接管命令出口
    ///
    /// 检查失败时 `sink` 随之被丢弃。
    ///
    /// # 错误
    ///
    /// - 模型构建失败：原样返回
    /// - [`ConfigurationError::JointCountMismatch`]：关节数不同
    /// - [`ConfigurationError::JointOrderMismatch`]：同一位置的关节名称不同
    pub fn validate<S: CommandSink>(
        model: Result<KinematicDynamicModel, ConfigurationError>,
        sink: S,
    ) -> Result<ValidatedSetup<S>, ConfigurationError> {
        let model = Self::check_joint_names(model, sink.joint_names())?;
        Ok(ValidatedSetup { model, sink })
    }

    /// 只校验模型与执行器关节名称列表（不产生 `ValidatedSetup`）
    pub fn check_joint_names(
        model: Result<KinematicDynamicModel, ConfigurationError>,
        actuator_joints: &[String],
    ) -> Result<Arc<KinematicDynamicModel>, ConfigurationError> {
        let model = model?;
        let model_joints = model.joint_names();

        if model_joints.len() != actuator_joints.len() {
            return Err(ConfigurationError::JointCountMismatch {
                model: model_joints.len(),
                actuator: actuator_joints.len(),
            });
        }

        if let Some((index, (m, a))) = model_joints
            .iter()
            .zip(actuator_joints)
            .enumerate()
            .find(|(_, (m, a))| **m != a.as_str())
        {
            return Err(ConfigurationError::JointOrderMismatch {
                index,
                model: m.to_string(),
                actuator: a.clone(),
            });
        }

        info!(
            "Initialization check passed: {} joints [{}]",
            model_joints.len(),
            model_joints.join(", ")
        );

        Ok(Arc::new(model))
    }
}
