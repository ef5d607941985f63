//! 重力力矩求解器
//!
//! 把最新的 [`JointState`] 交给模型计算，并对输入/输出做有限性检查。
//! 传感器数据来自外部且未经校验，移动关节的极端位移也可能使计算溢出，
//! 此时返回 [`SolverError`]，由控制循环执行失效保护。

use crate::error::SolverError;
use crate::model::KinematicDynamicModel;
use crate::types::{JointState, TorqueCommand};
use std::sync::Arc;

/// 重力力矩求解器
#[derive(Debug, Clone)]
pub struct GravityTorqueSolver {
    model: Arc<KinematicDynamicModel>,
}

impl GravityTorqueSolver {
    /// 创建求解器
    pub fn new(model: Arc<KinematicDynamicModel>) -> Self {
        Self { model }
    }

    /// 模型引用
    pub fn model(&self) -> &Arc<KinematicDynamicModel> {
        &self.model
    }

    /// 关节数
    pub fn dof(&self) -> usize {
        self.model.dof()
    }

    /// 计算一个样本对应的补偿力矩
    ///
    /// # 错误
    ///
    /// - [`SolverError::Model`]：样本关节数与模型不一致
    /// - [`SolverError::NonFiniteInput`]：样本位置含 NaN/Inf
    /// - [`SolverError::NonFinite`]：输出力矩含 NaN/Inf
    pub fn solve(&self, state: &JointState) -> Result<TorqueCommand, SolverError> {
        self.model.check_dimension(state.positions.len())?;

        if let Some((joint, &value)) = first_non_finite(&state.positions) {
            return Err(SolverError::NonFiniteInput { joint, value });
        }

        let efforts = self.model.compute_gravity_torque(&state.positions)?;

        if let Some((joint, &value)) = first_non_finite(&efforts) {
            return Err(SolverError::NonFinite { joint, value });
        }

        Ok(TorqueCommand::new(efforts, state.timestamp))
    }
}

fn first_non_finite(values: &[f64]) -> Option<(usize, &f64)> {
    values.iter().enumerate().find(|(_, v)| !v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{JointKind, JointOrigin, LinkParams, ModelDescription};
    use crate::error::ModelError;
    use crate::presets;
    use std::time::Instant;

    fn solver() -> GravityTorqueSolver {
        let model = KinematicDynamicModel::new(&presets::planar_two_link(1.0, 0.3, 0.5, 0.2)).unwrap();
        GravityTorqueSolver::new(Arc::new(model))
    }

    #[test]
    fn test_solve_keeps_source_timestamp() {
        let solver = solver();
        let ts = Instant::now();
        let cmd = solver.solve(&JointState::from_positions([0.1, 0.2], ts)).unwrap();
        assert_eq!(cmd.source_timestamp, ts);
        assert_eq!(cmd.len(), 2);
        assert_eq!(
            cmd.efforts.as_slice(),
            solver.model().compute_gravity_torque(&[0.1, 0.2]).unwrap().as_slice()
        );
    }

    #[test]
    fn test_non_finite_input() {
        let solver = solver();
        let state = JointState::from_positions([0.1, f64::NAN], Instant::now());
        match solver.solve(&state) {
            Err(SolverError::NonFiniteInput { joint, value }) => {
                assert_eq!(joint, 1);
                assert!(value.is_nan());
            },
            other => panic!("Expected NonFiniteInput, got {:?}", other),
        }
    }

    /// 旋转关节下游的移动关节位移过大时计算溢出
    #[test]
    fn test_overflowing_prismatic_travel() {
        let mut rail =
            LinkParams::point_mass("rail", 2.0, [0.0; 3], [1.0, 0.0, 0.0], JointOrigin::default());
        rail.kind = JointKind::Prismatic;
        let desc = ModelDescription::default()
            .link(LinkParams::point_mass(
                "pitch",
                1.0,
                [0.1, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                JointOrigin::default(),
            ))
            .link(rail);
        let solver = GravityTorqueSolver::new(Arc::new(KinematicDynamicModel::new(&desc).unwrap()));

        let state = JointState::from_positions([0.0, 1e308], Instant::now());
        match solver.solve(&state) {
            Err(SolverError::NonFinite { joint, value }) => {
                assert_eq!(joint, 0);
                assert!(!value.is_finite());
            },
            other => panic!("Expected NonFinite, got {:?}", other),
        }

        // 正常行程仍然可解
        assert!(solver.solve(&JointState::from_positions([0.0, 0.5], Instant::now())).is_ok());
    }

    #[test]
    fn test_wrong_length_sample() {
        let solver = solver();
        let state = JointState::from_positions([0.1, 0.2, 0.3], Instant::now());
        assert_eq!(
            solver.solve(&state),
            Err(SolverError::Model(ModelError::DimensionMismatch {
                expected: 2,
                actual: 3
            }))
        );
    }

    #[test]
    fn test_first_non_finite() {
        assert_eq!(first_non_finite(&[0.0, 1.0]), None);
        assert_eq!(
            first_non_finite(&[0.0, f64::INFINITY, f64::NAN]).map(|(i, _)| i),
            Some(1)
        );
    }
}
