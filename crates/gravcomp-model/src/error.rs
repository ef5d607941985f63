//! 模型层错误类型定义

use thiserror::Error;

/// 配置错误（启动期致命错误）
///
/// 模型描述不合法、配置文件无法解析，或模型与执行器接口不匹配。
/// 只会在初始化阶段出现，出现后进程不得进入控制循环。
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// 模型描述为空
    #[error("Model description is empty")]
    EmptyDescription,

    /// 逐连杆数组长度不一致
    #[error("Inconsistent description: `{field}` has {actual} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// 关节名称重复
    #[error("Duplicate joint name: {0}")]
    DuplicateJoint(String),

    /// 质量为负或非有限值
    #[error("Link `{link}` has invalid mass: {value}")]
    InvalidMass { link: String, value: f64 },

    /// 惯性张量不对称
    #[error("Link `{link}` inertia tensor is not symmetric")]
    AsymmetricInertia { link: String },

    /// 惯性张量非半正定
    #[error("Link `{link}` inertia tensor is not positive semidefinite (min eigenvalue {min_eigenvalue})")]
    NotPositiveSemidefinite { link: String, min_eigenvalue: f64 },

    /// 关节轴为零向量或非有限值
    #[error("Joint `{link}` has an invalid axis: {axis:?}")]
    InvalidAxis { link: String, axis: [f64; 3] },

    /// 其他非有限参数（质心、原点、惯性）
    #[error("Link `{link}` has a non-finite `{field}`")]
    NonFinite { link: String, field: &'static str },

    /// 重力向量非有限值
    #[error("Gravity vector is not finite: {0:?}")]
    InvalidGravity([f64; 3]),

    /// 模型关节数与执行器接口不一致
    #[error("Joint count mismatch: model has {model}, actuator interface expects {actuator}")]
    JointCountMismatch { model: usize, actuator: usize },

    /// 模型关节顺序与执行器接口不一致
    #[error("Joint order mismatch at index {index}: model `{model}`, actuator `{actuator}`")]
    JointOrderMismatch {
        index: usize,
        model: String,
        actuator: String,
    },

    /// 未知的预置模型
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    /// TOML 解析失败
    #[error("Failed to parse model description: {0}")]
    Parse(#[from] toml::de::Error),

    /// 文件读取失败
    #[error("Failed to read model description: {0}")]
    Io(#[from] std::io::Error),
}

/// 模型计算错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// 输入关节数与运动链不一致
    #[error("Expected {expected} joint positions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// 求解器错误（运行期可恢复，触发失效保护）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// 输入关节位置含非有限值
    #[error("Joint {joint} position is not finite: {value}")]
    NonFiniteInput { joint: usize, value: f64 },

    /// 输出力矩含非有限值
    #[error("Joint {joint} torque is not finite: {value}")]
    NonFinite { joint: usize, value: f64 },

    /// 模型计算错误
    #[error(transparent)]
    Model(#[from] ModelError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err = ConfigurationError::LengthMismatch {
            field: "masses",
            expected: 6,
            actual: 5,
        };
        assert_eq!(
            err.to_string(),
            "Inconsistent description: `masses` has 5 entries, expected 6"
        );

        let err = ConfigurationError::JointCountMismatch {
            model: 6,
            actuator: 5,
        };
        assert!(err.to_string().contains("model has 6"));
    }

    #[test]
    fn test_solver_error_from_model_error() {
        let err: SolverError = ModelError::DimensionMismatch {
            expected: 3,
            actual: 2,
        }
        .into();
        assert!(matches!(err, SolverError::Model(_)));
        assert_eq!(err.to_string(), "Expected 3 joint positions, got 2");
    }
}
