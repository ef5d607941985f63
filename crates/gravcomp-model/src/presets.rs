//! 预置模型描述
//!
//! 用于演示、测试和 CLI 的 `--preset` 参数。
//! `demo_arm` 的参数量级参考 5-6 自由度桌面机械臂，不对应任何具体型号。

use crate::description::{JointOrigin, LinkParams, ModelDescription, STANDARD_GRAVITY};
use crate::error::ConfigurationError;

/// 所有预置模型名称
pub const PRESET_NAMES: &[&str] = &["pendulum", "two_link", "demo_arm"];

/// 按名称获取预置模型
pub fn preset(name: &str) -> Result<ModelDescription, ConfigurationError> {
    match name {
        "pendulum" => Ok(single_pendulum(1.0, 0.5)),
        "two_link" => Ok(planar_two_link(1.0, 0.3, 0.5, 0.25)),
        "demo_arm" => Ok(demo_arm()),
        other => Err(ConfigurationError::UnknownPreset(other.to_string())),
    }
}

/// 单摆：绕 Y 轴旋转，点质量 `mass` 位于关节下方 `r` 处
///
/// `θ = 0` 为自然下垂位姿，补偿力矩 `τ = m·g·r·sin θ`。
pub fn single_pendulum(mass: f64, r: f64) -> ModelDescription {
    ModelDescription::with_gravity(STANDARD_GRAVITY).link(LinkParams::point_mass(
        "joint1",
        mass,
        [0.0, 0.0, -r],
        [0.0, 1.0, 0.0],
        JointOrigin::default(),
    ))
}

/// 平面二连杆：两个关节均绕 Y 轴，零位时连杆沿 +X 水平伸出，
/// 点质量位于各连杆末端
pub fn planar_two_link(m1: f64, l1: f64, m2: f64, l2: f64) -> ModelDescription {
    ModelDescription::with_gravity(STANDARD_GRAVITY)
        .link(LinkParams::point_mass(
            "shoulder",
            m1,
            [l1, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            JointOrigin::default(),
        ))
        .link(LinkParams::point_mass(
            "elbow",
            m2,
            [l2, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            JointOrigin::translation(l1, 0.0, 0.0),
        ))
}

/// 6 自由度演示机械臂
pub fn demo_arm() -> ModelDescription {
    let links = [
        // (名称, 质量, 质心, 对角惯性, 轴, 原点)
        ("waist", 0.48, [0.0, 0.0, 0.02], [6e-4, 6e-4, 8e-4], [0.0, 0.0, 1.0], [0.0, 0.0, 0.072]),
        ("shoulder", 0.43, [0.01, 0.0, 0.15], [3e-3, 3e-3, 2e-4], [0.0, 1.0, 0.0], [0.0, 0.0, 0.039]),
        ("elbow", 0.34, [0.12, 0.0, 0.0], [1e-4, 1.5e-3, 1.5e-3], [0.0, 1.0, 0.0], [0.05, 0.0, 0.25]),
        ("forearm_roll", 0.41, [0.08, 0.0, 0.0], [1e-4, 6e-4, 6e-4], [1.0, 0.0, 0.0], [0.175, 0.0, 0.0]),
        ("wrist_angle", 0.30, [0.04, 0.0, 0.01], [1e-4, 1e-4, 1e-4], [0.0, 1.0, 0.0], [0.075, 0.0, 0.0]),
        ("wrist_rotate", 0.26, [0.05, 0.0, 0.0], [2e-4, 2e-4, 2e-4], [1.0, 0.0, 0.0], [0.065, 0.0, 0.0]),
    ];

    links.into_iter().fold(
        ModelDescription::with_gravity(STANDARD_GRAVITY),
        |desc, (name, mass, com, diag, axis, xyz)| {
            desc.link(LinkParams {
                joint_name: name.to_string(),
                kind: Default::default(),
                mass,
                center_of_mass: com,
                inertia: [[diag[0], 0.0, 0.0], [0.0, diag[1], 0.0], [0.0, 0.0, diag[2]]],
                axis,
                origin: JointOrigin::translation(xyz[0], xyz[1], xyz[2]),
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KinematicDynamicModel;

    #[test]
    fn test_all_presets_build() {
        for name in PRESET_NAMES {
            let model = KinematicDynamicModel::from_preset(name).unwrap();
            assert!(model.dof() > 0, "{name}");
        }
    }

    #[test]
    fn test_unknown_preset() {
        assert!(matches!(
            preset("scara"),
            Err(ConfigurationError::UnknownPreset(name)) if name == "scara"
        ));
    }

    #[test]
    fn test_demo_arm_joint_names() {
        let model = KinematicDynamicModel::new(&demo_arm()).unwrap();
        assert_eq!(
            model.joint_names(),
            vec!["waist", "shoulder", "elbow", "forearm_roll", "wrist_angle", "wrist_rotate"]
        );
    }
}
