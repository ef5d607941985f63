//! 模型结构描述
//!
//! [`ModelDescription`] 是外部提供的原始参数（通常来自 TOML 文件），
//! 以逐连杆的并列数组形式给出。它本身不做校验，校验在
//! [`KinematicDynamicModel::new`](crate::KinematicDynamicModel::new) 中完成。
//!
//! # TOML 格式
//!
//! ```toml
//! gravity = [0.0, 0.0, -9.80665]
//! joint_names = ["waist", "shoulder"]
//! masses = [0.5, 0.3]
//! centers_of_mass = [[0.0, 0.0, 0.02], [0.1, 0.0, 0.0]]
//! inertias = [
//!     [[1e-3, 0.0, 0.0], [0.0, 1e-3, 0.0], [0.0, 0.0, 1e-3]],
//!     [[1e-4, 0.0, 0.0], [0.0, 2e-3, 0.0], [0.0, 0.0, 2e-3]],
//! ]
//! axes = [[0.0, 0.0, 1.0], [0.0, 1.0, 0.0]]
//! origins = [{ xyz = [0.0, 0.0, 0.07] }, { xyz = [0.0, 0.0, 0.04] }]
//! ```

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 标准重力加速度（m/s²），基座坐标系 -Z 方向
pub const STANDARD_GRAVITY: [f64; 3] = [0.0, 0.0, -9.80665];

/// 关节类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JointKind {
    /// 旋转关节（关节变量为角度）
    #[default]
    Revolute,
    /// 移动关节（关节变量为位移）
    Prismatic,
}

/// 父坐标系到关节坐标系的固定变换
///
/// `rpy` 按 URDF 约定：先绕 X（roll），再绕 Y（pitch），最后绕 Z（yaw），固定轴。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointOrigin {
    /// 平移（m）
    #[serde(default)]
    pub xyz: [f64; 3],
    /// 旋转（rad）
    #[serde(default)]
    pub rpy: [f64; 3],
}

impl JointOrigin {
    /// 纯平移
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            xyz: [x, y, z],
            rpy: [0.0; 3],
        }
    }
}

/// 单个连杆参数（用于逐个构建描述）
#[derive(Debug, Clone, PartialEq)]
pub struct LinkParams {
    pub joint_name: String,
    pub kind: JointKind,
    pub mass: f64,
    pub center_of_mass: [f64; 3],
    pub inertia: [[f64; 3]; 3],
    pub axis: [f64; 3],
    pub origin: JointOrigin,
}

impl LinkParams {
    /// 绕 `axis` 旋转、惯性为零的连杆（点质量）
    pub fn point_mass(
        joint_name: impl Into<String>,
        mass: f64,
        center_of_mass: [f64; 3],
        axis: [f64; 3],
        origin: JointOrigin,
    ) -> Self {
        Self {
            joint_name: joint_name.into(),
            kind: JointKind::Revolute,
            mass,
            center_of_mass,
            inertia: [[0.0; 3]; 3],
            axis,
            origin,
        }
    }
}

/// 机械臂结构描述（逐连杆并列数组）
///
/// 第 `i` 个元素描述第 `i` 个关节及其子连杆，顺序为基座到末端。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelDescription {
    /// 基座坐标系下的重力向量（缺省为 [`STANDARD_GRAVITY`]）
    #[serde(default)]
    pub gravity: Option<[f64; 3]>,
    /// 关节名称
    pub joint_names: Vec<String>,
    /// 连杆质量（kg）
    pub masses: Vec<f64>,
    /// 连杆质心（连杆坐标系，m）
    pub centers_of_mass: Vec<[f64; 3]>,
    /// 连杆惯性张量（质心处，连杆坐标系，kg·m²）
    pub inertias: Vec<[[f64; 3]; 3]>,
    /// 关节轴（关节坐标系）
    pub axes: Vec<[f64; 3]>,
    /// 父坐标系到关节坐标系的固定变换
    pub origins: Vec<JointOrigin>,
    /// 关节类型（缺省全部为旋转关节）
    #[serde(default)]
    pub joint_kinds: Option<Vec<JointKind>>,
}

impl ModelDescription {
    /// 空描述，指定重力
    pub fn with_gravity(gravity: [f64; 3]) -> Self {
        Self {
            gravity: Some(gravity),
            ..Self::default()
        }
    }

    /// 追加一个连杆
    pub fn push_link(&mut self, link: LinkParams) -> &mut Self {
        // 一旦出现非旋转关节就显式记录全部类型
        if link.kind != JointKind::Revolute || self.joint_kinds.is_some() {
            let kinds = self
                .joint_kinds
                .get_or_insert_with(|| vec![JointKind::Revolute; self.joint_names.len()]);
            kinds.push(link.kind);
        }
        self.joint_names.push(link.joint_name);
        self.masses.push(link.mass);
        self.centers_of_mass.push(link.center_of_mass);
        self.inertias.push(link.inertia);
        self.axes.push(link.axis);
        self.origins.push(link.origin);
        self
    }

    /// 链式追加连杆
    pub fn link(mut self, link: LinkParams) -> Self {
        self.push_link(link);
        self
    }

    /// 连杆数（以关节名称数为准）
    pub fn len(&self) -> usize {
        self.joint_names.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.joint_names.is_empty()
    }

    /// 实际使用的重力向量
    pub fn gravity_or_default(&self) -> [f64; 3] {
        self.gravity.unwrap_or(STANDARD_GRAVITY)
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigurationError> {
        Ok(toml::from_str(content)?)
    }

    /// 从 TOML 文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 检查并列数组长度一致
    pub(crate) fn check_lengths(&self) -> Result<usize, ConfigurationError> {
        let expected = self.joint_names.len();
        if expected == 0 {
            return Err(ConfigurationError::EmptyDescription);
        }

        let lengths = [
            ("masses", self.masses.len()),
            ("centers_of_mass", self.centers_of_mass.len()),
            ("inertias", self.inertias.len()),
            ("axes", self.axes.len()),
            ("origins", self.origins.len()),
            ("joint_kinds", self.joint_kinds.as_ref().map_or(expected, Vec::len)),
        ];
        for (field, actual) in lengths {
            if actual != expected {
                return Err(ConfigurationError::LengthMismatch {
                    field,
                    expected,
                    actual,
                });
            }
        }
        Ok(expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_LINK: &str = r#"
gravity = [0.0, 0.0, -9.81]
joint_names = ["waist", "shoulder"]
masses = [0.5, 0.3]
centers_of_mass = [[0.0, 0.0, 0.02], [0.1, 0.0, 0.0]]
inertias = [
    [[1e-3, 0.0, 0.0], [0.0, 1e-3, 0.0], [0.0, 0.0, 1e-3]],
    [[1e-4, 0.0, 0.0], [0.0, 2e-3, 0.0], [0.0, 0.0, 2e-3]],
]
axes = [[0.0, 0.0, 1.0], [0.0, 1.0, 0.0]]
origins = [{ xyz = [0.0, 0.0, 0.07] }, { xyz = [0.0, 0.0, 0.04], rpy = [0.0, 0.0, 0.0] }]
"#;

    #[test]
    fn test_parse_toml() {
        let desc = ModelDescription::from_toml_str(TWO_LINK).unwrap();
        assert_eq!(desc.len(), 2);
        assert_eq!(desc.gravity, Some([0.0, 0.0, -9.81]));
        assert_eq!(desc.origins[0], JointOrigin::translation(0.0, 0.0, 0.07));
        assert!(desc.joint_kinds.is_none());
        assert_eq!(desc.check_lengths().unwrap(), 2);
    }

    #[test]
    fn test_parse_joint_kinds() {
        let content = format!("{TWO_LINK}\njoint_kinds = [\"revolute\", \"prismatic\"]\n");
        let desc = ModelDescription::from_toml_str(&content).unwrap();
        assert_eq!(
            desc.joint_kinds,
            Some(vec![JointKind::Revolute, JointKind::Prismatic])
        );
    }

    #[test]
    fn test_parse_error() {
        let err = ModelDescription::from_toml_str("joint_names = 3").unwrap_err();
        assert!(matches!(err, ConfigurationError::Parse(_)));
    }

    #[test]
    fn test_default_gravity() {
        let desc = ModelDescription::default();
        assert_eq!(desc.gravity_or_default(), STANDARD_GRAVITY);
    }

    #[test]
    fn test_length_mismatch() {
        let mut desc = ModelDescription::from_toml_str(TWO_LINK).unwrap();
        desc.axes.pop();
        match desc.check_lengths() {
            Err(ConfigurationError::LengthMismatch {
                field,
                expected,
                actual,
            }) => {
                assert_eq!(field, "axes");
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            },
            other => panic!("Expected LengthMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_description() {
        assert!(matches!(
            ModelDescription::default().check_lengths(),
            Err(ConfigurationError::EmptyDescription)
        ));
    }

    #[test]
    fn test_push_link_records_kinds_lazily() {
        let mut desc = ModelDescription::default();
        desc.push_link(LinkParams::point_mass(
            "j1",
            1.0,
            [0.0; 3],
            [0.0, 0.0, 1.0],
            JointOrigin::default(),
        ));
        assert!(desc.joint_kinds.is_none());

        let mut slider = LinkParams::point_mass(
            "j2",
            1.0,
            [0.0; 3],
            [1.0, 0.0, 0.0],
            JointOrigin::default(),
        );
        slider.kind = JointKind::Prismatic;
        desc.push_link(slider);
        assert_eq!(
            desc.joint_kinds,
            Some(vec![JointKind::Revolute, JointKind::Prismatic])
        );
        assert_eq!(desc.check_lengths().unwrap(), 2);
    }
}
