//! 运动链
//!
//! [`KinematicChain`] 是校验后的串联连杆序列，从基座到末端，不允许分支。
//! 每个 [`Link`] 由一个关节和它驱动的刚体组成：
//!
//! ```text
//! T_i = T_{i-1} · origin_i · motion_i(q_i)
//! ```
//!
//! 其中 `motion_i` 对旋转关节是绕 `axis` 的旋转，对移动关节是沿 `axis` 的平移。
//! 连杆的质心与惯性张量都表达在 `T_i` 坐标系下。

use crate::description::{JointKind, JointOrigin, ModelDescription};
use crate::error::ConfigurationError;
use nalgebra::{Isometry3, Matrix3, Translation3, Unit, UnitQuaternion, Vector3};

/// 对称性检查的相对容差
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// 半正定检查的相对容差（允许数值误差造成的微小负特征值）
const PSD_TOLERANCE: f64 = 1e-9;

/// 关节轴范数下限
const AXIS_EPSILON: f64 = 1e-12;

/// 单个连杆（关节 + 子刚体）
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    /// 关节名称
    pub name: String,
    /// 关节类型
    pub kind: JointKind,
    /// 质量（kg，≥ 0）
    pub mass: f64,
    /// 质心（连杆坐标系）
    pub center_of_mass: Vector3<f64>,
    /// 惯性张量（对称半正定）
    ///
    /// 纯重力补偿不需要惯性，但它属于连杆的完整刚体描述，构建时同样校验。
    pub inertia: Matrix3<f64>,
    /// 关节轴（单位向量，关节坐标系）
    pub axis: Unit<Vector3<f64>>,
    /// 父坐标系到关节坐标系的固定变换
    pub origin: Isometry3<f64>,
}

impl Link {
    /// 关节变量对应的相对运动
    #[inline]
    pub fn joint_motion(&self, q: f64) -> Isometry3<f64> {
        match self.kind {
            JointKind::Revolute => Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(&self.axis, q),
            ),
            JointKind::Prismatic => Isometry3::from_parts(
                Translation3::from(self.axis.into_inner() * q),
                UnitQuaternion::identity(),
            ),
        }
    }

    /// 父坐标系到本连杆坐标系的完整变换
    #[inline]
    pub fn local_transform(&self, q: f64) -> Isometry3<f64> {
        self.origin * self.joint_motion(q)
    }
}

/// 串联运动链（基座到末端）
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicChain {
    links: Vec<Link>,
}

impl KinematicChain {
    /// 由结构描述构建并校验
    pub fn from_description(desc: &ModelDescription) -> Result<Self, ConfigurationError> {
        let n = desc.check_lengths()?;

        let mut links = Vec::with_capacity(n);
        for i in 0..n {
            let name = &desc.joint_names[i];
            if links.iter().any(|l: &Link| &l.name == name) {
                return Err(ConfigurationError::DuplicateJoint(name.clone()));
            }

            let kind = desc
                .joint_kinds
                .as_ref()
                .map_or(JointKind::Revolute, |kinds| kinds[i]);

            links.push(Link {
                name: name.clone(),
                kind,
                mass: validate_mass(name, desc.masses[i])?,
                center_of_mass: finite_vector(name, "center_of_mass", desc.centers_of_mass[i])?,
                inertia: validate_inertia(name, &desc.inertias[i])?,
                axis: validate_axis(name, desc.axes[i])?,
                origin: origin_to_isometry(name, &desc.origins[i])?,
            });
        }

        Ok(Self { links })
    }

    /// 关节数
    pub fn dof(&self) -> usize {
        self.links.len()
    }

    /// 连杆序列
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// 关节名称（按链顺序）
    pub fn joint_names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.links.iter().map(|l| l.name.as_str())
    }
}

fn validate_mass(link: &str, mass: f64) -> Result<f64, ConfigurationError> {
    if !mass.is_finite() || mass < 0.0 {
        return Err(ConfigurationError::InvalidMass {
            link: link.to_string(),
            value: mass,
        });
    }
    Ok(mass)
}

fn finite_vector(
    link: &str,
    field: &'static str,
    v: [f64; 3],
) -> Result<Vector3<f64>, ConfigurationError> {
    if v.iter().all(|x| x.is_finite()) {
        Ok(Vector3::from(v))
    } else {
        Err(ConfigurationError::NonFinite {
            link: link.to_string(),
            field,
        })
    }
}

fn validate_axis(link: &str, axis: [f64; 3]) -> Result<Unit<Vector3<f64>>, ConfigurationError> {
    let invalid = || ConfigurationError::InvalidAxis {
        link: link.to_string(),
        axis,
    };
    if !axis.iter().all(|x| x.is_finite()) {
        return Err(invalid());
    }
    Unit::try_new(Vector3::from(axis), AXIS_EPSILON).ok_or_else(invalid)
}

fn validate_inertia(link: &str, rows: &[[f64; 3]; 3]) -> Result<Matrix3<f64>, ConfigurationError> {
    let m = Matrix3::from_fn(|r, c| rows[r][c]);
    if !m.iter().all(|x| x.is_finite()) {
        return Err(ConfigurationError::NonFinite {
            link: link.to_string(),
            field: "inertia",
        });
    }

    // 零惯性（点质量）是合法的
    let scale = m.amax().max(f64::MIN_POSITIVE);
    if (m - m.transpose()).amax() > SYMMETRY_TOLERANCE * scale {
        return Err(ConfigurationError::AsymmetricInertia {
            link: link.to_string(),
        });
    }

    let min_eigenvalue = m.symmetric_eigenvalues().min();
    if min_eigenvalue < -PSD_TOLERANCE * scale {
        return Err(ConfigurationError::NotPositiveSemidefinite {
            link: link.to_string(),
            min_eigenvalue,
        });
    }
    Ok(m)
}

fn origin_to_isometry(link: &str, origin: &JointOrigin) -> Result<Isometry3<f64>, ConfigurationError> {
    let xyz = finite_vector(link, "origin.xyz", origin.xyz)?;
    let rpy = finite_vector(link, "origin.rpy", origin.rpy)?;
    Ok(Isometry3::from_parts(
        Translation3::from(xyz),
        UnitQuaternion::from_euler_angles(rpy.x, rpy.y, rpy.z),
    ))
}
