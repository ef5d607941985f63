//! # gravcomp-model
//!
//! 串联机械臂的运动学/动力学模型与重力补偿力矩求解。
//!
//! - [`ModelDescription`]：外部提供的结构参数（TOML 可反序列化）
//! - [`KinematicDynamicModel`]：校验后的不可变模型，计算重力补偿力矩
//! - [`GravityTorqueSolver`]：对传感器样本求解，带有限性检查
//!
//! # 示例
//!
//! ```rust
//! use gravcomp_model::{KinematicDynamicModel, presets};
//!
//! let model = KinematicDynamicModel::new(&presets::single_pendulum(1.0, 0.5))?;
//! let tau = model.compute_gravity_torque(&[std::f64::consts::FRAC_PI_2])?;
//! assert!((tau[0] - 1.0 * 9.80665 * 0.5).abs() < 1e-9);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod chain;
mod description;
mod error;
mod model;
pub mod presets;
mod solver;
mod types;

pub use chain::{KinematicChain, Link};
pub use description::{JointKind, JointOrigin, LinkParams, ModelDescription, STANDARD_GRAVITY};
pub use error::{ConfigurationError, ModelError, SolverError};
pub use model::KinematicDynamicModel;
pub use solver::GravityTorqueSolver;
pub use types::{INLINE_JOINTS, JointState, JointVec, TorqueCommand};
