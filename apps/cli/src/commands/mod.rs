//! 命令定义和实现

pub mod check;
pub mod presets;
pub mod run;
pub mod torque;

pub use check::CheckCommand;
pub use run::RunCommand;
pub use torque::TorqueCommand;
