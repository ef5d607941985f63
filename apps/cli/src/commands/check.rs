//! 初始化检查命令

use crate::config::{ModelArgs, parse_names};
use anyhow::{Context, Result};
use clap::Args;
use gravcomp_driver::InitializationGuard;
use gravcomp_model::KinematicDynamicModel;

/// 初始化检查参数
#[derive(Args, Debug)]
pub struct CheckCommand {
    #[command(flatten)]
    pub model: ModelArgs,

    /// 执行器关节名称，逗号分隔（覆盖配置文件）
    #[arg(long)]
    pub actuator_joints: Option<String>,
}

impl CheckCommand {
    pub fn execute(self) -> Result<()> {
        let config = self.model.load()?;
        let actuator = match &self.actuator_joints {
            Some(list) => parse_names(list),
            None => config.actuator_joints(),
        };

        let model = InitializationGuard::check_joint_names(
            KinematicDynamicModel::new(&config.model),
            &actuator,
        )
        .context("Initialization check failed")?;
        config.control.validate().context("Invalid [control] section")?;

        println!("✅ 初始化检查通过");
        println!("  关节数: {}", model.dof());
        println!("  关节:   {}", model.joint_names().join(", "));
        println!("  总质量: {:.3} kg", model.total_mass());
        println!(
            "  控制:   {:.1} Hz, 过期阈值 {} ms",
            config.control.frequency_hz, config.control.staleness_ms
        );
        Ok(())
    }
}
