//! 单次力矩计算命令

use crate::config::{ModelArgs, parse_list};
use anyhow::{Context, Result};
use clap::Args;
use gravcomp_model::{GravityTorqueSolver, JointState, KinematicDynamicModel};
use std::sync::Arc;
use std::time::Instant;

/// 力矩计算参数
#[derive(Args, Debug)]
pub struct TorqueCommand {
    #[command(flatten)]
    pub model: ModelArgs,

    /// 关节位置（rad 或 m），逗号分隔
    /// 例如：0.1,0.2,0.3
    #[arg(short = 'q', long, allow_hyphen_values = true)]
    pub positions: String,
}

impl TorqueCommand {
    pub fn execute(self) -> Result<()> {
        let config = self.model.load()?;
        let model = KinematicDynamicModel::new(&config.model).context("Invalid model")?;
        let positions = parse_list(&self.positions)?;

        // 与控制循环相同的求解路径：拒绝非有限输入与输出
        let solver = GravityTorqueSolver::new(Arc::new(model));
        let sample = JointState::from_positions(positions.iter().copied(), Instant::now());
        let command = solver
            .solve(&sample)
            .context("Failed to compute gravity torque")?;

        let model = solver.model();
        println!("重力补偿力矩（{} 关节）:", model.dof());
        for ((name, q), tau) in model
            .joint_names()
            .iter()
            .zip(&positions)
            .zip(&command.efforts)
        {
            println!("  {:<16} q = {:>9.4}  τ = {:>10.5}", name, q, tau);
        }
        Ok(())
    }
}
