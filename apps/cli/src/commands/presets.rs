//! 内置模型列表

use anyhow::Result;
use gravcomp_model::{KinematicDynamicModel, presets};

pub fn execute() -> Result<()> {
    println!("内置模型:");
    for name in presets::PRESET_NAMES {
        let model = KinematicDynamicModel::from_preset(name)?;
        println!(
            "  {:<10} {} 关节, {:.2} kg  [{}]",
            name,
            model.dof(),
            model.total_mass(),
            model.joint_names().join(", ")
        );
    }
    Ok(())
}
