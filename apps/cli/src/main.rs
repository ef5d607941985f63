//! # gravcomp CLI
//!
//! 重力补偿控制回路的命令行宿主。
//!
//! ```bash
//! # 列出内置模型
//! gravcomp-cli presets
//!
//! # 单次计算重力补偿力矩
//! gravcomp-cli torque --preset two_link --positions 0.3,-0.5
//!
//! # 初始化检查（失败时退出码为 1）
//! gravcomp-cli check --config arm.toml --actuator-joints waist,shoulder,elbow
//!
//! # 运行控制回路（模拟传感器，Ctrl-C 停止）
//! gravcomp-cli run --preset demo_arm --rate 200 --motion sweep
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod sim;

use commands::{CheckCommand, RunCommand, TorqueCommand};

/// gravcomp CLI - 重力补偿命令行工具
#[derive(Parser, Debug)]
#[command(name = "gravcomp-cli")]
#[command(about = "Gravity compensation for serial manipulators", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 计算给定关节位置的重力补偿力矩
    Torque {
        #[command(flatten)]
        args: TorqueCommand,
    },

    /// 校验模型与执行器关节配置
    Check {
        #[command(flatten)]
        args: CheckCommand,
    },

    /// 运行控制回路（模拟传感器输入）
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 列出内置模型
    Presets,
}

fn main() -> Result<()> {
    // 初始化日志
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("gravcomp_cli=info,gravcomp_driver=info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Torque { args } => args.execute(),
        Commands::Check { args } => args.execute(),
        Commands::Run { args } => args.execute(),
        Commands::Presets => commands::presets::execute(),
    }
}
