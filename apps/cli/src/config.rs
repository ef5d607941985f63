//! 配置文件
//!
//! 一个 TOML 文件描述一次部署：
//!
//! ```toml
//! [model]
//! joint_names = ["joint1"]
//! masses = [1.0]
//! centers_of_mass = [[0.0, 0.0, -0.5]]
//! inertias = [[[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]]
//! axes = [[0.0, 1.0, 0.0]]
//! origins = [{}]
//!
//! [control]
//! frequency_hz = 100.0
//! staleness_ms = 50
//!
//! [actuator]
//! joint_names = ["joint1"]
//! queue_capacity = 64
//! ```
//!
//! `[control]` 缺省使用 [`LoopConfig::default`]；`[actuator]` 缺省使用模型的关节名称。

use anyhow::{Context, Result};
use clap::Args;
use gravcomp_driver::LoopConfig;
use gravcomp_model::{ModelDescription, presets};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 执行器命令队列默认容量
const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// 执行器接口配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuatorConfig {
    /// 执行器期望的关节名称（顺序即命令分量顺序）
    pub joint_names: Vec<String>,

    /// 命令队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

/// 部署配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 机械臂结构
    pub model: ModelDescription,

    /// 控制循环
    #[serde(default)]
    pub control: LoopConfig,

    /// 执行器接口
    #[serde(default)]
    pub actuator: Option<ActuatorConfig>,
}

impl AppConfig {
    /// 使用内置模型，其余取默认值
    pub fn from_preset(name: &str) -> Result<Self> {
        Ok(Self {
            model: presets::preset(name)?,
            control: LoopConfig::default(),
            actuator: None,
        })
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    /// 从文件加载
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// 执行器关节名称（未配置时与模型一致）
    pub fn actuator_joints(&self) -> Vec<String> {
        match &self.actuator {
            Some(actuator) => actuator.joint_names.clone(),
            None => self.model.joint_names.clone(),
        }
    }

    /// 执行器命令队列容量
    pub fn queue_capacity(&self) -> usize {
        self.actuator
            .as_ref()
            .map_or(DEFAULT_QUEUE_CAPACITY, |a| a.queue_capacity)
    }
}

/// 模型来源（配置文件或内置模型，二选一）
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct ModelArgs {
    /// 配置文件路径（TOML）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 内置模型名称（见 `presets` 子命令）
    #[arg(short, long)]
    pub preset: Option<String>,
}

impl ModelArgs {
    /// 加载部署配置
    pub fn load(&self) -> Result<AppConfig> {
        match (&self.config, &self.preset) {
            (Some(path), _) => AppConfig::load(path),
            (None, Some(name)) => AppConfig::from_preset(name),
            (None, None) => anyhow::bail!("Either --config or --preset is required"),
        }
    }
}

/// 解析逗号分隔的数值列表
pub fn parse_list(input: &str) -> Result<Vec<f64>> {
    let values = input
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to parse number list '{}'", input))?;

    if values.is_empty() {
        anyhow::bail!("Number list must not be empty");
    }
    Ok(values)
}

/// 解析逗号分隔的名称列表
pub fn parse_names(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
