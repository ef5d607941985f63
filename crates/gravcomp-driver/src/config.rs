//! 控制循环配置

use crate::error::SchedulerError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 频率上限（Hz）
const MAX_FREQUENCY_HZ: f64 = 10_000.0;

/// 超过该频率时给出性能警告（Hz）
const WARN_FREQUENCY_HZ: f64 = 2_000.0;

/// 周期上限
const MAX_PERIOD: Duration = Duration::from_secs(3_600);

/// 控制循环配置
///
/// 可从 TOML 的 `[control]` 段反序列化，缺省字段使用默认值：
///
/// ```toml
/// [control]
/// frequency_hz = 100.0
/// staleness_ms = 50
/// spin_sleep = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// 控制频率（Hz）
    ///
    /// 例如：100.0 表示 100Hz（10ms 周期）
    pub frequency_hz: f64,

    /// 传感器数据过期阈值（毫秒）
    ///
    /// 最新样本的年龄超过该值时，本周期发送零力矩。
    pub staleness_ms: u64,

    /// 是否使用 `spin_sleep` 实现低抖动延时
    ///
    /// ⚠️ 会占用更多 CPU；关闭时使用 `std::thread::sleep`。
    pub spin_sleep: bool,

    /// 最大周期数（None 表示一直运行到 `stop()`）
    ///
    /// 用于测试或定时运行。
    pub max_iterations: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 100.0, // 默认 100Hz
            staleness_ms: 50,    // 默认 5 个周期
            spin_sleep: true,
            max_iterations: None,
        }
    }
}

impl LoopConfig {
    /// 标称周期
    ///
    /// 频率无效（周期无法表示）时返回 `None`。
    pub fn try_period(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(1.0 / self.frequency_hz).ok()
    }

    /// 标称周期
    ///
    /// 仅对通过 [`validate`](Self::validate) 的配置有意义；周期无法表示时饱和为 `Duration::MAX`。
    pub fn period(&self) -> Duration {
        self.try_period().unwrap_or(Duration::MAX)
    }

    /// 过期阈值
    pub fn staleness_threshold(&self) -> Duration {
        Duration::from_millis(self.staleness_ms)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if !self.frequency_hz.is_finite() || self.frequency_hz <= 0.0 {
            return Err(SchedulerError::ConfigError(format!(
                "Invalid frequency_hz: {} (must be > 0)",
                self.frequency_hz
            )));
        }
        if self.frequency_hz > MAX_FREQUENCY_HZ {
            return Err(SchedulerError::ConfigError(format!(
                "Invalid frequency_hz: {} (must be <= {})",
                self.frequency_hz, MAX_FREQUENCY_HZ
            )));
        }
        let period = match self.try_period() {
            Some(period) if period <= MAX_PERIOD => period,
            _ => {
                return Err(SchedulerError::ConfigError(format!(
                    "Invalid frequency_hz: {} (period must be <= {:?})",
                    self.frequency_hz, MAX_PERIOD
                )));
            },
        };
        if self.frequency_hz > WARN_FREQUENCY_HZ {
            tracing::warn!(
                "Very high control frequency: {} Hz. This may cause performance issues.",
                self.frequency_hz
            );
        }
        if self.staleness_ms == 0 {
            return Err(SchedulerError::ConfigError(
                "Invalid staleness_ms: 0 (must be > 0)".to_string(),
            ));
        }
        if self.staleness_threshold() < period {
            tracing::warn!(
                "Staleness threshold {:?} is shorter than the control period {:?}; \
                 most ticks will be treated as stale unless the sensor runs faster than the loop.",
                self.staleness_threshold(),
                period
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_config_default() {
        let config = LoopConfig::default();
        assert_eq!(config.frequency_hz, 100.0);
        assert_eq!(config.period(), Duration::from_millis(10));
        assert_eq!(config.staleness_threshold(), Duration::from_millis(50));
        assert!(config.spin_sleep);
        assert_eq!(config.max_iterations, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_frequency() {
        for hz in [0.0, -1.0, f64::NAN, 20_000.0] {
            let config = LoopConfig {
                frequency_hz: hz,
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(SchedulerError::ConfigError(_))),
                "{hz}"
            );
        }
    }

    #[test]
    fn test_unrepresentable_period_rejected() {
        for hz in [1e-30, f64::MIN_POSITIVE, 1e-4] {
            let config = LoopConfig {
                frequency_hz: hz,
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(SchedulerError::ConfigError(_))),
                "{hz}"
            );
        }
        let config = LoopConfig {
            frequency_hz: 1e-30,
            ..Default::default()
        };
        assert_eq!(config.try_period(), None);
        assert_eq!(config.period(), Duration::MAX);
    }

    #[test]
    fn test_zero_staleness() {
        let config = LoopConfig {
            staleness_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: LoopConfig = toml::from_str("frequency_hz = 200.0").unwrap();
        assert_eq!(config.frequency_hz, 200.0);
        assert_eq!(config.staleness_ms, 50);
        assert!(config.spin_sleep);
    }
}
