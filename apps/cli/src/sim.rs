//! 模拟传感器
//!
//! 以固定频率产生关节状态样本，替代真实的编码器读数。

use anyhow::{Result, bail};
use clap::ValueEnum;
use gravcomp_driver::{JointStateSource, SourceError};
use gravcomp_model::JointState;
use std::f64::consts::TAU;
use std::time::{Duration, Instant};

/// 模拟运动
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Motion {
    /// 保持在初始位置
    #[default]
    Hold,
    /// 各关节围绕初始位置正弦摆动
    Sweep,
}

/// 正弦摆动幅值（rad）
const SWEEP_AMPLITUDE: f64 = 0.5;

/// 正弦摆动频率（Hz）
const SWEEP_FREQUENCY: f64 = 0.2;

/// 采样周期上限
const MAX_PERIOD: Duration = Duration::from_secs(3_600);

/// 模拟传感器
#[derive(Debug)]
pub struct SimulatedSensor {
    home: Vec<f64>,
    motion: Motion,
    period: Duration,
    started: Instant,
    next_sample: Instant,
    /// 产生指定数量样本后停止更新（用于演示过期保护）
    limit: Option<u64>,
    produced: u64,
}

impl SimulatedSensor {
    /// 创建模拟传感器
    ///
    /// `rate_hz` 必须为正，且对应周期不超过一小时。
    pub fn new(home: Vec<f64>, motion: Motion, rate_hz: f64) -> Result<Self> {
        if !(rate_hz.is_finite() && rate_hz > 0.0) {
            bail!("Invalid sensor rate: {} Hz (must be > 0)", rate_hz);
        }
        let period = match Duration::try_from_secs_f64(1.0 / rate_hz) {
            Ok(period) if period <= MAX_PERIOD => period,
            _ => bail!(
                "Invalid sensor rate: {} Hz (period must be <= {:?})",
                rate_hz,
                MAX_PERIOD
            ),
        };

        let now = Instant::now();
        Ok(Self {
            home,
            motion,
            period,
            started: now,
            next_sample: now,
            limit: None,
            produced: 0,
        })
    }

    /// 初始关节位置
    pub fn with_home(mut self, home: Vec<f64>) -> Self {
        self.home = home;
        self
    }

    /// 产生 `limit` 个样本后不再更新
    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    /// 时刻 `t`（秒）的关节位置
    pub fn positions_at(&self, t: f64) -> Vec<f64> {
        match self.motion {
            Motion::Hold => self.home.clone(),
            Motion::Sweep => self
                .home
                .iter()
                .enumerate()
                .map(|(i, q0)| {
                    // 各关节相位错开
                    let phase = i as f64 * TAU / 6.0;
                    q0 + SWEEP_AMPLITUDE * (TAU * SWEEP_FREQUENCY * t + phase).sin()
                })
                .collect(),
        }
    }
}

impl JointStateSource for SimulatedSensor {
    fn next_sample(&mut self, timeout: Duration) -> Result<Option<JointState>, SourceError> {
        let now = Instant::now();
        if self.limit.is_some_and(|limit| self.produced >= limit) {
            std::thread::sleep(timeout);
            return Ok(None);
        }
        if self.next_sample > now {
            let wait = self.next_sample - now;
            if wait > timeout {
                std::thread::sleep(timeout);
                return Ok(None);
            }
            std::thread::sleep(wait);
        }

        let timestamp = Instant::now();
        self.next_sample += self.period;
        self.produced += 1;
        let t = timestamp.duration_since(self.started).as_secs_f64();
        Ok(Some(JointState::from_positions(
            self.positions_at(t),
            timestamp,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_returns_home() {
        let sensor = SimulatedSensor::new(vec![0.1, 0.2], Motion::Hold, 100.0).unwrap();
        assert_eq!(sensor.positions_at(3.0), vec![0.1, 0.2]);
    }

    #[test]
    fn test_sweep_bounded() {
        let sensor = SimulatedSensor::new(vec![0.0; 3], Motion::Sweep, 100.0).unwrap();
        for k in 0..100 {
            let q = sensor.positions_at(k as f64 * 0.1);
            assert!(q.iter().all(|v| v.abs() <= SWEEP_AMPLITUDE + 1e-12));
        }
    }

    #[test]
    fn test_samples_and_limit() {
        let mut sensor = SimulatedSensor::new(vec![0.0], Motion::Hold, 1000.0)
            .unwrap()
            .with_limit(Some(2));
        let timeout = Duration::from_millis(20);
        assert!(sensor.next_sample(timeout).unwrap().is_some());
        assert!(sensor.next_sample(timeout).unwrap().is_some());
        assert!(sensor.next_sample(timeout).unwrap().is_none());
    }

    #[test]
    fn test_unrepresentable_rate_rejected() {
        for rate in [0.0, -5.0, f64::NAN, f64::INFINITY, 1e-30, 1e-4] {
            assert!(SimulatedSensor::new(vec![0.0], Motion::Hold, rate).is_err());
        }
    }
}
