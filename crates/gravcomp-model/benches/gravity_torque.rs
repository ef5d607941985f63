//! 重力补偿力矩性能基准测试
//!
//! 控制周期内的主要计算开销；6 关节模型单次求解应远小于 10ms 周期。

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use gravcomp_model::{GravityTorqueSolver, JointState, KinematicDynamicModel, presets};
use std::sync::Arc;
use std::time::Instant;

fn bench_compute_gravity_torque(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_gravity_torque");

    for name in presets::PRESET_NAMES {
        let model = KinematicDynamicModel::from_preset(name).unwrap();
        let q: Vec<f64> = (0..model.dof()).map(|i| 0.1 * (i + 1) as f64).collect();
        group.bench_function(*name, |b| {
            b.iter(|| model.compute_gravity_torque(black_box(&q)).unwrap())
        });
    }

    group.finish();
}

fn bench_solver(c: &mut Criterion) {
    let model = Arc::new(KinematicDynamicModel::from_preset("demo_arm").unwrap());
    let solver = GravityTorqueSolver::new(model);
    let sample = JointState::from_positions([0.1, -0.4, 0.8, 0.2, -0.3, 1.0], Instant::now());

    c.bench_function("solver_demo_arm", |b| {
        b.iter(|| solver.solve(black_box(&sample)).unwrap())
    });
}

criterion_group!(benches, bench_compute_gravity_torque, bench_solver);
criterion_main!(benches);
