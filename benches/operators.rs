use criterion::{black_box, criterion_group, criterion_main, Criterion};
use egmrs::primitives::LogCobbDouglas;
use egmrs::{
    EgmOperator, ModelConfig, Policy, PolicyOperator, TimeIterationOperator, TimeIterationOptions,
};

fn operator_application(c: &mut Criterion) {
    let model = LogCobbDouglas::new(0.4)
        .model(ModelConfig::default())
        .expect("valid model");
    let initial = EgmOperator::new(&model)
        .apply(&Policy::closed_form(|y| y))
        .expect("egm update");

    let egm = EgmOperator::new(&model);
    c.bench_function("egm_apply", |b| {
        b.iter(|| egm.apply(black_box(&initial)).expect("egm update"))
    });

    let serial = TimeIterationOperator::with_options(
        &model,
        TimeIterationOptions::default().with_parallel(false),
    )
    .expect("valid options");
    c.bench_function("time_iteration_apply_serial", |b| {
        b.iter(|| serial.apply(black_box(&initial)).expect("time iteration update"))
    });

    let parallel = TimeIterationOperator::new(&model);
    c.bench_function("time_iteration_apply_parallel", |b| {
        b.iter(|| parallel.apply(black_box(&initial)).expect("time iteration update"))
    });
}

criterion_group!(benches, operator_application);
criterion_main!(benches);
