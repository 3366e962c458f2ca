use criterion::{black_box, criterion_group, criterion_main, Criterion};
use split_settle::core::confirmation::ConfirmationLog;
use split_settle::engine::SettlementEngine;
use split_settle::simulation::random_ledger::{generate_random_ledger, LedgerConfig};

fn bench_settle_10_participants(c: &mut Criterion) {
    let config = LedgerConfig {
        participant_count: 10,
        avg_expenses_per_participant: 5,
        ..Default::default()
    };
    let (roster, ledger) = generate_random_ledger(&config);
    let confirmations = ConfirmationLog::new();

    c.bench_function("settle_10_participants", |b| {
        b.iter(|| {
            SettlementEngine::settle(black_box(&ledger), black_box(&roster), &confirmations)
        })
    });
}

fn bench_settle_100_participants(c: &mut Criterion) {
    let config = LedgerConfig {
        participant_count: 100,
        avg_expenses_per_participant: 10,
        ..Default::default()
    };
    let (roster, ledger) = generate_random_ledger(&config);
    let confirmations = ConfirmationLog::new();

    c.bench_function("settle_100_participants", |b| {
        b.iter(|| {
            SettlementEngine::settle(black_box(&ledger), black_box(&roster), &confirmations)
        })
    });
}

fn bench_settle_1000_participants(c: &mut Criterion) {
    let config = LedgerConfig {
        participant_count: 1000,
        avg_expenses_per_participant: 10,
        ..Default::default()
    };
    let (roster, ledger) = generate_random_ledger(&config);
    let confirmations = ConfirmationLog::new();

    c.bench_function("settle_1000_participants", |b| {
        b.iter(|| {
            SettlementEngine::settle(black_box(&ledger), black_box(&roster), &confirmations)
        })
    });
}

criterion_group!(
    benches,
    bench_settle_10_participants,
    bench_settle_100_participants,
    bench_settle_1000_participants
);
criterion_main!(benches);
