use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use mchain_ledger::{LedgerConfig, TokenLedger};
use mchain_types::{AccountId, TokenAmount};

fn account(n: u32) -> AccountId {
    let mut bytes = [0u8; 20];
    bytes[16..].copy_from_slice(&(n + 1).to_be_bytes());
    AccountId::new(bytes)
}

fn make_ledger() -> TokenLedger {
    TokenLedger::from_config(&LedgerConfig::with_custodian(account(0))).unwrap()
}

fn bench_transfer(c: &mut Criterion) {
    let ledger = make_ledger();
    let custodian = account(0);
    let recipient = account(1);

    c.bench_function("transfer", |b| {
        b.iter(|| {
            black_box(
                ledger
                    .transfer(&custodian, &recipient, black_box(TokenAmount::new(1)))
                    .unwrap(),
            )
        });
    });
}

fn bench_bulk_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_transfer");
    let custodian = account(0);

    for recipient_count in [1u32, 10, 100, 1000] {
        let ledger = make_ledger();
        let recipients: Vec<AccountId> = (1..=recipient_count).map(account).collect();
        let amounts = vec![TokenAmount::new(1); recipients.len()];

        group.bench_with_input(
            BenchmarkId::new("recipients", recipient_count),
            &recipient_count,
            |b, _| {
                b.iter(|| {
                    black_box(
                        ledger
                            .bulk_transfer(&custodian, black_box(&recipients), black_box(&amounts))
                            .unwrap(),
                    )
                });
            },
        );
    }

    group.finish();
}

fn bench_rejected_bulk_transfer(c: &mut Criterion) {
    let ledger = make_ledger();
    let custodian = account(0);
    let mut recipients: Vec<AccountId> = (1..=100).map(account).collect();
    recipients.push(AccountId::NULL);
    let amounts = vec![TokenAmount::new(1); recipients.len()];

    c.bench_function("bulk_transfer_rollback_100", |b| {
        b.iter(|| {
            black_box(
                ledger
                    .bulk_transfer(&custodian, black_box(&recipients), black_box(&amounts))
                    .is_err(),
            )
        });
    });
}

fn bench_audit(c: &mut Criterion) {
    let ledger = make_ledger();
    let custodian = account(0);
    let recipients: Vec<AccountId> = (1..=1000).map(account).collect();
    let amounts = vec![TokenAmount::new(1); recipients.len()];
    ledger.bulk_transfer(&custodian, &recipients, &amounts).unwrap();

    c.bench_function("audit_1000_accounts", |b| {
        b.iter(|| black_box(ledger.audit().unwrap()));
    });
}

criterion_group!(
    benches,
    bench_transfer,
    bench_bulk_transfer,
    bench_rejected_bulk_transfer,
    bench_audit,
);
criterion_main!(benches);
