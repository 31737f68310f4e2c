#![cfg(feature = "storage-rocksdb")]

use finledger::application::limits::LimitEnforcer;
use finledger::application::processor::TransactionProcessor;
use finledger::config::LimitsConfig;
use finledger::domain::account::Account;
use finledger::domain::ledger::TransactionStatus;
use finledger::domain::ports::AccountStore;
use finledger::infrastructure::in_memory::InMemoryOwnershipValidator;
use finledger::infrastructure::rocksdb::RocksDbBackend;
use rust_decimal_macros::dec;
use tempfile::tempdir;

const OWNER: u64 = 1;

fn build(backend: RocksDbBackend) -> TransactionProcessor {
    let ownership = InMemoryOwnershipValidator::new([
        ("ACC1".to_string(), OWNER),
        ("ACC2".to_string(), OWNER),
    ]);
    TransactionProcessor::new(
        Box::new(backend.clone()),
        Box::new(backend.clone()),
        Box::new(ownership),
        LimitEnforcer::new(Box::new(backend.clone()), LimitsConfig::default()),
        Box::new(backend),
    )
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let dir = tempdir().unwrap();

    {
        let backend = RocksDbBackend::open(dir.path()).unwrap();
        backend
            .save(Account::new("ACC1", dec!(100.0)))
            .await
            .unwrap();
        backend.save(Account::new("ACC2", dec!(0.0))).await.unwrap();
        let processor = build(backend);
        processor
            .transfer("ACC1", "ACC2", OWNER, dec!(40.0), "", Some("TXN-PERSIST".into()))
            .await
            .unwrap();
    }

    // Fresh handle on the same directory sees the committed outcome.
    let backend = RocksDbBackend::open(dir.path()).unwrap();
    let acc1 = backend.find_by_number("ACC1").await.unwrap().unwrap();
    let acc2 = backend.find_by_number("ACC2").await.unwrap().unwrap();
    assert_eq!(acc1.balance, dec!(60.0));
    assert_eq!(acc2.balance, dec!(40.0));

    let processor = build(backend);
    let entry = processor.get_transaction_by_ref("TXN-PERSIST").await.unwrap();
    assert_eq!(entry.status, TransactionStatus::Completed);
}

#[tokio::test]
async fn test_history_order_after_reopen() {
    let dir = tempdir().unwrap();

    {
        let backend = RocksDbBackend::open(dir.path()).unwrap();
        backend
            .save(Account::new("ACC1", dec!(0.0)))
            .await
            .unwrap();
        let processor = build(backend);
        for i in 1..=3 {
            processor
                .deposit("ACC1", OWNER, dec!(1.0), "", Some(format!("REF-{i}")))
                .await
                .unwrap();
        }
    }

    let backend = RocksDbBackend::open(dir.path()).unwrap();
    let processor = build(backend);
    let page = processor
        .get_transactions_paginated(
            "ACC1",
            OWNER,
            finledger::domain::ports::PageRequest::new(0, 10),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items[0].reference, "REF-3");
    assert_eq!(page.items[2].reference, "REF-1");
}
