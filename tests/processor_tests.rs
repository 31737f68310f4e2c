use finledger::application::limits::LimitEnforcer;
use finledger::application::processor::TransactionProcessor;
use finledger::config::LimitsConfig;
use finledger::domain::account::Account;
use finledger::domain::ledger::{TransactionStatus, TransactionType};
use finledger::domain::ports::AccountStore;
use finledger::error::{DailyLimitBreach, LedgerError};
use finledger::infrastructure::in_memory::{InMemoryBackend, InMemoryOwnershipValidator};
use rust_decimal_macros::dec;

const OWNER: u64 = 1;

fn build(backend: InMemoryBackend, config: LimitsConfig) -> TransactionProcessor {
    let ownership = InMemoryOwnershipValidator::new([
        ("ACC1".to_string(), OWNER),
        ("ACC2".to_string(), OWNER),
    ]);
    TransactionProcessor::new(
        Box::new(backend.clone()),
        Box::new(backend.clone()),
        Box::new(ownership),
        LimitEnforcer::new(Box::new(backend.clone()), config),
        Box::new(backend),
    )
}

#[tokio::test]
async fn test_deposit_scenario() {
    let backend = InMemoryBackend::new();
    backend.seed_account(Account::new("ACC1", dec!(0))).await;
    let processor = build(backend.clone(), LimitsConfig::default());

    let entry = processor
        .deposit("ACC1", OWNER, dec!(100), "first deposit", None)
        .await
        .unwrap();

    assert_eq!(entry.status, TransactionStatus::Completed);
    let account = backend.find_by_number("ACC1").await.unwrap().unwrap();
    assert_eq!(account.balance, dec!(100));

    let history = processor.get_transactions("ACC1", OWNER).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].reference, entry.reference);
}

#[tokio::test]
async fn test_overdraw_scenario_leaves_no_entry() {
    let backend = InMemoryBackend::new();
    backend
        .seed_account(Account::new("ACC1", dec!(100)))
        .await;
    let processor = build(backend.clone(), LimitsConfig::default());

    let result = processor.withdraw("ACC1", OWNER, dec!(150), "", None).await;
    assert!(matches!(
        result,
        Err(LedgerError::InsufficientBalance { .. })
    ));

    let account = backend.find_by_number("ACC1").await.unwrap().unwrap();
    assert_eq!(account.balance, dec!(100));
    assert!(
        processor
            .get_transactions("ACC1", OWNER)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_transfer_scenario() {
    let backend = InMemoryBackend::new();
    backend
        .seed_account(Account::new("ACC1", dec!(100)))
        .await;
    backend.seed_account(Account::new("ACC2", dec!(20))).await;
    let processor = build(backend.clone(), LimitsConfig::default());

    let entry = processor
        .transfer("ACC1", "ACC2", OWNER, dec!(50), "split bill", None)
        .await
        .unwrap();

    assert_eq!(entry.tx_type, TransactionType::Transfer);
    assert_eq!(entry.status, TransactionStatus::Completed);
    assert_eq!(entry.source_account.as_deref(), Some("ACC1"));
    assert_eq!(entry.destination_account.as_deref(), Some("ACC2"));

    let acc1 = backend.find_by_number("ACC1").await.unwrap().unwrap();
    let acc2 = backend.find_by_number("ACC2").await.unwrap().unwrap();
    assert_eq!(acc1.balance, dec!(50));
    assert_eq!(acc2.balance, dec!(70));

    // The same transfer appears in both accounts' histories.
    let acc2_history = processor.get_transactions("ACC2", OWNER).await.unwrap();
    assert_eq!(acc2_history.len(), 1);
    assert_eq!(acc2_history[0].reference, entry.reference);
}

#[tokio::test]
async fn test_system_maximum_scenario() {
    let backend = InMemoryBackend::new();
    backend.seed_account(Account::new("ACC1", dec!(0))).await;
    let processor = build(backend, LimitsConfig::default());

    let result = processor
        .deposit("ACC1", OWNER, dec!(500001), "", None)
        .await;
    assert!(matches!(
        result,
        Err(LedgerError::MaximumLimitExceeded { .. })
    ));
    assert!(
        processor
            .get_transactions("ACC1", OWNER)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_daily_limit_sequence() {
    let backend = InMemoryBackend::new();
    backend.seed_account(Account::new("ACC1", dec!(0))).await;
    // Small limits so the test doesn't depend on the deploy defaults.
    let config = LimitsConfig {
        default_daily_limit: dec!(100.0),
        ..LimitsConfig::default()
    };
    let processor = build(backend, config);

    // Deposit daily ceiling is 2x base = 200.
    processor
        .deposit("ACC1", OWNER, dec!(120.0), "", None)
        .await
        .unwrap();
    processor
        .deposit("ACC1", OWNER, dec!(80.0), "", None)
        .await
        .unwrap();

    let statuses = processor.daily_limits("ACC1", OWNER).await.unwrap();
    let deposit = statuses
        .iter()
        .find(|s| s.tx_type == TransactionType::Deposit)
        .unwrap();
    assert_eq!(deposit.remaining, dec!(0.0));

    let result = processor.deposit("ACC1", OWNER, dec!(0.01), "", None).await;
    assert!(matches!(
        result,
        Err(LedgerError::DailyLimitExceeded(
            DailyLimitBreach::AmountExceeded { .. }
        ))
    ));

    // Only the two accepted deposits are on the ledger.
    let history = processor.get_transactions("ACC1", OWNER).await.unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_count_limit_sequence() {
    let backend = InMemoryBackend::new();
    backend.seed_account(Account::new("ACC1", dec!(0))).await;
    let processor = build(backend, LimitsConfig::default());

    // Tighten today's deposit count to 2, leaving the amount ceiling alone.
    processor
        .update_daily_limit(
            "ACC1",
            OWNER,
            TransactionType::Deposit,
            dec!(100000.0),
            Some(2),
        )
        .await
        .unwrap();

    processor
        .deposit("ACC1", OWNER, dec!(1.0), "", None)
        .await
        .unwrap();
    processor
        .deposit("ACC1", OWNER, dec!(1.0), "", None)
        .await
        .unwrap();
    let result = processor.deposit("ACC1", OWNER, dec!(1.0), "", None).await;
    assert!(matches!(
        result,
        Err(LedgerError::DailyLimitExceeded(
            DailyLimitBreach::CountExhausted { .. }
        ))
    ));
}

#[tokio::test]
async fn test_limits_are_per_account_and_type() {
    let backend = InMemoryBackend::new();
    backend
        .seed_account(Account::new("ACC1", dec!(1000.0)))
        .await;
    backend.seed_account(Account::new("ACC2", dec!(0))).await;
    let config = LimitsConfig {
        default_daily_limit: dec!(100.0),
        ..LimitsConfig::default()
    };
    let processor = build(backend, config);

    // Exhaust ACC1's withdraw allowance (0.5x base = 50).
    processor
        .withdraw("ACC1", OWNER, dec!(50.0), "", None)
        .await
        .unwrap();
    let blocked = processor.withdraw("ACC1", OWNER, dec!(1.0), "", None).await;
    assert!(matches!(blocked, Err(LedgerError::DailyLimitExceeded(_))));

    // Deposits on the same account and any movement on ACC2 are unaffected.
    processor
        .deposit("ACC1", OWNER, dec!(10.0), "", None)
        .await
        .unwrap();
    processor
        .deposit("ACC2", OWNER, dec!(10.0), "", None)
        .await
        .unwrap();
}
