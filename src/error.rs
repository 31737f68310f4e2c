use crate::domain::ledger::TransactionType;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Which end of a money movement an account sits on.
///
/// Deposits only have a destination, withdrawals only a source, transfers
/// have both. Carried inside `AccountNotFound` so transfer callers can tell
/// which of the two account numbers was unknown; read-only lookups carry no
/// side at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountSide {
    Source,
    Destination,
}

impl fmt::Display for AccountSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountSide::Source => write!(f, "source"),
            AccountSide::Destination => write!(f, "destination"),
        }
    }
}

/// The two ways a daily allowance can run out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DailyLimitBreach {
    AmountExceeded {
        tx_type: TransactionType,
        remaining: Decimal,
        requested: Decimal,
    },
    CountExhausted {
        tx_type: TransactionType,
        max_count: u32,
    },
}

impl fmt::Display for DailyLimitBreach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DailyLimitBreach::AmountExceeded {
                tx_type,
                remaining,
                requested,
            } => write!(
                f,
                "transaction amount {requested} exceeds daily remaining limit of {remaining} for {tx_type} transactions"
            ),
            DailyLimitBreach::CountExhausted { tx_type, max_count } => write!(
                f,
                "daily transaction count limit exceeded, maximum {max_count} {tx_type} transactions allowed per day"
            ),
        }
    }
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("transaction amount must be positive, got {0}")]
    InvalidTransactionAmount(Decimal),
    #[error("{}account {number} not found", side_prefix(.side))]
    AccountNotFound {
        number: String,
        side: Option<AccountSide>,
    },
    #[error("cannot transfer from account {0} to itself")]
    SelfTransfer(String),
    #[error("user {user_id} does not own account {number}")]
    Unauthorized { number: String, user_id: u64 },
    #[error("account {0} is suspended and cannot perform transactions")]
    AccountSuspended(String),
    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        available: Decimal,
        requested: Decimal,
    },
    #[error("{tx_type} amount {amount} exceeds maximum allowed limit of {limit}")]
    MaximumLimitExceeded {
        tx_type: TransactionType,
        amount: Decimal,
        limit: Decimal,
    },
    #[error("daily limit exceeded: {0}")]
    DailyLimitExceeded(DailyLimitBreach),
    #[error("transaction reference {0} already exists")]
    DuplicateReference(String),
    #[error("transaction with reference {0} not found")]
    EntryNotFound(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("storage error: {0}")]
    RocksDb(#[from] rocksdb::Error),
    #[error("internal error: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

fn side_prefix(side: &Option<AccountSide>) -> String {
    match side {
        Some(side) => format!("{side} "),
        None => String::new(),
    }
}

impl LedgerError {
    pub fn internal<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        LedgerError::Internal(Box::new(err))
    }
}
