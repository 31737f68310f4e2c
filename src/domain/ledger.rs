use crate::domain::account::Amount;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const REFERENCE_PREFIX: &str = "TXN-";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdraw,
    Transfer,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Deposit => write!(f, "deposit"),
            TransactionType::Withdraw => write!(f, "withdraw"),
            TransactionType::Transfer => write!(f, "transfer"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

/// One attempted money movement, immutable once finalized.
///
/// Created `Pending` before any balance is touched, then moved exactly once
/// to `Completed` or `Failed`. Deposit carries a destination only, Withdraw a
/// source only, Transfer both.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LedgerEntry {
    pub reference: String,
    pub source_account: Option<String>,
    pub destination_account: Option<String>,
    pub tx_type: TransactionType,
    pub amount: Decimal,
    pub description: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn deposit(
        reference: impl Into<String>,
        account_number: impl Into<String>,
        amount: Amount,
        description: impl Into<String>,
    ) -> Self {
        Self::pending(
            reference,
            None,
            Some(account_number.into()),
            TransactionType::Deposit,
            amount,
            description,
        )
    }

    pub fn withdrawal(
        reference: impl Into<String>,
        account_number: impl Into<String>,
        amount: Amount,
        description: impl Into<String>,
    ) -> Self {
        Self::pending(
            reference,
            Some(account_number.into()),
            None,
            TransactionType::Withdraw,
            amount,
            description,
        )
    }

    pub fn transfer(
        reference: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
        amount: Amount,
        description: impl Into<String>,
    ) -> Self {
        Self::pending(
            reference,
            Some(source.into()),
            Some(destination.into()),
            TransactionType::Transfer,
            amount,
            description,
        )
    }

    fn pending(
        reference: impl Into<String>,
        source_account: Option<String>,
        destination_account: Option<String>,
        tx_type: TransactionType,
        amount: Amount,
        description: impl Into<String>,
    ) -> Self {
        Self {
            reference: reference.into(),
            source_account,
            destination_account,
            tx_type,
            amount: amount.value(),
            description: description.into(),
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn complete(&mut self) {
        self.status = TransactionStatus::Completed;
    }

    pub fn fail(&mut self) {
        self.status = TransactionStatus::Failed;
    }

    /// Whether the given account appears on either side of this entry.
    pub fn involves(&self, account_number: &str) -> bool {
        self.source_account.as_deref() == Some(account_number)
            || self.destination_account.as_deref() == Some(account_number)
    }
}

/// Generates a transaction reference: `TXN-` followed by the first 8 hex
/// characters of a random UUID, uppercased, then the last 6 digits of the
/// current millisecond timestamp.
///
/// Uniqueness is probabilistic; the ledger store still enforces it with a
/// conflict error on insert.
pub fn generate_reference() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    let millis = Utc::now().timestamp_millis();
    format!(
        "{}{}-{:06}",
        REFERENCE_PREFIX,
        uuid[..8].to_uppercase(),
        millis.rem_euclid(1_000_000)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn amount(value: Decimal) -> Amount {
        Amount::new(value).unwrap()
    }

    #[test]
    fn test_deposit_entry_sides() {
        let entry = LedgerEntry::deposit("TXN-X", "ACC1", amount(dec!(10.0)), "top up");
        assert_eq!(entry.source_account, None);
        assert_eq!(entry.destination_account.as_deref(), Some("ACC1"));
        assert_eq!(entry.status, TransactionStatus::Pending);
    }

    #[test]
    fn test_withdrawal_entry_sides() {
        let entry = LedgerEntry::withdrawal("TXN-X", "ACC1", amount(dec!(10.0)), "");
        assert_eq!(entry.source_account.as_deref(), Some("ACC1"));
        assert_eq!(entry.destination_account, None);
    }

    #[test]
    fn test_transfer_entry_sides() {
        let entry = LedgerEntry::transfer("TXN-X", "ACC1", "ACC2", amount(dec!(10.0)), "");
        assert_eq!(entry.source_account.as_deref(), Some("ACC1"));
        assert_eq!(entry.destination_account.as_deref(), Some("ACC2"));
        assert!(entry.involves("ACC1"));
        assert!(entry.involves("ACC2"));
        assert!(!entry.involves("ACC3"));
    }

    #[test]
    fn test_reference_format() {
        let reference = generate_reference();
        assert!(reference.starts_with(REFERENCE_PREFIX));
        // TXN- + 8 hex + - + 6 digits
        assert_eq!(reference.len(), REFERENCE_PREFIX.len() + 8 + 1 + 6);
        let hex = &reference[4..12];
        assert!(
            hex.chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase())
        );
        assert_eq!(&reference[12..13], "-");
        let digits = &reference[13..];
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_references_distinct() {
        // Weak guarantee: distinct random draws should not collide.
        let a = generate_reference();
        let b = generate_reference();
        assert_ne!(a, b);
    }
}
