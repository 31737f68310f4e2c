use crate::domain::account::Amount;
use crate::domain::ledger::TransactionType;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Daily consumption counter for one (account, transaction type, date).
///
/// Created lazily on the first transaction of the day, never deleted; a new
/// calendar date simply starts a fresh record. Only the limit enforcement
/// path mutates it, and only inside the same commit as the balance change it
/// accounts for.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct DailyLimitRecord {
    pub account_number: String,
    pub tx_type: TransactionType,
    pub date: NaiveDate,
    pub daily_limit: Decimal,
    pub used_amount: Decimal,
    pub transaction_count: u32,
    pub max_transaction_count: u32,
}

impl DailyLimitRecord {
    pub fn new(
        account_number: impl Into<String>,
        tx_type: TransactionType,
        date: NaiveDate,
        daily_limit: Decimal,
        max_transaction_count: u32,
    ) -> Self {
        Self {
            account_number: account_number.into(),
            tx_type,
            date,
            daily_limit,
            used_amount: Decimal::ZERO,
            transaction_count: 0,
            max_transaction_count,
        }
    }

    pub fn remaining_limit(&self) -> Decimal {
        self.daily_limit - self.used_amount
    }

    pub fn remaining_count(&self) -> u32 {
        self.max_transaction_count
            .saturating_sub(self.transaction_count)
    }

    pub fn can_accommodate(&self, amount: Amount) -> bool {
        self.remaining_limit() >= amount.value() && self.remaining_count() > 0
    }

    /// Debits this record for one accepted transaction.
    pub fn record_transaction(&mut self, amount: Amount) {
        self.used_amount += amount.value();
        self.transaction_count += 1;
    }
}
