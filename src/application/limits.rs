use crate::config::LimitsConfig;
use crate::domain::account::Amount;
use crate::domain::ledger::TransactionType;
use crate::domain::limits::DailyLimitRecord;
use crate::domain::ports::DailyLimitStoreBox;
use crate::error::{DailyLimitBreach, LedgerError, Result};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

/// Remaining allowance for one transaction type today.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyLimitStatus {
    pub tx_type: TransactionType,
    pub ceiling: Decimal,
    pub remaining: Decimal,
    pub remaining_count: u32,
}

/// Validates transactions against the fixed per-type ceilings and the rolling
/// per-account daily allowance.
///
/// The enforcer itself never persists consumption: `validate_daily_limit`
/// hands the (possibly freshly defaulted) record back to the caller, which
/// folds the consumption into the same atomic commit as the balance mutation.
pub struct LimitEnforcer {
    store: DailyLimitStoreBox,
    config: LimitsConfig,
}

impl LimitEnforcer {
    pub fn new(store: DailyLimitStoreBox, config: LimitsConfig) -> Self {
        Self { store, config }
    }

    /// Checks the single-transaction ceiling for the given type. Pure, no
    /// store access.
    pub fn validate_system_maximum(&self, tx_type: TransactionType, amount: Amount) -> Result<()> {
        let limit = match tx_type {
            TransactionType::Transfer => self.config.max_transfer,
            TransactionType::Deposit => self.config.max_deposit,
            TransactionType::Withdraw => self.config.max_withdraw,
        };
        if amount.value() > limit {
            return Err(LedgerError::MaximumLimitExceeded {
                tx_type,
                amount: amount.value(),
                limit,
            });
        }
        Ok(())
    }

    /// Checks today's remaining allowance and returns the record the caller
    /// must debit and commit on success. Safe to call repeatedly; nothing is
    /// written here.
    pub async fn validate_daily_limit(
        &self,
        account_number: &str,
        tx_type: TransactionType,
        amount: Amount,
    ) -> Result<DailyLimitRecord> {
        let record = self
            .load_or_default(account_number, tx_type, today())
            .await?;

        if !record.can_accommodate(amount) {
            let breach = if record.remaining_limit() < amount.value() {
                DailyLimitBreach::AmountExceeded {
                    tx_type,
                    remaining: record.remaining_limit(),
                    requested: amount.value(),
                }
            } else {
                DailyLimitBreach::CountExhausted {
                    tx_type,
                    max_count: record.max_transaction_count,
                }
            };
            return Err(LedgerError::DailyLimitExceeded(breach));
        }

        Ok(record)
    }

    /// Overrides today's ceiling (and optionally the count limit) for one
    /// account/type. The override is persisted as today's record and does not
    /// reach back to prior days.
    pub async fn update_daily_limit(
        &self,
        account_number: &str,
        tx_type: TransactionType,
        new_limit: Decimal,
        new_count_limit: Option<u32>,
    ) -> Result<DailyLimitRecord> {
        let mut record = self
            .load_or_default(account_number, tx_type, today())
            .await?;
        record.daily_limit = new_limit;
        if let Some(count) = new_count_limit {
            record.max_transaction_count = count;
        }
        self.store.save(record).await
    }

    /// Today's remaining allowance per transaction type. An absent record
    /// reports the untouched defaults without creating anything.
    pub async fn daily_limits(&self, account_number: &str) -> Result<Vec<DailyLimitStatus>> {
        let mut statuses = Vec::with_capacity(3);
        for tx_type in [
            TransactionType::Deposit,
            TransactionType::Withdraw,
            TransactionType::Transfer,
        ] {
            let record = self.load_or_default(account_number, tx_type, today()).await?;
            statuses.push(DailyLimitStatus {
                tx_type,
                ceiling: record.daily_limit,
                remaining: record.remaining_limit(),
                remaining_count: record.remaining_count(),
            });
        }
        Ok(statuses)
    }

    /// Default daily ceiling per type: deposits get twice the base, withdrawals
    /// half of it, transfers the base itself.
    pub fn default_ceiling(&self, tx_type: TransactionType) -> Decimal {
        match tx_type {
            TransactionType::Deposit => self.config.default_daily_limit * dec!(2),
            TransactionType::Withdraw => self.config.default_daily_limit * dec!(0.5),
            TransactionType::Transfer => self.config.default_daily_limit,
        }
    }

    async fn load_or_default(
        &self,
        account_number: &str,
        tx_type: TransactionType,
        date: NaiveDate,
    ) -> Result<DailyLimitRecord> {
        if let Some(record) = self
            .store
            .find_by_account_type_date(account_number, tx_type, date)
            .await?
        {
            return Ok(record);
        }
        debug!(account = account_number, %tx_type, %date, "starting fresh daily limit record");
        Ok(DailyLimitRecord::new(
            account_number,
            tx_type,
            date,
            self.default_ceiling(tx_type),
            self.config.default_daily_transaction_count,
        ))
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
