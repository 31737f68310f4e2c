use crate::application::limits::{DailyLimitStatus, LimitEnforcer};
use crate::domain::account::{Account, Amount};
use crate::domain::ledger::{self, LedgerEntry, TransactionType};
use crate::domain::limits::DailyLimitRecord;
use crate::domain::ports::{
    AccountStoreBox, BalanceChange, LedgerStoreBox, OwnershipValidatorBox, Page, PageRequest,
    TransactionCommit, UnitOfWorkBox,
};
use crate::error::{AccountSide, LedgerError, Result};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

/// Orchestrates deposits, withdrawals and transfers against the ledger.
///
/// Every mutation follows the same shape: validate without side effects,
/// write a `Pending` ledger entry, then commit the balance deltas, the entry
/// finalization and the daily-limit consumption as one unit of work. The
/// deltas are applied against balances re-read under the store's commit
/// guard, so operations racing on one account serialize. A commit failure
/// leaves a `Failed` entry behind and surfaces the original error.
pub struct TransactionProcessor {
    accounts: AccountStoreBox,
    ledger: LedgerStoreBox,
    ownership: OwnershipValidatorBox,
    limits: LimitEnforcer,
    uow: UnitOfWorkBox,
}

impl TransactionProcessor {
    pub fn new(
        accounts: AccountStoreBox,
        ledger: LedgerStoreBox,
        ownership: OwnershipValidatorBox,
        limits: LimitEnforcer,
        uow: UnitOfWorkBox,
    ) -> Self {
        Self {
            accounts,
            ledger,
            ownership,
            limits,
            uow,
        }
    }

    pub async fn deposit(
        &self,
        account_number: &str,
        user_id: u64,
        amount: Decimal,
        description: &str,
        reference: Option<String>,
    ) -> Result<LedgerEntry> {
        let account = self
            .resolve_account(account_number, Some(AccountSide::Destination))
            .await?;
        self.ownership
            .validate_ownership(account_number, user_id)
            .await?;
        let amount = Amount::new(amount)?;
        ensure_active(&account)?;

        self.limits
            .validate_system_maximum(TransactionType::Deposit, amount)?;
        let mut limit_record = self
            .limits
            .validate_daily_limit(account_number, TransactionType::Deposit, amount)
            .await?;

        let reference = reference.unwrap_or_else(ledger::generate_reference);
        let entry = LedgerEntry::deposit(&reference, account_number, amount, description);
        let entry = self.ledger.insert(entry).await?;

        limit_record.record_transaction(amount);
        let change = BalanceChange {
            account_number: account.account_number,
            delta: amount.value(),
        };
        self.finalize(entry, vec![change], limit_record).await
    }

    pub async fn withdraw(
        &self,
        account_number: &str,
        user_id: u64,
        amount: Decimal,
        description: &str,
        reference: Option<String>,
    ) -> Result<LedgerEntry> {
        let account = self
            .resolve_account(account_number, Some(AccountSide::Source))
            .await?;
        self.ownership
            .validate_ownership(account_number, user_id)
            .await?;
        let amount = Amount::new(amount)?;
        ensure_active(&account)?;
        account.ensure_funds(amount)?;

        self.limits
            .validate_system_maximum(TransactionType::Withdraw, amount)?;
        let mut limit_record = self
            .limits
            .validate_daily_limit(account_number, TransactionType::Withdraw, amount)
            .await?;

        let reference = reference.unwrap_or_else(ledger::generate_reference);
        let entry = LedgerEntry::withdrawal(&reference, account_number, amount, description);
        let entry = self.ledger.insert(entry).await?;

        limit_record.record_transaction(amount);
        let change = BalanceChange {
            account_number: account.account_number,
            delta: -amount.value(),
        };
        self.finalize(entry, vec![change], limit_record).await
    }

    pub async fn transfer(
        &self,
        source_number: &str,
        destination_number: &str,
        user_id: u64,
        amount: Decimal,
        description: &str,
        reference: Option<String>,
    ) -> Result<LedgerEntry> {
        if source_number == destination_number {
            return Err(LedgerError::SelfTransfer(source_number.to_string()));
        }

        let source = self
            .resolve_account(source_number, Some(AccountSide::Source))
            .await?;
        let destination = self
            .resolve_account(destination_number, Some(AccountSide::Destination))
            .await?;

        // Ownership is only required on the paying side.
        self.ownership
            .validate_ownership(source_number, user_id)
            .await?;
        let amount = Amount::new(amount)?;
        ensure_active(&source)?;
        ensure_active(&destination)?;
        source.ensure_funds(amount)?;

        self.limits
            .validate_system_maximum(TransactionType::Transfer, amount)?;
        let mut limit_record = self
            .limits
            .validate_daily_limit(source_number, TransactionType::Transfer, amount)
            .await?;

        let reference = reference.unwrap_or_else(ledger::generate_reference);
        let entry = LedgerEntry::transfer(
            &reference,
            source_number,
            destination_number,
            amount,
            description,
        );
        let entry = self.ledger.insert(entry).await?;

        limit_record.record_transaction(amount);
        let changes = vec![
            BalanceChange {
                account_number: source.account_number,
                delta: -amount.value(),
            },
            BalanceChange {
                account_number: destination.account_number,
                delta: amount.value(),
            },
        ];
        self.finalize(entry, changes, limit_record).await
    }

    /// All ledger entries touching the account, in creation order.
    pub async fn get_transactions(
        &self,
        account_number: &str,
        user_id: u64,
    ) -> Result<Vec<LedgerEntry>> {
        self.ownership
            .validate_ownership(account_number, user_id)
            .await?;
        self.resolve_account(account_number, None).await?;
        self.ledger.find_by_account(account_number).await
    }

    /// One page of the account's entries, newest first.
    pub async fn get_transactions_paginated(
        &self,
        account_number: &str,
        user_id: u64,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>> {
        self.ownership
            .validate_ownership(account_number, user_id)
            .await?;
        self.resolve_account(account_number, None).await?;
        self.ledger
            .find_by_account_paginated(account_number, page)
            .await
    }

    /// Support-tooling lookup; deliberately carries no ownership check.
    pub async fn get_transaction_by_ref(&self, reference: &str) -> Result<LedgerEntry> {
        self.ledger
            .find_by_ref(reference)
            .await?
            .ok_or_else(|| LedgerError::EntryNotFound(reference.to_string()))
    }

    /// Today's remaining allowance per transaction type for the account.
    pub async fn daily_limits(
        &self,
        account_number: &str,
        user_id: u64,
    ) -> Result<Vec<DailyLimitStatus>> {
        self.ownership
            .validate_ownership(account_number, user_id)
            .await?;
        self.resolve_account(account_number, None).await?;
        self.limits.daily_limits(account_number).await
    }

    /// Overrides today's daily ceiling (and optionally count limit) for the
    /// account/type.
    pub async fn update_daily_limit(
        &self,
        account_number: &str,
        user_id: u64,
        tx_type: TransactionType,
        new_limit: Decimal,
        new_count_limit: Option<u32>,
    ) -> Result<DailyLimitRecord> {
        self.ownership
            .validate_ownership(account_number, user_id)
            .await?;
        self.resolve_account(account_number, None).await?;
        self.limits
            .update_daily_limit(account_number, tx_type, new_limit, new_count_limit)
            .await
    }

    async fn resolve_account(
        &self,
        account_number: &str,
        side: Option<AccountSide>,
    ) -> Result<Account> {
        self.accounts
            .find_by_number(account_number)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound {
                number: account_number.to_string(),
                side,
            })
    }

    /// Commits the finalized outcome atomically; on failure the entry is
    /// marked Failed in an independent write so the audit trail survives.
    async fn finalize(
        &self,
        mut entry: LedgerEntry,
        changes: Vec<BalanceChange>,
        limit_record: DailyLimitRecord,
    ) -> Result<LedgerEntry> {
        entry.complete();
        let commit = TransactionCommit {
            changes,
            entry: entry.clone(),
            limit_record,
        };
        match self.uow.commit(commit).await {
            Ok(()) => {
                info!(
                    reference = %entry.reference,
                    tx_type = %entry.tx_type,
                    amount = %entry.amount,
                    "transaction completed"
                );
                Ok(entry)
            }
            Err(err) => {
                warn!(
                    reference = %entry.reference,
                    tx_type = %entry.tx_type,
                    error = %err,
                    "transaction commit failed, marking entry failed"
                );
                entry.fail();
                if let Err(mark_err) = self.ledger.update(entry).await {
                    error!(
                        error = %mark_err,
                        "failed to persist failed status for ledger entry"
                    );
                }
                Err(err)
            }
        }
    }
}

fn ensure_active(account: &Account) -> Result<()> {
    if !account.is_active() {
        return Err(LedgerError::AccountSuspended(
            account.account_number.clone(),
        ));
    }
    Ok(())
}
