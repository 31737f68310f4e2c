use crate::domain::account::Account;
use crate::domain::ledger::{LedgerEntry, TransactionType};
use crate::domain::limits::DailyLimitRecord;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A zero-based page request for ledger queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Self {
        Self { page, size }
    }
}

/// One page of results plus the total match count.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total: usize,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_number(&self, account_number: &str) -> Result<Option<Account>>;
    async fn save(&self, account: Account) -> Result<Account>;
    async fn find_all(&self) -> Result<Vec<Account>>;
}

/// External ownership check; the engine never inspects user identity itself.
#[async_trait]
pub trait OwnershipValidator: Send + Sync {
    async fn validate_ownership(&self, account_number: &str, user_id: u64) -> Result<()>;
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Inserts a new entry; a reference that already exists is a
    /// `DuplicateReference` conflict, never an overwrite.
    async fn insert(&self, entry: LedgerEntry) -> Result<LedgerEntry>;
    /// Updates an existing entry in place, keyed by reference.
    async fn update(&self, entry: LedgerEntry) -> Result<LedgerEntry>;
    async fn find_by_ref(&self, reference: &str) -> Result<Option<LedgerEntry>>;
    /// All entries where the account appears as source or destination, in
    /// creation order.
    async fn find_by_account(&self, account_number: &str) -> Result<Vec<LedgerEntry>>;
    /// Same match set, newest first, sliced to the requested page.
    async fn find_by_account_paginated(
        &self,
        account_number: &str,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>>;
}

#[async_trait]
pub trait DailyLimitStore: Send + Sync {
    async fn find_by_account_type_date(
        &self,
        account_number: &str,
        tx_type: TransactionType,
        date: NaiveDate,
    ) -> Result<Option<DailyLimitRecord>>;
    async fn save(&self, record: DailyLimitRecord) -> Result<DailyLimitRecord>;
}

/// A signed balance delta for one account, applied inside a commit.
#[derive(Debug, Clone)]
pub struct BalanceChange {
    pub account_number: String,
    pub delta: Decimal,
}

/// Everything a successful transaction must commit as one unit: the balance
/// deltas, the finalized ledger entry, and the daily-limit consumption.
#[derive(Debug, Clone)]
pub struct TransactionCommit {
    /// One change for deposit/withdraw, two for transfer.
    pub changes: Vec<BalanceChange>,
    pub entry: LedgerEntry,
    pub limit_record: DailyLimitRecord,
}

/// Atomic commit boundary for a transaction outcome.
///
/// Implementations re-read each account under their own write guard and apply
/// the deltas there, refusing any change that would take a balance negative.
/// Two operations racing on one account therefore serialize their
/// read-modify-write instead of overwriting each other. Changes are applied
/// in canonical order (sorted by account number) so row-locking stores cannot
/// deadlock on opposing transfers, and the whole batch lands or none of it.
/// When a daily-limit record for the same key is already stored, the commit
/// folds the entry's consumption into it rather than overwriting.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn commit(&self, commit: TransactionCommit) -> Result<()>;
}

pub type AccountStoreBox = Box<dyn AccountStore>;
pub type OwnershipValidatorBox = Box<dyn OwnershipValidator>;
pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type DailyLimitStoreBox = Box<dyn DailyLimitStore>;
pub type UnitOfWorkBox = Box<dyn UnitOfWork>;
