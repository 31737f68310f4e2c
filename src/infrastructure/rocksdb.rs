use crate::domain::account::Account;
use crate::domain::ledger::{LedgerEntry, TransactionType};
use crate::domain::limits::DailyLimitRecord;
use crate::domain::ports::{
    AccountStore, DailyLimitStore, LedgerStore, Page, PageRequest, TransactionCommit, UnitOfWork,
};
use crate::error::{LedgerError, Result};
use crate::infrastructure::apply_changes;
use async_trait::async_trait;
use chrono::NaiveDate;
use rocksdb::{ColumnFamilyDescriptor, DB, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column family for account balances.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column family for ledger entries, keyed by reference.
pub const CF_ENTRIES: &str = "ledger_entries";
/// Column family for daily limit records.
pub const CF_DAILY_LIMITS: &str = "daily_limits";

/// Persistent backend using RocksDB, one column family per entity.
///
/// The unit of work commits through a `WriteBatch`, so a transaction outcome
/// (balances, finalized entry, limit consumption) lands atomically on disk.
/// A shared mutex serializes commits: balance deltas are applied against
/// reads taken under that guard, so racing operations cannot lose updates.
/// `Clone` shares the underlying `Arc<DB>` and the guard.
#[derive(Clone)]
pub struct RocksDbBackend {
    db: Arc<DB>,
    commit_guard: Arc<Mutex<()>>,
}

impl RocksDbBackend {
    /// Opens or creates the database, ensuring all column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = vec![
            ColumnFamilyDescriptor::new(CF_ACCOUNTS, Options::default()),
            ColumnFamilyDescriptor::new(CF_ENTRIES, Options::default()),
            ColumnFamilyDescriptor::new(CF_DAILY_LIMITS, Options::default()),
        ];
        let db = DB::open_cf_descriptors(&opts, path, cfs)?;
        Ok(Self {
            db: Arc::new(db),
            commit_guard: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            LedgerError::internal(std::io::Error::other(format!(
                "column family {name} not found"
            )))
        })
    }

    fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(LedgerError::internal)
    }

    fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(LedgerError::internal)
    }

    fn limit_key(account_number: &str, tx_type: TransactionType, date: NaiveDate) -> Vec<u8> {
        format!("{account_number}|{tx_type}|{date}").into_bytes()
    }

    fn entries_matching(&self, account_number: &str) -> Result<Vec<LedgerEntry>> {
        let cf = self.cf(CF_ENTRIES)?;
        let mut entries = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            let entry: LedgerEntry = Self::decode(&value)?;
            if entry.involves(account_number) {
                entries.push(entry);
            }
        }
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(entries)
    }
}

#[async_trait]
impl AccountStore for RocksDbBackend {
    async fn find_by_number(&self, account_number: &str) -> Result<Option<Account>> {
        let cf = self.cf(CF_ACCOUNTS)?;
        match self.db.get_cf(cf, account_number.as_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, account: Account) -> Result<Account> {
        let cf = self.cf(CF_ACCOUNTS)?;
        let value = Self::encode(&account)?;
        self.db.put_cf(cf, account.account_number.as_bytes(), value)?;
        Ok(account)
    }

    async fn find_all(&self) -> Result<Vec<Account>> {
        let cf = self.cf(CF_ACCOUNTS)?;
        let mut accounts = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            accounts.push(Self::decode(&value)?);
        }
        // Keys are account numbers, so iteration order is already sorted.
        Ok(accounts)
    }
}

#[async_trait]
impl LedgerStore for RocksDbBackend {
    async fn insert(&self, entry: LedgerEntry) -> Result<LedgerEntry> {
        let cf = self.cf(CF_ENTRIES)?;
        if self
            .db
            .get_pinned_cf(cf, entry.reference.as_bytes())?
            .is_some()
        {
            return Err(LedgerError::DuplicateReference(entry.reference));
        }
        let value = Self::encode(&entry)?;
        self.db.put_cf(cf, entry.reference.as_bytes(), value)?;
        Ok(entry)
    }

    async fn update(&self, entry: LedgerEntry) -> Result<LedgerEntry> {
        let cf = self.cf(CF_ENTRIES)?;
        if self
            .db
            .get_pinned_cf(cf, entry.reference.as_bytes())?
            .is_none()
        {
            return Err(LedgerError::EntryNotFound(entry.reference));
        }
        let value = Self::encode(&entry)?;
        self.db.put_cf(cf, entry.reference.as_bytes(), value)?;
        Ok(entry)
    }

    async fn find_by_ref(&self, reference: &str) -> Result<Option<LedgerEntry>> {
        let cf = self.cf(CF_ENTRIES)?;
        match self.db.get_cf(cf, reference.as_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn find_by_account(&self, account_number: &str) -> Result<Vec<LedgerEntry>> {
        self.entries_matching(account_number)
    }

    async fn find_by_account_paginated(
        &self,
        account_number: &str,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>> {
        let mut matched = self.entries_matching(account_number)?;
        matched.reverse();
        let total = matched.len();
        let items = matched
            .into_iter()
            .skip(page.page.saturating_mul(page.size))
            .take(page.size)
            .collect();
        Ok(Page {
            items,
            page: page.page,
            size: page.size,
            total,
        })
    }
}

#[async_trait]
impl DailyLimitStore for RocksDbBackend {
    async fn find_by_account_type_date(
        &self,
        account_number: &str,
        tx_type: TransactionType,
        date: NaiveDate,
    ) -> Result<Option<DailyLimitRecord>> {
        let cf = self.cf(CF_DAILY_LIMITS)?;
        let key = Self::limit_key(account_number, tx_type, date);
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, record: DailyLimitRecord) -> Result<DailyLimitRecord> {
        let cf = self.cf(CF_DAILY_LIMITS)?;
        let key = Self::limit_key(&record.account_number, record.tx_type, record.date);
        let value = Self::encode(&record)?;
        self.db.put_cf(cf, key, value)?;
        Ok(record)
    }
}

#[async_trait]
impl UnitOfWork for RocksDbBackend {
    async fn commit(&self, commit: TransactionCommit) -> Result<()> {
        // One commit at a time: the balances read below must still be
        // current when the batch lands.
        let _guard = self.commit_guard.lock().await;

        let accounts_cf = self.cf(CF_ACCOUNTS)?;
        let entries_cf = self.cf(CF_ENTRIES)?;
        let limits_cf = self.cf(CF_DAILY_LIMITS)?;

        // The Pending entry must already be on disk; a commit never creates
        // ledger rows out of thin air.
        if self
            .db
            .get_pinned_cf(entries_cf, commit.entry.reference.as_bytes())?
            .is_none()
        {
            return Err(LedgerError::EntryNotFound(commit.entry.reference));
        }

        let mut changes = commit.changes;
        changes.sort_by(|a, b| a.account_number.cmp(&b.account_number));

        let touched = apply_changes(&changes, |number| {
            match self.db.get_cf(accounts_cf, number.as_bytes())? {
                Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
                None => Ok(None),
            }
        })?;

        let mut record = commit.limit_record;
        let key = Self::limit_key(&record.account_number, record.tx_type, record.date);
        if let Some(bytes) = self.db.get_cf(limits_cf, &key)? {
            record = Self::decode(&bytes)?;
            record.used_amount += commit.entry.amount;
            record.transaction_count += 1;
        }

        let mut batch = WriteBatch::default();
        for account in &touched {
            batch.put_cf(
                accounts_cf,
                account.account_number.as_bytes(),
                Self::encode(account)?,
            );
        }
        batch.put_cf(
            entries_cf,
            commit.entry.reference.as_bytes(),
            Self::encode(&commit.entry)?,
        );
        batch.put_cf(limits_cf, key, Self::encode(&record)?);

        self.db.write(batch)?;
        Ok(())
    }
}
