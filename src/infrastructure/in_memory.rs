use crate::domain::account::Account;
use crate::domain::ledger::{LedgerEntry, TransactionType};
use crate::domain::limits::DailyLimitRecord;
use crate::domain::ports::{
    AccountStore, DailyLimitStore, LedgerStore, OwnershipValidator, Page, PageRequest,
    TransactionCommit, UnitOfWork,
};
use crate::error::{LedgerError, Result};
use crate::infrastructure::apply_changes;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type LimitKey = (String, TransactionType, NaiveDate);

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    // Insertion order doubles as creation order for history queries.
    entries: Vec<LedgerEntry>,
    limits: HashMap<LimitKey, DailyLimitRecord>,
}

/// In-memory backend implementing every store port plus the unit of work.
///
/// A single `RwLock` guards all three entity maps, so a `commit` is trivially
/// atomic: one write lock, all mutations applied, no observer sees a partial
/// outcome. `Clone` shares the underlying state.
#[derive(Default, Clone)]
pub struct InMemoryBackend {
    state: Arc<RwLock<State>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an account directly, bypassing the processor.
    /// Account provisioning is outside the engine; tests and the CLI use this
    /// to stand in for it.
    pub async fn seed_account(&self, account: Account) {
        let mut state = self.state.write().await;
        state
            .accounts
            .insert(account.account_number.clone(), account);
    }
}

#[async_trait]
impl AccountStore for InMemoryBackend {
    async fn find_by_number(&self, account_number: &str) -> Result<Option<Account>> {
        let state = self.state.read().await;
        Ok(state.accounts.get(account_number).cloned())
    }

    async fn save(&self, account: Account) -> Result<Account> {
        let mut state = self.state.write().await;
        state
            .accounts
            .insert(account.account_number.clone(), account.clone());
        Ok(account)
    }

    async fn find_all(&self) -> Result<Vec<Account>> {
        let state = self.state.read().await;
        let mut accounts: Vec<Account> = state.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.account_number.cmp(&b.account_number));
        Ok(accounts)
    }
}

#[async_trait]
impl LedgerStore for InMemoryBackend {
    async fn insert(&self, entry: LedgerEntry) -> Result<LedgerEntry> {
        let mut state = self.state.write().await;
        if state.entries.iter().any(|e| e.reference == entry.reference) {
            return Err(LedgerError::DuplicateReference(entry.reference));
        }
        state.entries.push(entry.clone());
        Ok(entry)
    }

    async fn update(&self, entry: LedgerEntry) -> Result<LedgerEntry> {
        let mut state = self.state.write().await;
        let slot = state
            .entries
            .iter_mut()
            .find(|e| e.reference == entry.reference)
            .ok_or_else(|| LedgerError::EntryNotFound(entry.reference.clone()))?;
        *slot = entry.clone();
        Ok(entry)
    }

    async fn find_by_ref(&self, reference: &str) -> Result<Option<LedgerEntry>> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .iter()
            .find(|e| e.reference == reference)
            .cloned())
    }

    async fn find_by_account(&self, account_number: &str) -> Result<Vec<LedgerEntry>> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .iter()
            .filter(|e| e.involves(account_number))
            .cloned()
            .collect())
    }

    async fn find_by_account_paginated(
        &self,
        account_number: &str,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>> {
        let state = self.state.read().await;
        let matched: Vec<LedgerEntry> = state
            .entries
            .iter()
            .rev()
            .filter(|e| e.involves(account_number))
            .cloned()
            .collect();
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
impl DailyLimitStore for InMemoryBackend {
    async fn find_by_account_type_date(
        &self,
        account_number: &str,
        tx_type: TransactionType,
        date: NaiveDate,
    ) -> Result<Option<DailyLimitRecord>> {
        let state = self.state.read().await;
        let key = (account_number.to_string(), tx_type, date);
        Ok(state.limits.get(&key).cloned())
    }

    async fn save(&self, record: DailyLimitRecord) -> Result<DailyLimitRecord> {
        let mut state = self.state.write().await;
        let key = (record.account_number.clone(), record.tx_type, record.date);
        state.limits.insert(key, record.clone());
        Ok(record)
    }
}

#[async_trait]
impl UnitOfWork for InMemoryBackend {
    async fn commit(&self, commit: TransactionCommit) -> Result<()> {
        let mut state = self.state.write().await;

        // Canonical ordering of balance writes; a row-locking store must do
        // the same to stay deadlock-free on opposing transfers.
        let mut changes = commit.changes;
        changes.sort_by(|a, b| a.account_number.cmp(&b.account_number));

        // Balances are re-read and the deltas applied under the write lock,
        // so racing operations on one account serialize instead of
        // overwriting each other's result. Nothing is written until every
        // change has been validated against the current balance.
        let mut touched = apply_changes(&changes, |number| {
            Ok(state.accounts.get(number).cloned())
        })?;

        let slot = state
            .entries
            .iter_mut()
            .find(|e| e.reference == commit.entry.reference)
            .ok_or_else(|| LedgerError::EntryNotFound(commit.entry.reference.clone()))?;
        *slot = commit.entry.clone();

        for account in touched.drain(..) {
            state
                .accounts
                .insert(account.account_number.clone(), account);
        }

        let mut record = commit.limit_record;
        let key = (record.account_number.clone(), record.tx_type, record.date);
        if let Some(existing) = state.limits.get(&key) {
            record = existing.clone();
            record.used_amount += commit.entry.amount;
            record.transaction_count += 1;
        }
        state.limits.insert(key, record);

        Ok(())
    }
}

/// Ownership lookup backed by a static account-to-owner map.
///
/// Stands in for the identity service the engine treats as an external
/// collaborator. An account with no recorded owner is treated as not owned by
/// anyone.
#[derive(Default, Clone)]
pub struct InMemoryOwnershipValidator {
    owners: HashMap<String, u64>,
}

impl InMemoryOwnershipValidator {
    pub fn new(owners: impl IntoIterator<Item = (String, u64)>) -> Self {
        Self {
            owners: owners.into_iter().collect(),
        }
    }
}

#[async_trait]
impl OwnershipValidator for InMemoryOwnershipValidator {
    async fn validate_ownership(&self, account_number: &str, user_id: u64) -> Result<()> {
        match self.owners.get(account_number) {
            Some(owner) if *owner == user_id => Ok(()),
            _ => Err(LedgerError::Unauthorized {
                number: account_number.to_string(),
                user_id,
            }),
        }
    }
}
