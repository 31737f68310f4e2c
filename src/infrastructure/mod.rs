pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;

use crate::domain::account::Account;
use crate::domain::ports::BalanceChange;
use crate::error::{LedgerError, Result};

/// Applies each delta to the account loaded through `load`, reusing the
/// already-mutated copy when a later change hits the same account. Callers
/// invoke this under their commit guard so the loaded balances are current.
pub(crate) fn apply_changes(
    changes: &[BalanceChange],
    load: impl Fn(&str) -> Result<Option<Account>>,
) -> Result<Vec<Account>> {
    let mut touched: Vec<Account> = Vec::with_capacity(changes.len());
    for change in changes {
        let mut account = match touched
            .iter()
            .position(|a| a.account_number == change.account_number)
        {
            Some(i) => touched.remove(i),
            None => load(&change.account_number)?.ok_or_else(|| {
                LedgerError::AccountNotFound {
                    number: change.account_number.clone(),
                    side: None,
                }
            })?,
        };
        account.apply(change.delta)?;
        touched.push(account);
    }
    Ok(touched)
}
