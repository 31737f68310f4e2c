use crate::domain::account::{Account, AccountStatus};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One seeded account from the accounts CSV.
///
/// Account provisioning is not part of the engine; the CLI seeds the store
/// from this file before replaying operations. `owner` feeds the ownership
/// validator.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct AccountRow {
    pub account: String,
    pub owner: u64,
    pub balance: Decimal,
    #[serde(default)]
    pub status: Option<AccountStatus>,
}

impl AccountRow {
    pub fn into_account(self) -> Account {
        let mut account = Account::new(self.account, self.balance);
        if let Some(status) = self.status {
            account.status = status;
        }
        account
    }
}

pub struct AccountReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> AccountReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn accounts(self) -> impl Iterator<Item = Result<AccountRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reads_accounts_with_status() {
        let data = "account, owner, balance, status\n\
                    ACC1, 1, 100.00, active\n\
                    ACC2, 2, 0.00, suspended";
        let reader = AccountReader::new(data.as_bytes());
        let rows: Vec<AccountRow> = reader.accounts().map(|r| r.unwrap()).collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].owner, 1);
        let acc2 = rows[1].clone().into_account();
        assert_eq!(acc2.status, AccountStatus::Suspended);
        assert_eq!(acc2.balance, dec!(0.00));
    }

    #[test]
    fn test_status_defaults_to_active() {
        let data = "account, owner, balance\nACC1, 1, 5.0";
        let reader = AccountReader::new(data.as_bytes());
        let row = reader.accounts().next().unwrap().unwrap();
        assert_eq!(row.into_account().status, AccountStatus::Active);
    }
}
