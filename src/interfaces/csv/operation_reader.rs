use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Deposit,
    Withdraw,
    Transfer,
}

/// One money-movement command from the operations CSV.
///
/// `account` is the target for deposits and the source for withdrawals and
/// transfers; `counterparty` is only meaningful for transfers.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct OperationRow {
    pub r#type: OperationType,
    pub user: u64,
    pub account: String,
    #[serde(default)]
    pub counterparty: Option<String>,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

/// Streams operations from a CSV source without loading the whole file.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn operations(self) -> impl Iterator<Item = Result<OperationRow>> {
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
    fn test_reader_valid_stream() {
        let data = "type, user, account, counterparty, amount, description, reference\n\
                    deposit, 1, ACC1, , 100.0, salary,\n\
                    transfer, 1, ACC1, ACC2, 25.5, rent, MY-REF";
        let reader = OperationReader::new(data.as_bytes());
        let rows: Vec<Result<OperationRow>> = reader.operations().collect();

        assert_eq!(rows.len(), 2);
        let deposit = rows[0].as_ref().unwrap();
        assert_eq!(deposit.r#type, OperationType::Deposit);
        assert_eq!(deposit.account, "ACC1");
        assert_eq!(deposit.amount, dec!(100.0));
        assert_eq!(deposit.counterparty, None);

        let transfer = rows[1].as_ref().unwrap();
        assert_eq!(transfer.r#type, OperationType::Transfer);
        assert_eq!(transfer.counterparty.as_deref(), Some("ACC2"));
        assert_eq!(transfer.reference.as_deref(), Some("MY-REF"));
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "type, user, account, counterparty, amount\ninvalid, 1, ACC1, , 1.0";
        let reader = OperationReader::new(data.as_bytes());
        let rows: Vec<Result<OperationRow>> = reader.operations().collect();

        assert!(rows[0].is_err());
    }
}
