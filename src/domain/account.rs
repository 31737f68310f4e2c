use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A strictly positive transaction amount.
///
/// Wrapper around `rust_decimal::Decimal` so a zero or negative amount is
/// rejected once, at the boundary, instead of being re-checked at every use.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidTransactionAmount(value))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Suspended,
}

/// A ledger account as the engine sees it.
///
/// Identity and lifecycle live elsewhere; the engine only reads the status
/// and moves the balance as part of committed transaction outcomes.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Account {
    pub account_number: String,
    pub balance: Decimal,
    pub status: AccountStatus,
}

impl Account {
    pub fn new(account_number: impl Into<String>, balance: Decimal) -> Self {
        Self {
            account_number: account_number.into(),
            balance,
            status: AccountStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Applies a signed balance delta, refusing to take the balance negative.
    pub fn apply(&mut self, delta: Decimal) -> Result<()> {
        let next = self.balance + delta;
        if next < Decimal::ZERO {
            return Err(LedgerError::InsufficientBalance {
                available: self.balance,
                requested: -delta,
            });
        }
        self.balance = next;
        Ok(())
    }

    pub fn ensure_funds(&self, amount: Amount) -> Result<()> {
        if self.balance < amount.value() {
            return Err(LedgerError::InsufficientBalance {
                available: self.balance,
                requested: amount.value(),
            });
        }
        Ok(())
    }
}
