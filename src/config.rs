use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Limit settings for the engine, fixed at construction time.
///
/// Defaults mirror the production deployment values: per-transaction ceilings
/// per type, plus the base daily ceiling and daily transaction count from
/// which type-specific daily defaults are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// System-wide maximum for a single transfer.
    pub max_transfer: Decimal,
    /// System-wide maximum for a single deposit.
    pub max_deposit: Decimal,
    /// System-wide maximum for a single withdrawal.
    pub max_withdraw: Decimal,
    /// Base daily ceiling; per-type daily defaults are derived from it.
    pub default_daily_limit: Decimal,
    /// Default number of transactions allowed per account/type/day.
    pub default_daily_transaction_count: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_transfer: dec!(1_000_000.00),
            max_deposit: dec!(500_000.00),
            max_withdraw: dec!(100_000.00),
            default_daily_limit: dec!(50_000.00),
            default_daily_transaction_count: 50,
        }
    }
}
