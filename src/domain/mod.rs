pub mod account;
pub mod ledger;
pub mod limits;
pub mod ports;
