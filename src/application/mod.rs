pub mod limits;
pub mod processor;
