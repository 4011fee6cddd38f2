pub mod alphavantage;
pub mod error;
pub mod screener;
pub mod types;
