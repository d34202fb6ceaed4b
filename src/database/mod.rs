pub mod connection;
pub mod operations;

pub use connection::{create_ssl_connector, RetryPolicy};
pub use operations::{store_history_records, HistoryRow};
