//! Decoder, air quality scoring and export for Atmotube history logs.
pub mod aqs;
pub mod config;
pub mod database;
pub mod export;
pub mod history;
pub mod models;
pub mod utils;

pub use aqs::{calculate_aqs, AqsInputs};
pub use history::{decode_record, read_history, DecodeError, HistoryScan};
pub use models::{DecodedRecord, PmEncoding};
