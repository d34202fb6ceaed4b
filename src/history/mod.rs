pub mod codec;
pub mod crc;
pub mod reader;

pub use codec::{decode_record, record_length, DecodeError, Section};
pub use reader::{read_history, HistoryScan};
