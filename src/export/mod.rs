pub mod fields;
pub mod writer;

pub use fields::{Column, COLUMNS};
pub use writer::{
    export_records_to_csv, spawn_csv_export, write_records, ExportError, ExportOutcome,
};
