//! Decoding of concatenated history records
use log::{debug, warn};

use crate::history::codec::decode_record;
use crate::models::{DecodedRecord, PmEncoding};

/// Records decoded from a buffer and where decoding stopped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryScan {
    pub records: Vec<DecodedRecord>,
    /// Offset just past the last decoded record.
    pub offset: usize,
}

impl HistoryScan {
    /// Whether the whole buffer of `len` bytes was consumed
    pub fn is_complete(&self, len: usize) -> bool {
        self.offset >= len
    }

    /// Records whose checksum matched
    pub fn valid_records(&self) -> impl Iterator<Item = &DecodedRecord> {
        self.records.iter().filter(|record| record.crc_valid)
    }
}

/// Decode back-to-back records until the buffer is exhausted
///
/// Stops at the first record that cannot be decoded and returns what was
/// decoded before it; the failure itself is only logged.
pub fn read_history(data: &[u8], pm_encoding: PmEncoding) -> HistoryScan {
    let mut records = Vec::new();
    let mut offset = 0;

    while offset < data.len() {
        match decode_record(&data[offset..], pm_encoding) {
            Ok(record) => {
                debug!(
                    "Decoded record at offset {}: packet_type={:#04x}, length={}, crc_valid={}",
                    offset, record.packet_type, record.total_length, record.crc_valid
                );
                offset += record.total_length;
                records.push(record);
            }
            Err(e) => {
                warn!("Failed to parse record at offset {}: {}", offset, e);
                break;
            }
        }
    }

    HistoryScan { records, offset }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::crc::crc8;

    fn record(ts: u32, packet_type: u8, payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0x01, packet_type];
        bytes.extend_from_slice(&ts.to_le_bytes());
        bytes.extend_from_slice(&2500i16.to_le_bytes());
        bytes.push(45);
        bytes.extend_from_slice(&10130u32.to_le_bytes());
        bytes.push(80);
        bytes.extend_from_slice(&0x5000u16.to_le_bytes());
        bytes.extend_from_slice(&[0, 0]);
        bytes.extend_from_slice(payload);
        let crc = crc8(&bytes);
        bytes.push(crc);
        bytes
    }

    #[test]
    fn empty_buffer_yields_nothing() {
        let scan = read_history(&[], PmEncoding::Legacy);
        assert!(scan.records.is_empty());
        assert_eq!(scan.offset, 0);
        assert!(scan.is_complete(0));
    }

    #[test]
    fn stops_at_trailing_garbage() {
        let mut data = record(1_700_000_000, 0, &[]);
        data.extend(record(1_700_000_060, 0, &[]));
        data.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF, 0x00]);

        let scan = read_history(&data, PmEncoding::Legacy);
        assert_eq!(scan.records.len(), 2);
        assert_eq!(scan.offset, 38);
        assert!(!scan.is_complete(data.len()));
        assert_eq!(scan.records[1].timestamp, 1_700_000_060);
    }

    #[test]
    fn advances_by_each_record_length() {
        let mut data = record(10, 0x02, &800u16.to_le_bytes());
        data.extend(record(20, 0, &[]));
        data.extend(record(30, 0x01, &[1, 0, 2, 0, 3, 0]));

        let scan = read_history(&data, PmEncoding::Legacy);
        let lengths: Vec<usize> = scan.records.iter().map(|r| r.total_length).collect();
        assert_eq!(lengths, vec![21, 19, 25]);
        assert_eq!(scan.offset, data.len());
        assert!(scan.is_complete(data.len()));
    }

    #[test]
    fn corrupt_checksum_does_not_stop_the_scan() {
        let mut first = record(10, 0, &[]);
        first[18] ^= 0x01;
        let mut data = first;
        data.extend(record(20, 0, &[]));

        let scan = read_history(&data, PmEncoding::Legacy);
        assert_eq!(scan.records.len(), 2);
        assert!(!scan.records[0].crc_valid);
        assert_eq!(scan.valid_records().count(), 1);
    }

    #[test]
    fn truncated_flagged_section_stops_the_scan() {
        let mut data = record(10, 0, &[]);
        let truncated = record(20, 0x02, &800u16.to_le_bytes());
        data.extend_from_slice(&truncated[..19]);

        let scan = read_history(&data, PmEncoding::Legacy);
        assert_eq!(scan.records.len(), 1);
        assert_eq!(scan.offset, 19);
    }
}
