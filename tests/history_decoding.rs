//! End-to-end decoding of history buffers through the public API

use atmotube_history::history::codec::{record_length, Section, OPTIONAL_SECTIONS};
use atmotube_history::history::crc::crc8;
use atmotube_history::{calculate_aqs, decode_record, read_history, AqsInputs, PmEncoding};
use proptest::prelude::*;

/// Builds a record byte by byte, sealing it with its checksum.
struct RecordBuilder {
    bytes: Vec<u8>,
}

impl RecordBuilder {
    fn new(packet_type: u8) -> Self {
        RecordBuilder {
            bytes: vec![0x01, packet_type],
        }
    }

    fn core(mut self, ts: u32, temp: i16, hum: u8, pressure: u32, battery: u8, flags: u16) -> Self {
        self.bytes.extend_from_slice(&ts.to_le_bytes());
        self.bytes.extend_from_slice(&temp.to_le_bytes());
        self.bytes.push(hum);
        self.bytes.extend_from_slice(&pressure.to_le_bytes());
        self.bytes.push(battery);
        self.bytes.extend_from_slice(&flags.to_le_bytes());
        // reserved
        self.bytes.extend_from_slice(&[0, 0]);
        self
    }

    fn u16s(mut self, values: &[u16]) -> Self {
        for v in values {
            self.bytes.extend_from_slice(&v.to_le_bytes());
        }
        self
    }

    fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    fn seal(mut self) -> Vec<u8> {
        let crc = crc8(&self.bytes);
        self.bytes.push(crc);
        self.bytes
    }
}

fn reference_record() -> Vec<u8> {
    RecordBuilder::new(0)
        .core(1_700_000_000, 2500, 45, 10130, 80, 0x5000)
        .seal()
}

/// Record with every section flagged in `packet_type` filled with `fill`.
fn record_with_sections(packet_type: u8, fill: u8) -> Vec<u8> {
    let payload: usize = OPTIONAL_SECTIONS
        .iter()
        .filter(|s| packet_type & s.flag() != 0)
        .map(|s| s.width())
        .sum();
    RecordBuilder::new(packet_type)
        .core(1_700_000_000, 2500, 45, 10130, 80, 0)
        .raw(&vec![fill; payload])
        .seal()
}

#[test]
fn reference_record_decodes_exactly() {
    let data = reference_record();
    assert_eq!(data.len(), 19);
    let record = decode_record(&data, PmEncoding::Legacy).unwrap();
    assert_eq!(record.timestamp, 1_700_000_000);
    assert_eq!(record.temperature_c, Some(25.0));
    assert_eq!(record.humidity_percent, Some(45));
    assert_eq!(record.pressure_mbar, Some(1013.0));
    assert_eq!(record.battery_percent, 80);
    assert!(record.charging);
    assert!(record.motion);
    assert!(record.crc_valid);
    assert_eq!(record.total_length, 19);
    assert_eq!(record.aqs, 100);
}

#[test]
fn two_records_and_garbage() {
    let mut data = reference_record();
    data.extend(reference_record());
    data.extend_from_slice(&[0x13, 0x37, 0x00, 0xFF, 0x42]);

    let scan = read_history(&data, PmEncoding::Legacy);
    assert_eq!(scan.records.len(), 2);
    assert_eq!(scan.offset, 38);
}

#[test]
fn checksum_reproduces_over_consumed_bytes() {
    let data = record_with_sections(0x3F, 0x11);
    let record = decode_record(&data, PmEncoding::Flagged).unwrap();
    assert_eq!(crc8(&data[..record.total_length - 1]), data[record.total_length - 1]);
    assert_eq!(record.checksum, data[record.total_length - 1]);
}

#[test]
fn decoded_score_matches_aggregator() {
    let data = RecordBuilder::new(0x02 | 0x04)
        .core(1_700_000_000, 2500, 45, 10130, 80, 0)
        .u16s(&[1200])
        .u16s(&[70, 350, 500])
        .seal();
    let record = decode_record(&data, PmEncoding::Legacy).unwrap();

    let expected = calculate_aqs(&AqsInputs {
        co2: Some(1200.0),
        pm1: Some(7.0),
        pm25: Some(35.0),
        pm10: Some(50.0),
        ..Default::default()
    });
    assert_eq!(record.aqs, expected);
    assert_eq!(record.aqs, 52);
}

#[test]
fn pm_fault_code_scores_best() {
    // 0xFFFF is 6553.5 µg/m³ after legacy scaling
    let data = RecordBuilder::new(0x04)
        .core(1_700_000_000, 2500, 45, 10130, 80, 0)
        .u16s(&[0xFFFF, 0xFFFF, 0xFFFF])
        .seal();
    let record = decode_record(&data, PmEncoding::Legacy).unwrap();
    assert_eq!(record.pm.unwrap().pm25_ug_m3, 6553.5);
    assert_eq!(record.aqs, 100);
}

#[test]
fn truncated_section_reports_its_name() {
    let data = record_with_sections(0x10, 0x00);
    let err = decode_record(&data[..22], PmEncoding::Legacy).unwrap_err();
    assert_eq!(
        err.to_string(),
        "record too short for GPS section: need 26 bytes, 22 available"
    );
    assert!(matches!(
        err,
        atmotube_history::DecodeError::TooShort {
            section: Section::Gps,
            ..
        }
    ));
}

proptest! {
    #[test]
    fn prop_length_matches_flagged_sections(packet_type in 0u8..64, fill in any::<u8>()) {
        let data = record_with_sections(packet_type, fill);
        let record = decode_record(&data, PmEncoding::Legacy).unwrap();
        prop_assert_eq!(record.total_length, record_length(packet_type));
        prop_assert_eq!(record.total_length, data.len());
        prop_assert!(record.crc_valid);
    }

    #[test]
    fn prop_next_record_starts_at_total_length(first in 0u8..64, second in 0u8..64) {
        let mut data = record_with_sections(first, 0x5A);
        data.extend(record_with_sections(second, 0xA5));

        let head = decode_record(&data, PmEncoding::Flagged).unwrap();
        let next = decode_record(&data[head.total_length..], PmEncoding::Flagged).unwrap();
        prop_assert_eq!(next.packet_type, second);
        prop_assert_eq!(head.total_length + next.total_length, data.len());

        let scan = read_history(&data, PmEncoding::Flagged);
        prop_assert_eq!(scan.records.len(), 2);
        prop_assert_eq!(scan.offset, data.len());
    }

    #[test]
    fn prop_any_truncation_stops_cleanly(packet_type in 0u8..64, fraction in 0.0f64..1.0) {
        let data = record_with_sections(packet_type, 0x00);
        let cut = (data.len() as f64 * fraction) as usize;
        prop_assert!(decode_record(&data[..cut], PmEncoding::Legacy).is_err());

        let scan = read_history(&data[..cut], PmEncoding::Legacy);
        prop_assert!(scan.records.is_empty());
        prop_assert_eq!(scan.offset, 0);
    }
}
