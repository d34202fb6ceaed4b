//! Binary history record decoding
//!
//! A record is laid out back to back with no padding, little-endian:
//! - Byte 0: History type tag
//! - Byte 1: Packet type bitmask, one bit per optional section
//! - Bytes 2-17: Core block
//!   - timestamp (u32, seconds since epoch)
//!   - temperature (i16, 0.01°C, -1 = no reading)
//!   - humidity (u8, %, 0xFF = no reading)
//!   - pressure (u32, 0.1 mbar, 0xFFFFFFFF = no reading)
//!   - battery (u8, %)
//!   - error flags (u16)
//!   - 2 reserved bytes, not decoded but covered by the checksum
//! - Optional sections selected by the packet type, in [`OPTIONAL_SECTIONS`] order
//! - Last byte: CRC-8 over every preceding byte of the record
use log::debug;
use std::fmt;
use thiserror::Error;

use crate::aqs::{calculate_aqs, AqsInputs};
use crate::history::crc::crc8;
use crate::models::{
    DecodedRecord, GnssData, GpsData, PmData, PmEncoding, PmExtendedData, VocData,
};
use crate::utils::{round_decimals, round_voc_ppm};

pub const HEADER_LEN: usize = 2;
pub const CORE_LEN: usize = 16;
pub const CHECKSUM_LEN: usize = 1;
/// Header plus core block, the shortest prefix that can be decoded.
pub const MIN_RECORD_PREFIX: usize = HEADER_LEN + CORE_LEN;

const TEMPERATURE_NO_READING: i16 = -1;
const HUMIDITY_NO_READING: u8 = 0xFF;
const PRESSURE_NO_READING: u32 = 0xFFFF_FFFF;

const CHARGING_FLAG: u16 = 0x4000;
const MOTION_FLAG: u16 = 0x1000;

const PM_INTEGER_FLAG: u16 = 0x8000;
const PM_VALUE_MASK: u16 = 0x7FFF;

/// Physical sections of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    Core,
    Voc,
    Co2,
    Pm,
    PmExtended,
    Gps,
    GpsExtended,
    Checksum,
}

/// Optional sections in the order the firmware writes them.
pub const OPTIONAL_SECTIONS: [Section; 6] = [
    Section::Voc,
    Section::Co2,
    Section::Pm,
    Section::PmExtended,
    Section::Gps,
    Section::GpsExtended,
];

impl Section {
    /// Width in bytes
    pub const fn width(self) -> usize {
        match self {
            Section::Header => HEADER_LEN,
            Section::Core => CORE_LEN,
            Section::Voc => 6,
            Section::Co2 => 2,
            Section::Pm => 6,
            Section::PmExtended => 10,
            Section::Gps => 8,
            Section::GpsExtended => 10,
            Section::Checksum => CHECKSUM_LEN,
        }
    }

    /// Packet type bit selecting this section, 0 for mandatory sections
    pub const fn flag(self) -> u8 {
        match self {
            Section::Voc => 0b0000_0001,
            Section::Co2 => 0b0000_0010,
            Section::Pm => 0b0000_0100,
            Section::PmExtended => 0b0000_1000,
            Section::Gps => 0b0001_0000,
            Section::GpsExtended => 0b0010_0000,
            Section::Header | Section::Core | Section::Checksum => 0,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Header => "header",
            Section::Core => "core",
            Section::Voc => "VOC",
            Section::Co2 => "CO2",
            Section::Pm => "PM",
            Section::PmExtended => "extended PM",
            Section::Gps => "GPS",
            Section::GpsExtended => "extended GPS",
            Section::Checksum => "checksum",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("record too short for {section} section: need {needed} bytes, {available} available")]
    TooShort {
        section: Section,
        needed: usize,
        available: usize,
    },
}

/// Total record length implied by a packet type bitmask
pub fn record_length(packet_type: u8) -> usize {
    MIN_RECORD_PREFIX
        + OPTIONAL_SECTIONS
            .iter()
            .filter(|section| packet_type & section.flag() != 0)
            .map(|section| section.width())
            .sum::<usize>()
        + CHECKSUM_LEN
}

/// Convert one raw PM mass concentration to µg/m³
pub fn decode_pm_value(raw: u16, encoding: PmEncoding) -> f64 {
    match encoding {
        PmEncoding::Flagged if raw & PM_INTEGER_FLAG != 0 => f64::from(raw & PM_VALUE_MASK),
        PmEncoding::Legacy | PmEncoding::Flagged => f64::from(raw) / 10.0,
    }
}

struct SectionReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> SectionReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        SectionReader { data, offset: 0 }
    }

    fn take(&mut self, section: Section) -> Result<&'a [u8], DecodeError> {
        let end = self.offset + section.width();
        let bytes = self
            .data
            .get(self.offset..end)
            .ok_or(DecodeError::TooShort {
                section,
                needed: end,
                available: self.data.len(),
            })?;
        self.offset = end;
        Ok(bytes)
    }
}

fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn i16_at(bytes: &[u8], at: usize) -> i16 {
    i16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn i32_at(bytes: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[derive(Default)]
struct OptionalSections {
    voc: Option<VocData>,
    co2_ppm: Option<u16>,
    pm: Option<PmData>,
    pm_extended: Option<PmExtendedData>,
    gps: Option<GpsData>,
    gnss: Option<GnssData>,
}

impl OptionalSections {
    // `bytes` is exactly `section.width()` long.
    fn decode(&mut self, section: Section, bytes: &[u8], pm_encoding: PmEncoding) {
        match section {
            Section::Voc => {
                self.voc = Some(VocData {
                    voc_index: u16_at(bytes, 0),
                    voc_ppm: round_voc_ppm(f64::from(u16_at(bytes, 2)) / 1000.0),
                    nox_index: u16_at(bytes, 4),
                });
            }
            Section::Co2 => self.co2_ppm = Some(u16_at(bytes, 0)),
            Section::Pm => {
                self.pm = Some(PmData {
                    pm1_ug_m3: decode_pm_value(u16_at(bytes, 0), pm_encoding),
                    pm25_ug_m3: decode_pm_value(u16_at(bytes, 2), pm_encoding),
                    pm10_ug_m3: decode_pm_value(u16_at(bytes, 4), pm_encoding),
                });
            }
            Section::PmExtended => {
                self.pm_extended = Some(PmExtendedData {
                    particles_0_5: u16_at(bytes, 0),
                    particles_1_0: u16_at(bytes, 2),
                    particles_2_5: u16_at(bytes, 4),
                    particles_10_0: u16_at(bytes, 6),
                    particle_size: u16_at(bytes, 8),
                });
            }
            Section::Gps => {
                self.gps = Some(GpsData {
                    latitude: f64::from(i32_at(bytes, 0)) / 1e6,
                    longitude: f64::from(i32_at(bytes, 4)) / 1e6,
                });
            }
            Section::GpsExtended => {
                self.gnss = Some(GnssData {
                    snr_0_19: bytes[0],
                    snr_20_49: bytes[1],
                    snr_50_99: bytes[2],
                    snr_avg: bytes[3],
                    altitude_m: i16_at(bytes, 4),
                    satellites_fixed: bytes[6],
                    satellites_in_view: bytes[7],
                    position_error_m: i16_at(bytes, 8),
                });
            }
            Section::Header | Section::Core | Section::Checksum => {}
        }
    }
}

/// Decode one history record from the start of `data`
///
/// Bytes past the record's own length are ignored; `total_length` on the
/// result tells where the next record starts. A checksum mismatch is
/// reported through `crc_valid` and never fails the decode.
///
/// # Errors
/// [`DecodeError::TooShort`] if `data` ends before the header, core block,
/// a flagged section or the checksum byte.
pub fn decode_record(data: &[u8], pm_encoding: PmEncoding) -> Result<DecodedRecord, DecodeError> {
    if data.len() < MIN_RECORD_PREFIX {
        return Err(DecodeError::TooShort {
            section: Section::Core,
            needed: MIN_RECORD_PREFIX,
            available: data.len(),
        });
    }

    let mut reader = SectionReader::new(data);

    let header = reader.take(Section::Header)?;
    let history_type = header[0];
    let packet_type = header[1];

    let core = reader.take(Section::Core)?;
    let timestamp = u32_at(core, 0);
    let temperature_raw = i16_at(core, 4);
    let humidity_raw = core[6];
    let pressure_raw = u32_at(core, 7);
    let battery_percent = core[11];
    let error_flags = u16_at(core, 12);

    let mut sections = OptionalSections::default();
    for section in OPTIONAL_SECTIONS {
        if packet_type & section.flag() != 0 {
            let bytes = reader.take(section)?;
            sections.decode(section, bytes, pm_encoding);
        }
    }

    let checksum_offset = reader.offset;
    let checksum = reader.take(Section::Checksum)?[0];
    let computed = crc8(&data[..checksum_offset]);
    let crc_valid = computed == checksum;
    if !crc_valid {
        debug!(
            "Checksum mismatch: stored={:#04x}, computed={:#04x}",
            checksum, computed
        );
    }

    let record = DecodedRecord {
        history_type,
        packet_type,
        timestamp,
        temperature_c: (temperature_raw != TEMPERATURE_NO_READING)
            .then(|| round_decimals(f64::from(temperature_raw) / 100.0, 1)),
        humidity_percent: (humidity_raw != HUMIDITY_NO_READING).then_some(humidity_raw),
        pressure_mbar: (pressure_raw != PRESSURE_NO_READING)
            .then(|| f64::from(pressure_raw) / 10.0),
        battery_percent,
        error_flags,
        voc: sections.voc,
        co2_ppm: sections.co2_ppm,
        pm: sections.pm,
        pm_extended: sections.pm_extended,
        gps: sections.gps,
        gnss: sections.gnss,
        checksum,
        crc_valid,
        total_length: reader.offset,
        charging: error_flags & CHARGING_FLAG != 0,
        motion: error_flags & MOTION_FLAG != 0,
        aqs: 0,
    };

    let aqs = calculate_aqs(&AqsInputs::from_record(&record));
    Ok(DecodedRecord { aqs, ..record })
}
