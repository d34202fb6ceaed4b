use time::OffsetDateTime;

/// How the firmware packs PM mass concentrations into the 16-bit PM fields.
///
/// The record itself carries no marker for this, so the caller picks the
/// variant from what it knows about the device firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PmEncoding {
    /// Every value is in 0.1 µg/m³ units.
    #[default]
    Legacy,
    /// Bit 15 set: low 15 bits are whole µg/m³. Bit 15 clear: 0.1 µg/m³ units.
    Flagged,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VocData {
    pub voc_index: u16,
    pub voc_ppm: f64,
    pub nox_index: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PmData {
    pub pm1_ug_m3: f64,
    pub pm25_ug_m3: f64,
    pub pm10_ug_m3: f64,
}

/// Particle counts per size class plus the typical particle size, as reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PmExtendedData {
    pub particles_0_5: u16,
    pub particles_1_0: u16,
    pub particles_2_5: u16,
    pub particles_10_0: u16,
    pub particle_size: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GpsData {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GnssData {
    pub snr_0_19: u8,
    pub snr_20_49: u8,
    pub snr_50_99: u8,
    pub snr_avg: u8,
    pub altitude_m: i16,
    pub satellites_fixed: u8,
    pub satellites_in_view: u8,
    pub position_error_m: i16,
}

/// One decoded history record.
///
/// Optional sections are `None` when the packet type did not select them,
/// and core measurements are `None` when the device stored its "no reading"
/// sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    pub history_type: u8,
    pub packet_type: u8,
    pub timestamp: u32,
    pub temperature_c: Option<f64>,
    pub humidity_percent: Option<u8>,
    pub pressure_mbar: Option<f64>,
    pub battery_percent: u8,
    pub error_flags: u16,
    pub voc: Option<VocData>,
    pub co2_ppm: Option<u16>,
    pub pm: Option<PmData>,
    pub pm_extended: Option<PmExtendedData>,
    pub gps: Option<GpsData>,
    pub gnss: Option<GnssData>,
    pub checksum: u8,
    pub crc_valid: bool,
    pub total_length: usize,
    pub charging: bool,
    pub motion: bool,
    pub aqs: u8,
}

impl DecodedRecord {
    /// Record timestamp as a UTC date-time, `None` if out of range for `time`.
    pub fn datetime(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(i64::from(self.timestamp)).ok()
    }
}

impl PmEncoding {
    /// `Flagged` when firmware `fw` is at least `flagged_since`
    pub fn for_firmware(fw: Option<&str>, flagged_since: (u32, u32, u32)) -> Self {
        if crate::utils::firmware_at_least(fw, flagged_since) {
            PmEncoding::Flagged
        } else {
            PmEncoding::Legacy
        }
    }
}

impl std::str::FromStr for PmEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(PmEncoding::Legacy),
            "flagged" | "new" => Ok(PmEncoding::Flagged),
            other => Err(format!(
                "Unknown PM encoding '{}', expected 'legacy' or 'flagged'",
                other
            )),
        }
    }
}
