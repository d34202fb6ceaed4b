//! Exported columns and their rendering
use crate::models::DecodedRecord;
use crate::utils::format_unix_seconds;

/// One exportable field of a decoded record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Timestamp,
    Aqs,
    Pm1,
    Pm25,
    Pm10,
    Particles05,
    Particles10,
    Particles25,
    Particles100,
    ParticleSize,
    Temperature,
    Humidity,
    Pressure,
    VocIndex,
    VocPpm,
    NoxIndex,
    Co2,
    Latitude,
    Longitude,
    Altitude,
    PositionError,
    GnssSnr0To19,
    GnssSnr20To49,
    GnssSnr50To99,
    GnssSnrAvg,
    SatellitesFixed,
    SatellitesInView,
    Battery,
    Charging,
    Motion,
}

/// Every column, in export order.
pub const COLUMNS: [Column; 30] = [
    Column::Timestamp,
    Column::Aqs,
    Column::Pm1,
    Column::Pm25,
    Column::Pm10,
    Column::Particles05,
    Column::Particles10,
    Column::Particles25,
    Column::Particles100,
    Column::ParticleSize,
    Column::Temperature,
    Column::Humidity,
    Column::Pressure,
    Column::VocIndex,
    Column::VocPpm,
    Column::NoxIndex,
    Column::Co2,
    Column::Latitude,
    Column::Longitude,
    Column::Altitude,
    Column::PositionError,
    Column::GnssSnr0To19,
    Column::GnssSnr20To49,
    Column::GnssSnr50To99,
    Column::GnssSnrAvg,
    Column::SatellitesFixed,
    Column::SatellitesInView,
    Column::Battery,
    Column::Charging,
    Column::Motion,
];

impl Column {
    /// Field name
    pub const fn key(self) -> &'static str {
        match self {
            Column::Timestamp => "timestamp",
            Column::Aqs => "aqs",
            Column::Pm1 => "pm1_ug_m3",
            Column::Pm25 => "pm25_ug_m3",
            Column::Pm10 => "pm10_ug_m3",
            Column::Particles05 => "pm0.5_particles",
            Column::Particles10 => "pm1.0_particles",
            Column::Particles25 => "pm2.5_particles",
            Column::Particles100 => "pm10.0_particles",
            Column::ParticleSize => "particle_size_nm",
            Column::Temperature => "temperature_c",
            Column::Humidity => "humidity_percent",
            Column::Pressure => "pressure_mbar",
            Column::VocIndex => "voc_index",
            Column::VocPpm => "voc_ppm",
            Column::NoxIndex => "nox_index",
            Column::Co2 => "co2_ppm",
            Column::Latitude => "latitude",
            Column::Longitude => "longitude",
            Column::Altitude => "altitude_m",
            Column::PositionError => "position_error_m",
            Column::GnssSnr0To19 => "gnss_snr0_19",
            Column::GnssSnr20To49 => "gnss_snr20_49",
            Column::GnssSnr50To99 => "gnss_snr50_99",
            Column::GnssSnrAvg => "gnss_snr_avg",
            Column::SatellitesFixed => "satellites_fixed",
            Column::SatellitesInView => "satellites_in_view",
            Column::Battery => "battery_percent",
            Column::Charging => "charging",
            Column::Motion => "motion",
        }
    }

    /// Human-readable CSV header
    pub const fn header(self) -> &'static str {
        match self {
            Column::Timestamp => "Date (UTC+00:00)",
            Column::Aqs => "AQS",
            Column::Pm1 => "PM1.0 (µg/m³)",
            Column::Pm25 => "PM2.5 (µg/m³)",
            Column::Pm10 => "PM10 (µg/m³)",
            Column::Particles05 => "PM0.5 Particles",
            Column::Particles10 => "PM1.0 Particles",
            Column::Particles25 => "PM2.5 Particles",
            Column::Particles100 => "PM10.0 Particles",
            Column::ParticleSize => "Typical Particle Size (µm)",
            Column::Temperature => "Temperature (˚C)",
            Column::Humidity => "Humidity (%)",
            Column::Pressure => "Pressure (hPa)",
            Column::VocIndex => "TVOC Index",
            Column::VocPpm => "TVOC (ppm)",
            Column::NoxIndex => "NOx Index",
            Column::Co2 => "CO₂ (ppm)",
            Column::Latitude => "Latitude",
            Column::Longitude => "Longitude",
            Column::Altitude => "Altitude (m)",
            Column::PositionError => "Position Error (m)",
            Column::GnssSnr0To19 => "GNSS SNR 0-19",
            Column::GnssSnr20To49 => "GNSS SNR 20-49",
            Column::GnssSnr50To99 => "GNSS SNR 50-99",
            Column::GnssSnrAvg => "GNSS SNR Avg",
            Column::SatellitesFixed => "Satellites Fixed",
            Column::SatellitesInView => "Satellites in View",
            Column::Battery => "Battery (%)",
            Column::Charging => "Charging",
            Column::Motion => "Motion",
        }
    }

    /// Look a column up by field name
    pub fn from_key(key: &str) -> Option<Column> {
        COLUMNS.iter().copied().find(|column| column.key() == key)
    }

    /// Rendered value of this field, empty when the record has no such reading
    pub fn value(self, record: &DecodedRecord) -> String {
        let voc = record.voc.as_ref();
        let pm = record.pm.as_ref();
        let pm_ext = record.pm_extended.as_ref();
        let gps = record.gps.as_ref();
        let gnss = record.gnss.as_ref();

        match self {
            Column::Timestamp => format_unix_seconds(record.timestamp),
            Column::Aqs => record.aqs.to_string(),
            Column::Pm1 => float(pm.map(|p| p.pm1_ug_m3)),
            Column::Pm25 => float(pm.map(|p| p.pm25_ug_m3)),
            Column::Pm10 => float(pm.map(|p| p.pm10_ug_m3)),
            Column::Particles05 => int(pm_ext.map(|p| p.particles_0_5)),
            Column::Particles10 => int(pm_ext.map(|p| p.particles_1_0)),
            Column::Particles25 => int(pm_ext.map(|p| p.particles_2_5)),
            Column::Particles100 => int(pm_ext.map(|p| p.particles_10_0)),
            Column::ParticleSize => int(pm_ext.map(|p| p.particle_size)),
            Column::Temperature => float(record.temperature_c),
            Column::Humidity => int(record.humidity_percent),
            Column::Pressure => float(record.pressure_mbar),
            Column::VocIndex => int(voc.map(|v| v.voc_index)),
            Column::VocPpm => float(voc.map(|v| v.voc_ppm)),
            Column::NoxIndex => int(voc.map(|v| v.nox_index)),
            Column::Co2 => int(record.co2_ppm),
            Column::Latitude => float(gps.map(|g| g.latitude)),
            Column::Longitude => float(gps.map(|g| g.longitude)),
            Column::Altitude => int(gnss.map(|g| g.altitude_m)),
            Column::PositionError => int(gnss.map(|g| g.position_error_m)),
            Column::GnssSnr0To19 => int(gnss.map(|g| g.snr_0_19)),
            Column::GnssSnr20To49 => int(gnss.map(|g| g.snr_20_49)),
            Column::GnssSnr50To99 => int(gnss.map(|g| g.snr_50_99)),
            Column::GnssSnrAvg => int(gnss.map(|g| g.snr_avg)),
            Column::SatellitesFixed => int(gnss.map(|g| g.satellites_fixed)),
            Column::SatellitesInView => int(gnss.map(|g| g.satellites_in_view)),
            Column::Battery => record.battery_percent.to_string(),
            Column::Charging => yes_no(record.charging),
            Column::Motion => yes_no(record.motion),
        }
    }
}

// Plain decimal notation, whole values keep a trailing `.0`.
fn float(value: Option<f64>) -> String {
    value
        .map(|v| {
            if v.is_finite() && v.fract() == 0.0 {
                format!("{:.1}", v)
            } else {
                v.to_string()
            }
        })
        .unwrap_or_default()
}

fn int<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "yes" } else { "no" };
    text.to_string()
}
