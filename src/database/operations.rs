//! Database operations for storing decoded history records
use log::debug;
use time::OffsetDateTime;

use crate::database::connection::{execute_with_retry, RetryPolicy};
use crate::models::DecodedRecord;

const INSERT_HISTORY_RECORD: &str = "INSERT INTO history_records(
        device_mac, time, aqs, temperature, humidity, pressure, battery,
        charging, motion, voc_index, voc_ppm, nox_index, co2,
        pm1, pm25, pm10, latitude, longitude, altitude)
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)";

/// One `history_records` row, with column types PostgreSQL accepts
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub time: OffsetDateTime,
    pub aqs: i16,
    pub temperature: Option<f64>,
    pub humidity: Option<i16>,
    pub pressure: Option<f64>,
    pub battery: i16,
    pub charging: bool,
    pub motion: bool,
    pub voc_index: Option<i32>,
    pub voc_ppm: Option<f64>,
    pub nox_index: Option<i32>,
    pub co2: Option<i32>,
    pub pm1: Option<f64>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<i16>,
}

impl HistoryRow {
    /// Row for a record with a valid checksum, `None` otherwise
    pub fn from_record(record: &DecodedRecord) -> Option<Self> {
        if !record.crc_valid {
            return None;
        }
        Some(HistoryRow {
            time: record.datetime()?,
            aqs: i16::from(record.aqs),
            temperature: record.temperature_c,
            humidity: record.humidity_percent.map(i16::from),
            pressure: record.pressure_mbar,
            battery: i16::from(record.battery_percent),
            charging: record.charging,
            motion: record.motion,
            voc_index: record.voc.as_ref().map(|v| i32::from(v.voc_index)),
            voc_ppm: record.voc.as_ref().map(|v| v.voc_ppm),
            nox_index: record.voc.as_ref().map(|v| i32::from(v.nox_index)),
            co2: record.co2_ppm.map(i32::from),
            pm1: record.pm.as_ref().map(|p| p.pm1_ug_m3),
            pm25: record.pm.as_ref().map(|p| p.pm25_ug_m3),
            pm10: record.pm.as_ref().map(|p| p.pm10_ug_m3),
            latitude: record.gps.as_ref().map(|g| g.latitude),
            longitude: record.gps.as_ref().map(|g| g.longitude),
            altitude: record.gnss.as_ref().map(|g| g.altitude_m),
        })
    }
}

/// Store the valid records of one device in the history_records table
///
/// All rows of one attempt are inserted in a single transaction.
///
/// # Returns
/// Number of rows inserted
pub async fn store_history_records(
    device_mac: &str,
    records: &[DecodedRecord],
    database_url: &str,
    policy: RetryPolicy,
) -> Result<u64, String> {
    let rows: Vec<HistoryRow> = records.iter().filter_map(HistoryRow::from_record).collect();
    if rows.is_empty() {
        debug!("No valid records to store for {}", device_mac);
        return Ok(0);
    }

    let device_mac = device_mac.to_string();

    execute_with_retry(database_url, policy, move |client| {
        let device_mac = device_mac.clone();
        let rows = rows.clone();
        async move {
            let mut client = client;
            let transaction = client.transaction().await?;
            let statement = transaction.prepare(INSERT_HISTORY_RECORD).await?;

            let mut inserted = 0;
            for row in &rows {
                inserted += transaction
                    .execute(
                        &statement,
                        &[
                            &device_mac,
                            &row.time,
                            &row.aqs,
                            &row.temperature,
                            &row.humidity,
                            &row.pressure,
                            &row.battery,
                            &row.charging,
                            &row.motion,
                            &row.voc_index,
                            &row.voc_ppm,
                            &row.nox_index,
                            &row.co2,
                            &row.pm1,
                            &row.pm25,
                            &row.pm10,
                            &row.latitude,
                            &row.longitude,
                            &row.altitude,
                        ],
                    )
                    .await?;
            }

            transaction.commit().await?;
            Ok::<u64, tokio_postgres::Error>(inserted)
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GnssData, VocData};

    fn record() -> DecodedRecord {
        DecodedRecord {
            history_type: 1,
            packet_type: 0x21,
            timestamp: 1_700_000_000,
            temperature_c: Some(21.3),
            humidity_percent: None,
            pressure_mbar: Some(1005.0),
            battery_percent: 64,
            error_flags: 0x4000,
            voc: Some(VocData {
                voc_index: 150,
                voc_ppm: 0.25,
                nox_index: 20,
            }),
            co2_ppm: None,
            pm: None,
            pm_extended: None,
            gps: None,
            gnss: Some(GnssData {
                snr_0_19: 3,
                snr_20_49: 8,
                snr_50_99: 2,
                snr_avg: 35,
                altitude_m: 34,
                satellites_fixed: 7,
                satellites_in_view: 12,
                position_error_m: -5,
            }),
            checksum: 0,
            crc_valid: true,
            total_length: 35,
            charging: true,
            motion: false,
            aqs: 86,
        }
    }

    #[test]
    fn row_carries_record_values() {
        let row = HistoryRow::from_record(&record()).unwrap();
        assert_eq!(row.time.unix_timestamp(), 1_700_000_000);
        assert_eq!(row.aqs, 86);
        assert_eq!(row.humidity, None);
        assert_eq!(row.battery, 64);
        assert!(row.charging);
        assert_eq!(row.voc_index, Some(150));
        assert_eq!(row.nox_index, Some(20));
        assert_eq!(row.co2, None);
        assert_eq!(row.altitude, Some(34));
        assert_eq!(row.latitude, None);
    }

    #[test]
    fn invalid_checksum_yields_no_row() {
        let record = DecodedRecord {
            crc_valid: false,
            ..record()
        };
        assert!(HistoryRow::from_record(&record).is_none());
    }
}
