//! Air quality score (AQS): 0 is worst, 100 is best.
pub mod breakpoints;
pub mod interpolation;

pub use breakpoints::{BreakpointTable, AQS_INDEX};
pub use interpolation::sub_index;

use crate::models::DecodedRecord;

/// Score reported when no pollutant reading is available.
pub const DEFAULT_AQS: u8 = 100;

/// Pollutant readings feeding the composite score, `None` when not measured.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AqsInputs {
    pub co2: Option<f64>,
    pub pm1: Option<f64>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub voc_index: Option<f64>,
    pub nox_index: Option<f64>,
}

impl AqsInputs {
    /// Collect the scored pollutants present in a decoded record
    pub fn from_record(record: &DecodedRecord) -> Self {
        AqsInputs {
            co2: record.co2_ppm.map(f64::from),
            pm1: record.pm.as_ref().map(|pm| pm.pm1_ug_m3),
            pm25: record.pm.as_ref().map(|pm| pm.pm25_ug_m3),
            pm10: record.pm.as_ref().map(|pm| pm.pm10_ug_m3),
            voc_index: record.voc.as_ref().map(|voc| f64::from(voc.voc_index)),
            nox_index: record.voc.as_ref().map(|voc| f64::from(voc.nox_index)),
        }
    }

    fn readings(&self) -> [(Option<f64>, &'static BreakpointTable); 6] {
        [
            (self.co2, &breakpoints::CO2),
            (self.pm1, &breakpoints::PM1),
            (self.pm25, &breakpoints::PM25),
            (self.pm10, &breakpoints::PM10),
            (self.voc_index, &breakpoints::VOC_INDEX),
            (self.nox_index, &breakpoints::NOX_INDEX),
        ]
    }
}

/// Composite score: the worst sub-index among the available pollutants
pub fn calculate_aqs(inputs: &AqsInputs) -> u8 {
    inputs
        .readings()
        .into_iter()
        .filter_map(|(value, table)| value.map(|v| sub_index(table, v)))
        .min()
        .unwrap_or(DEFAULT_AQS)
}
