//! Static concentration breakpoints for the air quality score
//!
//! Every pollutant table has five contiguous `(low, high)` concentration
//! ranges, paired by position with the ranges of [`AQS_INDEX`].

/// Score ranges shared by every pollutant, best first.
pub const AQS_INDEX: [(f64, f64); 5] = [
    (100.0, 81.0),
    (80.0, 61.0),
    (60.0, 41.0),
    (40.0, 21.0),
    (20.0, 0.0),
];

/// One pollutant's breakpoints and lookup parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakpointTable {
    pub name: &'static str,
    pub breakpoints: &'static [(f64, f64)],
    pub index: &'static [(f64, f64)],
    /// Decimal places the measured value is rounded to before lookup.
    pub precision: u32,
    /// Score returned below the first breakpoint.
    pub floor: u8,
}

impl BreakpointTable {
    const fn with_breakpoints(name: &'static str, breakpoints: &'static [(f64, f64)]) -> Self {
        BreakpointTable {
            name,
            breakpoints,
            index: &AQS_INDEX,
            precision: 0,
            floor: 100,
        }
    }
}

pub const CO2: BreakpointTable = BreakpointTable::with_breakpoints(
    "co2",
    &[
        (400.0, 600.0),
        (601.0, 1000.0),
        (1001.0, 1500.0),
        (1501.0, 2500.0),
        (2501.0, 4000.0),
    ],
);

pub const PM1: BreakpointTable = BreakpointTable::with_breakpoints(
    "pm1",
    &[
        (0.0, 14.0),
        (15.0, 34.0),
        (35.0, 61.0),
        (62.0, 95.0),
        (96.0, 150.0),
    ],
);

pub const PM25: BreakpointTable = BreakpointTable::with_breakpoints(
    "pm25",
    &[
        (0.0, 20.0),
        (21.0, 50.0),
        (51.0, 90.0),
        (91.0, 140.0),
        (141.0, 200.0),
    ],
);

pub const PM10: BreakpointTable = BreakpointTable::with_breakpoints(
    "pm10",
    &[
        (0.0, 30.0),
        (31.0, 75.0),
        (76.0, 125.0),
        (126.0, 200.0),
        (201.0, 300.0),
    ],
);

pub const VOC_INDEX: BreakpointTable = BreakpointTable::with_breakpoints(
    "voc_index",
    &[
        (1.0, 200.0),
        (201.0, 250.0),
        (251.0, 350.0),
        (351.0, 400.0),
        (401.0, 500.0),
    ],
);

pub const NOX_INDEX: BreakpointTable = BreakpointTable::with_breakpoints(
    "nox_index",
    &[
        (1.0, 50.0),
        (51.0, 100.0),
        (101.0, 300.0),
        (301.0, 350.0),
        (351.0, 500.0),
    ],
);
