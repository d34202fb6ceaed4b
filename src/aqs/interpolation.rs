use crate::aqs::breakpoints::BreakpointTable;
use crate::utils::round_decimals;

/// Raw codes the sensors report while faulted or warming up, both as stored
/// and after the 0.1 unit scaling.
const FAULT_CODES: [f64; 4] = [65535.0, 65534.0, 6553.5, 6553.4];

/// Score assigned to a fault code.
pub const FAULT_SCORE: u8 = 100;

/// Score once the value is past the last breakpoint.
pub const SATURATED_SCORE: u8 = 0;

/// Piecewise-linear sub-index of `value` against one pollutant's table.
///
/// Values below the current range's low bound map to the table floor (the
/// best score), values above every range saturate to 0.
pub fn sub_index(table: &BreakpointTable, value: f64) -> u8 {
    if FAULT_CODES.contains(&value) {
        return FAULT_SCORE;
    }

    let value = round_decimals(value, table.precision);
    for (&(bp_low, bp_high), &(idx_low, idx_high)) in table.breakpoints.iter().zip(table.index) {
        if value < bp_low {
            return table.floor;
        }
        if value <= bp_high {
            let score = (idx_high - idx_low) / (bp_high - bp_low) * (value - bp_low) + idx_low;
            return score.round_ties_even().clamp(0.0, f64::from(u8::MAX)) as u8;
        }
    }

    SATURATED_SCORE
}
