// In: src/bridge/format.rs

//! Defines all on-the-wire constants for the flat-buffer calling convention.
//! This is the single source of truth for the record headers the host expects.
//! Every value here is part of the binary contract with the host and must not
//! change.

//==================================================================================
// I. Time-Series Record
//==================================================================================

/// Number of header fields in a time-series record:
/// `[series_id, format_version, time_basis, data_type, num_rows, num_cols, num_series, num_time_points]`.
pub const TIME_SERIES_HEADER_LEN: usize = 8;

/// First header field of every time-series result record.
pub const TIME_SERIES_ID: f64 = 20.0;
/// Second header field of every time-series result record.
pub const TIME_SERIES_FORMAT_VERSION: f64 = -3.0;
/// The bridge always emits exactly one series per record.
pub const TIME_SERIES_NUM_SERIES: f64 = 1.0;

/// Header field offsets within a time-series record.
pub mod ts_field {
    pub const SERIES_ID: usize = 0;
    pub const FORMAT_VERSION: usize = 1;
    pub const TIME_BASIS: usize = 2;
    pub const DATA_TYPE: usize = 3;
    pub const NUM_ROWS: usize = 4;
    pub const NUM_COLS: usize = 5;
    pub const NUM_SERIES: usize = 6;
    pub const NUM_TIME_POINTS: usize = 7;
}

//==================================================================================
// II. Lookup-Table Record
//==================================================================================

/// Names of the table axes, in the order their labels are written.
pub const TABLE_AXES: [&str; 3] = ["row_labels", "col_labels", "layer_labels"];

/// Largest supported table dimensionality.
pub const MAX_TABLE_DIMS: usize = 3;
