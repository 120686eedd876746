//! Structured values exchanged with the external calculation.
//!
//! The decoder produces these from the host's input buffer; the calculation
//! returns them and the encoder writes them back. Arrays are `ndarray` arrays in
//! standard (row-major) layout.

use ndarray::{Array1, ArrayD, IxDyn, ShapeError};

/// A time series: a timestamp array and a co-indexed data array.
///
/// `data` has time as its last (fastest-varying) axis: shape `[T]` for a scalar
/// series, `[rows, T]` for a vector series, `[rows, cols, T]` for a matrix series.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub time_basis: f64,
    pub data_type: f64,
    pub timestamps: Array1<f64>,
    pub data: ArrayD<f64>,
}

impl TimeSeries {
    /// Builds a scalar series from matching timestamp and value vectors.
    pub fn scalar(time_basis: f64, data_type: f64, timestamps: Vec<f64>, values: Vec<f64>) -> Self {
        Self {
            time_basis,
            data_type,
            timestamps: Array1::from(timestamps),
            data: Array1::from(values).into_dyn(),
        }
    }

    /// Builds a series whose data is laid out row-major over `shape`.
    pub fn with_shape(
        time_basis: f64,
        data_type: f64,
        timestamps: Vec<f64>,
        shape: &[usize],
        data: Vec<f64>,
    ) -> Result<Self, ShapeError> {
        Ok(Self {
            time_basis,
            data_type,
            timestamps: Array1::from(timestamps),
            data: ArrayD::from_shape_vec(IxDyn(shape), data)?,
        })
    }

    pub fn num_time_points(&self) -> usize {
        self.timestamps.len()
    }
}

/// A 1–3 dimensional labeled lookup table.
///
/// `dims` is kept as a raw integer because it arrives from the calculation
/// unchecked; the table codec rejects anything outside `1..=3`.
/// `axis_labels` holds row, column and layer labels in that order.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable {
    pub dims: i64,
    pub axis_labels: Vec<Vec<f64>>,
    pub data: Vec<f64>,
}

impl LookupTable {
    pub fn one_d(row_labels: Vec<f64>, data: Vec<f64>) -> Self {
        Self {
            dims: 1,
            axis_labels: vec![row_labels],
            data,
        }
    }

    pub fn two_d(row_labels: Vec<f64>, col_labels: Vec<f64>, data: Vec<f64>) -> Self {
        Self {
            dims: 2,
            axis_labels: vec![row_labels, col_labels],
            data,
        }
    }

    pub fn three_d(
        row_labels: Vec<f64>,
        col_labels: Vec<f64>,
        layer_labels: Vec<f64>,
        data: Vec<f64>,
    ) -> Self {
        Self {
            dims: 3,
            axis_labels: vec![row_labels, col_labels, layer_labels],
            data,
        }
    }
}

/// A value passed to or returned from the calculation.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredValue {
    Scalar(f64),
    Array(ArrayD<f64>),
    TimeSeries(TimeSeries),
    Table(LookupTable),
}

impl StructuredValue {
    /// Convenience constructor for a row-major array of the given shape.
    pub fn array(shape: &[usize], data: Vec<f64>) -> Result<Self, ShapeError> {
        Ok(Self::Array(ArrayD::from_shape_vec(IxDyn(shape), data)?))
    }

    /// A short name for the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Array(_) => "array",
            Self::TimeSeries(_) => "timeseries",
            Self::Table(_) => "table",
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayD<f64>> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }
}

impl From<f64> for StructuredValue {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<TimeSeries> for StructuredValue {
    fn from(ts: TimeSeries) -> Self {
        Self::TimeSeries(ts)
    }
}

impl From<LookupTable> for StructuredValue {
    fn from(table: LookupTable) -> Self {
        Self::Table(table)
    }
}
