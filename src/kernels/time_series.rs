//! This module contains the pure, stateless kernels for the time-series
//! sub-protocol, used by both the input decoder and the output encoder.
//!
//! Record layout, header first:
//! `[series_id, format_version, time_basis, data_type, num_rows, num_cols,
//!   num_series, num_time_points, timestamps.., data..]`
//!
//! `data` is row-major with time as the fastest-varying axis. `num_rows` and
//! `num_cols` are 0 for a scalar series, `num_cols` is 0 for a vector series.

use ndarray::{Array1, ArrayD, IxDyn};
use num_traits::ToPrimitive;

use crate::bridge::format::{
    ts_field, TIME_SERIES_FORMAT_VERSION, TIME_SERIES_HEADER_LEN, TIME_SERIES_ID,
    TIME_SERIES_NUM_SERIES,
};
use crate::buffer::{element_count, FlatReader, FlatWriter};
use crate::error::{DecodeError, EncodeError};
use crate::types::TimeSeries;

//==================================================================================
// 1. Decode (buffer -> value)
//==================================================================================

/// Reads one time-series record at the reader's position and advances past it.
pub fn decode(reader: &mut FlatReader<'_>, field: &str) -> Result<TimeSeries, DecodeError> {
    let header = reader.read_slice(TIME_SERIES_HEADER_LEN)?;

    let time_basis = header[ts_field::TIME_BASIS];
    let data_type = header[ts_field::DATA_TYPE];
    let num_rows = header_count(field, "num_rows", header[ts_field::NUM_ROWS])?;
    let num_cols = header_count(field, "num_cols", header[ts_field::NUM_COLS])?;
    let num_points = header_count(field, "num_time_points", header[ts_field::NUM_TIME_POINTS])?;

    log::debug!(
        "  TS '{}': id={} version={} time_basis={} data_type={} rows={} cols={} series={} points={}",
        field,
        header[ts_field::SERIES_ID],
        header[ts_field::FORMAT_VERSION],
        time_basis,
        data_type,
        num_rows,
        num_cols,
        header[ts_field::NUM_SERIES],
        num_points
    );

    let mut shape = Vec::with_capacity(3);
    if num_rows > 0 {
        shape.push(num_rows);
    }
    if num_cols > 0 {
        shape.push(num_cols);
    }
    shape.push(num_points);
    let data_len = element_count(&shape).ok_or_else(|| DecodeError::InvalidDimension {
        field: field.to_string(),
        value: shape.iter().map(|&d| d as f64).product(),
    })?;

    let timestamps = reader.read_slice(num_points)?;
    let data = reader.read_slice(data_len)?;

    Ok(TimeSeries {
        time_basis,
        data_type,
        timestamps: Array1::from(timestamps.to_vec()),
        data: ArrayD::from_shape_vec(IxDyn(&shape), data.to_vec()).map_err(|_| {
            DecodeError::InvalidDimension {
                field: field.to_string(),
                value: data_len as f64,
            }
        })?,
    })
}

/// Converts a header count to `usize`. Header counts cannot be coerced the way
/// dynamic dimensions are: a bad count means the record length is unknown.
fn header_count(field: &str, what: &str, value: f64) -> Result<usize, DecodeError> {
    if value.fract() != 0.0 {
        return Err(invalid(field, what, value));
    }
    value.to_usize().ok_or_else(|| invalid(field, what, value))
}

fn invalid(field: &str, what: &str, value: f64) -> DecodeError {
    DecodeError::InvalidDimension {
        field: format!("{}.{}", field, what),
        value,
    }
}

//==================================================================================
// 2. Encode (value -> buffer)
//==================================================================================

/// Number of doubles [`encode`] writes for `ts`.
pub fn encoded_len(ts: &TimeSeries) -> usize {
    TIME_SERIES_HEADER_LEN + ts.timestamps.len() + ts.data.len()
}

/// Writes `ts` as a time-series result record. Nothing is written on failure.
pub fn encode(ts: &TimeSeries, writer: &mut FlatWriter<'_>) -> Result<(), EncodeError> {
    let shape = ts.data.shape();
    let (num_rows, num_cols) = match shape.len() {
        1 => (0, 0),
        2 => (shape[0], 0),
        3 => (shape[0], shape[1]),
        rank => return Err(EncodeError::UnsupportedRank(rank)),
    };
    // A zero row or column count reads back as an absent axis.
    if let Some(axis) = ["rows", "cols"]
        .into_iter()
        .zip(&shape[..shape.len() - 1])
        .find_map(|(axis, &len)| (len == 0).then_some(axis))
    {
        return Err(EncodeError::EmptySeriesAxis(axis));
    }

    let num_points = ts.timestamps.len();
    let time_axis = shape[shape.len() - 1];
    if time_axis != num_points {
        return Err(EncodeError::ResultCountMismatch {
            what: "time series data along the time axis".to_string(),
            expected: num_points,
            actual: time_axis,
        });
    }

    writer.reserve(encoded_len(ts))?;
    writer.write_slice(&[
        TIME_SERIES_ID,
        TIME_SERIES_FORMAT_VERSION,
        ts.time_basis,
        ts.data_type,
        num_rows as f64,
        num_cols as f64,
        TIME_SERIES_NUM_SERIES,
        num_points as f64,
    ])?;
    writer.write_iter(ts.timestamps.iter())?;
    // Logical iteration order is row-major regardless of memory layout.
    writer.write_iter(ts.data.iter())?;

    log::debug!(
        "  TS encoded: rows={} cols={} points={} ({} values)",
        num_rows,
        num_cols,
        num_points,
        encoded_len(ts)
    );
    Ok(())
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn encode_to_vec(ts: &TimeSeries) -> Vec<f64> {
        let mut out = vec![0.0; encoded_len(ts)];
        let mut writer = FlatWriter::new(&mut out);
        encode(ts, &mut writer).unwrap();
        assert_eq!(writer.position(), encoded_len(ts));
        out
    }

    #[test]
    fn test_scalar_series_layout() {
        let ts = TimeSeries::scalar(0.0, 1.0, vec![0.0, 1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0, 40.0]);
        assert_eq!(
            encode_to_vec(&ts),
            vec![
                20.0, -3.0, 0.0, 1.0, 0.0, 0.0, 1.0, 4.0, //
                0.0, 1.0, 2.0, 3.0, //
                10.0, 20.0, 30.0, 40.0
            ]
        );
    }

    #[test]
    fn test_matrix_series_round_trip() {
        // 2 rows x 3 cols x 2 time points, time fastest.
        let data: Vec<f64> = (0..12).map(f64::from).collect();
        let ts = TimeSeries::with_shape(1.0, 2.0, vec![0.5, 1.5], &[2, 3, 2], data).unwrap();
        let encoded = encode_to_vec(&ts);
        assert_eq!(&encoded[4..8], &[2.0, 3.0, 1.0, 2.0]);

        let mut reader = FlatReader::new(&encoded);
        let decoded = decode(&mut reader, "ts").unwrap();
        assert_eq!(decoded, ts);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_vector_series_round_trip() {
        let ts = TimeSeries::with_shape(0.0, 0.0, vec![0.0, 1.0, 2.0], &[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap();
        let encoded = encode_to_vec(&ts);
        assert_eq!(&encoded[4..6], &[2.0, 0.0]);
        let decoded = decode(&mut FlatReader::new(&encoded), "ts").unwrap();
        assert_eq!(decoded, ts);
    }

    #[test]
    fn test_decode_rejects_negative_count() {
        let buf = [20.0, -3.0, 0.0, 0.0, 0.0, 0.0, 1.0, -2.0];
        let err = decode(&mut FlatReader::new(&buf), "ts").unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidDimension {
                field: "ts.num_time_points".into(),
                value: -2.0
            }
        );
    }

    #[test]
    fn test_decode_truncated_record() {
        let buf = [20.0, -3.0, 0.0, 0.0, 0.0, 0.0, 1.0, 3.0, 0.0, 1.0];
        assert!(matches!(
            decode(&mut FlatReader::new(&buf), "ts"),
            Err(DecodeError::BufferUnderrun { .. })
        ));
    }

    #[test]
    fn test_encode_rejects_mismatched_time_axis() {
        let ts = TimeSeries::scalar(0.0, 0.0, vec![0.0, 1.0], vec![1.0, 2.0, 3.0]);
        let mut out = vec![0.0; 16];
        let err = encode(&ts, &mut FlatWriter::new(&mut out)).unwrap_err();
        assert!(matches!(err, EncodeError::ResultCountMismatch { expected: 2, actual: 3, .. }));
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_decode_rejects_overflowing_header_counts() {
        let huge = (1u64 << 33) as f64;
        let buf = [20.0, -3.0, 0.0, 0.0, huge, huge, 1.0, huge];
        let mut reader = FlatReader::new(&buf);
        assert!(matches!(
            decode(&mut reader, "ts"),
            Err(DecodeError::InvalidDimension { ref field, .. }) if field == "ts"
        ));
        assert_eq!(reader.position(), TIME_SERIES_HEADER_LEN);
    }

    #[test]
    fn test_encode_rejects_empty_row_or_column_axis() {
        let no_rows = TimeSeries::with_shape(0.0, 1.0, vec![0.0, 1.0, 2.0], &[0, 3], vec![]).unwrap();
        let no_cols =
            TimeSeries::with_shape(0.0, 1.0, vec![0.0, 1.0, 2.0], &[2, 0, 3], vec![]).unwrap();
        let mut out = vec![-1.0; 16];
        assert_eq!(
            encode(&no_rows, &mut FlatWriter::new(&mut out)),
            Err(EncodeError::EmptySeriesAxis("rows"))
        );
        assert_eq!(
            encode(&no_cols, &mut FlatWriter::new(&mut out)),
            Err(EncodeError::EmptySeriesAxis("cols"))
        );
        assert!(out.iter().all(|&v| v == -1.0));
    }

    #[test]
    fn test_empty_time_axis_round_trips() {
        let ts = TimeSeries::with_shape(0.0, 1.0, vec![], &[2, 0], vec![]).unwrap();
        let wire = encode_to_vec(&ts);
        assert_eq!(wire, vec![20.0, -3.0, 0.0, 1.0, 2.0, 0.0, 1.0, 0.0]);
        assert_eq!(decode(&mut FlatReader::new(&wire), "ts").unwrap(), ts);
    }

    #[test]
    fn test_encode_rejects_unsupported_rank() {
        let ts = TimeSeries::with_shape(0.0, 0.0, vec![0.0], &[1, 1, 1, 1], vec![1.0]).unwrap();
        let mut out = vec![0.0; 16];
        assert_eq!(
            encode(&ts, &mut FlatWriter::new(&mut out)),
            Err(EncodeError::UnsupportedRank(4))
        );
    }
}
