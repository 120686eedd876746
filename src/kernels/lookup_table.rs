//! This module contains the pure, stateless kernel for the lookup-table
//! sub-protocol. Tables are output-only: there is no decode direction.
//!
//! Record layout:
//! `[dim_count, axis_lengths.., row_labels.., col_labels.., layer_labels.., data..]`
//! where only the first `dim_count` axes are present and `data` is row-major
//! over the declared axes.

use crate::bridge::format::{MAX_TABLE_DIMS, TABLE_AXES};
use crate::buffer::FlatWriter;
use crate::error::EncodeError;
use crate::types::LookupTable;

/// Resolves the axis label arrays for `table`, checking the dimension count
/// and that every required axis is present.
fn axes(table: &LookupTable) -> Result<&[Vec<f64>], EncodeError> {
    let dims = match table.dims {
        d @ 1..=3 => d as usize,
        other => return Err(EncodeError::InvalidDimensionCount(other)),
    };
    debug_assert!(dims <= MAX_TABLE_DIMS);
    if let Some(&missing) = TABLE_AXES[..dims].get(table.axis_labels.len()) {
        return Err(EncodeError::MissingAxis(missing));
    }
    Ok(&table.axis_labels[..dims])
}

/// Number of doubles [`encode`] writes for `table`.
pub fn encoded_len(table: &LookupTable) -> Result<usize, EncodeError> {
    let axes = axes(table)?;
    Ok(1 + axes.len() + axes.iter().map(Vec::len).sum::<usize>() + table.data.len())
}

/// Writes `table` as a lookup-table record. Nothing is written on failure.
pub fn encode(table: &LookupTable, writer: &mut FlatWriter<'_>) -> Result<(), EncodeError> {
    let axes = axes(table)?;

    let expected: usize = axes.iter().map(Vec::len).product();
    if table.data.len() != expected {
        return Err(EncodeError::ResultCountMismatch {
            what: "table data".to_string(),
            expected,
            actual: table.data.len(),
        });
    }

    writer.reserve(encoded_len(table)?)?;
    writer.write_one(axes.len() as f64)?;
    for labels in axes {
        writer.write_one(labels.len() as f64)?;
    }
    for labels in axes {
        writer.write_slice(labels)?;
    }
    writer.write_slice(&table.data)?;

    log::debug!(
        "  Table encoded: {}D, axis lengths {:?}",
        axes.len(),
        axes.iter().map(Vec::len).collect::<Vec<_>>()
    );
    Ok(())
}
