//! Buffer sizing reported to the host.
//!
//! The host sizes its input and output buffers from these numbers before the
//! first calculation, so they must match the codec layouts exactly.

use super::Schema;
use crate::bridge::format::TIME_SERIES_HEADER_LEN;
use crate::types::{ParameterDescriptor, ParameterKind};

/// Sentinel returned by [`input_size`] when the input length depends on
/// runtime values. The host then sizes its buffer by its own convention.
pub const UNKNOWN_SIZE: i64 = -1;

/// Exact number of doubles consumed by the inputs, or [`UNKNOWN_SIZE`] if any
/// input is a time series or is dynamically shaped.
pub fn input_size(schema: &Schema) -> i64 {
    let mut total: i64 = 0;
    for desc in &schema.inputs {
        if desc.is_variable_length() {
            log::debug!(
                "Input '{}' has a runtime-dependent size; reporting {}.",
                desc.name,
                UNKNOWN_SIZE
            );
            return UNKNOWN_SIZE;
        }
        total += static_contribution(desc);
    }
    log::debug!("Input size calculated: {}", total);
    total
}

/// Upper bound on the number of doubles written for the outputs.
pub fn output_size(schema: &Schema) -> i64 {
    let total: i64 = schema.outputs.iter().map(output_contribution).sum();
    log::debug!("Output size calculated: {}", total);
    total
}

fn static_contribution(desc: &ParameterDescriptor) -> i64 {
    match desc.kind {
        ParameterKind::Scalar => 1,
        _ => desc.static_element_count() as i64,
    }
}

fn output_contribution(desc: &ParameterDescriptor) -> i64 {
    match desc.kind {
        ParameterKind::TimeSeries => {
            let max_points = desc.max_points.unwrap_or(1) as i64;
            let rows = desc.dimensions.first().copied().unwrap_or(1) as i64;
            let cols = desc.dimensions.get(1).copied().unwrap_or(1) as i64;
            TIME_SERIES_HEADER_LEN as i64 + max_points + max_points * rows * cols
        }
        // Axis lengths are chosen at runtime, so the declared capacity is authoritative.
        ParameterKind::Table => desc.max_elements.unwrap_or(1) as i64,
        ParameterKind::Scalar | ParameterKind::Vector | ParameterKind::Matrix => {
            static_contribution(desc)
        }
    }
}
