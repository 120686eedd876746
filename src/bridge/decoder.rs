// In: src/bridge/decoder.rs

//! The input decoder: host input buffer -> structured values.
//!
//! Decoding is two-pass because vector and matrix shapes may depend on scalar
//! inputs:
//!
//! 1. **Scalar harvest.** Walk the inputs, recording each scalar by name and
//!    skipping statically-shaped arrays. The walk stops at the first
//!    variable-length input, whose length is not yet knowable.
//! 2. **Resolve and read.** Walk the inputs again from the start, resolving
//!    every shape and reading exactly that many values.
//!
//! The validator guarantees that every referenced scalar sits before the first
//! variable-length input, so the harvest always sees it. Without validation, a
//! reference to a later scalar fails with `MissingReference` rather than
//! reading misaligned data.

use hashbrown::HashMap;
use ndarray::{ArrayD, IxDyn};
use num_traits::ToPrimitive;

use crate::buffer::{element_count, FlatReader};
use crate::error::DecodeError;
use crate::kernels::time_series;
use crate::types::{ParameterDescriptor, ParameterKind, StructuredValue};

/// Scalar values collected by the first pass, keyed by input name.
type Harvest<'s> = HashMap<&'s str, f64>;

/// Decodes `buffer` into one `(name, value)` pair per input, in schema order.
pub fn decode(
    buffer: &[f64],
    inputs: &[ParameterDescriptor],
) -> Result<Vec<(String, StructuredValue)>, DecodeError> {
    log::debug!(
        "Decoding {} input(s) from a buffer of {} value(s).",
        inputs.len(),
        buffer.len()
    );
    let harvest = harvest_scalars(buffer, inputs)?;

    let mut reader = FlatReader::new(buffer);
    let mut values = Vec::with_capacity(inputs.len());
    for (i, desc) in inputs.iter().enumerate() {
        let value = match desc.kind {
            ParameterKind::Scalar => StructuredValue::Scalar(reader.read_one()?),
            ParameterKind::Vector | ParameterKind::Matrix => {
                let shape = resolve_shape(desc, &harvest)?;
                let len = element_count(&shape).ok_or_else(|| DecodeError::InvalidDimension {
                    field: desc.name.clone(),
                    value: shape.iter().map(|&d| d as f64).product(),
                })?;
                let data = reader.read_slice(len)?;
                let array = ArrayD::from_shape_vec(IxDyn(&shape), data.to_vec()).map_err(|_| {
                    DecodeError::InvalidDimension {
                        field: desc.name.clone(),
                        value: len as f64,
                    }
                })?;
                StructuredValue::Array(array)
            }
            ParameterKind::TimeSeries => {
                StructuredValue::TimeSeries(time_series::decode(&mut reader, &desc.name)?)
            }
            ParameterKind::Table => {
                return Err(DecodeError::OutputOnlyKind {
                    name: desc.name.clone(),
                })
            }
        };
        log::debug!(
            "  Input #{} '{}': type='{}', cursor now at {}",
            i,
            desc.name,
            desc.kind,
            reader.position()
        );
        values.push((desc.name.clone(), value));
    }

    if reader.remaining() > 0 {
        log::debug!(
            "{} trailing value(s) left unread in the input buffer.",
            reader.remaining()
        );
    }
    Ok(values)
}

/// First pass: records every scalar that precedes the first variable-length input.
fn harvest_scalars<'s>(
    buffer: &[f64],
    inputs: &'s [ParameterDescriptor],
) -> Result<Harvest<'s>, DecodeError> {
    let mut reader = FlatReader::new(buffer);
    let mut harvest = Harvest::new();
    for desc in inputs {
        if desc.is_variable_length() {
            break;
        }
        match desc.kind {
            ParameterKind::Scalar => {
                harvest.insert(desc.name.as_str(), reader.read_one()?);
            }
            ParameterKind::Vector | ParameterKind::Matrix => {
                reader.skip(desc.static_element_count())?;
            }
            // Tables are rejected in the second pass.
            ParameterKind::Table | ParameterKind::TimeSeries => break,
        }
    }
    Ok(harvest)
}

/// Returns the concrete shape of a vector or matrix input.
fn resolve_shape(desc: &ParameterDescriptor, harvest: &Harvest<'_>) -> Result<Vec<usize>, DecodeError> {
    let Some(sources) = &desc.dimension_sources else {
        return Ok(desc.dimensions.clone());
    };
    sources
        .iter()
        .map(|source| {
            let raw = harvest
                .get(source.as_str())
                .copied()
                .ok_or_else(|| DecodeError::MissingReference {
                    name: desc.name.clone(),
                    reference: source.clone(),
                })?;
            Ok(coerce_dimension(&desc.name, source, raw))
        })
        .collect()
}

/// Converts a harvested scalar to a dimension. Negative, non-integral and
/// non-finite values become 0 so the step yields an empty array.
fn coerce_dimension(name: &str, source: &str, raw: f64) -> usize {
    match raw.to_usize() {
        Some(dim) if raw.fract() == 0.0 => dim,
        _ => {
            log::warn!(
                "Input '{}': dimension source '{}' has invalid value {}; using 0.",
                name,
                source,
                raw
            );
            0
        }
    }
}
