// In: src/bridge/encoder.rs

//! The output encoder: structured values -> host output buffer.
//!
//! Walks the output descriptors and the calculation's results in lockstep and
//! dispatches on the declared kind. Vector and matrix results are checked
//! against their declared element count before they are copied.

use crate::buffer::FlatWriter;
use crate::error::EncodeError;
use crate::kernels::{lookup_table, time_series};
use crate::types::{ParameterDescriptor, ParameterKind, StructuredValue};

/// Encodes `values` into `buffer` following `outputs`, returning the number of
/// doubles written.
pub fn encode(
    values: &[StructuredValue],
    outputs: &[ParameterDescriptor],
    buffer: &mut [f64],
) -> Result<usize, EncodeError> {
    if values.len() != outputs.len() {
        return Err(EncodeError::ResultCountMismatch {
            what: "calculation results".to_string(),
            expected: outputs.len(),
            actual: values.len(),
        });
    }

    let mut writer = FlatWriter::new(buffer);
    for (i, (desc, value)) in outputs.iter().zip(values).enumerate() {
        match (desc.kind, value) {
            (ParameterKind::Scalar, StructuredValue::Scalar(v)) => writer.write_one(*v)?,
            (ParameterKind::Vector | ParameterKind::Matrix, StructuredValue::Array(array)) => {
                let expected = desc.static_element_count();
                if array.len() != expected {
                    return Err(EncodeError::ResultCountMismatch {
                        what: format!("elements of output '{}'", desc.name),
                        expected,
                        actual: array.len(),
                    });
                }
                writer.write_iter(array.iter())?;
            }
            (ParameterKind::TimeSeries, StructuredValue::TimeSeries(ts)) => {
                time_series::encode(ts, &mut writer)?
            }
            (ParameterKind::Table, StructuredValue::Table(table)) => {
                lookup_table::encode(table, &mut writer)?
            }
            (kind, other) => {
                return Err(EncodeError::UnexpectedType {
                    name: desc.name.clone(),
                    expected: kind.as_str(),
                    found: other.kind_name(),
                })
            }
        }
        log::debug!(
            "  Output #{} '{}': type='{}', cursor now at {}",
            i,
            desc.name,
            desc.kind,
            writer.position()
        );
    }
    Ok(writer.position())
}
