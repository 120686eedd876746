// In: src/ffi/python.rs

use ndarray::{ArrayD, ArrayViewD, IxDyn};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList, PyString};

use crate::bridge::format::TABLE_AXES;
use crate::bridge::{decoder, encoder};
use crate::config::BridgeConfig;
use crate::error::{EncodeError, GspyError};
use crate::observability::{self, LogLevel, LogSettings};
use crate::schema::{self, Schema};
use crate::types::{
    LookupTable, ParameterDescriptor, ParameterKind, StructuredValue, TimeSeries,
};

//==================================================================================
// I. Marshaller
//==================================================================================

/// A validated schema exposed to Python.
#[pyclass(name = "Marshaller", module = "gspy_core")]
pub struct PyMarshaller {
    schema: Schema,
}

#[pymethods]
impl PyMarshaller {
    /// Builds the schema from a JSON config document and validates it.
    #[new]
    fn new(config_json: &str) -> PyResult<Self> {
        let config = BridgeConfig::from_json_str(config_json)?;
        let schema = config.schema()?;
        schema::validate(&schema).map_err(GspyError::from)?;
        Ok(Self { schema })
    }

    fn input_size(&self) -> i64 {
        schema::input_size(&self.schema)
    }

    fn output_size(&self) -> i64 {
        schema::output_size(&self.schema)
    }

    /// Decodes an input buffer into a list of values, one per input.
    fn decode(&self, py: Python<'_>, buffer: Vec<f64>) -> PyResult<PyObject> {
        let inputs = &self.schema.inputs;
        let values = py
            .allow_threads(|| decoder::decode(&buffer, inputs))
            .map_err(GspyError::from)?;

        let items = values
            .iter()
            .map(|(_, value)| value_to_py(py, value))
            .collect::<PyResult<Vec<_>>>()?;
        Ok(PyList::new_bound(py, items).into_py(py))
    }

    /// Encodes one value per output. Returns the written prefix of a buffer of
    /// `capacity` doubles, which defaults to `output_size()`.
    #[pyo3(signature = (values, capacity = None))]
    fn encode(&self, values: Vec<Bound<'_, PyAny>>, capacity: Option<usize>) -> PyResult<Vec<f64>> {
        let outputs = &self.schema.outputs;
        if values.len() != outputs.len() {
            return Err(GspyError::from(EncodeError::ResultCountMismatch {
                what: "calculation results".to_string(),
                expected: outputs.len(),
                actual: values.len(),
            })
            .into());
        }
        let structured = values
            .iter()
            .zip(outputs)
            .map(|(obj, desc)| value_from_py(obj, desc))
            .collect::<PyResult<Vec<_>>>()?;

        let capacity = capacity.unwrap_or_else(|| self.output_size().max(0) as usize);
        let mut buffer = vec![0.0; capacity];
        let written = encoder::encode(&structured, outputs, &mut buffer).map_err(GspyError::from)?;
        buffer.truncate(written);
        Ok(buffer)
    }
}

//==================================================================================
// II. Rust -> Python
//==================================================================================

fn value_to_py(py: Python<'_>, value: &StructuredValue) -> PyResult<PyObject> {
    match value {
        StructuredValue::Scalar(v) => Ok((*v).into_py(py)),
        StructuredValue::Array(array) => Ok(array_to_py(py, array.view())),
        StructuredValue::TimeSeries(ts) => {
            let dict = PyDict::new_bound(py);
            dict.set_item("time_basis", ts.time_basis)?;
            dict.set_item("data_type", ts.data_type)?;
            dict.set_item("timestamps", ts.timestamps.to_vec())?;
            dict.set_item("data", array_to_py(py, ts.data.view()))?;
            Ok(dict.into_py(py))
        }
        StructuredValue::Table(table) => {
            let dict = PyDict::new_bound(py);
            dict.set_item("table_dim", table.dims)?;
            for (name, labels) in TABLE_AXES.iter().zip(&table.axis_labels) {
                dict.set_item(*name, labels.clone())?;
            }
            dict.set_item("data", table.data.clone())?;
            Ok(dict.into_py(py))
        }
    }
}

/// Converts an array to nested Python lists, outermost axis first.
fn array_to_py(py: Python<'_>, array: ArrayViewD<'_, f64>) -> PyObject {
    match array.ndim() {
        0 => array.sum().into_py(py),
        1 => array.iter().copied().collect::<Vec<f64>>().into_py(py),
        _ => {
            let rows: Vec<PyObject> = array
                .outer_iter()
                .map(|sub| array_to_py(py, sub))
                .collect();
            PyList::new_bound(py, rows).into_py(py)
        }
    }
}

//==================================================================================
// III. Python -> Rust
//==================================================================================

fn value_from_py(obj: &Bound<'_, PyAny>, desc: &ParameterDescriptor) -> PyResult<StructuredValue> {
    match desc.kind {
        ParameterKind::Scalar => Ok(StructuredValue::Scalar(obj.extract::<f64>()?)),
        ParameterKind::Vector | ParameterKind::Matrix => {
            let array = nested_to_array(obj)?;
            // A flat list for a matrix is laid out row-major over the declared shape.
            if array.ndim() == 1
                && desc.dimensions.len() > 1
                && array.len() == desc.static_element_count()
            {
                let data: Vec<f64> = array.iter().copied().collect();
                let reshaped = ArrayD::from_shape_vec(IxDyn(&desc.dimensions), data)
                    .map_err(|e| PyValueError::new_err(e.to_string()))?;
                return Ok(StructuredValue::Array(reshaped));
            }
            Ok(StructuredValue::Array(array))
        }
        ParameterKind::TimeSeries => {
            let dict = obj.downcast::<PyDict>()?;
            let timestamps: Vec<f64> = nested_to_array(&required(dict, "timestamps")?)?
                .iter()
                .copied()
                .collect();
            Ok(StructuredValue::TimeSeries(TimeSeries {
                time_basis: required(dict, "time_basis")?.extract()?,
                data_type: required(dict, "data_type")?.extract()?,
                timestamps: timestamps.into(),
                data: nested_to_array(&required(dict, "data")?)?,
            }))
        }
        ParameterKind::Table => {
            let dict = obj.downcast::<PyDict>()?;
            let dims: i64 = required(dict, "table_dim")?.extract()?;
            let mut axis_labels = Vec::with_capacity(TABLE_AXES.len());
            for name in TABLE_AXES {
                match dict.get_item(name)? {
                    None => break,
                    Some(labels) if labels.is_none() => {
                        return Err(GspyError::from(EncodeError::NullPayload(name.to_string())).into())
                    }
                    Some(labels) => axis_labels.push(nested_to_array(&labels)?.iter().copied().collect()),
                }
            }
            let data = match dict.get_item("data")? {
                None => return Err(GspyError::from(EncodeError::MissingAxis("data")).into()),
                Some(data) if data.is_none() => {
                    return Err(GspyError::from(EncodeError::NullPayload("data".to_string())).into())
                }
                Some(data) => nested_to_array(&data)?.iter().copied().collect(),
            };
            Ok(StructuredValue::Table(LookupTable {
                dims,
                axis_labels,
                data,
            }))
        }
    }
}

/// Fetches a dictionary entry that must be present and not `None`.
fn required<'py>(dict: &Bound<'py, PyDict>, key: &str) -> PyResult<Bound<'py, PyAny>> {
    match dict.get_item(key)? {
        None => Err(GspyError::from(EncodeError::MissingField(key.to_string())).into()),
        Some(value) if value.is_none() => {
            Err(GspyError::from(EncodeError::NullPayload(key.to_string())).into())
        }
        Some(value) => Ok(value),
    }
}

/// Converts a number or a rectangular nest of sequences into an array.
fn nested_to_array(obj: &Bound<'_, PyAny>) -> PyResult<ArrayD<f64>> {
    if let Ok(v) = obj.extract::<f64>() {
        return Ok(ArrayD::from_elem(IxDyn(&[]), v));
    }
    if obj.is_instance_of::<PyString>() {
        return Err(PyValueError::new_err("expected a number or a sequence of numbers"));
    }

    let mut inner_shape: Option<Vec<usize>> = None;
    let mut data = Vec::new();
    let mut len = 0;
    for item in obj.iter()? {
        let child = nested_to_array(&item?)?;
        match &inner_shape {
            None => inner_shape = Some(child.shape().to_vec()),
            Some(shape) if shape.as_slice() != child.shape() => {
                return Err(PyValueError::new_err("nested sequences must be rectangular"))
            }
            Some(_) => {}
        }
        data.extend(child.iter().copied());
        len += 1;
    }

    let mut shape = vec![len];
    shape.extend(inner_shape.unwrap_or_default());
    ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|e| PyValueError::new_err(e.to_string()))
}

//==================================================================================
// IV. Logging
//==================================================================================

#[pyfunction]
#[pyo3(name = "enable_verbose_logging", signature = (log_file = None, log_level = 2))]
pub fn enable_verbose_logging_py(log_file: Option<String>, log_level: i64) {
    observability::init_logging(&LogSettings {
        level: LogLevel::from_int(log_level),
        file: log_file.map(Into::into),
    });
}

/// Writes a script message into the bridge log at `level` (0..=3, default info).
#[pyfunction]
#[pyo3(name = "log", signature = (message, level = 2))]
pub fn log_py(message: &str, level: i64) {
    log::log!(LogLevel::from_int(level).to_level(), "{}", message);
}
