//! This module serves as the public API for the Foreign Function Interface (FFI) layer.
//!
//! It only contains the Python binding, which lets scripts exercise the wire
//! layout directly: build a marshaller from a config document, then decode and
//! encode flat buffers exactly as the host would see them.

//==================================================================================
// 1. Module Declarations
//==================================================================================
/// Conversions between Python objects and structured values, plus the exposed class.
pub mod python;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use self::python::{enable_verbose_logging_py, log_py, PyMarshaller};
