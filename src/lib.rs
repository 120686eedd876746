//! This file is the root of the `gspy_core` Rust crate.
//!
//! The crate marshals the flat `f64` argument arrays exchanged between a host
//! simulator and an external calculation into structured values and back.
//! Its responsibilities here are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`bridge`, `schema`,
//!     `kernels`, etc.) and re-exporting the main entry points.
//! 2.  Defining the `#[pymodule]` which acts as the main entry point when the
//!     library is built with the `python` feature and imported into Python.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The version reported to the host through the ReportVersion method.
pub const VERSION_NUMBER: f64 = 1.80;

//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod bridge;
pub mod buffer;
pub mod config;
pub mod error;
pub mod kernels;
pub mod observability;
pub mod schema;
pub mod types;
pub mod utils;

#[cfg(feature = "python")]
mod ffi;

pub use bridge::{Bridge, Calculation, ScriptRuntime, Session, Status};
pub use config::BridgeConfig;
pub use error::GspyError;
pub use schema::Schema;
pub use types::{LookupTable, ParameterDescriptor, ParameterKind, StructuredValue, TimeSeries};

//==================================================================================
// 2. Python Module Definition
//==================================================================================
#[cfg(feature = "python")]
use pyo3::prelude::*;

/// The `gspy_core` Python module.
#[cfg(feature = "python")]
#[pymodule]
fn gspy_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::PyMarshaller>()?;

    // --- Expose the custom error type ---
    m.add(
        "GspyError",
        m.py().get_type_bound::<pyo3::exceptions::PyValueError>(),
    )?;

    // --- Expose version information as module attributes ---
    m.add("__version__", VERSION)?;
    m.add("VERSION_NUMBER", VERSION_NUMBER)?;

    m.add_function(wrap_pyfunction!(ffi::enable_verbose_logging_py, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::log_py, m)?)?;

    Ok(())
}
