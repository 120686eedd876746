//! This module defines the core, strongly-typed data representations used
//! throughout the bridge.
//!
//! It includes the schema model (`ParameterKind`, `ParameterDescriptor`) that
//! describes every input and output, and the `StructuredValue` sum type that the
//! decoder produces and the encoder consumes.

pub mod parameter;
pub mod value;

// Re-export the main type(s) for easier access.
pub use parameter::{ParameterDescriptor, ParameterKind};
pub use value::{LookupTable, StructuredValue, TimeSeries};
